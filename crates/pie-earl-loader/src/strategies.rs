use crate::dom::{DomEnvironment, LoadOutcome};
use crate::options::{controller_global_name, LoaderOptions, PackageReference};
use async_trait::async_trait;
use pie_earl_types::PlayerError;

/// One of the three mechanisms EARL uses to bring a tag into existence.
/// Implementations never touch the Registered Tag Record map directly; the
/// caller (`ElementLoader`) owns that state.
#[async_trait(?Send)]
pub trait LoadStrategy {
    async fn load(
        &self,
        env: &dyn DomEnvironment,
        tag: &str,
        reference: &PackageReference,
        options: &LoaderOptions,
    ) -> Result<LoadOutcome, PlayerError>;
}

/// Strategy A: fetch the package reference as a specifier via native
/// dynamic import, from a configurable CDN base (which may be the LMP).
pub struct NamespacedModulesStrategy;

#[async_trait(?Send)]
impl LoadStrategy for NamespacedModulesStrategy {
    async fn load(
        &self,
        env: &dyn DomEnvironment,
        tag: &str,
        reference: &PackageReference,
        options: &LoaderOptions,
    ) -> Result<LoadOutcome, PlayerError> {
        let cdn_base = options
            .cdn_base
            .as_deref()
            .unwrap_or("https://esm.sh")
            .trim_end_matches('/');
        let specifier = format!("{cdn_base}/{}", reference.reference());

        let outcome = env
            .import_module(&specifier)
            .await
            .map_err(|message| PlayerError::LoadFailure {
                tag: tag.to_string(),
                message,
            })?;

        // The module is expected to either export a controller directly
        // (`outcome.controller_name` already set by `import_module`) or
        // fall back to the legacy global-name discovery mechanism other
        // strategies use, per §9's note that the two are equivalent.
        let controller_name = outcome.controller_name.or_else(|| {
            let global_name = controller_global_name(&reference.package_name());
            env.lookup_global_controller(&global_name).map(|_| global_name)
        });

        Ok(LoadOutcome { controller_name })
    }
}

/// Strategy B: construct a URL under the configured bundle host, inject a
/// `<script>` tag, and await its load; the bundle registers the element
/// itself. A per-bundle-host side-effect registry prevents duplicate
/// injection (owned by the `DomEnvironment` implementation).
pub struct GlobalBundleStrategy;

#[async_trait(?Send)]
impl LoadStrategy for GlobalBundleStrategy {
    async fn load(
        &self,
        env: &dyn DomEnvironment,
        tag: &str,
        reference: &PackageReference,
        options: &LoaderOptions,
    ) -> Result<LoadOutcome, PlayerError> {
        let bundle_host = options
            .bundle_host
            .as_deref()
            .ok_or_else(|| PlayerError::LoadFailure {
                tag: tag.to_string(),
                message: "global-bundle strategy requires loaderOptions.bundleHost".to_string(),
            })?
            .trim_end_matches('/');
        let url = format!("{bundle_host}/{}.js", reference.reference());
        let bundle_key = format!("{bundle_host}:{}", reference.reference());

        env.inject_script(&url, &bundle_key)
            .await
            .map_err(|message| PlayerError::LoadFailure {
                tag: tag.to_string(),
                message,
            })?;

        let controller_name = controller_global_name(&reference.package_name());
        Ok(LoadOutcome {
            controller_name: env
                .lookup_global_controller(&controller_name)
                .map(|_| controller_name),
        })
    }
}

/// Strategy C: the host guarantees the element and controller are already
/// registered; the loader only verifies presence.
pub struct PreloadedStrategy;

#[async_trait(?Send)]
impl LoadStrategy for PreloadedStrategy {
    async fn load(
        &self,
        env: &dyn DomEnvironment,
        tag: &str,
        reference: &PackageReference,
        _options: &LoaderOptions,
    ) -> Result<LoadOutcome, PlayerError> {
        if !env.is_tag_defined(tag) {
            return Err(PlayerError::LoadFailure {
                tag: tag.to_string(),
                message: format!("preloaded strategy expected `{tag}` to already be registered"),
            });
        }
        let controller_name = controller_global_name(&reference.package_name());
        Ok(LoadOutcome {
            controller_name: env
                .lookup_global_controller(&controller_name)
                .map(|_| controller_name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Fake env whose `import_module` never reports a controller directly
    /// (matching `WebSysEnvironment`'s behavior), so discovery has to fall
    /// through to the global-name lookup.
    struct FakeEnvWithGlobalController {
        registered_global: String,
    }

    #[async_trait(?Send)]
    impl DomEnvironment for FakeEnvWithGlobalController {
        async fn import_module(&self, _specifier: &str) -> Result<LoadOutcome, String> {
            Ok(LoadOutcome::default())
        }

        async fn inject_script(&self, _url: &str, _bundle_key: &str) -> Result<(), String> {
            Ok(())
        }

        fn is_tag_defined(&self, _tag: &str) -> bool {
            true
        }

        fn lookup_global_controller(&self, global_name: &str) -> Option<()> {
            (global_name == self.registered_global).then_some(())
        }
    }

    #[tokio::test]
    async fn namespaced_modules_strategy_falls_back_to_global_controller_lookup() {
        let reference = PackageReference::parse("@pie-element/hotspot@1.0.0").unwrap();
        let env = FakeEnvWithGlobalController {
            registered_global: controller_global_name(&reference.package_name()),
        };
        let options = LoaderOptions::new(pie_earl_types::Strategy::Esm);

        let outcome = NamespacedModulesStrategy
            .load(&env, "hotspot", &reference, &options)
            .await
            .unwrap();

        assert_eq!(outcome.controller_name.as_deref(), Some("pie.element.hotspot"));
    }

    #[tokio::test]
    async fn namespaced_modules_strategy_reports_no_controller_when_none_found() {
        let reference = PackageReference::parse("@pie-element/hotspot@1.0.0").unwrap();
        let env = FakeEnvWithGlobalController {
            registered_global: "some.other.controller".to_string(),
        };
        let options = LoaderOptions::new(pie_earl_types::Strategy::Esm);

        let outcome = NamespacedModulesStrategy
            .load(&env, "hotspot", &reference, &options)
            .await
            .unwrap();

        assert_eq!(outcome.controller_name, None);
    }
}
