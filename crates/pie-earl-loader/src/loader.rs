use crate::dom::DomEnvironment;
use crate::options::{LoaderOptions, PackageReference};
use crate::strategies::{GlobalBundleStrategy, LoadStrategy, NamespacedModulesStrategy, PreloadedStrategy};
use dashmap::DashMap;
use pie_earl_types::{ItemConfig, LoadState, PlayerError, RegisteredTagRecord, Strategy};
use std::sync::Arc;
use tokio::sync::OnceCell;

type LoadCell = Arc<OnceCell<Result<Option<String>, PlayerError>>>;

/// Owns the process-wide Registered Tag Record map and coalesces concurrent
/// loads of the same `(tag, packageReference)` pair into a single fetch
/// `E` is the `DomEnvironment` this
/// loader talks to; production code uses `WebSysEnvironment`, tests use a
/// fake.
pub struct ElementLoader<E: DomEnvironment> {
    env: E,
    records: DashMap<String, RegisteredTagRecord>,
    loads: DashMap<String, LoadCell>,
}

impl<E: DomEnvironment> ElementLoader<E> {
    pub fn new(env: E) -> Self {
        Self {
            env,
            records: DashMap::new(),
            loads: DashMap::new(),
        }
    }

    /// Ensure every tag in `config.elements` is registered. Idempotent per
    /// `(tag, packageReference)`; registering the same tag against a
    /// different reference is a `RegistrationConflict`.
    pub async fn load(&self, config: &ItemConfig, options: &LoaderOptions) -> Result<(), PlayerError> {
        for (tag, reference) in &config.elements {
            self.load_tag(tag, reference, options).await?;
        }
        Ok(())
    }

    pub async fn load_tag(
        &self,
        tag: &str,
        reference_str: &str,
        options: &LoaderOptions,
    ) -> Result<(), PlayerError> {
        let reference = PackageReference::parse(reference_str).map_err(|err| PlayerError::LoadFailure {
            tag: tag.to_string(),
            message: err.to_string(),
        })?;
        let full_reference = reference.reference();

        match self.records.get(tag) {
            Some(existing) if existing.package_reference() == full_reference => {}
            Some(existing) => {
                return Err(PlayerError::RegistrationConflict {
                    tag: tag.to_string(),
                    existing: existing.package_reference(),
                    attempted: full_reference,
                });
            }
            None => {
                self.records.insert(
                    tag.to_string(),
                    RegisteredTagRecord::resolving(tag, reference.package_name(), reference.version.clone(), options.strategy),
                );
            }
        }

        let cell_key = format!("{tag}::{full_reference}");
        let cell: LoadCell = self
            .loads
            .entry(cell_key)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let result = cell
            .get_or_init(|| async {
                let strategy: Box<dyn LoadStrategy> = match options.strategy {
                    Strategy::Esm => Box::new(NamespacedModulesStrategy),
                    Strategy::Iife => Box::new(GlobalBundleStrategy),
                    Strategy::Preloaded => Box::new(PreloadedStrategy),
                };
                strategy
                    .load(&self.env, tag, &reference, options)
                    .await
                    .map(|outcome| outcome.controller_name)
            })
            .await;

        match result {
            Ok(controller_name) => {
                tracing::debug!(tag, reference = %full_reference, "element registered");
                if let Some(mut record) = self.records.get_mut(tag) {
                    record.state = LoadState::Registered;
                    record.controller_name = controller_name.clone();
                }
                Ok(())
            }
            Err(err) => {
                tracing::warn!(tag, reference = %full_reference, %err, "element load failed");
                if let Some(mut record) = self.records.get_mut(tag) {
                    record.state = LoadState::Failed;
                }
                Err(err.clone())
            }
        }
    }

    pub fn record(&self, tag: &str) -> Option<RegisteredTagRecord> {
        self.records.get(tag).map(|r| r.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::LoadOutcome;
    use async_trait::async_trait;
    use pie_earl_types::ModelEntry;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeEnv {
        import_count: AtomicUsize,
        fail_imports: bool,
    }

    #[async_trait(?Send)]
    impl DomEnvironment for FakeEnv {
        async fn import_module(&self, _specifier: &str) -> Result<LoadOutcome, String> {
            self.import_count.fetch_add(1, Ordering::SeqCst);
            if self.fail_imports {
                return Err("network error".to_string());
            }
            Ok(LoadOutcome::default())
        }

        async fn inject_script(&self, _url: &str, _bundle_key: &str) -> Result<(), String> {
            Ok(())
        }

        fn is_tag_defined(&self, _tag: &str) -> bool {
            true
        }

        fn lookup_global_controller(&self, _global_name: &str) -> Option<()> {
            None
        }
    }

    fn config(elements: &[(&str, &str)]) -> ItemConfig {
        ItemConfig {
            markup: String::new(),
            elements: elements.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            models: Vec::<ModelEntry>::new(),
            id: None,
        }
    }

    #[tokio::test]
    async fn loading_same_tag_twice_issues_exactly_one_fetch() {
        let loader = ElementLoader::new(FakeEnv::default());
        let options = LoaderOptions::new(Strategy::Esm);
        let cfg = config(&[("hotspot", "@pie-element/hotspot@1.0.0")]);

        loader.load(&cfg, &options).await.unwrap();
        loader.load(&cfg, &options).await.unwrap();

        assert_eq!(loader.env.import_count.load(Ordering::SeqCst), 1);
        assert_eq!(loader.record("hotspot").unwrap().state, LoadState::Registered);
    }

    #[tokio::test]
    async fn re_registering_different_reference_is_refused() {
        let loader = ElementLoader::new(FakeEnv::default());
        let options = LoaderOptions::new(Strategy::Esm);

        loader.load_tag("hotspot", "@pie-element/hotspot@1.0.0", &options).await.unwrap();
        let err = loader
            .load_tag("hotspot", "@pie-element/hotspot@2.0.0", &options)
            .await
            .unwrap_err();

        assert!(matches!(err, PlayerError::RegistrationConflict { .. }));
    }

    #[tokio::test]
    async fn failed_load_marks_record_failed_and_returns_load_failure() {
        let loader = ElementLoader::new(FakeEnv {
            fail_imports: true,
            ..Default::default()
        });
        let options = LoaderOptions::new(Strategy::Esm);

        let err = loader
            .load_tag("hotspot", "@pie-element/hotspot@1.0.0", &options)
            .await
            .unwrap_err();

        assert!(matches!(err, PlayerError::LoadFailure { .. }));
        assert_eq!(loader.record("hotspot").unwrap().state, LoadState::Failed);
    }

    #[tokio::test]
    async fn preloaded_strategy_verifies_presence_only() {
        let loader = ElementLoader::new(FakeEnv::default());
        let options = LoaderOptions::new(Strategy::Preloaded);

        loader.load_tag("hotspot", "@pie-element/hotspot@1.0.0", &options).await.unwrap();
        assert_eq!(loader.env.import_count.load(Ordering::SeqCst), 0);
    }
}
