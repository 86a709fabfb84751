//! Import-specifier rewriter.
//!
//! Takes one JS/TS module's source text and rewrites every import/export
//! specifier string in it according to a [`RewriteContext`], leaving
//! everything else byte-identical. The rewriter never fails: a lexer panic
//! falls back to a regex pass, and the regex pass never throws.

mod classify;
mod lexer_pass;
mod regex_pass;

pub use classify::{classify, SpecifierKind};

use std::panic::{self, AssertUnwindSafe};

/// Context needed to rewrite specifiers in one module.
#[derive(Debug, Clone)]
pub struct RewriteContext {
    /// Base URL prefixed onto bare external specifiers, e.g. `https://esm.sh`.
    pub external_cdn_base: String,
    /// Canonical `scope/name` of the package this source belongs to, used to
    /// resolve relative specifiers to an absolute namespaced path.
    pub pkg: Option<String>,
    /// Path of the file being rewritten within `pkg`'s build output, used as
    /// the base directory for relative-specifier resolution.
    pub subpath: Option<String>,
}

impl RewriteContext {
    pub fn new(external_cdn_base: impl Into<String>) -> Self {
        Self {
            external_cdn_base: external_cdn_base.into(),
            pkg: None,
            subpath: None,
        }
    }

    pub fn with_pkg(mut self, pkg: impl Into<String>, subpath: impl Into<String>) -> Self {
        self.pkg = Some(pkg.into());
        self.subpath = Some(subpath.into());
        self
    }
}

/// Recognized PIE package scopes. A specifier beginning with one of these is
/// rewritten to a namespace-absolute path (`@scope/name` -> `/@scope/name`).
pub const KNOWN_SCOPES: &[&str] = &["@pie-lib", "@pie-element", "@pie-ui", "@pie-api"];

/// Rewrite every specifier in `source`. Total: never panics, never returns
/// an error.
pub fn rewrite(source: &str, ctx: &RewriteContext) -> String {
    let result = panic::catch_unwind(AssertUnwindSafe(|| lexer_pass::rewrite_lexer(source, ctx)));
    match result {
        Ok(Some(rewritten)) => rewritten,
        Ok(None) | Err(_) => {
            tracing::debug!("pie_rewriter: falling back to regex pass");
            regex_pass::rewrite_regex(source, ctx)
        }
    }
}

/// Rewrite a single specifier string (no quotes) per the classification
/// rules above. Shared by both the lexer and regex passes so the two
/// stay semantically identical.
pub fn rewrite_specifier(spec: &str, ctx: &RewriteContext) -> String {
    match classify(spec) {
        SpecifierKind::Relative => rewrite_relative(spec, ctx),
        SpecifierKind::KnownNamespace => rewrite_known_namespace(spec),
        SpecifierKind::AbsoluteOrUrl => spec.to_string(),
        SpecifierKind::BareExternal => format!("{}/{}", ctx.external_cdn_base.trim_end_matches('/'), spec),
    }
}

fn rewrite_known_namespace(spec: &str) -> String {
    // "@scope/name/sub" -> "/@scope/name/sub"
    format!("/{spec}")
}

fn rewrite_relative(spec: &str, ctx: &RewriteContext) -> String {
    let Some(pkg) = ctx.pkg.as_deref() else {
        // No package context to resolve against; leave unchanged rather than
        // synthesize a wrong URL (same graceful-failure posture as the
        // bundler-cache demotion edge case).
        return spec.to_string();
    };
    let base_dir = ctx
        .subpath
        .as_deref()
        .and_then(|s| s.rsplit_once('/'))
        .map(|(dir, _)| dir)
        .unwrap_or("");

    let resolved = normalize_path(base_dir, spec);

    match demote_bundler_cache_path(&resolved, ctx) {
        BundlerCacheDemotion::NotApplicable => format!("/{pkg}/{resolved}"),
        BundlerCacheDemotion::Demoted(url) => url,
        // A bundler-cache prefix was found but the trailing segment could
        // not be parsed into a package name. Leave the specifier exactly as
        // written rather than guess: a 404 is preferable to a wrong URL.
        BundlerCacheDemotion::Unparseable => spec.to_string(),
    }
}

/// Join `base_dir` with a relative specifier and collapse `.`/`..` segments.
/// Pure lexical resolution; never touches the filesystem.
fn normalize_path(base_dir: &str, relative: &str) -> String {
    let mut stack: Vec<&str> = if base_dir.is_empty() {
        Vec::new()
    } else {
        base_dir.split('/').filter(|s| !s.is_empty()).collect()
    };
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }
    stack.join("/")
}

enum BundlerCacheDemotion {
    /// No `node_modules/` prefix in the resolved path; ordinary relative
    /// rewriting applies.
    NotApplicable,
    /// A `node_modules/` prefix was found and successfully parsed into a
    /// `<cdn>/<pkg>/<subpath>` external URL.
    Demoted(String),
    /// A `node_modules/` prefix was found but the trailing segment could
    /// not be parsed into a package name.
    Unparseable,
}

/// Edge case: a relative specifier whose resolved path traverses a
/// well-known package-manager cache prefix must be demoted to an external
/// rewrite. The innermost `node_modules/<pkg-or-scope>/sub` segment names
/// the package; the remaining subpath becomes the CDN suffix.
fn demote_bundler_cache_path(resolved: &str, ctx: &RewriteContext) -> BundlerCacheDemotion {
    const MARKER: &str = "node_modules/";
    let Some(idx) = resolved.rfind(MARKER) else {
        return BundlerCacheDemotion::NotApplicable;
    };
    let after = &resolved[idx + MARKER.len()..];

    // `after` is `<pkg-or-scope>[/<name>]/<subpath...>`. A scoped package
    // consumes two segments (`@scope/name`), an unscoped one consumes one.
    let parsed = if after.starts_with('@') {
        let mut it = after.splitn(3, '/');
        it.next(); // scope
        it.next(); // name
        it.next()
    } else {
        after.split_once('/').map(|(_name, rest)| rest)
    };

    match parsed {
        Some(rest) if !rest.is_empty() => BundlerCacheDemotion::Demoted(format!(
            "{}/{}",
            ctx.external_cdn_base.trim_end_matches('/'),
            rest
        )),
        _ => BundlerCacheDemotion::Unparseable,
    }
}

/// Splice quoted-literal byte-ranges in `source`, rewriting each one's inner
/// specifier and leaving everything else untouched. Shared by both the
/// lexer and regex passes.
pub(crate) fn splice(source: &str, mut spans: Vec<(usize, usize)>, ctx: &RewriteContext) -> String {
    spans.sort_by_key(|(start, _)| *start);
    spans.dedup();

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0usize;
    for (start, end) in spans {
        if start < cursor {
            continue; // overlapping span; keep first, drop the rest
        }
        out.push_str(&source[cursor..start]);
        out.push_str(&rewrite_quoted_literal(&source[start..end], ctx));
        cursor = end;
    }
    out.push_str(&source[cursor..]);
    out
}

/// `raw` includes the surrounding quote characters. Rewrite the specifier
/// inside while preserving the original quote style.
fn rewrite_quoted_literal(raw: &str, ctx: &RewriteContext) -> String {
    let Some(quote) = raw.chars().next() else {
        return raw.to_string();
    };
    if raw.len() < 2 || !raw.ends_with(quote) {
        return raw.to_string();
    }
    let inner = &raw[1..raw.len() - 1];
    let rewritten = rewrite_specifier(inner, ctx);
    format!("{quote}{rewritten}{quote}")
}
