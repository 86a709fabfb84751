//! The fallback rewrite path: a regex pass covering exactly the three forms
//! treated as a correctness floor. Must never panic.

use crate::RewriteContext;
use once_cell::sync::Lazy;
use regex::Regex;

/// `from "..."` or bare `import "..."` — the two static forms. The optional
/// `from`-clause is matched lazily and excludes `;`/newline so it cannot
/// stray into a neighboring statement.
static STATIC_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s+(?:[^;\n]*?\s+from\s+)?("(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*')"#).unwrap()
});

/// `import("...")` with a string-literal argument. Expressions that are not
/// plain string literals (template strings, identifiers, ...) simply don't
/// match and are left untouched.
pub(crate) static DYNAMIC_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s*\(\s*("(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*')\s*\)"#).unwrap()
});

pub fn rewrite_regex(source: &str, ctx: &RewriteContext) -> String {
    let mut spans = Vec::new();
    for caps in STATIC_IMPORT_RE.captures_iter(source) {
        let lit = caps.get(1).unwrap();
        spans.push((lit.start(), lit.end()));
    }
    for caps in DYNAMIC_IMPORT_RE.captures_iter(source) {
        let lit = caps.get(1).unwrap();
        spans.push((lit.start(), lit.end()));
    }
    crate::splice(source, spans, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RewriteContext {
        RewriteContext::new("https://esm.sh")
    }

    #[test]
    fn rewrites_from_form() {
        let out = rewrite_regex(r#"import X from "react";"#, &ctx());
        assert!(out.contains(r#"from "https://esm.sh/react""#));
    }

    #[test]
    fn rewrites_bare_side_effect_import() {
        let out = rewrite_regex(r#"import "@pie-lib/render-ui/styles.css";"#, &ctx());
        assert!(out.contains(r#"import "/@pie-lib/render-ui/styles.css""#));
    }

    #[test]
    fn rewrites_dynamic_literal_import() {
        let out = rewrite_regex(r#"const m = import("react");"#, &ctx());
        assert!(out.contains(r#"import("https://esm.sh/react")"#));
    }

    #[test]
    fn leaves_non_literal_dynamic_import_untouched() {
        let src = "const m = import(path);";
        assert_eq!(rewrite_regex(src, &ctx()), src);
    }

    #[test]
    fn never_panics_on_garbage_input() {
        let garbage = "import ((((( from '\\'";
        let _ = rewrite_regex(garbage, &ctx());
    }
}
