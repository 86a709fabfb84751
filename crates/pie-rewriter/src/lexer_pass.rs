//! The normative rewrite path: parse with `oxc_parser` to get an
//! authoritative AST, then splice specifier byte-ranges directly in the
//! original source text. Splicing (rather than re-emitting via a codegen
//! crate) is what keeps the output "byte-identical except for specifier
//! strings" contract above.

use crate::RewriteContext;
use oxc_allocator::Allocator;
use oxc_ast::ast::Statement;
use oxc_parser::Parser;
use oxc_span::SourceType;

/// Returns `None` when the source fails to parse (caller should fall back
/// to the regex pass). A lexer *panic* is caught by the caller via
/// `catch_unwind`; this function only reports clean parse failures.
pub fn rewrite_lexer(source: &str, ctx: &RewriteContext) -> Option<String> {
    let allocator = Allocator::default();
    let source_type = SourceType::default().with_module(true);
    let parser_ret = Parser::new(&allocator, source, source_type).parse();

    if parser_ret.panicked || !parser_ret.errors.is_empty() {
        log_parse_errors(&parser_ret.errors);
        return None;
    }

    let mut spans = Vec::new();
    for stmt in &parser_ret.program.body {
        collect_static_specifier(stmt, &mut spans);
    }
    collect_dynamic_specifiers(source, &mut spans);

    Some(crate::splice(source, spans, ctx))
}

fn collect_static_specifier(stmt: &Statement, out: &mut Vec<(usize, usize)>) {
    use Statement::*;
    match stmt {
        ImportDeclaration(decl) => {
            out.push((decl.source.span.start as usize, decl.source.span.end as usize));
        }
        ExportNamedDeclaration(decl) => {
            if let Some(source) = &decl.source {
                out.push((source.span.start as usize, source.span.end as usize));
            }
        }
        ExportAllDeclaration(decl) => {
            out.push((decl.source.span.start as usize, decl.source.span.end as usize));
        }
        _ => {}
    }
}

/// Dynamic `import(...)` calls can appear anywhere in the expression tree;
/// locating them precisely requires a full AST visitor. We instead scan the
/// (already syntax-validated) source with the same literal-argument pattern
/// the regex fallback uses — safe here because we know the input parses.
fn collect_dynamic_specifiers(source: &str, out: &mut Vec<(usize, usize)>) {
    for caps in crate::regex_pass::DYNAMIC_IMPORT_RE.captures_iter(source) {
        let lit = caps.get(1).unwrap();
        out.push((lit.start(), lit.end()));
    }
}

/// The caller falls back to the regex pass on any parse error; log the
/// diagnostics here so a malformed source isn't silently demoted to the
/// regex floor with no trace of why.
fn log_parse_errors(errors: &[oxc_diagnostics::OxcDiagnostic]) {
    for error in errors {
        tracing::debug!(%error, "pie_rewriter: lexer pass rejected source, falling back to regex");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_static_import() {
        let ctx = RewriteContext::new("https://esm.sh");
        let out = rewrite_lexer(r#"import X from "react";"#, &ctx).unwrap();
        assert!(out.contains(r#"from "https://esm.sh/react""#));
    }

    #[test]
    fn rewrites_namespace_import() {
        let ctx = RewriteContext::new("https://esm.sh");
        let out = rewrite_lexer(r#"import x from "@pie-lib/render-ui";"#, &ctx).unwrap();
        assert!(out.contains(r#"from "/@pie-lib/render-ui""#));
    }

    #[test]
    fn leaves_non_literal_dynamic_import_untouched() {
        let ctx = RewriteContext::new("https://esm.sh");
        let src = "const m = import(path);";
        let out = rewrite_lexer(src, &ctx).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn rewrites_literal_dynamic_import() {
        let ctx = RewriteContext::new("https://esm.sh");
        let out = rewrite_lexer(r#"const m = import("react");"#, &ctx).unwrap();
        assert!(out.contains(r#"import("https://esm.sh/react")"#));
    }

    #[test]
    fn unparseable_source_returns_none() {
        let ctx = RewriteContext::new("https://esm.sh");
        assert!(rewrite_lexer("const x = {", &ctx).is_none());
    }
}
