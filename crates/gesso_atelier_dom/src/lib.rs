//! Gesso compiler for the DOM platform.
//!
//! Adds to the base pipeline:
//! - HTML tag tables and namespaces for the parser
//! - static `style` normalization
//! - v-model runtime directives for form elements
//! - v-on event modifiers
//! - v-show, v-html, v-text and v-cloak

pub mod options;
pub mod transforms;

pub use options::*;
pub use transforms::*;

pub use gesso_atelier_core::{ast, codegen, errors, transform, CompileResult};

use gesso_atelier_core::compile_with_pipeline;
use gesso_carton::Bump;
use gesso_relief::errors::CompileError;

/// Compile a template for the DOM with default options
pub fn compile_template<'a>(allocator: &'a Bump, source: &'a str) -> Result<CompileResult, CompileError> {
    compile(allocator, source, &DomCompilerOptions::default())
}

/// Compile a template for the DOM
pub fn compile<'a>(
    allocator: &'a Bump,
    source: &'a str,
    options: &DomCompilerOptions,
) -> Result<CompileResult, CompileError> {
    tracing::debug!(mode = ?options.mode, len = source.len(), "compiling DOM template");
    compile_with_pipeline(
        allocator,
        source,
        &options.to_compiler_options(),
        &dom_transform_pipeline(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesso_relief::errors::ErrorCode;

    fn module(src: &str) -> CompileResult {
        let allocator = Bump::new();
        let options = DomCompilerOptions {
            mode: gesso_relief::options::CodegenMode::Module,
            ..Default::default()
        };
        compile(&allocator, src, &options).unwrap()
    }

    #[test]
    fn test_compile_default_function_mode() {
        let allocator = Bump::new();
        let result = compile_template(&allocator, "<div>{{ msg }}</div>").unwrap();
        assert!(result.code.contains("return function render(_ctx, _cache) {"));
        assert!(result.code.contains("with (_ctx) {"));
    }

    #[test]
    fn test_custom_element_option() {
        let allocator = Bump::new();
        let source = r#"<div><my-widget a="1"/></div>"#;
        let result = compile(&allocator, source, &DomCompilerOptions::default()).unwrap();
        assert!(result.code.contains("_resolveComponent(\"my-widget\")"));

        let options = DomCompilerOptions {
            is_custom_element: Some(|tag| tag.starts_with("my-")),
            ..Default::default()
        };
        let result = compile(&allocator, source, &options).unwrap();
        assert!(!result.code.contains("_resolveComponent"));
    }

    #[test]
    fn test_v_html_replaces_children() {
        let result = module(r#"<div v-html="raw">ignored</div>"#);
        let codes: Vec<_> = result.errors.iter().map(|e| e.code).collect();
        assert_eq!(codes, [ErrorCode::VHtmlWithChildren]);
        assert!(result.code.contains("innerHTML: _ctx.raw"));
        assert!(!result.code.contains("ignored"));
    }

    #[test]
    fn test_v_text_wraps_in_display_string() {
        let result = module(r#"<div v-text="msg"></div>"#);
        assert!(result.errors.is_empty());
        assert!(result.code.contains("textContent: _toDisplayString(_ctx.msg)"));
    }

    #[test]
    fn test_v_cloak_is_dropped() {
        let result = module(r#"<div v-cloak>{{ a }}</div>"#);
        assert!(!result.code.contains("cloak"));
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_show_without_expression() {
        let result = module(r#"<div v-show></div>"#);
        assert_eq!(result.errors[0].code, ErrorCode::VShowNoExpression);
    }
}
