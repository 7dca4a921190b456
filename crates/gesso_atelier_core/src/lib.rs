//! Atelier Core - The transform and codegen workshop for Gesso templates.
//!
//! Takes the AST produced by [`gesso_armature`], runs an ordered pipeline of
//! node and directive transforms over it, and renders the result into a
//! JavaScript render function.
//!
//! ```
//! use gesso_atelier_core::compile;
//! use gesso_carton::Bump;
//! use gesso_relief::options::CompilerOptions;
//!
//! let allocator = Bump::new();
//! let result = compile(&allocator, "<p>{{ msg }}</p>", &CompilerOptions::module()).unwrap();
//! assert!(result.code.contains("_toDisplayString(_ctx.msg)"));
//! ```

pub mod codegen;
pub mod transform;
pub mod transforms;

pub use codegen::{generate, CodegenResult, LineColumn, Mapping};
pub use transform::{
    transform, DirectiveTransform, DirectiveTransformResult, NodeAction, NodeTransform,
    TransformContext, TransformOutput, TransformPipeline,
};
pub use transforms::base_transform_pipeline;

pub use gesso_relief::{ast, errors, options};

use gesso_armature::parse_with_options;
use gesso_carton::{Bump, String};
use gesso_relief::ast::RuntimeHelper;
use gesso_relief::errors::{CompileError, CompilerError};
use gesso_relief::options::{CodegenMode, CompilerOptions};

/// Output of a full compilation
#[derive(Debug, Clone)]
pub struct CompileResult {
    /// Complete program: preamble followed by the render function
    pub code: std::string::String,
    pub preamble: std::string::String,
    pub helpers: Vec<RuntimeHelper>,
    pub hoist_count: usize,
    pub cache_count: u32,
    pub map: Option<std::string::String>,
    /// Recoverable diagnostics from parsing and transforming
    pub errors: Vec<CompilerError>,
    /// Free identifiers the template reads from the render context
    pub references: Vec<String>,
}

/// Compile a template with the base pipeline.
pub fn compile<'a>(
    allocator: &'a Bump,
    source: &'a str,
    options: &CompilerOptions,
) -> Result<CompileResult, CompileError> {
    compile_with_pipeline(allocator, source, options, &base_transform_pipeline())
}

/// Compile a template with a custom pipeline.
///
/// Options are validated before anything is parsed. Parse errors stop the
/// compilation unless `best_effort` is set, in which case they are returned
/// alongside the code.
pub fn compile_with_pipeline<'a>(
    allocator: &'a Bump,
    source: &'a str,
    options: &CompilerOptions,
    pipeline: &TransformPipeline,
) -> Result<CompileResult, CompileError> {
    options.validate()?;

    let mut transform_options = options.transform.clone();
    let mut codegen_options = options.codegen.clone();
    // Module output has no `with` block, so identifiers must be prefixed
    let prefix = transform_options.prefix_identifiers
        || codegen_options.prefix_identifiers
        || codegen_options.mode == CodegenMode::Module;
    transform_options.prefix_identifiers = prefix;
    codegen_options.prefix_identifiers = prefix;

    let (mut root, parse_errors) = parse_with_options(allocator, source, options.parser.clone());
    let mut errors: Vec<CompilerError> = parse_errors.into_iter().collect();
    tracing::debug!(
        children = root.children.len(),
        errors = errors.len(),
        "parse finished"
    );
    if !errors.is_empty() && !options.best_effort {
        return Err(CompileError::Parse(errors));
    }

    let output = transform(allocator, &mut root, &transform_options, pipeline).map_err(|err| {
        tracing::warn!(%err, "transform aborted");
        err
    })?;
    errors.extend(output.errors);

    let generated = generate(&root, &codegen_options).map_err(|err| {
        tracing::warn!(%err, "codegen aborted");
        err
    })?;

    Ok(CompileResult {
        code: generated.code,
        preamble: generated.preamble,
        helpers: generated.helpers,
        hoist_count: generated.hoist_count,
        cache_count: generated.cache_count,
        map: generated.map,
        errors,
        references: root.references.iter().cloned().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesso_relief::errors::{ConfigError, ErrorCode};

    #[test]
    fn test_invalid_options_fail_before_parsing() {
        let allocator = Bump::new();
        let mut options = CompilerOptions::default();
        options.transform.cache_handlers = true;
        let err = compile(&allocator, "<div", &options).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Config(ConfigError::CacheHandlersRequirePrefix)
        ));
    }

    #[test]
    fn test_parse_errors_stop_compilation() {
        let allocator = Bump::new();
        let err = compile(&allocator, "<div>", &CompilerOptions::module()).unwrap_err();
        let CompileError::Parse(errors) = err else {
            panic!("expected parse error, got {:?}", err);
        };
        assert_eq!(errors[0].code, ErrorCode::MissingEndTag);
    }

    #[test]
    fn test_best_effort_keeps_going() {
        let allocator = Bump::new();
        let options = CompilerOptions {
            best_effort: true,
            ..CompilerOptions::module()
        };
        let result = compile(&allocator, "<div>{{ msg }}", &options).unwrap();
        assert_eq!(result.errors.len(), 1);
        assert!(result.code.contains("_toDisplayString(_ctx.msg)"));
    }

    #[test]
    fn test_module_mode_implies_prefixing() {
        let allocator = Bump::new();
        let mut options = CompilerOptions::default();
        options.codegen.mode = CodegenMode::Module;
        let result = compile(&allocator, "<div :id=\"id\"></div>", &options).unwrap();
        assert!(result.code.contains("id: _ctx.id"));
        assert!(!result.code.contains("with (_ctx)"));
        assert_eq!(result.references, [String::from("id")]);
    }
}
