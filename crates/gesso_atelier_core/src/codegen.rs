//! Code generation for Gesso templates.
//!
//! Renders a transformed [`RootNode`] into a JavaScript render function.
//! Hoisted declarations are printed first with `/*#__PURE__*/` annotations,
//! then the function body. The helper preamble is written last, from the
//! helpers the two parts actually printed, so imports always match the code.

mod context;
mod expression;
mod helpers;
mod node;
mod vnode;

pub use context::{CodegenContext, CodegenResult, LineColumn, Mapping};

use gesso_carton::to_valid_asset_id;
use gesso_relief::ast::{RootNode, RuntimeHelper};
use gesso_relief::errors::InternalError;
use gesso_relief::options::{CodegenMode, CodegenOptions};

use expression::gen_js_child;
use helpers::js_string;

pub(crate) type GenResult = Result<(), InternalError>;

/// Generate the render function for a transformed root.
pub fn generate(root: &RootNode<'_>, options: &CodegenOptions) -> Result<CodegenResult, InternalError> {
    let mut ctx = CodegenContext::new(options.clone());
    let is_module = options.mode == CodegenMode::Module;

    ctx.pure = true;
    for (index, hoist) in root.hoists.iter().enumerate() {
        let Some(hoist) = hoist else {
            continue;
        };
        ctx.push(&format!("const _hoisted_{} = ", index + 1));
        gen_js_child(&mut ctx, hoist)?;
        ctx.terminate();
        ctx.push("\n");
    }
    ctx.pure = false;
    let hoists = ctx.take_segment();

    gen_render_function(&mut ctx, root, is_module)?;
    let body = ctx.take_segment();

    let helpers = ctx.helpers();
    let mut preamble = String::new();
    if !helpers.is_empty() {
        if is_module {
            let specifiers: Vec<_> = helpers
                .iter()
                .map(|h| format!("{} as _{}", h.name(), h.name()))
                .collect();
            preamble.push_str(&format!(
                "import {{ {} }} from {}\n",
                specifiers.join(", "),
                js_string(&options.runtime_module_name)
            ));
        } else {
            let specifiers: Vec<_> = helpers
                .iter()
                .map(|h| format!("{}: _{}", h.name(), h.name()))
                .collect();
            preamble.push_str(&format!(
                "const {{ {} }} = {}\n",
                specifiers.join(", "),
                options.runtime_global_name
            ));
        }
    }
    if is_module {
        for import in root.imports.iter() {
            preamble.push_str(&format!(
                "import {} from {}\n",
                import.exp,
                js_string(&import.path)
            ));
        }
    }
    if !hoists.code.is_empty() {
        preamble.push('\n');
    }
    let before_hoists = preamble.clone();
    preamble.push_str(&hoists.code);
    if !preamble.is_empty() {
        preamble.push('\n');
    }

    let map = if options.source_map {
        let mut mappings: Vec<Mapping> = hoists.placed_after(&before_hoists).collect();
        mappings.extend(body.placed_after(&preamble));
        serde_json::to_string(&mappings).ok()
    } else {
        None
    };

    tracing::debug!(
        helpers = helpers.len(),
        hoists = root.hoists.len(),
        cached = root.cached,
        "generated render function"
    );

    Ok(CodegenResult {
        code: format!("{}{}", preamble, body.code),
        preamble,
        helpers,
        hoist_count: root.hoists.len(),
        cache_count: root.cached,
        map,
    })
}

fn gen_render_function(
    ctx: &mut CodegenContext,
    root: &RootNode<'_>,
    is_module: bool,
) -> GenResult {
    let use_with = !is_module && !ctx.options.prefix_identifiers;
    ctx.push(if is_module { "export " } else { "return " });
    ctx.push("function render(_ctx, _cache) {");
    ctx.indent();
    if use_with {
        ctx.push("with (_ctx) {");
        ctx.indent();
    }

    gen_assets(ctx, &root.components, "component", RuntimeHelper::ResolveComponent);
    if !root.components.is_empty() && (!root.directives.is_empty() || root.temps > 0) {
        ctx.newline();
    }
    gen_assets(ctx, &root.directives, "directive", RuntimeHelper::ResolveDirective);
    if !root.directives.is_empty() && root.temps > 0 {
        ctx.newline();
    }
    if root.temps > 0 {
        let temps: Vec<_> = (0..root.temps).map(|i| format!("_temp{}", i)).collect();
        ctx.push(&format!("let {}", temps.join(", ")));
    }
    if !root.components.is_empty() || !root.directives.is_empty() || root.temps > 0 {
        ctx.terminate();
        ctx.push("\n");
        ctx.newline();
    }

    ctx.push("return ");
    match &root.codegen_node {
        Some(node) => gen_js_child(ctx, node)?,
        None => ctx.push("null"),
    }
    ctx.terminate();

    if use_with {
        ctx.deindent();
        ctx.push("}");
    }
    ctx.deindent();
    ctx.push("}");
    Ok(())
}

/// `const _component_foo = _resolveComponent("foo")` for each asset
fn gen_assets(
    ctx: &mut CodegenContext,
    assets: &[gesso_carton::String],
    kind: &str,
    resolver: RuntimeHelper,
) {
    for (i, name) in assets.iter().enumerate() {
        ctx.push(&format!("const {} = ", to_valid_asset_id(name, kind)));
        ctx.push_helper(resolver);
        ctx.push("(");
        ctx.push(&js_string(name));
        ctx.push(")");
        if i + 1 < assets.len() {
            ctx.end_statement();
        }
    }
}
