//! DOM-specific transforms layered on top of the base pipeline.

pub mod transform_style;
pub mod v_html;
pub mod v_model;
pub mod v_on;
pub mod v_show;
pub mod v_text;

pub use transform_style::TransformStyle;

use gesso_atelier_core::transform::{DirectiveTransformResult, TransformContext, TransformPipeline};
use gesso_atelier_core::transforms::base_transform_pipeline;
use gesso_relief::ast::{DirectiveNode, ElementNode};

/// Base pipeline plus the DOM directives. Static styles are normalized
/// before any other transform sees the element.
pub fn dom_transform_pipeline() -> TransformPipeline {
    base_transform_pipeline()
        .prepend_node_transform(TransformStyle)
        .with_directive_transform("cloak", transform_cloak)
        .with_directive_transform("html", v_html::transform_v_html)
        .with_directive_transform("text", v_text::transform_v_text)
        .with_directive_transform("model", v_model::transform_model)
        .with_directive_transform("on", v_on::transform_on)
        .with_directive_transform("show", v_show::transform_show)
}

/// `v-cloak` is removed by the runtime stylesheet, nothing to generate.
fn transform_cloak<'a>(
    _dir: &DirectiveNode<'a>,
    _el: &mut ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> DirectiveTransformResult<'a> {
    DirectiveTransformResult::empty(ctx.allocator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_runs_first() {
        let names = dom_transform_pipeline().node_transform_names();
        assert_eq!(names[0], "style");
        assert_eq!(names.len(), 11);
    }

    #[test]
    fn test_directives_registered() {
        let pipeline = dom_transform_pipeline();
        for name in ["bind", "cloak", "html", "model", "on", "show", "text"] {
            assert!(pipeline.directive_transform(name).is_some(), "{}", name);
        }
    }
}
