//! v-html: sets `innerHTML`, replacing the element's children.

use gesso_atelier_core::transform::{DirectiveTransformResult, TransformContext};
use gesso_relief::ast::*;
use gesso_relief::errors::ErrorCode;

pub fn transform_v_html<'a>(
    dir: &DirectiveNode<'a>,
    el: &mut ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> DirectiveTransformResult<'a> {
    let allocator = ctx.allocator;
    if dir.exp.is_none() {
        ctx.report(ErrorCode::VHtmlNoExpression, Some(dir.loc.clone()));
    }
    if !el.children.is_empty() {
        ctx.report(ErrorCode::VHtmlWithChildren, Some(dir.loc.clone()));
        el.children.clear();
    }
    let value = match &dir.exp {
        Some(exp) => JsChildNode::from_expression(exp.clone_in(allocator)),
        None => JsChildNode::string(allocator, ""),
    };
    DirectiveTransformResult::with_prop(
        allocator,
        Property {
            key: ExpressionNode::simple(
                allocator,
                SimpleExpressionNode::new("innerHTML", true, dir.loc.clone()),
            ),
            value,
            loc: dir.loc.clone(),
        },
    )
}
