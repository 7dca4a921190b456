//! v-text: sets `textContent`, replacing the element's children.

use gesso_atelier_core::transform::{DirectiveTransformResult, TransformContext};
use gesso_relief::ast::*;
use gesso_relief::errors::ErrorCode;

pub fn transform_v_text<'a>(
    dir: &DirectiveNode<'a>,
    el: &mut ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> DirectiveTransformResult<'a> {
    let allocator = ctx.allocator;
    if dir.exp.is_none() {
        ctx.report(ErrorCode::VTextNoExpression, Some(dir.loc.clone()));
    }
    if !el.children.is_empty() {
        ctx.report(ErrorCode::VTextWithChildren, Some(dir.loc.clone()));
        el.children.clear();
    }
    let value = match &dir.exp {
        // Constants are already strings or print as themselves
        Some(ExpressionNode::Simple(s)) if s.const_type > ConstantType::NotConstant => {
            JsChildNode::SimpleExpression(ctx.alloc((**s).clone()))
        }
        Some(exp) => {
            let helper = ctx.helper(RuntimeHelper::ToDisplayString);
            let mut call = CallExpression::new(allocator, Callee::Symbol(helper), dir.loc.clone());
            call.arguments
                .push(CallArgument::Node(JsChildNode::from_expression(exp.clone_in(allocator))));
            JsChildNode::Call(ctx.alloc(call))
        }
        None => JsChildNode::string(allocator, ""),
    };
    DirectiveTransformResult::with_prop(
        allocator,
        Property {
            key: ExpressionNode::simple(
                allocator,
                SimpleExpressionNode::new("textContent", true, dir.loc.clone()),
            ),
            value,
            loc: dir.loc.clone(),
        },
    )
}
