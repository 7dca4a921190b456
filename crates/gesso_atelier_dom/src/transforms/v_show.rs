//! v-show: a runtime directive toggling `display`.

use gesso_atelier_core::transform::{DirectiveTransformResult, TransformContext};
use gesso_relief::ast::{DirectiveNode, ElementNode, RuntimeDirective, RuntimeHelper};
use gesso_relief::errors::ErrorCode;

pub fn transform_show<'a>(
    dir: &DirectiveNode<'a>,
    _el: &mut ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> DirectiveTransformResult<'a> {
    if dir.exp.is_none() {
        ctx.report(ErrorCode::VShowNoExpression, Some(dir.loc.clone()));
    }
    let mut result = DirectiveTransformResult::empty(ctx.allocator);
    result.need_runtime = Some(RuntimeDirective::Helper(ctx.helper(RuntimeHelper::VShow)));
    result
}
