//! v-memo directive transform.
//!
//! Outside `v-for`, the element's vnode is built as a block and wrapped in
//! `withMemo(deps, () => vnode, _cache, slot)`. Inside `v-for` the directive
//! is taken by the v-for transform, which memoizes each iteration instead.

use gesso_carton::{format_compact, String};
use gesso_relief::ast::*;
use gesso_relief::errors::ErrorCode;

use crate::transform::{NodeAction, NodeTransform, SiblingCursor, TransformContext};
use crate::transforms::transform_expression::process_expression_node;

/// Check if element has v-memo directive
pub fn has_v_memo(el: &ElementNode<'_>) -> bool {
    el.has_dir("memo")
}

pub struct TransformMemo;

impl NodeTransform for TransformMemo {
    fn name(&self) -> &'static str {
        "v-memo"
    }

    fn enter<'a>(
        &self,
        node: &mut TemplateChildNode<'a>,
        _cursor: &mut SiblingCursor<'_, 'a>,
        ctx: &mut TransformContext<'a>,
    ) -> NodeAction<'a> {
        let TemplateChildNode::Element(el) = node else {
            return NodeAction::Continue;
        };
        if el.has_dir("for") {
            return NodeAction::Continue;
        }
        let Some(index) = el.find_dir_index("memo") else {
            return NodeAction::Continue;
        };
        let PropNode::Directive(mut dir) = el.remove_prop(index) else {
            return NodeAction::Continue;
        };
        let deps = dir
            .exp
            .take()
            .filter(|e| !matches!(e, ExpressionNode::Simple(s) if s.content.trim().is_empty()));
        let Some(mut deps) = deps else {
            ctx.report(ErrorCode::VMemoNoExpression, Some(dir.loc.clone()));
            return NodeAction::Continue;
        };
        process_expression_node(&mut deps, ctx);
        ctx.v_memo_depth += 1;

        NodeAction::exit(move |node, ctx| {
            ctx.v_memo_depth -= 1;
            let TemplateChildNode::Element(el) = node else {
                return;
            };
            let Some(ElementCodegenNode::VNodeCall(mut vnode)) = el.codegen_node.take() else {
                return;
            };
            if el.tag_type != ElementType::Component {
                ctx.make_block(&mut vnode);
            }
            let call = with_memo(deps, JsChildNode::VNodeCall(vnode), ctx);
            el.codegen_node = Some(ElementCodegenNode::Call(ctx.alloc(call)));
        })
    }
}

/// `_withMemo(deps, () => render, _cache, slot)`
fn with_memo<'a>(
    deps: ExpressionNode<'a>,
    render: JsChildNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> CallExpression<'a> {
    let allocator = ctx.allocator;
    let mut factory = FunctionExpression::new(allocator, SourceLocation::STUB);
    factory.returns = Some(FunctionReturns::JsChild(render));

    let mut call = CallExpression::new(
        allocator,
        Callee::Symbol(ctx.helper(RuntimeHelper::WithMemo)),
        SourceLocation::STUB,
    );
    call.arguments
        .push(CallArgument::Node(JsChildNode::from_expression(deps)));
    call.arguments
        .push(CallArgument::Node(JsChildNode::Function(ctx.alloc(factory))));
    call.arguments.push(CallArgument::Raw(String::from("_cache")));
    call.arguments.push(CallArgument::Raw(format_compact!(
        "{}",
        ctx.next_cache_slot()
    )));
    call
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::transform;
    use crate::transforms::base_transform_pipeline;
    use gesso_armature::parse;
    use gesso_carton::Bump;
    use gesso_relief::options::TransformOptions;

    #[test]
    fn test_has_v_memo() {
        let allocator = Bump::new();
        let (root, _) = parse(&allocator, r#"<div v-memo="[a]"></div>"#);
        let TemplateChildNode::Element(el) = &root.children[0] else {
            panic!("expected element");
        };
        assert!(has_v_memo(el));
    }

    #[test]
    fn test_wraps_block_in_with_memo() {
        let allocator = Bump::new();
        let (mut root, _) = parse(&allocator, r#"<div v-memo="[a, b]">{{ a }}</div>"#);
        transform(
            &allocator,
            &mut root,
            &TransformOptions::default(),
            &base_transform_pipeline(),
        )
        .unwrap();
        assert_eq!(root.cached, 1);
        assert!(root.helpers.contains(&RuntimeHelper::WithMemo));
        let Some(JsChildNode::TemplateChild(TemplateChildNode::Element(el))) = &root.codegen_node
        else {
            panic!("expected element root");
        };
        let Some(ElementCodegenNode::Call(call)) = &el.codegen_node else {
            panic!("expected withMemo call");
        };
        assert_eq!(call.callee, Callee::Symbol(RuntimeHelper::WithMemo));
        assert_eq!(call.arguments.len(), 4);
    }

    #[test]
    fn test_missing_deps() {
        let allocator = Bump::new();
        let (mut root, _) = parse(&allocator, r#"<div v-memo></div>"#);
        let output = transform(
            &allocator,
            &mut root,
            &TransformOptions::default(),
            &base_transform_pipeline(),
        )
        .unwrap();
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].code, ErrorCode::VMemoNoExpression);
    }
}
