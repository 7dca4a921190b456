//! Text transform.
//!
//! Adjacent text and interpolations are merged into one compound expression.
//! Wherever text sits next to other vnodes it becomes a `createTextVNode`
//! call, so every child of a vnode array is itself a vnode. The lone text
//! child of a plain element is left as is. A merged run that makes up the
//! whole root becomes an inline text call, rendered as the bare expression.

use gesso_carton::{PatchFlags, String, Vec};
use gesso_relief::ast::*;

use crate::transform::{NodeAction, NodeTransform, SiblingCursor, TransformContext};

pub struct TransformText;

impl NodeTransform for TransformText {
    fn name(&self) -> &'static str {
        "text"
    }

    fn enter<'a>(
        &self,
        node: &mut TemplateChildNode<'a>,
        _cursor: &mut SiblingCursor<'_, 'a>,
        _ctx: &mut TransformContext<'a>,
    ) -> NodeAction<'a> {
        if !matches!(node, TemplateChildNode::Element(_)) {
            return NodeAction::Continue;
        }
        NodeAction::exit(|node, ctx| {
            let TemplateChildNode::Element(el) = node else {
                return;
            };
            let keeps_single = el.tag_type == ElementType::Element && !has_custom_directive(el);
            transform_children(&mut el.children, keeps_single, ctx);
        })
    }

    fn exit_root<'a>(&self, root: &mut RootNode<'a>, ctx: &mut TransformContext<'a>) {
        transform_children(&mut root.children, true, ctx);
        if let [child @ TemplateChildNode::CompoundExpression(_)] = root.children.as_mut_slice() {
            let TemplateChildNode::CompoundExpression(compound) =
                std::mem::replace(child, TemplateChildNode::Hoisted(0))
            else {
                return;
            };
            let loc = compound.loc.clone();
            *child = TemplateChildNode::TextCall(ctx.alloc(TextCallNode {
                content: TextCallContent::Compound(compound),
                loc,
                codegen_node: Some(TextCallCodegenNode::Inline),
            }));
        }
    }
}

/// A user directive needs a real vnode to bind to, text included
fn has_custom_directive(el: &ElementNode<'_>) -> bool {
    el.directive_results.iter().any(|d| {
        matches!(
            &d.runtime,
            Some(DirectiveArgumentNode {
                directive: RuntimeDirective::Resolved(_),
                ..
            })
        )
    })
}

fn transform_children<'a>(
    children: &mut Vec<'a, TemplateChildNode<'a>>,
    keeps_single: bool,
    ctx: &mut TransformContext<'a>,
) {
    if !merge_adjacent_text(children, ctx) {
        return;
    }
    if keeps_single && children.len() == 1 {
        return;
    }
    wrap_text_calls(children, ctx);
}

/// Merge runs and turn every text-like child into a `createTextVNode` call.
pub(crate) fn create_text_calls<'a>(
    children: &mut Vec<'a, TemplateChildNode<'a>>,
    ctx: &mut TransformContext<'a>,
) {
    if merge_adjacent_text(children, ctx) {
        wrap_text_calls(children, ctx);
    }
}

/// Join every run of adjacent text and interpolations into a compound
/// expression. Returns whether any text-like child exists.
fn merge_adjacent_text<'a>(
    children: &mut Vec<'a, TemplateChildNode<'a>>,
    ctx: &mut TransformContext<'a>,
) -> bool {
    let allocator = ctx.allocator;
    let mut has_text = false;
    let mut i = 0;
    while i < children.len() {
        if !is_text(&children[i]) {
            i += 1;
            continue;
        }
        has_text = true;
        let mut end = i + 1;
        while end < children.len() && is_text(&children[end]) {
            end += 1;
        }
        if end - i > 1 {
            let run: std::vec::Vec<_> = children.drain(i..end).collect();
            let compound = merge_run(run, allocator);
            children.insert(i, TemplateChildNode::CompoundExpression(ctx.alloc(compound)));
        }
        i += 1;
    }
    has_text
}

fn is_text(node: &TemplateChildNode<'_>) -> bool {
    matches!(node, TemplateChildNode::Text(_) | TemplateChildNode::Interpolation(_))
}

/// `a + " + " + b` for a run of at least two text-like nodes
fn merge_run<'a>(
    run: std::vec::Vec<TemplateChildNode<'a>>,
    allocator: &'a gesso_carton::Bump,
) -> CompoundExpressionNode<'a> {
    let first = run.first().map(|n| n.loc().clone()).unwrap_or_default();
    let last = run.last().map(|n| n.loc().clone()).unwrap_or_default();
    let mut source = String::default();
    for node in run.iter() {
        source.push_str(&node.loc().source);
    }
    let mut compound =
        CompoundExpressionNode::new(allocator, SourceLocation::join(&first, &last, source));

    for (index, node) in run.into_iter().enumerate() {
        if index > 0 {
            compound
                .children
                .push(CompoundExpressionChild::String(String::from(" + ")));
        }
        match node {
            TemplateChildNode::Text(text) => compound.children.push(CompoundExpressionChild::Text(text)),
            TemplateChildNode::Interpolation(interpolation) => compound
                .children
                .push(CompoundExpressionChild::Interpolation(interpolation)),
            _ => {}
        }
    }
    compound
}

fn wrap_text_calls<'a>(children: &mut Vec<'a, TemplateChildNode<'a>>, ctx: &mut TransformContext<'a>) {
    for child in children.iter_mut() {
        if !child.is_text_like() {
            continue;
        }
        let taken = std::mem::replace(child, TemplateChildNode::Hoisted(0));
        let loc = taken.loc().clone();
        let (content, const_type) = match taken {
            TemplateChildNode::Text(text) => (TextCallContent::Text(text), ConstantType::CanStringify),
            TemplateChildNode::Interpolation(i) => {
                let const_type = i.content.const_type();
                (TextCallContent::Interpolation(i), const_type)
            }
            TemplateChildNode::CompoundExpression(c) => {
                let const_type = c.const_type();
                (TextCallContent::Compound(c), const_type)
            }
            other => {
                *child = other;
                continue;
            }
        };
        let patch_flag = (const_type == ConstantType::NotConstant).then_some(PatchFlags::TEXT);
        ctx.helper(RuntimeHelper::CreateText);
        *child = TemplateChildNode::TextCall(ctx.alloc(TextCallNode {
            content,
            loc,
            codegen_node: Some(TextCallCodegenNode::CreateText { patch_flag }),
        }));
    }
}
