//! v-if / v-else-if / v-else transform.
//!
//! A `v-if` element becomes an [`IfNode`] holding its first branch. Later
//! `v-else-if` and `v-else` siblings are pulled into the same node when they
//! are visited: their branch is traversed in place, lowered, and appended as
//! the alternate of the deepest conditional, so the else branch always ends
//! the chain.

use gesso_carton::{format_compact, PatchFlags, String};
use gesso_relief::ast::*;
use gesso_relief::errors::ErrorCode;

use crate::transform::{
    traverse_children, NodeAction, NodeTransform, ParentKind, SiblingCursor, TransformContext,
};
use crate::transforms::props::{inject_codegen_prop, inject_prop, key_property};
use crate::transforms::slots::is_slot_template;
use crate::transforms::transform_expression::process_expression_node;
use crate::transforms::transform_text::create_text_calls;

pub struct TransformIf;

impl NodeTransform for TransformIf {
    fn name(&self) -> &'static str {
        "v-if"
    }

    fn enter<'a>(
        &self,
        node: &mut TemplateChildNode<'a>,
        cursor: &mut SiblingCursor<'_, 'a>,
        ctx: &mut TransformContext<'a>,
    ) -> NodeAction<'a> {
        let TemplateChildNode::Element(el) = node else {
            return NodeAction::Continue;
        };
        // Conditional slots are built by the slots lowering
        if is_slot_template(el, ctx) {
            return NodeAction::Continue;
        }
        let found = el.props.iter().enumerate().find_map(|(i, p)| match p {
            PropNode::Directive(d) if matches!(d.name.as_str(), "if" | "else-if" | "else") => {
                Some((d.name.clone(), i))
            }
            _ => None,
        });
        match found {
            Some((name, index)) if name == "if" => start_chain(node, index, cursor, ctx),
            Some((name, index)) => extend_chain(node, index, name == "else", cursor, ctx),
            None => NodeAction::Continue,
        }
    }
}

/// Total branches of the `v-if` chains preceding the cursor, so keys stay
/// unique among siblings.
fn key_base(cursor: &SiblingCursor<'_, '_>) -> usize {
    (0..cursor.index())
        .filter_map(|i| cursor.sibling(i))
        .map(|n| match n {
            TemplateChildNode::If(if_node) => if_node.branches.len(),
            _ => 0,
        })
        .sum()
}

fn start_chain<'a>(
    node: &mut TemplateChildNode<'a>,
    index: usize,
    cursor: &mut SiblingCursor<'_, 'a>,
    ctx: &mut TransformContext<'a>,
) -> NodeAction<'a> {
    let key = key_base(cursor);
    let TemplateChildNode::Element(el) = node else {
        return NodeAction::Continue;
    };
    let condition = take_condition(el, index, ctx);
    let loc = el.loc.clone();

    let element = std::mem::replace(node, TemplateChildNode::Hoisted(0));
    let branch = create_branch(ctx, Some(condition), element);
    let mut if_node = IfNode::new(ctx.allocator, loc);
    if_node.branches.push(branch);
    *node = TemplateChildNode::If(ctx.alloc(if_node));

    NodeAction::exit(move |node, ctx| {
        let TemplateChildNode::If(if_node) = node else {
            return;
        };
        let Some(branch) = if_node.branches.first_mut() else {
            return;
        };
        let consequent = lower_branch(branch, key, ctx);
        let cond = conditional(branch, consequent, ctx);
        if_node.codegen_node = Some(IfCodegenNode::Conditional(ctx.alloc(cond)));
    })
}

fn extend_chain<'a>(
    node: &mut TemplateChildNode<'a>,
    index: usize,
    is_else: bool,
    cursor: &mut SiblingCursor<'_, 'a>,
    ctx: &mut TransformContext<'a>,
) -> NodeAction<'a> {
    // Comments and whitespace between branches are dropped
    while let Some(prev) = cursor.previous() {
        if matches!(prev, TemplateChildNode::Comment(_)) || prev.is_whitespace_text() {
            cursor.remove_previous();
        } else {
            break;
        }
    }

    let TemplateChildNode::Element(el) = node else {
        return NodeAction::Continue;
    };
    let adjacent = matches!(cursor.previous(), Some(TemplateChildNode::If(n)) if !n.has_else());
    if !adjacent {
        ctx.report(ErrorCode::VElseNoAdjacentIf, Some(el.loc.clone()));
        return NodeAction::Remove;
    }

    let condition = if is_else {
        el.remove_prop(index);
        None
    } else {
        Some(take_condition(el, index, ctx))
    };
    let element = std::mem::replace(node, TemplateChildNode::Hoisted(0));
    let mut branch = create_branch(ctx, condition, element);

    ctx.enter_parent(ParentKind::IfBranch);
    traverse_children(&mut branch.children, ctx);
    ctx.exit_parent();

    let key = key_base(cursor);
    let Some(TemplateChildNode::If(if_node)) = cursor.previous_mut() else {
        return NodeAction::Remove;
    };
    if let Some(user_key) = &branch.user_key {
        if if_node
            .branches
            .iter()
            .any(|b| b.user_key.as_ref() == Some(user_key))
        {
            ctx.report(ErrorCode::VIfSameKey, Some(branch.loc.clone()));
        }
    }

    let consequent = lower_branch(&mut branch, key, ctx);
    let alternate = if branch.condition.is_some() {
        let cond = conditional(&branch, consequent, ctx);
        JsChildNode::Conditional(ctx.alloc(cond))
    } else {
        consequent
    };
    match &mut if_node.codegen_node {
        Some(IfCodegenNode::Conditional(cond)) => attach_alternate(cond, alternate),
        Some(IfCodegenNode::Cache(cache)) => {
            if let JsChildNode::Conditional(cond) = &mut cache.value {
                attach_alternate(cond, alternate);
            }
        }
        None => {}
    }
    if_node.branches.push(branch);
    NodeAction::Remove
}

/// Remove the condition directive and analyse its expression.
fn take_condition<'a>(
    el: &mut ElementNode<'a>,
    index: usize,
    ctx: &mut TransformContext<'a>,
) -> ExpressionNode<'a> {
    let allocator = ctx.allocator;
    let PropNode::Directive(mut dir) = el.remove_prop(index) else {
        return ExpressionNode::simple(
            allocator,
            SimpleExpressionNode::code("true", ConstantType::CanStringify),
        );
    };
    match dir.exp.take() {
        Some(mut exp) if !is_blank(&exp) => {
            process_expression_node(&mut exp, ctx);
            exp
        }
        _ => {
            ctx.report(ErrorCode::VIfNoExpression, Some(dir.loc.clone()));
            ExpressionNode::simple(
                allocator,
                SimpleExpressionNode::code("true", ConstantType::CanStringify),
            )
        }
    }
}

fn is_blank(exp: &ExpressionNode<'_>) -> bool {
    matches!(exp, ExpressionNode::Simple(s) if s.content.trim().is_empty())
}

fn create_branch<'a>(
    ctx: &TransformContext<'a>,
    condition: Option<ExpressionNode<'a>>,
    mut element: TemplateChildNode<'a>,
) -> IfBranchNode<'a> {
    let loc = element.loc().clone();
    let mut branch = IfBranchNode::new(ctx.allocator, condition, loc);
    if let TemplateChildNode::Element(el) = &mut element {
        branch.user_key = user_key(el);
        if el.tag_type == ElementType::Template && !el.has_dir("for") {
            branch.is_template_if = true;
            branch.children = std::mem::replace(
                &mut el.children,
                gesso_carton::Vec::new_in(ctx.allocator),
            );
            return branch;
        }
    }
    branch.children.push(element);
    branch
}

fn user_key(el: &ElementNode<'_>) -> Option<String> {
    match el.find_prop("key", true)? {
        PropNode::Attribute(attr) => Some(
            attr.value
                .as_ref()
                .map(|v| v.content.clone())
                .unwrap_or_default(),
        ),
        PropNode::Directive(dir) => dir.exp.as_ref().map(|e| e.loc().source.clone()),
    }
}

/// `test ? consequent : _createCommentVNode("v-if", true)`
fn conditional<'a>(
    branch: &IfBranchNode<'a>,
    consequent: JsChildNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> ConditionalExpression<'a> {
    let allocator = ctx.allocator;
    let test = match &branch.condition {
        Some(cond) => JsChildNode::from_expression(cond.clone_in(allocator)),
        None => JsChildNode::code(allocator, "true", ConstantType::CanStringify),
    };
    let mut comment = CallExpression::new(
        allocator,
        Callee::Symbol(ctx.helper(RuntimeHelper::CreateComment)),
        SourceLocation::STUB,
    );
    comment
        .arguments
        .push(CallArgument::Raw(String::from("\"v-if\"")));
    comment.arguments.push(CallArgument::Raw(String::from("true")));
    ConditionalExpression {
        test,
        consequent,
        alternate: JsChildNode::Call(ctx.alloc(comment)),
        newline: true,
        loc: branch.loc.clone(),
    }
}

fn attach_alternate<'a>(cond: &mut ConditionalExpression<'a>, alternate: JsChildNode<'a>) {
    match &mut cond.alternate {
        JsChildNode::Conditional(next) => attach_alternate(next, alternate),
        slot => *slot = alternate,
    }
}

/// Codegen node rendering one branch, keyed by its position in the chain.
fn lower_branch<'a>(
    branch: &mut IfBranchNode<'a>,
    key: usize,
    ctx: &mut TransformContext<'a>,
) -> JsChildNode<'a> {
    let allocator = ctx.allocator;
    let mut children =
        std::mem::replace(&mut branch.children, gesso_carton::Vec::new_in(allocator));

    let renders_itself = children.len() == 1
        && matches!(
            children[0],
            TemplateChildNode::Element(_) | TemplateChildNode::For(_)
        );
    if renders_itself {
        if let Some(mut child) = children.pop() {
            match &mut child {
                TemplateChildNode::Element(el) => {
                    if let Some(codegen) = el.codegen_node.as_mut() {
                        if let Some(vnode) = block_vnode_mut(codegen) {
                            ctx.make_block(vnode);
                        }
                        let prop = branch_key(key, ctx);
                        inject_codegen_prop(codegen, prop, ctx);
                    }
                }
                TemplateChildNode::For(for_node) => {
                    if let Some(ForCodegenNode::VNodeCall(vnode)) = &mut for_node.codegen_node {
                        inject_key(vnode, key, ctx);
                    }
                }
                _ => {}
            }
            return JsChildNode::TemplateChild(child);
        }
    }

    create_text_calls(&mut children, ctx);
    let mut fragment = VNodeCall::new(
        VNodeTag::Symbol(ctx.helper(RuntimeHelper::Fragment)),
        branch.loc.clone(),
    );
    fragment.children = Some(VNodeChildren::Multiple(children));
    fragment.patch_flag = Some(PatchFlags::STABLE_FRAGMENT);
    inject_key(&mut fragment, key, ctx);
    ctx.helper(RuntimeHelper::vnode(false));
    ctx.make_block(&mut fragment);
    JsChildNode::VNodeCall(ctx.alloc(fragment))
}

/// The vnode an element renders, looking through a `withMemo` wrapper.
pub(crate) fn block_vnode_mut<'b, 'a>(
    codegen: &'b mut ElementCodegenNode<'a>,
) -> Option<&'b mut VNodeCall<'a>> {
    match codegen {
        ElementCodegenNode::VNodeCall(vnode) => Some(vnode),
        ElementCodegenNode::Call(call) if call.callee == Callee::Symbol(RuntimeHelper::WithMemo) => {
            match call.arguments.get_mut(1) {
                Some(CallArgument::Node(JsChildNode::Function(f))) => match &mut f.returns {
                    Some(FunctionReturns::JsChild(JsChildNode::VNodeCall(vnode))) => Some(vnode),
                    _ => None,
                },
                _ => None,
            }
        }
        _ => None,
    }
}

/// Add `key: <key>` to the vnode props unless a key is already there.
fn inject_key<'a>(vnode: &mut VNodeCall<'a>, key: usize, ctx: &mut TransformContext<'a>) {
    let prop = branch_key(key, ctx);
    vnode.props = Some(inject_prop(vnode.props.take(), prop, ctx));
}

fn branch_key<'a>(key: usize, ctx: &TransformContext<'a>) -> Property<'a> {
    let allocator = ctx.allocator;
    key_property(
        JsChildNode::code(allocator, format_compact!("{}", key), ConstantType::CanCache),
        allocator,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::transform;
    use crate::transforms::base_transform_pipeline;
    use gesso_armature::parse;
    use gesso_carton::Bump;
    use gesso_relief::errors::CompilerError;
    use gesso_relief::options::TransformOptions;

    fn run<'a>(allocator: &'a Bump, src: &'a str) -> (RootNode<'a>, Vec<CompilerError>) {
        let (mut root, _) = parse(allocator, src);
        let output = transform(
            allocator,
            &mut root,
            &TransformOptions::default(),
            &base_transform_pipeline(),
        )
        .unwrap();
        (root, output.errors)
    }

    fn root_if<'r, 'a>(root: &'r RootNode<'a>) -> &'r IfNode<'a> {
        match &root.codegen_node {
            Some(JsChildNode::TemplateChild(TemplateChildNode::If(if_node))) => if_node,
            other => panic!("expected if root, got {:?}", other),
        }
    }

    #[test]
    fn test_chain_collects_branches() {
        let allocator = Bump::new();
        let (root, errors) = run(
            &allocator,
            "<div v-if=\"a\">a</div>\n<!-- c -->\n<p v-else-if=\"b\">b</p><span v-else>c</span>",
        );
        assert!(errors.is_empty());
        let if_node = root_if(&root);
        assert_eq!(if_node.branches.len(), 3);
        assert!(if_node.has_else());
    }

    #[test]
    fn test_else_is_last_alternate() {
        let allocator = Bump::new();
        let (root, _) = run(
            &allocator,
            "<div v-if=\"a\"/><p v-else-if=\"b\"/><span v-else/>",
        );
        let Some(IfCodegenNode::Conditional(outer)) = &root_if(&root).codegen_node else {
            panic!("expected conditional");
        };
        let JsChildNode::Conditional(inner) = &outer.alternate else {
            panic!("expected nested conditional");
        };
        assert!(matches!(
            &inner.alternate,
            JsChildNode::TemplateChild(TemplateChildNode::Element(el)) if el.tag == "span"
        ));
    }

    #[test]
    fn test_else_without_if() {
        let allocator = Bump::new();
        let (root, errors) = run(&allocator, "<div/><p v-else/>");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::VElseNoAdjacentIf);
        assert!(root.codegen_node.is_some());
    }

    #[test]
    fn test_missing_condition() {
        let allocator = Bump::new();
        let (_, errors) = run(&allocator, "<div v-if></div>");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::VIfNoExpression);
    }

    #[test]
    fn test_same_key() {
        let allocator = Bump::new();
        let (_, errors) = run(&allocator, "<div v-if=\"a\" key=\"x\"/><p v-else key=\"x\"/>");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::VIfSameKey);
    }

    #[test]
    fn test_branch_keys_injected() {
        let allocator = Bump::new();
        let (root, _) = run(&allocator, "<div v-if=\"a\"/><p v-else/>");
        let Some(IfCodegenNode::Conditional(cond)) = &root_if(&root).codegen_node else {
            panic!("expected conditional");
        };
        for (branch, expected) in [(&cond.consequent, "0"), (&cond.alternate, "1")] {
            let JsChildNode::TemplateChild(TemplateChildNode::Element(el)) = branch else {
                panic!("expected element branch");
            };
            let Some(ElementCodegenNode::VNodeCall(vnode)) = &el.codegen_node else {
                panic!("expected vnode call");
            };
            assert!(vnode.is_block);
            let Some(PropsExpression::Object(obj)) = &vnode.props else {
                panic!("expected key props");
            };
            assert_eq!(obj.properties[0].static_key(), Some("key"));
            assert!(matches!(
                &obj.properties[0].value,
                JsChildNode::SimpleExpression(s) if s.content == expected
            ));
        }
    }

    #[test]
    fn test_template_branch_becomes_fragment() {
        let allocator = Bump::new();
        let (root, _) = run(&allocator, "<template v-if=\"ok\">a<b>b</b></template>");
        let Some(IfCodegenNode::Conditional(cond)) = &root_if(&root).codegen_node else {
            panic!("expected conditional");
        };
        let JsChildNode::VNodeCall(fragment) = &cond.consequent else {
            panic!("expected fragment");
        };
        assert!(matches!(fragment.tag, VNodeTag::Symbol(RuntimeHelper::Fragment)));
        assert_eq!(fragment.patch_flag, Some(PatchFlags::STABLE_FRAGMENT));
    }
}
