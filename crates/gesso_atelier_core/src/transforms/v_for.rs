//! v-for transform.
//!
//! The element is wrapped in a [`ForNode`] whose children are visited with
//! the aliases in scope. On exit the loop is lowered to a fragment block over
//! `renderList(source, (value, key, index) => child)`.

use gesso_armature::parse_for_expression;
use gesso_carton::{format_compact, PatchFlags, String, Vec};
use gesso_relief::ast::*;
use gesso_relief::errors::ErrorCode;

use crate::transform::{for_aliases, NodeAction, NodeTransform, SiblingCursor, TransformContext};
use crate::transforms::props::{inject_codegen_prop, inject_prop, key_property};
use crate::transforms::slots::is_slot_template;
use crate::transforms::transform_expression::process_expression_node;

pub struct TransformFor;

impl NodeTransform for TransformFor {
    fn name(&self) -> &'static str {
        "v-for"
    }

    fn enter<'a>(
        &self,
        node: &mut TemplateChildNode<'a>,
        _cursor: &mut SiblingCursor<'_, 'a>,
        ctx: &mut TransformContext<'a>,
    ) -> NodeAction<'a> {
        let allocator = ctx.allocator;
        let TemplateChildNode::Element(el) = node else {
            return NodeAction::Continue;
        };
        // Looped slots are built by the slots lowering; only the aliases are tracked here
        if is_slot_template(el, ctx) {
            return track_slot_aliases(el, ctx);
        }
        let Some(index) = el.find_dir_index("for") else {
            return NodeAction::Continue;
        };
        let PropNode::Directive(mut dir) = el.remove_prop(index) else {
            return NodeAction::Continue;
        };
        if dir.exp_content().is_none() {
            ctx.report(ErrorCode::VForNoExpression, Some(dir.loc.clone()));
            return NodeAction::Continue;
        }
        let parsed = dir.for_parse_result.take().or_else(|| {
            dir.exp
                .as_ref()
                .and_then(|e| e.as_simple())
                .and_then(|exp| parse_for_expression(allocator, exp))
        });
        let Some(mut parse_result) = parsed else {
            let loc = dir.exp.as_ref().map(|e| e.loc().clone());
            ctx.report(ErrorCode::VForMalformedExpression, loc);
            return NodeAction::Continue;
        };

        process_expression_node(&mut parse_result.source, ctx);
        let aliases = for_aliases(&parse_result);
        parse_result.finalized = true;

        let memo = take_memo(el, ctx).map(|mut memo| {
            ctx.push_scope(aliases.iter().cloned());
            process_expression_node(&mut memo, ctx);
            ctx.pop_scope();
            memo
        });

        if el.tag_type == ElementType::Template {
            for child in el.children.iter() {
                if let TemplateChildNode::Element(child) = child {
                    if let Some(key) = child.find_prop("key", true) {
                        ctx.report(ErrorCode::VForTemplateKeyPlacement, Some(key.loc().clone()));
                    }
                }
            }
        }

        let loc = el.loc.clone();
        let element = std::mem::replace(node, TemplateChildNode::Hoisted(0));
        let mut children = Vec::new_in(allocator);
        children.push(element);
        *node = TemplateChildNode::For(ctx.alloc(ForNode {
            parse_result,
            children,
            memo,
            loc,
            codegen_node: None,
        }));
        tracing::trace!(aliases = ?aliases, "v-for scope");

        NodeAction::exit(|node, ctx| {
            if let TemplateChildNode::For(for_node) = node {
                lower_for(for_node, ctx);
            }
        })
    }
}

/// Put the aliases of `<template v-for v-slot>` in scope for its contents.
fn track_slot_aliases<'a>(el: &mut ElementNode<'a>, ctx: &mut TransformContext<'a>) -> NodeAction<'a> {
    let allocator = ctx.allocator;
    let Some(index) = el.find_dir_index("for") else {
        return NodeAction::Continue;
    };
    let PropNode::Directive(dir) = &mut el.props[index] else {
        return NodeAction::Continue;
    };
    if dir.for_parse_result.is_none() {
        let parsed = dir
            .exp
            .as_ref()
            .and_then(|e| e.as_simple())
            .and_then(|exp| parse_for_expression(allocator, exp));
        dir.for_parse_result = parsed;
    }
    // Missing or malformed loops are reported when the slot is built
    let Some(parse_result) = dir.for_parse_result.as_mut() else {
        return NodeAction::Continue;
    };
    if !parse_result.finalized {
        process_expression_node(&mut parse_result.source, ctx);
        parse_result.finalized = true;
    }
    ctx.push_scope(for_aliases(parse_result));
    NodeAction::exit(|_node, ctx| ctx.pop_scope())
}

/// `v-memo` on the iterated element memoizes each iteration.
fn take_memo<'a>(
    el: &mut ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> Option<ExpressionNode<'a>> {
    let index = el.find_dir_index("memo")?;
    let PropNode::Directive(mut dir) = el.remove_prop(index) else {
        return None;
    };
    let exp = dir.exp.take();
    if exp.is_none() {
        ctx.report(ErrorCode::VMemoNoExpression, Some(dir.loc.clone()));
    }
    exp
}

/// Key value of the iterated element, as source for the generated code.
fn key_value<'a>(el: &ElementNode<'a>, ctx: &TransformContext<'a>) -> Option<JsChildNode<'a>> {
    match el.find_prop("key", true)? {
        PropNode::Attribute(attr) => Some(JsChildNode::string(
            ctx.allocator,
            attr.value.as_ref().map(|v| v.content.clone()).unwrap_or_default(),
        )),
        PropNode::Directive(dir) => dir
            .exp
            .as_ref()
            .map(|e| JsChildNode::from_expression(e.clone_in(ctx.allocator))),
    }
}

fn lower_for<'a>(for_node: &mut ForNode<'a>, ctx: &mut TransformContext<'a>) {
    let allocator = ctx.allocator;
    let Some(TemplateChildNode::Element(mut el)) = for_node.children.pop() else {
        return;
    };
    let is_stable = for_node.parse_result.source.const_type() > ConstantType::NotConstant;
    let key = key_value(&el, ctx);
    let fragment_flag = if is_stable {
        PatchFlags::STABLE_FRAGMENT
    } else if key.is_some() {
        PatchFlags::KEYED_FRAGMENT
    } else {
        PatchFlags::UNKEYED_FRAGMENT
    };
    let memo_key = for_node.memo.as_ref().and(key_value(&el, ctx));

    let child = if el.tag_type == ElementType::Template {
        let mut children = std::mem::replace(&mut el.children, Vec::new_in(allocator));
        let template_key = key.map(|value| key_property(value, allocator));
        if children.len() == 1 && matches!(children[0], TemplateChildNode::Element(_)) {
            let Some(TemplateChildNode::Element(mut only)) = children.pop() else {
                return;
            };
            if let (Some(prop), Some(codegen)) = (template_key, only.codegen_node.as_mut()) {
                inject_codegen_prop(codegen, prop, ctx);
            }
            set_child_block(&mut only, !is_stable, ctx);
            JsChildNode::TemplateChild(TemplateChildNode::Element(only))
        } else {
            let mut fragment = VNodeCall::new(
                VNodeTag::Symbol(ctx.helper(RuntimeHelper::Fragment)),
                el.loc.clone(),
            );
            if let Some(prop) = template_key {
                fragment.props = Some(inject_prop(None, prop, ctx));
            }
            fragment.children = Some(VNodeChildren::Multiple(children));
            fragment.patch_flag = Some(PatchFlags::STABLE_FRAGMENT);
            ctx.helper(RuntimeHelper::vnode(false));
            ctx.make_block(&mut fragment);
            JsChildNode::VNodeCall(ctx.alloc(fragment))
        }
    } else {
        set_child_block(&mut el, !is_stable, ctx);
        JsChildNode::TemplateChild(TemplateChildNode::Element(el))
    };

    let source = JsChildNode::from_expression(for_node.parse_result.source.clone_in(allocator));
    let mut render_list = CallExpression::new(
        allocator,
        Callee::Symbol(ctx.helper(RuntimeHelper::RenderList)),
        for_node.loc.clone(),
    );
    render_list.arguments.push(CallArgument::Node(source));

    let aliases = for_node.parse_result.alias_params();
    match for_node.memo.take() {
        Some(memo) => {
            let mut params: [Option<&str>; 4] = [None; 4];
            params[..3].copy_from_slice(&aliases);
            params[3] = Some("_cached");
            let mut loop_fn = FunctionExpression::new(allocator, SourceLocation::STUB);
            loop_fn.params = params_list(&params, allocator);
            let body = memo_body(memo, memo_key, child, ctx);
            loop_fn.body = Some(FunctionBody::Block(ctx.alloc(body)));
            render_list
                .arguments
                .push(CallArgument::Node(JsChildNode::Function(ctx.alloc(loop_fn))));
            render_list.arguments.push(CallArgument::Raw(String::from("_cache")));
            let slot = ctx.next_cache_slot();
            render_list
                .arguments
                .push(CallArgument::Raw(format_compact!("{}", slot)));
        }
        None => {
            let mut loop_fn = FunctionExpression::new(allocator, SourceLocation::STUB);
            loop_fn.params = params_list(&aliases, allocator);
            loop_fn.returns = Some(FunctionReturns::JsChild(child));
            loop_fn.newline = true;
            render_list
                .arguments
                .push(CallArgument::Node(JsChildNode::Function(ctx.alloc(loop_fn))));
        }
    }

    let mut fragment = VNodeCall::new(
        VNodeTag::Symbol(ctx.helper(RuntimeHelper::Fragment)),
        for_node.loc.clone(),
    );
    fragment.children = Some(VNodeChildren::ForRenderList(ctx.alloc(render_list)));
    fragment.patch_flag = Some(fragment_flag);
    fragment.disable_tracking = !is_stable;
    ctx.helper(RuntimeHelper::vnode(false));
    ctx.make_block(&mut fragment);
    for_node.codegen_node = Some(ForCodegenNode::VNodeCall(ctx.alloc(fragment)));
}

/// Iterations are blocks unless the source list can never change.
fn set_child_block<'a>(el: &mut ElementNode<'a>, is_block: bool, ctx: &mut TransformContext<'a>) {
    if el.tag_type == ElementType::Slot {
        return;
    }
    if let Some(ElementCodegenNode::VNodeCall(vnode)) = &mut el.codegen_node {
        if is_block {
            ctx.make_block(vnode);
        } else {
            ctx.unmake_block(vnode);
        }
    }
}

/// Parameter list with `_`, `__`, ... standing in for skipped positions.
pub(crate) fn params_list<'a>(params: &[Option<&str>], allocator: &'a gesso_carton::Bump) -> Vec<'a, String> {
    let len = params.iter().rposition(Option::is_some).map_or(0, |i| i + 1);
    let mut list = Vec::with_capacity_in(len, allocator);
    for (i, param) in params[..len].iter().enumerate() {
        list.push(match param {
            Some(name) => String::from(*name),
            None => String::from("_".repeat(i + 1)),
        });
    }
    list
}

/// Loop body reusing the previous iteration's vnode while the memo holds.
fn memo_body<'a>(
    memo: ExpressionNode<'a>,
    key: Option<JsChildNode<'a>>,
    child: JsChildNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> BlockStatement<'a> {
    let allocator = ctx.allocator;
    let mut body = BlockStatement::new(allocator, SourceLocation::STUB);

    let mut declare = CompoundExpressionNode::new(allocator, SourceLocation::STUB);
    declare
        .children
        .push(CompoundExpressionChild::String(String::from("const _memo = (")));
    declare.children.push(match memo {
        ExpressionNode::Simple(s) => CompoundExpressionChild::Simple(s),
        ExpressionNode::Compound(c) => CompoundExpressionChild::Compound(c),
    });
    declare
        .children
        .push(CompoundExpressionChild::String(String::from(")")));
    body.body
        .push(Statement::Expression(JsChildNode::CompoundExpression(ctx.alloc(declare))));

    let mut check = CompoundExpressionNode::new(allocator, SourceLocation::STUB);
    check
        .children
        .push(CompoundExpressionChild::String(String::from("if (_cached")));
    if let Some(key) = key {
        check
            .children
            .push(CompoundExpressionChild::String(String::from(" && _cached.key === ")));
        check.children.push(match key {
            JsChildNode::SimpleExpression(s) => CompoundExpressionChild::Simple(s),
            JsChildNode::CompoundExpression(c) => CompoundExpressionChild::Compound(c),
            _ => CompoundExpressionChild::String(String::from("undefined")),
        });
    }
    check
        .children
        .push(CompoundExpressionChild::String(String::from(" && ")));
    check
        .children
        .push(CompoundExpressionChild::Symbol(ctx.helper(RuntimeHelper::IsMemoSame)));
    check.children.push(CompoundExpressionChild::String(String::from(
        "(_cached, _memo)) return _cached",
    )));
    body.body
        .push(Statement::Expression(JsChildNode::CompoundExpression(ctx.alloc(check))));

    let item = AssignmentExpression {
        left: JsChildNode::code(allocator, "const _item", ConstantType::NotConstant),
        right: child,
        loc: SourceLocation::STUB,
    };
    body.body
        .push(Statement::Expression(JsChildNode::Assignment(ctx.alloc(item))));
    body.body.push(Statement::Expression(JsChildNode::code(
        allocator,
        "_item.memo = _memo",
        ConstantType::NotConstant,
    )));
    body.body.push(Statement::Return(ctx.alloc(ReturnStatement {
        returns: JsChildNode::code(allocator, "_item", ConstantType::NotConstant),
        loc: SourceLocation::STUB,
    })));
    body
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

    fn run<'a>(
        allocator: &'a Bump,
        src: &'a str,
        options: &TransformOptions,
    ) -> (RootNode<'a>, std::vec::Vec<CompilerError>) {
        let (mut root, _) = parse(allocator, src);
        let output = transform(allocator, &mut root, options, &base_transform_pipeline()).unwrap();
        (root, output.errors)
    }

    fn root_for<'r, 'a>(root: &'r RootNode<'a>) -> &'r ForNode<'a> {
        match &root.codegen_node {
            Some(JsChildNode::TemplateChild(TemplateChildNode::For(f))) => f,
            other => panic!("expected for root, got {:?}", other),
        }
    }

    fn fragment<'r, 'a>(for_node: &'r ForNode<'a>) -> &'r VNodeCall<'a> {
        match &for_node.codegen_node {
            Some(ForCodegenNode::VNodeCall(vnode)) => vnode,
            other => panic!("expected fragment, got {:?}", other),
        }
    }

    fn loop_fn<'r, 'a>(vnode: &'r VNodeCall<'a>) -> &'r FunctionExpression<'a> {
        let Some(VNodeChildren::ForRenderList(call)) = &vnode.children else {
            panic!("expected renderList");
        };
        match &call.arguments[1] {
            CallArgument::Node(JsChildNode::Function(f)) => f,
            other => panic!("expected loop function, got {:?}", other),
        }
    }

    #[test]
    fn test_unkeyed_dynamic_source() {
        let allocator = Bump::new();
        let (root, errors) = run(
            &allocator,
            r#"<li v-for="(item, i) in list">{{ item }}</li>"#,
            &TransformOptions::default(),
        );
        assert!(errors.is_empty());
        let vnode = fragment(root_for(&root));
        assert!(vnode.is_block);
        assert!(vnode.disable_tracking);
        assert_eq!(vnode.patch_flag, Some(PatchFlags::UNKEYED_FRAGMENT));
        let params: std::vec::Vec<_> = loop_fn(vnode).params.iter().map(|p| p.as_str()).collect();
        assert_eq!(params, ["item", "i"]);
        assert!(root.helpers.contains(&RuntimeHelper::RenderList));
    }

    #[test]
    fn test_keyed_and_child_is_block() {
        let allocator = Bump::new();
        let (root, _) = run(
            &allocator,
            r#"<li v-for="item in list" :key="item.id">{{ item.name }}</li>"#,
            &TransformOptions::default(),
        );
        let vnode = fragment(root_for(&root));
        assert_eq!(vnode.patch_flag, Some(PatchFlags::KEYED_FRAGMENT));
        let Some(FunctionReturns::JsChild(JsChildNode::TemplateChild(TemplateChildNode::Element(li)))) =
            &loop_fn(vnode).returns
        else {
            panic!("expected element iteration");
        };
        assert!(matches!(&li.codegen_node, Some(ElementCodegenNode::VNodeCall(v)) if v.is_block));
    }

    #[test]
    fn test_stable_source() {
        let allocator = Bump::new();
        let (root, _) = run(&allocator, r#"<i v-for="n in 10">{{ n }}</i>"#, &TransformOptions::default());
        let vnode = fragment(root_for(&root));
        assert_eq!(vnode.patch_flag, Some(PatchFlags::STABLE_FRAGMENT));
        assert!(!vnode.disable_tracking);
    }

    #[test]
    fn test_skipped_alias_placeholders() {
        let allocator = Bump::new();
        let (root, _) = run(
            &allocator,
            r#"<i v-for="(, , index) in list">{{ index }}</i>"#,
            &TransformOptions::default(),
        );
        let params: std::vec::Vec<_> = loop_fn(fragment(root_for(&root)))
            .params
            .iter()
            .map(|p| p.as_str())
            .collect();
        assert_eq!(params, ["_", "__", "index"]);
    }

    #[test]
    fn test_template_multiple_children_wrapped() {
        let allocator = Bump::new();
        let (root, _) = run(
            &allocator,
            r#"<template v-for="x in xs" :key="x"><b>{{ x }}</b><i/></template>"#,
            &TransformOptions::default(),
        );
        let Some(FunctionReturns::JsChild(JsChildNode::VNodeCall(inner))) =
            &loop_fn(fragment(root_for(&root))).returns
        else {
            panic!("expected fragment iteration");
        };
        assert_eq!(inner.patch_flag, Some(PatchFlags::STABLE_FRAGMENT));
        assert!(matches!(
            &inner.props,
            Some(PropsExpression::Object(o)) if o.properties[0].static_key() == Some("key")
        ));
    }

    #[test]
    fn test_memo_body() {
        let allocator = Bump::new();
        let (root, _) = run(
            &allocator,
            r#"<div v-for="item in list" :key="item.id" v-memo="[item.ok]">{{ item.x }}</div>"#,
            &TransformOptions::default(),
        );
        assert_eq!(root.cached, 1);
        let vnode = fragment(root_for(&root));
        let f = loop_fn(vnode);
        assert_eq!(f.params.last().map(|p| p.as_str()), Some("_cached"));
        let Some(FunctionBody::Block(body)) = &f.body else {
            panic!("expected loop body");
        };
        assert_eq!(body.body.len(), 5);
        assert!(root.helpers.contains(&RuntimeHelper::IsMemoSame));
    }

    #[test]
    fn test_aliases_not_references() {
        let allocator = Bump::new();
        let options = TransformOptions {
            prefix_identifiers: true,
            ..Default::default()
        };
        let (root, _) = run(&allocator, r#"<div v-for="item in list">{{ item.x }}</div>"#, &options);
        let refs: std::vec::Vec<_> = root.references.iter().map(|r| r.as_str()).collect();
        assert_eq!(refs, ["list"]);
    }

    #[test]
    fn test_errors() {
        let allocator = Bump::new();
        let (_, errors) = run(&allocator, r#"<div v-for></div>"#, &TransformOptions::default());
        assert_eq!(errors[0].code, ErrorCode::VForNoExpression);

        let (_, errors) = run(&allocator, r#"<div v-for="items"></div>"#, &TransformOptions::default());
        assert_eq!(errors[0].code, ErrorCode::VForMalformedExpression);

        let (_, errors) = run(
            &allocator,
            r#"<template v-for="x in xs"><p :key="x"/></template>"#,
            &TransformOptions::default(),
        );
        assert_eq!(errors[0].code, ErrorCode::VForTemplateKeyPlacement);
    }
}
