//! VNode call generation.

use gesso_carton::{PatchFlags, SmallVec};
use gesso_relief::ast::*;

use super::context::CodegenContext;
use super::expression::{gen_array_of, gen_call, gen_expression, gen_list, gen_object, gen_simple};
use super::helpers::{js_string, property_key};
use super::node::{gen_children_array, gen_template_child};
use super::GenResult;

/// One positional argument of a vnode call
enum VNodeArg<'n, 'a> {
    Null,
    Tag(&'n VNodeTag<'a>),
    Props(&'n PropsExpression<'a>),
    Children(&'n VNodeChildren<'a>),
    Raw(String),
}

/// `_withDirectives((_openBlock(), _createElementBlock(tag, props, children,
/// flag, dynamicProps)), [...])`, with trailing null arguments dropped.
pub fn gen_vnode_call(ctx: &mut CodegenContext, vnode: &VNodeCall<'_>) -> GenResult {
    let directives = vnode.directives.as_ref().filter(|dirs| !dirs.is_empty());
    if directives.is_some() {
        ctx.push_helper(RuntimeHelper::WithDirectives);
        ctx.push("(");
    }
    if vnode.is_block {
        ctx.push("(");
        ctx.push_helper(RuntimeHelper::OpenBlock);
        ctx.push(if vnode.disable_tracking { "(true), " } else { "(), " });
    }
    ctx.push_pure();
    let helper = if vnode.is_block {
        RuntimeHelper::block(vnode.is_component)
    } else {
        RuntimeHelper::vnode(vnode.is_component)
    };
    ctx.push_helper(helper);
    ctx.push("(");

    let patch_flag = if vnode.hoisted {
        Some(format!("{} /* HOISTED */", PatchFlags::HOISTED))
    } else {
        vnode
            .patch_flag
            .filter(|flag| !flag.is_empty())
            .map(|flag| flag.to_annotated_string())
    };
    let dynamic_props = vnode.dynamic_props.as_ref().map(|names| {
        let quoted: Vec<_> = names.iter().map(|name| js_string(name)).collect();
        format!("[{}]", quoted.join(", "))
    });

    let mut args: SmallVec<[VNodeArg<'_, '_>; 5]> = SmallVec::new();
    args.push(VNodeArg::Tag(&vnode.tag));
    args.push(vnode.props.as_ref().map_or(VNodeArg::Null, VNodeArg::Props));
    args.push(vnode.children.as_ref().map_or(VNodeArg::Null, VNodeArg::Children));
    args.push(patch_flag.map_or(VNodeArg::Null, VNodeArg::Raw));
    args.push(dynamic_props.map_or(VNodeArg::Null, VNodeArg::Raw));
    while matches!(args.last(), Some(VNodeArg::Null)) {
        args.pop();
    }
    gen_list(ctx, &args, false, |ctx, arg| match arg {
        VNodeArg::Null => {
            ctx.push("null");
            Ok(())
        }
        VNodeArg::Tag(tag) => gen_tag(ctx, tag),
        VNodeArg::Props(props) => gen_props(ctx, props),
        VNodeArg::Children(children) => gen_vnode_children(ctx, children),
        VNodeArg::Raw(raw) => {
            ctx.push(raw);
            Ok(())
        }
    })?;
    ctx.push(")");

    if vnode.is_block {
        ctx.push(")");
    }
    if let Some(directives) = directives {
        ctx.push(", ");
        gen_directives(ctx, directives)?;
        ctx.push(")");
    }
    Ok(())
}

fn gen_tag(ctx: &mut CodegenContext, tag: &VNodeTag<'_>) -> GenResult {
    match tag {
        VNodeTag::Element(name) => ctx.push(&js_string(name)),
        VNodeTag::Asset(id) => ctx.push(id),
        VNodeTag::Symbol(helper) => ctx.push_helper(*helper),
        VNodeTag::Call(call) => gen_call(ctx, call)?,
    }
    Ok(())
}

fn gen_props(ctx: &mut CodegenContext, props: &PropsExpression<'_>) -> GenResult {
    match props {
        PropsExpression::Object(obj) => gen_object(ctx, obj),
        PropsExpression::Call(call) => gen_call(ctx, call),
        PropsExpression::Simple(exp) => {
            gen_simple(ctx, exp);
            Ok(())
        }
    }
}

fn gen_vnode_children(ctx: &mut CodegenContext, children: &VNodeChildren<'_>) -> GenResult {
    match children {
        VNodeChildren::Multiple(nodes) => gen_children_array(ctx, nodes),
        VNodeChildren::Single(node) => gen_template_child(ctx, node),
        VNodeChildren::Slots(obj) => gen_object(ctx, obj),
        VNodeChildren::DynamicSlots(call) | VNodeChildren::ForRenderList(call) => {
            gen_call(ctx, call)
        }
        VNodeChildren::Simple(exp) => {
            gen_simple(ctx, exp);
            Ok(())
        }
    }
}

/// One `[dir, exp, arg, modifiers]` entry
enum DirectiveArg<'n, 'a> {
    Name(&'n RuntimeDirective),
    Expression(&'n ExpressionNode<'a>),
    StaticArg(&'n str),
    Void,
    Modifiers(&'n [gesso_carton::String]),
}

fn gen_directives(ctx: &mut CodegenContext, directives: &[DirectiveArgumentNode<'_>]) -> GenResult {
    gen_array_of(ctx, directives, |_| false, |ctx, dir| {
        let mut entry: SmallVec<[DirectiveArg<'_, '_>; 4]> = SmallVec::new();
        entry.push(DirectiveArg::Name(&dir.directive));
        if let Some(exp) = &dir.exp {
            entry.push(DirectiveArg::Expression(exp));
        }
        if let Some(arg) = &dir.arg {
            if dir.exp.is_none() {
                entry.push(DirectiveArg::Void);
            }
            match arg {
                ExpressionNode::Simple(s) if s.is_static => {
                    entry.push(DirectiveArg::StaticArg(&s.content))
                }
                other => entry.push(DirectiveArg::Expression(other)),
            }
        }
        if !dir.modifiers.is_empty() {
            if dir.arg.is_none() {
                if dir.exp.is_none() {
                    entry.push(DirectiveArg::Void);
                }
                entry.push(DirectiveArg::Void);
            }
            entry.push(DirectiveArg::Modifiers(&dir.modifiers));
        }
        gen_array_of(
            ctx,
            &entry,
            |arg| !matches!(arg, DirectiveArg::Modifiers(_)),
            gen_directive_arg,
        )
    })
}

fn gen_directive_arg(ctx: &mut CodegenContext, arg: &DirectiveArg<'_, '_>) -> GenResult {
    match arg {
        DirectiveArg::Name(RuntimeDirective::Helper(helper)) => ctx.push_helper(*helper),
        DirectiveArg::Name(RuntimeDirective::Resolved(id)) => ctx.push(id),
        DirectiveArg::Expression(exp) => gen_expression(ctx, exp)?,
        DirectiveArg::StaticArg(name) => ctx.push(&js_string(name)),
        DirectiveArg::Void => ctx.push("void 0"),
        DirectiveArg::Modifiers(modifiers) => {
            let multilines = modifiers.len() > 1;
            ctx.push(if multilines { "{" } else { "{ " });
            if multilines {
                ctx.indent();
            }
            gen_list(ctx, modifiers, multilines, |ctx, name| {
                ctx.push(&property_key(name));
                ctx.push(": true");
                Ok(())
            })?;
            if multilines {
                ctx.deindent();
            }
            ctx.push(if multilines { "}" } else { " }" });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesso_carton::{Box, Bump};
    use gesso_relief::options::CodegenOptions;

    fn render(vnode: &VNodeCall<'_>) -> String {
        let mut ctx = CodegenContext::new(CodegenOptions::default());
        gen_vnode_call(&mut ctx, vnode).unwrap();
        ctx.code
    }

    #[test]
    fn test_trailing_nulls_are_dropped() {
        let vnode = VNodeCall::new(VNodeTag::Element("div".into()), SourceLocation::STUB);
        assert_eq!(render(&vnode), "_createElementVNode(\"div\")");
    }

    #[test]
    fn test_block_with_flags() {
        let allocator = Bump::new();
        let mut vnode = VNodeCall::new(VNodeTag::Element("div".into()), SourceLocation::STUB);
        vnode.is_block = true;
        vnode.patch_flag = Some(PatchFlags::PROPS);
        let mut names = gesso_carton::Vec::new_in(&allocator);
        names.push(gesso_carton::String::from("title"));
        vnode.dynamic_props = Some(names);
        assert_eq!(
            render(&vnode),
            "(_openBlock(), _createElementBlock(\"div\", null, null, 8 /* PROPS */, [\"title\"]))"
        );
    }

    #[test]
    fn test_hoisted_flag() {
        let mut vnode = VNodeCall::new(VNodeTag::Element("p".into()), SourceLocation::STUB);
        vnode.hoisted = true;
        assert_eq!(
            render(&vnode),
            "_createElementVNode(\"p\", null, null, -1 /* HOISTED */)"
        );
    }

    #[test]
    fn test_runtime_directives() {
        let allocator = Bump::new();
        let mut vnode = VNodeCall::new(VNodeTag::Element("input".into()), SourceLocation::STUB);
        let mut modifiers = gesso_carton::Vec::new_in(&allocator);
        modifiers.push(gesso_carton::String::from("lazy"));
        let exp = ExpressionNode::Simple(Box::new_in(
            SimpleExpressionNode::code("_ctx.text", ConstantType::NotConstant),
            &allocator,
        ));
        let mut directives = gesso_carton::Vec::new_in(&allocator);
        directives.push(DirectiveArgumentNode {
            directive: RuntimeDirective::Helper(RuntimeHelper::VModelText),
            exp: Some(exp),
            arg: None,
            modifiers,
            loc: SourceLocation::STUB,
        });
        directives.push(DirectiveArgumentNode {
            directive: RuntimeDirective::Resolved("_directive_focus".into()),
            exp: None,
            arg: None,
            modifiers: gesso_carton::Vec::new_in(&allocator),
            loc: SourceLocation::STUB,
        });
        vnode.directives = Some(directives);
        assert_eq!(
            render(&vnode),
            "_withDirectives(_createElementVNode(\"input\"), [\n  [\n    _vModelText,\n    _ctx.text,\n    void 0,\n    { lazy: true }\n  ],\n  [_directive_focus]\n])"
        );
    }
}
