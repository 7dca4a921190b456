//! Template child rendering.

use gesso_relief::ast::*;
use gesso_relief::errors::InternalError;

use super::context::CodegenContext;
use super::expression::{gen_array_of, gen_cache, gen_call, gen_compound, gen_conditional, gen_expression, gen_simple};
use super::helpers::js_string;
use super::vnode::gen_vnode_call;
use super::GenResult;

pub fn gen_template_child(ctx: &mut CodegenContext, node: &TemplateChildNode<'_>) -> GenResult {
    match node {
        TemplateChildNode::Element(el) => match &el.codegen_node {
            Some(codegen) => gen_element_codegen(ctx, codegen),
            None => Err(missing(NodeType::Element, &el.loc)),
        },
        TemplateChildNode::Text(text) => {
            let quoted = js_string(&text.content);
            ctx.push_mapped(&quoted, &text.loc);
            Ok(())
        }
        TemplateChildNode::Comment(comment) => {
            ctx.push_pure();
            ctx.push_helper(RuntimeHelper::CreateComment);
            ctx.push("(");
            let quoted = js_string(&comment.content);
            ctx.push_mapped(&quoted, &comment.loc);
            ctx.push(")");
            Ok(())
        }
        TemplateChildNode::Interpolation(interp) => gen_interpolation(ctx, interp),
        TemplateChildNode::If(if_node) => match &if_node.codegen_node {
            Some(IfCodegenNode::Conditional(cond)) => gen_conditional(ctx, cond),
            Some(IfCodegenNode::Cache(cache)) => gen_cache(ctx, cache),
            None => Err(missing(NodeType::If, &if_node.loc)),
        },
        TemplateChildNode::For(for_node) => match &for_node.codegen_node {
            Some(ForCodegenNode::VNodeCall(vnode)) => gen_vnode_call(ctx, vnode),
            Some(ForCodegenNode::Cache(cache)) => gen_cache(ctx, cache),
            None => Err(missing(NodeType::For, &for_node.loc)),
        },
        TemplateChildNode::TextCall(text) => gen_text_call(ctx, text),
        TemplateChildNode::CompoundExpression(c) => gen_compound(ctx, c),
        TemplateChildNode::Hoisted(index) => {
            ctx.push(&format!("_hoisted_{}", index + 1));
            Ok(())
        }
    }
}

fn missing(kind: NodeType, loc: &SourceLocation) -> InternalError {
    InternalError::MissingCodegenNode {
        kind,
        loc: loc.clone(),
    }
}

fn gen_element_codegen(ctx: &mut CodegenContext, codegen: &ElementCodegenNode<'_>) -> GenResult {
    match codegen {
        ElementCodegenNode::VNodeCall(vnode) => gen_vnode_call(ctx, vnode),
        ElementCodegenNode::SimpleExpression(exp) => {
            gen_simple(ctx, exp);
            Ok(())
        }
        ElementCodegenNode::Cache(cache) => gen_cache(ctx, cache),
        ElementCodegenNode::Call(call) => gen_call(ctx, call),
    }
}

pub fn gen_interpolation(ctx: &mut CodegenContext, interp: &InterpolationNode<'_>) -> GenResult {
    ctx.push_pure();
    ctx.push_helper(RuntimeHelper::ToDisplayString);
    ctx.push("(");
    gen_expression(ctx, &interp.content)?;
    ctx.push(")");
    Ok(())
}

fn gen_text_content(ctx: &mut CodegenContext, content: &TextCallContent<'_>) -> GenResult {
    match content {
        TextCallContent::Text(text) => {
            let quoted = js_string(&text.content);
            ctx.push_mapped(&quoted, &text.loc);
            Ok(())
        }
        TextCallContent::Interpolation(interp) => gen_interpolation(ctx, interp),
        TextCallContent::Compound(c) => gen_compound(ctx, c),
    }
}

/// `_createTextVNode(content, flag)`. A lone space needs no argument, the
/// runtime defaults to it.
fn gen_text_call(ctx: &mut CodegenContext, text: &TextCallNode<'_>) -> GenResult {
    match text.codegen_node {
        Some(TextCallCodegenNode::CreateText { patch_flag }) => {
            ctx.push_pure();
            ctx.push_helper(RuntimeHelper::CreateText);
            ctx.push("(");
            let lone_space = matches!(&text.content, TextCallContent::Text(t) if t.content == " ");
            if !lone_space {
                gen_text_content(ctx, &text.content)?;
            }
            if let Some(flag) = patch_flag.filter(|flag| !flag.is_empty()) {
                if lone_space {
                    ctx.push("\" \"");
                }
                ctx.push(", ");
                ctx.push(&flag.to_annotated_string());
            }
            ctx.push(")");
            Ok(())
        }
        Some(TextCallCodegenNode::Inline) => gen_text_content(ctx, &text.content),
        None => Err(missing(NodeType::TextCall, &text.loc)),
    }
}

/// Children as an array literal. Hoisted references count as plain
/// expressions for layout.
pub fn gen_children_array(ctx: &mut CodegenContext, children: &[TemplateChildNode<'_>]) -> GenResult {
    gen_array_of(
        ctx,
        children,
        |child| child.is_text_like() || matches!(child, TemplateChildNode::Hoisted(_)),
        gen_template_child,
    )
}
