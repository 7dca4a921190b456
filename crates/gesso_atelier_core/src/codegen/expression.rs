//! Expression and generated-code node rendering.

use gesso_carton::is_simple_identifier;
use gesso_relief::ast::*;

use super::context::CodegenContext;
use super::helpers::{escape_template_literal, js_string, property_key};
use super::node::{gen_children_array, gen_interpolation, gen_template_child};
use super::vnode::gen_vnode_call;
use super::GenResult;

pub fn gen_js_child(ctx: &mut CodegenContext, node: &JsChildNode<'_>) -> GenResult {
    match node {
        JsChildNode::VNodeCall(vnode) => gen_vnode_call(ctx, vnode),
        JsChildNode::Call(call) => gen_call(ctx, call),
        JsChildNode::Object(obj) => gen_object(ctx, obj),
        JsChildNode::Array(arr) => gen_array(ctx, arr),
        JsChildNode::Function(f) => gen_function(ctx, f),
        JsChildNode::Conditional(cond) => gen_conditional(ctx, cond),
        JsChildNode::Cache(cache) => gen_cache(ctx, cache),
        JsChildNode::Assignment(assign) => {
            gen_js_child(ctx, &assign.left)?;
            ctx.push(" = ");
            gen_js_child(ctx, &assign.right)
        }
        JsChildNode::Sequence(seq) => {
            ctx.push("(");
            gen_list(ctx, &seq.expressions, false, gen_js_child)?;
            ctx.push(")");
            Ok(())
        }
        JsChildNode::TemplateLiteral(lit) => gen_template_literal(ctx, lit),
        JsChildNode::SimpleExpression(s) => {
            gen_simple(ctx, s);
            Ok(())
        }
        JsChildNode::CompoundExpression(c) => gen_compound(ctx, c),
        JsChildNode::TemplateChild(child) => gen_template_child(ctx, child),
    }
}

/// Static expressions are string literals, the rest is code.
pub fn gen_simple(ctx: &mut CodegenContext, exp: &SimpleExpressionNode<'_>) {
    if exp.is_static {
        let quoted = js_string(&exp.content);
        ctx.push_mapped(&quoted, &exp.loc);
    } else {
        ctx.push_mapped(&exp.content, &exp.loc);
    }
}

pub fn gen_compound(ctx: &mut CodegenContext, exp: &CompoundExpressionNode<'_>) -> GenResult {
    for child in exp.children.iter() {
        match child {
            CompoundExpressionChild::Simple(s) => gen_simple(ctx, s),
            CompoundExpressionChild::Compound(c) => gen_compound(ctx, c)?,
            CompoundExpressionChild::Interpolation(i) => gen_interpolation(ctx, i)?,
            CompoundExpressionChild::Text(t) => {
                let quoted = js_string(&t.content);
                ctx.push_mapped(&quoted, &t.loc);
            }
            CompoundExpressionChild::String(s) => ctx.push(s),
            CompoundExpressionChild::Symbol(helper) => ctx.push_helper(*helper),
        }
    }
    Ok(())
}

pub fn gen_expression(ctx: &mut CodegenContext, exp: &ExpressionNode<'_>) -> GenResult {
    match exp {
        ExpressionNode::Simple(s) => {
            gen_simple(ctx, s);
            Ok(())
        }
        ExpressionNode::Compound(c) => gen_compound(ctx, c),
    }
}

/// `items` separated by commas, one per line when `multilines`.
pub fn gen_list<T>(
    ctx: &mut CodegenContext,
    items: &[T],
    multilines: bool,
    mut gen: impl FnMut(&mut CodegenContext, &T) -> GenResult,
) -> GenResult {
    for (i, item) in items.iter().enumerate() {
        gen(ctx, item)?;
        if i + 1 < items.len() {
            if multilines {
                ctx.push(",");
                ctx.newline();
            } else {
                ctx.push(", ");
            }
        }
    }
    Ok(())
}

/// `[a, b]`, broken over lines when long or holding anything but text.
pub fn gen_array_of<T>(
    ctx: &mut CodegenContext,
    items: &[T],
    is_text: impl Fn(&T) -> bool,
    gen: impl FnMut(&mut CodegenContext, &T) -> GenResult,
) -> GenResult {
    let multilines = items.len() > 3 || items.iter().any(|item| !is_text(item));
    ctx.push("[");
    if multilines {
        ctx.indent();
    }
    gen_list(ctx, items, multilines, gen)?;
    if multilines {
        ctx.deindent();
    }
    ctx.push("]");
    Ok(())
}

fn is_text_js(node: &JsChildNode<'_>) -> bool {
    match node {
        JsChildNode::SimpleExpression(_) | JsChildNode::CompoundExpression(_) => true,
        JsChildNode::TemplateChild(child) => child.is_text_like(),
        _ => false,
    }
}

fn gen_array(ctx: &mut CodegenContext, arr: &ArrayExpression<'_>) -> GenResult {
    gen_array_of(ctx, &arr.elements, is_text_js, gen_js_child)
}

pub fn gen_property_key(ctx: &mut CodegenContext, key: &ExpressionNode<'_>) -> GenResult {
    match key {
        ExpressionNode::Compound(c) => {
            ctx.push("[");
            gen_compound(ctx, c)?;
            ctx.push("]");
        }
        ExpressionNode::Simple(s) if s.is_static => {
            let key = property_key(&s.content);
            ctx.push_mapped(&key, &s.loc);
        }
        ExpressionNode::Simple(s) => {
            ctx.push("[");
            ctx.push_mapped(&s.content, &s.loc);
            ctx.push("]");
        }
    }
    Ok(())
}

pub fn gen_object(ctx: &mut CodegenContext, obj: &ObjectExpression<'_>) -> GenResult {
    if obj.properties.is_empty() {
        ctx.push("{}");
        return Ok(());
    }
    let multilines = obj.properties.len() > 1
        || obj
            .properties
            .iter()
            .any(|p| !matches!(p.value, JsChildNode::SimpleExpression(_)));
    ctx.push(if multilines { "{" } else { "{ " });
    if multilines {
        ctx.indent();
    }
    gen_list(ctx, &obj.properties, multilines, |ctx, prop| {
        gen_property_key(ctx, &prop.key)?;
        ctx.push(": ");
        gen_js_child(ctx, &prop.value)
    })?;
    if multilines {
        ctx.deindent();
    }
    ctx.push(if multilines { "}" } else { " }" });
    Ok(())
}

pub fn gen_call(ctx: &mut CodegenContext, call: &CallExpression<'_>) -> GenResult {
    ctx.push_pure();
    match &call.callee {
        Callee::Symbol(helper) => ctx.push_helper(*helper),
        Callee::Raw(name) => ctx.push_mapped(name, &call.loc),
    }
    ctx.push("(");
    gen_list(ctx, &call.arguments, false, gen_call_argument)?;
    ctx.push(")");
    Ok(())
}

fn gen_call_argument(ctx: &mut CodegenContext, arg: &CallArgument<'_>) -> GenResult {
    match arg {
        CallArgument::Raw(raw) => ctx.push(raw),
        CallArgument::Symbol(helper) => ctx.push_helper(*helper),
        CallArgument::Node(node) => gen_js_child(ctx, node)?,
        CallArgument::Children(children) => gen_children_array(ctx, children)?,
    }
    Ok(())
}

pub fn gen_function(ctx: &mut CodegenContext, f: &FunctionExpression<'_>) -> GenResult {
    if f.is_slot {
        ctx.push_helper(RuntimeHelper::WithCtx);
        ctx.push("(");
    }
    ctx.push("(");
    for (i, param) in f.params.iter().enumerate() {
        if i > 0 {
            ctx.push(", ");
        }
        ctx.push(param);
    }
    ctx.push(") => ");
    let braces = f.newline || f.body.is_some();
    if braces {
        ctx.push("{");
        ctx.indent();
    }
    if let Some(returns) = &f.returns {
        if f.newline {
            ctx.push("return ");
        }
        match returns {
            FunctionReturns::Single(child) => gen_template_child(ctx, child)?,
            FunctionReturns::Multiple(children) => gen_children_array(ctx, children)?,
            FunctionReturns::JsChild(node) => gen_js_child(ctx, node)?,
        }
    } else if let Some(body) = &f.body {
        match body {
            FunctionBody::Block(block) => gen_statements(ctx, &block.body)?,
            FunctionBody::If(stmt) => gen_if_statement(ctx, stmt)?,
        }
    }
    if braces {
        ctx.deindent();
        ctx.push("}");
    }
    if f.is_slot {
        ctx.push(")");
    }
    Ok(())
}

fn gen_statements(ctx: &mut CodegenContext, body: &[Statement<'_>]) -> GenResult {
    for (i, stmt) in body.iter().enumerate() {
        match stmt {
            Statement::Expression(node) => gen_js_child(ctx, node)?,
            Statement::If(stmt) => gen_if_statement(ctx, stmt)?,
            Statement::Return(ret) => {
                ctx.push("return ");
                gen_js_child(ctx, &ret.returns)?;
            }
        }
        if i + 1 < body.len() {
            ctx.end_statement();
        } else {
            ctx.terminate();
        }
    }
    Ok(())
}

fn gen_block(ctx: &mut CodegenContext, block: &BlockStatement<'_>) -> GenResult {
    ctx.push("{");
    ctx.indent();
    gen_statements(ctx, &block.body)?;
    ctx.deindent();
    ctx.push("}");
    Ok(())
}

fn gen_if_statement(ctx: &mut CodegenContext, stmt: &IfStatement<'_>) -> GenResult {
    ctx.push("if (");
    gen_js_child(ctx, &stmt.test)?;
    ctx.push(") ");
    gen_block(ctx, &stmt.consequent)?;
    match &stmt.alternate {
        Some(IfStatementAlternate::If(next)) => {
            ctx.push(" else ");
            gen_if_statement(ctx, next)
        }
        Some(IfStatementAlternate::Block(block)) => {
            ctx.push(" else ");
            gen_block(ctx, block)
        }
        None => Ok(()),
    }
}

/// `test ? a : b`, with nested alternates chained at the same depth.
pub fn gen_conditional(ctx: &mut CodegenContext, cond: &ConditionalExpression<'_>) -> GenResult {
    match &cond.test {
        JsChildNode::SimpleExpression(s) => {
            let parens = !is_simple_identifier(&s.content);
            if parens {
                ctx.push("(");
            }
            gen_simple(ctx, s);
            if parens {
                ctx.push(")");
            }
        }
        other => {
            ctx.push("(");
            gen_js_child(ctx, other)?;
            ctx.push(")");
        }
    }
    if cond.newline {
        ctx.indent();
    }
    ctx.indent_level += 1;
    if !cond.newline {
        ctx.push(" ");
    }
    ctx.push("? ");
    gen_js_child(ctx, &cond.consequent)?;
    ctx.indent_level -= 1;
    if cond.newline {
        ctx.newline();
    } else {
        ctx.push(" ");
    }
    ctx.push(": ");
    let nested = matches!(cond.alternate, JsChildNode::Conditional(_));
    if !nested {
        ctx.indent_level += 1;
    }
    gen_js_child(ctx, &cond.alternate)?;
    if !nested {
        ctx.indent_level -= 1;
    }
    if cond.newline {
        ctx.indent_level = ctx.indent_level.saturating_sub(1);
    }
    Ok(())
}

/// `_cache[i] || (_cache[i] = value)`; vnodes pause block tracking while
/// they are created.
pub fn gen_cache(ctx: &mut CodegenContext, cache: &CacheExpression<'_>) -> GenResult {
    let slot = format!("_cache[{}]", cache.index);
    ctx.push(&slot);
    ctx.push(" || (");
    if cache.is_vnode {
        ctx.indent();
        ctx.push_helper(RuntimeHelper::SetBlockTracking);
        ctx.push("(-1),");
        ctx.newline();
    }
    ctx.push(&slot);
    ctx.push(" = ");
    gen_js_child(ctx, &cache.value)?;
    if cache.is_vnode {
        ctx.push(",");
        ctx.newline();
        ctx.push_helper(RuntimeHelper::SetBlockTracking);
        ctx.push("(1),");
        ctx.newline();
        ctx.push(&slot);
        ctx.deindent();
    }
    ctx.push(")");
    Ok(())
}

fn gen_template_literal(ctx: &mut CodegenContext, lit: &TemplateLiteral<'_>) -> GenResult {
    ctx.push("`");
    for element in lit.elements.iter() {
        match element {
            TemplateLiteralElement::String(s) => ctx.push(&escape_template_literal(s)),
            TemplateLiteralElement::JsChild(node) => {
                ctx.push("${");
                gen_js_child(ctx, node)?;
                ctx.push("}");
            }
        }
    }
    ctx.push("`");
    Ok(())
}
