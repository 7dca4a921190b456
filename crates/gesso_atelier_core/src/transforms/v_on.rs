//! v-on directive transform.
//!
//! Transforms `@event="handler"` into an `onEvent` property. Inline
//! statements are wrapped in an arrow function taking `$event`. With
//! `cache_handlers` on, handlers that read no scope variables are stored in
//! a `_cache` slot so that child components are not re-patched.

use gesso_carton::{
    format_compact, is_fn_expression, is_member_expression, to_handler_key, Bump, String,
};
use gesso_relief::ast::*;
use gesso_relief::errors::ErrorCode;

use crate::transform::{DirectiveTransformResult, TransformContext};
use crate::transforms::transform_expression::process_expression_node;

pub fn transform_on<'a>(
    dir: &DirectiveNode<'a>,
    el: &mut ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> DirectiveTransformResult<'a> {
    transform_on_with(dir, el, ctx, |result, _| result)
}

/// `transform_on`, with `augment` applied to the result before caching.
/// Platform transforms use it to wrap handlers in modifier guards.
pub fn transform_on_with<'a>(
    dir: &DirectiveNode<'a>,
    el: &mut ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
    augment: impl FnOnce(DirectiveTransformResult<'a>, &mut TransformContext<'a>) -> DirectiveTransformResult<'a>,
) -> DirectiveTransformResult<'a> {
    let allocator = ctx.allocator;
    let Some(arg) = &dir.arg else {
        return DirectiveTransformResult::empty(allocator);
    };
    if dir.exp.is_none() && dir.modifiers.is_empty() {
        ctx.report(ErrorCode::VOnNoExpression, Some(dir.loc.clone()));
    }

    let key = event_key(arg, el, ctx);

    let exp = match &dir.exp {
        Some(ExpressionNode::Simple(s)) if s.content.trim().is_empty() => None,
        Some(exp) => Some(exp.clone_in(allocator)),
        None => None,
    };
    let mut should_cache = ctx.options.cache_handlers && exp.is_none() && !ctx.in_v_once;

    let value = match exp {
        None => JsChildNode::code(allocator, "() => {}", ConstantType::NotConstant),
        Some(mut exp) => {
            let raw = expression_text(&exp);
            let is_member = is_member_expression(&raw);
            let is_inline = !(is_member || is_fn_expression(&raw));
            let multiple_statements = raw.contains(';');

            let mark = ctx.scope_mark();
            if is_inline {
                ctx.push_scope([String::from("$event")]);
            }
            process_expression_node(&mut exp, ctx);
            if is_inline {
                ctx.pop_scope();
            }

            if ctx.options.prefix_identifiers {
                let is_constant = matches!(&exp, ExpressionNode::Simple(s) if s.const_type > ConstantType::NotConstant);
                should_cache = ctx.options.cache_handlers
                    && !ctx.in_v_once
                    && !is_constant
                    && !(is_member && el.tag_type == ElementType::Component)
                    && !ctx.read_outer_scope_since(mark);
                if should_cache && is_member {
                    guard_member_call(&mut exp, allocator);
                }
            }

            if is_inline || (should_cache && is_member) {
                let params = if is_inline { "$event" } else { "(...args)" };
                let (open, close) = if multiple_statements {
                    ("{", "}")
                } else {
                    ("(", ")")
                };
                let mut wrapped = CompoundExpressionNode::new(allocator, exp.loc().clone());
                wrapped.children.push(CompoundExpressionChild::String(format_compact!(
                    "{} => {}",
                    params,
                    open
                )));
                push_expression(&mut wrapped, exp);
                wrapped.children.push(CompoundExpressionChild::String(close.into()));
                JsChildNode::CompoundExpression(ctx.alloc(wrapped))
            } else {
                JsChildNode::from_expression(exp)
            }
        }
    };

    let result = DirectiveTransformResult::with_prop(
        allocator,
        Property {
            key,
            value,
            loc: dir.loc.clone(),
        },
    );
    let mut result = augment(result, ctx);

    if should_cache {
        if let Some(prop) = result.props.first_mut() {
            let value = std::mem::replace(&mut prop.value, JsChildNode::string(allocator, ""));
            let cached = ctx.cache(value, false);
            prop.value = JsChildNode::Cache(ctx.alloc(cached));
        }
    }
    for prop in result.props.iter_mut() {
        match &mut prop.key {
            ExpressionNode::Simple(s) => s.is_handler_key = true,
            ExpressionNode::Compound(c) => c.is_handler_key = true,
        }
    }
    result
}

/// `click` → `onClick`, `vue:mounted` → `onVnodeMounted`, `[name]` →
/// `_toHandlerKey(name)`.
fn event_key<'a>(
    arg: &ExpressionNode<'a>,
    el: &ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> ExpressionNode<'a> {
    let allocator = ctx.allocator;
    match arg {
        ExpressionNode::Simple(s) if s.is_static => {
            let raw = match s.content.strip_prefix("vue:") {
                Some(hook) => format_compact!("vnode-{}", hook),
                None => s.content.clone(),
            };
            // Case-sensitive names on plain elements are kept as they are
            let keep_case = el.tag_type == ElementType::Element
                && !raw.starts_with("vnode")
                && raw.bytes().any(|b| b.is_ascii_uppercase());
            let name = if keep_case {
                format_compact!("on:{}", raw)
            } else {
                to_handler_key(&raw)
            };
            ExpressionNode::simple(allocator, SimpleExpressionNode::new(name, true, s.loc.clone()))
        }
        _ => {
            let mut key = CompoundExpressionNode::new(allocator, arg.loc().clone());
            let helper = ctx.helper(RuntimeHelper::ToHandlerKey);
            key.children.push(CompoundExpressionChild::Symbol(helper));
            key.children.push(CompoundExpressionChild::String("(".into()));
            push_expression(&mut key, arg.clone_in(allocator));
            key.children.push(CompoundExpressionChild::String(")".into()));
            ExpressionNode::Compound(ctx.alloc(key))
        }
    }
}

/// Source text of an expression as written, before prefixing.
fn expression_text(exp: &ExpressionNode<'_>) -> String {
    match exp {
        ExpressionNode::Simple(s) => s.content.clone(),
        ExpressionNode::Compound(c) => c.loc.source.clone(),
    }
}

/// `handler` → `handler && handler(...args)`, so a handler that is unset at
/// call time is skipped.
fn guard_member_call<'a>(exp: &mut ExpressionNode<'a>, allocator: &'a Bump) {
    match exp {
        ExpressionNode::Simple(s) => {
            s.content = format_compact!("{} && {}(...args)", s.content, s.content);
        }
        ExpressionNode::Compound(c) => {
            let copy = c.clone_in(allocator);
            c.children
                .push(CompoundExpressionChild::String(" && ".into()));
            for child in copy.children {
                c.children.push(child);
            }
            c.children
                .push(CompoundExpressionChild::String("(...args)".into()));
        }
    }
}

fn push_expression<'a>(compound: &mut CompoundExpressionNode<'a>, exp: ExpressionNode<'a>) {
    match exp {
        ExpressionNode::Simple(s) => compound.children.push(CompoundExpressionChild::Simple(s)),
        ExpressionNode::Compound(c) => compound.children.push(CompoundExpressionChild::Compound(c)),
    }
}
