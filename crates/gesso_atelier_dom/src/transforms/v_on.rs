//! v-on with DOM event modifiers.
//!
//! Modifiers split three ways: listener options (`.once`) are appended to
//! the event name, guards (`.stop`, `.ctrl`) wrap the handler in
//! `withModifiers`, and key filters (`.enter`) wrap it in `withKeys`.

use gesso_atelier_core::transform::{DirectiveTransformResult, TransformContext};
use gesso_atelier_core::transforms::v_on::transform_on_with;
use gesso_carton::{capitalize, format_compact, Bump, String};
use gesso_relief::ast::*;

use crate::options::event_modifiers::{
    is_event_option_modifier, is_keyboard_event, is_non_key_modifier, maybe_key_modifier,
};

#[derive(Debug, Default, PartialEq)]
struct Modifiers<'m> {
    keys: Vec<&'m str>,
    guards: Vec<&'m str>,
    options: Vec<&'m str>,
}

fn resolve_modifiers<'m>(key: Option<&str>, modifiers: &'m [String]) -> Modifiers<'m> {
    let mut resolved = Modifiers::default();
    for modifier in modifiers.iter().map(String::as_str) {
        if is_event_option_modifier(modifier) {
            resolved.options.push(modifier);
        } else if maybe_key_modifier(modifier) {
            match key {
                Some(key) if is_keyboard_event(key) => resolved.keys.push(modifier),
                Some(_) => resolved.guards.push(modifier),
                // Unknown event: guard both ways
                None => {
                    resolved.keys.push(modifier);
                    resolved.guards.push(modifier);
                }
            }
        } else if is_non_key_modifier(modifier) {
            resolved.guards.push(modifier);
        } else {
            resolved.keys.push(modifier);
        }
    }
    resolved
}

pub fn transform_on<'a>(
    dir: &DirectiveNode<'a>,
    el: &mut ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> DirectiveTransformResult<'a> {
    transform_on_with(dir, el, ctx, |mut result, ctx| {
        if dir.modifiers.is_empty() {
            return result;
        }
        let allocator = ctx.allocator;
        for prop in result.props.iter_mut() {
            let modifiers = resolve_modifiers(prop.static_key(), &dir.modifiers);

            let mut key = std::mem::replace(&mut prop.key, placeholder(allocator));
            if modifiers.guards.contains(&"right") {
                key = rename_click(key, "onContextmenu", ctx);
            }
            if modifiers.guards.contains(&"middle") {
                key = rename_click(key, "onMouseup", ctx);
            }

            let mut value = std::mem::replace(&mut prop.value, JsChildNode::string(allocator, ""));
            if !modifiers.guards.is_empty() {
                value = guard_call(value, RuntimeHelper::WithModifiers, &modifiers.guards, ctx);
            }
            let filters_keys = match &key {
                ExpressionNode::Simple(s) if s.is_static => is_keyboard_event(&s.content),
                _ => true,
            };
            if !modifiers.keys.is_empty() && filters_keys {
                value = guard_call(value, RuntimeHelper::WithKeys, &modifiers.keys, ctx);
            }

            if !modifiers.options.is_empty() {
                let mut postfix = String::default();
                for option in modifiers.options.iter() {
                    postfix.push_str(&capitalize(option));
                }
                key = append_postfix(key, &postfix, ctx);
            }
            prop.key = key;
            prop.value = value;
        }
        result
    })
}

fn placeholder(allocator: &Bump) -> ExpressionNode<'_> {
    ExpressionNode::simple(allocator, SimpleExpressionNode::new("", true, SourceLocation::STUB))
}

/// `helper(handler, ["a","b"])`
fn guard_call<'a>(
    handler: JsChildNode<'a>,
    helper: RuntimeHelper,
    modifiers: &[&str],
    ctx: &mut TransformContext<'a>,
) -> JsChildNode<'a> {
    let allocator = ctx.allocator;
    let helper = ctx.helper(helper);
    let list = serde_json::to_string(modifiers).unwrap_or_default();
    let mut call = CallExpression::new(allocator, Callee::Symbol(helper), SourceLocation::STUB);
    call.arguments.push(CallArgument::Node(handler));
    call.arguments.push(CallArgument::Raw(String::from(list)));
    JsChildNode::Call(ctx.alloc(call))
}

/// Mouse buttons other than the primary one fire their own events.
fn rename_click<'a>(
    key: ExpressionNode<'a>,
    event: &str,
    ctx: &mut TransformContext<'a>,
) -> ExpressionNode<'a> {
    let allocator = ctx.allocator;
    match key {
        ExpressionNode::Simple(s) if s.is_static => {
            if s.content.eq_ignore_ascii_case("onclick") {
                ExpressionNode::simple(allocator, SimpleExpressionNode::new(event, true, s.loc.clone()))
            } else {
                ExpressionNode::Simple(s)
            }
        }
        dynamic => {
            let mut renamed = CompoundExpressionNode::new(allocator, dynamic.loc().clone());
            renamed.children.push(CompoundExpressionChild::String("(".into()));
            push_expression(&mut renamed, dynamic.clone_in(allocator));
            renamed.children.push(CompoundExpressionChild::String(format_compact!(
                ") === \"onClick\" ? \"{}\" : (",
                event
            )));
            push_expression(&mut renamed, dynamic);
            renamed.children.push(CompoundExpressionChild::String(")".into()));
            ExpressionNode::Compound(ctx.alloc(renamed))
        }
    }
}

fn append_postfix<'a>(
    key: ExpressionNode<'a>,
    postfix: &str,
    ctx: &mut TransformContext<'a>,
) -> ExpressionNode<'a> {
    let allocator = ctx.allocator;
    match key {
        ExpressionNode::Simple(s) if s.is_static => ExpressionNode::simple(
            allocator,
            SimpleExpressionNode::new(format_compact!("{}{}", s.content, postfix), true, s.loc.clone()),
        ),
        dynamic => {
            let mut appended = CompoundExpressionNode::new(allocator, dynamic.loc().clone());
            appended.children.push(CompoundExpressionChild::String("(".into()));
            push_expression(&mut appended, dynamic);
            appended.children.push(CompoundExpressionChild::String(format_compact!(
                ") + \"{}\"",
                postfix
            )));
            ExpressionNode::Compound(ctx.alloc(appended))
        }
    }
}

fn push_expression<'a>(compound: &mut CompoundExpressionNode<'a>, exp: ExpressionNode<'a>) {
    match exp {
        ExpressionNode::Simple(s) => compound.children.push(CompoundExpressionChild::Simple(s)),
        ExpressionNode::Compound(c) => compound.children.push(CompoundExpressionChild::Compound(c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(modifiers: &[&str]) -> std::vec::Vec<String> {
        modifiers.iter().map(|m| String::from(*m)).collect()
    }

    #[test]
    fn test_resolve_modifiers() {
        let mods = names(&["stop", "enter", "once", "left"]);
        let resolved = resolve_modifiers(Some("onKeyup"), &mods);
        assert_eq!(resolved.guards, ["stop"]);
        assert_eq!(resolved.keys, ["enter", "left"]);
        assert_eq!(resolved.options, ["once"]);

        let resolved = resolve_modifiers(Some("onClick"), &mods);
        assert_eq!(resolved.guards, ["stop", "left"]);
    }

    #[test]
    fn test_dynamic_event_guards_both_ways() {
        let mods = names(&["right"]);
        let resolved = resolve_modifiers(None, &mods);
        assert_eq!(resolved.keys, ["right"]);
        assert_eq!(resolved.guards, ["right"]);
    }
}
