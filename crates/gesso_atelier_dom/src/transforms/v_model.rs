//! v-model on native form elements.
//!
//! Components keep the base result. Elements lose the `modelValue` prop,
//! since the runtime directive sets the value, and gain the directive that
//! matches the element and its `type`.

use gesso_atelier_core::transform::{DirectiveTransformResult, TransformContext};
use gesso_atelier_core::transforms::v_model::transform_model as base_transform_model;
use gesso_relief::ast::*;
use gesso_relief::errors::ErrorCode;

use crate::options::element_checks::is_v_model_element;

pub fn transform_model<'a>(
    dir: &DirectiveNode<'a>,
    el: &mut ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> DirectiveTransformResult<'a> {
    let mut result = base_transform_model(dir, el, ctx);
    if result.props.is_empty() || el.tag_type == ElementType::Component {
        return result;
    }

    if let Some(arg) = &dir.arg {
        ctx.report(ErrorCode::VModelArgOnElement, Some(arg.loc().clone()));
    }

    let is_custom = (ctx.options.is_custom_element)(&el.tag);
    if is_v_model_element(&el.tag) || is_custom {
        let directive = match el.tag.as_str() {
            "select" => Some(RuntimeHelper::VModelSelect),
            "textarea" => {
                check_duplicated_value(el, ctx);
                Some(RuntimeHelper::VModelText)
            }
            _ => input_directive(dir, el, ctx),
        };
        if let Some(helper) = directive {
            result.need_runtime = Some(RuntimeDirective::Helper(ctx.helper(helper)));
        }
    } else {
        ctx.report(ErrorCode::VModelOnInvalidElement, Some(dir.loc.clone()));
    }

    result.props.retain(|prop| prop.static_key() != Some("modelValue"));
    result
}

/// Directive for an `<input>` (or custom element) from its `type`.
/// `None` when the type cannot be bound at all.
fn input_directive<'a>(
    dir: &DirectiveNode<'a>,
    el: &ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> Option<RuntimeHelper> {
    match find_type(el) {
        Some(TypeProp::Dynamic) => Some(RuntimeHelper::VModelDynamic),
        Some(TypeProp::Static(Some(kind))) => match kind {
            "radio" => Some(RuntimeHelper::VModelRadio),
            "checkbox" => Some(RuntimeHelper::VModelCheckbox),
            "file" => {
                ctx.report(ErrorCode::VModelOnFileInputElement, Some(dir.loc.clone()));
                None
            }
            _ => {
                check_duplicated_value(el, ctx);
                Some(RuntimeHelper::VModelText)
            }
        },
        Some(TypeProp::Static(None)) => Some(RuntimeHelper::VModelText),
        None if has_dynamic_key_bind(el) => Some(RuntimeHelper::VModelDynamic),
        None => {
            check_duplicated_value(el, ctx);
            Some(RuntimeHelper::VModelText)
        }
    }
}

enum TypeProp<'s> {
    Static(Option<&'s str>),
    Dynamic,
}

fn find_type<'s>(el: &'s ElementNode<'_>) -> Option<TypeProp<'s>> {
    el.props.iter().find_map(|prop| match prop {
        PropNode::Attribute(attr) if attr.name == "type" => Some(TypeProp::Static(
            attr.value.as_ref().map(|v| v.content.as_str()),
        )),
        PropNode::Directive(dir) if dir.name == "bind" && dir.static_arg() == Some("type") => {
            Some(TypeProp::Dynamic)
        }
        _ => None,
    })
}

/// `v-bind="obj"` or `:[key]` may set `type` at runtime.
fn has_dynamic_key_bind(el: &ElementNode<'_>) -> bool {
    el.props.iter().any(|prop| {
        matches!(prop, PropNode::Directive(dir)
            if dir.name == "bind" && (dir.arg.is_none() || dir.static_arg().is_none()))
    })
}

/// A `:value` next to v-model is overwritten by it.
fn check_duplicated_value<'a>(el: &ElementNode<'a>, ctx: &mut TransformContext<'a>) {
    let value = el.props.iter().find_map(|prop| match prop {
        PropNode::Directive(dir) if dir.name == "bind" && dir.static_arg() == Some("value") => {
            Some(dir.loc.clone())
        }
        _ => None,
    });
    if let Some(loc) = value {
        ctx.report(ErrorCode::VModelUnnecessaryValue, Some(loc));
    }
}
