//! v-model directive transform.
//!
//! Produces the value prop and its `onUpdate:` handler. Components also
//! receive their modifiers as a `<name>Modifiers` object. Platform
//! transforms add the element-specific runtime directive on top.

use gesso_carton::{
    camelize, format_compact, is_member_expression, is_simple_identifier, Bump, String,
};
use gesso_relief::ast::*;
use gesso_relief::errors::ErrorCode;

use crate::transform::{DirectiveTransformResult, TransformContext};

pub fn transform_model<'a>(
    dir: &DirectiveNode<'a>,
    el: &mut ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> DirectiveTransformResult<'a> {
    let allocator = ctx.allocator;
    let Some(exp) = &dir.exp else {
        ctx.report(ErrorCode::VModelNoExpression, Some(dir.loc.clone()));
        return DirectiveTransformResult::empty(allocator);
    };

    let raw = exp.loc().source.trim();
    let raw = if raw.is_empty() {
        match exp {
            ExpressionNode::Simple(s) => s.content.trim(),
            ExpressionNode::Compound(_) => raw,
        }
    } else {
        raw
    };
    if raw.is_empty() || !is_member_expression(raw) {
        ctx.report(ErrorCode::VModelMalformedExpression, Some(exp.loc().clone()));
        return DirectiveTransformResult::empty(allocator);
    }
    if ctx.options.prefix_identifiers && is_simple_identifier(raw) && ctx.is_scoped(raw) {
        ctx.report(ErrorCode::VModelOnScopeVariable, Some(exp.loc().clone()));
        return DirectiveTransformResult::empty(allocator);
    }

    let static_arg = dir.static_arg();
    let prop_name = match &dir.arg {
        Some(arg) => arg.clone_in(allocator),
        None => ExpressionNode::simple(
            allocator,
            SimpleExpressionNode::new("modelValue", true, SourceLocation::STUB),
        ),
    };
    let event_name = match (&dir.arg, static_arg) {
        (None, _) => static_key(allocator, "onUpdate:modelValue"),
        (Some(_), Some(name)) => static_key(allocator, format_compact!("onUpdate:{}", camelize(name))),
        (Some(arg), None) => {
            let mut key = CompoundExpressionNode::new(allocator, arg.loc().clone());
            key.children
                .push(CompoundExpressionChild::String("\"onUpdate:\" + ".into()));
            push_expression(&mut key, arg.clone_in(allocator));
            ExpressionNode::Compound(ctx.alloc(key))
        }
    };

    let mut assignment = CompoundExpressionNode::new(allocator, dir.loc.clone());
    assignment
        .children
        .push(CompoundExpressionChild::String("$event => ((".into()));
    push_expression(&mut assignment, exp.clone_in(allocator));
    assignment
        .children
        .push(CompoundExpressionChild::String(") = $event)".into()));
    let mut handler = JsChildNode::CompoundExpression(ctx.alloc(assignment));

    if ctx.options.prefix_identifiers
        && ctx.options.cache_handlers
        && !ctx.in_v_once
        && !has_scope_ref(exp)
    {
        let cached = ctx.cache(handler, false);
        handler = JsChildNode::Cache(ctx.alloc(cached));
    }

    let mut result = DirectiveTransformResult::empty(allocator);
    result.props.push(Property {
        key: prop_name,
        value: JsChildNode::from_expression(exp.clone_in(allocator)),
        loc: dir.loc.clone(),
    });
    result.props.push(Property {
        key: event_name,
        value: handler,
        loc: dir.loc.clone(),
    });

    if !dir.modifiers.is_empty() && el.tag_type == ElementType::Component {
        let entries: std::vec::Vec<String> = dir
            .modifiers
            .iter()
            .map(|m| {
                if is_simple_identifier(m) {
                    format_compact!("{}: true", m)
                } else {
                    let quoted = serde_json::to_string(m.as_str()).unwrap_or_default();
                    format_compact!("{}: true", quoted)
                }
            })
            .collect();
        let modifiers = format_compact!("{{ {} }}", entries.join(", "));
        let key = match (&dir.arg, static_arg) {
            (None, _) => static_key(allocator, "modelModifiers"),
            (Some(_), Some(name)) => static_key(allocator, format_compact!("{}Modifiers", name)),
            (Some(arg), None) => {
                let mut key = CompoundExpressionNode::new(allocator, arg.loc().clone());
                push_expression(&mut key, arg.clone_in(allocator));
                key.children
                    .push(CompoundExpressionChild::String(" + \"Modifiers\"".into()));
                ExpressionNode::Compound(ctx.alloc(key))
            }
        };
        result.props.push(Property {
            key,
            value: JsChildNode::code(allocator, modifiers, ConstantType::CanCache),
            loc: dir.loc.clone(),
        });
    }
    tracing::trace!(props = result.props.len(), "v-model");
    result
}

fn static_key<'a>(allocator: &'a Bump, name: impl Into<String>) -> ExpressionNode<'a> {
    ExpressionNode::simple(allocator, SimpleExpressionNode::new(name, true, SourceLocation::STUB))
}

fn has_scope_ref(exp: &ExpressionNode<'_>) -> bool {
    match exp {
        ExpressionNode::Simple(s) => s.identifiers.as_ref().is_some_and(|ids| !ids.is_empty()),
        ExpressionNode::Compound(c) => c.identifiers.as_ref().is_some_and(|ids| !ids.is_empty()),
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
    use crate::transform::transform;
    use crate::transforms::base_transform_pipeline;
    use gesso_armature::parse;
    use gesso_relief::errors::CompilerError;
    use gesso_relief::options::TransformOptions;

    fn options(cache_handlers: bool) -> TransformOptions {
        TransformOptions {
            prefix_identifiers: true,
            hoist_static: false,
            cache_handlers,
            ..Default::default()
        }
    }

    fn errors_of(src: &str) -> std::vec::Vec<CompilerError> {
        let allocator = Bump::new();
        let (mut root, _) = parse(&allocator, src);
        transform(&allocator, &mut root, &options(false), &base_transform_pipeline())
            .unwrap()
            .errors
    }

    fn with_props<R>(
        src: &str,
        options: TransformOptions,
        f: impl FnOnce(&[Property<'_>]) -> R,
    ) -> R {
        let allocator = Bump::new();
        let (mut root, _) = parse(&allocator, src);
        transform(&allocator, &mut root, &options, &base_transform_pipeline()).unwrap();
        let Some(JsChildNode::TemplateChild(TemplateChildNode::Element(el))) = &root.codegen_node
        else {
            panic!("expected element root");
        };
        let Some(ElementCodegenNode::VNodeCall(vnode)) = &el.codegen_node else {
            panic!("expected vnode call");
        };
        match &vnode.props {
            Some(PropsExpression::Object(obj)) => f(&obj.properties),
            other => panic!("expected object props, got {:?}", other),
        }
    }

    #[test]
    fn test_component_model() {
        with_props(r#"<Comp v-model="foo"/>"#, options(false), |props| {
            let keys: std::vec::Vec<_> = props.iter().filter_map(|p| p.static_key()).collect();
            assert_eq!(keys, ["modelValue", "onUpdate:modelValue"]);
            let JsChildNode::SimpleExpression(value) = &props[0].value else {
                panic!("expected model value");
            };
            assert_eq!(value.content, "_ctx.foo");
            let JsChildNode::CompoundExpression(handler) = &props[1].value else {
                panic!("expected assignment");
            };
            assert!(matches!(
                &handler.children[0],
                CompoundExpressionChild::String(s) if s == "$event => (("
            ));
        });
    }

    #[test]
    fn test_argument_and_modifiers() {
        with_props(r#"<Comp v-model:page-title.trim="t"/>"#, options(false), |props| {
            let keys: std::vec::Vec<_> = props.iter().filter_map(|p| p.static_key()).collect();
            assert_eq!(keys, ["page-title", "onUpdate:pageTitle", "page-titleModifiers"]);
            let JsChildNode::SimpleExpression(mods) = &props[2].value else {
                panic!("expected modifiers object");
            };
            assert_eq!(mods.content, "{ trim: true }");
        });
    }

    #[test]
    fn test_cached_update_handler() {
        with_props(r#"<Comp v-model="foo"/>"#, options(true), |props| {
            assert!(matches!(&props[1].value, JsChildNode::Cache(c) if c.index == 0));
        });
    }

    #[test]
    fn test_misuse() {
        let errors = errors_of(r#"<Comp v-model/>"#);
        assert_eq!(errors[0].code, ErrorCode::VModelNoExpression);

        let errors = errors_of(r#"<Comp v-model="a + b"/>"#);
        assert_eq!(errors[0].code, ErrorCode::VModelMalformedExpression);

        let errors = errors_of(r#"<Comp v-for="item in list" v-model="item"/>"#);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::VModelOnScopeVariable);
    }
}
