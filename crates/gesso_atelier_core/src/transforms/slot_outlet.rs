//! `<slot>` outlets.
//!
//! An outlet renders `renderSlot($slots, name, props?, fallback?)`. The
//! `name` attribute picks the slot; every other attribute or binding is
//! passed to the slot function as a camelized prop.

use gesso_carton::{camelize, String, Vec};
use gesso_relief::ast::*;
use gesso_relief::errors::ErrorCode;

use crate::transform::{NodeAction, NodeTransform, SiblingCursor, TransformContext};
use crate::transforms::props::{build_props, props_into_js};
use crate::transforms::transform_expression::process_expression;

pub struct TransformSlotOutlet;

impl NodeTransform for TransformSlotOutlet {
    fn name(&self) -> &'static str {
        "slot-outlet"
    }

    fn enter<'a>(
        &self,
        node: &mut TemplateChildNode<'a>,
        _cursor: &mut SiblingCursor<'_, 'a>,
        ctx: &mut TransformContext<'a>,
    ) -> NodeAction<'a> {
        if !matches!(node, TemplateChildNode::Element(el) if el.tag_type == ElementType::Slot) {
            return NodeAction::Continue;
        }
        ctx.slot_outlets += 1;
        NodeAction::exit(|node, ctx| {
            let TemplateChildNode::Element(el) = node else {
                return;
            };
            let call = render_slot(el, ctx);
            el.codegen_node = Some(ElementCodegenNode::Call(ctx.alloc(call)));
        })
    }
}

fn render_slot<'a>(el: &mut ElementNode<'a>, ctx: &mut TransformContext<'a>) -> CallExpression<'a> {
    let allocator = ctx.allocator;
    let name = take_slot_name(el, ctx);
    camelize_prop_names(el);

    let mut props = None;
    if !el.props.is_empty() {
        let result = build_props(el, ctx, false, false);
        if let Some(first) = result.directives.first() {
            ctx.report(
                ErrorCode::VSlotUnexpectedDirectiveOnSlotOutlet,
                Some(first.loc.clone()),
            );
        }
        props = result.props;
    }

    let mut call = CallExpression::new(
        allocator,
        Callee::Symbol(ctx.helper(RuntimeHelper::RenderSlot)),
        el.loc.clone(),
    );
    let slots = if ctx.options.prefix_identifiers {
        "_ctx.$slots"
    } else {
        "$slots"
    };
    call.arguments.push(CallArgument::Raw(String::from(slots)));
    call.arguments.push(CallArgument::Node(name));

    let has_fallback = !el.children.is_empty();
    match props {
        Some(props) => call.arguments.push(CallArgument::Node(props_into_js(props))),
        None if has_fallback => call.arguments.push(CallArgument::Raw(String::from("{}"))),
        None => {}
    }
    if has_fallback {
        let mut fallback = FunctionExpression::new(allocator, el.loc.clone());
        fallback.returns = Some(FunctionReturns::Multiple(std::mem::replace(
            &mut el.children,
            Vec::new_in(allocator),
        )));
        call.arguments
            .push(CallArgument::Node(JsChildNode::Function(ctx.alloc(fallback))));
    }
    tracing::trace!(args = call.arguments.len(), "slot outlet");
    call
}

/// Remove the `name` prop, and valueless attributes, returning the slot name.
fn take_slot_name<'a>(el: &mut ElementNode<'a>, ctx: &mut TransformContext<'a>) -> JsChildNode<'a> {
    let allocator = ctx.allocator;
    let mut name = JsChildNode::string(allocator, "default");
    let mut index = 0;
    while index < el.props.len() {
        let remove = match &el.props[index] {
            PropNode::Attribute(attr) => match &attr.value {
                Some(value) if attr.name == "name" => {
                    name = JsChildNode::string(allocator, value.content.clone());
                    true
                }
                Some(_) => false,
                None => true,
            },
            PropNode::Directive(dir) if dir.name == "bind" && dir.static_arg() == Some("name") => {
                name = match &dir.exp {
                    Some(exp) => JsChildNode::from_expression(exp.clone_in(allocator)),
                    // `:name` alone reads the same-name variable
                    None => {
                        let mut exp = SimpleExpressionNode::new("name", false, dir.loc.clone());
                        process_expression(&mut exp, ctx);
                        JsChildNode::SimpleExpression(ctx.alloc(exp))
                    }
                };
                true
            }
            PropNode::Directive(_) => false,
        };
        if remove {
            remove_prop_at(el, index);
        } else {
            index += 1;
        }
    }
    name
}

/// Remove a prop and keep directive results pointing at the right props.
fn remove_prop_at(el: &mut ElementNode<'_>, index: usize) {
    el.remove_prop(index);
    el.directive_results.retain(|r| r.prop_index != index);
    for result in el.directive_results.iter_mut() {
        if result.prop_index > index {
            result.prop_index -= 1;
        }
    }
}

/// Slot props reach the slot function camelized.
fn camelize_prop_names(el: &mut ElementNode<'_>) {
    for prop in el.props.iter_mut() {
        if let PropNode::Attribute(attr) = prop {
            attr.name = camelize(&attr.name);
        }
    }
    for result in el.directive_results.iter_mut() {
        let is_static_bind = matches!(
            el.props.get(result.prop_index),
            Some(PropNode::Directive(d)) if d.name == "bind" && d.static_arg().is_some()
        );
        if !is_static_bind {
            continue;
        }
        for prop in result.props.iter_mut() {
            if let ExpressionNode::Simple(key) = &mut prop.key {
                if key.is_static {
                    key.content = camelize(&key.content);
                }
            }
        }
    }
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

    fn outlet<'a>(
        allocator: &'a Bump,
        src: &'a str,
    ) -> (RootNode<'a>, std::vec::Vec<CompilerError>) {
        let (mut root, _) = parse(allocator, src);
        let options = TransformOptions {
            prefix_identifiers: true,
            ..Default::default()
        };
        let output = transform(allocator, &mut root, &options, &base_transform_pipeline()).unwrap();
        (root, output.errors)
    }

    fn slot_call<'r, 'a>(root: &'r RootNode<'a>) -> &'r CallExpression<'a> {
        let Some(JsChildNode::TemplateChild(TemplateChildNode::Element(el))) = &root.codegen_node
        else {
            panic!("expected slot outlet root");
        };
        match &el.codegen_node {
            Some(ElementCodegenNode::Call(call)) => call,
            other => panic!("expected renderSlot call, got {:?}", other),
        }
    }

    fn arg_string<'r>(arg: &'r CallArgument<'_>) -> &'r str {
        match arg {
            CallArgument::Raw(raw) => raw,
            CallArgument::Node(JsChildNode::SimpleExpression(s)) => &s.content,
            other => panic!("unexpected argument {:?}", other),
        }
    }

    #[test]
    fn test_default_outlet() {
        let allocator = Bump::new();
        let (root, errors) = outlet(&allocator, "<slot/>");
        assert!(errors.is_empty());
        let call = slot_call(&root);
        assert_eq!(call.callee, Callee::Symbol(RuntimeHelper::RenderSlot));
        assert_eq!(call.arguments.len(), 2);
        assert_eq!(arg_string(&call.arguments[0]), "_ctx.$slots");
        assert_eq!(arg_string(&call.arguments[1]), "default");
    }

    #[test]
    fn test_static_and_dynamic_names() {
        let allocator = Bump::new();
        let (root, _) = outlet(&allocator, r#"<slot name="header"/>"#);
        assert_eq!(arg_string(&slot_call(&root).arguments[1]), "header");

        let (root, _) = outlet(&allocator, r#"<slot :name="which"/>"#);
        let call = slot_call(&root);
        assert_eq!(arg_string(&call.arguments[1]), "_ctx.which");
        assert_eq!(call.arguments.len(), 2);
    }

    #[test]
    fn test_props_are_camelized() {
        let allocator = Bump::new();
        let (root, _) = outlet(&allocator, r#"<slot foo-bar="1" :baz-qux="x" disabled/>"#);
        let call = slot_call(&root);
        let CallArgument::Node(JsChildNode::Object(props)) = &call.arguments[2] else {
            panic!("expected slot props");
        };
        let keys: std::vec::Vec<_> = props.properties.iter().filter_map(|p| p.static_key()).collect();
        assert_eq!(keys, ["fooBar", "bazQux"]);
    }

    #[test]
    fn test_fallback_content() {
        let allocator = Bump::new();
        let (root, _) = outlet(&allocator, "<slot><b>fallback</b></slot>");
        let call = slot_call(&root);
        assert_eq!(call.arguments.len(), 4);
        assert_eq!(arg_string(&call.arguments[2]), "{}");
        assert!(matches!(&call.arguments[3], CallArgument::Node(JsChildNode::Function(_))));
    }

    #[test]
    fn test_directive_on_outlet() {
        let allocator = Bump::new();
        let (_, errors) = outlet(&allocator, "<slot v-focus/>");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::VSlotUnexpectedDirectiveOnSlotOutlet);
    }
}
