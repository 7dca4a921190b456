//! v-bind directive transform.
//!
//! Turns `:name="value"` into a single vnode property. Spreads
//! (`v-bind="obj"`) never reach this transform; they are merged while
//! building props.

use gesso_carton::{camelize, format_compact};
use gesso_relief::ast::*;
use gesso_relief::errors::ErrorCode;

use crate::transform::{DirectiveTransformResult, TransformContext};
use crate::transforms::transform_expression::process_expression;

pub fn transform_bind<'a>(
    dir: &DirectiveNode<'a>,
    _el: &mut ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> DirectiveTransformResult<'a> {
    let allocator = ctx.allocator;
    let Some(arg) = &dir.arg else {
        return DirectiveTransformResult::empty(allocator);
    };

    let value = match &dir.exp {
        Some(exp) if has_content(exp) => exp.clone_in(allocator),
        _ => match dir.static_arg() {
            // `:foo-bar` binds the `fooBar` variable
            Some(name) => {
                let mut exp = SimpleExpressionNode::new(camelize(name), false, arg.loc().clone());
                process_expression(&mut exp, ctx);
                ExpressionNode::Simple(ctx.alloc(exp))
            }
            None => {
                ctx.report(ErrorCode::VBindNoExpression, Some(dir.loc.clone()));
                let key = arg.clone_in(allocator);
                return DirectiveTransformResult::with_prop(
                    allocator,
                    Property {
                        key,
                        value: JsChildNode::string(allocator, ""),
                        loc: dir.loc.clone(),
                    },
                );
            }
        },
    };

    let key = match arg {
        ExpressionNode::Simple(s) if s.is_static => {
            let mut key = SimpleExpressionNode::new(s.content.clone(), true, s.loc.clone());
            if dir.has_modifier("camel") {
                key.content = camelize(&key.content);
            }
            if let Some(prefix) = modifier_prefix(dir) {
                key.content = format_compact!("{}{}", prefix, key.content);
            }
            ExpressionNode::Simple(ctx.alloc(key))
        }
        _ => {
            let key = dynamic_key(arg, dir, ctx);
            ExpressionNode::Compound(ctx.alloc(key))
        }
    };

    DirectiveTransformResult::with_prop(
        allocator,
        Property {
            key,
            value: JsChildNode::from_expression(value),
            loc: dir.loc.clone(),
        },
    )
}

fn has_content(exp: &ExpressionNode<'_>) -> bool {
    match exp {
        ExpressionNode::Simple(s) => !s.content.trim().is_empty(),
        ExpressionNode::Compound(_) => true,
    }
}

/// `.prop` forces a DOM property, `.attr` an attribute.
fn modifier_prefix(dir: &DirectiveNode<'_>) -> Option<&'static str> {
    if dir.has_modifier("prop") {
        Some(".")
    } else if dir.has_modifier("attr") {
        Some("^")
    } else {
        None
    }
}

/// `[name]` becomes `name || ""`, wrapped for `.camel` and prefixed for
/// `.prop` / `.attr`.
fn dynamic_key<'a>(
    arg: &ExpressionNode<'a>,
    dir: &DirectiveNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> CompoundExpressionNode<'a> {
    let allocator = ctx.allocator;
    let mut key = CompoundExpressionNode::new(allocator, arg.loc().clone());
    let prefix = modifier_prefix(dir);
    let camel = dir.has_modifier("camel");

    if let Some(prefix) = prefix {
        key.children
            .push(CompoundExpressionChild::String(format_compact!("'{}' + (", prefix)));
    }
    if camel {
        let helper = ctx.helper(RuntimeHelper::Camelize);
        key.children.push(CompoundExpressionChild::Symbol(helper));
        key.children.push(CompoundExpressionChild::String("(".into()));
    }
    match arg.clone_in(allocator) {
        ExpressionNode::Simple(s) => {
            key.identifiers = s.identifiers.clone();
            key.children.push(CompoundExpressionChild::Simple(s));
        }
        ExpressionNode::Compound(c) => {
            key.identifiers = c.identifiers.clone();
            key.children.push(CompoundExpressionChild::String("(".into()));
            key.children.push(CompoundExpressionChild::Compound(c));
            key.children.push(CompoundExpressionChild::String(")".into()));
        }
    }
    key.children
        .push(CompoundExpressionChild::String(" || \"\"".into()));
    if camel {
        key.children.push(CompoundExpressionChild::String(")".into()));
    }
    if prefix.is_some() {
        key.children.push(CompoundExpressionChild::String(")".into()));
    }
    key
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

    fn with_props<R>(
        src: &str,
        f: impl FnOnce(&[Property<'_>], &[CompilerError]) -> R,
    ) -> R {
        let allocator = Bump::new();
        let (mut root, _) = parse(&allocator, src);
        let options = TransformOptions {
            prefix_identifiers: true,
            hoist_static: false,
            ..Default::default()
        };
        let output = transform(&allocator, &mut root, &options, &base_transform_pipeline()).unwrap();
        let Some(JsChildNode::TemplateChild(TemplateChildNode::Element(el))) = &root.codegen_node
        else {
            panic!("expected element root");
        };
        let Some(ElementCodegenNode::VNodeCall(vnode)) = &el.codegen_node else {
            panic!("expected vnode call");
        };
        // Dynamic keys arrive wrapped in `normalizeProps`
        let obj = match &vnode.props {
            Some(PropsExpression::Object(obj)) => obj,
            Some(PropsExpression::Call(call)) => match &call.arguments[0] {
                CallArgument::Node(JsChildNode::Object(obj)) => obj,
                other => panic!("expected object argument, got {:?}", other),
            },
            other => panic!("expected object props, got {:?}", other),
        };
        f(&obj.properties, &output.errors)
    }

    fn value<'p>(prop: &'p Property<'_>) -> &'p str {
        match &prop.value {
            JsChildNode::SimpleExpression(s) => s.content.as_str(),
            other => panic!("expected simple value, got {:?}", other),
        }
    }

    #[test]
    fn test_static_arg() {
        with_props(r#"<div :title="msg"></div>"#, |props, errors| {
            assert!(errors.is_empty());
            assert_eq!(props[0].static_key(), Some("title"));
            assert_eq!(value(&props[0]), "_ctx.msg");
        });
    }

    #[test]
    fn test_same_name_shorthand() {
        with_props(r#"<div :data-id></div>"#, |props, errors| {
            assert!(errors.is_empty());
            assert_eq!(props[0].static_key(), Some("data-id"));
            assert_eq!(value(&props[0]), "_ctx.dataId");
        });
    }

    #[test]
    fn test_modifiers() {
        with_props(
            r#"<div :foo-bar.camel="a" :inner.prop="b" :aria-x.attr="c"></div>"#,
            |props, _| {
                let keys: std::vec::Vec<_> = props.iter().filter_map(|p| p.static_key()).collect();
                assert_eq!(keys, ["fooBar", ".inner", "^aria-x"]);
            },
        );
    }

    #[test]
    fn test_dynamic_arg() {
        with_props(r#"<div :[key].camel="v"></div>"#, |props, _| {
            let ExpressionNode::Compound(key) = &props[0].key else {
                panic!("expected compound key");
            };
            assert!(matches!(
                key.children[0],
                CompoundExpressionChild::Symbol(RuntimeHelper::Camelize)
            ));
            assert!(matches!(
                key.children.last(),
                Some(CompoundExpressionChild::String(s)) if s == ")"
            ));
        });
    }

    #[test]
    fn test_dynamic_arg_without_expression() {
        with_props(r#"<div :[key]></div>"#, |_, errors| {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].code, ErrorCode::VBindNoExpression);
        });
    }
}
