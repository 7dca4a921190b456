//! Static `style` attributes become constant `:style` bindings.
//!
//! `style="color: red"` is parsed at compile time into `{"color":"red"}`, so
//! it merges with a dynamic `:style` on the same element and can be hoisted.

use gesso_atelier_core::transform::{NodeAction, NodeTransform, SiblingCursor, TransformContext};
use gesso_carton::String;
use gesso_relief::ast::*;

pub struct TransformStyle;

impl NodeTransform for TransformStyle {
    fn name(&self) -> &'static str {
        "style"
    }

    fn enter<'a>(
        &self,
        node: &mut TemplateChildNode<'a>,
        _cursor: &mut SiblingCursor<'_, 'a>,
        ctx: &mut TransformContext<'a>,
    ) -> NodeAction<'a> {
        let TemplateChildNode::Element(el) = node else {
            return NodeAction::Continue;
        };
        let allocator = ctx.allocator;
        for prop in el.props.iter_mut() {
            let PropNode::Attribute(attr) = prop else {
                continue;
            };
            if attr.name != "style" {
                continue;
            }
            let Some(value) = &attr.value else {
                continue;
            };
            let object = style_object(&value.content);
            let mut exp = SimpleExpressionNode::new(object, false, value.loc.clone());
            exp.const_type = ConstantType::CanStringify;

            let mut dir = DirectiveNode::new(allocator, "bind", attr.loc.clone());
            dir.raw_name = Some(String::from(":style"));
            dir.arg = Some(ExpressionNode::simple(
                allocator,
                SimpleExpressionNode::new("style", true, attr.name_loc.clone()),
            ));
            dir.exp = Some(ExpressionNode::simple(allocator, exp));
            *prop = PropNode::Directive(ctx.alloc(dir));
        }
        NodeAction::Continue
    }
}

/// `a: 1; b: url(x;y)` as a JSON object literal, in declaration order.
/// A repeated property keeps its first position and its last value.
pub fn style_object(css: &str) -> std::string::String {
    let without_comments = strip_comments(css);
    let mut entries: Vec<(&str, &str)> = Vec::new();
    for declaration in split_declarations(&without_comments) {
        let Some((name, value)) = declaration.split_once(':') else {
            continue;
        };
        let (name, value) = (name.trim(), value.trim());
        match entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => entries.push((name, value)),
        }
    }
    let fields: Vec<_> = entries
        .iter()
        .map(|(name, value)| {
            format!(
                "{}:{}",
                serde_json::Value::from(*name),
                serde_json::Value::from(*value)
            )
        })
        .collect();
    format!("{{{}}}", fields.join(","))
}

fn strip_comments(css: &str) -> std::string::String {
    let mut out = std::string::String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Split on `;` outside parentheses.
fn split_declarations(css: &str) -> impl Iterator<Item = &str> {
    let mut depth = 0usize;
    let mut start = 0;
    let mut parts = Vec::new();
    for (i, b) in css.bytes().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b';' if depth == 0 => {
                parts.push(&css[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&css[start..]);
    parts.into_iter().filter(|part| !part.trim().is_empty())
}
