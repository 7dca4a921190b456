//! v-once directive transform.
//!
//! The subtree is rendered once and kept in a `_cache` slot. While inside it,
//! nothing else is hoisted or cached.

use gesso_relief::ast::*;
use gesso_relief::errors::ErrorCode;

use crate::transform::{NodeAction, NodeTransform, SiblingCursor, TransformContext};

/// Check if element has v-once directive
pub fn has_v_once(el: &ElementNode<'_>) -> bool {
    el.has_dir("once")
}

pub struct TransformOnce;

impl NodeTransform for TransformOnce {
    fn name(&self) -> &'static str {
        "v-once"
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
        // Branch elements are re-visited inside their branch, where the
        // directive is handled
        if el.has_dir("else") || el.has_dir("else-if") {
            return NodeAction::Continue;
        }
        let Some(index) = el.find_dir_index("once") else {
            return NodeAction::Continue;
        };
        let dir = el.remove_prop(index);
        if ctx.in_v_once {
            return NodeAction::Continue;
        }
        if ctx.v_memo_depth > 0 {
            ctx.report(ErrorCode::VOnceInsideMemo, Some(dir.loc().clone()));
            return NodeAction::Continue;
        }

        ctx.in_v_once = true;
        ctx.helper(RuntimeHelper::SetBlockTracking);
        NodeAction::exit(|node, ctx| {
            ctx.in_v_once = false;
            cache_node(node, ctx);
        })
    }
}

/// Move the finished codegen node of `node` into a vnode cache slot.
fn cache_node<'a>(node: &mut TemplateChildNode<'a>, ctx: &mut TransformContext<'a>) {
    match node {
        TemplateChildNode::Element(el) => {
            if let Some(codegen) = el.codegen_node.take() {
                let cached = cached(codegen.into_js_child(), ctx);
                el.codegen_node = Some(ElementCodegenNode::Cache(cached));
            }
        }
        TemplateChildNode::If(if_node) => match if_node.codegen_node.take() {
            Some(IfCodegenNode::Conditional(cond)) => {
                let cached = cached(JsChildNode::Conditional(cond), ctx);
                if_node.codegen_node = Some(IfCodegenNode::Cache(cached));
            }
            other => if_node.codegen_node = other,
        },
        TemplateChildNode::For(for_node) => match for_node.codegen_node.take() {
            Some(ForCodegenNode::VNodeCall(vnode)) => {
                let cached = cached(JsChildNode::VNodeCall(vnode), ctx);
                for_node.codegen_node = Some(ForCodegenNode::Cache(cached));
            }
            other => for_node.codegen_node = other,
        },
        _ => {}
    }
}

fn cached<'a>(
    value: JsChildNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> gesso_carton::Box<'a, CacheExpression<'a>> {
    let mut cache = ctx.cache(value, true);
    cache.in_v_once = true;
    ctx.alloc(cache)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::transform;
    use crate::transforms::base_transform_pipeline;
    use gesso_armature::parse;
    use gesso_carton::Bump;
    use gesso_relief::options::TransformOptions;

    #[test]
    fn test_has_v_once() {
        let allocator = Bump::new();
        let (root, _) = parse(&allocator, r#"<div v-once>static</div>"#);
        let TemplateChildNode::Element(el) = &root.children[0] else {
            panic!("expected element");
        };
        assert!(has_v_once(el));
    }

    #[test]
    fn test_element_is_cached() {
        let allocator = Bump::new();
        let (mut root, _) = parse(&allocator, "<div><span v-once>{{ msg }}</span></div>");
        transform(
            &allocator,
            &mut root,
            &TransformOptions::default(),
            &base_transform_pipeline(),
        )
        .unwrap();
        assert_eq!(root.cached, 1);
        assert!(root.helpers.contains(&RuntimeHelper::SetBlockTracking));
        let Some(JsChildNode::TemplateChild(TemplateChildNode::Element(div))) = &root.codegen_node
        else {
            panic!("expected element root");
        };
        let Some(ElementCodegenNode::VNodeCall(vnode)) = &div.codegen_node else {
            panic!("expected vnode call");
        };
        let Some(VNodeChildren::Multiple(children)) = &vnode.children else {
            panic!("expected children");
        };
        let TemplateChildNode::Element(span) = &children[0] else {
            panic!("expected span");
        };
        assert!(matches!(
            &span.codegen_node,
            Some(ElementCodegenNode::Cache(c)) if c.is_vnode && c.index == 0
        ));
    }

    #[test]
    fn test_inside_memo_reports() {
        let allocator = Bump::new();
        let (mut root, _) = parse(&allocator, "<div v-memo=\"[a]\"><p v-once>x</p></div>");
        let output = transform(
            &allocator,
            &mut root,
            &TransformOptions::default(),
            &base_transform_pipeline(),
        )
        .unwrap();
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].code, ErrorCode::VOnceInsideMemo);
    }
}
