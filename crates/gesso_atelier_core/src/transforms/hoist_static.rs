//! Static hoisting.
//!
//! When an element's children are done, fully static child vnodes move into
//! `root.hoists` and are replaced by [`TemplateChildNode::Hoisted`]. Elements
//! that stay dynamic may still get their constant props object hoisted.
//! Root children are handled once the whole tree is done.

use gesso_carton::PatchFlags;
use gesso_relief::ast::*;

use crate::transform::{NodeAction, NodeTransform, SiblingCursor, TransformContext};

/// Decides what may leave the render function.
pub trait HoistPolicy {
    /// Constness of an element's finished vnode. `CanCache` or higher hoists it whole.
    fn element_const_type<'a>(
        &self,
        el: &ElementNode<'a>,
        ctx: &TransformContext<'a>,
    ) -> ConstantType;

    /// Whether the props object alone may be hoisted from a dynamic element.
    fn can_hoist_props<'a>(&self, el: &ElementNode<'a>, ctx: &TransformContext<'a>) -> bool;
}

/// Hoists plain elements whose props and children are all constant.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHoistPolicy;

impl HoistPolicy for DefaultHoistPolicy {
    fn element_const_type<'a>(
        &self,
        el: &ElementNode<'a>,
        ctx: &TransformContext<'a>,
    ) -> ConstantType {
        if el.tag_type != ElementType::Element {
            return ConstantType::NotConstant;
        }
        let Some(ElementCodegenNode::VNodeCall(vnode)) = &el.codegen_node else {
            return ConstantType::NotConstant;
        };
        if vnode.is_block || vnode.directives.is_some() || vnode.patch_flag.is_some() {
            return ConstantType::NotConstant;
        }
        // A bound key never sets a patch flag but still changes per render
        if matches!(el.find_prop("key", true), Some(PropNode::Directive(d))
            if !d.exp.as_ref().is_some_and(|e| e.const_type() > ConstantType::NotConstant))
        {
            return ConstantType::NotConstant;
        }

        let mut lowest = ConstantType::CanStringify;
        match &vnode.props {
            None => {}
            Some(PropsExpression::Object(obj)) => {
                for prop in obj.properties.iter() {
                    if prop.static_key().is_none() {
                        return ConstantType::NotConstant;
                    }
                    lowest = lowest.min(value_const_type(&prop.value));
                }
            }
            Some(PropsExpression::Simple(exp)) => lowest = lowest.min(exp.const_type),
            Some(PropsExpression::Call(_)) => return ConstantType::NotConstant,
        }
        if lowest == ConstantType::NotConstant {
            return lowest;
        }

        match &vnode.children {
            None => {}
            Some(VNodeChildren::Single(child)) => lowest = lowest.min(child_const_type(child, self, ctx)),
            Some(VNodeChildren::Multiple(children)) => {
                for child in children.iter() {
                    lowest = lowest.min(child_const_type(child, self, ctx));
                    if lowest == ConstantType::NotConstant {
                        break;
                    }
                }
            }
            Some(VNodeChildren::Simple(exp)) => lowest = lowest.min(exp.const_type),
            Some(VNodeChildren::Slots(_))
            | Some(VNodeChildren::DynamicSlots(_))
            | Some(VNodeChildren::ForRenderList(_)) => {
                return ConstantType::NotConstant;
            }
        }
        lowest
    }

    fn can_hoist_props<'a>(&self, el: &ElementNode<'a>, _ctx: &TransformContext<'a>) -> bool {
        if el.tag_type != ElementType::Element {
            return false;
        }
        let Some(ElementCodegenNode::VNodeCall(vnode)) = &el.codegen_node else {
            return false;
        };
        let flag_allows = match vnode.patch_flag {
            None => true,
            Some(flag) => flag == PatchFlags::TEXT || flag == PatchFlags::NEED_PATCH,
        };
        if !flag_allows {
            return false;
        }
        match &vnode.props {
            Some(PropsExpression::Object(obj)) => obj.properties.iter().all(|p| {
                p.static_key().is_some() && value_const_type(&p.value) >= ConstantType::CanCache
            }),
            _ => false,
        }
    }
}

fn value_const_type(value: &JsChildNode<'_>) -> ConstantType {
    match value {
        JsChildNode::SimpleExpression(exp) => exp.const_type,
        JsChildNode::CompoundExpression(exp) => exp.const_type(),
        // Anything referring to `_cache` or calling helpers stays in the render function
        _ => ConstantType::NotConstant,
    }
}

fn child_const_type<'a>(
    child: &TemplateChildNode<'a>,
    policy: &DefaultHoistPolicy,
    ctx: &TransformContext<'a>,
) -> ConstantType {
    match child {
        TemplateChildNode::Text(_) | TemplateChildNode::Comment(_) => ConstantType::CanStringify,
        TemplateChildNode::Hoisted(_) => ConstantType::CanCache,
        TemplateChildNode::Interpolation(i) => i.content.const_type(),
        TemplateChildNode::CompoundExpression(c) => c.const_type(),
        TemplateChildNode::TextCall(t) => text_call_const_type(t),
        TemplateChildNode::Element(el) => policy.element_const_type(el, ctx),
        TemplateChildNode::If(_) | TemplateChildNode::For(_) => ConstantType::NotConstant,
    }
}

fn text_call_const_type(text: &TextCallNode<'_>) -> ConstantType {
    match &text.content {
        TextCallContent::Text(_) => ConstantType::CanStringify,
        TextCallContent::Interpolation(i) => i.content.const_type(),
        TextCallContent::Compound(c) => c.const_type(),
    }
}

/// Node transform hoisting static children on element exit.
pub struct HoistStatic;

impl NodeTransform for HoistStatic {
    fn name(&self) -> &'static str {
        "hoist-static"
    }

    fn enter<'a>(
        &self,
        node: &mut TemplateChildNode<'a>,
        _cursor: &mut SiblingCursor<'_, 'a>,
        ctx: &mut TransformContext<'a>,
    ) -> NodeAction<'a> {
        if !ctx.options.hoist_static || !matches!(node, TemplateChildNode::Element(_)) {
            return NodeAction::Continue;
        }
        NodeAction::exit(|node, ctx| {
            if let TemplateChildNode::Element(el) = node {
                hoist_children(&mut el.children, ctx);
            }
        })
    }

    fn exit_root<'a>(&self, root: &mut RootNode<'a>, ctx: &mut TransformContext<'a>) {
        if ctx.options.hoist_static {
            hoist_children(&mut root.children, ctx);
        }
    }
}

/// Hoist what the pipeline's policy allows among `children`.
pub fn hoist_children<'a>(
    children: &mut gesso_carton::Vec<'a, TemplateChildNode<'a>>,
    ctx: &mut TransformContext<'a>,
) {
    if ctx.in_v_once {
        return;
    }
    let pipeline = std::rc::Rc::clone(&ctx.pipeline);
    let policy = pipeline.hoist_policy();

    for child in children.iter_mut() {
        match child {
            TemplateChildNode::Element(el) => {
                if policy.element_const_type(el, ctx) >= ConstantType::CanCache {
                    if let Some(ElementCodegenNode::VNodeCall(mut vnode)) = el.codegen_node.take() {
                        vnode.hoisted = true;
                        vnode.patch_flag = None;
                        let index = ctx.hoist(JsChildNode::VNodeCall(vnode));
                        tracing::trace!(index, "hoisted element");
                        *child = TemplateChildNode::Hoisted(index);
                    }
                } else if policy.can_hoist_props(el, ctx) {
                    if let Some(ElementCodegenNode::VNodeCall(vnode)) = &mut el.codegen_node {
                        if let Some(PropsExpression::Object(obj)) = vnode.props.take() {
                            let exp = ctx.hoist_expression(JsChildNode::Object(obj));
                            vnode.props = Some(PropsExpression::Simple(ctx.alloc(exp)));
                        }
                    }
                }
            }
            TemplateChildNode::TextCall(text)
                if text_call_const_type(text) >= ConstantType::CanCache
                    && matches!(text.codegen_node, Some(TextCallCodegenNode::CreateText { .. })) =>
            {
                let taken = std::mem::replace(child, TemplateChildNode::Hoisted(0));
                let index = ctx.hoist(JsChildNode::TemplateChild(taken));
                *child = TemplateChildNode::Hoisted(index);
            }
            _ => {}
        }
    }
}
