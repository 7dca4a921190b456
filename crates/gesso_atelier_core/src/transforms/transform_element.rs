//! Element transform.
//!
//! On exit, plain elements and components get their [`VNodeCall`]: the tag
//! is resolved, props and runtime directives are built, children are moved
//! in (as slot functions for components), and the patch flag is settled.

use gesso_carton::{to_valid_asset_id, PatchFlags, String, Vec};
use gesso_relief::ast::*;

use crate::transform::{NodeAction, NodeTransform, SiblingCursor, TransformContext};
use crate::transforms::props::build_props;
use crate::transforms::slots::{build_slots, SlotUsage};
use crate::transforms::transform_expression::process_expression;

pub struct TransformElement;

impl NodeTransform for TransformElement {
    fn name(&self) -> &'static str {
        "element"
    }

    fn enter<'a>(
        &self,
        node: &mut TemplateChildNode<'a>,
        _cursor: &mut SiblingCursor<'_, 'a>,
        ctx: &mut TransformContext<'a>,
    ) -> NodeAction<'a> {
        if !matches!(node, TemplateChildNode::Element(_)) {
            return NodeAction::Continue;
        }
        let outlets_before = ctx.slot_outlets;
        let mark = ctx.scope_mark();
        NodeAction::exit(move |node, ctx| {
            let TemplateChildNode::Element(el) = node else {
                return;
            };
            // Earlier exits may have turned the element into something else
            if !matches!(el.tag_type, ElementType::Element | ElementType::Component) {
                return;
            }
            let usage = SlotUsage {
                forwards_slots: ctx.slot_outlets > outlets_before,
                reads_outer_scope: ctx.read_outer_scope_since(mark) || props_read_scope(el),
            };
            let vnode = create_vnode_call(el, usage, ctx);
            el.codegen_node = Some(ElementCodegenNode::VNodeCall(ctx.alloc(vnode)));
        })
    }
}

fn props_read_scope(el: &ElementNode<'_>) -> bool {
    el.props.iter().any(|p| {
        matches!(p, PropNode::Directive(d)
            if d.exp.as_ref().is_some_and(|e| !e.scoped_identifiers().is_empty()))
    })
}

fn create_vnode_call<'a>(
    el: &mut ElementNode<'a>,
    usage: SlotUsage,
    ctx: &mut TransformContext<'a>,
) -> VNodeCall<'a> {
    let allocator = ctx.allocator;
    let is_component = el.is_component();
    let tag = if is_component {
        resolve_component_type(el, ctx)
    } else {
        VNodeTag::Element(el.tag.clone())
    };
    let is_dynamic_component = matches!(
        &tag,
        VNodeTag::Call(call) if call.callee == Callee::Symbol(RuntimeHelper::ResolveDynamicComponent)
    );
    let builtin = match &tag {
        VNodeTag::Symbol(helper) => Some(*helper),
        _ => None,
    };
    let mut should_use_block = is_dynamic_component
        || matches!(
            builtin,
            Some(RuntimeHelper::Teleport) | Some(RuntimeHelper::Suspense)
        )
        || (!is_component && matches!(el.tag.as_str(), "svg" | "foreignObject" | "math"));

    let mut vnode = VNodeCall::new(tag, el.loc.clone());
    vnode.is_component = is_component;
    let mut patch_flag = PatchFlags::empty();

    if !el.props.is_empty() {
        let result = build_props(el, ctx, is_component, is_dynamic_component);
        vnode.props = result.props;
        patch_flag = result.patch_flag;
        if !result.dynamic_prop_names.is_empty() {
            vnode.dynamic_props = Some(result.dynamic_prop_names);
        }
        if !result.directives.is_empty() {
            for dir in result.directives.iter() {
                if let RuntimeDirective::Helper(helper) = dir.directive {
                    ctx.helper(helper);
                }
            }
            ctx.helper(RuntimeHelper::WithDirectives);
            vnode.directives = Some(result.directives);
        }
        should_use_block |= result.should_use_block;
    }

    if !el.children.is_empty() {
        if builtin == Some(RuntimeHelper::KeepAlive) {
            should_use_block = true;
            patch_flag |= PatchFlags::DYNAMIC_SLOTS;
        }
        let builds_slots = is_component
            && !matches!(
                builtin,
                Some(RuntimeHelper::Teleport) | Some(RuntimeHelper::KeepAlive)
            );
        if builds_slots {
            let (slots, has_dynamic_slots) = build_slots(el, usage, ctx);
            vnode.children = Some(slots);
            if has_dynamic_slots {
                patch_flag |= PatchFlags::DYNAMIC_SLOTS;
            }
        } else {
            let mut children = std::mem::replace(&mut el.children, Vec::new_in(allocator));
            let single_text = children.len() == 1
                && builtin != Some(RuntimeHelper::Teleport)
                && matches!(
                    children[0],
                    TemplateChildNode::Text(_)
                        | TemplateChildNode::Interpolation(_)
                        | TemplateChildNode::CompoundExpression(_)
                );
            match children.pop() {
                Some(child) if single_text => {
                    let dynamic_text = match &child {
                        TemplateChildNode::Interpolation(i) => {
                            i.content.const_type() == ConstantType::NotConstant
                        }
                        TemplateChildNode::CompoundExpression(c) => {
                            c.const_type() == ConstantType::NotConstant
                        }
                        _ => false,
                    };
                    if dynamic_text {
                        patch_flag |= PatchFlags::TEXT;
                    }
                    vnode.children = Some(VNodeChildren::Single(child));
                }
                Some(child) => {
                    children.push(child);
                    vnode.children = Some(VNodeChildren::Multiple(children));
                }
                None => {}
            }
        }
    }

    if !patch_flag.is_empty() {
        vnode.patch_flag = Some(patch_flag);
    }
    ctx.helper(RuntimeHelper::vnode(is_component));
    if should_use_block {
        ctx.make_block(&mut vnode);
    }
    tracing::trace!(
        tag = %el.tag,
        flag = patch_flag.bits(),
        block = vnode.is_block,
        "vnode call"
    );
    vnode
}

/// Tag of a component vnode: a dynamic component, a built-in, or a resolved asset.
fn resolve_component_type<'a>(
    el: &mut ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> VNodeTag<'a> {
    let allocator = ctx.allocator;
    let mut tag = el.tag.clone();
    let is_explicit_dynamic = matches!(tag.as_str(), "component" | "Component");

    if let Some(is_prop) = el.find_prop("is", true) {
        if is_explicit_dynamic {
            let exp = match is_prop {
                PropNode::Attribute(attr) => attr.value.as_ref().map(|v| {
                    JsChildNode::string(allocator, v.content.clone())
                }),
                PropNode::Directive(dir) => Some(match &dir.exp {
                    Some(exp) => JsChildNode::from_expression(exp.clone_in(allocator)),
                    // `:is` alone binds the same-name variable
                    None => {
                        let mut exp = SimpleExpressionNode::new("is", false, dir.loc.clone());
                        process_expression(&mut exp, ctx);
                        JsChildNode::SimpleExpression(ctx.alloc(exp))
                    }
                }),
            };
            if let Some(exp) = exp {
                let mut call = CallExpression::new(
                    allocator,
                    Callee::Symbol(ctx.helper(RuntimeHelper::ResolveDynamicComponent)),
                    el.loc.clone(),
                );
                call.arguments.push(CallArgument::Node(exp));
                return VNodeTag::Call(ctx.alloc(call));
            }
        } else if let PropNode::Attribute(attr) = is_prop {
            if let Some(name) = attr.value.as_ref().and_then(|v| v.content.strip_prefix("vue:")) {
                tag = String::from(name);
            }
        }
    }

    if let Some(builtin) = (ctx.options.is_builtin_component)(&tag) {
        return VNodeTag::Symbol(ctx.helper(builtin));
    }
    ctx.helper(RuntimeHelper::ResolveComponent);
    ctx.add_component(&tag);
    VNodeTag::Asset(to_valid_asset_id(&tag, "component"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::transform;
    use crate::transforms::base_transform_pipeline;
    use gesso_armature::parse;
    use gesso_carton::Bump;
    use gesso_relief::options::TransformOptions;

    fn no_hoist() -> TransformOptions {
        TransformOptions {
            hoist_static: false,
            ..Default::default()
        }
    }

    fn with_root_vnode<R>(
        src: &str,
        options: TransformOptions,
        f: impl FnOnce(&VNodeCall<'_>, &RootNode<'_>) -> R,
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
        f(vnode, &root)
    }

    #[test]
    fn test_interpolation_child_is_text_flagged() {
        with_root_vnode("<p>{{ msg }}</p>", TransformOptions::default(), |vnode, root| {
            assert!(vnode.is_block);
            assert_eq!(vnode.patch_flag, Some(PatchFlags::TEXT));
            assert!(matches!(
                vnode.children,
                Some(VNodeChildren::Single(TemplateChildNode::Interpolation(_)))
            ));
            assert_eq!(
                root.helpers.as_slice(),
                &[
                    RuntimeHelper::OpenBlock,
                    RuntimeHelper::CreateElementBlock,
                    RuntimeHelper::ToDisplayString,
                ]
            );
            assert!(root.hoists.is_empty());
        });
    }

    #[test]
    fn test_component_is_resolved() {
        with_root_vnode("<MyComp foo=\"bar\"/>", no_hoist(), |vnode, root| {
            assert!(vnode.is_component);
            assert!(matches!(&vnode.tag, VNodeTag::Asset(id) if id == "_component_MyComp"));
            assert_eq!(root.components.as_slice(), &[String::from("MyComp")]);
            assert!(root.helpers.contains(&RuntimeHelper::ResolveComponent));
            assert!(root.helpers.contains(&RuntimeHelper::CreateBlock));
        });
    }

    #[test]
    fn test_dynamic_component() {
        with_root_vnode("<component :is=\"view\"/>", no_hoist(), |vnode, root| {
            assert!(matches!(&vnode.tag, VNodeTag::Call(_)));
            assert!(vnode.props.is_none());
            assert!(root.helpers.contains(&RuntimeHelper::ResolveDynamicComponent));
            assert!(root.components.is_empty());
        });
    }

    #[test]
    fn test_vue_prefixed_is_attribute() {
        with_root_vnode("<div is=\"vue:my-comp\"/>", no_hoist(), |vnode, root| {
            assert!(matches!(&vnode.tag, VNodeTag::Asset(id) if id == "_component_my_comp"));
            assert!(vnode.props.is_none());
            assert_eq!(root.components.as_slice(), &[String::from("my-comp")]);
        });
    }

    #[test]
    fn test_builtin_component() {
        with_root_vnode("<div><Teleport to=\"body\"><p/></Teleport></div>", no_hoist(), |vnode, root| {
            let Some(VNodeChildren::Multiple(children)) = &vnode.children else {
                panic!("expected children");
            };
            let TemplateChildNode::Element(teleport) = &children[0] else {
                panic!("expected teleport");
            };
            let Some(ElementCodegenNode::VNodeCall(call)) = &teleport.codegen_node else {
                panic!("expected vnode call");
            };
            assert!(matches!(call.tag, VNodeTag::Symbol(RuntimeHelper::Teleport)));
            assert!(call.is_block);
            assert!(matches!(call.children, Some(VNodeChildren::Multiple(_))));
            assert!(root.helpers.contains(&RuntimeHelper::Teleport));
        });
    }

    #[test]
    fn test_svg_is_block() {
        with_root_vnode("<div><svg></svg></div>", no_hoist(), |vnode, _| {
            let Some(VNodeChildren::Multiple(children)) = &vnode.children else {
                panic!("expected children");
            };
            let TemplateChildNode::Element(svg) = &children[0] else {
                panic!("expected svg");
            };
            assert!(svg
                .codegen_node
                .as_ref()
                .and_then(|c| c.as_vnode_call())
                .is_some_and(|v| v.is_block));
        });
    }

    #[test]
    fn test_custom_directive() {
        with_root_vnode("<div v-focus:a.b=\"x\"></div>", no_hoist(), |vnode, root| {
            let dirs = vnode.directives.as_ref().unwrap();
            assert_eq!(dirs.len(), 1);
            assert_eq!(
                dirs[0].directive,
                RuntimeDirective::Resolved(String::from("_directive_focus"))
            );
            assert_eq!(vnode.patch_flag, Some(PatchFlags::NEED_PATCH));
            assert_eq!(root.directives.as_slice(), &[String::from("focus")]);
            assert!(root.helpers.contains(&RuntimeHelper::WithDirectives));
            assert!(root.helpers.contains(&RuntimeHelper::ResolveDirective));
        });
    }

    #[test]
    fn test_keyed_element_is_block() {
        with_root_vnode("<div><p :key=\"id\"/></div>", no_hoist(), |vnode, _| {
            let Some(VNodeChildren::Multiple(children)) = &vnode.children else {
                panic!("expected children");
            };
            let TemplateChildNode::Element(p) = &children[0] else {
                panic!("expected p");
            };
            assert!(p
                .codegen_node
                .as_ref()
                .and_then(|c| c.as_vnode_call())
                .is_some_and(|v| v.is_block));
        });
    }
}
