//! Component slots.
//!
//! [`TrackSlotScopes`] puts `v-slot` parameters in scope while a slot's
//! contents are transformed. [`build_slots`] runs from the element exit and
//! turns a component's children into the slots object: static slots become
//! properties, while conditional and looped slots go through `createSlots`.

use gesso_carton::{pattern_identifiers, Bump, String, Vec};
use gesso_relief::ast::*;
use gesso_relief::errors::ErrorCode;

use crate::transform::{NodeAction, NodeTransform, SiblingCursor, TransformContext};
use crate::transforms::props::static_property;
use crate::transforms::v_for::params_list;

/// Slot flag written as the `_` property of a slots object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SlotFlag {
    /// Slot contents only read what the component itself provides
    Stable = 1,
    /// Slot contents read outer scope variables or change shape
    Dynamic = 2,
    /// The slots pass a parent's slots through
    Forwarded = 3,
}

impl SlotFlag {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stable => "STABLE",
            Self::Dynamic => "DYNAMIC",
            Self::Forwarded => "FORWARDED",
        }
    }
}

/// Facts about a component's subtree gathered while it was traversed.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SlotUsage {
    /// A `<slot>` outlet sits somewhere in the children
    pub forwards_slots: bool,
    /// The children read a name bound outside the component
    pub reads_outer_scope: bool,
}

pub struct TrackSlotScopes;

impl NodeTransform for TrackSlotScopes {
    fn name(&self) -> &'static str {
        "slot-scopes"
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
        if el.tag_type == ElementType::Template {
            if !is_slot_template(el, ctx) {
                return NodeAction::Continue;
            }
        } else if !el.is_component() {
            return NodeAction::Continue;
        }
        let Some(index) = el.find_dir_index("slot") else {
            return NodeAction::Continue;
        };

        let params = match &el.props[index] {
            PropNode::Directive(dir) => dir.exp_content().map(pattern_identifiers),
            PropNode::Attribute(_) => None,
        };
        let pushed = params.is_some();
        if let Some(names) = params {
            ctx.push_scope(names);
        }
        ctx.v_slot_depth += 1;
        NodeAction::exit(move |_node, ctx| {
            ctx.v_slot_depth -= 1;
            if pushed {
                ctx.pop_scope();
            }
        })
    }
}

/// Whether `el` is a `<template v-slot>` owned by the slots lowering.
///
/// A slot template outside a component is reported and loses its `v-slot`;
/// without other structural directives it renders as a plain element.
pub(crate) fn is_slot_template<'a>(el: &mut ElementNode<'a>, ctx: &mut TransformContext<'a>) -> bool {
    if el.tag_type != ElementType::Template {
        return false;
    }
    let Some(index) = el.find_dir_index("slot") else {
        return false;
    };
    if ctx.parent().is_component() {
        return true;
    }
    let dir = el.remove_prop(index);
    ctx.report(ErrorCode::VSlotMisplaced, Some(dir.loc().clone()));
    let structural = el.props.iter().any(|p| {
        matches!(p, PropNode::Directive(d) if matches!(d.name.as_str(), "if" | "else-if" | "else" | "for"))
    });
    if !structural {
        el.tag_type = ElementType::Element;
    }
    false
}

/// A `<template v-slot>` child of a component
fn template_slot<'b, 'a>(node: &'b TemplateChildNode<'a>) -> Option<&'b ElementNode<'a>> {
    match node {
        TemplateChildNode::Element(el)
            if el.tag_type == ElementType::Template && el.has_dir("slot") =>
        {
            Some(el)
        }
        _ => None,
    }
}

/// Comments and whitespace-only text do not separate slot templates.
fn is_non_whitespace(node: &TemplateChildNode<'_>) -> bool {
    match node {
        TemplateChildNode::Comment(_) => false,
        TemplateChildNode::Text(t) => !t.content.trim().is_empty(),
        TemplateChildNode::TextCall(call) => match &call.content {
            TextCallContent::Text(t) => !t.content.trim().is_empty(),
            _ => true,
        },
        _ => true,
    }
}

/// Slot name from a `v-slot` argument: a static key, or the dynamic expression.
fn slot_name<'a>(dir: &DirectiveNode<'a>, allocator: &'a Bump) -> ExpressionNode<'a> {
    match &dir.arg {
        Some(arg) => arg.clone_in(allocator),
        None => ExpressionNode::simple(
            allocator,
            SimpleExpressionNode::new("default", true, SourceLocation::STUB),
        ),
    }
}

/// `withCtx((params) => [children])`
fn slot_function<'a>(
    params: Option<&str>,
    children: Vec<'a, TemplateChildNode<'a>>,
    loc: SourceLocation,
    allocator: &'a Bump,
) -> FunctionExpression<'a> {
    let mut function = FunctionExpression::new(allocator, loc);
    if let Some(params) = params {
        function.params.push(String::from(params));
    }
    function.returns = Some(FunctionReturns::Multiple(children));
    function.is_slot = true;
    function
}

/// `{ name, fn, key? }` as `createSlots` expects it
fn dynamic_slot<'a>(
    name: ExpressionNode<'a>,
    function: FunctionExpression<'a>,
    key: Option<u32>,
    ctx: &TransformContext<'a>,
) -> JsChildNode<'a> {
    let allocator = ctx.allocator;
    let mut object = ObjectExpression::new(allocator, SourceLocation::STUB);
    object.properties.push(static_property(
        "name",
        JsChildNode::from_expression(name),
        allocator,
    ));
    object.properties.push(static_property(
        "fn",
        JsChildNode::Function(ctx.alloc(function)),
        allocator,
    ));
    if let Some(key) = key {
        object.properties.push(static_property(
            "key",
            JsChildNode::string(allocator, gesso_carton::format_compact!("{}", key)),
            allocator,
        ));
    }
    JsChildNode::Object(ctx.alloc(object))
}

/// Deepest alternate of a conditional slot chain
fn last_alternate<'b, 'a>(node: &'b mut JsChildNode<'a>) -> Option<&'b mut JsChildNode<'a>> {
    let JsChildNode::Conditional(cond) = node else {
        return None;
    };
    if matches!(cond.alternate, JsChildNode::Conditional(_)) {
        last_alternate(&mut cond.alternate)
    } else {
        Some(&mut cond.alternate)
    }
}

fn undefined<'a>(allocator: &'a Bump) -> JsChildNode<'a> {
    JsChildNode::code(allocator, "undefined", ConstantType::CanStringify)
}

fn conditional_slot<'a>(
    test: ExpressionNode<'a>,
    slot: JsChildNode<'a>,
    ctx: &TransformContext<'a>,
) -> JsChildNode<'a> {
    JsChildNode::Conditional(ctx.alloc(ConditionalExpression {
        test: JsChildNode::from_expression(test),
        consequent: slot,
        alternate: undefined(ctx.allocator),
        newline: true,
        loc: SourceLocation::STUB,
    }))
}

/// Build the slots of component `el` from its children.
///
/// Returns the children expression and whether the slots are dynamic.
pub(crate) fn build_slots<'a>(
    el: &mut ElementNode<'a>,
    usage: SlotUsage,
    ctx: &mut TransformContext<'a>,
) -> (VNodeChildren<'a>, bool) {
    let allocator = ctx.allocator;
    ctx.helper(RuntimeHelper::WithCtx);

    let mut properties: Vec<'a, Property<'a>> = Vec::new_in(allocator);
    let mut dynamic_slots: Vec<'a, JsChildNode<'a>> = Vec::new_in(allocator);
    let mut has_dynamic = if ctx.options.prefix_identifiers {
        usage.reads_outer_scope
    } else {
        ctx.v_slot_depth > 0 || ctx.v_for_depth > 0
    };

    let mut children = std::mem::replace(&mut el.children, Vec::new_in(allocator));

    // `<Comp v-slot="props">`: every child belongs to the default slot
    if let Some(dir) = el.find_dir("slot") {
        if let Some(mixed) = children.iter().find_map(template_slot) {
            if let Some(dir) = mixed.find_dir("slot") {
                ctx.report(ErrorCode::VSlotMixedSlotUsage, Some(dir.loc.clone()));
            }
            children.retain(|c| template_slot(c).is_none());
        }
        if dir.arg.as_ref().is_some_and(|arg| !arg.is_static()) {
            has_dynamic = true;
        }
        let name = slot_name(dir, allocator);
        let function = slot_function(dir.exp_content(), children, el.loc.clone(), allocator);
        properties.push(Property {
            key: name,
            value: JsChildNode::Function(ctx.alloc(function)),
            loc: dir.loc.clone(),
        });
        return finish(properties, dynamic_slots, has_dynamic, usage, ctx);
    }

    let mut implicit: Vec<'a, TemplateChildNode<'a>> = Vec::new_in(allocator);
    let mut has_template_slots = false;
    let mut has_named_default = false;
    let mut seen_names: std::vec::Vec<String> = std::vec::Vec::new();
    let mut branch_key = 0u32;
    // Whether the last significant child opened or continued a conditional slot
    let mut after_conditional = false;

    for child in children {
        let mut template = match child {
            TemplateChildNode::Element(el)
                if el.tag_type == ElementType::Template && el.has_dir("slot") =>
            {
                el
            }
            other => {
                if is_non_whitespace(&other) {
                    after_conditional = false;
                }
                if !matches!(other, TemplateChildNode::Comment(_)) {
                    implicit.push(other);
                }
                continue;
            }
        };
        has_template_slots = true;
        let Some(slot_index) = template.find_dir_index("slot") else {
            continue;
        };
        let PropNode::Directive(slot_dir) = template.remove_prop(slot_index) else {
            continue;
        };
        let name = slot_name(&slot_dir, allocator);
        let static_name = name
            .as_simple()
            .filter(|s| s.is_static)
            .map(|s| s.content.clone());
        if static_name.is_none() {
            has_dynamic = true;
        }
        let template_children = std::mem::replace(&mut template.children, Vec::new_in(allocator));
        let function = slot_function(
            slot_dir.exp_content(),
            template_children,
            template.loc.clone(),
            allocator,
        );

        if let Some(index) = template.find_dir_index("if") {
            has_dynamic = true;
            let PropNode::Directive(mut if_dir) = template.remove_prop(index) else {
                continue;
            };
            let Some(test) = if_dir.exp.take() else {
                ctx.report(ErrorCode::VIfNoExpression, Some(if_dir.loc.clone()));
                after_conditional = false;
                continue;
            };
            let slot = dynamic_slot(name, function, Some(branch_key), ctx);
            branch_key += 1;
            dynamic_slots.push(conditional_slot(test, slot, ctx));
            after_conditional = true;
        } else if let Some(index) = template
            .find_dir_index("else-if")
            .or_else(|| template.find_dir_index("else"))
        {
            let PropNode::Directive(mut else_dir) = template.remove_prop(index) else {
                continue;
            };
            let continues = else_dir.name == "else-if";
            let target = if after_conditional {
                dynamic_slots.last_mut().and_then(last_alternate)
            } else {
                None
            };
            let Some(target) = target else {
                ctx.report(ErrorCode::VElseNoAdjacentIf, Some(else_dir.loc.clone()));
                after_conditional = false;
                continue;
            };
            let slot = dynamic_slot(name, function, Some(branch_key), ctx);
            branch_key += 1;
            *target = match else_dir.exp.take() {
                Some(test) if continues => conditional_slot(test, slot, ctx),
                _ => slot,
            };
            after_conditional = continues;
        } else if let Some(index) = template.find_dir_index("for") {
            has_dynamic = true;
            after_conditional = false;
            let PropNode::Directive(mut for_dir) = template.remove_prop(index) else {
                continue;
            };
            let Some(parse_result) = for_dir.for_parse_result.take() else {
                let code = if for_dir.exp_content().is_none() {
                    ErrorCode::VForNoExpression
                } else {
                    ErrorCode::VForMalformedExpression
                };
                ctx.report(code, Some(for_dir.loc.clone()));
                continue;
            };
            let slot = dynamic_slot(name, function, None, ctx);
            let mut loop_fn = FunctionExpression::new(allocator, SourceLocation::STUB);
            loop_fn.params = params_list(&parse_result.alias_params(), allocator);
            loop_fn.returns = Some(FunctionReturns::JsChild(slot));
            loop_fn.newline = true;

            let mut render_list = CallExpression::new(
                allocator,
                Callee::Symbol(ctx.helper(RuntimeHelper::RenderList)),
                for_dir.loc.clone(),
            );
            render_list
                .arguments
                .push(CallArgument::Node(JsChildNode::from_expression(parse_result.source)));
            render_list
                .arguments
                .push(CallArgument::Node(JsChildNode::Function(ctx.alloc(loop_fn))));
            dynamic_slots.push(JsChildNode::Call(ctx.alloc(render_list)));
        } else {
            after_conditional = false;
            if let Some(static_name) = static_name {
                if seen_names.contains(&static_name) {
                    ctx.report(ErrorCode::VSlotDuplicateSlotNames, Some(slot_dir.loc.clone()));
                    continue;
                }
                if static_name == "default" {
                    has_named_default = true;
                }
                seen_names.push(static_name);
            }
            properties.push(Property {
                key: name,
                value: JsChildNode::Function(ctx.alloc(function)),
                loc: slot_dir.loc.clone(),
            });
        }
    }

    if !has_template_slots {
        if !implicit.is_empty() {
            let function = slot_function(None, implicit, el.loc.clone(), allocator);
            properties.push(static_property(
                "default",
                JsChildNode::Function(ctx.alloc(function)),
                allocator,
            ));
        }
    } else if let Some(first) = implicit.iter().find(|c| is_non_whitespace(c)) {
        if has_named_default {
            let loc = first.loc().clone();
            ctx.report(ErrorCode::VSlotExtraneousDefaultSlotChildren, Some(loc));
        } else {
            let function = slot_function(None, implicit, el.loc.clone(), allocator);
            properties.push(static_property(
                "default",
                JsChildNode::Function(ctx.alloc(function)),
                allocator,
            ));
        }
    }

    finish(properties, dynamic_slots, has_dynamic, usage, ctx)
}

fn finish<'a>(
    mut properties: Vec<'a, Property<'a>>,
    dynamic_slots: Vec<'a, JsChildNode<'a>>,
    has_dynamic: bool,
    usage: SlotUsage,
    ctx: &mut TransformContext<'a>,
) -> (VNodeChildren<'a>, bool) {
    let allocator = ctx.allocator;
    let flag = if has_dynamic {
        SlotFlag::Dynamic
    } else if usage.forwards_slots {
        SlotFlag::Forwarded
    } else {
        SlotFlag::Stable
    };
    properties.push(static_property(
        "_",
        JsChildNode::code(
            allocator,
            gesso_carton::format_compact!("{} /* {} */", flag as u8, flag.name()),
            ConstantType::CanStringify,
        ),
        allocator,
    ));
    let mut slots = ObjectExpression::new(allocator, SourceLocation::STUB);
    slots.properties = properties;
    tracing::trace!(flag = flag.name(), dynamic = dynamic_slots.len(), "slots built");

    if dynamic_slots.is_empty() {
        return (VNodeChildren::Slots(ctx.alloc(slots)), has_dynamic);
    }
    let mut list = ArrayExpression::new(allocator, SourceLocation::STUB);
    list.elements = dynamic_slots;
    let mut call = CallExpression::new(
        allocator,
        Callee::Symbol(ctx.helper(RuntimeHelper::CreateSlots)),
        SourceLocation::STUB,
    );
    call.arguments
        .push(CallArgument::Node(JsChildNode::Object(ctx.alloc(slots))));
    call.arguments
        .push(CallArgument::Node(JsChildNode::Array(ctx.alloc(list))));
    (VNodeChildren::DynamicSlots(ctx.alloc(call)), has_dynamic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::transform;
    use crate::transforms::base_transform_pipeline;
    use gesso_armature::parse;
    use gesso_relief::errors::CompilerError;
    use gesso_relief::options::TransformOptions;

    fn run<'a>(
        allocator: &'a Bump,
        src: &'a str,
        options: &TransformOptions,
    ) -> (RootNode<'a>, std::vec::Vec<CompilerError>) {
        let (mut root, _) = parse(allocator, src);
        let output = transform(allocator, &mut root, options, &base_transform_pipeline()).unwrap();
        (root, output.errors)
    }

    fn prefixed() -> TransformOptions {
        TransformOptions {
            prefix_identifiers: true,
            ..Default::default()
        }
    }

    fn root_vnode<'r, 'a>(root: &'r RootNode<'a>) -> &'r VNodeCall<'a> {
        match &root.codegen_node {
            Some(JsChildNode::TemplateChild(TemplateChildNode::Element(el))) => {
                match &el.codegen_node {
                    Some(ElementCodegenNode::VNodeCall(vnode)) => vnode,
                    other => panic!("expected vnode call, got {:?}", other),
                }
            }
            other => panic!("expected element root, got {:?}", other),
        }
    }

    fn slot_keys(slots: &ObjectExpression<'_>) -> std::vec::Vec<std::string::String> {
        slots
            .properties
            .iter()
            .map(|p| p.static_key().unwrap_or("<dynamic>").to_string())
            .collect()
    }

    fn slot_flag<'r>(slots: &'r ObjectExpression<'_>) -> &'r str {
        let flag = slots.properties.iter().find(|p| p.static_key() == Some("_"));
        match flag.map(|p| &p.value) {
            Some(JsChildNode::SimpleExpression(s)) => s.content.as_str(),
            other => panic!("expected slot flag, got {:?}", other),
        }
    }

    #[test]
    fn test_implicit_default_slot() {
        let allocator = Bump::new();
        let (root, errors) = run(&allocator, "<Comp><span/>text</Comp>", &prefixed());
        assert!(errors.is_empty());
        let vnode = root_vnode(&root);
        let Some(VNodeChildren::Slots(slots)) = &vnode.children else {
            panic!("expected slots object");
        };
        assert_eq!(slot_keys(slots), ["default", "_"]);
        assert_eq!(slot_flag(slots), "1 /* STABLE */");
        let JsChildNode::Function(f) = &slots.properties[0].value else {
            panic!("expected slot function");
        };
        assert!(f.is_slot);
        assert!(f.params.is_empty());
        assert!(root.helpers.contains(&RuntimeHelper::WithCtx));
    }

    #[test]
    fn test_named_template_slots_with_params() {
        let allocator = Bump::new();
        let (root, errors) = run(
            &allocator,
            r#"<Comp><template #header="{ title }">{{ title }}</template><template #footer>f</template></Comp>"#,
            &prefixed(),
        );
        assert!(errors.is_empty());
        let Some(VNodeChildren::Slots(slots)) = &root_vnode(&root).children else {
            panic!("expected slots object");
        };
        assert_eq!(slot_keys(slots), ["header", "footer", "_"]);
        let JsChildNode::Function(header) = &slots.properties[0].value else {
            panic!("expected slot function");
        };
        assert_eq!(header.params[0], "{ title }");
        // Slot params are not context reads
        assert!(root.references.is_empty());
    }

    #[test]
    fn test_slot_on_component_itself() {
        let allocator = Bump::new();
        let (root, _) = run(&allocator, r#"<Comp v-slot="{ item }">{{ item }}</Comp>"#, &prefixed());
        let Some(VNodeChildren::Slots(slots)) = &root_vnode(&root).children else {
            panic!("expected slots object");
        };
        assert_eq!(slot_keys(slots), ["default", "_"]);
        assert!(root.references.is_empty());
    }

    #[test]
    fn test_conditional_slots_use_create_slots() {
        let allocator = Bump::new();
        let (root, errors) = run(
            &allocator,
            r#"<Comp><template v-if="ok" #a>A</template><template v-else #b>B</template></Comp>"#,
            &prefixed(),
        );
        assert!(errors.is_empty());
        let vnode = root_vnode(&root);
        assert!(vnode
            .patch_flag
            .is_some_and(|f| f.contains(gesso_carton::PatchFlags::DYNAMIC_SLOTS)));
        let Some(VNodeChildren::DynamicSlots(call)) = &vnode.children else {
            panic!("expected createSlots");
        };
        assert_eq!(call.callee, Callee::Symbol(RuntimeHelper::CreateSlots));
        let CallArgument::Node(JsChildNode::Array(list)) = &call.arguments[1] else {
            panic!("expected dynamic slot list");
        };
        assert_eq!(list.elements.len(), 1);
        let JsChildNode::Conditional(cond) = &list.elements[0] else {
            panic!("expected conditional slot");
        };
        // The else branch replaced the `undefined` fallback
        assert!(matches!(&cond.alternate, JsChildNode::Object(_)));
    }

    #[test]
    fn test_looped_slots_see_aliases() {
        let allocator = Bump::new();
        let (root, errors) = run(
            &allocator,
            r#"<Comp><template v-for="n in names" #[n]>{{ n }}</template></Comp>"#,
            &prefixed(),
        );
        assert!(errors.is_empty());
        let refs: std::vec::Vec<_> = root.references.iter().map(|r| r.as_str()).collect();
        assert_eq!(refs, ["names"]);
        let Some(VNodeChildren::DynamicSlots(call)) = &root_vnode(&root).children else {
            panic!("expected createSlots");
        };
        let CallArgument::Node(JsChildNode::Array(list)) = &call.arguments[1] else {
            panic!("expected dynamic slot list");
        };
        assert!(matches!(
            &list.elements[0],
            JsChildNode::Call(c) if c.callee == Callee::Symbol(RuntimeHelper::RenderList)
        ));
    }

    #[test]
    fn test_outer_scope_read_makes_slots_dynamic() {
        let allocator = Bump::new();
        let (root, _) = run(
            &allocator,
            r#"<div v-for="item in list"><Comp>{{ item }}</Comp></div>"#,
            &prefixed(),
        );
        let Some(JsChildNode::TemplateChild(TemplateChildNode::For(for_node))) = &root.codegen_node
        else {
            panic!("expected for root");
        };
        let Some(ForCodegenNode::VNodeCall(fragment)) = &for_node.codegen_node else {
            panic!("expected fragment");
        };
        let Some(VNodeChildren::ForRenderList(call)) = &fragment.children else {
            panic!("expected renderList");
        };
        let CallArgument::Node(JsChildNode::Function(f)) = &call.arguments[1] else {
            panic!("expected loop function");
        };
        let Some(FunctionReturns::JsChild(JsChildNode::TemplateChild(TemplateChildNode::Element(div)))) =
            &f.returns
        else {
            panic!("expected div");
        };
        let Some(ElementCodegenNode::VNodeCall(div)) = &div.codegen_node else {
            panic!("expected div vnode");
        };
        let Some(VNodeChildren::Multiple(children)) = &div.children else {
            panic!("expected children, got {:?}", div.children);
        };
        let TemplateChildNode::Element(comp) = &children[0] else {
            panic!("expected component child");
        };
        let Some(ElementCodegenNode::VNodeCall(comp)) = &comp.codegen_node else {
            panic!("expected component vnode");
        };
        let Some(VNodeChildren::Slots(slots)) = &comp.children else {
            panic!("expected slots");
        };
        assert_eq!(slot_flag(slots), "2 /* DYNAMIC */");
    }

    #[test]
    fn test_forwarded_slots() {
        let allocator = Bump::new();
        let (root, _) = run(&allocator, "<Comp><slot/></Comp>", &prefixed());
        let Some(VNodeChildren::Slots(slots)) = &root_vnode(&root).children else {
            panic!("expected slots");
        };
        assert_eq!(slot_flag(slots), "3 /* FORWARDED */");
    }

    #[test]
    fn test_slot_misuse() {
        let allocator = Bump::new();
        let (_, errors) = run(
            &allocator,
            "<Comp><template #a>1</template><template #a>2</template></Comp>",
            &prefixed(),
        );
        let codes: std::vec::Vec<_> = errors.iter().map(|e| e.code).collect();
        assert_eq!(codes, [ErrorCode::VSlotDuplicateSlotNames]);

        let (_, errors) = run(
            &allocator,
            "<Comp v-slot><template #a>1</template></Comp>",
            &prefixed(),
        );
        assert_eq!(errors[0].code, ErrorCode::VSlotMixedSlotUsage);

        let (_, errors) = run(
            &allocator,
            "<Comp><template #default>1</template><b>extra</b></Comp>",
            &prefixed(),
        );
        assert_eq!(errors[0].code, ErrorCode::VSlotExtraneousDefaultSlotChildren);

        let (_, errors) = run(&allocator, "<div><template #a>1</template></div>", &prefixed());
        assert_eq!(errors[0].code, ErrorCode::VSlotMisplaced);

        let (_, errors) = run(
            &allocator,
            "<Comp><template v-else #a>1</template></Comp>",
            &prefixed(),
        );
        assert_eq!(errors[0].code, ErrorCode::VElseNoAdjacentIf);
    }
}
