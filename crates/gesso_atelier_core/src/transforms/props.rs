//! Element props assembly.
//!
//! Static attributes and the properties produced by directive transforms are
//! collected into one props expression. Object spreads (`v-bind="obj"`,
//! `v-on="handlers"`) split the list into `mergeProps` arguments. Along the
//! way every property is analysed for the patch flag and the dynamic prop
//! names the runtime diff needs.

use gesso_carton::{is_on, is_reserved_prop, Box, Bump, FxHashMap, PatchFlags, String, Vec};
use gesso_relief::ast::*;
use gesso_relief::errors::ErrorCode;

use crate::transform::TransformContext;
use crate::transforms::v_if::block_vnode_mut;

/// Props of one element, ready for its vnode call.
#[derive(Debug)]
pub struct PropsBuildResult<'a> {
    pub props: Option<PropsExpression<'a>>,
    pub directives: Vec<'a, DirectiveArgumentNode<'a>>,
    pub patch_flag: PatchFlags,
    pub dynamic_prop_names: Vec<'a, String>,
    /// A key, a `vue:before-update` hook or a user directive with children
    pub should_use_block: bool,
}

#[derive(Debug, Default)]
struct PatchAnalysis {
    has_ref: bool,
    has_class_binding: bool,
    has_style_binding: bool,
    has_hydration_event_binding: bool,
    has_dynamic_keys: bool,
    has_vnode_hook: bool,
}

/// Property list being assembled, split into `mergeProps` arguments at spreads.
struct PropsCollector<'a> {
    allocator: &'a Bump,
    properties: std::vec::Vec<Property<'a>>,
    merge_args: std::vec::Vec<JsChildNode<'a>>,
}

impl<'a> PropsCollector<'a> {
    fn new(allocator: &'a Bump) -> Self {
        Self {
            allocator,
            properties: std::vec::Vec::new(),
            merge_args: std::vec::Vec::new(),
        }
    }

    /// Close the pending object literal, then append `arg`.
    fn push_merge_arg(&mut self, arg: Option<JsChildNode<'a>>) {
        if !self.properties.is_empty() {
            let properties = std::mem::take(&mut self.properties);
            let object =
                object_expression(dedupe_properties(properties, self.allocator), self.allocator);
            self.merge_args
                .push(JsChildNode::Object(Box::new_in(object, self.allocator)));
        }
        if let Some(arg) = arg {
            self.merge_args.push(arg);
        }
    }
}

/// Build the props of `el` from its attributes and `el.directive_results`.
pub fn build_props<'a>(
    el: &mut ElementNode<'a>,
    ctx: &mut TransformContext<'a>,
    is_component: bool,
    is_dynamic_component: bool,
) -> PropsBuildResult<'a> {
    let allocator = ctx.allocator;
    let mut results = std::mem::replace(&mut el.directive_results, Vec::new_in(allocator));
    let mut collector = PropsCollector::new(allocator);
    let mut analysis = PatchAnalysis::default();
    let mut dynamic_prop_names: Vec<'a, String> = Vec::new_in(allocator);
    let mut directives = Vec::new_in(allocator);
    let mut should_use_block = false;
    let has_children = !el.children.is_empty();
    let is_component_tag = matches!(el.tag.as_str(), "component" | "Component");
    let in_v_for = ctx.v_for_depth > 0;

    for (index, prop) in el.props.iter().enumerate() {
        let dir = match prop {
            PropNode::Attribute(attr) => {
                if attr.name == "ref" {
                    analysis.has_ref = true;
                    if in_v_for {
                        collector.properties.push(ref_for_marker(allocator));
                    }
                }
                let vue_prefixed = attr
                    .value
                    .as_ref()
                    .is_some_and(|v| v.content.starts_with("vue:"));
                if attr.name == "is" && (is_component_tag || vue_prefixed) {
                    continue;
                }
                collector
                    .properties
                    .push(attribute_property(attr, allocator));
                continue;
            }
            PropNode::Directive(dir) => dir,
        };

        let name = dir.name.as_str();
        let is_bind = name == "bind";
        let is_on = name == "on";
        if name == "slot" {
            if !is_component {
                ctx.report(ErrorCode::VSlotMisplaced, Some(dir.loc.clone()));
            }
            continue;
        }
        if matches!(name, "once" | "memo" | "is") {
            continue;
        }
        if is_bind && dir.static_arg() == Some("is") && is_component_tag {
            continue;
        }
        if (is_bind && dir.static_arg() == Some("key"))
            || (is_on && has_children && dir.static_arg() == Some("vue:before-update"))
        {
            should_use_block = true;
        }
        if is_bind && dir.static_arg() == Some("ref") && in_v_for {
            collector.properties.push(ref_for_marker(allocator));
        }

        // `v-bind="obj"` and `v-on="handlers"` spread into the props
        if dir.arg.is_none() && (is_bind || is_on) {
            analysis.has_dynamic_keys = true;
            let Some(exp) = &dir.exp else {
                let code = if is_bind {
                    ErrorCode::VBindNoExpression
                } else {
                    ErrorCode::VOnNoExpression
                };
                ctx.report(code, Some(dir.loc.clone()));
                continue;
            };
            let exp = JsChildNode::from_expression(exp.clone_in(allocator));
            if is_bind {
                if in_v_for {
                    collector.properties.push(ref_for_marker(allocator));
                }
                collector.push_merge_arg(Some(exp));
            } else {
                let mut call = CallExpression::new(
                    allocator,
                    Callee::Symbol(ctx.helper(RuntimeHelper::ToHandlers)),
                    dir.loc.clone(),
                );
                call.arguments.push(CallArgument::Node(exp));
                if !is_component {
                    call.arguments.push(CallArgument::Raw(String::from("true")));
                }
                collector.push_merge_arg(Some(JsChildNode::Call(ctx.alloc(call))));
            }
            continue;
        }

        if is_bind && dir.has_modifier("prop") {
            analysis.has_hydration_event_binding = true;
        }

        let Some(position) = results.iter().position(|r| r.prop_index == index) else {
            continue;
        };
        let result = results.remove(position);
        for prop in result.props.iter() {
            analyze(
                prop,
                is_component,
                is_dynamic_component,
                &mut analysis,
                &mut dynamic_prop_names,
            );
        }
        if is_on && dir.arg.as_ref().is_some_and(|a| !a.is_static()) {
            let mut object = ObjectExpression::new(allocator, el.loc.clone());
            object.properties = result.props;
            collector.push_merge_arg(Some(JsChildNode::Object(ctx.alloc(object))));
        } else {
            collector.properties.extend(result.props);
        }
        if let Some(runtime) = result.runtime {
            if matches!(runtime.directive, RuntimeDirective::Resolved(_)) && has_children {
                should_use_block = true;
            }
            directives.push(runtime);
        }
    }

    let props = if !collector.merge_args.is_empty() {
        collector.push_merge_arg(None);
        let mut args = std::mem::take(&mut collector.merge_args);
        if args.len() > 1 {
            let mut call = CallExpression::new(
                allocator,
                Callee::Symbol(ctx.helper(RuntimeHelper::MergeProps)),
                el.loc.clone(),
            );
            call.arguments
                .extend(args.into_iter().map(CallArgument::Node));
            Some(JsChildNode::Call(ctx.alloc(call)))
        } else {
            args.pop()
        }
    } else if !collector.properties.is_empty() {
        let properties = std::mem::take(&mut collector.properties);
        let object = object_expression(dedupe_properties(properties, allocator), allocator);
        Some(JsChildNode::Object(ctx.alloc(object)))
    } else {
        None
    };

    let mut patch_flag = PatchFlags::empty();
    if analysis.has_dynamic_keys {
        patch_flag |= PatchFlags::FULL_PROPS;
    } else {
        if analysis.has_class_binding && !is_component {
            patch_flag |= PatchFlags::CLASS;
        }
        if analysis.has_style_binding && !is_component {
            patch_flag |= PatchFlags::STYLE;
        }
        if !dynamic_prop_names.is_empty() {
            patch_flag |= PatchFlags::PROPS;
        }
        if analysis.has_hydration_event_binding {
            patch_flag |= PatchFlags::NEED_HYDRATION;
        }
    }
    if !should_use_block
        && (patch_flag.is_empty() || patch_flag == PatchFlags::NEED_HYDRATION)
        && (analysis.has_ref || analysis.has_vnode_hook || !directives.is_empty())
    {
        patch_flag |= PatchFlags::NEED_PATCH;
    }

    let props = props.map(|p| normalize_props(p, analysis.has_style_binding, ctx));
    PropsBuildResult {
        props,
        directives,
        patch_flag,
        dynamic_prop_names,
        should_use_block,
    }
}

/// Fold one directive-produced property into the patch analysis.
fn analyze<'a>(
    prop: &Property<'a>,
    is_component: bool,
    is_dynamic_component: bool,
    analysis: &mut PatchAnalysis,
    dynamic_prop_names: &mut Vec<'a, String>,
) {
    let Some(name) = prop.static_key() else {
        analysis.has_dynamic_keys = true;
        return;
    };
    let is_event_handler = is_on(name);
    if is_event_handler
        && (!is_component || is_dynamic_component)
        && !name.eq_ignore_ascii_case("onclick")
        && name != "onUpdate:modelValue"
        && !is_reserved_prop(name)
    {
        analysis.has_hydration_event_binding = true;
    }
    if is_event_handler && is_reserved_prop(name) {
        analysis.has_vnode_hook = true;
    }

    let mut value = &prop.value;
    // Handlers wrapped by a runtime helper (`withModifiers(fn, ...)`)
    if is_event_handler {
        if let JsChildNode::Call(call) = value {
            if let Some(CallArgument::Node(inner)) = call.arguments.first() {
                value = inner;
            }
        }
    }
    let is_constant = match value {
        JsChildNode::Cache(_) => true,
        JsChildNode::SimpleExpression(s) => s.is_constant(),
        JsChildNode::CompoundExpression(c) => c.const_type() > ConstantType::NotConstant,
        _ => false,
    };
    if is_constant {
        return;
    }

    match name {
        "ref" => analysis.has_ref = true,
        "class" => analysis.has_class_binding = true,
        "style" => analysis.has_style_binding = true,
        "key" => {}
        _ => push_unique(dynamic_prop_names, name),
    }
    if is_component && matches!(name, "class" | "style") {
        push_unique(dynamic_prop_names, name);
    }
}

fn push_unique<'a>(names: &mut Vec<'a, String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(String::from(name));
    }
}

/// Pre-normalize class and style, or hand the whole object to `normalizeProps`.
fn normalize_props<'a>(
    props: JsChildNode<'a>,
    has_style_binding: bool,
    ctx: &mut TransformContext<'a>,
) -> PropsExpression<'a> {
    let allocator = ctx.allocator;
    match props {
        JsChildNode::Object(mut object) => {
            let has_dynamic_key = object
                .properties
                .iter()
                .any(|p| !p.key.is_static() && !is_handler_key(&p.key));
            if has_dynamic_key {
                let call = helper_call(
                    RuntimeHelper::NormalizeProps,
                    JsChildNode::Object(object),
                    ctx,
                );
                return PropsExpression::Call(ctx.alloc(call));
            }
            for prop in object.properties.iter_mut() {
                let key = prop.static_key().map(String::from);
                match key.as_deref() {
                    Some("class") if !is_static_value(&prop.value) => {
                        wrap_value(prop, RuntimeHelper::NormalizeClass, ctx);
                    }
                    Some("style") => {
                        let needs_normalize = has_style_binding
                            || matches!(&prop.value, JsChildNode::Array(_))
                            || matches!(
                                &prop.value,
                                JsChildNode::SimpleExpression(s) if s.content.trim_start().starts_with('[')
                            );
                        if needs_normalize {
                            wrap_value(prop, RuntimeHelper::NormalizeStyle, ctx);
                        }
                    }
                    _ => {}
                }
            }
            PropsExpression::Object(object)
        }
        // mergeProps and toHandlers already produce normalized props
        JsChildNode::Call(call) => PropsExpression::Call(call),
        other => {
            let guarded = helper_call(RuntimeHelper::GuardReactiveProps, other, ctx);
            let guarded = JsChildNode::Call(Box::new_in(guarded, allocator));
            let call = helper_call(RuntimeHelper::NormalizeProps, guarded, ctx);
            PropsExpression::Call(ctx.alloc(call))
        }
    }
}

fn is_handler_key(key: &ExpressionNode<'_>) -> bool {
    match key {
        ExpressionNode::Simple(s) => s.is_handler_key,
        ExpressionNode::Compound(c) => c.is_handler_key,
    }
}

fn is_static_value(value: &JsChildNode<'_>) -> bool {
    matches!(value, JsChildNode::SimpleExpression(s) if s.is_static)
}

fn wrap_value<'a>(prop: &mut Property<'a>, helper: RuntimeHelper, ctx: &mut TransformContext<'a>) {
    let allocator = ctx.allocator;
    let value = std::mem::replace(
        &mut prop.value,
        JsChildNode::code(allocator, "", ConstantType::NotConstant),
    );
    let call = helper_call(helper, value, ctx);
    prop.value = JsChildNode::Call(ctx.alloc(call));
}

/// `helper(arg)`
fn helper_call<'a>(
    helper: RuntimeHelper,
    arg: JsChildNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> CallExpression<'a> {
    let mut call = CallExpression::new(
        ctx.allocator,
        Callee::Symbol(ctx.helper(helper)),
        SourceLocation::STUB,
    );
    call.arguments.push(CallArgument::Node(arg));
    call
}

/// Keep the first property of each static key; repeated `class`, `style`
/// and listeners are merged into an array value.
fn dedupe_properties<'a>(
    properties: std::vec::Vec<Property<'a>>,
    allocator: &'a Bump,
) -> std::vec::Vec<Property<'a>> {
    let mut known: FxHashMap<String, usize> = FxHashMap::default();
    let mut deduped: std::vec::Vec<Property<'a>> = std::vec::Vec::with_capacity(properties.len());
    for prop in properties {
        let Some(name) = prop.static_key().map(String::from) else {
            deduped.push(prop);
            continue;
        };
        match known.get(&name) {
            Some(&at) => {
                if name == "class" || name == "style" || is_on(&name) {
                    merge_as_array(&mut deduped[at], prop.value, allocator);
                }
            }
            None => {
                known.insert(name, deduped.len());
                deduped.push(prop);
            }
        }
    }
    deduped
}

fn merge_as_array<'a>(existing: &mut Property<'a>, incoming: JsChildNode<'a>, allocator: &'a Bump) {
    if let JsChildNode::Array(array) = &mut existing.value {
        array.elements.push(incoming);
        return;
    }
    let first = std::mem::replace(
        &mut existing.value,
        JsChildNode::code(allocator, "", ConstantType::NotConstant),
    );
    let mut array = ArrayExpression::new(allocator, existing.loc.clone());
    array.elements.push(first);
    array.elements.push(incoming);
    existing.value = JsChildNode::Array(Box::new_in(array, allocator));
}

fn object_expression<'a>(
    properties: std::vec::Vec<Property<'a>>,
    allocator: &'a Bump,
) -> ObjectExpression<'a> {
    let mut object = ObjectExpression::new(allocator, SourceLocation::STUB);
    object.properties.extend(properties);
    object
}

fn attribute_property<'a>(attr: &AttributeNode, allocator: &'a Bump) -> Property<'a> {
    let (content, loc) = match &attr.value {
        Some(value) => (value.content.clone(), value.loc.clone()),
        None => (String::default(), attr.loc.clone()),
    };
    Property {
        key: ExpressionNode::simple(
            allocator,
            SimpleExpressionNode::new(attr.name.clone(), true, attr.name_loc.clone()),
        ),
        value: JsChildNode::SimpleExpression(Box::new_in(
            SimpleExpressionNode::new(content, true, loc),
            allocator,
        )),
        loc: attr.loc.clone(),
    }
}

/// `ref_for: true`, so refs inside `v-for` collect into arrays
fn ref_for_marker<'a>(allocator: &'a Bump) -> Property<'a> {
    static_property(
        "ref_for",
        JsChildNode::code(allocator, "true", ConstantType::CanStringify),
        allocator,
    )
}

/// Property with a static key
pub(crate) fn static_property<'a>(
    key: &str,
    value: JsChildNode<'a>,
    allocator: &'a Bump,
) -> Property<'a> {
    Property {
        key: ExpressionNode::simple(
            allocator,
            SimpleExpressionNode::new(key, true, SourceLocation::STUB),
        ),
        value,
        loc: SourceLocation::STUB,
    }
}

pub(crate) fn key_property<'a>(value: JsChildNode<'a>, allocator: &'a Bump) -> Property<'a> {
    static_property("key", value, allocator)
}

pub(crate) fn props_into_js(props: PropsExpression<'_>) -> JsChildNode<'_> {
    match props {
        PropsExpression::Object(obj) => JsChildNode::Object(obj),
        PropsExpression::Call(call) => JsChildNode::Call(call),
        PropsExpression::Simple(exp) => JsChildNode::SimpleExpression(exp),
    }
}

/// Add `prop` to existing props without overriding a property of the same key.
pub(crate) fn inject_prop<'a>(
    props: Option<PropsExpression<'a>>,
    prop: Property<'a>,
    ctx: &mut TransformContext<'a>,
) -> PropsExpression<'a> {
    let allocator = ctx.allocator;
    let single = |prop: Property<'a>| {
        let mut obj = ObjectExpression::new(allocator, SourceLocation::STUB);
        obj.properties.push(prop);
        obj
    };
    match props {
        None => PropsExpression::Object(ctx.alloc(single(prop))),
        Some(PropsExpression::Object(mut obj)) => {
            let key = prop.static_key();
            if key.is_none() || !obj.properties.iter().any(|p| p.static_key() == key) {
                obj.properties.insert(0, prop);
            }
            PropsExpression::Object(obj)
        }
        Some(PropsExpression::Call(mut call))
            if call.callee == Callee::Symbol(RuntimeHelper::MergeProps) =>
        {
            let obj = JsChildNode::Object(ctx.alloc(single(prop)));
            call.arguments.insert(0, CallArgument::Node(obj));
            PropsExpression::Call(call)
        }
        Some(PropsExpression::Call(mut call))
            if call.callee == Callee::Symbol(RuntimeHelper::NormalizeProps) =>
        {
            // normalizeProps(guardReactiveProps(x)) => normalizeProps(mergeProps({ prop }, x))
            let inner = call.arguments.pop();
            let spread = match inner {
                Some(CallArgument::Node(JsChildNode::Call(guard)))
                    if guard.callee == Callee::Symbol(RuntimeHelper::GuardReactiveProps) =>
                {
                    let mut guard = guard;
                    match guard.arguments.pop() {
                        Some(CallArgument::Node(node)) => node,
                        _ => JsChildNode::code(allocator, "{}", ConstantType::CanStringify),
                    }
                }
                Some(CallArgument::Node(node)) => node,
                _ => JsChildNode::code(allocator, "{}", ConstantType::CanStringify),
            };
            let merged = merge_props(single(prop), spread, ctx);
            call.arguments
                .push(CallArgument::Node(JsChildNode::Call(ctx.alloc(merged))));
            PropsExpression::Call(call)
        }
        Some(other) => {
            let merged = merge_props(single(prop), props_into_js(other), ctx);
            PropsExpression::Call(ctx.alloc(merged))
        }
    }
}

fn merge_props<'a>(
    first: ObjectExpression<'a>,
    rest: JsChildNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> CallExpression<'a> {
    let mut merged = CallExpression::new(
        ctx.allocator,
        Callee::Symbol(ctx.helper(RuntimeHelper::MergeProps)),
        SourceLocation::STUB,
    );
    merged
        .arguments
        .push(CallArgument::Node(JsChildNode::Object(ctx.alloc(first))));
    merged.arguments.push(CallArgument::Node(rest));
    merged
}

/// Inject `prop` into whatever an element renders: its vnode call (also
/// behind `withMemo`) or the props argument of a `renderSlot` call.
pub(crate) fn inject_codegen_prop<'a>(
    codegen: &mut ElementCodegenNode<'a>,
    prop: Property<'a>,
    ctx: &mut TransformContext<'a>,
) {
    if let Some(vnode) = block_vnode_mut(codegen) {
        vnode.props = Some(inject_prop(vnode.props.take(), prop, ctx));
        return;
    }
    let ElementCodegenNode::Call(call) = codegen else {
        return;
    };
    if call.callee != Callee::Symbol(RuntimeHelper::RenderSlot) {
        return;
    }
    let props = slot_call_props(call);
    let merged = CallArgument::Node(props_into_js(inject_prop(props, prop, ctx)));
    if call.arguments.len() > 2 {
        call.arguments[2] = merged;
    } else {
        call.arguments.push(merged);
    }
}

/// Take the props argument of a `renderSlot` call.
fn slot_call_props<'a>(call: &mut CallExpression<'a>) -> Option<PropsExpression<'a>> {
    let arg = call.arguments.get_mut(2)?;
    match std::mem::replace(arg, CallArgument::Raw(String::from("{}"))) {
        CallArgument::Node(JsChildNode::Object(obj)) => Some(PropsExpression::Object(obj)),
        CallArgument::Node(JsChildNode::Call(c)) => Some(PropsExpression::Call(c)),
        CallArgument::Node(JsChildNode::SimpleExpression(s)) => Some(PropsExpression::Simple(s)),
        other => {
            *arg = other;
            None
        }
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

    fn no_hoist() -> TransformOptions {
        TransformOptions {
            hoist_static: false,
            ..Default::default()
        }
    }

    fn with_vnode<R>(
        src: &str,
        options: TransformOptions,
        f: impl FnOnce(&VNodeCall<'_>, &RootNode<'_>, &[CompilerError]) -> R,
    ) -> R {
        let allocator = Bump::new();
        let (mut root, _) = parse(&allocator, src);
        let output = transform(&allocator, &mut root, &options, &base_transform_pipeline()).unwrap();
        let Some(JsChildNode::TemplateChild(TemplateChildNode::Element(el))) = &root.codegen_node
        else {
            panic!("expected element root");
        };
        let Some(ElementCodegenNode::VNodeCall(vnode)) = &el.codegen_node else {
            panic!("expected vnode call");
        };
        f(vnode, &root, &output.errors)
    }

    fn object<'r, 'a>(vnode: &'r VNodeCall<'a>) -> &'r ObjectExpression<'a> {
        match &vnode.props {
            Some(PropsExpression::Object(obj)) => obj,
            other => panic!("expected object props, got {:?}", other),
        }
    }

    fn keys(obj: &ObjectExpression<'_>) -> std::vec::Vec<std::string::String> {
        obj.properties
            .iter()
            .map(|p| p.static_key().unwrap_or("<dynamic>").to_string())
            .collect()
    }

    #[test]
    fn test_static_attributes() {
        with_vnode(r#"<div id="a" class="b"></div>"#, no_hoist(), |vnode, _, _| {
            assert_eq!(keys(object(vnode)), vec!["id", "class"]);
            assert_eq!(vnode.patch_flag, None);
        });
    }

    #[test]
    fn test_dynamic_class_and_props() {
        with_vnode(
            r#"<div :class="cls" :title="t" :id="'x'"></div>"#,
            no_hoist(),
            |vnode, root, _| {
                let flag = vnode.patch_flag.unwrap();
                assert_eq!(flag, PatchFlags::CLASS | PatchFlags::PROPS);
                let names: std::vec::Vec<_> = vnode
                    .dynamic_props
                    .as_ref()
                    .unwrap()
                    .iter()
                    .map(|n| n.as_str())
                    .collect();
                assert_eq!(names, vec!["title"]);
                assert!(root.helpers.contains(&RuntimeHelper::NormalizeClass));
            },
        );
    }

    #[test]
    fn test_duplicate_class_merges_into_array() {
        with_vnode(r#"<div class="a" :class="b"></div>"#, no_hoist(), |vnode, _, _| {
            let obj = object(vnode);
            assert_eq!(obj.properties.len(), 1);
            let JsChildNode::Call(call) = &obj.properties[0].value else {
                panic!("expected normalizeClass call");
            };
            assert_eq!(call.callee, Callee::Symbol(RuntimeHelper::NormalizeClass));
            assert!(matches!(
                &call.arguments[0],
                CallArgument::Node(JsChildNode::Array(a)) if a.elements.len() == 2
            ));
        });
    }

    #[test]
    fn test_object_spread_merges() {
        with_vnode(r#"<div id="a" v-bind="attrs" :title="t"></div>"#, no_hoist(), |vnode, _, _| {
            let Some(PropsExpression::Call(call)) = &vnode.props else {
                panic!("expected mergeProps");
            };
            assert_eq!(call.callee, Callee::Symbol(RuntimeHelper::MergeProps));
            assert_eq!(call.arguments.len(), 3);
            assert_eq!(vnode.patch_flag, Some(PatchFlags::FULL_PROPS));
        });
    }

    #[test]
    fn test_single_spread_is_guarded() {
        with_vnode(r#"<div v-bind="attrs"></div>"#, no_hoist(), |vnode, root, _| {
            let Some(PropsExpression::Call(call)) = &vnode.props else {
                panic!("expected normalizeProps");
            };
            assert_eq!(call.callee, Callee::Symbol(RuntimeHelper::NormalizeProps));
            assert!(root.helpers.contains(&RuntimeHelper::GuardReactiveProps));
        });
    }

    #[test]
    fn test_dynamic_key_needs_normalize_props() {
        with_vnode(r#"<div :[name]="v"></div>"#, no_hoist(), |vnode, _, _| {
            assert!(matches!(
                &vnode.props,
                Some(PropsExpression::Call(c)) if c.callee == Callee::Symbol(RuntimeHelper::NormalizeProps)
            ));
            assert_eq!(vnode.patch_flag, Some(PatchFlags::FULL_PROPS));
        });
    }

    #[test]
    fn test_ref_needs_patch() {
        with_vnode(r#"<div ref="el"></div>"#, no_hoist(), |vnode, _, _| {
            assert_eq!(vnode.patch_flag, Some(PatchFlags::NEED_PATCH));
        });
    }

    #[test]
    fn test_ref_in_v_for_gets_marker() {
        let allocator = Bump::new();
        let (mut root, _) = parse(&allocator, r#"<div v-for="i in list" ref="items"></div>"#);
        transform(&allocator, &mut root, &no_hoist(), &base_transform_pipeline()).unwrap();
        let Some(JsChildNode::TemplateChild(TemplateChildNode::For(for_node))) = &root.codegen_node
        else {
            panic!("expected for root");
        };
        let Some(ForCodegenNode::VNodeCall(fragment)) = &for_node.codegen_node else {
            panic!("expected fragment");
        };
        let Some(VNodeChildren::ForRenderList(list)) = &fragment.children else {
            panic!("expected renderList");
        };
        let Some(CallArgument::Node(JsChildNode::Function(f))) = list.arguments.get(1) else {
            panic!("expected loop function");
        };
        let Some(FunctionReturns::JsChild(JsChildNode::TemplateChild(TemplateChildNode::Element(
            el,
        )))) = &f.returns
        else {
            panic!("expected element");
        };
        let Some(ElementCodegenNode::VNodeCall(vnode)) = &el.codegen_node else {
            panic!("expected vnode");
        };
        assert_eq!(keys(object(vnode)), vec!["ref_for", "ref"]);
    }

    #[test]
    fn test_v_on_object_spread() {
        with_vnode(r#"<div v-on="handlers"></div>"#, no_hoist(), |vnode, root, _| {
            let Some(PropsExpression::Call(call)) = &vnode.props else {
                panic!("expected toHandlers call");
            };
            assert_eq!(call.callee, Callee::Symbol(RuntimeHelper::ToHandlers));
            assert_eq!(call.arguments.len(), 2);
            assert!(root.helpers.contains(&RuntimeHelper::ToHandlers));
        });
    }

    #[test]
    fn test_misplaced_slot_and_empty_spread() {
        with_vnode(r#"<div v-slot="p" v-bind></div>"#, no_hoist(), |_, _, errors| {
            let codes: std::vec::Vec<_> = errors.iter().map(|e| e.code).collect();
            assert_eq!(
                codes,
                vec![ErrorCode::VSlotMisplaced, ErrorCode::VBindNoExpression]
            );
        });
    }

    #[test]
    fn test_inject_prop_keeps_existing_key() {
        let allocator = Bump::new();
        let mut ctx = TransformContext::new(
            &allocator,
            TransformOptions::default(),
            std::rc::Rc::new(base_transform_pipeline()),
        );
        let first = key_property(JsChildNode::string(&allocator, "a"), &allocator);
        let props = inject_prop(None, first, &mut ctx);
        let second = key_property(JsChildNode::string(&allocator, "b"), &allocator);
        let props = inject_prop(Some(props), second, &mut ctx);
        let PropsExpression::Object(obj) = props else {
            panic!("expected object");
        };
        assert_eq!(obj.properties.len(), 1);
        assert!(matches!(
            &obj.properties[0].value,
            JsChildNode::SimpleExpression(s) if s.content == "a"
        ));
    }

    #[test]
    fn test_inject_prop_into_spread() {
        let allocator = Bump::new();
        let mut ctx = TransformContext::new(
            &allocator,
            TransformOptions::default(),
            std::rc::Rc::new(base_transform_pipeline()),
        );
        let spread = PropsExpression::Simple(Box::new_in(
            SimpleExpressionNode::new("attrs", false, SourceLocation::STUB),
            &allocator,
        ));
        let key = key_property(JsChildNode::string(&allocator, "k"), &allocator);
        let PropsExpression::Call(call) = inject_prop(Some(spread), key, &mut ctx) else {
            panic!("expected mergeProps");
        };
        assert_eq!(call.callee, Callee::Symbol(RuntimeHelper::MergeProps));
        assert_eq!(call.arguments.len(), 2);
    }
}
