//! The tree walk driving node and directive transforms.

use std::rc::Rc;

use gesso_carton::{to_valid_asset_id, PatchFlags, String, Vec};
use gesso_relief::ast::*;
use gesso_relief::errors::InternalError;

use super::{NodeAction, ParentKind, TransformContext, TransformPipeline};

/// Access to the siblings around the node being visited.
///
/// The visited node itself is detached while transforms run, so `previous`
/// and `next` are the real neighbours.
pub struct SiblingCursor<'c, 'a> {
    children: &'c mut Vec<'a, TemplateChildNode<'a>>,
    index: usize,
}

impl<'c, 'a> SiblingCursor<'c, 'a> {
    /// Position the visited node occupies in its parent's child list.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn previous(&self) -> Option<&TemplateChildNode<'a>> {
        self.index
            .checked_sub(1)
            .and_then(|i| self.children.get(i))
    }

    pub fn previous_mut(&mut self) -> Option<&mut TemplateChildNode<'a>> {
        match self.index.checked_sub(1) {
            Some(i) => self.children.get_mut(i),
            None => None,
        }
    }

    /// Detach the preceding sibling; the visited node moves up one slot.
    pub fn remove_previous(&mut self) -> Option<TemplateChildNode<'a>> {
        let i = self.index.checked_sub(1)?;
        self.index = i;
        Some(self.children.remove(i))
    }

    /// Sibling at `index` in the parent's list with the visited node detached.
    pub fn sibling(&self, index: usize) -> Option<&TemplateChildNode<'a>> {
        self.children.get(index)
    }

    pub fn next(&self) -> Option<&TemplateChildNode<'a>> {
        self.children.get(self.index)
    }

    /// Number of siblings, not counting the visited node
    pub fn sibling_count(&self) -> usize {
        self.children.len()
    }
}

enum Visit<'a> {
    Keep,
    Removed,
    Replaced(std::vec::Vec<TemplateChildNode<'a>>),
}

/// Visit every node of `children` in order.
///
/// Iteration is index based and re-reads the list after each node, so
/// transforms may remove earlier siblings or splice in replacements.
pub fn traverse_children<'a>(
    children: &mut Vec<'a, TemplateChildNode<'a>>,
    ctx: &mut TransformContext<'a>,
) {
    let mut i = 0;
    while i < children.len() {
        if ctx.has_fault() {
            return;
        }
        let mut node = children.remove(i);
        let mut cursor = SiblingCursor { children, index: i };
        let visit = traverse_node(&mut node, &mut cursor, ctx);
        let index = cursor.index;
        match visit {
            Visit::Keep => {
                children.insert(index, node);
                i = index + 1;
            }
            Visit::Removed => i = index,
            Visit::Replaced(nodes) => {
                for (offset, replacement) in nodes.into_iter().enumerate() {
                    children.insert(index + offset, replacement);
                }
                i = index;
            }
        }
    }
}

fn traverse_node<'a>(
    node: &mut TemplateChildNode<'a>,
    cursor: &mut SiblingCursor<'_, 'a>,
    ctx: &mut TransformContext<'a>,
) -> Visit<'a> {
    tracing::trace!(kind = ?node.node_type(), index = cursor.index, "visit");
    let pipeline = Rc::clone(&ctx.pipeline);

    let mut exits = std::vec::Vec::new();
    for transform in pipeline.node_transforms() {
        match transform.enter(node, cursor, ctx) {
            NodeAction::Continue => {}
            NodeAction::Exit(exit) => exits.push(exit),
            NodeAction::Replace(nodes) => return Visit::Replaced(nodes),
            NodeAction::Remove => return Visit::Removed,
        }
        if ctx.has_fault() {
            return Visit::Keep;
        }
    }

    if let TemplateChildNode::Element(el) = node {
        apply_directive_transforms(el, &pipeline, ctx);
    }

    match node {
        TemplateChildNode::Interpolation(_) => {
            ctx.helper(RuntimeHelper::ToDisplayString);
        }
        TemplateChildNode::Comment(_) => {
            ctx.helper(RuntimeHelper::CreateComment);
        }
        TemplateChildNode::Element(el) => {
            ctx.enter_parent(ParentKind::Element {
                tag: el.tag.clone(),
                tag_type: el.tag_type,
            });
            traverse_children(&mut el.children, ctx);
            ctx.exit_parent();
        }
        TemplateChildNode::If(if_node) => {
            for branch in if_node.branches.iter_mut() {
                ctx.enter_parent(ParentKind::IfBranch);
                traverse_children(&mut branch.children, ctx);
                ctx.exit_parent();
            }
        }
        TemplateChildNode::For(for_node) => {
            let aliases = for_aliases(&for_node.parse_result);
            ctx.push_scope(aliases);
            ctx.v_for_depth += 1;
            ctx.enter_parent(ParentKind::For);
            traverse_children(&mut for_node.children, ctx);
            ctx.exit_parent();
            ctx.v_for_depth -= 1;
            ctx.pop_scope();
        }
        _ => {}
    }

    while let Some(exit) = exits.pop() {
        if ctx.has_fault() {
            break;
        }
        exit(node, ctx);
    }
    Visit::Keep
}

/// Names bound by a `v-for` alias list.
pub(crate) fn for_aliases(parse_result: &ForParseResult<'_>) -> std::vec::Vec<String> {
    parse_result
        .alias_params()
        .into_iter()
        .flatten()
        .flat_map(gesso_carton::pattern_identifiers)
        .collect()
}

fn apply_directive_transforms<'a>(
    el: &mut ElementNode<'a>,
    pipeline: &TransformPipeline,
    ctx: &mut TransformContext<'a>,
) {
    let allocator = ctx.allocator;
    let mut results = Vec::new_in(allocator);
    let mut index = 0;
    while index < el.props.len() {
        let wanted = match &el.props[index] {
            // Object spreads are merged while building props
            PropNode::Directive(dir) => {
                !(matches!(dir.name.as_str(), "bind" | "on") && dir.arg.is_none())
            }
            PropNode::Attribute(_) => false,
        };
        if !wanted {
            index += 1;
            continue;
        }

        let prop = el.props.remove(index);
        if let PropNode::Directive(dir) = &prop {
            if let Some(transform) = pipeline.directive_transform(&dir.name) {
                let result = transform.transform(dir, el, ctx);
                let runtime = result
                    .need_runtime
                    .map(|directive| runtime_directive(dir, directive, ctx));
                results.push(TransformedDirective {
                    prop_index: index,
                    props: result.props,
                    runtime,
                });
            } else if !(ctx.options.is_builtin_directive)(&dir.name) {
                ctx.helper(RuntimeHelper::ResolveDirective);
                ctx.add_directive(&dir.name);
                let id = to_valid_asset_id(&dir.name, "directive");
                results.push(TransformedDirective {
                    prop_index: index,
                    props: Vec::new_in(allocator),
                    runtime: Some(runtime_directive(dir, RuntimeDirective::Resolved(id), ctx)),
                });
            }
        }
        el.props.insert(index, prop);
        index += 1;
    }
    el.directive_results = results;
}

fn runtime_directive<'a>(
    dir: &DirectiveNode<'a>,
    directive: RuntimeDirective,
    ctx: &TransformContext<'a>,
) -> DirectiveArgumentNode<'a> {
    let allocator = ctx.allocator;
    DirectiveArgumentNode {
        directive,
        exp: dir.exp.as_ref().map(|e| e.clone_in(allocator)),
        arg: dir.arg.as_ref().map(|e| e.clone_in(allocator)),
        modifiers: dir.modifiers.clone(),
        loc: dir.loc.clone(),
    }
}

/// Walk the whole tree, run root exits, and build the root codegen node.
pub(crate) fn traverse_root<'a>(
    root: &mut RootNode<'a>,
    ctx: &mut TransformContext<'a>,
) -> Result<(), InternalError> {
    traverse_children(&mut root.children, ctx);
    fault(ctx)?;

    let pipeline = Rc::clone(&ctx.pipeline);
    for transform in pipeline.node_transforms().iter().rev() {
        transform.exit_root(root, ctx);
        fault(ctx)?;
    }

    create_root_codegen(root, ctx);
    fault(ctx)
}

fn fault(ctx: &mut TransformContext<'_>) -> Result<(), InternalError> {
    match ctx.take_fault() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Single child: rendered directly, as a block when it is a vnode call.
/// Several children: wrapped in a stable fragment block.
fn create_root_codegen<'a>(root: &mut RootNode<'a>, ctx: &mut TransformContext<'a>) {
    let allocator = ctx.allocator;
    let mut children = std::mem::replace(&mut root.children, Vec::new_in(allocator));
    if children.len() == 1 {
        let Some(mut child) = children.pop() else {
            return;
        };
        if let TemplateChildNode::Element(el) = &mut child {
            if let Some(ElementCodegenNode::VNodeCall(vnode)) = &mut el.codegen_node {
                ctx.make_block(vnode);
            }
        }
        root.codegen_node = Some(JsChildNode::TemplateChild(child));
    } else if !children.is_empty() {
        let mut patch_flag = PatchFlags::STABLE_FRAGMENT;
        let non_comment = children
            .iter()
            .filter(|c| !matches!(c, TemplateChildNode::Comment(_)))
            .count();
        if non_comment == 1 {
            patch_flag |= PatchFlags::DEV_ROOT_FRAGMENT;
        }
        let mut fragment = VNodeCall::new(
            VNodeTag::Symbol(ctx.helper(RuntimeHelper::Fragment)),
            root.loc.clone(),
        );
        fragment.children = Some(VNodeChildren::Multiple(children));
        fragment.patch_flag = Some(patch_flag);
        ctx.helper(RuntimeHelper::vnode(false));
        ctx.make_block(&mut fragment);
        root.codegen_node = Some(JsChildNode::VNodeCall(ctx.alloc(fragment)));
    }
}
