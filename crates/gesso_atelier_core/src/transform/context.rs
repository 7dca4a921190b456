//! Shared state threaded through every transform.

use std::rc::Rc;

use gesso_carton::{format_compact, Box, Bump, FxHashMap, FxHashSet, SmallVec, String, Vec};
use gesso_relief::ast::*;
use gesso_relief::errors::{CompilerError, ErrorCode, InternalError};
use gesso_relief::options::TransformOptions;

use super::{TransformOutput, TransformPipeline};

/// What kind of node a child list belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentKind {
    Root,
    Element { tag: String, tag_type: ElementType },
    IfBranch,
    For,
}

impl ParentKind {
    pub fn is_component(&self) -> bool {
        matches!(
            self,
            Self::Element {
                tag_type: ElementType::Component,
                ..
            }
        )
    }
}

/// Snapshot taken by [`TransformContext::scope_mark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScopeMark {
    reads: usize,
    depth: usize,
}

/// Transform context
pub struct TransformContext<'a> {
    pub allocator: &'a Bump,
    pub options: TransformOptions,
    pub(crate) pipeline: Rc<TransformPipeline>,
    /// Reference counts, so a helper swapped out during lowering disappears
    helpers: FxHashMap<RuntimeHelper, u32>,
    components: std::vec::Vec<String>,
    directives: std::vec::Vec<String>,
    imports: std::vec::Vec<ImportItem>,
    references: std::vec::Vec<String>,
    reference_set: FxHashSet<String>,
    hoists: Vec<'a, Option<JsChildNode<'a>>>,
    cached: u32,
    temps: u32,
    scopes: std::vec::Vec<SmallVec<[String; 4]>>,
    ancestors: std::vec::Vec<ParentKind>,
    errors: std::vec::Vec<CompilerError>,
    fault: Option<InternalError>,
    /// Inside a `v-once` subtree: nothing is hoisted or cached again
    pub in_v_once: bool,
    pub(crate) v_for_depth: u32,
    pub(crate) v_slot_depth: u32,
    pub(crate) v_memo_depth: u32,
    /// `<slot>` outlets entered so far
    pub(crate) slot_outlets: u32,
    /// Scope frame each scoped identifier read resolved to, in read order
    scope_reads: std::vec::Vec<usize>,
}

impl<'a> TransformContext<'a> {
    pub fn new(
        allocator: &'a Bump,
        options: TransformOptions,
        pipeline: Rc<TransformPipeline>,
    ) -> Self {
        Self {
            allocator,
            options,
            pipeline,
            helpers: FxHashMap::default(),
            components: std::vec::Vec::new(),
            directives: std::vec::Vec::new(),
            imports: std::vec::Vec::new(),
            references: std::vec::Vec::new(),
            reference_set: FxHashSet::default(),
            hoists: Vec::new_in(allocator),
            cached: 0,
            temps: 0,
            scopes: std::vec::Vec::new(),
            ancestors: vec![ParentKind::Root],
            errors: std::vec::Vec::new(),
            fault: None,
            in_v_once: false,
            v_for_depth: 0,
            v_slot_depth: 0,
            v_memo_depth: 0,
            slot_outlets: 0,
            scope_reads: std::vec::Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Helpers and assets
    // ------------------------------------------------------------------

    /// Register a runtime helper. Registering twice keeps one entry.
    pub fn helper(&mut self, helper: RuntimeHelper) -> RuntimeHelper {
        *self.helpers.entry(helper).or_insert(0) += 1;
        helper
    }

    /// Drop one registration of `helper`.
    pub fn remove_helper(&mut self, helper: RuntimeHelper) {
        if let Some(count) = self.helpers.get_mut(&helper) {
            *count -= 1;
            if *count == 0 {
                self.helpers.remove(&helper);
            }
        }
    }

    pub fn has_helper(&self, helper: RuntimeHelper) -> bool {
        self.helpers.contains_key(&helper)
    }

    /// Registered helpers in enum order.
    pub fn helpers(&self) -> std::vec::Vec<RuntimeHelper> {
        let mut helpers: std::vec::Vec<_> = self.helpers.keys().copied().collect();
        helpers.sort();
        helpers
    }

    pub fn add_component(&mut self, name: &str) {
        if !self.components.iter().any(|c| c == name) {
            self.components.push(String::from(name));
        }
    }

    pub fn add_directive(&mut self, name: &str) {
        if !self.directives.iter().any(|d| d == name) {
            self.directives.push(String::from(name));
        }
    }

    pub fn add_import(&mut self, item: ImportItem) {
        if !self.imports.contains(&item) {
            self.imports.push(item);
        }
    }

    /// Record a top-level identifier the template reads.
    pub fn add_reference(&mut self, name: &str) {
        if self.reference_set.insert(String::from(name)) {
            self.references.push(String::from(name));
        }
    }

    pub fn references(&self) -> &[String] {
        &self.references
    }

    // ------------------------------------------------------------------
    // Scopes
    // ------------------------------------------------------------------

    /// Enter a scope binding `names` (v-for aliases, slot props).
    pub fn push_scope(&mut self, names: impl IntoIterator<Item = String>) {
        self.scopes.push(names.into_iter().collect());
    }

    /// Leave the innermost scope. Leaving with none open is an internal fault.
    pub fn pop_scope(&mut self) {
        if self.scopes.pop().is_none() {
            self.set_fault(InternalError::ScopeUnderflow);
        }
    }

    pub fn is_scoped(&self, name: &str) -> bool {
        self.scopes
            .iter()
            .any(|frame| frame.iter().any(|n| n == name))
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// Log a read of the scoped name `name`.
    pub(crate) fn note_scope_read(&mut self, name: &str) {
        if let Some(frame) = self
            .scopes
            .iter()
            .rposition(|frame| frame.iter().any(|n| n == name))
        {
            self.scope_reads.push(frame);
        }
    }

    /// Position in the read log and the current scope depth.
    pub(crate) fn scope_mark(&self) -> ScopeMark {
        ScopeMark {
            reads: self.scope_reads.len(),
            depth: self.scopes.len(),
        }
    }

    /// Whether anything read since `mark` resolved to a scope open at `mark`.
    pub(crate) fn read_outer_scope_since(&self, mark: ScopeMark) -> bool {
        self.scope_reads
            .get(mark.reads..)
            .is_some_and(|reads| reads.iter().any(|&frame| frame < mark.depth))
    }

    // ------------------------------------------------------------------
    // Hoisting and caching
    // ------------------------------------------------------------------

    /// Append a hoisted expression and return its index.
    pub fn hoist(&mut self, node: JsChildNode<'a>) -> usize {
        self.hoists.push(Some(node));
        self.hoists.len() - 1
    }

    /// Hoist `node` and return the `_hoisted_N` expression standing for it.
    pub fn hoist_expression(&mut self, node: JsChildNode<'a>) -> SimpleExpressionNode<'a> {
        let index = self.hoist(node);
        let mut exp = SimpleExpressionNode::code(
            format_compact!("_hoisted_{}", index + 1),
            ConstantType::CanCache,
        );
        exp.hoisted = Some(index);
        exp
    }

    /// Clear a hoist slot. Later indices keep their numbering.
    pub fn invalidate_hoist(&mut self, index: usize) -> Option<JsChildNode<'a>> {
        self.hoists.get_mut(index).and_then(Option::take)
    }

    pub fn hoist_count(&self) -> usize {
        self.hoists.len()
    }

    pub fn hoisted(&self, index: usize) -> Option<&JsChildNode<'a>> {
        self.hoists.get(index).and_then(Option::as_ref)
    }

    /// Take the next `_cache` slot.
    pub fn next_cache_slot(&mut self) -> u32 {
        let slot = self.cached;
        self.cached += 1;
        slot
    }

    /// Wrap `value` in a cache expression occupying a fresh slot.
    pub fn cache(&mut self, value: JsChildNode<'a>, is_vnode: bool) -> CacheExpression<'a> {
        CacheExpression {
            index: self.next_cache_slot(),
            value,
            is_vnode,
            in_v_once: self.in_v_once,
            loc: SourceLocation::STUB,
        }
    }

    /// Reserve a `_temp` variable in the render function.
    pub fn add_temp(&mut self) -> u32 {
        let temp = self.temps;
        self.temps += 1;
        temp
    }

    /// Turn a vnode call into a block, swapping its creation helper.
    pub fn make_block(&mut self, vnode: &mut VNodeCall<'a>) {
        if !vnode.is_block {
            vnode.is_block = true;
            self.remove_helper(RuntimeHelper::vnode(vnode.is_component));
            self.helper(RuntimeHelper::OpenBlock);
            self.helper(RuntimeHelper::block(vnode.is_component));
        }
    }

    /// Turn a block back into a plain vnode call.
    pub fn unmake_block(&mut self, vnode: &mut VNodeCall<'a>) {
        if vnode.is_block {
            vnode.is_block = false;
            self.remove_helper(RuntimeHelper::OpenBlock);
            self.remove_helper(RuntimeHelper::block(vnode.is_component));
            self.helper(RuntimeHelper::vnode(vnode.is_component));
        }
    }

    pub fn alloc<T>(&self, value: T) -> Box<'a, T> {
        Box::new_in(value, self.allocator)
    }

    // ------------------------------------------------------------------
    // Ancestry
    // ------------------------------------------------------------------

    pub fn enter_parent(&mut self, kind: ParentKind) {
        self.ancestors.push(kind);
    }

    pub fn exit_parent(&mut self) {
        if self.ancestors.len() > 1 {
            self.ancestors.pop();
        }
    }

    /// Nearest enclosing node of the node being visited
    pub fn parent(&self) -> &ParentKind {
        self.ancestors.last().unwrap_or(&ParentKind::Root)
    }

    /// Enclosing nodes, root first.
    pub fn ancestors(&self) -> &[ParentKind] {
        &self.ancestors
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Record a template misuse and keep going.
    pub fn report(&mut self, code: ErrorCode, loc: Option<SourceLocation>) {
        tracing::debug!(code = code.key(), "template diagnostic");
        self.errors.push(CompilerError::new(code, loc));
    }

    pub fn errors(&self) -> &[CompilerError] {
        &self.errors
    }

    /// Record an internal fault. The first fault wins and stops the walk.
    pub fn set_fault(&mut self, error: InternalError) {
        if self.fault.is_none() {
            tracing::warn!(%error, "transform fault");
            self.fault = Some(error);
        }
    }

    pub fn has_fault(&self) -> bool {
        self.fault.is_some()
    }

    pub(crate) fn take_fault(&mut self) -> Option<InternalError> {
        self.fault.take()
    }

    /// Move collected metadata onto the root.
    pub(crate) fn finish(self, root: &mut RootNode<'a>) -> TransformOutput {
        let allocator = self.allocator;
        let mut helpers = self.helpers.into_keys().collect::<std::vec::Vec<_>>();
        helpers.sort();
        root.helpers = Vec::from_iter_in(helpers, allocator);
        root.components = Vec::from_iter_in(self.components, allocator);
        root.directives = Vec::from_iter_in(self.directives, allocator);
        root.imports = Vec::from_iter_in(self.imports, allocator);
        root.references = Vec::from_iter_in(self.references, allocator);
        root.hoists = self.hoists;
        root.cached = self.cached;
        root.temps = self.temps;
        root.transformed = true;
        TransformOutput {
            errors: self.errors,
        }
    }
}
