//! AST transformation.
//!
//! One pre-order walk over the parsed tree. At every node the driver runs the
//! registered node transforms in order, then the directive transforms of an
//! element in source order, then visits the children, and finally runs the
//! exit callbacks the node transforms returned in reverse order. Exit callbacks
//! see fully transformed children, which is where codegen nodes are assembled.

mod context;
mod traverse;

pub use context::{ParentKind, TransformContext};
pub(crate) use context::ScopeMark;
pub use traverse::{traverse_children, SiblingCursor};
pub(crate) use traverse::for_aliases;

use std::rc::Rc;

use gesso_carton::{Bump, FxHashMap, String, Vec};
use gesso_relief::ast::*;
use gesso_relief::errors::{CompilerError, InternalError};
use gesso_relief::options::TransformOptions;

use crate::transforms::hoist_static::{DefaultHoistPolicy, HoistPolicy};

/// Deferred work scheduled by a node transform, run after the node's children.
pub type ExitFn<'a> =
    std::boxed::Box<dyn FnOnce(&mut TemplateChildNode<'a>, &mut TransformContext<'a>) + 'a>;

/// What a node transform asks the driver to do with the current node.
pub enum NodeAction<'a> {
    Continue,
    /// Continue, and run the callback once the children are done
    Exit(ExitFn<'a>),
    /// Swap the node for zero or more siblings; the replacements are visited next
    Replace(std::vec::Vec<TemplateChildNode<'a>>),
    /// Drop the node; processing of it stops
    Remove,
}

impl<'a> NodeAction<'a> {
    pub fn exit(
        f: impl FnOnce(&mut TemplateChildNode<'a>, &mut TransformContext<'a>) + 'a,
    ) -> Self {
        Self::Exit(std::boxed::Box::new(f))
    }
}

/// A pass applied to every template node.
pub trait NodeTransform {
    fn name(&self) -> &'static str;

    fn enter<'a>(
        &self,
        node: &mut TemplateChildNode<'a>,
        cursor: &mut SiblingCursor<'_, 'a>,
        ctx: &mut TransformContext<'a>,
    ) -> NodeAction<'a>;

    /// Runs after the whole tree, in reverse registration order.
    fn exit_root<'a>(&self, _root: &mut RootNode<'a>, _ctx: &mut TransformContext<'a>) {}
}

/// Properties and runtime requirements produced for one directive.
pub struct DirectiveTransformResult<'a> {
    pub props: Vec<'a, Property<'a>>,
    pub need_runtime: Option<RuntimeDirective>,
}

impl<'a> DirectiveTransformResult<'a> {
    pub fn empty(allocator: &'a Bump) -> Self {
        Self {
            props: Vec::new_in(allocator),
            need_runtime: None,
        }
    }

    pub fn with_prop(allocator: &'a Bump, prop: Property<'a>) -> Self {
        let mut props = Vec::new_in(allocator);
        props.push(prop);
        Self {
            props,
            need_runtime: None,
        }
    }
}

/// Turns one directive of an element into vnode properties.
///
/// The directive is detached from `el.props` for the duration of the call.
pub trait DirectiveTransform {
    fn transform<'a>(
        &self,
        dir: &DirectiveNode<'a>,
        el: &mut ElementNode<'a>,
        ctx: &mut TransformContext<'a>,
    ) -> DirectiveTransformResult<'a>;
}

impl<F> DirectiveTransform for F
where
    F: for<'a> Fn(
        &DirectiveNode<'a>,
        &mut ElementNode<'a>,
        &mut TransformContext<'a>,
    ) -> DirectiveTransformResult<'a>,
{
    fn transform<'a>(
        &self,
        dir: &DirectiveNode<'a>,
        el: &mut ElementNode<'a>,
        ctx: &mut TransformContext<'a>,
    ) -> DirectiveTransformResult<'a> {
        self(dir, el, ctx)
    }
}

/// Ordered node transforms, directive transforms by name, and the hoist policy.
#[derive(Clone)]
pub struct TransformPipeline {
    node_transforms: std::vec::Vec<Rc<dyn NodeTransform>>,
    directive_transforms: FxHashMap<String, Rc<dyn DirectiveTransform>>,
    hoist_policy: Rc<dyn HoistPolicy>,
}

impl Default for TransformPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformPipeline {
    /// Empty pipeline with the default hoist policy
    pub fn new() -> Self {
        Self {
            node_transforms: std::vec::Vec::new(),
            directive_transforms: FxHashMap::default(),
            hoist_policy: Rc::new(DefaultHoistPolicy),
        }
    }

    pub fn with_node_transform(mut self, transform: impl NodeTransform + 'static) -> Self {
        self.node_transforms.push(Rc::new(transform));
        self
    }

    /// Register a node transform ahead of all others.
    pub fn prepend_node_transform(mut self, transform: impl NodeTransform + 'static) -> Self {
        self.node_transforms.insert(0, Rc::new(transform));
        self
    }

    /// Register a directive transform, replacing any previous one for `name`.
    pub fn with_directive_transform(
        mut self,
        name: &str,
        transform: impl DirectiveTransform + 'static,
    ) -> Self {
        self.directive_transforms
            .insert(String::from(name), Rc::new(transform));
        self
    }

    pub fn with_hoist_policy(mut self, policy: impl HoistPolicy + 'static) -> Self {
        self.hoist_policy = Rc::new(policy);
        self
    }

    pub fn node_transforms(&self) -> &[Rc<dyn NodeTransform>] {
        &self.node_transforms
    }

    pub fn node_transform_names(&self) -> std::vec::Vec<&'static str> {
        self.node_transforms.iter().map(|t| t.name()).collect()
    }

    pub fn directive_transform(&self, name: &str) -> Option<&Rc<dyn DirectiveTransform>> {
        self.directive_transforms.get(name)
    }

    pub fn hoist_policy(&self) -> &dyn HoistPolicy {
        &*self.hoist_policy
    }
}

/// Diagnostics collected while transforming.
#[derive(Debug, Default)]
pub struct TransformOutput {
    pub errors: std::vec::Vec<CompilerError>,
}

/// Run `pipeline` over `root`, leaving codegen nodes and root metadata in place.
///
/// Misuse in the template is reported in the output and never stops the walk.
/// An internal fault aborts with the error instead.
pub fn transform<'a>(
    allocator: &'a Bump,
    root: &mut RootNode<'a>,
    options: &TransformOptions,
    pipeline: &TransformPipeline,
) -> Result<TransformOutput, InternalError> {
    let mut ctx = TransformContext::new(allocator, options.clone(), Rc::new(pipeline.clone()));
    traverse::traverse_root(root, &mut ctx)?;
    let output = ctx.finish(root);
    tracing::debug!(
        helpers = root.helpers.len(),
        hoists = root.hoists.len(),
        cached = root.cached,
        errors = output.errors.len(),
        "transform finished"
    );
    Ok(output)
}
