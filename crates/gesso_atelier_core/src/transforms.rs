//! Built-in node and directive transforms.
//!
//! The base pipeline registers them in the order the driver depends on:
//! structural directives first, expression analysis, vnode assembly, then
//! hoisting and text merging, whose exits run before assembly.

pub mod hoist_static;
pub mod props;
pub mod slot_outlet;
pub mod slots;
pub mod transform_element;
pub mod transform_expression;
pub mod transform_text;
pub mod v_bind;
pub mod v_for;
pub mod v_if;
pub mod v_memo;
pub mod v_model;
pub mod v_on;
pub mod v_once;

pub use hoist_static::{DefaultHoistPolicy, HoistPolicy, HoistStatic};
pub use slot_outlet::TransformSlotOutlet;
pub use slots::TrackSlotScopes;
pub use transform_element::TransformElement;
pub use transform_expression::{process_expression, TransformExpression};
pub use transform_text::TransformText;
pub use v_for::TransformFor;
pub use v_if::TransformIf;
pub use v_memo::TransformMemo;
pub use v_once::TransformOnce;

use crate::transform::TransformPipeline;

/// Platform-agnostic pipeline: every node transform plus `bind`, `on` and `model`.
pub fn base_transform_pipeline() -> TransformPipeline {
    TransformPipeline::new()
        .with_node_transform(TransformOnce)
        .with_node_transform(TransformIf)
        .with_node_transform(TransformMemo)
        .with_node_transform(TransformFor)
        .with_node_transform(TransformExpression)
        .with_node_transform(TransformSlotOutlet)
        .with_node_transform(TransformElement)
        .with_node_transform(TrackSlotScopes)
        .with_node_transform(HoistStatic)
        .with_node_transform(TransformText)
        .with_directive_transform("bind", v_bind::transform_bind)
        .with_directive_transform("on", v_on::transform_on)
        .with_directive_transform("model", v_model::transform_model)
}
