#![warn(missing_docs)]

//! `onnx-lower` is the lowering stage of a tensor-graph compiler: it converts
//! declarative Resize/Upsample operator nodes (attribute map plus tensor
//! operands carrying scale or target-size information) into equivalent
//! subgraphs of primitive instructions — reshape, gather, slice, elementwise
//! arithmetic and embedded constant tables — that a generic execution engine
//! can run on any backend.
//!
//! When every shape and scale is a compile-time literal the whole operator is
//! replaced by a fixed gather/arithmetic sequence for better performance;
//! when any dependency is a runtime value a single generic `resize`
//! instruction is emitted instead.

#[macro_use]
extern crate derive_new;

/// Coordinate-space mapping between output samples and the input grid.
pub mod coord;
/// Lowering failure taxonomy.
pub mod error;
/// The target-agnostic instruction graph the lowerings emit into.
pub mod graph;
/// Operator-node data model: attributes, element types, literal data.
pub mod ir;
/// Operator lowerings.
pub mod node;
/// Tensor extents, strides and index mapping.
pub mod shape;

pub use coord::{CoordTransformMode, NearestMode};
pub use error::LowerError;
pub use graph::{Instruction, InstructionGraph, InstructionRef, Op};
pub use ir::{AttributeValue, Attributes, ElementType, Node, NodeType, TensorData};
pub use node::lower_node;
pub use shape::Shape;
