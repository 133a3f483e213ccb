//! Operator lowerings.
//!
//! Each submodule lowers one operator family from its declarative node form
//! (attribute map + operand list) into primitive instructions appended to the
//! caller's [`InstructionGraph`](crate::graph::InstructionGraph).

#[cfg(test)]
pub mod test_utils;

pub mod resize;

use crate::error::LowerError;
use crate::graph::{InstructionGraph, InstructionRef};
use crate::ir::{Node, NodeType};

/// Lower one operator node, returning the instruction holding its result.
pub fn lower_node(
    graph: &mut InstructionGraph,
    node: &Node,
) -> Result<InstructionRef, LowerError> {
    match node.node_type {
        NodeType::Resize | NodeType::Upsample => resize::lower_resize(graph, node),
    }
}
