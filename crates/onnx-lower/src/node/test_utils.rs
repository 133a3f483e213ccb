//! Helpers for constructing operator nodes and executing emitted subgraphs
//! in tests.

use crate::graph::{InstructionGraph, InstructionRef, Op};
use crate::ir::{AttributeValue, Attributes, ElementType, Node, NodeType, TensorData};
use crate::shape::Shape;

/// Builds a graph holding the operand instructions plus the operator node
/// that references them, mirroring how the graph front-end hands nodes to
/// the lowering.
pub struct NodeBuilder {
    graph: InstructionGraph,
    node_type: NodeType,
    name: String,
    attrs: Attributes,
    inputs: Vec<InstructionRef>,
}

impl NodeBuilder {
    pub fn new(node_type: NodeType, name: &str) -> Self {
        Self {
            graph: InstructionGraph::new(),
            node_type,
            name: name.to_string(),
            attrs: Attributes::new(),
            inputs: Vec::new(),
        }
    }

    pub fn attr_string(mut self, key: &str, value: &str) -> Self {
        self.attrs
            .insert(key.to_string(), AttributeValue::String(value.to_string()));
        self
    }

    pub fn attr_i64(mut self, key: &str, value: i64) -> Self {
        self.attrs
            .insert(key.to_string(), AttributeValue::Int64(value));
        self
    }

    pub fn attr_f32s(mut self, key: &str, value: Vec<f32>) -> Self {
        self.attrs
            .insert(key.to_string(), AttributeValue::Float32s(value));
        self
    }

    /// A float tensor operand with a compile-time value.
    pub fn input_tensor_f32_data(mut self, _name: &str, data: Vec<f32>, lens: Vec<usize>) -> Self {
        let ins = self.graph.add_literal(
            Shape::new(ElementType::Float32, lens),
            TensorData::Float32(data),
        );
        self.inputs.push(ins);
        self
    }

    /// An int64 tensor operand with a compile-time value.
    pub fn input_tensor_i64_data(mut self, _name: &str, data: Vec<i64>, lens: Vec<usize>) -> Self {
        let ins = self.graph.add_literal(
            Shape::new(ElementType::Int64, lens),
            TensorData::Int64(data),
        );
        self.inputs.push(ins);
        self
    }

    /// A float tensor operand bound at run time.
    pub fn input_tensor_f32(mut self, name: &str, lens: Vec<usize>) -> Self {
        let ins = self
            .graph
            .add_parameter(name, Shape::new(ElementType::Float32, lens));
        self.inputs.push(ins);
        self
    }

    /// A float tensor operand whose extents are unknown until run time.
    pub fn input_dynamic_f32(mut self, name: &str, lens: Vec<usize>) -> Self {
        let ins = self
            .graph
            .add_parameter(name, Shape::new_dynamic(ElementType::Float32, lens));
        self.inputs.push(ins);
        self
    }

    /// The placeholder standing for an absent optional operand.
    pub fn input_undefined(mut self) -> Self {
        let ins = self.graph.add_undefined();
        self.inputs.push(ins);
        self
    }

    pub fn build(self) -> (InstructionGraph, Node) {
        let node = Node::new(self.node_type, self.name, self.attrs, self.inputs);
        (self.graph, node)
    }
}

/// Execute an emitted subgraph over its literal operands.
///
/// Supports exactly the instruction set the resize lowering emits; anything
/// with a runtime dependency panics, mirroring what the execution engine
/// would be needed for.
pub fn evaluate(graph: &InstructionGraph, ins: InstructionRef) -> TensorData {
    let instruction = graph.instruction(ins);
    match &instruction.op {
        Op::Literal { data } => data.clone(),
        Op::Reshape { .. } => evaluate(graph, instruction.inputs[0]),
        Op::Gather { axis } => {
            assert_eq!(*axis, 0, "the resize lowering gathers along axis 0");
            let data = as_f32s(evaluate(graph, instruction.inputs[0]));
            let indices = match evaluate(graph, instruction.inputs[1]) {
                TensorData::Int32(v) => v,
                other => panic!("gather indices must be int32, got {other:?}"),
            };
            TensorData::Float32(indices.iter().map(|&i| data[i as usize]).collect())
        }
        Op::Slice { axes, starts, ends } => {
            assert_eq!(axes.as_slice(), &[0], "the resize lowering slices axis 0");
            let input_shape = graph.shape_of(instruction.inputs[0]);
            let row = input_shape.elements() / input_shape.lens()[0];
            let data = as_f32s(evaluate(graph, instruction.inputs[0]));
            let (start, end) = (starts[0] as usize * row, ends[0] as usize * row);
            TensorData::Float32(data[start..end].to_vec())
        }
        Op::Add | Op::Sub | Op::Mul => {
            let lhs = as_f32s(evaluate(graph, instruction.inputs[0]));
            let rhs = as_f32s(evaluate(graph, instruction.inputs[1]));
            assert_eq!(lhs.len(), rhs.len());
            let values = lhs
                .iter()
                .zip(&rhs)
                .map(|(&a, &b)| match &instruction.op {
                    Op::Add => a + b,
                    Op::Sub => a - b,
                    _ => a * b,
                })
                .collect();
            TensorData::Float32(values)
        }
        op @ (Op::Parameter { .. } | Op::Undefined | Op::Resize { .. }) => {
            panic!("`{op}` is not executable at compile time")
        }
    }
}

fn as_f32s(data: TensorData) -> Vec<f32> {
    match data {
        TensorData::Float32(v) => v,
        other => panic!("expected f32 data, got {other:?}"),
    }
}
