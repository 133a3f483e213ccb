//! The target-agnostic instruction graph the lowerings emit into.
//!
//! Instructions live in an arena owned by [`InstructionGraph`] and reference
//! their operands by index. The graph computes each instruction's output
//! shape on append so downstream lowerings can classify operands without
//! re-deriving geometry.

use strum::Display;

use crate::coord::{CoordTransformMode, NearestMode};
use crate::ir::{ElementType, TensorData};
use crate::shape::Shape;

/// Index of an instruction inside its owning [`InstructionGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstructionRef(usize);

/// Primitive operations understood by the downstream execution engine.
///
/// The display form is the engine-facing operation name (`reshape`,
/// `gather`, `undefined`, ...).
#[derive(Debug, Clone, PartialEq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Op {
    /// A compile-time constant embedded in the graph.
    Literal { data: TensorData },
    /// A graph input bound at run time.
    Parameter { name: String },
    /// Placeholder standing for an absent optional operand.
    Undefined,
    /// Reinterpret the input with the given extents.
    Reshape { dims: Vec<i64> },
    /// Select elements along `axis` using an integer index operand.
    Gather { axis: i64 },
    /// Contiguous range selection per listed axis.
    Slice {
        axes: Vec<i64>,
        starts: Vec<i64>,
        ends: Vec<i64>,
    },
    Add,
    Sub,
    Mul,
    /// Dynamic resize, interpreted by the execution engine at run time from
    /// its scale-or-size operand.
    Resize {
        nearest_mode: NearestMode,
        coord_mode: CoordTransformMode,
    },
}

/// One node of the instruction graph.
#[derive(Debug, Clone)]
pub struct Instruction {
    pub op: Op,
    pub inputs: Vec<InstructionRef>,
    pub shape: Shape,
}

/// Append-only arena of instructions, exclusively owned by one lowering pass.
#[derive(Debug, Default)]
pub struct InstructionGraph {
    instructions: Vec<Instruction>,
}

impl InstructionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instruction; its output shape is inferred from the operands.
    pub fn add_instruction(&mut self, op: Op, inputs: Vec<InstructionRef>) -> InstructionRef {
        let shape = self.infer_shape(&op, &inputs);
        self.push(Instruction { op, inputs, shape })
    }

    /// Embed a compile-time constant.
    pub fn add_literal(&mut self, shape: Shape, data: TensorData) -> InstructionRef {
        debug_assert_eq!(shape.elements(), data.len());
        debug_assert_eq!(shape.elem_type(), data.elem_type());
        self.push(Instruction {
            op: Op::Literal { data },
            inputs: vec![],
            shape,
        })
    }

    /// Declare a graph input bound at run time.
    pub fn add_parameter(&mut self, name: impl Into<String>, shape: Shape) -> InstructionRef {
        self.push(Instruction {
            op: Op::Parameter { name: name.into() },
            inputs: vec![],
            shape,
        })
    }

    /// Placeholder for an optional operand the model left absent.
    pub fn add_undefined(&mut self) -> InstructionRef {
        self.push(Instruction {
            op: Op::Undefined,
            inputs: vec![],
            shape: Shape::new(ElementType::Float32, vec![]),
        })
    }

    pub fn instruction(&self, ins: InstructionRef) -> &Instruction {
        &self.instructions[ins.0]
    }

    pub fn op(&self, ins: InstructionRef) -> &Op {
        &self.instruction(ins).op
    }

    pub fn shape_of(&self, ins: InstructionRef) -> &Shape {
        &self.instruction(ins).shape
    }

    /// The engine-facing name of an instruction's operation.
    pub fn name_of(&self, ins: InstructionRef) -> String {
        self.op(ins).to_string()
    }

    /// Number of instructions appended so far.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Compile-time evaluation attempt. `None` signals that the value has a
    /// runtime dependency somewhere in the graph.
    pub fn try_eval(&self, ins: InstructionRef) -> Option<&TensorData> {
        match &self.instruction(ins).op {
            Op::Literal { data } => Some(data),
            _ => None,
        }
    }

    fn push(&mut self, instruction: Instruction) -> InstructionRef {
        self.instructions.push(instruction);
        InstructionRef(self.instructions.len() - 1)
    }

    fn infer_shape(&self, op: &Op, inputs: &[InstructionRef]) -> Shape {
        match op {
            Op::Literal { .. } | Op::Parameter { .. } | Op::Undefined => {
                unreachable!("leaf instructions carry their shape at creation")
            }
            Op::Reshape { dims } => {
                let input = self.shape_of(inputs[0]);
                let lens: Vec<usize> = dims.iter().map(|&d| d as usize).collect();
                debug_assert_eq!(lens.iter().product::<usize>(), input.elements());
                Shape::new(input.elem_type(), lens)
            }
            Op::Gather { axis } => {
                let data = self.shape_of(inputs[0]);
                let indices = self.shape_of(inputs[1]);
                let axis = *axis as usize;
                let mut lens = data.lens()[..axis].to_vec();
                lens.extend_from_slice(indices.lens());
                lens.extend_from_slice(&data.lens()[axis + 1..]);
                Shape::new(data.elem_type(), lens)
            }
            Op::Slice { axes, starts, ends } => {
                let input = self.shape_of(inputs[0]);
                let mut lens = input.lens().to_vec();
                for ((&axis, &start), &end) in axes.iter().zip(starts).zip(ends) {
                    lens[axis as usize] = (end - start) as usize;
                }
                Shape::new(input.elem_type(), lens)
            }
            Op::Add | Op::Sub | Op::Mul => {
                let lhs = self.shape_of(inputs[0]);
                debug_assert_eq!(lhs.lens(), self.shape_of(inputs[1]).lens());
                lhs.clone()
            }
            Op::Resize { .. } => {
                // output extents depend on the runtime scale/size operand
                let data = self.shape_of(inputs[0]);
                Shape::new_dynamic(data.elem_type(), data.lens().to_vec())
            }
        }
    }
}
