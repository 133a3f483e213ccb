use core::fmt;
use half::f16;
use std::{collections::HashMap, fmt::Formatter};
use strum::{Display, EnumString};

use crate::graph::InstructionRef;

/// The type of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Float16,
    Float32,
    Float64,
    Int32,
    Int64,
}

/// Compile-time tensor contents, one variant per element type.
#[derive(Clone, PartialEq)]
pub enum TensorData {
    Float16(Vec<f16>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
}

impl TensorData {
    /// The element type of the stored values.
    pub fn elem_type(&self) -> ElementType {
        match self {
            TensorData::Float16(_) => ElementType::Float16,
            TensorData::Float32(_) => ElementType::Float32,
            TensorData::Float64(_) => ElementType::Float64,
            TensorData::Int32(_) => ElementType::Int32,
            TensorData::Int64(_) => ElementType::Int64,
        }
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        match self {
            TensorData::Float16(v) => v.len(),
            TensorData::Float32(v) => v.len(),
            TensorData::Float64(v) => v.len(),
            TensorData::Int32(v) => v.len(),
            TensorData::Int64(v) => v.len(),
        }
    }

    /// Whether no elements are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the values as double precision, whatever the stored type.
    pub fn to_f64s(&self) -> Vec<f64> {
        match self {
            TensorData::Float16(v) => v.iter().map(|e| e.to_f64()).collect(),
            TensorData::Float32(v) => v.iter().map(|&e| e as f64).collect(),
            TensorData::Float64(v) => v.clone(),
            TensorData::Int32(v) => v.iter().map(|&e| e as f64).collect(),
            TensorData::Int64(v) => v.iter().map(|&e| e as f64).collect(),
        }
    }

    /// Read integer values widened to 64 bits.
    pub fn to_i64s(&self) -> Vec<i64> {
        match self {
            TensorData::Int32(v) => v.iter().map(|&e| e as i64).collect(),
            TensorData::Int64(v) => v.clone(),
            other => panic!("Expected integer data, got {other:?}"),
        }
    }
}

/// The type of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Float32(f32),
    Float32s(Vec<f32>),
    Int64(i64),
    Int64s(Vec<i64>),
    String(String),
}

pub type Attributes = HashMap<String, AttributeValue>;

impl AttributeValue {
    pub fn into_f32(self) -> f32 {
        if let AttributeValue::Float32(elem) = self {
            elem
        } else {
            panic!("Expected Float32, got {self:?}");
        }
    }

    pub fn into_f32s(self) -> Vec<f32> {
        if let AttributeValue::Float32s(elem) = self {
            elem
        } else {
            panic!("Expected Float32s, got {self:?}");
        }
    }

    pub fn into_i64(self) -> i64 {
        if let AttributeValue::Int64(elem) = self {
            elem
        } else {
            panic!("Expected Int64, got {self:?}");
        }
    }

    pub fn into_i64s(self) -> Vec<i64> {
        if let AttributeValue::Int64s(elem) = self {
            elem
        } else {
            panic!("Expected Int64s, got {self:?}");
        }
    }

    pub fn into_string(self) -> String {
        if let AttributeValue::String(elem) = self {
            elem
        } else {
            panic!("Expected String, got {self:?}");
        }
    }
}

/// The operator spellings this crate lowers. Both route to the same resize
/// lowering; Upsample is the deprecated pre-opset-10 form.
#[derive(Debug, Hash, Eq, PartialEq, EnumString, Clone, Copy, Display)]
pub enum NodeType {
    Resize,
    Upsample,
}

/// A declarative operator node: spelling, display name, attribute map and the
/// operands it reads from the surrounding instruction graph.
#[derive(Debug, Clone, new)]
pub struct Node {
    pub node_type: NodeType,
    pub name: String,
    pub attrs: Attributes,
    pub inputs: Vec<InstructionRef>,
}

/// Truncate the vector display for debug display
fn trunc<T: fmt::Display>(v: &[T]) -> String {
    const MAX_LEN: usize = 5;
    let mut s = String::new();
    s.push('[');
    for (i, item) in v.iter().enumerate() {
        if i > 0 {
            s.push_str(", ");
        }
        s.push_str(&format!("{item}"));
        if i > MAX_LEN {
            s.push_str(", ...");
            break;
        }
    }
    s.push(']');
    s
}

/// Shorten the tensor data for debug display
impl fmt::Debug for TensorData {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TensorData::Float16(v) => write!(f, "Float16({})", trunc(v)),
            TensorData::Float32(v) => write!(f, "Float32({})", trunc(v)),
            TensorData::Float64(v) => write!(f, "Float64({})", trunc(v)),
            TensorData::Int32(v) => write!(f, "Int32({})", trunc(v)),
            TensorData::Int64(v) => write!(f, "Int64({})", trunc(v)),
        }
    }
}
