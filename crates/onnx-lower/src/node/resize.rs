//! # Resize / Upsample
//!
//! Lowers the Resize operator (and its deprecated Upsample spelling) to a
//! subgraph of primitive instructions.
//!
//! **ONNX Spec**: <https://onnx.ai/onnx/operators/onnx__Resize.html>
//!
//! When the data shape and the scale/size information are all known at
//! compile time, every output element's source position can be computed here
//! and the operator collapses to a gather over the flattened input (nearest
//! mode), or a gather of all `2^N` interpolation corners followed by one
//! slice/arithmetic blend step per axis (linear mode). Otherwise a single
//! dynamic `resize` instruction is emitted and the execution engine resolves
//! the geometry at run time. Linear mode has no dynamic fallback.

use strum::{Display, EnumString};

use crate::coord::{CoordTransformMode, NearestMode};
use crate::error::LowerError;
use crate::graph::{InstructionGraph, InstructionRef, Op};
use crate::ir::{Attributes, ElementType, Node, TensorData};
use crate::shape::Shape;

/// Interpolation policy selected by the `mode` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum InterpolationMode {
    #[strum(serialize = "nearest")]
    Nearest,
    #[strum(serialize = "linear")]
    Linear,
}

/// Validated resize attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeConfig {
    pub mode: InterpolationMode,
    pub coord_mode: CoordTransformMode,
    pub nearest_mode: NearestMode,
}

impl ResizeConfig {
    /// Normalize the attribute map, rejecting unsupported combinations.
    pub fn from_attrs(attrs: &Attributes, op_name: &str) -> Result<Self, LowerError> {
        let coord_mode = match attrs.get("coordinate_transformation_mode") {
            None => CoordTransformMode::HalfPixel,
            Some(value) => {
                let raw = value.clone().into_string();
                let mode = raw.parse::<CoordTransformMode>().map_err(|_| {
                    LowerError::unsupported(
                        op_name,
                        format!("unknown coordinate_transformation_mode \"{raw}\""),
                    )
                })?;
                if mode == CoordTransformMode::TfCropAndResize {
                    return Err(LowerError::unsupported(
                        op_name,
                        "\"tf_crop_and_resize\" mode is not supported",
                    ));
                }
                mode
            }
        };

        let mode = match attrs.get("mode") {
            None => InterpolationMode::Nearest,
            Some(value) => value.clone().into_string().parse().map_err(|_| {
                LowerError::unsupported(op_name, "only nearest and linear modes are supported")
            })?,
        };

        let nearest_mode = match attrs.get("nearest_mode") {
            None => NearestMode::RoundPreferFloor,
            Some(value) => {
                let raw = value.clone().into_string();
                raw.parse().map_err(|_| {
                    LowerError::unsupported(op_name, format!("unknown nearest_mode \"{raw}\""))
                })?
            }
        };

        if let Some(value) = attrs.get("exclude_outside") {
            if value.clone().into_i64() == 1 {
                return Err(LowerError::unsupported(
                    op_name,
                    "exclude_outside 1 is not supported",
                ));
            }
        }

        Ok(Self {
            mode,
            coord_mode,
            nearest_mode,
        })
    }
}

/// Per-axis scales from the deprecated Upsample-v7 `scales` attribute.
fn attr_scales(attrs: &Attributes) -> Vec<f64> {
    attrs
        .get("scales")
        .map(|value| {
            value
                .clone()
                .into_f32s()
                .iter()
                .map(|&s| s as f64)
                .collect()
        })
        .unwrap_or_default()
}

/// Terminal outcome of the operand scan.
enum OperandScan {
    /// Shape information is readable at compile time. `out_lens` stays empty
    /// when only scale factors were found.
    Constant {
        scales: Vec<f64>,
        out_lens: Vec<usize>,
        arg: InstructionRef,
    },
    /// The first qualifying operand has a runtime dependency.
    Runtime { arg: InstructionRef },
}

/// Hunt through the operand list for either scale factors or explicit output
/// sizes, classifying each candidate by element type.
fn scan_operands(
    graph: &InstructionGraph,
    inputs: &[InstructionRef],
    in_lens: &[usize],
    op_name: &str,
) -> Result<OperandScan, LowerError> {
    for &arg in inputs {
        if arg == inputs[0] || matches!(graph.op(arg), Op::Undefined) {
            continue;
        }

        // skip any empty input (some of the operands are optional)
        let lens = graph.shape_of(arg).lens().to_vec();
        if lens.is_empty() {
            continue;
        }

        if graph.shape_of(arg).elem_type() == ElementType::Int64 {
            // this operand is the explicit output sizes
            let Some(data) = graph.try_eval(arg) else {
                return Ok(OperandScan::Runtime { arg });
            };
            let out_lens: Vec<usize> = data.to_i64s().iter().map(|&l| l as usize).collect();
            if out_lens.len() != in_lens.len() {
                return Err(LowerError::RankMismatch {
                    op_name: op_name.to_string(),
                    expected: in_lens.len(),
                    actual: out_lens.len(),
                });
            }
            let scales = in_lens
                .iter()
                .zip(&out_lens)
                .map(|(&i, &o)| o as f64 / i as f64)
                .collect();
            return Ok(OperandScan::Constant {
                scales,
                out_lens,
                arg,
            });
        }

        // this operand is the scale input; anything that does not look like
        // one ends the scan and the rank check reports it
        let mut scales = Vec::new();
        if lens[0] == in_lens.len() {
            let Some(data) = graph.try_eval(arg) else {
                return Ok(OperandScan::Runtime { arg });
            };
            scales = data.to_f64s();
        }
        return Ok(OperandScan::Constant {
            scales,
            out_lens: Vec::new(),
            arg,
        });
    }

    Err(LowerError::MissingShapeInfo {
        op_name: op_name.to_string(),
    })
}

/// Clamped floor/ceil corner indices for one axis, one entry per output
/// element.
#[derive(Debug, Clone)]
struct AxisCorners {
    floor: Vec<usize>,
    ceil: Vec<usize>,
}

/// Fail unless `2^rank` corner identifiers fit the machine index type.
fn ensure_corner_rank(rank: usize, op_name: &str) -> Result<(), LowerError> {
    if rank >= usize::BITS as usize {
        return Err(LowerError::DimensionOverflow {
            op_name: op_name.to_string(),
            rank,
            bits: usize::BITS,
        });
    }
    Ok(())
}

/// Flattened corner-index table for multilinear interpolation.
///
/// Corner identifiers run `0 .. 2^N` in ascending order; bit `b` of an
/// identifier selects the floor (0) or ceil (1) index on axis `b`. Within
/// each corner the output elements keep their iteration order, so the table
/// concatenates one full output's worth of flat input offsets per corner.
fn corner_table(
    corners: &[AxisCorners],
    in_shape: &Shape,
    out_elements: usize,
    op_name: &str,
) -> Result<Vec<i32>, LowerError> {
    let n_bits = corners.len();
    ensure_corner_rank(n_bits, op_name)?;

    let mut table = Vec::with_capacity((1usize << n_bits) * out_elements);
    let mut idx = vec![0usize; n_bits];
    for corner in 0..(1usize << n_bits) {
        for element in 0..out_elements {
            for (axis, pair) in corners.iter().enumerate() {
                idx[axis] = if (corner >> axis) & 1 == 1 {
                    pair.ceil[element]
                } else {
                    pair.floor[element]
                };
            }
            table.push(in_shape.index(&idx) as i32);
        }
    }

    Ok(table)
}

/// Lower one Resize/Upsample node, returning the instruction holding its
/// result.
pub fn lower_resize(
    graph: &mut InstructionGraph,
    node: &Node,
) -> Result<InstructionRef, LowerError> {
    let op_name = node.node_type.to_string();
    let config = ResizeConfig::from_attrs(&node.attrs, &op_name)?;

    let data = *node
        .inputs
        .first()
        .expect("resize: data operand must be present");
    let in_shape = graph.shape_of(data).to_static(1);
    let in_lens = in_shape.lens().to_vec();

    let mut scales = attr_scales(&node.attrs);
    let mut out_lens: Vec<usize> = Vec::new();
    let mut scales_sizes_arg = data;

    // whether the output geometry comes from literals only, with no
    // dependency anywhere in the graph on runtime inputs
    let mut constant_scales = !scales.is_empty();
    if constant_scales {
        log::warn!(
            "{}: scales taken from the deprecated attribute form",
            node.name
        );
    } else {
        match scan_operands(graph, &node.inputs, &in_lens, &op_name)? {
            OperandScan::Runtime { arg } => scales_sizes_arg = arg,
            OperandScan::Constant {
                scales: found,
                out_lens: lens,
                arg,
            } => {
                constant_scales = true;
                scales = found;
                out_lens = lens;
                scales_sizes_arg = arg;
            }
        }
    }

    if constant_scales {
        if scales.len() != in_lens.len() {
            return Err(LowerError::RankMismatch {
                op_name,
                expected: in_lens.len(),
                actual: scales.len(),
            });
        }
        if out_lens.is_empty() {
            out_lens = in_lens
                .iter()
                .zip(&scales)
                .map(|(&l, &s)| (l as f64 * s) as usize)
                .collect();
        }
    }

    match config.mode {
        InterpolationMode::Nearest => {
            if graph.shape_of(data).is_dynamic() || !constant_scales {
                log::debug!("{}: emitting dynamic resize", node.name);
                Ok(graph.add_instruction(
                    Op::Resize {
                        nearest_mode: config.nearest_mode,
                        coord_mode: config.coord_mode,
                    },
                    vec![data, scales_sizes_arg],
                ))
            } else {
                // with static shapes and literal scales every index is known
                // now, and a gather outperforms the generic instruction
                log::debug!("{}: emitting compile-time gather", node.name);
                Ok(emit_nearest_gather(
                    graph, &config, &in_shape, &out_lens, &scales, data,
                ))
            }
        }
        InterpolationMode::Linear => {
            if !constant_scales {
                return Err(LowerError::unsupported(
                    &op_name,
                    "linear mode is not supported for non-constant scale or size inputs",
                ));
            }
            emit_linear(graph, &config, &in_shape, &out_lens, &scales, data, &op_name)
        }
    }
}

/// Nearest mode over a fully static geometry: one gather of the flattened
/// input through an embedded index table shaped like the output.
fn emit_nearest_gather(
    graph: &mut InstructionGraph,
    config: &ResizeConfig,
    in_shape: &Shape,
    out_lens: &[usize],
    scales: &[f64],
    data: InstructionRef,
) -> InstructionRef {
    let in_lens = in_shape.lens();
    let out_shape = Shape::new(in_shape.elem_type(), out_lens.to_vec());

    let mut ind = vec![0i32; out_shape.elements()];
    let mut in_idx = vec![0usize; in_lens.len()];
    out_shape.for_each(|out_idx_v, out_idx| {
        for (axis, &in_len) in in_lens.iter().enumerate() {
            let coord = config
                .coord_mode
                .map(in_len, out_lens[axis], out_idx_v[axis], scales[axis]);
            in_idx[axis] = config.nearest_mode.index(in_len, coord);
        }
        ind[out_idx] = in_shape.index(&in_idx) as i32;
    });

    // reshape input to one dimension
    let rsp = graph.add_instruction(
        Op::Reshape {
            dims: vec![in_shape.elements() as i64],
        },
        vec![data],
    );

    // the index table is output-shaped, so the gather restores the rank
    let ind_shape = Shape::new(ElementType::Int32, out_lens.to_vec());
    let ins_ind = graph.add_literal(ind_shape, TensorData::Int32(ind));
    graph.add_instruction(Op::Gather { axis: 0 }, vec![rsp, ins_ind])
}

/// Linear mode over a fully static geometry: gather all `2^N` interpolation
/// corners at once, then blend one axis per step until one group remains.
fn emit_linear(
    graph: &mut InstructionGraph,
    config: &ResizeConfig,
    in_shape: &Shape,
    out_lens: &[usize],
    scales: &[f64],
    data: InstructionRef,
    op_name: &str,
) -> Result<InstructionRef, LowerError> {
    let in_lens = in_shape.lens();
    let out_shape = Shape::new(in_shape.elem_type(), out_lens.to_vec());
    let out_elements = out_shape.elements();
    let n_dim = out_lens.len();

    let mut corners = vec![
        AxisCorners {
            floor: vec![0; out_elements],
            ceil: vec![0; out_elements],
        };
        n_dim
    ];
    let mut weights = vec![vec![0f32; out_elements]; n_dim];

    out_shape.for_each(|out_idx_v, out_idx| {
        for (axis, &in_len) in in_lens.iter().enumerate() {
            let coord = config
                .coord_mode
                .map(in_len, out_lens[axis], out_idx_v[axis], scales[axis]);
            let floor = NearestMode::Floor.index(in_len, coord);
            corners[axis].floor[out_idx] = floor;
            corners[axis].ceil[out_idx] = NearestMode::Ceil.index(in_len, coord);
            // fractional weight relative to the clamped floor corner; outside
            // the grid this extrapolates rather than saturating
            weights[axis][out_idx] = (coord - floor as f64) as f32;
        }
    });

    let ind = corner_table(&corners, in_shape, out_elements, op_name)?;

    // reshape input to one dimension and fetch every corner of every output
    // element in a single gather, corners stacked along axis 0
    let rsp = graph.add_instruction(
        Op::Reshape {
            dims: vec![in_shape.elements() as i64],
        },
        vec![data],
    );
    let mut ind_lens = out_lens.to_vec();
    ind_lens[0] *= 1usize << n_dim;
    let ins_ind = graph.add_literal(
        Shape::new(ElementType::Int32, ind_lens),
        TensorData::Int32(ind),
    );
    let mut blended = graph.add_instruction(Op::Gather { axis: 0 }, vec![rsp, ins_ind]);

    // one blend step per axis, consuming the stacked corner axis most
    // significant bit first; each step halves the corner multiplicity
    let mut dim_lens = out_lens.to_vec();
    dim_lens[0] *= 1usize << (n_dim - 1);
    for step in 0..n_dim {
        let axis_weights = &weights[n_dim - step - 1];
        let copies = dim_lens[0] / out_lens[0];
        let mut delta = Vec::with_capacity(axis_weights.len() * copies);
        for _ in 0..copies {
            delta.extend_from_slice(axis_weights);
        }
        let ins_delta = graph.add_literal(
            Shape::new(ElementType::Float32, dim_lens.clone()),
            TensorData::Float32(delta),
        );

        let stride = dim_lens[0] as i64;
        let low = graph.add_instruction(
            Op::Slice {
                axes: vec![0],
                starts: vec![0],
                ends: vec![stride],
            },
            vec![blended],
        );
        let high = graph.add_instruction(
            Op::Slice {
                axes: vec![0],
                starts: vec![stride],
                ends: vec![2 * stride],
            },
            vec![blended],
        );
        let diff = graph.add_instruction(Op::Sub, vec![high, low]);
        let scaled = graph.add_instruction(Op::Mul, vec![diff, ins_delta]);
        blended = graph.add_instruction(Op::Add, vec![scaled, low]);
        dim_lens[0] /= 2;
    }

    Ok(blended)
}
