//! Coordinate-space mapping between output sample positions and the input
//! grid.
//!
//! Each transform mode is one closed-form expression mapping an output axis
//! index back to a continuous input coordinate; the discretization policies
//! then round that coordinate to a readable input index. Both families come
//! from the ONNX Resize operator definition.

use strum::{Display, EnumString};

/// Policy mapping an output-axis index to a continuous input-space coordinate.
///
/// `TfCropAndResize` is recognized so the resolver can reject it by name; it
/// has no mapping function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum CoordTransformMode {
    #[strum(serialize = "half_pixel")]
    HalfPixel,
    #[strum(serialize = "pytorch_half_pixel")]
    PytorchHalfPixel,
    #[strum(serialize = "align_corners")]
    AlignCorners,
    #[strum(serialize = "asymmetric")]
    Asymmetric,
    #[strum(serialize = "tf_half_pixel_for_nn")]
    TfHalfPixelForNn,
    #[strum(serialize = "tf_crop_and_resize")]
    TfCropAndResize,
}

impl CoordTransformMode {
    /// Continuous input coordinate of output index `idx` along one axis.
    pub fn map(&self, in_len: usize, out_len: usize, idx: usize, scale: f64) -> f64 {
        let idx = idx as f64;
        match self {
            CoordTransformMode::HalfPixel => (idx + 0.5) / scale - 0.5,
            CoordTransformMode::PytorchHalfPixel => {
                if out_len > 1 {
                    (idx + 0.5) / scale - 0.5
                } else {
                    0.0
                }
            }
            CoordTransformMode::AlignCorners => {
                if out_len == 1 {
                    0.0
                } else {
                    idx * (in_len as f64 - 1.0) / (out_len as f64 - 1.0)
                }
            }
            CoordTransformMode::Asymmetric => idx / scale,
            CoordTransformMode::TfHalfPixelForNn => (idx + 0.5) / scale,
            CoordTransformMode::TfCropAndResize => {
                unreachable!("tf_crop_and_resize is rejected during attribute resolution")
            }
        }
    }
}

/// Policy rounding a continuous coordinate to a discrete input index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum NearestMode {
    #[strum(serialize = "round_prefer_floor")]
    RoundPreferFloor,
    #[strum(serialize = "round_prefer_ceil")]
    RoundPreferCeil,
    #[strum(serialize = "floor")]
    Floor,
    #[strum(serialize = "ceil")]
    Ceil,
}

impl NearestMode {
    /// Discrete input index for `coord`, clamped into `[0, in_len - 1]`.
    pub fn index(&self, in_len: usize, coord: f64) -> usize {
        let rounded = match self {
            // on an exact .5 tie, ceil(coord - 0.5) lands on the floor side
            NearestMode::RoundPreferFloor => (coord - 0.5).ceil(),
            // f64::round ties away from zero, i.e. upward for grid coordinates
            NearestMode::RoundPreferCeil => coord.round(),
            NearestMode::Floor => coord.floor(),
            NearestMode::Ceil => coord.ceil(),
        };
        rounded.clamp(0.0, in_len as f64 - 1.0) as usize
    }
}
