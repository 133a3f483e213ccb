use thiserror::Error;

/// Non-recoverable lowering failures.
///
/// Every variant names the operator it came from; lowering of that node stops
/// immediately and the caller surfaces the failure to whoever is converting
/// the model.
#[derive(Debug, Error)]
pub enum LowerError {
    /// An explicitly disallowed attribute combination.
    #[error("{op_name}: {reason}")]
    UnsupportedMode { op_name: String, reason: String },

    /// A scale or explicit-size operand whose rank differs from the input rank.
    #[error("{op_name}: rank {actual} does not match the input rank {expected}")]
    RankMismatch {
        op_name: String,
        expected: usize,
        actual: usize,
    },

    /// Neither a scales attribute nor a qualifying scales/sizes operand.
    #[error("{op_name}: no scales attribute and no scales or sizes input provided")]
    MissingShapeInfo { op_name: String },

    /// Rank too large to enumerate interpolation corners as machine-word bits.
    #[error("{op_name}: {rank} dimensions exceed the {bits}-bit corner enumeration width")]
    DimensionOverflow {
        op_name: String,
        rank: usize,
        bits: u32,
    },
}

impl LowerError {
    /// Shorthand used by the attribute resolvers.
    pub(crate) fn unsupported(op_name: &str, reason: impl Into<String>) -> Self {
        LowerError::UnsupportedMode {
            op_name: op_name.to_string(),
            reason: reason.into(),
        }
    }
}
