//! Errors raised while building an option set or drawing from it.

use thiserror::Error;

/// Why an option set could not be built or drawn from.
///
/// `index` fields are zero-based positions in the input sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// A weight is not a valid number.
    #[error("weight {raw:?} at index {index} is not a number")]
    Parse {
        /// Position of the offending entry.
        index: usize,
        /// Weight text as given.
        raw: String,
    },

    /// A weight parsed but is negative or not finite.
    #[error("weight {raw:?} at index {index} must be a finite, non-negative number")]
    InvalidWeight {
        /// Position of the offending entry.
        index: usize,
        /// Weight text as given.
        raw: String,
    },

    /// Adding this weight pushes the total past the largest finite number.
    #[error("weights up to index {index} add up to more than the largest representable total")]
    TotalOverflow {
        /// Position of the entry that overflowed the total.
        index: usize,
    },

    /// A positive weight too small to raise the running total, so the
    /// option could never be drawn.
    #[error("weight at index {index} is too small next to the weights before it to ever be drawn")]
    NegligibleWeight {
        /// Position of the offending entry.
        index: usize,
    },

    /// An option label is empty.
    #[error("option at index {index} has an empty label")]
    EmptyLabel {
        /// Position of the offending entry.
        index: usize,
    },

    /// Label and weight lists differ in length.
    #[error("{labels} options were given with {weights} weights")]
    MismatchedLength {
        /// Number of labels.
        labels: usize,
        /// Number of weights.
        weights: usize,
    },

    /// No options at all.
    #[error("no options defined")]
    EmptyInput,

    /// Every option has zero weight.
    #[error("total weight is zero, no option can be selected")]
    NoSelectableOption,
}

impl SelectionError {
    /// Position of the offending entry, for errors tied to one entry.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        match self {
            Self::Parse { index, .. }
            | Self::InvalidWeight { index, .. }
            | Self::TotalOverflow { index }
            | Self::NegligibleWeight { index }
            | Self::EmptyLabel { index } => Some(*index),
            Self::MismatchedLength { .. } | Self::EmptyInput | Self::NoSelectableOption => None,
        }
    }
}

/// Result type for selection operations.
pub type SelectionResult<T> = std::result::Result<T, SelectionError>;
