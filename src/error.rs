use thiserror::Error;

/// Errors raised by the clustering containers and algorithms.
///
/// Every error is returned before any state is touched, so a failed call
/// leaves the receiver exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KMeansError {
    /// A scalar argument is out of its allowed domain (zero dimension, bad `k`, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A vector does not have the dimensionality of the dataset it is used with.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensionality of the dataset
        expected: usize,
        /// Length of the offending vector
        actual: usize,
    },

    /// A point index does not address a point of the dataset.
    #[error("Index {index} out of range for dataset with {len} points")]
    IndexOutOfRange {
        /// The offending index
        index: usize,
        /// Amount of points in the dataset
        len: usize,
    },
}

impl KMeansError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn check_dims(expected: usize, actual: usize) -> Result<()> {
        if expected != actual {
            return Err(Self::DimensionMismatch { expected, actual });
        }
        Ok(())
    }

    pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
        if index >= len {
            return Err(Self::IndexOutOfRange { index, len });
        }
        Ok(())
    }
}

pub type Result<T> = std::result::Result<T, KMeansError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            KMeansError::DimensionMismatch { expected: 3, actual: 2 }.to_string(),
            "Dimension mismatch: expected 3, got 2"
        );
        assert_eq!(
            KMeansError::IndexOutOfRange { index: 4, len: 4 }.to_string(),
            "Index 4 out of range for dataset with 4 points"
        );
        assert_eq!(KMeansError::invalid("k must be > 0").to_string(), "Invalid argument: k must be > 0");
    }

    #[test]
    fn checks() {
        assert!(KMeansError::check_dims(2, 2).is_ok());
        assert_eq!(
            KMeansError::check_dims(2, 3),
            Err(KMeansError::DimensionMismatch { expected: 2, actual: 3 })
        );
        assert!(KMeansError::check_index(0, 1).is_ok());
        assert_eq!(
            KMeansError::check_index(1, 1),
            Err(KMeansError::IndexOutOfRange { index: 1, len: 1 })
        );
    }
}
