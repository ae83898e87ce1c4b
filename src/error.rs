use thiserror::Error;

/// Enum with all errors in this crate.
///
/// Only construction can fail. Points outside of the indexed domain are reported through
/// `Option` or count results on the individual operations instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuadTreeError {
    /// The domain width was zero or not a power of two.
    #[error("Width must be a non-zero power of two, got {0}.")]
    InvalidWidth(u64),

    /// The maximum number of tree levels was outside of `1..=32`.
    #[error("Maximum levels must be between 1 and 32, got {0}.")]
    InvalidMaxLevels(u32),
}

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, QuadTreeError>;
