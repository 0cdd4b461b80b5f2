//! Custom errors.

use thiserror::Error;

/// Result type of the helper codes and CDF validation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the helper codes and the CDF validation.
///
/// The symbol and bit reads of the entropy decoder never fail. Reading past the end
/// of the input decodes zero bits, so a corrupt stream shows up as wrong values that
/// a higher layer has to reject.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sub-exponential code would need a literal that is too wide.
    #[error("sub-exponential code needs a literal of {0} bits, at most 31 are supported")]
    SubexpTooWide(u32),
    /// The reference of a recentered code lies outside of its interval.
    #[error("reference {reference} is outside of the interval [{low}, {high})")]
    ReferenceOutOfRange {
        /// Inclusive lower bound.
        low: i64,
        /// Exclusive upper bound.
        high: i64,
        /// The given reference.
        reference: i64,
    },
    /// The prefix of a Golomb code is too long.
    #[error("golomb prefix is longer than {0} bits")]
    GolombTooLong(u32),
    /// The symbol count of a CDF is not supported.
    #[error("symbol count {0} is outside of 2..=16")]
    InvalidSymbolCount(usize),
    /// The CDF table is shorter than its symbol count requires.
    #[error("cdf table holds {len} entries, but {expected} are required")]
    TableTooShort {
        /// Length of the given table.
        len: usize,
        /// Required length.
        expected: usize,
    },
    /// The last probability entry of a CDF is not zero.
    #[error("cdf entry {index} must be zero")]
    MissingTerminator {
        /// Index of the entry.
        index: usize,
    },
    /// The probability entries of a CDF are increasing.
    #[error("cdf entry {index} is larger than its predecessor")]
    NotMonotonic {
        /// Index of the entry.
        index: usize,
    },
    /// A probability entry is not below the maximal probability.
    #[error("cdf entry {index} has the value {value}, at most 32767 is allowed")]
    ProbabilityOutOfRange {
        /// Index of the entry.
        index: usize,
        /// The offending value.
        value: u16,
    },
    /// The observation counter of a CDF is above its saturation point.
    #[error("cdf counter {0} is above 32")]
    CounterOutOfRange(u16),
}
