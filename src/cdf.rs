//! Adaptive cumulative distribution function (CDF) tables.
//!
//! A CDF table for an alphabet of `N` symbols is a `u16` buffer with `N + 1` entries.
//! The first `N` entries hold the probabilities in inverted form: entry `i` is
//! `32768` minus the probability that the symbol is at most `i`, scaled by `32768`.
//! The entries are therefore non-increasing, below `32768`, and entry `N - 1` is always zero.
//! The last entry counts how often the table was adapted and paces the adaptation.
//!
//! Boolean tables use the same layout with `N == 2`, i.e. `[probability, 0, counter]`.

use crate::{Error, Result};

/// The probability of one, i.e. the value all probabilities are scaled to.
pub const CDF_MAX_PROBABILITY: u16 = 32768;
/// The largest alphabet a CDF table may describe.
pub const MAX_SYMBOL_COUNT: usize = 16;
/// The observation counter saturates at this value.
pub const MAX_COUNTER: u16 = 32;

/// Adapts the `cdf` of an alphabet with `symbol_count` symbols towards `symbol`.
///
/// The rate shrinks while the observation counter grows, so a young table adapts
/// quickly and settles later. This has to match the encoder bit by bit.
#[inline(always)]
pub fn update_cdf(cdf: &mut [u16], symbol_count: usize, symbol: usize) {
    debug_assert!(symbol_count >= 2 && symbol < symbol_count);
    let count = cdf[symbol_count];
    // The counter never exceeds 32, so (count >> 4) is 0, 1 or 2.
    let rate = 4 + (count >> 4) + u16::from(symbol_count > 3);

    for (i, probability) in cdf[..symbol_count - 1].iter_mut().enumerate() {
        if i < symbol {
            *probability += (CDF_MAX_PROBABILITY - *probability) >> rate;
        } else {
            *probability -= *probability >> rate;
        }
    }

    cdf[symbol_count] += u16::from(count < MAX_COUNTER);
}

/// Clears the observation counter of the `cdf`.
///
/// Adapted tables are carried over into the next frame or tile with a fresh
/// counter, so that they adapt quickly again.
pub fn reset_counter(cdf: &mut [u16], symbol_count: usize) {
    cdf[symbol_count] = 0;
}

/// Checks that `cdf` is a well formed table for an alphabet of `symbol_count` symbols.
///
/// The decoder itself only debug-asserts the layout, since it sits on the hot path.
/// Tables that come from outside of the codec should be checked once with this.
pub fn validate_cdf(cdf: &[u16], symbol_count: usize) -> Result<()> {
    if !(2..=MAX_SYMBOL_COUNT).contains(&symbol_count) {
        return Err(Error::InvalidSymbolCount(symbol_count));
    }
    if cdf.len() < symbol_count + 1 {
        return Err(Error::TableTooShort {
            len: cdf.len(),
            expected: symbol_count + 1,
        });
    }

    let probabilities = &cdf[..symbol_count];
    for (index, &value) in probabilities.iter().enumerate() {
        // A symbol with a probability of zero would leave an empty interval.
        if value >= CDF_MAX_PROBABILITY {
            return Err(Error::ProbabilityOutOfRange { index, value });
        }
        if index > 0 && value > probabilities[index - 1] {
            return Err(Error::NotMonotonic { index });
        }
    }
    if probabilities[symbol_count - 1] != 0 {
        return Err(Error::MissingTerminator {
            index: symbol_count - 1,
        });
    }

    let counter = cdf[symbol_count];
    if counter > MAX_COUNTER {
        return Err(Error::CounterOutOfRange(counter));
    }

    Ok(())
}
