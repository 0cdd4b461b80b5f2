//! Implements the matching symbol encoder, used to produce test streams.
use crate::cdf::{update_cdf, CDF_MAX_PROBABILITY};
use crate::entropy_decoder::{CDF_PRECISION, MIN_PROBABILITY_PER_SYMBOL};
use crate::math::Log;

/// The symbol encoder.
///
/// Writes the interval of every symbol from the bottom of the range, while the
/// decoder measures it from the top. Bytes are buffered together with their carry
/// and resolved in `done()`.
pub(crate) struct SymbolEncoder {
    /// Output bytes with their pending carry.
    precarry: Vec<u16>,
    /// The low end of the current range.
    low: u32,
    /// The number of values in the current range.
    rng: u16,
    /// The number of bits of data in the current value.
    cnt: i16,
    /// Adapts the CDF tables like the decoder.
    allow_update_cdf: bool,
}

impl SymbolEncoder {
    /// Creates a new encoder.
    pub(crate) fn new(allow_update_cdf: bool) -> Self {
        Self {
            precarry: Vec::new(),
            low: 0,
            rng: 0x8000,
            // Crosses zero after one byte and one carry bit have been accumulated.
            cnt: -9,
            allow_update_cdf,
        }
    }

    /// Scales a probability of the CDF against the current range.
    fn scale(&self, probability: u16, remaining: usize) -> u32 {
        (((u32::from(self.rng) >> 8) * (u32::from(probability) >> CDF_PRECISION)) >> 1)
            + MIN_PROBABILITY_PER_SYMBOL * remaining as u32
    }

    /// Encodes `symbol` with the CDF of an alphabet with `symbol_count` symbols.
    pub(crate) fn encode_symbol(&mut self, symbol: usize, cdf: &mut [u16], symbol_count: usize) {
        assert_eq!(cdf[symbol_count - 1], 0);
        let last = symbol_count - 1;
        let r = u32::from(self.rng);
        let u = if symbol > 0 {
            self.scale(cdf[symbol - 1], last - (symbol - 1))
        } else {
            r
        };
        let v = self.scale(cdf[symbol], last - symbol);
        let low = self.low + (r - u);
        self.normalize(low, (u - v) as u16);

        if self.allow_update_cdf {
            update_cdf(cdf, symbol_count, symbol);
        }
    }

    /// Encodes a boolean with a boolean CDF table.
    pub(crate) fn encode_bool(&mut self, value: bool, cdf: &mut [u16; 3]) {
        self.encode_symbol(usize::from(value), cdf, 2);
    }

    /// Encodes a boolean with a fixed probability.
    pub(crate) fn encode_bool_without_cdf_update(&mut self, value: bool, probability: u16) {
        let mut cdf = [probability, 0, 0];
        let allow_update_cdf = self.allow_update_cdf;
        self.allow_update_cdf = false;
        self.encode_symbol(usize::from(value), &mut cdf, 2);
        self.allow_update_cdf = allow_update_cdf;
    }

    /// Encodes an equiprobable bit.
    pub(crate) fn encode_bit(&mut self, bit: u32) {
        self.encode_bool_without_cdf_update(bit != 0, CDF_MAX_PROBABILITY >> 1);
    }

    /// Encodes `bits` bits of `value`, most significant bit first.
    pub(crate) fn encode_literal(&mut self, value: u32, bits: u32) {
        (0..bits)
            .rev()
            .for_each(|i| self.encode_bit((value >> i) & 1));
    }

    /// Encodes `value` with an Exp-Golomb code.
    pub(crate) fn encode_golomb(&mut self, value: u32) {
        let x = value + 1;
        let length = x.significant_bits();
        (1..length).for_each(|_| self.encode_bit(0));
        self.encode_literal(x, length);
    }

    /// Encodes `value` in `0..n` with a quasi-uniform code.
    pub(crate) fn encode_uniform(&mut self, n: u32, value: u32) {
        if n <= 1 {
            return;
        }
        let w = n.floor_log2() + 1;
        let m = (1 << w) - n;
        if value < m {
            self.encode_literal(value, w - 1);
        } else {
            self.encode_literal((value + m) >> 1, w - 1);
            self.encode_bit((value + m) & 1);
        }
    }

    /// Encodes `value` in `0..num_symbols` with a finite sub-exponential code.
    pub(crate) fn encode_subexp(&mut self, num_symbols: u32, control: u32, value: u32) {
        let mut i = 0;
        let mut mk = 0;
        loop {
            let b = if i != 0 { control + i - 1 } else { control };
            let a = 1 << b;
            if num_symbols <= mk + 3 * a {
                self.encode_uniform(num_symbols - mk, value - mk);
                return;
            }
            if value >= mk + a {
                self.encode_bit(1);
                i += 1;
                mk += a;
            } else {
                self.encode_bit(0);
                self.encode_literal(value - mk, b);
                return;
            }
        }
    }

    /// Encodes `value` in `low..high` recentered around `reference`.
    pub(crate) fn encode_signed_subexp_with_reference(
        &mut self,
        low: i32,
        high: i32,
        reference: i32,
        control: u32,
        value: i32,
    ) {
        let mx = (high - low) as u32;
        let r = (reference - low) as u32;
        let v = (value - low) as u32;
        let recentered = if (r << 1) <= mx {
            recenter(r, v)
        } else {
            recenter(mx - 1 - r, mx - 1 - v)
        };
        self.encode_subexp(mx, control, recentered);
    }

    /// Takes updated low and range values, renormalizes them so that
    /// 32768 <= `rng` < 65536 (flushing bytes from low to the pre-carry buffer if
    /// necessary), and stores them back in the encoder context.
    fn normalize(&mut self, low0: u32, rng: u16) {
        let mut low = low0;
        let mut c = self.cnt;
        let d = 16 - rng.significant_bits() as i16;
        let mut s = c + d;

        if s >= 0 {
            c += 16;
            let mut m = (1_u32 << c) - 1;
            if s >= 8 {
                self.precarry.push((low >> c) as u16);
                low &= m;
                c -= 8;
                m >>= 8;
            }
            self.precarry.push((low >> c) as u16);
            s = c + d - 24;
            low &= m;
        }
        self.low = low << d;
        self.rng = rng << d;
        self.cnt = s;
    }

    /// Flushes the minimum number of bits that decode correctly regardless of the
    /// bits that follow, and returns the final stream.
    pub(crate) fn done(mut self) -> Vec<u8> {
        let l = self.low;
        let r = u32::from(self.rng);
        let mut c = i32::from(self.cnt);
        let mut s: i32 = 9;
        let mut m: u32 = 0x7FFF;
        let mut e = (l + m) & !m;

        while (e | m) >= l + r {
            s += 1;
            m >>= 1;
            e = (l + m) & !m;
        }
        s += c;

        if s > 0 {
            let mut n = (1_u32 << (c + 16)) - 1;
            loop {
                self.precarry.push((e >> (c + 16)) as u16);
                e &= n;
                s -= 8;
                c -= 8;
                n >>= 8;

                if s <= 0 {
                    break;
                }
            }
        }

        let mut carry = 0_u16;
        let mut offs = self.precarry.len();
        let mut out = vec![0_u8; offs];
        while offs > 0 {
            offs -= 1;
            carry += self.precarry[offs];
            out[offs] = carry as u8;
            carry >>= 8;
        }

        out
    }
}

/// Recenters `v` around the reference `r`, the inverse of `inverse_recenter()`.
fn recenter(r: u32, v: u32) -> u32 {
    if v > (r << 1) {
        v
    } else if v >= r {
        (v - r) << 1
    } else {
        ((r - v) << 1) - 1
    }
}
