/// The decomposed form of a parsed JSON number.
///
/// Components are always accumulated, even when the tokenizer combines
/// them into a double, so that switching numeric modes changes only the
/// presentation. Accumulation saturates: digits beyond what 64 bits can
/// hold are dropped with half-up rounding of the first dropped digit,
/// integer digits dropped this way are counted into the exponent, and an
/// exponent too large for 64 bits is pinned to `u64::MAX` (combining to
/// ±∞ or ±0).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NumberComponents {
    /// Sign of the mantissa.
    pub positive: bool,

    /// Integer part of the mantissa.
    pub integer: u64,

    /// Decimal digits of the mantissa, as an integer.
    pub decimal: u64,

    /// Number of decimal places `decimal` represents.
    pub decimal_places: u64,

    /// Sign of the exponent.
    pub exponent_positive: bool,

    /// Magnitude of the exponent.
    pub exponent: u64,

    /// Whether the literal was syntactically an integer that survived
    /// accumulation. `-0` is not considered an integer: it has no
    /// faithful signed 64-bit representation.
    pub is_integer: bool,
}

impl Default for NumberComponents {
    fn default() -> Self {
        NumberComponents {
            positive: true,
            integer: 0,
            decimal: 0,
            decimal_places: 0,
            exponent_positive: true,
            exponent: 0,
            is_integer: true,
        }
    }
}

impl NumberComponents {
    /// Combine the components into a double:
    /// `(integer + decimal * 10^-decimal_places) * 10^±exponent`, negated
    /// for a negative mantissa. A pinned exponent of `u64::MAX`
    /// deliberately overflows to ±∞ or underflows to ±0.
    pub fn to_f64(&self) -> f64 {
        let mut number = self.integer as f64;

        if self.decimal > 0 {
            number += self.decimal as f64 * 10f64.powf(-(self.decimal_places as f64));
        }

        if self.exponent > 0 {
            if self.exponent_positive {
                number *= 10f64.powf(self.exponent as f64);
            } else {
                number *= 10f64.powf(-(self.exponent as f64));
            }
        }

        if self.positive {
            number
        } else {
            -number
        }
    }

    /// The value as a signed 64-bit integer, if the literal was a true
    /// integer and fits with the sign applied.
    pub fn to_i64(&self) -> Option<i64> {
        if !self.is_integer {
            return None;
        }
        if self.positive {
            i64::try_from(self.integer).ok()
        } else if self.integer <= i64::MAX as u64 + 1 {
            Some((self.integer as i64).wrapping_neg())
        } else {
            None
        }
    }
}
