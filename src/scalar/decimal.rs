use crate::error::{LinsysError, Result};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use pyo3::prelude::*;
use std::fmt;
use std::fmt::Display;
use std::ops;
use std::str::FromStr;
use std::sync::LazyLock;

/// Number of decimal digits kept after the point.
pub const PRECISION: u32 = 40;

/// Largest decimal exponent accepted by the parser.
pub const MAX_EXPONENT: i64 = 4096;

// 10^PRECISION, the integer representing `1`
static SCALE: LazyLock<BigInt> = LazyLock::new(|| ten_pow(PRECISION));

/// Absolute tolerance (1e-10) under which a value counts as zero.
pub static NEAR_ZERO_TOLERANCE: LazyLock<Decimal> = LazyLock::new(|| Decimal {
    units: ten_pow(PRECISION - 10),
});

fn ten_pow(exponent: u32) -> BigInt {
    num_traits::pow(BigInt::from(10u8), exponent as usize)
}

// Integer division rounding half away from zero
fn div_round(numerator: &BigInt, denominator: &BigInt) -> BigInt {
    let (quotient, remainder) = numerator.div_rem(denominator);
    if remainder.is_zero() || remainder.abs() * 2 < denominator.abs() {
        return quotient;
    }
    if numerator.is_negative() == denominator.is_negative() {
        quotient + 1
    } else {
        quotient - 1
    }
}

/// Fixed-point decimal number with `PRECISION` fractional digits.
///
/// The value is stored as an integer count of `10^-PRECISION` units, so addition and
/// subtraction are exact and multiplication / division round on the last digit only.
///
/// Precision is absolute, not relative: a value of magnitude `10^-k` keeps `PRECISION - k`
/// significant digits, so at least 28 down to `1e-12`. Below that, products underflow
/// early; the square of `1e-25` is already zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Decimal {
    units: BigInt,
}

impl Decimal {
    fn from_units(units: BigInt) -> Self {
        Self { units }
    }

    pub fn abs(&self) -> Decimal {
        Decimal::from_units(self.units.abs())
    }

    pub fn is_negative(&self) -> bool {
        self.units.is_negative()
    }

    pub fn is_near_zero(&self) -> bool {
        self.is_near_zero_within(&NEAR_ZERO_TOLERANCE)
    }

    pub fn is_near_zero_within(&self, tolerance: &Decimal) -> bool {
        self.units.abs() < tolerance.units
    }

    /// `None` when `rhs` is exactly zero.
    pub fn checked_div(&self, rhs: &Decimal) -> Option<Decimal> {
        if rhs.units.is_zero() {
            return None;
        }
        Some(Decimal::from_units(div_round(
            &(&self.units * &*SCALE),
            &rhs.units,
        )))
    }

    /// Square root, truncated to the last digit.
    pub fn sqrt(&self) -> Decimal {
        assert!(
            !self.units.is_negative(),
            "Square root of a negative number"
        );
        Decimal::from_units((&self.units * &*SCALE).sqrt())
    }

    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }
}

impl FromStr for Decimal {
    type Err = LinsysError;

    /// Parses `[+-]digits[.digits][(e|E)[+-]digits]`, digits on either side of the point
    /// being optional (but not both).
    fn from_str(s: &str) -> Result<Decimal> {
        let invalid = || LinsysError::InvalidLiteral(s.to_owned());
        let literal = s.trim();

        let (mantissa, exponent) = match literal.find(['e', 'E']) {
            Some(position) => (
                &literal[..position],
                literal[position + 1..]
                    .parse::<i64>()
                    .map_err(|_| invalid())?,
            ),
            None => (literal, 0),
        };
        let (negative, digits) = match mantissa.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
        };
        let (integer, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if (integer.is_empty() && fraction.is_empty())
            || !integer
                .chars()
                .chain(fraction.chars())
                .all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let significand = BigInt::parse_bytes(format!("{integer}{fraction}").as_bytes(), 10)
            .ok_or_else(invalid)?;
        let shift = (PRECISION as i64)
            .checked_add(exponent)
            .and_then(|s| s.checked_sub(fraction.len() as i64))
            .ok_or_else(invalid)?;

        if exponent > MAX_EXPONENT {
            return Err(invalid());
        }

        let units = if shift >= 0 {
            significand * ten_pow(u32::try_from(shift).map_err(|_| invalid())?)
        } else if -shift > (integer.len() + fraction.len()) as i64 {
            // every significant digit falls below the last kept one
            BigInt::zero()
        } else {
            div_round(&significand, &ten_pow((-shift) as u32))
        };

        Ok(Decimal::from_units(if negative { -units } else { units }))
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Decimal {
        Decimal::from_units(BigInt::from(value) * &*SCALE)
    }
}

impl From<i32> for Decimal {
    fn from(value: i32) -> Decimal {
        Decimal::from(value as i64)
    }
}

impl TryFrom<f64> for Decimal {
    type Error = LinsysError;

    /// Goes through the shortest decimal representation of `value`, so `0.1` gives
    /// exactly `0.1` rather than its binary expansion.
    fn try_from(value: f64) -> Result<Decimal> {
        if !value.is_finite() {
            return Err(LinsysError::InvalidLiteral(value.to_string()));
        }
        value.to_string().parse()
    }
}

impl Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.units.is_negative() { "-" } else { "" };
        let (integer, fraction) = self.units.abs().div_rem(&*SCALE);
        if fraction.is_zero() {
            return write!(f, "{}{}", sign, integer);
        }
        let fraction = format!("{:0>width$}", fraction.to_string(), width = PRECISION as usize);
        write!(f, "{}{}.{}", sign, integer, fraction.trim_end_matches('0'))
    }
}

impl ops::Add<&Decimal> for &Decimal {
    type Output = Decimal;

    fn add(self, rhs: &Decimal) -> Decimal {
        Decimal::from_units(&self.units + &rhs.units)
    }
}

impl ops::Sub<&Decimal> for &Decimal {
    type Output = Decimal;

    fn sub(self, rhs: &Decimal) -> Decimal {
        Decimal::from_units(&self.units - &rhs.units)
    }
}

impl ops::Mul<&Decimal> for &Decimal {
    type Output = Decimal;

    fn mul(self, rhs: &Decimal) -> Decimal {
        Decimal::from_units(div_round(&(&self.units * &rhs.units), &SCALE))
    }
}

impl ops::Div<&Decimal> for &Decimal {
    type Output = Decimal;

    fn div(self, rhs: &Decimal) -> Decimal {
        match self.checked_div(rhs) {
            Some(quotient) => quotient,
            None => panic!("Division by zero"),
        }
    }
}

// Owned flavours of the operators above
macro_rules! forward_decimal_binop {
    ($trait:ident, $method:ident) => {
        impl ops::$trait<Decimal> for Decimal {
            type Output = Decimal;

            fn $method(self, rhs: Decimal) -> Decimal {
                ops::$trait::$method(&self, &rhs)
            }
        }

        impl ops::$trait<&Decimal> for Decimal {
            type Output = Decimal;

            fn $method(self, rhs: &Decimal) -> Decimal {
                ops::$trait::$method(&self, rhs)
            }
        }
    };
}

forward_decimal_binop!(Add, add);
forward_decimal_binop!(Sub, sub);
forward_decimal_binop!(Mul, mul);
forward_decimal_binop!(Div, div);

impl ops::Neg for &Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal::from_units(-&self.units)
    }
}

impl ops::Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal::from_units(-self.units)
    }
}

impl Zero for Decimal {
    fn zero() -> Decimal {
        Decimal::from_units(BigInt::zero())
    }

    fn is_zero(&self) -> bool {
        self.units.is_zero()
    }
}

impl One for Decimal {
    fn one() -> Decimal {
        Decimal::from_units(SCALE.clone())
    }
}

impl std::iter::Sum<Decimal> for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Decimal {
        iter.fold(Decimal::zero(), |acc, d| acc + d)
    }
}

impl<'a> std::iter::Sum<&'a Decimal> for Decimal {
    fn sum<I: Iterator<Item = &'a Decimal>>(iter: I) -> Decimal {
        iter.fold(Decimal::zero(), |acc, d| acc + d)
    }
}

// --------------------------------------------------
//                      PYTHON
// --------------------------------------------------

// Anything whose `str()` is a numeric literal: str, int, float, decimal.Decimal
impl<'py> FromPyObject<'py> for Decimal {
    fn extract_bound(ob: &Bound<'py, PyAny>) -> PyResult<Self> {
        let literal = ob.str()?;
        Ok(literal.to_cow()?.parse::<Decimal>()?)
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
