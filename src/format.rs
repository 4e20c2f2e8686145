use std::cmp::Ordering;
use std::error::Error;
use std::fmt;

use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::{One, Signed};
use rug::integer::Order;
use rug::{Float, Integer, Rational};

use crate::config::Mode;

/// A fractional value was asked for in an integer-only numeral system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotAnInteger(pub BigRational);

impl fmt::Display for NotAnInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot represent {} as an integer", self.0)
    }
}

impl Error for NotAnInteger {}

pub fn render(value: &BigRational, mode: Mode, precision: u32) -> Result<String, NotAnInteger> {
    match mode {
        Mode::Decimal if value.is_integer() => Ok(value.numer().to_string()),
        Mode::Decimal => Ok(render_fraction(value, precision)),
        Mode::Hex => render_radix(value, 16, "0x"),
        Mode::Binary => render_radix(value, 2, ""),
        Mode::Octal => render_radix(value, 8, "0"),
    }
}

fn render_radix(value: &BigRational, radix: u32, prefix: &str) -> Result<String, NotAnInteger> {
    if !value.is_integer() {
        return Err(NotAnInteger(value.clone()));
    }
    let sign = if value.is_negative() { "-" } else { "" };
    let digits = value.numer().magnitude().to_str_radix(radix);
    Ok(format!("{sign}{prefix}{digits}"))
}

/// Rounds to a `precision`-bit binary float, then prints the shortest decimal
/// that reads back as that float.
fn render_fraction(value: &BigRational, precision: u32) -> String {
    let sign = if value.is_negative() { "-" } else { "" };
    let float = BinaryFloat::round(value.numer().magnitude(), value.denom().magnitude(), precision);
    let (digits, places) = float.shortest_decimal();
    format!("{sign}{}", fixed_point(digits.to_string(), places))
}

/// `mantissa * 2^exponent`, the mantissa exactly `precision` bits wide.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BinaryFloat {
    mantissa: BigUint,
    exponent: i64,
}

impl BinaryFloat {
    /// Nearest-even rounding of `numer / denom`. Both must be non-zero.
    fn round(numer: &BigUint, denom: &BigUint, precision: u32) -> Self {
        let precision = match precision {
            0 => numer.bits().max(denom.bits()).max(64),
            bits => u64::from(bits),
        };
        let precision = u32::try_from(precision)
            .unwrap_or(u32::MAX)
            .clamp(rug::float::prec_min(), rug::float::prec_max());

        let ratio = Rational::from((to_rug(numer), to_rug(denom)));
        let float = Float::with_val(precision, &ratio);
        let (mantissa, exponent) = float
            .to_integer_exp()
            .expect("a non-zero rational rounds to a finite float");

        // widen to the full precision in case trailing zero bits were dropped
        let mantissa = BigUint::new(mantissa.to_digits::<u32>(Order::Lsf));
        let pad = u64::from(precision).saturating_sub(mantissa.bits());
        Self {
            mantissa: mantissa << pad,
            exponent: i64::from(exponent) - pad as i64,
        }
    }

    /// A place coarse enough that no multiple of `10^-places` can fit.
    fn first_place(&self) -> i64 {
        // self < 2^magnitude, and 10^-places ends up at least ten times that
        let magnitude = self.exponent + self.mantissa.bits() as i64;
        (-(magnitude as f64) * std::f64::consts::LOG10_2).floor() as i64 - 1
    }

    /// Returns `(digits, places)` with the value `digits / 10^places`, using
    /// as few significant digits as still round to `self`.
    fn shortest_decimal(&self) -> (BigUint, i64) {
        let quarter_ulp = pow2(self.exponent - 2);
        let quarters = BigInt::from(self.mantissa.clone()) << 2u8;
        // on a power of two the float below us is only half an ulp away
        let gap = if self.mantissa.trailing_zeros() == Some(self.mantissa.bits() - 1) {
            1u32
        } else {
            2u32
        };
        let value = BigRational::from_integer(quarters.clone()) * &quarter_ulp;
        let lower = BigRational::from_integer(&quarters - gap) * &quarter_ulp;
        let upper = BigRational::from_integer(&quarters + 2u32) * &quarter_ulp;
        // ties round to even, so the bounds belong to us only when we are even
        let inclusive = !self.mantissa.bit(0);
        let fits = |c: &BigRational| {
            if inclusive {
                &lower <= c && c <= &upper
            } else {
                &lower < c && c < &upper
            }
        };

        let mut places = self.first_place();
        loop {
            let step = pow10(-places);
            let steps = &value / &step;
            let below = steps.floor().to_integer();
            let above = steps.ceil().to_integer();
            let below_fits = fits(&(BigRational::from_integer(below.clone()) * &step));
            let above_fits = fits(&(BigRational::from_integer(above.clone()) * &step));

            let chosen = match (below_fits, above_fits) {
                (true, true) => {
                    let half = BigRational::new(BigInt::one(), BigInt::from(2));
                    match (&steps - steps.floor()).cmp(&half) {
                        Ordering::Less => Some(below),
                        Ordering::Greater => Some(above),
                        Ordering::Equal if below.bit(0) => Some(above),
                        Ordering::Equal => Some(below),
                    }
                }
                (true, false) => Some(below),
                (false, true) => Some(above),
                (false, false) => None,
            };
            if let Some(digits) = chosen {
                return (digits.magnitude().clone(), places);
            }
            places += 1;
        }
    }
}

fn to_rug(n: &BigUint) -> Integer {
    Integer::from_digits(&n.to_u32_digits(), Order::Lsf)
}

fn pow2(exponent: i64) -> BigRational {
    let magnitude = BigInt::one() << exponent.unsigned_abs();
    if exponent >= 0 {
        BigRational::from_integer(magnitude)
    } else {
        BigRational::new(BigInt::one(), magnitude)
    }
}

fn pow10(exponent: i64) -> BigRational {
    let magnitude = num_traits::pow(BigInt::from(10), exponent.unsigned_abs() as usize);
    if exponent >= 0 {
        BigRational::from_integer(magnitude)
    } else {
        BigRational::new(BigInt::one(), magnitude)
    }
}

fn fixed_point(mut digits: String, places: i64) -> String {
    if places <= 0 {
        digits.push_str(&"0".repeat(places.unsigned_abs() as usize));
        return digits;
    }
    let places = places as usize;
    if digits.len() <= places {
        digits.insert_str(0, &"0".repeat(places + 1 - digits.len()));
    }
    let (int, frac) = digits.split_at(digits.len() - places);
    match frac.trim_end_matches('0') {
        "" => int.to_owned(),
        frac => format!("{int}.{frac}"),
    }
}

#[cfg(test)]
mod tests {
    use num_traits::Num;

    use super::*;

    fn ratio(n: i64, d: i64) -> BigRational {
        BigRational::new(n.into(), d.into())
    }

    fn decimal(value: &BigRational, precision: u32) -> String {
        render(value, Mode::Decimal, precision).unwrap()
    }

    fn parse_decimal(s: &str) -> BigRational {
        let (negative, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (int, frac) = s.split_once('.').unwrap_or((s, ""));
        let numer = BigInt::from_str_radix(&format!("{int}{frac}"), 10).unwrap();
        let value = BigRational::new(numer, num_traits::pow(BigInt::from(10), frac.len()));
        if negative {
            -value
        } else {
            value
        }
    }

    fn binary(value: &BigRational, precision: u32) -> BinaryFloat {
        BinaryFloat::round(value.numer().magnitude(), value.denom().magnitude(), precision)
    }

    #[test]
    fn integers_print_exactly() {
        let big: BigInt = "123456789012345678901234567890".parse().unwrap();
        for value in [BigInt::from(0), BigInt::from(-42), BigInt::from(7), big.clone(), -big] {
            let text = decimal(&BigRational::from_integer(value.clone()), 8);
            assert!(!text.contains('.'));
            assert_eq!(value, text.parse::<BigInt>().unwrap());
        }
    }

    #[test]
    fn short_fractions() {
        assert_eq!("0.5", decimal(&ratio(1, 2), 64));
        assert_eq!("-0.75", decimal(&ratio(-3, 4), 64));
        assert_eq!("0.1", decimal(&ratio(1, 10), 64));
        assert_eq!("2.5", decimal(&ratio(5, 2), 3));
        assert_eq!("2", decimal(&ratio(5, 2), 2));
    }

    #[test]
    fn rounds_to_precision() {
        assert_eq!("0.334", decimal(&ratio(1, 3), 8));
        assert_eq!("-0.334", decimal(&ratio(-1, 3), 8));
        assert_eq!("0.333336", decimal(&ratio(1, 3), 16));
        // 0.25 in two bits, 0.2 would read back as 0.1875
        assert_eq!("-0.3", decimal(&ratio(-2, 7), 2));
    }

    #[test]
    fn large_values_lose_low_digits() {
        let value = BigRational::from_integer(BigInt::one() << 70u8) + ratio(1, 2);
        assert_eq!("1180591620717411303400", decimal(&value, 64));
    }

    #[test]
    fn tiny_values_search_from_their_magnitude() {
        let tiny = BigRational::new(BigInt::one(), num_traits::pow(BigInt::from(10), 10_000));
        let float = binary(&tiny, 64);
        let (digits, places) = float.shortest_decimal();
        assert_eq!(BigUint::one(), digits);
        assert_eq!(10_000, places);
        assert!(places - float.first_place() < 30);
        assert_eq!(format!("-0.{}1", "0".repeat(9_999)), decimal(&-tiny, 64));
    }

    #[test]
    fn rounding_keeps_every_mantissa_bit() {
        let float = binary(&ratio(1, 3), 64);
        assert_eq!(64, float.mantissa.bits());
        assert_eq!(-65, float.exponent);
        let float = binary(&ratio(1, 2), 53);
        assert_eq!(BigUint::one() << 52u8, float.mantissa);
        assert_eq!(-53, float.exponent);
    }

    #[test]
    fn zero_precision_follows_the_value() {
        assert_eq!(decimal(&ratio(1, 3), 64), decimal(&ratio(1, 3), 0));
        let wide = BigRational::new(BigInt::one(), (BigInt::one() << 100u8) + 1u32);
        assert_eq!(decimal(&wide, 101), decimal(&wide, 0));
    }

    #[test]
    fn output_reads_back_as_the_same_float() {
        let values = [
            ratio(1, 3),
            ratio(-2, 7),
            ratio(22, 7),
            ratio(1, 1024 * 3),
            ratio(123_456_789, 1000),
            ratio(-1, 1_000_000_007),
        ];
        for value in &values {
            for precision in [1, 2, 8, 24, 53, 64, 200] {
                let text = decimal(value, precision);
                assert!(!text.contains('e'), "{text}");
                let back = parse_decimal(&text);
                assert_eq!(value.is_negative(), back.is_negative());
                assert_eq!(binary(value, precision), binary(&back, precision), "{text}");
            }
        }
    }

    #[test]
    fn more_precision_is_never_worse() {
        for value in [ratio(1, 3), ratio(-22, 7), ratio(355, 113), ratio(1, 99)] {
            let error = |precision| (parse_decimal(&decimal(&value, precision)) - &value).abs();
            assert!(error(64) <= error(8));
            assert!(error(128) <= error(16));
        }
    }

    #[test]
    fn radix_literals() {
        let int = |n: i64| BigRational::from_integer(n.into());
        assert_eq!(Ok("0xff".to_owned()), render(&int(255), Mode::Hex, 64));
        assert_eq!(Ok("-0xff".to_owned()), render(&int(-255), Mode::Hex, 64));
        assert_eq!(Ok("101".to_owned()), render(&int(5), Mode::Binary, 64));
        assert_eq!(Ok("-101".to_owned()), render(&int(-5), Mode::Binary, 64));
        assert_eq!(Ok("010".to_owned()), render(&int(8), Mode::Octal, 64));
        assert_eq!(Ok("-010".to_owned()), render(&int(-8), Mode::Octal, 64));
        assert_eq!(Ok("0x0".to_owned()), render(&int(0), Mode::Hex, 64));
        assert_eq!(Ok("00".to_owned()), render(&int(0), Mode::Octal, 64));
        assert_eq!(Ok("0".to_owned()), render(&int(0), Mode::Binary, 64));
    }

    #[test]
    fn radix_literals_read_back() {
        let huge = BigInt::from_str_radix("deadbeefcafebabe0123456789", 16).unwrap();
        for value in [BigInt::from(1), BigInt::from(-1), BigInt::from(4096), huge.clone(), -huge] {
            let rational = BigRational::from_integer(value.clone());
            let modes = [
                (Mode::Hex, 16, "0x"),
                (Mode::Binary, 2, ""),
                (Mode::Octal, 8, "0"),
            ];
            for (mode, radix, prefix) in modes {
                let text = render(&rational, mode, 64).unwrap();
                let (negative, rest) = match text.strip_prefix('-') {
                    Some(rest) => (true, rest),
                    None => (false, text.as_str()),
                };
                let digits = rest.strip_prefix(prefix).unwrap();
                let magnitude = BigInt::from_str_radix(digits, radix).unwrap();
                assert_eq!(value, if negative { -magnitude } else { magnitude });
            }
        }
    }

    #[test]
    fn fractions_have_no_radix_form() {
        for mode in [Mode::Hex, Mode::Binary, Mode::Octal] {
            let err = render(&ratio(1, 2), mode, 64).unwrap_err();
            assert_eq!("cannot represent 1/2 as an integer", err.to_string());
        }
    }
}
