use std::sync::LazyLock;

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, Num};
use num_rational::BigRational;

macro_rules! lazy_constant {
    (static $name:ident = $($int_part:literal)? . $dec_part:literal) => {
        static $name: LazyLock<BigDecimal> = LazyLock::new(|| {
            const SCALE: i64 = $dec_part.len() as i64;
            let digits = BigInt::from_str_radix(concat!($($int_part,)? $dec_part), 10)
                .expect("constant literals are decimal digits");
            BigDecimal::new(digits, SCALE)
        });
    };
}

// `N[Pi,100]` on wolfram cloud.
lazy_constant!(static PI = "3"."141592653589793238462643383279502884197169399375105820974944592307816406286208998628034825342117068");

// `N[2Pi,100]` on wolfram cloud.
lazy_constant!(static TAU = "6"."283185307179586476925286766559005768394338798750211641949889184615632812572417997256069650684234136");

// `N[E,100]` on wolfram cloud.
lazy_constant!(static E = "2"."718281828459045235360287471352662497757247093699959574966967627724076630353547594571382178525166427");

// `N[GoldenRatio,100]` on wolfram cloud.
lazy_constant!(static PHI = "1"."618033988749894848204586834365638117720309179805762862135448622705260462818902449707207204189391137");

static CONSTANTS: &[(&str, &LazyLock<BigDecimal>)] = &[("pi", &PI), ("tau", &TAU), ("e", &E), ("phi", &PHI)];

pub fn is_constant(name: &str) -> bool {
    CONSTANTS.iter().any(|(n, _)| *n == name)
}

/// The named constant as an exact rational approximation.
pub fn lookup(name: &str) -> Option<BigRational> {
    let (_, value) = CONSTANTS.iter().find(|(n, _)| *n == name)?;
    Some(to_rational(value))
}

fn to_rational(value: &BigDecimal) -> BigRational {
    let (digits, scale) = value.as_bigint_and_exponent();
    let ten = BigInt::from(10);
    if scale >= 0 {
        BigRational::new(digits, num_traits::pow(ten, scale as usize))
    } else {
        BigRational::from_integer(digits * num_traits::pow(ten, scale.unsigned_abs() as usize))
    }
}

#[test]
fn test_constants() {
    assert_eq!("3.14", PI.round(2).to_string());
    assert_eq!("6.28", TAU.round(2).to_string());
    assert_eq!("2.72", E.round(2).to_string());
    assert_eq!("1.62", PHI.round(2).to_string());
}

#[test]
fn test_lookup() {
    let pi = lookup("pi").unwrap();
    assert_eq!(BigInt::from(3), pi.to_integer());
    assert_eq!(lookup("tau").unwrap(), pi * BigInt::from(2));
    assert!(lookup("Pi").is_none());
    assert!(is_constant("phi"));
    assert!(!is_constant("ans"));
}
