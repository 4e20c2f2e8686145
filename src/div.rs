use std::error::Error;
use std::fmt::Display;

use num_rational::BigRational;
use num_traits::Zero;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DivisionByZero;

impl Display for DivisionByZero {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad("division by zero")
    }
}

impl Error for DivisionByZero {}

pub trait CheckedDiv<T = Self> {
    type Target;
    fn checked_div(self, other: T) -> Result<Self::Target, DivisionByZero>;
    fn checked_rem(self, other: T) -> Result<Self::Target, DivisionByZero>;
}

impl CheckedDiv for BigRational {
    type Target = BigRational;

    fn checked_div(self, other: Self) -> Result<Self::Target, DivisionByZero> {
        if other.is_zero() {
            Err(DivisionByZero)
        } else {
            Ok(self / other)
        }
    }

    fn checked_rem(self, other: Self) -> Result<Self::Target, DivisionByZero> {
        if other.is_zero() {
            Err(DivisionByZero)
        } else {
            Ok(self % other)
        }
    }
}

#[test]
fn test_checked_div() {
    let seven = BigRational::from_integer(7.into());
    let two = BigRational::from_integer(2.into());
    assert_eq!(
        BigRational::new(7.into(), 2.into()),
        seven.clone().checked_div(two.clone()).unwrap()
    );
    assert_eq!(
        BigRational::from_integer(1.into()),
        seven.clone().checked_rem(two).unwrap()
    );
    assert_eq!(Err(DivisionByZero), seven.clone().checked_div(BigRational::zero()));
    assert_eq!(Err(DivisionByZero), seven.checked_rem(BigRational::zero()));
    assert_eq!("division by zero", DivisionByZero.to_string());
}
