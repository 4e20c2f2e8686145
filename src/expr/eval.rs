use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use chumsky::error::Simple;
use chumsky::Parser;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use super::{constants, statement_parser, BinaryOp, Expr, Statement, UnaryOp};
use crate::div::{CheckedDiv, DivisionByZero};
use crate::session::Evaluator;

const MAX_EXPONENT: u32 = 1_000_000;
const MAX_SHIFT: usize = 1 << 24;

/// Name under which the last successful result is kept.
pub const ANSWER: &str = "ans";

static FUNCTIONS: &[(&str, fn(&BigRational) -> BigRational)] = &[
    ("abs", |x| x.abs()),
    ("floor", BigRational::floor),
    ("ceil", BigRational::ceil),
    ("round", BigRational::round),
    ("trunc", BigRational::trunc),
];

#[derive(Debug)]
pub enum EvalError {
    Parse(Vec<Simple<char>>),
    DivisionByZero(DivisionByZero),
    UnknownVariable(String),
    UnknownFunction(String),
    Arity {
        function: String,
        expected: &'static str,
        found: usize,
    },
    NotAnInteger(&'static str),
    NegativeShift,
    OutOfRange(&'static str),
    AssignToConstant(String),
}

impl From<DivisionByZero> for EvalError {
    fn from(e: DivisionByZero) -> Self {
        EvalError::DivisionByZero(e)
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Parse(errors) => {
                for (n, e) in errors.iter().enumerate() {
                    if n != 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{e}")?;
                }
                Ok(())
            }
            EvalError::DivisionByZero(e) => e.fmt(f),
            EvalError::UnknownVariable(name) => write!(f, "undefined variable `{name}`"),
            EvalError::UnknownFunction(name) => write!(f, "undefined function `{name}`"),
            EvalError::Arity {
                function,
                expected,
                found,
            } => write!(f, "`{function}` takes {expected} argument(s), got {found}"),
            EvalError::NotAnInteger(op) => write!(f, "operands of `{op}` must be integers"),
            EvalError::NegativeShift => f.write_str("negative shift amount"),
            EvalError::OutOfRange(what) => write!(f, "{what} out of range"),
            EvalError::AssignToConstant(name) => write!(f, "cannot assign to constant `{name}`"),
        }
    }
}

impl Error for EvalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EvalError::DivisionByZero(e) => Some(e),
            _ => None,
        }
    }
}

/// Evaluates lines over exact rationals, remembering assignments between
/// lines.
#[derive(Debug, Default)]
pub struct Calculator {
    variables: HashMap<String, BigRational>,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&mut self, line: &str) -> Result<BigRational, EvalError> {
        let statement = statement_parser().parse(line).map_err(EvalError::Parse)?;
        let value = match statement {
            Statement::Expr(expr) => self.eval(&expr)?,
            Statement::Assign(name, _) if constants::is_constant(&name) => {
                return Err(EvalError::AssignToConstant(name));
            }
            Statement::Assign(name, expr) => {
                let value = self.eval(&expr)?;
                self.variables.insert(name, value.clone());
                value
            }
        };
        self.variables.insert(ANSWER.to_owned(), value.clone());
        Ok(value)
    }

    pub fn eval(&self, expr: &Expr) -> Result<BigRational, EvalError> {
        match expr {
            Expr::Value(value) => Ok(value.clone()),
            Expr::Var(name) => self.lookup(name),
            Expr::Unary(op, operand) => {
                let value = self.eval(operand)?;
                Ok(match op {
                    UnaryOp::Neg => -value,
                    UnaryOp::Plus => value,
                    UnaryOp::Not => BigRational::from_integer(!integer(value, "~")?),
                })
            }
            Expr::Binary(op, operands) => {
                let (lhs, rhs) = &**operands;
                binary(*op, self.eval(lhs)?, self.eval(rhs)?)
            }
            Expr::Call(name, args) => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                call(name, args)
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<BigRational, EvalError> {
        match self.variables.get(name) {
            Some(value) => Ok(value.clone()),
            None => constants::lookup(name)
                .ok_or_else(|| EvalError::UnknownVariable(name.to_owned())),
        }
    }
}

impl Evaluator for Calculator {
    type Error = EvalError;

    fn evaluate(&mut self, line: &str) -> Result<BigRational, EvalError> {
        self.run(line)
    }
}

fn integer(value: BigRational, op: &'static str) -> Result<BigInt, EvalError> {
    if value.is_integer() {
        Ok(value.to_integer())
    } else {
        Err(EvalError::NotAnInteger(op))
    }
}

fn binary(op: BinaryOp, lhs: BigRational, rhs: BigRational) -> Result<BigRational, EvalError> {
    let value = match op {
        BinaryOp::Add => lhs + rhs,
        BinaryOp::Sub => lhs - rhs,
        BinaryOp::Mul => lhs * rhs,
        BinaryOp::Div => lhs.checked_div(rhs)?,
        BinaryOp::Rem => lhs.checked_rem(rhs)?,
        BinaryOp::Pow => power(lhs, rhs)?,
        BinaryOp::Shl | BinaryOp::Shr => {
            let value = integer(lhs, op.symbol())?;
            let amount = integer(rhs, op.symbol())?;
            if amount.is_negative() {
                return Err(EvalError::NegativeShift);
            }
            let amount = amount
                .to_usize()
                .filter(|amount| *amount <= MAX_SHIFT)
                .ok_or(EvalError::OutOfRange("shift amount"))?;
            BigRational::from_integer(if op == BinaryOp::Shl {
                value << amount
            } else {
                value >> amount
            })
        }
        BinaryOp::And | BinaryOp::Xor | BinaryOp::Or => {
            let a = integer(lhs, op.symbol())?;
            let b = integer(rhs, op.symbol())?;
            BigRational::from_integer(match op {
                BinaryOp::And => a & b,
                BinaryOp::Xor => a ^ b,
                _ => a | b,
            })
        }
    };
    Ok(value)
}

fn power(base: BigRational, exponent: BigRational) -> Result<BigRational, EvalError> {
    let exponent = integer(exponent, BinaryOp::Pow.symbol())?
        .to_i32()
        .filter(|e| e.unsigned_abs() <= MAX_EXPONENT)
        .ok_or(EvalError::OutOfRange("exponent"))?;
    if base.is_zero() && exponent < 0 {
        return Err(DivisionByZero.into());
    }
    Ok(base.pow(exponent))
}

fn call(name: &str, args: Vec<BigRational>) -> Result<BigRational, EvalError> {
    let arity = |expected| EvalError::Arity {
        function: name.to_owned(),
        expected,
        found: args.len(),
    };

    if let Some((_, f)) = FUNCTIONS.iter().find(|(n, _)| *n == name) {
        return match args.as_slice() {
            [x] => Ok(f(x)),
            _ => Err(arity("one")),
        };
    }

    match name {
        "min" | "max" => {
            let err = arity("at least one");
            let mut args = args.into_iter();
            let first = args.next().ok_or(err)?;
            Ok(args.fold(first, |acc, x| if name == "min" { acc.min(x) } else { acc.max(x) }))
        }
        _ => Err(EvalError::UnknownFunction(name.to_owned())),
    }
}
