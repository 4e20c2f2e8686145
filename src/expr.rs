use chumsky::prelude::*;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Num;

mod constants;
mod eval;

pub use eval::Calculator;

// exponents past this are rejected while parsing literals like `1e99999`
const MAX_LITERAL_EXPONENT: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Shl,
    Shr,
    And,
    Xor,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::And => "&",
            BinaryOp::Xor => "^",
            BinaryOp::Or => "|",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Value(BigRational),
    Var(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<(Expr, Expr)>),
    Call(String, Vec<Expr>),
}

impl Expr {
    fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary(op, Box::new((lhs, rhs)))
    }
}

/// One input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assign(String, Expr),
    Expr(Expr),
}

fn radix_literal(
    prefix: &'static str,
    radix: u32,
) -> impl Parser<char, BigRational, Error = Simple<char>> + Clone {
    just(prefix)
        .ignore_then(text::digits(radix))
        .try_map(move |digits: String, span| {
            BigInt::from_str_radix(&digits, radix)
                .map(BigRational::from_integer)
                .map_err(|e| Simple::custom(span, e.to_string()))
        })
}

fn decimal_literal() -> impl Parser<char, BigRational, Error = Simple<char>> + Clone {
    let exponent = one_of("eE")
        .ignore_then(one_of("+-").or_not())
        .then(text::digits(10))
        .try_map(|(sign, digits): (Option<char>, String), span| match digits.parse::<u32>() {
            Ok(magnitude) if magnitude <= MAX_LITERAL_EXPONENT => {
                let magnitude = i64::from(magnitude);
                Ok(if sign == Some('-') { -magnitude } else { magnitude })
            }
            _ => Err(Simple::custom(span, format!("exponent {digits} is too large"))),
        });

    text::digits(10)
        .then(just('.').ignore_then(text::digits(10)).or_not())
        .then(exponent.or_not())
        .try_map(
            |((int, frac), exponent): ((String, Option<String>), Option<i64>), span| {
                let frac = frac.unwrap_or_default();
                let shift = exponent.unwrap_or(0) - frac.len() as i64;
                let scale = num_traits::pow(BigInt::from(10), shift.unsigned_abs() as usize);
                BigInt::from_str_radix(&format!("{int}{frac}"), 10)
                    .map(|mantissa| {
                        if shift >= 0 {
                            BigRational::from_integer(mantissa * scale)
                        } else {
                            BigRational::new(mantissa, scale)
                        }
                    })
                    .map_err(|e| Simple::custom(span, e.to_string()))
            },
        )
}

pub fn statement_parser() -> impl Parser<char, Statement, Error = Simple<char>> {
    let ident = text::ident().padded();

    let expr = recursive(|expr| {
        let number = choice((
            radix_literal("0x", 16),
            radix_literal("0b", 2),
            radix_literal("0o", 8),
            decimal_literal(),
        ))
        .map(Expr::Value);

        let call = ident
            .clone()
            .then(
                expr.clone()
                    .separated_by(just(',').padded())
                    .delimited_by(just('('), just(')')),
            )
            .map(|(name, args)| Expr::Call(name, args));

        let atom = number
            .or(expr.clone().delimited_by(just('('), just(')')))
            .or(call)
            .or(ident.clone().map(Expr::Var))
            .padded()
            .boxed();

        // `-2**2` is `-(2**2)` and `2**-1` is allowed
        let unary = recursive(|unary| {
            let power = atom
                .then(just("**").padded().ignore_then(unary).or_not())
                .map(|(base, exponent)| match exponent {
                    Some(exponent) => Expr::binary(BinaryOp::Pow, base, exponent),
                    None => base,
                });

            choice((
                just('-').to(UnaryOp::Neg),
                just('+').to(UnaryOp::Plus),
                just('~').to(UnaryOp::Not),
            ))
            .padded()
            .repeated()
            .then(power)
            .foldr(|op, rhs| Expr::Unary(op, Box::new(rhs)))
        })
        .boxed();

        let product = unary
            .clone()
            .then(
                choice((
                    just('*').to(BinaryOp::Mul),
                    just('/').to(BinaryOp::Div),
                    just('%').to(BinaryOp::Rem),
                ))
                .padded()
                .then(unary)
                .repeated(),
            )
            .foldl(|lhs, (op, rhs)| Expr::binary(op, lhs, rhs))
            .boxed();

        let sum = product
            .clone()
            .then(
                choice((just('+').to(BinaryOp::Add), just('-').to(BinaryOp::Sub)))
                    .padded()
                    .then(product)
                    .repeated(),
            )
            .foldl(|lhs, (op, rhs)| Expr::binary(op, lhs, rhs))
            .boxed();

        let shift = sum
            .clone()
            .then(
                choice((just("<<").to(BinaryOp::Shl), just(">>").to(BinaryOp::Shr)))
                    .padded()
                    .then(sum)
                    .repeated(),
            )
            .foldl(|lhs, (op, rhs)| Expr::binary(op, lhs, rhs))
            .boxed();

        let and = shift
            .clone()
            .then(just('&').padded().to(BinaryOp::And).then(shift).repeated())
            .foldl(|lhs, (op, rhs)| Expr::binary(op, lhs, rhs))
            .boxed();

        let xor = and
            .clone()
            .then(just('^').padded().to(BinaryOp::Xor).then(and).repeated())
            .foldl(|lhs, (op, rhs)| Expr::binary(op, lhs, rhs))
            .boxed();

        xor.clone()
            .then(just('|').padded().to(BinaryOp::Or).then(xor).repeated())
            .foldl(|lhs, (op, rhs)| Expr::binary(op, lhs, rhs))
    });

    let assign = ident
        .then_ignore(just('='))
        .then(expr.clone())
        .map(|(name, value)| Statement::Assign(name, value));

    assign.or(expr.map(Statement::Expr)).then_ignore(end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Expr {
        match statement_parser().parse(line) {
            Ok(Statement::Expr(expr)) => expr,
            other => panic!("{line:?} parsed as {other:?}"),
        }
    }

    fn int(n: i64) -> Expr {
        Expr::Value(BigRational::from_integer(n.into()))
    }

    #[test]
    fn literals() {
        assert_eq!(int(255), parse("0xff"));
        assert_eq!(int(5), parse("0b101"));
        assert_eq!(int(15), parse("0o17"));
        assert_eq!(int(42), parse("  42 "));
        assert_eq!(
            Expr::Value(BigRational::new(5.into(), 4.into())),
            parse("1.25")
        );
        assert_eq!(int(1500), parse("1.5e3"));
        assert_eq!(
            Expr::Value(BigRational::new(1.into(), 1000.into())),
            parse("1E-3")
        );
    }

    #[test]
    fn precedence() {
        assert_eq!(
            Expr::binary(
                BinaryOp::Add,
                int(1),
                Expr::binary(BinaryOp::Mul, int(2), int(3))
            ),
            parse("1 + 2 * 3")
        );
        assert_eq!(
            Expr::binary(
                BinaryOp::Sub,
                Expr::binary(BinaryOp::Sub, int(8), int(4)),
                int(2)
            ),
            parse("8-4-2")
        );
        assert_eq!(
            Expr::binary(
                BinaryOp::Pow,
                int(2),
                Expr::binary(BinaryOp::Pow, int(3), int(2))
            ),
            parse("2**3**2")
        );
        assert_eq!(
            Expr::Unary(
                UnaryOp::Neg,
                Box::new(Expr::binary(BinaryOp::Pow, int(2), int(2)))
            ),
            parse("-2**2")
        );
        assert_eq!(
            Expr::binary(
                BinaryOp::Or,
                int(1),
                Expr::binary(
                    BinaryOp::Xor,
                    int(2),
                    Expr::binary(BinaryOp::And, int(3), int(4))
                )
            ),
            parse("1 | 2 ^ 3 & 4")
        );
    }

    #[test]
    fn names_and_calls() {
        assert_eq!(Expr::Var("ans".into()), parse("ans"));
        assert_eq!(
            Expr::Call("max".into(), vec![int(1), Expr::Var("x".into())]),
            parse("max(1, x)")
        );
        assert_eq!(
            Ok(Statement::Assign("x".into(), int(3))),
            statement_parser().parse("x = 3")
        );
    }

    #[test]
    fn rejects_garbage() {
        for line in ["1 +", "(1", "2 3", "1..2", "0b102", "x = ", "1e100000", ""] {
            assert!(statement_parser().parse(line).is_err(), "{line:?}");
        }
    }
}
