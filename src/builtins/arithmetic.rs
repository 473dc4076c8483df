//! Arithmetic natives: `+`, `-`, `*`, `/`, `=`
//!
//! All-integer chains stay integer (wrapping 64-bit, truncating division);
//! a real anywhere promotes the whole chain to `f64`.
//!
//! - `+`: sum of all arguments (identity: 0)
//! - `-`: subtract subsequent args from the first, or negate a single arg
//! - `*`: product of all arguments (identity: 1)
//! - `/`: divide the first by subsequent args, or reciprocal of a single arg
//! - `=`: n-ary numeric equality across mixed int/real

use crate::error::EvalError;
use crate::eval::Interp;
use crate::value::Value;

/// Running accumulator over the two-level numeric tower.
#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Real(f64),
}

impl Num {
    fn from_value(function: &str, value: &Value, position: usize) -> Result<Num, EvalError> {
        match value {
            Value::Int(i) => Ok(Num::Int(*i)),
            Value::Real(r) => Ok(Num::Real(*r)),
            other => Err(EvalError::type_error(function, "number", other, position)),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Real(r) => r,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Num::Int(i) => i == 0,
            Num::Real(r) => r == 0.0,
        }
    }

    fn add(self, rhs: Num) -> Num {
        match (self, rhs) {
            (Num::Int(a), Num::Int(b)) => Num::Int(a.wrapping_add(b)),
            (a, b) => Num::Real(a.as_f64() + b.as_f64()),
        }
    }

    fn sub(self, rhs: Num) -> Num {
        match (self, rhs) {
            (Num::Int(a), Num::Int(b)) => Num::Int(a.wrapping_sub(b)),
            (a, b) => Num::Real(a.as_f64() - b.as_f64()),
        }
    }

    fn mul(self, rhs: Num) -> Num {
        match (self, rhs) {
            (Num::Int(a), Num::Int(b)) => Num::Int(a.wrapping_mul(b)),
            (a, b) => Num::Real(a.as_f64() * b.as_f64()),
        }
    }

    /// Caller rules out a zero divisor first.
    fn div(self, rhs: Num) -> Num {
        match (self, rhs) {
            (Num::Int(a), Num::Int(b)) => Num::Int(a.wrapping_div(b)),
            (a, b) => Num::Real(a.as_f64() / b.as_f64()),
        }
    }

    fn eq(self, rhs: Num) -> bool {
        match (self, rhs) {
            (Num::Int(a), Num::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Num::Int(i) => Value::Int(i),
            Num::Real(r) => Value::Real(r),
        }
    }
}

/// `(+ 1 2 3)` => `6`, `(+)` => `0`, `(+ 1 2.5)` => `3.5`
pub fn add(_interp: &mut Interp, args: &[Value]) -> Result<Value, EvalError> {
    let mut acc = Num::Int(0);
    for (position, arg) in args.iter().enumerate() {
        acc = acc.add(Num::from_value("+", arg, position)?);
    }
    Ok(acc.into_value())
}

/// `(- 10 3 2)` => `5`, `(- 5)` => `-5`
pub fn sub(_interp: &mut Interp, args: &[Value]) -> Result<Value, EvalError> {
    let mut operands = args.iter().enumerate();
    let Some((position, first)) = operands.next() else {
        return Err(EvalError::arity_error("-", "at least 1", 0));
    };
    let first = Num::from_value("-", first, position)?;

    if args.len() == 1 {
        return Ok(Num::Int(0).sub(first).into_value());
    }

    let mut acc = first;
    for (position, arg) in operands {
        acc = acc.sub(Num::from_value("-", arg, position)?);
    }
    Ok(acc.into_value())
}

/// `(* 2 3 4)` => `24`, `(*)` => `1`
pub fn mul(_interp: &mut Interp, args: &[Value]) -> Result<Value, EvalError> {
    let mut acc = Num::Int(1);
    for (position, arg) in args.iter().enumerate() {
        acc = acc.mul(Num::from_value("*", arg, position)?);
    }
    Ok(acc.into_value())
}

/// `(/ 20 4)` => `5` (truncating over integers), `(/ 2.0)` => `0.5`.
/// Any zero divisor is fatal, the single-argument reciprocal included.
pub fn div(_interp: &mut Interp, args: &[Value]) -> Result<Value, EvalError> {
    let mut operands = args.iter().enumerate();
    let Some((position, first)) = operands.next() else {
        return Err(EvalError::arity_error("/", "at least 1", 0));
    };
    let first = Num::from_value("/", first, position)?;

    if args.len() == 1 {
        if first.is_zero() {
            return Err(EvalError::DivisionByZero {
                function: "/".to_string(),
            });
        }
        return Ok(Num::Int(1).div(first).into_value());
    }

    let mut acc = first;
    for (position, arg) in operands {
        let divisor = Num::from_value("/", arg, position)?;
        if divisor.is_zero() {
            return Err(EvalError::DivisionByZero {
                function: "/".to_string(),
            });
        }
        acc = acc.div(divisor);
    }
    Ok(acc.into_value())
}

/// `(= 1 1 1)` => `#t`, `(= 1 1.0)` => `#t`, `(= 1 2)` => `#f`.
/// Every operand is type-checked even after the answer is known.
pub fn num_eq(_interp: &mut Interp, args: &[Value]) -> Result<Value, EvalError> {
    let mut previous: Option<Num> = None;
    let mut all_equal = true;
    for (position, arg) in args.iter().enumerate() {
        let current = Num::from_value("=", arg, position)?;
        if let Some(previous) = previous {
            if !previous.eq(current) {
                all_equal = false;
            }
        }
        previous = Some(current);
    }
    Ok(Value::Bool(all_equal))
}
