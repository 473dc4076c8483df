//! Higher-order natives: `map`
//!
//! `map` takes a procedure and one or more equal-length lists, applies the
//! procedure to each row of elements, and returns a fresh list.

use crate::error::EvalError;
use crate::eval::Interp;
use crate::value::Value;

/// `(map (lambda (a b) (+ a b)) '(1 2 3) '(10 20 30))` => `'(11 22 33)`
pub fn map(interp: &mut Interp, args: &[Value]) -> Result<Value, EvalError> {
    let Some((procedure, lists)) = args.split_first() else {
        return Err(EvalError::arity_error("map", "at least 2", 0));
    };

    if !procedure.is_procedure() {
        return Err(EvalError::type_error("map", "procedure", procedure, 0));
    }

    let mut columns: Vec<&[Value]> = Vec::with_capacity(lists.len());
    for (index, list) in lists.iter().enumerate() {
        match list {
            Value::List(items) => columns.push(items),
            other => return Err(EvalError::type_error("map", "list", other, index + 1)),
        }
    }

    let length = columns.first().map(|items| items.len()).unwrap_or(0);
    if columns.iter().any(|items| items.len() != length) {
        return Err(EvalError::runtime_error(
            "map",
            "all lists must have the same size",
        ));
    }

    let mut results = Vec::with_capacity(length);
    for row in 0..length {
        let row_args: Vec<Value> = columns.iter().map(|items| items[row].clone()).collect();
        results.push(interp.apply(procedure, &row_args)?);
    }
    Ok(Value::List(results))
}
