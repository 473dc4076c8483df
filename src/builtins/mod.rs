//! # Native Procedures
//!
//! The built-in and add-on procedure tables the evaluator falls back to once
//! the lexical chain runs out.
//!
//! ## Categories
//!
//! - **[arithmetic]** (5): `+`, `-`, `*`, `/`, `=` — numeric operations over
//!   the int/real tower
//! - **[higher_order]** (1): `map` — procedure application over equal-length
//!   lists
//! - **[addon]** (1): `string-sha256` — hex digest of a string
//!
//! Each native is a plain function pointer receiving the already-evaluated
//! operand vector; arity is checked at the call site from the table entry,
//! type checks live in the callback, and every diagnostic line is prefixed
//! with the procedure's name.

use crate::error::EvalError;
use crate::eval::Interp;
use crate::value::Value;

pub mod addon;
pub mod arithmetic;
pub mod higher_order;

/// Callback signature for a native procedure. The interpreter handle lets
/// higher-order natives apply procedure operands.
pub type NativeFn = fn(&mut Interp, &[Value]) -> Result<Value, EvalError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

/// One native procedure: table entry plus its callback.
#[derive(Debug)]
pub struct NativeProc {
    pub name: &'static str,
    pub arity: Arity,
    pub run: NativeFn,
}

/// The built-in table, anchored conceptually on the Program node.
pub static BUILT_IN_PROCS: &[NativeProc] = &[
    NativeProc {
        name: "+",
        arity: Arity::AtLeast(0),
        run: arithmetic::add,
    },
    NativeProc {
        name: "-",
        arity: Arity::AtLeast(1),
        run: arithmetic::sub,
    },
    NativeProc {
        name: "*",
        arity: Arity::AtLeast(0),
        run: arithmetic::mul,
    },
    NativeProc {
        name: "/",
        arity: Arity::AtLeast(1),
        run: arithmetic::div,
    },
    NativeProc {
        name: "=",
        arity: Arity::AtLeast(1),
        run: arithmetic::num_eq,
    },
    NativeProc {
        name: "map",
        arity: Arity::AtLeast(2),
        run: higher_order::map,
    },
];

/// The add-on table, consulted after the built-ins.
pub static ADDON_PROCS: &[NativeProc] = &[NativeProc {
    name: "string-sha256",
    arity: Arity::Exactly(1),
    run: addon::string_sha256,
}];

/// Built-in lookup, then add-on lookup.
pub fn find_native(name: &str) -> Option<&'static NativeProc> {
    BUILT_IN_PROCS
        .iter()
        .find(|proc| proc.name == name)
        .or_else(|| ADDON_PROCS.iter().find(|proc| proc.name == name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_native_searches_both_tables() {
        assert!(find_native("+").is_some());
        assert!(find_native("map").is_some());
        assert!(find_native("string-sha256").is_some());
        assert!(find_native("no-such-procedure").is_none());
    }

    #[test]
    fn test_table_arities() {
        assert_eq!(find_native("+").map(|p| p.arity), Some(Arity::AtLeast(0)));
        assert_eq!(find_native("-").map(|p| p.arity), Some(Arity::AtLeast(1)));
        assert_eq!(find_native("map").map(|p| p.arity), Some(Arity::AtLeast(2)));
        assert_eq!(
            find_native("string-sha256").map(|p| p.arity),
            Some(Arity::Exactly(1))
        );
    }
}
