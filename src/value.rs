// ABOUTME: Owned result values produced by evaluation, with their printed forms

use crate::ast::NodeId;
use crate::builtins::NativeProc;
use std::fmt;

/// The result of evaluating a node. Values own their contents outright;
/// producing one from the tree is a deep copy, so results never alias nodes.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Real(f64),
    Bool(bool),
    Char(char),
    Str(String),
    List(Vec<Value>),
    Pair(Box<(Value, Value)>),
    /// A user procedure: its params and body live at `lambda` in the tree,
    /// and its captured environment is that node's parent chain.
    Closure {
        name: Option<String>,
        lambda: NodeId,
    },
    Native(&'static NativeProc),
    /// No printable value (define, set!, a cond with no fired clause).
    Void,
}

impl Value {
    /// Human-readable kind name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) | Value::Real(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Char(_) => "character",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Pair(_) => "pair",
            Value::Closure { .. } | Value::Native(_) => "procedure",
            Value::Void => "void",
        }
    }

    /// Racket truthiness: only `#f` is false.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false))
    }

    pub fn is_procedure(&self) -> bool {
        matches!(self, Value::Closure { .. } | Value::Native(_))
    }
}

/// Inner datum printing: list and pair contents carry no quote of their own.
fn write_datum(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::List(items) => {
            write!(f, "(")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write_datum(f, item)?;
            }
            write!(f, ")")
        }
        Value::Pair(pair) => {
            write!(f, "(")?;
            write_datum(f, &pair.0)?;
            write!(f, " . ")?;
            write_datum(f, &pair.1)?;
            write!(f, ")")
        }
        Value::Int(i) => write!(f, "{}", i),
        Value::Real(r) => write!(f, "{:.6}", r),
        Value::Bool(b) => write!(f, "{}", if *b { "#t" } else { "#f" }),
        Value::Char(c) => write!(f, "#\\{}", c),
        Value::Str(s) => write!(f, "\"{}\"", s),
        Value::Closure { name, .. } => match name {
            Some(name) => write!(f, "#<procedure:{}>", name),
            None => write!(f, "#<procedure:anonymous>"),
        },
        Value::Native(proc) => write!(f, "#<procedure:{}>", proc.name),
        Value::Void => Ok(()),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // top-level quoted data reads back as written
            Value::List(_) | Value::Pair(_) => {
                write!(f, "'")?;
                write_datum(f, self)
            }
            other => write_datum(f, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display() {
        assert_eq!(format!("{}", Value::Int(42)), "42");
        assert_eq!(format!("{}", Value::Int(-7)), "-7");
        assert_eq!(format!("{}", Value::Real(2.5)), "2.500000");
        assert_eq!(format!("{}", Value::Real(-0.5)), "-0.500000");
    }

    #[test]
    fn test_bool_display() {
        assert_eq!(format!("{}", Value::Bool(true)), "#t");
        assert_eq!(format!("{}", Value::Bool(false)), "#f");
    }

    #[test]
    fn test_char_and_string_display() {
        assert_eq!(format!("{}", Value::Char('a')), "#\\a");
        assert_eq!(format!("{}", Value::Str("hello".to_string())), "\"hello\"");
    }

    #[test]
    fn test_list_display() {
        let list = Value::List(vec![Value::Int(11), Value::Int(22), Value::Int(33)]);
        assert_eq!(format!("{}", list), "'(11 22 33)");

        let empty = Value::List(vec![]);
        assert_eq!(format!("{}", empty), "'()");

        // nested data carries no quote of its own
        let nested = Value::List(vec![
            Value::List(vec![Value::Int(1), Value::Int(2)]),
            Value::Int(3),
        ]);
        assert_eq!(format!("{}", nested), "'((1 2) 3)");
    }

    #[test]
    fn test_pair_display() {
        let pair = Value::Pair(Box::new((Value::Int(1), Value::Int(2))));
        assert_eq!(format!("{}", pair), "'(1 . 2)");

        let mixed = Value::Pair(Box::new((
            Value::Char('a'),
            Value::Str("b".to_string()),
        )));
        assert_eq!(format!("{}", mixed), "'(#\\a . \"b\")");
    }

    #[test]
    fn test_procedure_display() {
        let mut ast = crate::ast::Ast::new();
        let lambda = ast.alloc(crate::ast::NodeKind::Lambda {
            params: vec![],
            body: vec![],
        });

        let anonymous = Value::Closure { name: None, lambda };
        assert_eq!(format!("{}", anonymous), "#<procedure:anonymous>");

        let named = Value::Closure {
            name: Some("fact".to_string()),
            lambda,
        };
        assert_eq!(format!("{}", named), "#<procedure:fact>");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Int(0).is_truthy());
        assert!(Value::List(vec![]).is_truthy());
        assert!(Value::Void.is_truthy());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Int(1).type_name(), "number");
        assert_eq!(Value::Real(1.0).type_name(), "number");
        assert_eq!(Value::Str(String::new()).type_name(), "string");
        assert_eq!(Value::List(vec![]).type_name(), "list");
    }
}
