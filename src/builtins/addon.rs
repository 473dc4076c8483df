//! Add-on natives: `string-sha256`
//!
//! `(string-sha256 "abc")` => the 64-character lowercase hex SHA-256 digest.

use crate::error::EvalError;
use crate::eval::Interp;
use crate::value::Value;
use sha2::{Digest, Sha256};

pub fn string_sha256(_interp: &mut Interp, args: &[Value]) -> Result<Value, EvalError> {
    let text = match args.first() {
        Some(Value::Str(text)) => text,
        Some(other) => return Err(EvalError::type_error("string-sha256", "string", other, 0)),
        None => return Err(EvalError::arity_error("string-sha256", "1", 0)),
    };

    let digest = Sha256::digest(text.as_bytes());
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{:02x}", byte));
    }
    Ok(Value::Str(hex))
}
