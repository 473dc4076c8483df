// ABOUTME: Library crate exposing the interpreter pipeline to the binary and tests

pub mod ast;
pub mod builtins;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod source;
pub mod value;

use error::Error;
use eval::Interp;
use source::SourceFile;
use value::Value;

/// Run the whole pipeline over a loaded source file: lex, parse, decorate,
/// evaluate. Returns the printable top-level results in order.
pub fn interpret(source: &SourceFile) -> Result<Vec<Value>, Error> {
    let tokens = lexer::lex(source)?;
    let mut ast = parser::parse(&tokens)?;
    scope::decorate(&mut ast);
    let mut interp = Interp::new(ast);
    Ok(interp.run()?)
}
