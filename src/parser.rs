// ABOUTME: Recursive-descent parser walking the token stream into the AST arena

use crate::ast::{Ast, CallTarget, ClauseKind, LetKind, NodeId, NodeKind, Numeric, Slot};
use crate::error::ParseError;
use crate::lexer::{Token, TokenKind};

/// Parse a token stream into a decorated-ready tree. The result's root is
/// the Program node; Language and Comment tokens are skipped wherever they
/// appear.
pub fn parse(tokens: &[Token]) -> Result<Ast, ParseError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        ast: Ast::new(),
    };
    parser.program()?;
    Ok(parser.ast)
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    ast: Ast,
}

impl<'t> Parser<'t> {
    fn program(&mut self) -> Result<(), ParseError> {
        let root = self.ast.alloc(NodeKind::Program { body: Vec::new() });
        self.ast.set_root(root);

        let mut body = Vec::new();
        while self.pos < self.tokens.len() {
            if let Some(node) = self.walk()? {
                body.push(node);
            }
        }

        if let NodeKind::Program { body: slot } = &mut self.ast.node_mut(root).kind {
            *slot = body;
        }
        Ok(())
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<&'t Token, ParseError> {
        let token = self.tokens.get(self.pos).ok_or(ParseError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(token)
    }

    fn at_punct(&self, text: &str) -> bool {
        matches!(self.peek(), Some(t) if t.kind == TokenKind::Punctuation && t.text == text)
    }

    fn expect_punct(&mut self, text: &str, form: &'static str) -> Result<(), ParseError> {
        let token = self.next()?;
        if token.kind == TokenKind::Punctuation && token.text == text {
            Ok(())
        } else {
            Err(ParseError::BadSyntax(form))
        }
    }

    /// One step of the walk. Language and Comment tokens yield nothing.
    fn walk(&mut self) -> Result<Option<NodeId>, ParseError> {
        let token = self.next()?;
        match token.kind {
            TokenKind::Language | TokenKind::Comment => Ok(None),

            TokenKind::Identifier => {
                let node = match token.text.as_str() {
                    "null" => self.ast.alloc(NodeKind::Null),
                    "empty" => self.ast.alloc(NodeKind::Empty),
                    name => self.ast.alloc(NodeKind::Binding {
                        name: name.to_string(),
                        init: None,
                        slot: Slot::Unbound,
                    }),
                };
                Ok(Some(node))
            }

            TokenKind::Number => {
                let value = parse_number(&token.text)?;
                let node = self.ast.alloc(NodeKind::Number {
                    text: token.text.clone(),
                    value,
                });
                Ok(Some(node))
            }

            TokenKind::String => Ok(Some(self.ast.alloc(NodeKind::Str(token.text.clone())))),

            TokenKind::Character => {
                let ch = token
                    .text
                    .chars()
                    .next()
                    .ok_or(ParseError::BadSyntax("character"))?;
                Ok(Some(self.ast.alloc(NodeKind::Char(ch))))
            }

            TokenKind::Boolean => Ok(Some(self.ast.alloc(NodeKind::Bool(token.text == "t")))),

            TokenKind::Punctuation => match token.text.as_str() {
                "(" => self.compound().map(Some),
                "'" => self.quoted().map(Some),
                other => Err(ParseError::UnexpectedToken(other.to_string())),
            },
        }
    }

    /// Walk until a real expression turns up (skipping comments).
    fn walk_expr(&mut self) -> Result<NodeId, ParseError> {
        loop {
            if let Some(node) = self.walk()? {
                return Ok(node);
            }
        }
    }

    /// Expressions collected up to (but not past) a closing delimiter.
    fn walk_until(&mut self, closing: &str) -> Result<Vec<NodeId>, ParseError> {
        let mut nodes = Vec::new();
        while !self.at_punct(closing) {
            if let Some(node) = self.walk()? {
                nodes.push(node);
            }
        }
        self.pos += 1; // the delimiter itself
        Ok(nodes)
    }

    /// A parenthesised form: special forms by head keyword, otherwise a call.
    fn compound(&mut self) -> Result<NodeId, ParseError> {
        let head = self.peek().ok_or(ParseError::UnexpectedEnd)?;

        if head.kind == TokenKind::Identifier {
            match head.text.as_str() {
                "let" => return self.lets(LetKind::Let, "let"),
                "let*" => return self.lets(LetKind::LetStar, "let*"),
                "letrec" => return self.lets(LetKind::LetRec, "letrec"),
                "define" => return self.define(),
                "lambda" => return self.lambda(),
                "if" => return self.if_form(),
                "and" => return self.and_or(true),
                "or" => return self.and_or(false),
                "not" => return self.not_form(),
                "cond" => return self.cond(),
                "set!" => return self.set_form(),
                _ => return self.named_call(),
            }
        }

        self.anonymous_call()
    }

    /// `(let ([name expr] …) body …)` and the let*/letrec variants.
    fn lets(&mut self, kind: LetKind, form: &'static str) -> Result<NodeId, ParseError> {
        self.pos += 1; // keyword
        self.expect_punct("(", form)?;

        let mut bindings = Vec::new();
        while !self.at_punct(")") {
            self.expect_punct("[", form)?;

            let name = self.next()?;
            if name.kind != TokenKind::Identifier {
                return Err(ParseError::BadSyntax(form));
            }
            let init = self.walk_expr()?;
            bindings.push(self.ast.alloc(NodeKind::Binding {
                name: name.text.clone(),
                init: Some(init),
                slot: Slot::Unbound,
            }));

            self.expect_punct("]", form)?;
        }
        self.pos += 1; // ')' ending the binding form

        let body = self.walk_until(")")?;
        if body.is_empty() {
            return Err(ParseError::BadSyntax(form));
        }

        Ok(self.ast.alloc(NodeKind::Lets {
            kind,
            bindings,
            body,
        }))
    }

    /// `(define name expr)` or the function shorthand
    /// `(define (name param …) body …)`.
    fn define(&mut self) -> Result<NodeId, ParseError> {
        self.pos += 1; // keyword
        let token = self.next()?;

        let binding = match token.kind {
            TokenKind::Identifier => {
                let name = token.text.clone();
                let init = self.walk_expr()?;
                self.expect_punct(")", "define")?;
                self.ast.alloc(NodeKind::Binding {
                    name,
                    init: Some(init),
                    slot: Slot::Unbound,
                })
            }
            TokenKind::Punctuation if token.text == "(" => {
                let name = self.next()?;
                if name.kind != TokenKind::Identifier {
                    return Err(ParseError::BadSyntax("define"));
                }
                let params = self.params_until_close("define")?;
                let body = self.walk_until(")")?;
                if body.is_empty() {
                    return Err(ParseError::BadSyntax("define"));
                }
                let lambda = self.ast.alloc(NodeKind::Lambda { params, body });
                self.ast.alloc(NodeKind::Binding {
                    name: name.text.clone(),
                    init: Some(lambda),
                    slot: Slot::Unbound,
                })
            }
            _ => return Err(ParseError::BadSyntax("define")),
        };

        Ok(self.ast.alloc(NodeKind::Define { binding }))
    }

    /// `(lambda (param …) body …)`.
    fn lambda(&mut self) -> Result<NodeId, ParseError> {
        self.pos += 1; // keyword
        self.expect_punct("(", "lambda")?;
        let params = self.params_until_close("lambda")?;

        let body = self.walk_until(")")?;
        if body.is_empty() {
            return Err(ParseError::BadSyntax("lambda"));
        }

        Ok(self.ast.alloc(NodeKind::Lambda { params, body }))
    }

    /// Identifier parameters up to the closing paren of a parameter list.
    fn params_until_close(&mut self, form: &'static str) -> Result<Vec<NodeId>, ParseError> {
        let mut params = Vec::new();
        while !self.at_punct(")") {
            let token = self.next()?;
            if token.kind != TokenKind::Identifier {
                return Err(ParseError::BadSyntax(form));
            }
            params.push(self.ast.alloc(NodeKind::Binding {
                name: token.text.clone(),
                init: None,
                slot: Slot::Unbound,
            }));
        }
        self.pos += 1; // ')'
        Ok(params)
    }

    /// `(if test then else)` — exactly three sub-expressions.
    fn if_form(&mut self) -> Result<NodeId, ParseError> {
        self.pos += 1; // keyword
        let test = self.walk_expr()?;
        let then = self.walk_expr()?;
        let els = self.walk_expr()?;
        self.expect_punct(")", "if")?;
        Ok(self.ast.alloc(NodeKind::If { test, then, els }))
    }

    /// `(and …)` / `(or …)` — zero or more sub-expressions.
    fn and_or(&mut self, is_and: bool) -> Result<NodeId, ParseError> {
        self.pos += 1; // keyword
        let exprs = self.walk_until(")")?;
        let node = if is_and {
            NodeKind::And { exprs }
        } else {
            NodeKind::Or { exprs }
        };
        Ok(self.ast.alloc(node))
    }

    /// `(not expr)` — exactly one sub-expression.
    fn not_form(&mut self) -> Result<NodeId, ParseError> {
        self.pos += 1; // keyword
        let expr = self.walk_expr()?;
        self.expect_punct(")", "not")?;
        Ok(self.ast.alloc(NodeKind::Not { expr }))
    }

    /// `(cond [test then …] … [else then …])` — at most one else, last.
    fn cond(&mut self) -> Result<NodeId, ParseError> {
        self.pos += 1; // keyword
        let mut clauses = Vec::new();
        let mut kinds = Vec::new();

        while !self.at_punct(")") {
            self.expect_punct("[", "cond")?;

            let is_else =
                matches!(self.peek(), Some(t) if t.kind == TokenKind::Identifier && t.text == "else");

            let clause = if is_else {
                self.pos += 1; // 'else'
                let body = self.walk_until("]")?;
                kinds.push(ClauseKind::Else);
                self.ast.alloc(NodeKind::CondClause {
                    kind: ClauseKind::Else,
                    test: None,
                    body,
                })
            } else {
                let test = self.walk_expr()?;
                let body = self.walk_until("]")?;
                kinds.push(ClauseKind::TestThen);
                self.ast.alloc(NodeKind::CondClause {
                    kind: ClauseKind::TestThen,
                    test: Some(test),
                    body,
                })
            };
            clauses.push(clause);
        }
        self.pos += 1; // ')'

        if clauses.is_empty() {
            return Err(ParseError::BadSyntax("cond"));
        }
        let else_count = kinds.iter().filter(|k| **k == ClauseKind::Else).count();
        if else_count > 1 || (else_count == 1 && kinds.last() != Some(&ClauseKind::Else)) {
            return Err(ParseError::BadSyntax("cond"));
        }

        Ok(self.ast.alloc(NodeKind::Cond { clauses }))
    }

    /// `(set! name expr)`.
    fn set_form(&mut self) -> Result<NodeId, ParseError> {
        self.pos += 1; // keyword
        let token = self.next()?;
        if token.kind != TokenKind::Identifier {
            return Err(ParseError::BadSyntax("set!"));
        }
        let target = self.ast.alloc(NodeKind::Binding {
            name: token.text.clone(),
            init: None,
            slot: Slot::Unbound,
        });
        let expr = self.walk_expr()?;
        self.expect_punct(")", "set!")?;
        Ok(self.ast.alloc(NodeKind::Set { target, expr }))
    }

    /// `(name operand …)`.
    fn named_call(&mut self) -> Result<NodeId, ParseError> {
        let name = self.next()?.text.clone();
        let operands = self.walk_until(")")?;
        Ok(self.ast.alloc(NodeKind::Call {
            target: CallTarget::Named(name),
            operands,
        }))
    }

    /// `((lambda …) operand …)` — the head must parse as a lambda form.
    fn anonymous_call(&mut self) -> Result<NodeId, ParseError> {
        let head = self.walk_expr()?;
        if !matches!(self.ast.node(head).kind, NodeKind::Lambda { .. }) {
            return Err(ParseError::BadSyntax("call expression"));
        }
        let operands = self.walk_until(")")?;
        Ok(self.ast.alloc(NodeKind::Call {
            target: CallTarget::Lambda(head),
            operands,
        }))
    }

    /// Quoted data after a `'` token: the empty list, a dotted pair, or a
    /// list of walked elements.
    fn quoted(&mut self) -> Result<NodeId, ParseError> {
        self.expect_punct("(", "quote")?;

        if self.at_punct(")") {
            self.pos += 1;
            return Ok(self.ast.alloc(NodeKind::List(Vec::new())));
        }

        let first = self.walk_expr()?;

        if self.at_punct(".") {
            self.pos += 1; // '.'
            let cdr = self.walk_expr()?;
            self.expect_punct(")", "pair")?;
            return Ok(self.ast.alloc(NodeKind::Pair(first, cdr)));
        }

        let mut items = vec![first];
        items.extend(self.walk_until(")")?);
        Ok(self.ast.alloc(NodeKind::List(items)))
    }
}

fn parse_number(text: &str) -> Result<Numeric, ParseError> {
    if text.contains('.') {
        text.parse::<f64>()
            .map(Numeric::Real)
            .map_err(|_| ParseError::NumberOutOfRange(text.to_string()))
    } else {
        text.parse::<i64>()
            .map(Numeric::Int)
            .map_err(|_| ParseError::NumberOutOfRange(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;
    use crate::source::SourceFile;

    fn parse_text(text: &str) -> Result<Ast, ParseError> {
        let source = SourceFile::from_text("test.rkt", text).expect("source");
        let tokens = lexer::lex(&source).expect("tokens");
        parse(&tokens)
    }

    fn program_body(ast: &Ast) -> Vec<NodeId> {
        let root = ast.root().expect("root");
        match &ast.node(root).kind {
            NodeKind::Program { body } => body.clone(),
            other => panic!("expected Program, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_literals() {
        let ast = parse_text("#lang racket\n42 2.5 \"hi\" #t #\\a null empty").unwrap();
        let body = program_body(&ast);
        assert_eq!(body.len(), 7);
        assert!(
            matches!(&ast.node(body[0]).kind, NodeKind::Number { value: Numeric::Int(42), .. })
        );
        assert!(
            matches!(&ast.node(body[1]).kind, NodeKind::Number { value: Numeric::Real(r), .. } if *r == 2.5)
        );
        assert!(matches!(&ast.node(body[2]).kind, NodeKind::Str(s) if s == "hi"));
        assert!(matches!(&ast.node(body[3]).kind, NodeKind::Bool(true)));
        assert!(matches!(&ast.node(body[4]).kind, NodeKind::Char('a')));
        assert!(matches!(&ast.node(body[5]).kind, NodeKind::Null));
        assert!(matches!(&ast.node(body[6]).kind, NodeKind::Empty));
    }

    #[test]
    fn test_number_keeps_source_text() {
        let ast = parse_text("#lang racket\n-17").unwrap();
        let body = program_body(&ast);
        match &ast.node(body[0]).kind {
            NodeKind::Number { text, value } => {
                assert_eq!(text, "-17");
                assert!(matches!(value, Numeric::Int(-17)));
            }
            other => panic!("expected number, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_named_call() {
        let ast = parse_text("#lang racket\n(+ 1 2 3)").unwrap();
        let body = program_body(&ast);
        match &ast.node(body[0]).kind {
            NodeKind::Call { target, operands } => {
                assert!(matches!(target, CallTarget::Named(n) if n == "+"));
                assert_eq!(operands.len(), 3);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_anonymous_call() {
        let ast = parse_text("#lang racket\n((lambda (x) x) 5)").unwrap();
        let body = program_body(&ast);
        match &ast.node(body[0]).kind {
            NodeKind::Call { target, operands } => {
                let CallTarget::Lambda(head) = target else {
                    panic!("expected lambda head");
                };
                assert!(matches!(ast.node(*head).kind, NodeKind::Lambda { .. }));
                assert_eq!(operands.len(), 1);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_anonymous_call_head_must_be_lambda() {
        assert!(matches!(
            parse_text("#lang racket\n((+ 1 2) 3)"),
            Err(ParseError::BadSyntax("call expression"))
        ));
    }

    #[test]
    fn test_parse_define_plain() {
        let ast = parse_text("#lang racket\n(define x 10)").unwrap();
        let body = program_body(&ast);
        match &ast.node(body[0]).kind {
            NodeKind::Define { binding } => {
                assert_eq!(ast.binding_name(*binding), Some("x"));
                let init = ast.binding_init(*binding).expect("init");
                assert!(matches!(
                    ast.node(init).kind,
                    NodeKind::Number { value: Numeric::Int(10), .. }
                ));
            }
            other => panic!("expected define, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_define_shorthand() {
        let ast = parse_text("#lang racket\n(define (add a b) (+ a b))").unwrap();
        let body = program_body(&ast);
        match &ast.node(body[0]).kind {
            NodeKind::Define { binding } => {
                assert_eq!(ast.binding_name(*binding), Some("add"));
                let init = ast.binding_init(*binding).expect("init");
                match &ast.node(init).kind {
                    NodeKind::Lambda { params, body } => {
                        assert_eq!(params.len(), 2);
                        assert_eq!(body.len(), 1);
                        assert_eq!(ast.binding_name(params[0]), Some("a"));
                        assert_eq!(ast.binding_name(params[1]), Some("b"));
                    }
                    other => panic!("expected lambda, got {:?}", other),
                }
            }
            other => panic!("expected define, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_let_family() {
        for (source, kind) in [
            ("#lang racket\n(let ([x 1] [y 2]) (+ x y))", LetKind::Let),
            ("#lang racket\n(let* ([x 1] [y 2]) (+ x y))", LetKind::LetStar),
            ("#lang racket\n(letrec ([x 1] [y 2]) (+ x y))", LetKind::LetRec),
        ] {
            let ast = parse_text(source).unwrap();
            let body = program_body(&ast);
            match &ast.node(body[0]).kind {
                NodeKind::Lets {
                    kind: parsed,
                    bindings,
                    body,
                } => {
                    assert_eq!(*parsed, kind);
                    assert_eq!(bindings.len(), 2);
                    assert_eq!(body.len(), 1);
                }
                other => panic!("expected let form, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_let_requires_brackets_and_body() {
        assert!(matches!(
            parse_text("#lang racket\n(let ((x 1)) x)"),
            Err(ParseError::BadSyntax("let"))
        ));
        assert!(matches!(
            parse_text("#lang racket\n(let ([x 1]))"),
            Err(ParseError::BadSyntax("let"))
        ));
    }

    #[test]
    fn test_parse_if_and_not() {
        let ast = parse_text("#lang racket\n(if #t 1 2) (not #f)").unwrap();
        let body = program_body(&ast);
        assert!(matches!(ast.node(body[0]).kind, NodeKind::If { .. }));
        assert!(matches!(ast.node(body[1]).kind, NodeKind::Not { .. }));
    }

    #[test]
    fn test_if_needs_three_parts() {
        assert!(parse_text("#lang racket\n(if #t 1)").is_err());
    }

    #[test]
    fn test_parse_and_or_empty() {
        let ast = parse_text("#lang racket\n(and) (or)").unwrap();
        let body = program_body(&ast);
        assert!(matches!(&ast.node(body[0]).kind, NodeKind::And { exprs } if exprs.is_empty()));
        assert!(matches!(&ast.node(body[1]).kind, NodeKind::Or { exprs } if exprs.is_empty()));
    }

    #[test]
    fn test_parse_cond() {
        let ast =
            parse_text("#lang racket\n(cond [(= 1 2) \"no\"] [else \"yes\"])").unwrap();
        let body = program_body(&ast);
        match &ast.node(body[0]).kind {
            NodeKind::Cond { clauses } => {
                assert_eq!(clauses.len(), 2);
                assert!(matches!(
                    ast.node(clauses[0]).kind,
                    NodeKind::CondClause { kind: ClauseKind::TestThen, .. }
                ));
                assert!(matches!(
                    ast.node(clauses[1]).kind,
                    NodeKind::CondClause { kind: ClauseKind::Else, .. }
                ));
            }
            other => panic!("expected cond, got {:?}", other),
        }
    }

    #[test]
    fn test_cond_else_must_be_last_and_single() {
        assert!(matches!(
            parse_text("#lang racket\n(cond [else 1] [(= 1 1) 2])"),
            Err(ParseError::BadSyntax("cond"))
        ));
        assert!(matches!(
            parse_text("#lang racket\n(cond [else 1] [else 2])"),
            Err(ParseError::BadSyntax("cond"))
        ));
        assert!(matches!(
            parse_text("#lang racket\n(cond)"),
            Err(ParseError::BadSyntax("cond"))
        ));
    }

    #[test]
    fn test_parse_set() {
        let ast = parse_text("#lang racket\n(set! x 5)").unwrap();
        let body = program_body(&ast);
        match &ast.node(body[0]).kind {
            NodeKind::Set { target, .. } => {
                assert_eq!(ast.binding_name(*target), Some("x"));
            }
            other => panic!("expected set!, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_quoted_data() {
        let ast = parse_text("#lang racket\n'() '(1 2 3) '(1 . 2)").unwrap();
        let body = program_body(&ast);
        assert!(matches!(&ast.node(body[0]).kind, NodeKind::List(items) if items.is_empty()));
        assert!(matches!(&ast.node(body[1]).kind, NodeKind::List(items) if items.len() == 3));
        assert!(matches!(ast.node(body[2]).kind, NodeKind::Pair(_, _)));
    }

    #[test]
    fn test_quote_requires_paren() {
        assert!(matches!(
            parse_text("#lang racket\n'x"),
            Err(ParseError::BadSyntax("quote"))
        ));
    }

    #[test]
    fn test_comments_are_skipped_everywhere() {
        let ast = parse_text("#lang racket\n(+ 1 ; half way\n 2)").unwrap();
        let body = program_body(&ast);
        match &ast.node(body[0]).kind {
            NodeKind::Call { operands, .. } => assert_eq!(operands.len(), 2),
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_close_paren() {
        assert!(matches!(
            parse_text("#lang racket\n(+ 1 2"),
            Err(ParseError::UnexpectedEnd)
        ));
    }

    #[test]
    fn test_stray_close_paren() {
        assert!(matches!(
            parse_text("#lang racket\n)"),
            Err(ParseError::UnexpectedToken(t)) if t == ")"
        ));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let text = "#lang racket\n(define (f x) (* x x)) (f 4) '(1 2)";
        let first = format!("{:?}", parse_text(text).unwrap());
        let second = format!("{:?}", parse_text(text).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_number_out_of_range() {
        assert!(matches!(
            parse_text("#lang racket\n99999999999999999999"),
            Err(ParseError::NumberOutOfRange(_))
        ));
    }
}
