// ABOUTME: Full-pipeline integration tests driving lex, parse, decorate and eval together

use racketlet::source::SourceFile;
use racketlet::{error::Error, interpret, lexer};

/// Run a program through the whole pipeline and render the printable
/// results the way the binary would.
fn run(text: &str) -> Result<Vec<String>, Error> {
    let source = SourceFile::from_text("test.rkt", text)?;
    Ok(interpret(&source)?
        .iter()
        .map(|value| value.to_string())
        .collect())
}

fn run_ok(text: &str) -> Vec<String> {
    run(text).expect("program should evaluate")
}

// ===== The six end-to-end scenarios =====

#[test]
fn test_scenario_addition() {
    assert_eq!(run_ok("#lang racket\n(+ 1 2 3)"), vec!["6"]);
}

#[test]
fn test_scenario_factorial() {
    assert_eq!(
        run_ok("#lang racket\n(define (fact n) (if (= n 0) 1 (* n (fact (- n 1))))) (fact 5)"),
        vec!["120"]
    );
}

#[test]
fn test_scenario_let_star() {
    assert_eq!(
        run_ok("#lang racket\n(let* ([x 1] [y (+ x 2)]) (* x y))"),
        vec!["3"]
    );
}

#[test]
fn test_scenario_define_set() {
    assert_eq!(
        run_ok("#lang racket\n(define x 10) (set! x (+ x 5)) x"),
        vec!["15"]
    );
}

#[test]
fn test_scenario_map() {
    assert_eq!(
        run_ok("#lang racket\n(map (lambda (a b) (+ a b)) '(1 2 3) '(10 20 30))"),
        vec!["'(11 22 33)"]
    );
}

#[test]
fn test_scenario_cond() {
    assert_eq!(
        run_ok("#lang racket\n(cond [(= 1 2) \"no\"] [(= 1 1) \"yes\"] [else \"never\"])"),
        vec!["\"yes\""]
    );
}

// ===== Cross-cutting properties =====

#[test]
fn test_pipeline_is_deterministic() {
    let text = "#lang racket\n(define (f x) (* x x)) (f 3) '(1 2) (let ([y 1]) y)";
    assert_eq!(run_ok(text), run_ok(text));
}

#[test]
fn test_recursion_depth_does_not_change_results() {
    for k in [1, 10, 100] {
        let text = format!(
            "#lang racket\n(define (count n) (if (= n 0) 0 (+ 1 (count (- n 1))))) (count {})",
            k
        );
        assert_eq!(run_ok(&text), vec![k.to_string()]);
    }
}

#[test]
fn test_printed_constants_relex_to_one_token() {
    // print a constant, feed it back through the lexer, expect one token
    for (program, expected) in [
        ("#lang racket\n42", "42"),
        ("#lang racket\n-7", "-7"),
        ("#lang racket\n2.5", "2.500000"),
        ("#lang racket\n#t", "#t"),
        ("#lang racket\n#\\a", "#\\a"),
        ("#lang racket\n\"hello\"", "\"hello\""),
    ] {
        let printed = run_ok(program).join("");
        assert_eq!(printed, expected);

        let echo = format!("#lang racket\n{}", printed);
        let source = SourceFile::from_text("echo.rkt", &echo).expect("source");
        let tokens = lexer::lex(&source).expect("tokens");
        assert_eq!(tokens.len(), 2, "language token plus the constant: {}", printed);
    }
}

#[test]
fn test_multiple_results_print_in_order() {
    assert_eq!(
        run_ok("#lang racket\n1 2 (+ 1 2) \"x\""),
        vec!["1", "2", "3", "\"x\""]
    );
}

#[test]
fn test_define_and_set_print_nothing() {
    assert_eq!(
        run_ok("#lang racket\n(define x 1) (set! x 2)"),
        Vec::<String>::new()
    );
}

#[test]
fn test_comments_are_ignored() {
    assert_eq!(
        run_ok("#lang racket\n; leading comment\n(+ 1 ; inline\n 2)"),
        vec!["3"]
    );
}

// ===== Composite programs =====

#[test]
fn test_closures_and_higher_order_map() {
    let text = "#lang racket\n\
                (define (add-pairs xs ys) (map (lambda (a b) (+ a b)) xs ys))\n\
                (add-pairs '(1 2) '(3 4))";
    assert_eq!(run_ok(text), vec!["'(4 6)"]);
}

#[test]
fn test_letrec_mutual_recursion() {
    let text = "#lang racket\n\
                (letrec ([even! (lambda (n) (if (= n 0) #t (odd! (- n 1))))]\n\
                         [odd! (lambda (n) (if (= n 0) #f (even! (- n 1))))])\n\
                  (odd! 7))";
    assert_eq!(run_ok(text), vec!["#t"]);
}

#[test]
fn test_mixed_numeric_tower_end_to_end() {
    assert_eq!(
        run_ok("#lang racket\n(+ (* 2 3) (/ 10 2) (- 1))"),
        vec!["10"]
    );
    assert_eq!(run_ok("#lang racket\n(+ 1 (* 2 0.5))"), vec!["2.000000"]);
}

#[test]
fn test_string_sha256_addon() {
    assert_eq!(
        run_ok("#lang racket\n(string-sha256 \"abc\")"),
        vec!["\"ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad\""]
    );
}

#[test]
fn test_anonymous_call_in_context() {
    assert_eq!(
        run_ok("#lang racket\n(define base 40) ((lambda (x) (+ base x)) 2)"),
        vec!["42"]
    );
}

// ===== Failures surface as single errors =====

#[test]
fn test_lex_failure_surfaces() {
    assert!(matches!(run("(+ 1 2)"), Err(Error::Lex(_))));
    assert!(matches!(run("#lang racket\n{"), Err(Error::Lex(_))));
}

#[test]
fn test_parse_failure_surfaces() {
    assert!(matches!(run("#lang racket\n(+ 1"), Err(Error::Parse(_))));
    assert!(matches!(
        run("#lang racket\n(cond [else 1] [else 2])"),
        Err(Error::Parse(_))
    ));
}

#[test]
fn test_eval_failure_surfaces() {
    assert!(matches!(run("#lang racket\n(/ 1 0)"), Err(Error::Eval(_))));
    assert!(matches!(run("#lang racket\nghost"), Err(Error::Eval(_))));
    assert!(matches!(
        run("#lang racket\n(map (lambda (a) a) '(1) '(1 2))"),
        Err(Error::Eval(_))
    ));
}

#[test]
fn test_earlier_results_are_lost_on_later_error() {
    // evaluation aborts on the first error; nothing is returned
    assert!(run("#lang racket\n(+ 1 2) ghost").is_err());
}
