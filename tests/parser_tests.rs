// tests/parser_tests.rs

use json_transformer::ast::{BinOp, Expr, Program, Statement};
use json_transformer::lexer::Lexer;
use json_transformer::parser::{ParseError, Parser, parse_statement};

fn parse_expr(input: &str) -> Expr {
    Parser::new(Lexer::new(input)).unwrap().parse().unwrap()
}

fn name(n: &str) -> Expr {
    Expr::Name(n.to_string())
}

fn attr(object: Expr, n: &str) -> Expr {
    Expr::Attr {
        object: Box::new(object),
        name: n.to_string(),
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_attribute_and_index_chain() {
    let expr = parse_expr("src.items[0].name");
    let expected = attr(
        Expr::Index {
            object: Box::new(attr(name("src"), "items")),
            keys: vec![Expr::Integer(0)],
        },
        "name",
    );
    assert_eq!(expr, expected);
}

#[test]
fn test_tuple_index() {
    let expr = parse_expr("src['a', 'b']");
    assert_eq!(
        expr,
        Expr::Index {
            object: Box::new(name("src")),
            keys: vec![Expr::String("a".into()), Expr::String("b".into())],
        }
    );
}

#[test]
fn test_precedence() {
    let expr = parse_expr("1 + 2 * 3");
    match expr {
        Expr::BinaryOp {
            op: BinOp::Add,
            right,
            ..
        } => assert!(matches!(
            *right,
            Expr::BinaryOp {
                op: BinOp::Multiply,
                ..
            }
        )),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_parentheses() {
    let expr = parse_expr("(1 + 2) * 3");
    assert!(matches!(
        expr,
        Expr::BinaryOp {
            op: BinOp::Multiply,
            ..
        }
    ));
}

#[test]
fn test_not_in() {
    let expr = parse_expr("'x' not in src.tags");
    assert!(matches!(
        expr,
        Expr::BinaryOp {
            op: BinOp::NotIn,
            ..
        }
    ));
}

#[test]
fn test_logical_precedence() {
    // and binds tighter than or
    let expr = parse_expr("a or b and not c");
    match expr {
        Expr::BinaryOp {
            op: BinOp::Or,
            right,
            ..
        } => assert!(matches!(*right, Expr::BinaryOp { op: BinOp::And, .. })),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_negative_literal_folds() {
    assert_eq!(parse_expr("-3"), Expr::Integer(-3));
    assert_eq!(parse_expr("-src.n"), Expr::Negate(Box::new(attr(name("src"), "n"))));
}

#[test]
fn test_method_and_function_calls() {
    let expr = parse_expr("len(src.name.upper())");
    match expr {
        Expr::Call { function, args } => {
            assert_eq!(function, "len");
            assert!(matches!(&args[0], Expr::MethodCall { method, .. } if method == "upper"));
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_collection_literals() {
    assert_eq!(
        parse_expr("{'a': 1, \"b\": [true, None]}"),
        Expr::Object(vec![
            ("a".to_string(), Expr::Integer(1)),
            (
                "b".to_string(),
                Expr::Array(vec![Expr::Boolean(true), Expr::Null])
            ),
        ])
    );
}

#[test]
fn test_trailing_tokens_rejected() {
    let result = Parser::new(Lexer::new("1 2")).unwrap().parse();
    assert!(matches!(result, Err(ParseError::UnexpectedToken { .. })));
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_assignment() {
    let statement = parse_statement("dst.a = 1").unwrap();
    assert_eq!(
        statement,
        Statement::Assign {
            target: attr(name("dst"), "a"),
            op: None,
            value: Expr::Integer(1),
        }
    );
}

#[test]
fn test_augmented_assignment() {
    let statement = parse_statement("dst.count += 2").unwrap();
    assert!(matches!(
        statement,
        Statement::Assign {
            op: Some(BinOp::Add),
            ..
        }
    ));
}

#[test]
fn test_delete() {
    let statement = parse_statement("del dst.messages").unwrap();
    assert_eq!(statement, Statement::Delete(attr(name("dst"), "messages")));
}

#[test]
fn test_blank_and_comment_are_pass() {
    assert_eq!(parse_statement("").unwrap(), Statement::Pass);
    assert_eq!(parse_statement("# note").unwrap(), Statement::Pass);
}

#[test]
fn test_bare_expression() {
    assert!(matches!(
        parse_statement("dst.placeholder").unwrap(),
        Statement::Expr(_)
    ));
}

#[test]
fn test_invalid_targets() {
    assert_eq!(parse_statement("1 = 2"), Err(ParseError::InvalidTarget));
    assert_eq!(parse_statement("dst = 2"), Err(ParseError::InvalidTarget));
    assert_eq!(parse_statement("len(dst) = 2"), Err(ParseError::InvalidTarget));
    assert_eq!(parse_statement("del 5"), Err(ParseError::InvalidTarget));
}

#[test]
fn test_compile_reports_offending_statement() {
    let err = Program::compile(["dst.a = 1", "dst.b = (", "dst.c = 3"]).unwrap_err();
    assert_eq!(err.index, 1);
    assert_eq!(err.statement, "dst.b = (");
}

#[test]
fn test_compile_strips_line_breaks() {
    let program = Program::compile(["dst.a = 1\n", "\r\n"]).unwrap();
    let texts: Vec<&str> = program.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["dst.a = 1", ""]);
}
