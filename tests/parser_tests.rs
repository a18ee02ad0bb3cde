// tests/parser_tests.rs

use num_bigint::BigInt;
use pretty_assertions::assert_eq;
use refjson::ast::{Expr, Literal};
use refjson::error::Error;
use refjson::evaluator::EvalError;
use refjson::lexer::{Lexer, LexerConfig, Mode};
use refjson::parser::{ParseErrorCode, Parser, ParserConfig};
use refjson::Edition;

fn parse(input: &str) -> Expr {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer).unwrap();
    parser.parse().unwrap()
}

fn parse_with(input: &str, config: ParserConfig) -> Result<Expr, Error> {
    let lexer_config = LexerConfig::for_edition(Edition::MAX, config.mode);
    let mut parser = Parser::with_config(Lexer::with_config(input, lexer_config), config)?;
    parser.parse()
}

fn parse_error(input: &str, config: ParserConfig) -> ParseErrorCode {
    match parse_with(input, config) {
        Err(Error::Parse(error)) => error.code,
        other => panic!("expected a parse error for {:?}, got {:?}", input, other),
    }
}

fn literal(expr: &Expr) -> &Literal {
    match expr {
        Expr::Literal { value, .. } => value,
        other => panic!("expected a literal, got {:?}", other),
    }
}

fn keys(expr: &Expr) -> Vec<&str> {
    match expr {
        Expr::Object { properties, .. } => properties.iter().map(|p| p.key.as_str()).collect(),
        other => panic!("expected an object, got {:?}", other),
    }
}

// ============================================================================
// Literals and containers
// ============================================================================

#[test]
fn test_scalar_literals() {
    assert_eq!(literal(&parse("null")), &Literal::Null);
    assert_eq!(literal(&parse("true")), &Literal::Boolean(true));
    assert_eq!(literal(&parse("-2.5")), &Literal::Number(-2.5));
    assert_eq!(literal(&parse("'hi'")), &Literal::String("hi".into()));
    assert_eq!(literal(&parse("7n")), &Literal::BigInt(BigInt::from(7)));
}

#[test]
fn test_literal_keeps_raw_text() {
    match parse("0x1F") {
        Expr::Literal { raw, value, .. } => {
            assert_eq!(raw, "0x1F");
            assert_eq!(value, Literal::Number(31.0));
        }
        other => panic!("unexpected expression: {:?}", other),
    }
}

#[test]
fn test_nested_containers() {
    let expr = parse("{a: [1, {b: 2}], 'c-d': {}}");
    assert_eq!(keys(&expr), vec!["a", "c-d"]);

    let Expr::Object { properties, .. } = &expr else {
        panic!("expected an object");
    };
    match &properties[0].value {
        Expr::Array { elements, .. } => {
            assert_eq!(elements.len(), 2);
            assert_eq!(keys(&elements[1]), vec!["b"]);
        }
        other => panic!("expected an array, got {:?}", other),
    }
}

#[test]
fn test_trailing_commas() {
    match parse("[1, 2,]") {
        Expr::Array { elements, .. } => assert_eq!(elements.len(), 2),
        other => panic!("expected an array, got {:?}", other),
    }
    assert_eq!(keys(&parse("{a: 1, b: 2,}")), vec!["a", "b"]);
}

#[test]
fn test_comment_only_bodies() {
    assert_eq!(keys(&parse("{ // nothing here\n }")), Vec::<&str>::new());
    match parse("[ /* empty */ ]") {
        Expr::Array { elements, .. } => assert!(elements.is_empty()),
        other => panic!("expected an array, got {:?}", other),
    }
}

#[test]
fn test_duplicate_keys_are_kept_in_tree() {
    assert_eq!(keys(&parse("{a: 1, a: 2}")), vec!["a", "a"]);
}

#[test]
fn test_keyword_and_numeric_keys() {
    assert_eq!(
        keys(&parse("{null: 1, true: 2, Infinity: 3, 1: 4, 0x10: 5, 1.5: 6}")),
        vec!["null", "true", "Infinity", "1", "16", "1.5"]
    );
}

#[test]
fn test_signed_numeric_key_rejected() {
    assert_eq!(
        parse_error("{-1: 0}", ParserConfig::default()),
        ParseErrorCode::ExpectedPropertyKey
    );
}

// ============================================================================
// References and templates
// ============================================================================

#[test]
fn test_identifier_reference() {
    match parse("port") {
        Expr::Identifier { name, .. } => assert_eq!(name, "port"),
        other => panic!("expected an identifier, got {:?}", other),
    }
}

#[test]
fn test_member_chain() {
    let expr = parse("server.http.port");
    assert_eq!(expr.reference_segments(), Some(vec!["server", "http", "port"]));
    assert_eq!(expr.reference_path(), "server.http.port");
}

#[test]
fn test_keywords_after_dot() {
    let expr = parse("flags.null.true");
    assert_eq!(expr.reference_segments(), Some(vec!["flags", "null", "true"]));
}

#[test]
fn test_template_structure() {
    match parse("`${host}:${port}/x`") {
        Expr::Template {
            quasis,
            expressions,
            ..
        } => {
            assert_eq!(quasis, vec!["".to_string(), ":".to_string(), "/x".to_string()]);
            assert_eq!(expressions.len(), 2);
            assert_eq!(expressions[1].reference_path(), "port");
        }
        other => panic!("expected a template, got {:?}", other),
    }
}

#[test]
fn test_template_without_interpolation_is_template() {
    match parse("`plain`") {
        Expr::Template {
            quasis,
            expressions,
            ..
        } => {
            assert_eq!(quasis, vec!["plain".to_string()]);
            assert!(expressions.is_empty());
        }
        other => panic!("expected a template, got {:?}", other),
    }
}

#[test]
fn test_references_disabled() {
    let config = ParserConfig {
        allow_references: false,
        ..ParserConfig::default()
    };
    assert_eq!(parse_error("{a: b}", config), ParseErrorCode::ReferencesNotAllowed);
}

// ============================================================================
// Safe integers
// ============================================================================

#[test]
fn test_unsafe_integer_promoted_to_bigint() {
    assert_eq!(
        literal(&parse("9007199254740993")),
        &Literal::BigInt(BigInt::from(9_007_199_254_740_993u64))
    );
    assert_eq!(
        literal(&parse("-9_007_199_254_740_993")),
        &Literal::BigInt(BigInt::from(-9_007_199_254_740_993i64))
    );
}

#[test]
fn test_safe_integer_stays_number() {
    assert_eq!(
        literal(&parse("9007199254740991")),
        &Literal::Number(9_007_199_254_740_991.0)
    );
    assert_eq!(literal(&parse("1e300")), &Literal::Number(1e300));
}

#[test]
fn test_strict_bigint_rejects_unsafe_integer() {
    let config = ParserConfig {
        strict_bigint: true,
        ..ParserConfig::default()
    };
    match parse_with("[1, 9007199254740993]", config) {
        Err(Error::Eval(EvalError::UnsafeInteger { raw, .. })) => {
            assert_eq!(raw, "9007199254740993")
        }
        other => panic!("expected an unsafe integer error, got {:?}", other),
    }
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_empty_document() {
    assert_eq!(parse_error("", ParserConfig::default()), ParseErrorCode::ExpectedValue);
    assert_eq!(
        parse_error("// only a comment", ParserConfig::default()),
        ParseErrorCode::ExpectedValue
    );
}

#[test]
fn test_trailing_garbage() {
    assert_eq!(parse_error("1 2", ParserConfig::default()), ParseErrorCode::UnexpectedToken);
}

#[test]
fn test_missing_colon_and_comma() {
    assert_eq!(parse_error("{a 1}", ParserConfig::default()), ParseErrorCode::ExpectedColon);
    assert_eq!(
        parse_error("{a: 1 b: 2}", ParserConfig::default()),
        ParseErrorCode::ExpectedCommaOrClose
    );
    assert_eq!(
        parse_error("[1 2]", ParserConfig::default()),
        ParseErrorCode::ExpectedCommaOrClose
    );
}

#[test]
fn test_unclosed_delimiters() {
    assert_eq!(parse_error("[1, 2", ParserConfig::default()), ParseErrorCode::UnclosedDelimiter);
    assert_eq!(parse_error("{a: 1,", ParserConfig::default()), ParseErrorCode::UnclosedDelimiter);
}

#[test]
fn test_elision_rejected() {
    assert_eq!(parse_error("[1,,2]", ParserConfig::default()), ParseErrorCode::ExpectedValue);
}

#[test]
fn test_error_position() {
    let error = parse_with("{\n  a: 1,\n  b 2\n}", ParserConfig::default()).unwrap_err();
    let span = error.span();
    assert_eq!((span.start.line, span.start.column), (3, 5));
    assert_eq!(error.code(), "EXPECTED_COLON");
}

#[test]
fn test_strict_json_grammar() {
    let strict = ParserConfig {
        mode: Mode::StrictJson,
        allow_references: false,
        ..ParserConfig::default()
    };
    assert_eq!(parse_error("[1,]", strict), ParseErrorCode::TrailingComma);
    assert_eq!(parse_error(r#"{"a": 1,}"#, strict), ParseErrorCode::TrailingComma);
    assert_eq!(parse_error("{a: 1}", strict), ParseErrorCode::UnquotedKey);
    assert!(parse_with(r#"{"a": [1, 2.5, "x", null]}"#, strict).is_ok());
}

#[test]
fn test_depth_limit() {
    let config = ParserConfig {
        max_depth: 3,
        ..ParserConfig::default()
    };
    assert!(parse_with("[[[1]]]", config).is_ok());
    assert_eq!(parse_error("[[[[1]]]]", config), ParseErrorCode::DepthLimitExceeded);

    let deep = format!("{}{}", "[".repeat(300), "]".repeat(300));
    assert_eq!(
        parse_error(&deep, ParserConfig::default()),
        ParseErrorCode::DepthLimitExceeded
    );
}

#[test]
fn test_member_chain_counts_against_depth_limit() {
    let config = ParserConfig {
        max_depth: 3,
        ..ParserConfig::default()
    };
    assert!(parse_with("[a.b.c]", config).is_ok());
    assert_eq!(parse_error("[a.b.c.d]", config), ParseErrorCode::DepthLimitExceeded);

    let long = format!("{{a: {{}}, x: a{}}}", ".b".repeat(100_000));
    assert_eq!(
        parse_error(&long, ParserConfig::default()),
        ParseErrorCode::DepthLimitExceeded
    );
}

#[test]
fn test_member_path_is_flat() {
    match parse("server.tls.port") {
        Expr::Member { object, path, .. } => {
            assert_eq!(object, "server");
            assert_eq!(path, vec!["tls".to_string(), "port".to_string()]);
        }
        other => panic!("expected a member path, got {:?}", other),
    }
}

#[test]
fn test_lex_errors_pass_through() {
    match parse_with("[1, \"open", ParserConfig::default()) {
        Err(Error::Lex(error)) => assert_eq!(error.code.as_str(), "UNTERMINATED_STRING"),
        other => panic!("expected a lex error, got {:?}", other),
    }
}

// ============================================================================
// Tolerant mode
// ============================================================================

#[test]
fn test_tolerant_collects_errors() {
    let config = ParserConfig {
        tolerant: true,
        ..ParserConfig::default()
    };
    let parser = Parser::with_config(Lexer::new("{a: 1 b: 2, c: , d: 4}"), config).unwrap();
    let (expr, errors) = parser.parse_document();

    let expr = expr.unwrap();
    assert_eq!(keys(&expr), vec!["a", "b", "c", "d"]);
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].code(), "EXPECTED_COMMA_OR_CLOSE");
    assert_eq!(errors[1].code(), "EXPECTED_VALUE");
}

#[test]
fn test_tolerant_still_stops_on_lex_errors() {
    let config = ParserConfig {
        tolerant: true,
        ..ParserConfig::default()
    };
    let parser = Parser::with_config(Lexer::new("{a: 1 b: \"open}"), config).unwrap();
    let (expr, errors) = parser.parse_document();
    assert!(expr.is_none());
    assert!(errors.last().unwrap().is_lex());
}

#[test]
fn test_comments_collected() {
    let lexer_config = LexerConfig::default().with_preserve_comments(true);
    let mut parser = Parser::new(Lexer::with_config("{/* a */ x: 1 // b\n}", lexer_config)).unwrap();
    parser.parse().unwrap();
    assert_eq!(parser.comments().len(), 2);
}
