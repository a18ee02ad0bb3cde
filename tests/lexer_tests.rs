// tests/lexer_tests.rs

use num_bigint::BigInt;
use pretty_assertions::assert_eq;
use refjson::ast::TokenKind;
use refjson::edition::Edition;
use refjson::lexer::{LexErrorCode, Lexer, LexerConfig, Mode};

fn kinds(input: &str) -> Vec<TokenKind> {
    Lexer::new(input)
        .tokenize()
        .unwrap()
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

fn first_kind(input: &str) -> TokenKind {
    Lexer::new(input).next_token().unwrap().kind
}

fn lex_error(input: &str, config: LexerConfig) -> LexErrorCode {
    Lexer::with_config(input, config).tokenize().unwrap_err().code
}

fn edition(year: i64) -> LexerConfig {
    LexerConfig::for_edition(Edition::resolve(year), Mode::Full)
}

// ============================================================================
// Punctuation
// ============================================================================

#[test]
fn test_punctuation_tokens() {
    let test_cases = vec![
        ("{", TokenKind::LBrace),
        ("}", TokenKind::RBrace),
        ("[", TokenKind::LBracket),
        ("]", TokenKind::RBracket),
        (":", TokenKind::Colon),
        (",", TokenKind::Comma),
        (".", TokenKind::Dot),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        assert_eq!(lexer.next_token().unwrap().kind, expected, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }
}

#[test]
fn test_object_token_stream() {
    assert_eq!(
        kinds("{a: 1, 'b': [true]}"),
        vec![
            TokenKind::LBrace,
            TokenKind::Identifier("a".into()),
            TokenKind::Colon,
            TokenKind::Number(1.0),
            TokenKind::Comma,
            TokenKind::String("b".into()),
            TokenKind::Colon,
            TokenKind::LBracket,
            TokenKind::Boolean(true),
            TokenKind::RBracket,
            TokenKind::RBrace,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_unexpected_character() {
    assert_eq!(lex_error("#", LexerConfig::default()), LexErrorCode::UnexpectedCharacter);
    assert_eq!(lex_error("@foo", LexerConfig::default()), LexErrorCode::UnexpectedCharacter);
}

// ============================================================================
// Whitespace and comments
// ============================================================================

#[test]
fn test_json5_whitespace() {
    assert_eq!(
        kinds("\u{FEFF}\u{A0}1\u{2028}\u{3000}2\u{0B}\u{0C}"),
        vec![TokenKind::Number(1.0), TokenKind::Number(2.0), TokenKind::Eof]
    );
}

#[test]
fn test_comments_skipped_by_default() {
    assert_eq!(
        kinds("// line\n1 /* block\nspanning */ 2"),
        vec![TokenKind::Number(1.0), TokenKind::Number(2.0), TokenKind::Eof]
    );
}

#[test]
fn test_comments_preserved() {
    let config = LexerConfig::default().with_preserve_comments(true);
    let tokens = Lexer::with_config("// note\n/* more */", config).tokenize().unwrap();
    assert_eq!(tokens[0].kind, TokenKind::LineComment(" note".into()));
    assert_eq!(tokens[1].kind, TokenKind::BlockComment(" more ".into()));
    assert_eq!(tokens[2].kind, TokenKind::Eof);
}

#[test]
fn test_unterminated_block_comment() {
    assert_eq!(lex_error("/* open", LexerConfig::default()), LexErrorCode::UnterminatedComment);
}

#[test]
fn test_comments_rejected_in_strict_json() {
    let strict = LexerConfig::for_edition(Edition::MAX, Mode::StrictJson);
    assert_eq!(lex_error("// no", strict), LexErrorCode::CommentsNotAllowed);
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_string_escapes() {
    let test_cases = vec![
        (r#""a\nb""#, "a\nb"),
        (r#""tab\there""#, "tab\there"),
        (r#"'it\'s'"#, "it's"),
        (r#""\x41B""#, "AB"),
        (r#""\v\0""#, "\u{0B}\0"),
        (r#""\uD83D\uDE00""#, "\u{1F600}"),
        (r#""\q""#, "q"),
        ("\"line\\\ncontinued\"", "linecontinued"),
    ];

    for (input, expected) in test_cases {
        assert_eq!(
            first_kind(input),
            TokenKind::String(expected.to_string()),
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_invalid_escapes() {
    for input in [r#""\01""#, r#""\1""#, r#""\xZZ""#, r#""\u12""#, r#""\uD800""#] {
        assert_eq!(
            lex_error(input, LexerConfig::default()),
            LexErrorCode::InvalidEscape,
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_unterminated_string() {
    let error = Lexer::new("\"abc").tokenize().unwrap_err();
    assert_eq!(error.code, LexErrorCode::UnterminatedString);
    assert_eq!(error.span.start.column, 1);

    assert_eq!(
        lex_error("'abc\ndef'", LexerConfig::default()),
        LexErrorCode::UnterminatedString
    );
}

#[test]
fn test_single_quotes_rejected_in_strict_json() {
    let strict = LexerConfig::for_edition(Edition::MAX, Mode::StrictJson);
    assert_eq!(lex_error("'x'", strict), LexErrorCode::FeatureNotAllowed);
    assert_eq!(lex_error(r#""\v""#, strict), LexErrorCode::InvalidEscape);
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_decimal_numbers() {
    let test_cases = vec![
        ("0", 0.0),
        ("42", 42.0),
        ("-17", -17.0),
        ("+5", 5.0),
        ("3.25", 3.25),
        (".5", 0.5),
        ("5.", 5.0),
        ("1e3", 1000.0),
        ("2.5E-2", 0.025),
        ("08", 8.0),
    ];

    for (input, expected) in test_cases {
        assert_eq!(first_kind(input), TokenKind::Number(expected), "Failed for input: {}", input);
    }
}

#[test]
fn test_radix_numbers() {
    let test_cases = vec![
        ("0xFF", 255.0),
        ("0Xff", 255.0),
        ("-0x10", -16.0),
        ("0b1010", 10.0),
        ("0o17", 15.0),
        ("017", 15.0),
    ];

    for (input, expected) in test_cases {
        assert_eq!(first_kind(input), TokenKind::Number(expected), "Failed for input: {}", input);
    }
}

#[test]
fn test_special_numbers() {
    assert_eq!(first_kind("Infinity"), TokenKind::SpecialNumber(f64::INFINITY));
    assert_eq!(first_kind("-Infinity"), TokenKind::SpecialNumber(f64::NEG_INFINITY));
    assert!(matches!(first_kind("+NaN"), TokenKind::SpecialNumber(n) if n.is_nan()));
}

#[test]
fn test_number_raw_text_is_kept() {
    let token = Lexer::new("1_000.5").next_token().unwrap();
    assert_eq!(token.kind, TokenKind::Number(1000.5));
    assert_eq!(token.raw, "1_000.5");
}

#[test]
fn test_bigint_literals() {
    assert_eq!(first_kind("123n"), TokenKind::BigInt(BigInt::from(123)));
    assert_eq!(first_kind("-0xFFn"), TokenKind::BigInt(BigInt::from(-255)));
    assert_eq!(
        first_kind("9007199254740993n"),
        TokenKind::BigInt(BigInt::from(9_007_199_254_740_993u64))
    );
    assert_eq!(lex_error("1.5n", LexerConfig::default()), LexErrorCode::BigIntWithFraction);
    assert_eq!(lex_error("1e3n", LexerConfig::default()), LexErrorCode::BigIntWithFraction);
}

#[test]
fn test_numeric_separators() {
    assert_eq!(first_kind("1_000_000"), TokenKind::Number(1_000_000.0));
    assert_eq!(first_kind("0xFF_FF"), TokenKind::Number(65535.0));
    assert_eq!(first_kind("0b1010_0101"), TokenKind::Number(165.0));

    for input in ["1__000", "1000_", "_1000", "0x_FF", "1_.5", "1._5", "1e_5"] {
        assert_eq!(
            lex_error(input, LexerConfig::default()),
            LexErrorCode::InvalidNumericSeparator,
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_underscore_digit_keys() {
    let kinds: Vec<TokenKind> = Lexer::new("{_2023: 1, /* c */ _1 // x\n : 2}")
        .tokenize()
        .unwrap()
        .into_iter()
        .map(|token| token.kind)
        .collect();
    assert!(kinds.contains(&TokenKind::Identifier("_2023".to_string())));
    assert!(kinds.contains(&TokenKind::Identifier("_1".to_string())));

    // Still a misplaced separator in value position
    assert_eq!(
        lex_error("{a: _1000}", LexerConfig::default()),
        LexErrorCode::InvalidNumericSeparator
    );
}

#[test]
fn test_separators_not_allowed_in_legacy_octal() {
    assert_eq!(lex_error("01_7", LexerConfig::default()), LexErrorCode::FeatureNotAllowed);
}

#[test]
fn test_strict_octal() {
    let config = LexerConfig::default().with_strict_octal(true);
    assert_eq!(lex_error("0755", config), LexErrorCode::LegacyOctal);
    // Decimal fallback is not octal
    assert_eq!(
        Lexer::with_config("089", config).next_token().unwrap().kind,
        TokenKind::Number(89.0)
    );
}

#[test]
fn test_number_followed_by_identifier() {
    assert_eq!(lex_error("12abc", LexerConfig::default()), LexErrorCode::UnexpectedCharacter);
    assert_eq!(lex_error("0x", LexerConfig::default()), LexErrorCode::InvalidNumber);
}

#[test]
fn test_strict_json_numbers() {
    let strict = LexerConfig::for_edition(Edition::MAX, Mode::StrictJson);
    for input in ["0x1", "+1", ".5", "5.", "01", "Infinity"] {
        assert!(
            Lexer::with_config(input, strict).tokenize().is_err(),
            "Should reject input in strict JSON: {}",
            input
        );
    }
    assert_eq!(
        Lexer::with_config("-0.5e10", strict).next_token().unwrap().kind,
        TokenKind::Number(-0.5e10)
    );
}

// ============================================================================
// Edition gating
// ============================================================================

#[test]
fn test_edition_gates_literals() {
    assert_eq!(lex_error("0b1010", edition(2009)), LexErrorCode::FeatureNotAllowed);
    assert_eq!(lex_error("0o17", edition(2014)), LexErrorCode::FeatureNotAllowed);
    assert_eq!(lex_error("`t`", edition(2009)), LexErrorCode::FeatureNotAllowed);
    assert_eq!(lex_error("5n", edition(2019)), LexErrorCode::FeatureNotAllowed);
    assert_eq!(lex_error("1_000", edition(2020)), LexErrorCode::FeatureNotAllowed);

    assert!(Lexer::with_config("0b1010", edition(2015)).tokenize().is_ok());
    assert!(Lexer::with_config("5n", edition(2020)).tokenize().is_ok());
    assert!(Lexer::with_config("1_000", edition(2021)).tokenize().is_ok());
    assert!(Lexer::with_config("0xFF", edition(2009)).tokenize().is_ok());
}

#[test]
fn test_json5_mode_disables_extensions() {
    let json5 = LexerConfig::for_edition(Edition::MAX, Mode::Json5Only);
    assert_eq!(lex_error("0b1", json5), LexErrorCode::FeatureNotAllowed);
    assert_eq!(lex_error("1n", json5), LexErrorCode::FeatureNotAllowed);
    assert_eq!(lex_error("`x`", json5), LexErrorCode::FeatureNotAllowed);
    assert!(Lexer::with_config("0xFF", json5).tokenize().is_ok());
}

// ============================================================================
// Templates
// ============================================================================

#[test]
fn test_template_without_interpolation() {
    assert_eq!(first_kind("`plain text`"), TokenKind::TemplateWhole("plain text".into()));
}

#[test]
fn test_template_token_stream() {
    assert_eq!(
        kinds("`a${x}b${y}c`"),
        vec![
            TokenKind::TemplateHead("a".into()),
            TokenKind::Identifier("x".into()),
            TokenKind::TemplateMiddle("b".into()),
            TokenKind::Identifier("y".into()),
            TokenKind::TemplateTail("c".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_template_with_object_inside_interpolation() {
    assert_eq!(
        kinds("`${ {a: 1} }!`"),
        vec![
            TokenKind::TemplateHead("".into()),
            TokenKind::LBrace,
            TokenKind::Identifier("a".into()),
            TokenKind::Colon,
            TokenKind::Number(1.0),
            TokenKind::RBrace,
            TokenKind::TemplateTail("!".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_nested_templates() {
    let mut lexer = Lexer::new("`a${`b${c}`}d`");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::TemplateHead("a".into()));
    assert_eq!(lexer.template_depth(), 1);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::TemplateHead("b".into()));
    assert_eq!(lexer.template_depth(), 2);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Identifier("c".into()));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::TemplateTail("".into()));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::TemplateTail("d".into()));
    assert_eq!(lexer.template_depth(), 0);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
}

#[test]
fn test_unterminated_template() {
    assert_eq!(lex_error("`abc", LexerConfig::default()), LexErrorCode::UnterminatedTemplate);
    assert_eq!(lex_error("`a${b}c", LexerConfig::default()), LexErrorCode::UnterminatedTemplate);
}

// ============================================================================
// Positions
// ============================================================================

#[test]
fn test_positions_track_lines() {
    let tokens = Lexer::new("{\n  a: 1,\n  b: 22\n}").tokenize().unwrap();
    let b = &tokens[5];
    assert_eq!(b.kind, TokenKind::Identifier("b".into()));
    assert_eq!((b.span.start.line, b.span.start.column), (3, 3));

    let number = &tokens[7];
    assert_eq!(number.raw, "22");
    assert_eq!(number.span.start.offset, 15);
    assert_eq!(number.span.end.offset, 17);
}

#[test]
fn test_error_message_includes_position() {
    let error = Lexer::new("[1,\n  #]").tokenize().unwrap_err();
    assert_eq!(error.to_string(), "Unexpected character '#' at line 2, column 3");
}
