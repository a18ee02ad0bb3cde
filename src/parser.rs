use std::fmt;

use num_bigint::BigInt;
use thiserror::Error;

use crate::{
    ast::{Expr, Literal, Property, Token, TokenKind},
    error::Error,
    evaluator::EvalError,
    lexer::{Lexer, Mode, Span},
    value::format_number,
};

/// Largest integer an `f64` represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Default nesting limit for objects, arrays and templates.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Grammar-level options. Lexical options live in
/// [`LexerConfig`](crate::lexer::LexerConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    pub allow_references: bool,
    /// Collect errors and keep going instead of stopping at the first one
    pub tolerant: bool,
    /// Reject unsafe integers instead of promoting them to BigInt
    pub strict_bigint: bool,
    pub max_depth: usize,
    pub mode: Mode,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            allow_references: true,
            tolerant: false,
            strict_bigint: false,
            max_depth: DEFAULT_MAX_DEPTH,
            mode: Mode::Full,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorCode {
    UnexpectedToken,
    ExpectedValue,
    ExpectedPropertyKey,
    ExpectedColon,
    ExpectedCommaOrClose,
    UnclosedDelimiter,
    TrailingComma,
    UnquotedKey,
    ReferencesNotAllowed,
    DepthLimitExceeded,
}

impl ParseErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseErrorCode::UnexpectedToken => "UNEXPECTED_TOKEN",
            ParseErrorCode::ExpectedValue => "EXPECTED_VALUE",
            ParseErrorCode::ExpectedPropertyKey => "EXPECTED_PROPERTY_KEY",
            ParseErrorCode::ExpectedColon => "EXPECTED_COLON",
            ParseErrorCode::ExpectedCommaOrClose => "EXPECTED_COMMA_OR_CLOSE",
            ParseErrorCode::UnclosedDelimiter => "UNCLOSED_DELIMITER",
            ParseErrorCode::TrailingComma => "TRAILING_COMMA",
            ParseErrorCode::UnquotedKey => "UNQUOTED_KEY",
            ParseErrorCode::ReferencesNotAllowed => "REFERENCES_NOT_ALLOWED",
            ParseErrorCode::DepthLimitExceeded => "DEPTH_LIMIT_EXCEEDED",
        }
    }
}

impl fmt::Display for ParseErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Well-formed tokens in a position the grammar does not allow.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at {}", .span.start)]
pub struct ParseError {
    pub code: ParseErrorCode,
    pub message: String,
    pub span: Span,
}

impl ParseError {
    fn new(code: ParseErrorCode, message: impl Into<String>, span: Span) -> Self {
        ParseError {
            code,
            message: message.into(),
            span,
        }
    }
}

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    config: ParserConfig,
    /// Errors collected in tolerant mode
    errors: Vec<Error>,
    comments: Vec<Token>,
    depth: usize,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Result<Self, Error> {
        Parser::with_config(lexer, ParserConfig::default())
    }

    pub fn with_config(lexer: Lexer, config: ParserConfig) -> Result<Self, Error> {
        let mut parser = Parser {
            lexer,
            current_token: Token::new(TokenKind::Eof, "", Span::default()),
            config,
            errors: Vec::new(),
            comments: Vec::new(),
            depth: 0,
        };
        parser.advance()?;
        Ok(parser)
    }

    /// Comments seen so far, when the lexer preserves them.
    pub fn comments(&self) -> &[Token] {
        &self.comments
    }

    /// Errors recovered from so far (tolerant mode only).
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    fn advance(&mut self) -> Result<(), Error> {
        loop {
            let token = self.lexer.next_token()?;
            if token.is_comment() {
                self.comments.push(token);
                continue;
            }
            self.current_token = token;
            return Ok(());
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current_token.kind) == std::mem::discriminant(kind)
    }

    /// Record an error. Fails immediately unless the parser is tolerant.
    fn report(&mut self, error: ParseError) -> Result<(), Error> {
        if self.config.tolerant {
            self.errors.push(error.into());
            Ok(())
        } else {
            Err(error.into())
        }
    }

    fn unexpected(&self, code: ParseErrorCode, expected: &str) -> ParseError {
        ParseError::new(
            code,
            format!("Expected {}, found {}", expected, found(&self.current_token)),
            self.current_token.span,
        )
    }

    fn enter(&mut self) -> Result<(), Error> {
        self.depth += 1;
        if self.depth > self.config.max_depth {
            return Err(ParseError::new(
                ParseErrorCode::DepthLimitExceeded,
                format!("Nesting deeper than {} levels", self.config.max_depth),
                self.current_token.span,
            )
            .into());
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Parse a complete document: one value followed by end of input.
    pub fn parse(&mut self) -> Result<Expr, Error> {
        let expr = self.parse_value()?;
        if !self.check(&TokenKind::Eof) {
            let error = self.unexpected(ParseErrorCode::UnexpectedToken, "end of input");
            self.report(error)?;
        }
        Ok(expr)
    }

    /// Parse a complete document, returning every collected error.
    ///
    /// In tolerant mode the tree may contain `null` literals where
    /// constructs were broken. The tree is `None` when parsing had to stop.
    pub fn parse_document(mut self) -> (Option<Expr>, Vec<Error>) {
        match self.parse() {
            Ok(expr) => (Some(expr), self.errors),
            Err(error) => {
                self.errors.push(error);
                (None, self.errors)
            }
        }
    }

    /// Parse one value at the current position.
    pub fn parse_value(&mut self) -> Result<Expr, Error> {
        let span = self.current_token.span;

        match &self.current_token.kind {
            TokenKind::String(s) => {
                let value = Literal::String(s.clone());
                self.literal(value)
            }
            TokenKind::Number(_) => self.parse_number(),
            TokenKind::BigInt(n) => {
                let value = Literal::BigInt(n.clone());
                self.literal(value)
            }
            TokenKind::Boolean(b) => {
                let value = Literal::Boolean(*b);
                self.literal(value)
            }
            TokenKind::Null => self.literal(Literal::Null),
            TokenKind::SpecialNumber(n) => {
                let value = Literal::Number(*n);
                self.literal(value)
            }
            TokenKind::LBrace => self.parse_object(),
            TokenKind::LBracket => self.parse_array(),
            TokenKind::Identifier(_) => self.parse_reference(),
            TokenKind::TemplateWhole(text) => {
                let quasis = vec![text.clone()];
                self.advance()?;
                Ok(Expr::Template {
                    quasis,
                    expressions: Vec::new(),
                    span,
                })
            }
            TokenKind::TemplateHead(_) => self.parse_template(),
            _ => {
                let error = self.unexpected(ParseErrorCode::ExpectedValue, "value");
                self.report(error)?;
                if !is_synchronizing(&self.current_token.kind) {
                    self.advance()?;
                }
                Ok(Expr::null(span))
            }
        }
    }

    fn literal(&mut self, value: Literal) -> Result<Expr, Error> {
        let expr = Expr::Literal {
            value,
            raw: self.current_token.raw.clone(),
            span: self.current_token.span,
        };
        self.advance()?;
        Ok(expr)
    }

    /// Number literals that are written as plain integers but exceed the
    /// safe range become BigInts, or fail under `strict_bigint`.
    fn parse_number(&mut self) -> Result<Expr, Error> {
        let TokenKind::Number(value) = self.current_token.kind else {
            return Err(self
                .unexpected(ParseErrorCode::ExpectedValue, "number")
                .into());
        };
        let raw = &self.current_token.raw;

        if value.abs() > MAX_SAFE_INTEGER && is_integer_literal(raw) {
            if self.config.strict_bigint {
                return Err(EvalError::UnsafeInteger {
                    raw: raw.clone(),
                    span: self.current_token.span,
                }
                .into());
            }
            if let Some(exact) = integer_literal_value(raw) {
                tracing::trace!(raw = %raw, "promoting unsafe integer literal to BigInt");
                return self.literal(Literal::BigInt(exact));
            }
        }

        self.literal(Literal::Number(value))
    }

    fn parse_object(&mut self) -> Result<Expr, Error> {
        let start = self.current_token.span;
        self.enter()?;
        self.advance()?; // Consume '{'

        let mut properties = vec![];

        loop {
            if self.check(&TokenKind::RBrace) {
                break;
            }
            if self.check(&TokenKind::Eof) {
                let error = ParseError::new(
                    ParseErrorCode::UnclosedDelimiter,
                    format!("Expected '}}' to close object opened at {}", start.start),
                    self.current_token.span,
                );
                self.report(error)?;
                break;
            }

            let Some((key, key_span)) = self.parse_property_key()? else {
                // Skip the broken property
                while !matches!(
                    self.current_token.kind,
                    TokenKind::Comma | TokenKind::RBrace | TokenKind::Eof
                ) {
                    self.advance()?;
                }
                if self.check(&TokenKind::Comma) {
                    self.advance()?;
                }
                continue;
            };

            if self.check(&TokenKind::Colon) {
                self.advance()?;
            } else {
                let error = self.unexpected(
                    ParseErrorCode::ExpectedColon,
                    &format!("':' after property key '{}'", key),
                );
                self.report(error)?;
            }

            let value = self.parse_value()?;
            properties.push(Property {
                key,
                key_span,
                value,
            });

            match self.current_token.kind {
                TokenKind::Comma => {
                    let comma = self.current_token.span;
                    self.advance()?;
                    if self.check(&TokenKind::RBrace) && self.config.mode == Mode::StrictJson {
                        self.report(ParseError::new(
                            ParseErrorCode::TrailingComma,
                            "Trailing commas are not allowed in strict JSON",
                            comma,
                        ))?;
                    }
                }
                TokenKind::RBrace | TokenKind::Eof => {}
                _ => {
                    let error = self.unexpected(ParseErrorCode::ExpectedCommaOrClose, "',' or '}'");
                    self.report(error)?;
                    if !starts_value(&self.current_token.kind) {
                        self.advance()?;
                    }
                }
            }
        }

        let end = self.current_token.span;
        if self.check(&TokenKind::RBrace) {
            self.advance()?;
        }
        self.leave();

        Ok(Expr::Object {
            properties,
            span: start.to(end),
        })
    }

    /// Returns `None` after reporting an invalid key in tolerant mode.
    fn parse_property_key(&mut self) -> Result<Option<(String, Span)>, Error> {
        let token = &self.current_token;
        let span = token.span;
        let signed = token.raw.starts_with(['+', '-']);

        let key = match &token.kind {
            TokenKind::String(s) => Some(s.clone()),
            _ if self.config.mode == Mode::StrictJson => {
                let error = ParseError::new(
                    ParseErrorCode::UnquotedKey,
                    format!(
                        "Property keys must be double-quoted strings in strict JSON, found {}",
                        found(token)
                    ),
                    span,
                );
                self.report(error)?;
                return Ok(None);
            }
            TokenKind::Identifier(name) => Some(name.clone()),
            TokenKind::Boolean(_) | TokenKind::Null => Some(token.raw.clone()),
            TokenKind::SpecialNumber(_) if !signed => Some(token.raw.clone()),
            TokenKind::Number(n) if !signed => Some(format_number(*n)),
            TokenKind::BigInt(n) if !signed => Some(n.to_string()),
            _ => None,
        };

        match key {
            Some(key) => {
                self.advance()?;
                Ok(Some((key, span)))
            }
            None => {
                let error = self.unexpected(
                    ParseErrorCode::ExpectedPropertyKey,
                    "property key or closing delimiter '}'",
                );
                self.report(error)?;
                Ok(None)
            }
        }
    }

    fn parse_array(&mut self) -> Result<Expr, Error> {
        let start = self.current_token.span;
        self.enter()?;
        self.advance()?; // Consume '['

        let mut elements = vec![];

        loop {
            if self.check(&TokenKind::RBracket) {
                break;
            }
            if self.check(&TokenKind::Eof) {
                let error = ParseError::new(
                    ParseErrorCode::UnclosedDelimiter,
                    format!("Expected ']' to close array opened at {}", start.start),
                    self.current_token.span,
                );
                self.report(error)?;
                break;
            }

            if self.check(&TokenKind::Comma) {
                let error = self.unexpected(
                    ParseErrorCode::ExpectedValue,
                    "value or closing delimiter ']'",
                );
                self.report(error)?;
                self.advance()?;
                continue;
            }

            elements.push(self.parse_value()?);

            match self.current_token.kind {
                TokenKind::Comma => {
                    let comma = self.current_token.span;
                    self.advance()?;
                    if self.check(&TokenKind::RBracket) && self.config.mode == Mode::StrictJson {
                        self.report(ParseError::new(
                            ParseErrorCode::TrailingComma,
                            "Trailing commas are not allowed in strict JSON",
                            comma,
                        ))?;
                    }
                }
                TokenKind::RBracket | TokenKind::Eof => {}
                _ => {
                    let error = self.unexpected(ParseErrorCode::ExpectedCommaOrClose, "',' or ']'");
                    self.report(error)?;
                    if !starts_value(&self.current_token.kind) {
                        self.advance()?;
                    }
                }
            }
        }

        let end = self.current_token.span;
        if self.check(&TokenKind::RBracket) {
            self.advance()?;
        }
        self.leave();

        Ok(Expr::Array {
            elements,
            span: start.to(end),
        })
    }

    /// `name` or `name.field.field`
    fn parse_reference(&mut self) -> Result<Expr, Error> {
        let start = self.current_token.span;
        let TokenKind::Identifier(name) = &self.current_token.kind else {
            return Err(self
                .unexpected(ParseErrorCode::ExpectedValue, "identifier")
                .into());
        };
        let name = name.clone();

        if !self.config.allow_references {
            let error = ParseError::new(
                ParseErrorCode::ReferencesNotAllowed,
                format!("Unexpected identifier '{}': references are not allowed", name),
                start,
            );
            self.report(error)?;
            self.advance()?;
            return Ok(Expr::null(start));
        }

        self.advance()?;
        let mut path = vec![];
        let mut end = start;

        while self.check(&TokenKind::Dot) {
            self.advance()?; // Consume '.'

            // Keywords are ordinary names after a dot
            let property = match &self.current_token.kind {
                TokenKind::Identifier(n) => n.clone(),
                TokenKind::Boolean(_) | TokenKind::Null | TokenKind::SpecialNumber(_)
                    if !self.current_token.raw.starts_with(['+', '-']) =>
                {
                    self.current_token.raw.clone()
                }
                _ => {
                    let error =
                        self.unexpected(ParseErrorCode::UnexpectedToken, "property name after '.'");
                    self.report(error)?;
                    break;
                }
            };
            // Each segment counts as one nesting level
            if self.depth + path.len() >= self.config.max_depth {
                return Err(ParseError::new(
                    ParseErrorCode::DepthLimitExceeded,
                    format!("Reference path deeper than {} levels", self.config.max_depth),
                    self.current_token.span,
                )
                .into());
            }
            path.push(property);
            end = self.current_token.span;
            self.advance()?;
        }

        if path.is_empty() {
            return Ok(Expr::Identifier {
                name,
                span: start.to(end),
            });
        }
        Ok(Expr::Member {
            object: name,
            path,
            span: start.to(end),
        })
    }

    fn parse_template(&mut self) -> Result<Expr, Error> {
        let start = self.current_token.span;
        let TokenKind::TemplateHead(head) = &self.current_token.kind else {
            return Err(self
                .unexpected(ParseErrorCode::ExpectedValue, "template literal")
                .into());
        };
        let mut quasis = vec![head.clone()];
        let mut expressions = vec![];

        self.enter()?;
        self.advance()?;

        let end = loop {
            expressions.push(self.parse_value()?);

            match &self.current_token.kind {
                TokenKind::TemplateMiddle(text) => {
                    quasis.push(text.clone());
                    self.advance()?;
                }
                TokenKind::TemplateTail(text) => {
                    quasis.push(text.clone());
                    let end = self.current_token.span;
                    self.advance()?;
                    break end;
                }
                _ => {
                    // The lexer is still inside the interpolation; nothing
                    // sensible can follow, so this is fatal even when tolerant.
                    return Err(self
                        .unexpected(ParseErrorCode::UnexpectedToken, "'}' to close interpolation")
                        .into());
                }
            }
        };
        self.leave();

        Ok(Expr::Template {
            quasis,
            expressions,
            span: start.to(end),
        })
    }
}

/// Tokens the error recovery does not skip over.
fn is_synchronizing(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Comma | TokenKind::RBrace | TokenKind::RBracket | TokenKind::Eof
    )
}

fn starts_value(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::String(_)
            | TokenKind::Number(_)
            | TokenKind::BigInt(_)
            | TokenKind::Boolean(_)
            | TokenKind::Null
            | TokenKind::SpecialNumber(_)
            | TokenKind::Identifier(_)
            | TokenKind::LBrace
            | TokenKind::LBracket
            | TokenKind::TemplateWhole(_)
            | TokenKind::TemplateHead(_)
    )
}

fn found(token: &Token) -> String {
    match &token.kind {
        TokenKind::Eof => "end of input".to_string(),
        TokenKind::Identifier(name) => format!("identifier '{}'", name),
        kind if token.raw.chars().count() <= 24 => {
            format!("{} '{}'", kind.describe(), token.raw)
        }
        kind => kind.describe().to_string(),
    }
}

fn strip_sign(raw: &str) -> (bool, &str) {
    match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    }
}

fn radix_body(body: &str) -> Option<(u32, &str)> {
    let prefix = body.get(..2)?.to_ascii_lowercase();
    let radix = match prefix.as_str() {
        "0x" => 16,
        "0b" => 2,
        "0o" => 8,
        _ => return None,
    };
    Some((radix, &body[2..]))
}

/// A number literal written without a fraction or exponent.
fn is_integer_literal(raw: &str) -> bool {
    let (_, body) = strip_sign(raw);
    radix_body(body).is_some() || !body.contains(['.', 'e', 'E'])
}

/// Exact value of an integer literal, read from its source text.
fn integer_literal_value(raw: &str) -> Option<BigInt> {
    let (negative, body) = strip_sign(raw);
    let cleaned: String = body.chars().filter(|c| *c != '_').collect();

    let (radix, digits) = match radix_body(&cleaned) {
        Some(prefixed) => prefixed,
        None if cleaned.len() > 1
            && cleaned.starts_with('0')
            && cleaned.chars().all(|c| ('0'..='7').contains(&c)) =>
        {
            (8, &cleaned[1..])
        }
        None => (10, cleaned.as_str()),
    };

    let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix)?;
    Some(if negative { -magnitude } else { magnitude })
}

#[test]
fn test_integer_literal_value() {
    assert_eq!(
        integer_literal_value("9_007_199_254_740_993"),
        Some(BigInt::from(9_007_199_254_740_993u64))
    );
    assert_eq!(integer_literal_value("-0x10"), Some(BigInt::from(-16)));
    assert_eq!(integer_literal_value("017"), Some(BigInt::from(15)));
    assert_eq!(integer_literal_value("019"), Some(BigInt::from(19)));
}

#[test]
fn test_is_integer_literal() {
    assert!(is_integer_literal("123"));
    assert!(is_integer_literal("0xFE"));
    assert!(!is_integer_literal("1.0"));
    assert!(!is_integer_literal("1e20"));
}
