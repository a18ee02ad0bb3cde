use std::fmt;

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use thiserror::Error;

use crate::ast::{Token, TokenKind};
use crate::edition::Edition;

/// A location in the source. Lines and columns start at 1, the offset is the
/// 0-based index of the character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub fn start() -> Self {
        Position {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Half-open source range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    /// Smallest span covering both.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
        }
    }
}

/// Coarse syntax mode, applied on top of the edition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Everything the edition allows, references included.
    #[default]
    Full,
    /// Plain JSON5: no edition extensions and no references.
    Json5Only,
    /// RFC 8259 JSON.
    StrictJson,
}

/// Which constructs the tokenizer accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerConfig {
    pub allow_hex: bool,
    pub allow_binary_octal: bool,
    pub allow_bigint: bool,
    pub allow_numeric_separators: bool,
    pub allow_templates: bool,
    /// Reject `017`-style octal literals.
    pub strict_octal: bool,
    /// Emit comment tokens instead of skipping them.
    pub preserve_comments: bool,
    pub mode: Mode,
}

impl LexerConfig {
    pub fn for_edition(edition: Edition, mode: Mode) -> Self {
        let features = edition.features();
        let extensions = mode == Mode::Full;

        LexerConfig {
            allow_hex: features.hex && mode != Mode::StrictJson,
            allow_binary_octal: features.binary_octal && extensions,
            allow_bigint: features.bigint && extensions,
            allow_numeric_separators: features.numeric_separators && extensions,
            allow_templates: features.template_literals && extensions,
            strict_octal: false,
            preserve_comments: false,
            mode,
        }
    }

    /// Everything enabled, comments kept. Used for feature detection.
    pub fn permissive() -> Self {
        LexerConfig {
            preserve_comments: true,
            ..LexerConfig::for_edition(Edition::MAX, Mode::Full)
        }
    }

    pub fn with_preserve_comments(mut self, preserve: bool) -> Self {
        self.preserve_comments = preserve;
        self
    }

    pub fn with_strict_octal(mut self, strict: bool) -> Self {
        self.strict_octal = strict;
        self
    }

    fn strict_json(&self) -> bool {
        self.mode == Mode::StrictJson
    }
}

impl Default for LexerConfig {
    fn default() -> Self {
        LexerConfig::for_edition(Edition::default(), Mode::Full)
    }
}

/// Machine-readable lexical error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorCode {
    UnexpectedCharacter,
    UnterminatedString,
    UnterminatedComment,
    UnterminatedTemplate,
    InvalidEscape,
    InvalidNumber,
    InvalidNumericSeparator,
    BigIntWithFraction,
    LegacyOctal,
    CommentsNotAllowed,
    FeatureNotAllowed,
}

impl LexErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            LexErrorCode::UnexpectedCharacter => "UNEXPECTED_CHARACTER",
            LexErrorCode::UnterminatedString => "UNTERMINATED_STRING",
            LexErrorCode::UnterminatedComment => "UNTERMINATED_COMMENT",
            LexErrorCode::UnterminatedTemplate => "UNTERMINATED_TEMPLATE",
            LexErrorCode::InvalidEscape => "INVALID_ESCAPE",
            LexErrorCode::InvalidNumber => "INVALID_NUMBER",
            LexErrorCode::InvalidNumericSeparator => "INVALID_NUMERIC_SEPARATOR",
            LexErrorCode::BigIntWithFraction => "BIGINT_WITH_FRACTION",
            LexErrorCode::LegacyOctal => "LEGACY_OCTAL",
            LexErrorCode::CommentsNotAllowed => "COMMENTS_NOT_ALLOWED",
            LexErrorCode::FeatureNotAllowed => "FEATURE_NOT_ALLOWED",
        }
    }
}

impl fmt::Display for LexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Malformed character stream.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at {}", .span.start)]
pub struct LexError {
    pub code: LexErrorCode,
    pub message: String,
    pub span: Span,
}

impl LexError {
    fn new(code: LexErrorCode, message: impl Into<String>, span: Span) -> Self {
        LexError {
            code,
            message: message.into(),
            span,
        }
    }
}

enum TemplateEnd {
    Backtick,
    Interpolation,
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    config: LexerConfig,
    /// Number of `${` interpolations currently open.
    template_depth: usize,
    /// Unclosed `{` inside each open interpolation, innermost last.
    brace_depths: Vec<usize>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer::with_config(input, LexerConfig::default())
    }

    pub fn with_config(input: &str, config: LexerConfig) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            config,
            template_depth: 0,
            brace_depths: Vec::new(),
        }
    }

    pub fn config(&self) -> &LexerConfig {
        &self.config
    }

    /// Number of template interpolations currently open.
    pub fn template_depth(&self) -> usize {
        self.template_depth
    }

    /// Tokenize the whole input. The last token is always [`TokenKind::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        let Some(ch) = self.current_char() else {
            return;
        };
        self.position += 1;
        match ch {
            '\r' if self.current_char() == Some('\n') => self.column += 1,
            '\n' | '\r' | '\u{2028}' | '\u{2029}' => {
                self.line += 1;
                self.column = 1;
            }
            _ => self.column += 1,
        }
    }

    fn here(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            offset: self.position,
        }
    }

    fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.here())
    }

    /// Span of the single character under the cursor.
    fn char_span(&self) -> Span {
        let start = self.here();
        let end = Position {
            column: start.column + 1,
            offset: start.offset + 1,
            ..start
        };
        Span::new(start, end)
    }

    fn raw_from(&self, start: Position) -> String {
        self.input[start.offset..self.position].iter().collect()
    }

    fn token(&self, kind: TokenKind, start: Position) -> Token {
        Token::new(kind, self.raw_from(start), self.span_from(start))
    }

    fn error_here(&self, code: LexErrorCode, message: impl Into<String>) -> LexError {
        LexError::new(code, message, self.char_span())
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if is_whitespace(ch) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Whether the next significant character is `:`, skipping whitespace
    /// and comments without consuming anything.
    fn colon_follows(&self) -> bool {
        let mut i = self.position;
        while let Some(&ch) = self.input.get(i) {
            match (ch, self.input.get(i + 1)) {
                (c, _) if is_whitespace(c) => i += 1,
                ('/', Some('/')) => {
                    while self.input.get(i).is_some_and(|&c| !is_line_terminator(c)) {
                        i += 1;
                    }
                }
                ('/', Some('*')) => {
                    i += 2;
                    while i < self.input.len()
                        && !(self.input[i] == '*' && self.input.get(i + 1) == Some(&'/'))
                    {
                        i += 1;
                    }
                    i += 2;
                }
                (c, _) => return c == ':',
            }
        }
        false
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            self.skip_whitespace();

            if self.current_char() == Some('/') {
                let comment = self.read_comment()?;
                if self.config.preserve_comments {
                    return Ok(comment);
                }
                continue;
            }

            return self.scan_token();
        }
    }

    fn read_comment(&mut self) -> Result<Token, LexError> {
        let start = self.here();
        let block = match self.peek_char(1) {
            Some('/') => false,
            Some('*') => true,
            _ => {
                return Err(self.error_here(
                    LexErrorCode::UnexpectedCharacter,
                    "Unexpected character '/'",
                ));
            }
        };

        if self.config.strict_json() {
            self.advance();
            self.advance();
            return Err(LexError::new(
                LexErrorCode::CommentsNotAllowed,
                "Comments are not allowed in strict JSON",
                self.span_from(start),
            ));
        }

        self.advance();
        self.advance();
        let mut text = String::new();

        if block {
            loop {
                match self.current_char() {
                    None => {
                        return Err(LexError::new(
                            LexErrorCode::UnterminatedComment,
                            "Unterminated block comment",
                            Span::new(start, start),
                        ));
                    }
                    Some('*') if self.peek_char(1) == Some('/') => {
                        self.advance();
                        self.advance();
                        return Ok(self.token(TokenKind::BlockComment(text), start));
                    }
                    Some(ch) => {
                        text.push(ch);
                        self.advance();
                    }
                }
            }
        }

        while let Some(ch) = self.current_char() {
            if is_line_terminator(ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }
        Ok(self.token(TokenKind::LineComment(text), start))
    }

    fn scan_token(&mut self) -> Result<Token, LexError> {
        let start = self.here();

        let Some(ch) = self.current_char() else {
            return Ok(self.token(TokenKind::Eof, start));
        };

        match ch {
            '{' => {
                if let Some(open) = self.brace_depths.last_mut() {
                    *open += 1;
                }
                self.advance();
                Ok(self.token(TokenKind::LBrace, start))
            }
            '}' => match self.brace_depths.last_mut() {
                Some(0) => self.read_template_continuation(start),
                Some(open) => {
                    *open -= 1;
                    self.advance();
                    Ok(self.token(TokenKind::RBrace, start))
                }
                None => {
                    self.advance();
                    Ok(self.token(TokenKind::RBrace, start))
                }
            },
            '[' => {
                self.advance();
                Ok(self.token(TokenKind::LBracket, start))
            }
            ']' => {
                self.advance();
                Ok(self.token(TokenKind::RBracket, start))
            }
            ':' => {
                self.advance();
                Ok(self.token(TokenKind::Colon, start))
            }
            ',' => {
                self.advance();
                Ok(self.token(TokenKind::Comma, start))
            }
            '.' if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number(start, false)
            }
            '.' => {
                self.advance();
                Ok(self.token(TokenKind::Dot, start))
            }
            '"' | '\'' => self.read_string(ch, start),
            '`' => self.read_template(start),
            '+' | '-' => self.read_signed(ch, start),
            c if c.is_ascii_digit() => self.read_number(start, false),
            c if is_identifier_start(c) => self.read_identifier(start),
            c => Err(self.error_here(
                LexErrorCode::UnexpectedCharacter,
                format!("Unexpected character '{}'", c.escape_debug()),
            )),
        }
    }

    fn read_identifier(&mut self, start: Position) -> Result<Token, LexError> {
        let mut name = String::new();
        while let Some(ch) = self.current_char() {
            if is_identifier_part(ch) {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // `_1000` reads as a number with a leading separator, not a name,
        // unless it is an object key
        if self.config.allow_numeric_separators
            && name.starts_with('_')
            && name.chars().any(|c| c.is_ascii_digit())
            && name.chars().all(|c| c == '_' || c.is_ascii_digit())
            && !self.colon_follows()
        {
            return Err(LexError::new(
                LexErrorCode::InvalidNumericSeparator,
                "Invalid numeric separator position: a separator cannot start a number",
                Span::new(
                    start,
                    Position {
                        column: start.column + 1,
                        offset: start.offset + 1,
                        ..start
                    },
                ),
            ));
        }

        let kind = match name.as_str() {
            "true" => TokenKind::Boolean(true),
            "false" => TokenKind::Boolean(false),
            "null" => TokenKind::Null,
            "Infinity" | "NaN" => {
                if self.config.strict_json() {
                    return Err(LexError::new(
                        LexErrorCode::FeatureNotAllowed,
                        format!("{} is not allowed in strict JSON", name),
                        self.span_from(start),
                    ));
                }
                TokenKind::SpecialNumber(special_value(&name))
            }
            _ => TokenKind::Identifier(name),
        };
        Ok(self.token(kind, start))
    }

    fn read_signed(&mut self, sign: char, start: Position) -> Result<Token, LexError> {
        if sign == '+' && self.config.strict_json() {
            return Err(self.error_here(
                LexErrorCode::UnexpectedCharacter,
                "Unexpected character '+': explicit plus signs are not allowed in strict JSON",
            ));
        }
        let negative = sign == '-';

        match self.peek_char(1) {
            Some(c) if c.is_ascii_digit() => {
                self.advance();
                self.read_number(start, negative)
            }
            Some('.') if self.peek_char(2).is_some_and(|c| c.is_ascii_digit()) => {
                self.advance();
                self.read_number(start, negative)
            }
            Some(c) if is_identifier_start(c) => {
                self.advance();
                let word_start = self.here();
                let mut word = String::new();
                while let Some(ch) = self.current_char() {
                    if is_identifier_part(ch) {
                        word.push(ch);
                        self.advance();
                    } else {
                        break;
                    }
                }

                match word.as_str() {
                    "Infinity" | "NaN" if !self.config.strict_json() => {
                        let value = special_value(&word);
                        let value = if negative { -value } else { value };
                        Ok(self.token(TokenKind::SpecialNumber(value), start))
                    }
                    _ => Err(LexError::new(
                        LexErrorCode::UnexpectedCharacter,
                        format!("Unexpected identifier '{}' after '{}'", word, sign),
                        self.span_from(word_start),
                    )),
                }
            }
            _ => Err(self.error_here(
                LexErrorCode::UnexpectedCharacter,
                format!("Unexpected character '{}'", sign),
            )),
        }
    }

    /// Reads a number starting at a digit or a leading `.`; any sign has
    /// already been consumed.
    fn read_number(&mut self, start: Position, negative: bool) -> Result<Token, LexError> {
        let kind = match (self.current_char(), self.peek_char(1)) {
            (Some('0'), Some(prefix @ ('x' | 'X' | 'b' | 'B' | 'o' | 'O'))) => {
                self.read_radix_number(start, prefix, negative)?
            }
            (Some('0'), Some(c)) if c.is_ascii_digit() || c == '_' => {
                if self.config.strict_json() {
                    return Err(LexError::new(
                        LexErrorCode::InvalidNumber,
                        "Leading zeros are not allowed in strict JSON",
                        self.char_span(),
                    ));
                }
                if self.legacy_octal_ahead() {
                    self.read_legacy_octal(start, negative)?
                } else {
                    self.read_decimal(negative)?
                }
            }
            _ => self.read_decimal(negative)?,
        };

        self.check_number_end()?;
        Ok(self.token(kind, start))
    }

    /// A leading `0` followed by a digit run that contains no 8 or 9.
    fn legacy_octal_ahead(&self) -> bool {
        self.input[self.position + 1..]
            .iter()
            .take_while(|c| c.is_ascii_digit() || **c == '_')
            .filter(|c| c.is_ascii_digit())
            .all(|c| ('0'..='7').contains(c))
    }

    fn read_radix_number(
        &mut self,
        start: Position,
        prefix: char,
        negative: bool,
    ) -> Result<TokenKind, LexError> {
        let (radix, name, allowed, requirement) = match prefix.to_ascii_lowercase() {
            'x' => (
                16,
                "hexadecimal",
                self.config.allow_hex,
                "Hexadecimal literals are not allowed in this mode",
            ),
            'b' => (
                2,
                "binary",
                self.config.allow_binary_octal,
                "Binary literals require edition 2015 or later",
            ),
            _ => (
                8,
                "octal",
                self.config.allow_binary_octal,
                "Octal literals require edition 2015 or later",
            ),
        };

        self.advance();
        self.advance();

        if !allowed {
            return Err(LexError::new(
                LexErrorCode::FeatureNotAllowed,
                requirement,
                self.span_from(start),
            ));
        }

        let digits = self.read_digits(radix, self.config.allow_numeric_separators)?;
        if digits.is_empty() {
            return Err(self.error_here(
                LexErrorCode::InvalidNumber,
                format!("Expected {} digit after '0{}'", name, prefix),
            ));
        }

        let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix).ok_or_else(|| {
            LexError::new(
                LexErrorCode::InvalidNumber,
                format!("Invalid {} literal", name),
                self.span_from(start),
            )
        })?;

        if self.current_char() == Some('n') {
            return self.read_bigint_suffix(magnitude, negative);
        }

        Ok(TokenKind::Number(signed_f64(&magnitude, negative)))
    }

    fn read_legacy_octal(&mut self, start: Position, negative: bool) -> Result<TokenKind, LexError> {
        if self.config.strict_octal {
            return Err(LexError::new(
                LexErrorCode::LegacyOctal,
                "Legacy octal literals are not allowed; use the 0o prefix",
                self.char_span(),
            ));
        }

        self.advance();
        let digits = self.read_digits(8, false)?;

        if self.current_char() == Some('n') {
            return Err(self.error_here(
                LexErrorCode::InvalidNumber,
                "Legacy octal literals cannot have a BigInt suffix",
            ));
        }

        let magnitude = BigInt::parse_bytes(digits.as_bytes(), 8).ok_or_else(|| {
            LexError::new(
                LexErrorCode::InvalidNumber,
                "Invalid octal literal",
                self.span_from(start),
            )
        })?;
        Ok(TokenKind::Number(signed_f64(&magnitude, negative)))
    }

    fn read_decimal(&mut self, negative: bool) -> Result<TokenKind, LexError> {
        let separators = self.config.allow_numeric_separators;
        let mut is_integer = true;

        let integer = if self.current_char().is_some_and(|c| c.is_ascii_digit()) {
            self.read_digits(10, separators)?
        } else {
            String::new()
        };

        let mut fraction = String::new();
        if self.current_char() == Some('.') {
            if integer.is_empty() && self.config.strict_json() {
                return Err(self.error_here(
                    LexErrorCode::InvalidNumber,
                    "Leading decimal point is not allowed in strict JSON",
                ));
            }
            self.advance();
            is_integer = false;

            if self.current_char().is_some_and(|c| c.is_ascii_digit()) {
                fraction = self.read_digits(10, separators)?;
            } else if self.current_char() == Some('_') {
                return Err(self.error_here(
                    LexErrorCode::InvalidNumericSeparator,
                    "Invalid numeric separator position: a separator cannot follow a decimal point",
                ));
            } else if self.config.strict_json() {
                return Err(self.error_here(
                    LexErrorCode::InvalidNumber,
                    "Trailing decimal point is not allowed in strict JSON",
                ));
            }
        }

        let mut exponent = String::new();
        if matches!(self.current_char(), Some('e' | 'E')) {
            self.advance();
            is_integer = false;
            if let Some(sign @ ('+' | '-')) = self.current_char() {
                exponent.push(sign);
                self.advance();
            }
            if self.current_char() == Some('_') {
                return Err(self.error_here(
                    LexErrorCode::InvalidNumericSeparator,
                    "Invalid numeric separator position: a separator cannot start an exponent",
                ));
            }
            let digits = self.read_digits(10, separators)?;
            if digits.is_empty() {
                return Err(self.error_here(
                    LexErrorCode::InvalidNumber,
                    "Expected digits in exponent",
                ));
            }
            exponent.push_str(&digits);
        }

        if self.current_char() == Some('n') {
            if !is_integer {
                return Err(self.error_here(
                    LexErrorCode::BigIntWithFraction,
                    "BigInt cannot have decimal point or exponent",
                ));
            }
            let magnitude = BigInt::parse_bytes(integer.as_bytes(), 10).ok_or_else(|| {
                self.error_here(LexErrorCode::InvalidNumber, "Invalid BigInt literal")
            })?;
            return self.read_bigint_suffix(magnitude, negative);
        }

        let mut text = if integer.is_empty() {
            "0".to_string()
        } else {
            integer
        };
        if !fraction.is_empty() {
            text.push('.');
            text.push_str(&fraction);
        }
        if !exponent.is_empty() {
            text.push('e');
            text.push_str(&exponent);
        }

        let value: f64 = text.parse().map_err(|_| {
            self.error_here(
                LexErrorCode::InvalidNumber,
                format!("Invalid number '{}'", text),
            )
        })?;
        Ok(TokenKind::Number(if negative { -value } else { value }))
    }

    fn read_bigint_suffix(
        &mut self,
        magnitude: BigInt,
        negative: bool,
    ) -> Result<TokenKind, LexError> {
        if !self.config.allow_bigint {
            return Err(self.error_here(
                LexErrorCode::FeatureNotAllowed,
                "BigInt literals require edition 2020 or later",
            ));
        }
        self.advance();
        Ok(TokenKind::BigInt(if negative { -magnitude } else { magnitude }))
    }

    /// Reads a run of digits in `radix`, dropping separators. Returns an empty
    /// string when the cursor is not on a digit.
    fn read_digits(&mut self, radix: u32, separators: bool) -> Result<String, LexError> {
        let mut digits = String::new();
        let mut last_was_digit = false;

        while let Some(ch) = self.current_char() {
            if ch.is_digit(radix) {
                digits.push(ch);
                last_was_digit = true;
                self.advance();
            } else if ch == '_' {
                if !separators {
                    return Err(self.error_here(
                        LexErrorCode::FeatureNotAllowed,
                        if self.config.allow_numeric_separators {
                            "Numeric separators are not allowed in legacy octal literals"
                        } else {
                            "Numeric separators require edition 2021 or later"
                        },
                    ));
                }
                let next_is_digit = self.peek_char(1).is_some_and(|c| c.is_digit(radix));
                if !last_was_digit || !next_is_digit {
                    return Err(self.error_here(
                        LexErrorCode::InvalidNumericSeparator,
                        "Invalid numeric separator position",
                    ));
                }
                last_was_digit = false;
                self.advance();
            } else {
                break;
            }
        }

        Ok(digits)
    }

    fn check_number_end(&self) -> Result<(), LexError> {
        match self.current_char() {
            Some(c) if is_identifier_start(c) || c.is_ascii_digit() => Err(self.error_here(
                LexErrorCode::UnexpectedCharacter,
                format!("Unexpected character '{}' after number", c),
            )),
            _ => Ok(()),
        }
    }

    fn read_string(&mut self, quote: char, start: Position) -> Result<Token, LexError> {
        if quote == '\'' && self.config.strict_json() {
            return Err(self.error_here(
                LexErrorCode::FeatureNotAllowed,
                "Single-quoted strings are not allowed in strict JSON",
            ));
        }

        self.advance(); // Consume opening quote
        let mut result = String::new();

        loop {
            match self.current_char() {
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(self.token(TokenKind::String(result), start));
                }
                None | Some('\n' | '\r') => {
                    return Err(LexError::new(
                        LexErrorCode::UnterminatedString,
                        "Unterminated string: missing closing quote",
                        self.span_from(start),
                    ));
                }
                Some('\\') => {
                    self.advance();
                    if self.current_char().is_none() {
                        return Err(LexError::new(
                            LexErrorCode::UnterminatedString,
                            "Unterminated string: unexpected end of input after backslash",
                            self.span_from(start),
                        ));
                    }
                    self.read_escape(&mut result)?;
                }
                Some(ch) => {
                    result.push(ch);
                    self.advance();
                }
            }
        }
    }

    /// Decodes one escape; the cursor is on the character after the backslash.
    fn read_escape(&mut self, out: &mut String) -> Result<(), LexError> {
        let Some(ch) = self.current_char() else {
            return Ok(());
        };
        let strict = self.config.strict_json();

        let decoded = match ch {
            '"' => Some('"'),
            '\\' => Some('\\'),
            '/' => Some('/'),
            'b' => Some('\u{08}'),
            'f' => Some('\u{0C}'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'u' => {
                let escape_start = self.here();
                self.advance();
                let c = self.read_unicode_escape(escape_start)?;
                out.push(c);
                return Ok(());
            }
            _ if strict => {
                return Err(self.error_here(
                    LexErrorCode::InvalidEscape,
                    format!("Invalid escape sequence '\\{}' in strict JSON", ch.escape_debug()),
                ));
            }
            'v' => Some('\u{0B}'),
            '0' if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                return Err(self.error_here(
                    LexErrorCode::InvalidEscape,
                    "Octal escape sequences are not allowed",
                ));
            }
            '0' => Some('\0'),
            '1'..='9' => {
                return Err(self.error_here(
                    LexErrorCode::InvalidEscape,
                    format!("Invalid escape sequence '\\{}'", ch),
                ));
            }
            'x' => {
                let escape_start = self.here();
                self.advance();
                let code = self.read_hex_digits(2, escape_start)?;
                // Two hex digits are always a valid scalar value
                out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                return Ok(());
            }
            '\r' => {
                self.advance();
                if self.current_char() == Some('\n') {
                    self.advance();
                }
                return Ok(());
            }
            '\n' | '\u{2028}' | '\u{2029}' => None,
            other => Some(other),
        };

        if let Some(c) = decoded {
            out.push(c);
        }
        self.advance();
        Ok(())
    }

    fn read_hex_digits(&mut self, count: usize, escape_start: Position) -> Result<u32, LexError> {
        let mut code = 0u32;
        for _ in 0..count {
            match self.current_char().and_then(|c| c.to_digit(16)) {
                Some(digit) => {
                    code = code * 16 + digit;
                    self.advance();
                }
                None => {
                    return Err(LexError::new(
                        LexErrorCode::InvalidEscape,
                        format!("Invalid escape sequence: expected {} hex digits", count),
                        self.span_from(escape_start),
                    ));
                }
            }
        }
        Ok(code)
    }

    /// `\uHHHH`, pairing a high surrogate with a following `\uHHHH` low surrogate.
    fn read_unicode_escape(&mut self, escape_start: Position) -> Result<char, LexError> {
        let unit = self.read_hex_digits(4, escape_start)?;

        if (0xD800..0xDC00).contains(&unit)
            && self.current_char() == Some('\\')
            && self.peek_char(1) == Some('u')
        {
            let low_start = self.here();
            self.advance();
            self.advance();
            let low = self.read_hex_digits(4, low_start)?;
            if (0xDC00..0xE000).contains(&low) {
                let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                if let Some(c) = char::from_u32(code) {
                    return Ok(c);
                }
            }
        }

        char::from_u32(unit).ok_or_else(|| {
            LexError::new(
                LexErrorCode::InvalidEscape,
                format!("Unpaired surrogate '\\u{:04X}' cannot be represented", unit),
                self.span_from(escape_start),
            )
        })
    }

    fn read_template(&mut self, start: Position) -> Result<Token, LexError> {
        if !self.config.allow_templates {
            return Err(self.error_here(
                LexErrorCode::FeatureNotAllowed,
                if self.config.mode == Mode::Full {
                    "Template literals require edition 2015 or later"
                } else {
                    "Template literals are not allowed in this mode"
                },
            ));
        }

        self.advance(); // Consume backtick
        let (text, end) = self.read_template_chars(start)?;

        let kind = match end {
            TemplateEnd::Backtick => TokenKind::TemplateWhole(text),
            TemplateEnd::Interpolation => {
                self.template_depth += 1;
                self.brace_depths.push(0);
                TokenKind::TemplateHead(text)
            }
        };
        Ok(self.token(kind, start))
    }

    /// Called on the `}` closing an interpolation.
    fn read_template_continuation(&mut self, start: Position) -> Result<Token, LexError> {
        self.advance(); // Consume '}'
        let (text, end) = self.read_template_chars(start)?;

        let kind = match end {
            TemplateEnd::Backtick => {
                self.template_depth -= 1;
                self.brace_depths.pop();
                TokenKind::TemplateTail(text)
            }
            TemplateEnd::Interpolation => TokenKind::TemplateMiddle(text),
        };
        Ok(self.token(kind, start))
    }

    fn read_template_chars(&mut self, start: Position) -> Result<(String, TemplateEnd), LexError> {
        let mut text = String::new();

        loop {
            match self.current_char() {
                None => {
                    return Err(LexError::new(
                        LexErrorCode::UnterminatedTemplate,
                        "Unterminated template literal: missing closing backtick",
                        self.span_from(start),
                    ));
                }
                Some('`') => {
                    self.advance();
                    return Ok((text, TemplateEnd::Backtick));
                }
                Some('$') if self.peek_char(1) == Some('{') => {
                    self.advance();
                    self.advance();
                    return Ok((text, TemplateEnd::Interpolation));
                }
                Some('\\') => {
                    self.advance();
                    if self.current_char().is_none() {
                        continue;
                    }
                    self.read_escape(&mut text)?;
                }
                Some('\r') => {
                    text.push('\n');
                    self.advance();
                    if self.current_char() == Some('\n') {
                        self.advance();
                    }
                }
                Some(ch) => {
                    text.push(ch);
                    self.advance();
                }
            }
        }
    }
}

fn special_value(word: &str) -> f64 {
    if word == "NaN" { f64::NAN } else { f64::INFINITY }
}

fn signed_f64(magnitude: &BigInt, negative: bool) -> f64 {
    let value = magnitude.to_f64().unwrap_or(f64::INFINITY);
    if negative { -value } else { value }
}

pub fn is_whitespace(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '\t'
            | '\n'
            | '\r'
            | '\u{0B}'
            | '\u{0C}'
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

pub fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

pub fn is_identifier_part(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("true false null Infinity NaN");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Boolean(true));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Boolean(false));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Null);
    assert_eq!(
        lexer.next_token().unwrap().kind,
        TokenKind::SpecialNumber(f64::INFINITY)
    );
    assert!(matches!(
        lexer.next_token().unwrap().kind,
        TokenKind::SpecialNumber(n) if n.is_nan()
    ));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
}

#[test]
fn test_template_braces() {
    let tokens = Lexer::new("`a${ {x: 1} }b`").tokenize().unwrap();
    let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::TemplateHead("a".into()),
            TokenKind::LBrace,
            TokenKind::Identifier("x".into()),
            TokenKind::Colon,
            TokenKind::Number(1.0),
            TokenKind::RBrace,
            TokenKind::TemplateTail("b".into()),
            TokenKind::Eof,
        ]
    );
}
