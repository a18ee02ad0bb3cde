use num_bigint::BigInt;

use crate::lexer::Span;

/// A lexical token with its exact source text and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text exactly as written, including quotes, signs and separators.
    pub raw: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, raw: impl Into<String>, span: Span) -> Self {
        Token {
            kind,
            raw: raw.into(),
            span,
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::LineComment(_) | TokenKind::BlockComment(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// String literal in double or single quotes, escapes decoded
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'it\'s'
    /// ```
    String(String),

    /// Number literal (decimal, hex, binary, octal or legacy octal)
    ///
    /// The sign is part of the token.
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -3.5e2
    /// 0xFF
    /// 1_000
    /// ```
    Number(f64),

    /// Arbitrary-precision integer written with the `n` suffix
    ///
    /// # Examples
    /// ```text
    /// 9007199254740993n
    /// 0xFFn
    /// ```
    BigInt(BigInt),

    /// `true` or `false`
    Boolean(bool),

    /// `null`
    Null,

    /// `Infinity`, `NaN`, optionally signed
    ///
    /// # Examples
    /// ```text
    /// Infinity
    /// -Infinity
    /// NaN
    /// ```
    SpecialNumber(f64),

    /// Bare name: a reference or an unquoted key
    ///
    /// # Examples
    /// ```text
    /// port
    /// $schema
    /// _internal
    /// ```
    Identifier(String),

    // Template literals
    /// Template without interpolation: `` `text` ``
    TemplateWhole(String),

    /// Text from the opening backtick up to the first `${`
    TemplateHead(String),

    /// Text between a `}` and the next `${`
    TemplateMiddle(String),

    /// Text between the last `}` and the closing backtick
    TemplateTail(String),

    // Comments, only produced when comments are preserved
    /// `// text`
    LineComment(String),

    /// `/* text */`
    BlockComment(String),

    // Punctuation
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,
    Dot,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Short description used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::String(_) => "string",
            TokenKind::Number(_) => "number",
            TokenKind::BigInt(_) => "BigInt",
            TokenKind::Boolean(_) => "boolean",
            TokenKind::Null => "null",
            TokenKind::SpecialNumber(_) => "number",
            TokenKind::Identifier(_) => "identifier",
            TokenKind::TemplateWhole(_) => "template literal",
            TokenKind::TemplateHead(_) => "template literal",
            TokenKind::TemplateMiddle(_) => "template continuation",
            TokenKind::TemplateTail(_) => "end of template",
            TokenKind::LineComment(_) | TokenKind::BlockComment(_) => "comment",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Eof => "end of input",
        }
    }
}
