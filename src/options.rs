use std::fmt;
use std::sync::Arc;

use crate::{
    edition::{DEFAULT_EDITION, Edition},
    evaluator::{DEFAULT_MAX_PASSES, Evaluator, Reviver},
    lexer::{LexerConfig, Mode},
    parser::{DEFAULT_MAX_DEPTH, ParserConfig},
    value::Value,
};

/// Options for [`parse_with`](crate::parse_with) and
/// [`parse_to_ast`](crate::parse_to_ast).
///
/// ```
/// use refjson::{Mode, ParseOptions, parse_with};
///
/// let options = ParseOptions::new().with_edition(2009).with_mode(Mode::Json5Only);
/// assert!(parse_with("0b1010", &options).is_err());
/// ```
#[derive(Clone)]
pub struct ParseOptions {
    /// Requested edition year; clamped to the supported range
    pub edition: i64,
    pub mode: Mode,
    pub allow_references: bool,
    /// Keep comment tokens (see [`Parser::comments`](crate::Parser::comments))
    pub preserve_comments: bool,
    /// Collect syntax errors instead of stopping at the first
    pub tolerant: bool,
    /// Reject integers above 2^53 - 1 instead of promoting them to BigInt
    pub strict_bigint: bool,
    /// Reject legacy octal literals such as `0755`
    pub strict_octal: bool,
    pub max_passes: usize,
    pub max_depth: usize,
    pub reviver: Option<Arc<Reviver>>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            edition: DEFAULT_EDITION,
            mode: Mode::Full,
            allow_references: true,
            preserve_comments: false,
            tolerant: false,
            strict_bigint: false,
            strict_octal: false,
            max_passes: DEFAULT_MAX_PASSES,
            max_depth: DEFAULT_MAX_DEPTH,
            reviver: None,
        }
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("edition", &self.edition)
            .field("mode", &self.mode)
            .field("allow_references", &self.allow_references)
            .field("preserve_comments", &self.preserve_comments)
            .field("tolerant", &self.tolerant)
            .field("strict_bigint", &self.strict_bigint)
            .field("strict_octal", &self.strict_octal)
            .field("max_passes", &self.max_passes)
            .field("max_depth", &self.max_depth)
            .field("reviver", &self.reviver.is_some())
            .finish()
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_edition(mut self, edition: i64) -> Self {
        self.edition = edition;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_references(mut self, allow: bool) -> Self {
        self.allow_references = allow;
        self
    }

    pub fn with_preserve_comments(mut self, preserve: bool) -> Self {
        self.preserve_comments = preserve;
        self
    }

    pub fn with_tolerant(mut self, tolerant: bool) -> Self {
        self.tolerant = tolerant;
        self
    }

    pub fn with_strict_bigint(mut self, strict: bool) -> Self {
        self.strict_bigint = strict;
        self
    }

    pub fn with_strict_octal(mut self, strict: bool) -> Self {
        self.strict_octal = strict;
        self
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Install a reviver, called bottom-up as `(key, value, holder)`.
    pub fn with_reviver<F>(mut self, reviver: F) -> Self
    where
        F: Fn(&str, Value, &Value) -> Option<Value> + Send + Sync + 'static,
    {
        let reviver: Arc<Reviver> = Arc::new(reviver);
        self.reviver = Some(reviver);
        self
    }

    /// The edition the requested year resolves to.
    pub fn resolved_edition(&self) -> Edition {
        Edition::resolve(self.edition)
    }

    pub fn lexer_config(&self) -> LexerConfig {
        LexerConfig::for_edition(self.resolved_edition(), self.mode)
            .with_preserve_comments(self.preserve_comments)
            .with_strict_octal(self.strict_octal)
    }

    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig {
            // Json5Only and StrictJson never allow references
            allow_references: self.allow_references && self.mode == Mode::Full,
            tolerant: self.tolerant,
            strict_bigint: self.strict_bigint,
            max_depth: self.max_depth,
            mode: self.mode,
        }
    }

    pub fn evaluator(&self) -> Evaluator {
        Evaluator::new()
            .with_max_passes(self.max_passes)
            .with_reviver(self.reviver.clone())
    }
}
