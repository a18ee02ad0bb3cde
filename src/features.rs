//! Syntax feature detection.
//!
//! [`detect_features`] tokenizes a document with everything enabled and
//! reports which extensions over plain JSON it actually uses, together with
//! the oldest edition that accepts it.

use std::fmt;

use crate::{
    ast::{Token, TokenKind},
    edition::Edition,
    error::Result,
    lexer::{Lexer, LexerConfig},
};

/// Syntax features found in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureReport {
    pub comments: bool,
    pub single_quotes: bool,
    pub unquoted_keys: bool,
    pub trailing_commas: bool,
    pub hex: bool,
    pub binary_octal: bool,
    pub legacy_octal: bool,
    pub bigint: bool,
    pub numeric_separators: bool,
    pub template_literals: bool,
    pub special_numbers: bool,
    pub references: bool,
    pub leading_decimal_point: bool,
    pub trailing_decimal_point: bool,
    pub explicit_plus: bool,
}

impl FeatureReport {
    /// Oldest edition whose literal forms cover every feature found.
    pub fn minimum_edition(&self) -> Edition {
        if self.numeric_separators {
            Edition::Es2021
        } else if self.bigint {
            Edition::Es2020
        } else if self.binary_octal || self.template_literals {
            Edition::Es2015
        } else {
            Edition::Es2009
        }
    }

    /// Whether a plain JSON reader would accept the syntax.
    pub fn is_strict_json(&self) -> bool {
        self.names().is_empty()
    }

    /// Whether the document needs references resolved.
    pub fn needs_references(&self) -> bool {
        self.references
    }

    /// Names of the features present, in a fixed order.
    pub fn names(&self) -> Vec<&'static str> {
        [
            (self.comments, "comments"),
            (self.single_quotes, "single-quotes"),
            (self.unquoted_keys, "unquoted-keys"),
            (self.trailing_commas, "trailing-commas"),
            (self.hex, "hex"),
            (self.binary_octal, "binary-octal"),
            (self.legacy_octal, "legacy-octal"),
            (self.bigint, "bigint"),
            (self.numeric_separators, "numeric-separators"),
            (self.template_literals, "template-literals"),
            (self.special_numbers, "infinity-nan"),
            (self.references, "references"),
            (self.leading_decimal_point, "leading-decimal-point"),
            (self.trailing_decimal_point, "trailing-decimal-point"),
            (self.explicit_plus, "explicit-plus"),
        ]
        .into_iter()
        .filter_map(|(present, name)| present.then_some(name))
        .collect()
    }

    fn record(&mut self, token: &Token, next: Option<&Token>) {
        let followed_by_colon = next.is_some_and(|t| t.kind == TokenKind::Colon);
        let closes_container = next.is_some_and(|t| {
            matches!(t.kind, TokenKind::RBrace | TokenKind::RBracket)
        });

        match &token.kind {
            TokenKind::LineComment(_) | TokenKind::BlockComment(_) => self.comments = true,
            TokenKind::String(_) => self.single_quotes |= token.raw.starts_with('\''),
            TokenKind::Comma => self.trailing_commas |= closes_container,
            TokenKind::Number(_) | TokenKind::BigInt(_) => {
                self.unquoted_keys |= followed_by_colon;
                self.record_number(token);
            }
            TokenKind::SpecialNumber(_) => {
                if followed_by_colon {
                    self.unquoted_keys = true;
                } else {
                    self.special_numbers = true;
                    self.explicit_plus |= token.raw.starts_with('+');
                }
            }
            TokenKind::Boolean(_) | TokenKind::Null => self.unquoted_keys |= followed_by_colon,
            TokenKind::Identifier(_) => {
                if followed_by_colon {
                    self.unquoted_keys = true;
                } else {
                    self.references = true;
                }
            }
            TokenKind::TemplateWhole(_)
            | TokenKind::TemplateHead(_)
            | TokenKind::TemplateMiddle(_)
            | TokenKind::TemplateTail(_) => self.template_literals = true,
            _ => {}
        }
    }

    fn record_number(&mut self, token: &Token) {
        let raw = token.raw.as_str();
        self.explicit_plus |= raw.starts_with('+');
        let body = raw.trim_start_matches(['+', '-']);
        let lower = body.to_ascii_lowercase();

        self.bigint |= matches!(token.kind, TokenKind::BigInt(_));
        self.numeric_separators |= body.contains('_');

        if lower.starts_with("0x") {
            self.hex = true;
        } else if lower.starts_with("0b") || lower.starts_with("0o") {
            self.binary_octal = true;
        } else {
            let digits = body.trim_end_matches('n');
            self.legacy_octal |= digits.len() > 1
                && digits.starts_with('0')
                && digits.chars().all(|c| c.is_digit(8) || c == '_');
            self.leading_decimal_point |= digits.starts_with('.');
            self.trailing_decimal_point |= digits.ends_with('.');
        }
    }
}

impl fmt::Display for FeatureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.names();
        if names.is_empty() {
            writeln!(f, "features: none (plain JSON)")?;
        } else {
            writeln!(f, "features: {}", names.join(", "))?;
        }
        write!(f, "minimum edition: {}", self.minimum_edition())
    }
}

/// Report the syntax features a document uses.
///
/// Only lexical errors fail; grammar is not checked.
///
/// ```
/// use refjson::{Edition, detect_features};
///
/// let report = detect_features("{size: 1_024, id: 7n}").unwrap();
/// assert!(report.numeric_separators && report.bigint && report.unquoted_keys);
/// assert_eq!(report.minimum_edition(), Edition::Es2021);
/// ```
pub fn detect_features(source: &str) -> Result<FeatureReport> {
    let tokens = Lexer::with_config(source, LexerConfig::permissive()).tokenize()?;

    let mut report = FeatureReport::default();
    let mut significant = tokens.iter().filter(|token| !token.is_comment()).peekable();
    while let Some(token) = significant.next() {
        report.record(token, significant.peek().copied());
    }
    report.comments = tokens.iter().any(Token::is_comment);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json_has_no_features() {
        let report = detect_features(r#"{"a": [1, 2.5, "x", null, true]}"#).unwrap();
        assert!(report.is_strict_json());
        assert_eq!(report.minimum_edition(), Edition::Es2009);
    }

    #[test]
    fn test_reference_versus_key() {
        let report = detect_features("{a: 1, b: a}").unwrap();
        assert!(report.unquoted_keys);
        assert!(report.references);
    }

    #[test]
    fn test_decimal_points() {
        let report = detect_features("[.5, 5., +1]").unwrap();
        assert!(report.leading_decimal_point);
        assert!(report.trailing_decimal_point);
        assert!(report.explicit_plus);
    }
}
