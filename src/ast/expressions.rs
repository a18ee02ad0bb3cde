use num_bigint::BigInt;

use crate::lexer::Span;

/// Abstract Syntax Tree node for one value in a document.
///
/// The parser is the only producer. The tree is never mutated after parsing;
/// the evaluator reads it to build a [`Value`](crate::Value).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal scalar
    ///
    /// # Example
    /// ```text
    /// "hello"
    /// 0xFF
    /// 12n
    /// null
    /// ```
    Literal {
        value: Literal,
        /// Source text as written
        raw: String,
        span: Span,
    },

    /// Object literal, properties in source order
    ///
    /// # Example
    /// ```text
    /// {host: "localhost", 'port': 8080}
    /// ```
    Object { properties: Vec<Property>, span: Span },

    /// Array literal
    ///
    /// # Example
    /// ```text
    /// [1, "two", three]
    /// ```
    Array { elements: Vec<Expr>, span: Span },

    /// Bare reference to a top-level key
    ///
    /// # Example
    /// ```text
    /// port
    /// ```
    Identifier { name: String, span: Span },

    /// Dotted reference path. Always non-computed; the segments after the
    /// top-level key are kept flat.
    ///
    /// # Example
    /// ```text
    /// server.tls.port     // Member { object: "server", path: ["tls", "port"] }
    /// ```
    Member {
        object: String,
        path: Vec<String>,
        span: Span,
    },

    /// Template literal with `${...}` interpolations
    ///
    /// `quasis.len() == expressions.len() + 1` always holds.
    ///
    /// # Example
    /// ```text
    /// `http://${host}:${port}`
    /// ```
    Template {
        quasis: Vec<String>,
        expressions: Vec<Expr>,
        span: Span,
    },
}

/// Decoded literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Number(f64),
    /// Written with the `n` suffix, or an integer too large for an `f64`
    BigInt(BigInt),
    String(String),
}

/// One `key: value` entry of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Decoded key. Numeric keys are stored in canonical string form.
    pub key: String,
    pub key_span: Span,
    pub value: Expr,
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal { span, .. }
            | Expr::Object { span, .. }
            | Expr::Array { span, .. }
            | Expr::Identifier { span, .. }
            | Expr::Member { span, .. }
            | Expr::Template { span, .. } => *span,
        }
    }

    pub fn null(span: Span) -> Expr {
        Expr::Literal {
            value: Literal::Null,
            raw: "null".to_string(),
            span,
        }
    }

    /// Whether evaluating this node requires a reference lookup.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Expr::Identifier { .. } | Expr::Member { .. } | Expr::Template { .. }
        )
    }

    /// Key segments of an identifier or member chain: `a.b.c` → `["a", "b", "c"]`.
    pub fn reference_segments(&self) -> Option<Vec<&str>> {
        match self {
            Expr::Identifier { name, .. } => Some(vec![name.as_str()]),
            Expr::Member { object, path, .. } => Some(
                std::iter::once(object.as_str())
                    .chain(path.iter().map(String::as_str))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Human-readable path used in diagnostics.
    ///
    /// References render as dotted paths; templates render back as template
    /// source with their interpolations.
    pub fn reference_path(&self) -> String {
        match self {
            Expr::Identifier { name, .. } => name.clone(),
            Expr::Member { object, path, .. } => {
                let mut out = object.clone();
                for segment in path {
                    out.push('.');
                    out.push_str(segment);
                }
                out
            }
            Expr::Template {
                quasis,
                expressions,
                ..
            } => {
                let mut out = String::from("`");
                for (i, quasi) in quasis.iter().enumerate() {
                    out.push_str(quasi);
                    if let Some(expr) = expressions.get(i) {
                        out.push_str("${");
                        out.push_str(&expr.reference_path());
                        out.push('}');
                    }
                }
                out.push('`');
                out
            }
            Expr::Literal { raw, .. } => raw.clone(),
            Expr::Object { .. } => "{...}".to_string(),
            Expr::Array { .. } => "[...]".to_string(),
        }
    }
}
