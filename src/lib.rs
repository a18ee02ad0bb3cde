pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod edition;
pub mod error;
pub mod evaluator;
pub mod features;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod path;
pub mod stringify;
pub mod value;

pub use ast::{Expr, Literal, Property, Token, TokenKind};
pub use edition::{DEFAULT_EDITION, Edition, Features};
pub use error::{Error, Result};
pub use evaluator::{DEFAULT_MAX_PASSES, EvalError, Evaluator, Reviver, Unresolved};
pub use features::{FeatureReport, detect_features};
pub use lexer::{LexError, LexErrorCode, Lexer, LexerConfig, Mode, Position, Span};
pub use options::ParseOptions;
pub use parser::{MAX_SAFE_INTEGER, ParseError, ParseErrorCode, Parser, ParserConfig};
pub use path::{Path, PathSegment};
pub use stringify::{StringifyOptions, to_json, to_json_pretty, to_json5};
pub use value::{Map, Value};

use tracing::debug;

/// Parse and resolve a document with default options.
///
/// ```
/// use refjson::{Value, parse};
///
/// let doc = parse("{port: 8080, url: `http://localhost:${port}`}").unwrap();
/// assert_eq!(doc.get("url"), Some(&Value::from("http://localhost:8080")));
/// ```
pub fn parse(source: &str) -> Result<Value> {
    parse_with(source, &ParseOptions::default())
}

/// Parse and resolve a document.
///
/// In tolerant mode the first collected error is returned; use
/// [`parse_to_ast`] to see all of them.
pub fn parse_with(source: &str, options: &ParseOptions) -> Result<Value> {
    debug!(
        edition = %options.resolved_edition(),
        mode = ?options.mode,
        len = source.len(),
        "parsing document"
    );

    let lexer = Lexer::with_config(source, options.lexer_config());
    let parser = Parser::with_config(lexer, options.parser_config())?;

    let (expr, errors) = parser.parse_document();
    if let Some(error) = errors.into_iter().next() {
        return Err(error);
    }
    let Some(expr) = expr else {
        return Ok(Value::Null);
    };

    Ok(options.evaluator().evaluate(&expr)?)
}

/// Parse without resolving references.
///
/// Never fails outright: the tree is `None` when parsing had to stop, and
/// every error met along the way is returned.
pub fn parse_to_ast(source: &str, options: &ParseOptions) -> (Option<Expr>, Vec<Error>) {
    debug!(
        edition = %options.resolved_edition(),
        mode = ?options.mode,
        "parsing document to syntax tree"
    );

    let lexer = Lexer::with_config(source, options.lexer_config());
    match Parser::with_config(lexer, options.parser_config()) {
        Ok(parser) => parser.parse_document(),
        Err(error) => (None, vec![error]),
    }
}
