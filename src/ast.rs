//! # refjson - Abstract Syntax Tree
//!
//! The syntax tree for refjson documents: JSON5 extended with edition-gated
//! literal forms and *internal references*.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Value nodes (literals, objects, arrays, references, templates)
//!
//! ## Quick Start
//!
//! ```text
//! {
//!   host: "localhost",
//!   port: 8080,
//!   url: `http://${host}:${port}`,   // template with references
//!   backup: { port: port },           // bare reference
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### References
//!
//! A bare identifier in value position names a top-level key of the same
//! document. A dotted chain walks nested objects:
//!
//! ```text
//! { server: { port: 8080 }, url: server.port }
//! ```
//!
//! References may point forwards or backwards. They are read-only: there are
//! no operators, calls or computed keys.
//!
//! ### Templates
//!
//! Backtick strings interpolate values with `${...}`. Every interpolated value
//! is converted to a string.
//!
//! ### Editions
//!
//! Which literal forms are accepted depends on the edition, see
//! [`Edition`](crate::Edition).
pub mod expressions;
pub mod tokens;

pub use expressions::{Expr, Literal, Property};
pub use tokens::{Token, TokenKind};
