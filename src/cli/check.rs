//! Parse and resolve refjson documents

use tracing::debug;

use super::{CliError, OutputFormat, render};
use crate::{FeatureReport, Mode, ParseOptions, detect_features, parse_to_ast, parse_with};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Document text
    pub input: Option<String>,
    pub edition: Option<i64>,
    pub mode: Mode,
    pub strict_bigint: bool,
    pub strict_octal: bool,
    pub no_references: bool,
    /// Report every syntax error instead of the first
    pub tolerant: bool,
    /// Only validate syntax, don't resolve references
    pub syntax_only: bool,
    pub format: OutputFormat,
}

impl CheckOptions {
    pub fn parse_options(&self) -> ParseOptions {
        let mut options = ParseOptions::new()
            .with_mode(self.mode)
            .with_strict_bigint(self.strict_bigint)
            .with_strict_octal(self.strict_octal)
            .with_references(!self.no_references)
            .with_tolerant(self.tolerant);
        if let Some(edition) = self.edition {
            options = options.with_edition(edition);
        }
        options
    }
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Document resolved; rendered in the requested format
    Success(String),
}

/// Execute a refjson check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let source = options.input.as_deref().ok_or(CliError::NoInput)?;
    let parse_options = options.parse_options();
    debug!(?parse_options, syntax_only = options.syntax_only, "running check");

    if options.syntax_only || options.tolerant {
        let (_, mut errors) = parse_to_ast(source, &parse_options);
        if errors.len() > 1 {
            return Err(CliError::Documents(errors));
        }
        if let Some(error) = errors.pop() {
            return Err(error.into());
        }
        if options.syntax_only {
            return Ok(CheckResult::SyntaxValid);
        }
    }

    let value = parse_with(source, &parse_options)?;
    Ok(CheckResult::Success(render(&value, options.format)))
}

/// Execute a refjson features operation
pub fn execute_features(input: Option<&str>) -> Result<FeatureReport, CliError> {
    let source = input.ok_or(CliError::NoInput)?;
    Ok(detect_features(source)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(input: &str) -> CheckOptions {
        CheckOptions {
            input: Some(input.to_string()),
            ..CheckOptions::default()
        }
    }

    #[test]
    fn test_check_resolves_references() {
        let result = execute_check(&check("{a: 1, b: a}")).unwrap();
        match result {
            CheckResult::Success(output) => assert_eq!(output, r#"{"a":1,"b":1}"#),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_syntax_only_skips_resolution() {
        let options = CheckOptions {
            syntax_only: true,
            ..check("{a: missing}")
        };
        assert!(matches!(execute_check(&options), Ok(CheckResult::SyntaxValid)));
    }

    #[test]
    fn test_tolerant_reports_every_error() {
        let options = CheckOptions {
            tolerant: true,
            ..check("{a: 1 b: 2 c: 3}")
        };
        match execute_check(&options) {
            Err(CliError::Documents(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_input() {
        assert!(matches!(
            execute_check(&CheckOptions::default()),
            Err(CliError::NoInput)
        ));
    }
}
