//! Documentation content for the refjson CLI

use super::CliError;
use crate::Edition;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    References,
    Templates,
    Editions,
    Modes,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" => Some(Self::Syntax),
            "references" | "reference" | "refs" => Some(Self::References),
            "templates" | "template" => Some(Self::Templates),
            "editions" | "edition" => Some(Self::Editions),
            "modes" | "mode" => Some(Self::Modes),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"REFJSON DOCUMENTATION

refjson reads JSON5 documents extended with edition-gated literal forms and
internal references: values may name other keys of the same document.

DOCUMENTATION CATEGORIES

  syntax            JSON5 base syntax: comments, quotes, keys, numbers
  references        Bare and dotted references, resolution rules
  templates         Backtick strings with ${...} interpolation
  editions          Which literal forms each edition accepts
  modes             full, json5 and json parsing modes

QUICK REFERENCE

  // line  /* block */     Comments
  'single' "double"        Strings
  {key: 1, 'k-2': 2,}      Unquoted keys, trailing commas
  0xFF 0b1010 0o17         Hex, binary, octal
  1_000_000 12n            Separators, BigInt
  other.key                Reference
  `${host}:${port}`        Template

Run 'refjson doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<String, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC.to_string()),
        Some(DocCategory::References) => Ok(REFERENCES_DOC.to_string()),
        Some(DocCategory::Templates) => Ok(TEMPLATES_DOC.to_string()),
        Some(DocCategory::Editions) => Ok(editions_table()),
        Some(DocCategory::Modes) => Ok(MODES_DOC.to_string()),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

/// The edition table, generated from [`Edition::ALL`].
pub fn editions_table() -> String {
    let mut out = String::from("EDITIONS\n\n");
    for edition in Edition::ALL {
        let marker = if edition == Edition::default() {
            " (default)"
        } else {
            ""
        };
        out.push_str(&format!(
            "  {}{:<10}  {}\n",
            edition,
            marker,
            edition.introduces()
        ));
    }
    out.push_str(
        "\nAny year may be requested. It resolves to the newest edition at or\n\
         below it; years before 2009 resolve to 2009.\n",
    );
    out
}

const SYNTAX_DOC: &str = r#"SYNTAX - JSON5 Base

COMMENTS
  // to end of line
  /* block, not nested */

STRINGS
  "double" or 'single' quoted. Escapes: \n \t \r \b \f \v \0 \xHH \uHHHH,
  escaped line breaks continue the string.

KEYS
  Identifiers ({port: 1}), strings ({'content-type': 1}) or unsigned numbers.
  A repeated key keeps its first position and its last value.

NUMBERS
  Leading or trailing decimal point (.5, 5.), explicit sign (+1),
  Infinity, -Infinity, NaN, hexadecimal 0xFF.

TRAILING COMMAS
  Allowed after the last element of arrays and objects.
"#;

const REFERENCES_DOC: &str = r#"REFERENCES

BARE REFERENCE
  {port: 8080, backup: port}
    An identifier in value position names a top-level key.

MEMBER PATH
  {server: {port: 8080}, url: server.port}
    Dots walk nested objects.

ORDER
  References may point forwards or backwards. Chains resolve in up to three
  passes by default.

ERRORS
  {a: b, b: a}        Unresolved reference: circular
  {a: missing}        Unresolved reference: undefined
"#;

const TEMPLATES_DOC: &str = r#"TEMPLATES (edition 2015+)

  {host: "localhost", port: 8080, url: `http://${host}:${port}`}
    Result: "http://localhost:8080"

  Interpolated values are converted to strings: numbers in their shortest
  form, arrays joined with commas, objects as [object Object].
"#;

const MODES_DOC: &str = r#"MODES

  full     Everything the edition allows, references included (default)
  json5    JSON5 only: no binary/octal, BigInt, separators, templates or
           references
  json     Strict RFC 8259 JSON
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_aliases() {
        assert_eq!(DocCategory::from_name("refs"), Some(DocCategory::References));
        assert_eq!(DocCategory::from_name("Edition"), Some(DocCategory::Editions));
        assert!(get_doc_category("queries").is_err());
    }

    #[test]
    fn test_editions_table_lists_every_edition() {
        let table = editions_table();
        for edition in Edition::ALL {
            assert!(table.contains(&edition.to_string()));
        }
        assert!(table.contains("2021 (default)"));
    }
}
