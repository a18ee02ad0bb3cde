//! Feature editions.
//!
//! A document is parsed under an *edition*: a year marker deciding which
//! literal forms are legal. Any year may be requested; it is snapped to the
//! nearest feature edition at or below it.
//!
//! | Edition | Adds                                                          |
//! |---------|---------------------------------------------------------------|
//! | 2009    | JSON5 base: hex, comments, single quotes, `Infinity`, `NaN`    |
//! | 2015    | `0b`/`0o` literals, template literals                          |
//! | 2020    | BigInt suffix `n`                                              |
//! | 2021    | numeric separators `_`                                         |

use std::fmt;

/// The edition used when the caller does not ask for one.
pub const DEFAULT_EDITION: i64 = 2021;

/// A feature edition. Ordering follows the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Edition {
    Es2009,
    Es2015,
    Es2020,
    Es2021,
}

impl Edition {
    /// All feature editions, oldest first.
    pub const ALL: [Edition; 4] = [
        Edition::Es2009,
        Edition::Es2015,
        Edition::Es2020,
        Edition::Es2021,
    ];

    pub const MIN: Edition = Edition::Es2009;
    pub const MAX: Edition = Edition::Es2021;

    /// Snap a requested year to a feature edition.
    ///
    /// Returns the greatest feature edition not above `requested`, clamped to
    /// [`Edition::MIN`] for years before the first one.
    ///
    /// ```
    /// use refjson::Edition;
    ///
    /// assert_eq!(Edition::resolve(2018), Edition::Es2015);
    /// assert_eq!(Edition::resolve(1999), Edition::Es2009);
    /// assert_eq!(Edition::resolve(3000), Edition::Es2021);
    /// ```
    pub fn resolve(requested: i64) -> Edition {
        Edition::ALL
            .iter()
            .rev()
            .copied()
            .find(|edition| edition.year() <= requested)
            .unwrap_or(Edition::MIN)
    }

    pub fn year(self) -> i64 {
        match self {
            Edition::Es2009 => 2009,
            Edition::Es2015 => 2015,
            Edition::Es2020 => 2020,
            Edition::Es2021 => 2021,
        }
    }

    /// Syntax enabled at this edition (cumulative).
    pub fn features(self) -> Features {
        Features {
            hex: true,
            binary_octal: self >= Edition::Es2015,
            template_literals: self >= Edition::Es2015,
            bigint: self >= Edition::Es2020,
            numeric_separators: self >= Edition::Es2021,
        }
    }

    /// Short description of what this edition introduces.
    pub fn introduces(self) -> &'static str {
        match self {
            Edition::Es2009 => {
                "JSON5 base: comments, single quotes, unquoted keys, trailing commas, hex, Infinity/NaN"
            }
            Edition::Es2015 => "binary (0b) and octal (0o) literals, template literals",
            Edition::Es2020 => "BigInt literals (n suffix)",
            Edition::Es2021 => "numeric separators (1_000_000)",
        }
    }
}

impl Default for Edition {
    fn default() -> Self {
        Edition::resolve(DEFAULT_EDITION)
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.year())
    }
}

/// Edition-gated literal forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    pub hex: bool,
    pub binary_octal: bool,
    pub template_literals: bool,
    pub bigint: bool,
    pub numeric_separators: bool,
}

/// Resolve a requested year. Shorthand for [`Edition::resolve`].
pub fn resolve(requested: i64) -> Edition {
    Edition::resolve(requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_years() {
        for edition in Edition::ALL {
            assert_eq!(Edition::resolve(edition.year()), edition);
        }
    }

    #[test]
    fn test_between_years() {
        assert_eq!(Edition::resolve(2014), Edition::Es2009);
        assert_eq!(Edition::resolve(2019), Edition::Es2015);
        assert_eq!(Edition::resolve(2020), Edition::Es2020);
    }

    #[test]
    fn test_default_is_latest() {
        assert_eq!(Edition::default(), Edition::Es2021);
    }
}
