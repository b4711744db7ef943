//! Parser configuration.

use std::env;

use crate::precedence::PrecedenceTable;

/// Default cap on reported errors.
pub const DEFAULT_MAX_ERRORS: usize = 64;

/// The rule budget is checked once per this many rule invocations.
pub const BUDGET_CHECK_INTERVAL: usize = 64;

/// Default cap on nested rules and operator levels. Each parenthesis
/// nests about three levels.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Knobs for a single parse.
///
/// [`Default`] never reads the environment; use [`ParserConfig::from_env`]
/// for that.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct ParserConfig {
    /// Resynchronize after an error and keep parsing.
    pub recover: bool,

    /// Stop after this many errors.
    pub max_errors: usize,

    /// Reject token streams longer than this.
    pub max_tokens: Option<usize>,

    /// Abort after this many rule invocations.
    pub rule_budget: Option<usize>,

    /// Abort when rules nest deeper than this.
    pub max_depth: usize,

    /// Operator table for expressions.
    #[cfg_attr(feature = "serde", serde(skip, default = "adql_precedence"))]
    pub precedence: &'static PrecedenceTable,
}

#[cfg(feature = "serde")]
const fn adql_precedence() -> &'static PrecedenceTable {
    &PrecedenceTable::ADQL
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            recover: true,
            max_errors: DEFAULT_MAX_ERRORS,
            max_tokens: None,
            rule_budget: None,
            max_depth: DEFAULT_MAX_DEPTH,
            precedence: &PrecedenceTable::ADQL,
        }
    }
}

fn env_value<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl ParserConfig {
    /// Reads `ADQL_RECOVER`, `ADQL_MAX_ERRORS`, `ADQL_MAX_TOKENS`,
    /// `ADQL_RULE_BUDGET` and `ADQL_MAX_DEPTH`, falling back to the defaults
    /// for unset or unparsable values.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            recover: env_value("ADQL_RECOVER").unwrap_or(defaults.recover),
            max_tokens: env_value("ADQL_MAX_TOKENS").or(defaults.max_tokens),
            rule_budget: env_value("ADQL_RULE_BUDGET").or(defaults.rule_budget),
            ..defaults
        }
        .with_max_errors(env_value("ADQL_MAX_ERRORS").unwrap_or(DEFAULT_MAX_ERRORS))
        .with_max_depth(env_value("ADQL_MAX_DEPTH").unwrap_or(DEFAULT_MAX_DEPTH))
    }

    #[must_use]
    pub const fn with_recovery(mut self, recover: bool) -> Self {
        self.recover = recover;
        self
    }

    /// Sets the error cap. Zero is treated as one.
    #[must_use]
    pub const fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = if max_errors == 0 { 1 } else { max_errors };
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: Option<usize>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub const fn with_rule_budget(mut self, rule_budget: Option<usize>) -> Self {
        self.rule_budget = rule_budget;
        self
    }

    /// Sets the nesting cap. Zero is treated as one.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = if max_depth == 0 { 1 } else { max_depth };
        self
    }

    #[must_use]
    pub const fn with_precedence(mut self, precedence: &'static PrecedenceTable) -> Self {
        self.precedence = precedence;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParserConfig::default();
        assert!(config.recover);
        assert_eq!(config.max_errors, DEFAULT_MAX_ERRORS);
        assert_eq!(config.max_tokens, None);
        assert_eq!(config.rule_budget, None);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.precedence, &PrecedenceTable::ADQL);
    }

    #[test]
    fn test_builders() {
        let config = ParserConfig::default()
            .with_recovery(false)
            .with_max_errors(0)
            .with_max_tokens(Some(10))
            .with_rule_budget(Some(100))
            .with_max_depth(0);
        assert!(!config.recover);
        assert_eq!(config.max_errors, 1);
        assert_eq!(config.max_tokens, Some(10));
        assert_eq!(config.rule_budget, Some(100));
        assert_eq!(config.max_depth, 1);
    }
}
