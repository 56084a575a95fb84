//! Maturity level filtering.
//!
//! A `MaturityFilter` is built once from configuration and applied as a pure
//! predicate over vulnerabilities. An empty configuration accepts everything.

use crate::scanner::Vulnerability;

/// Accepted maturity levels, matched case-sensitively against the
/// vulnerability's own maturity attribute.
#[derive(Debug, Clone, Default)]
pub struct MaturityFilter {
    levels: Vec<String>,
}

impl MaturityFilter {
    /// Build a filter from an explicit list of accepted levels.
    /// Empty tokens are discarded; no levels means accept-all.
    pub fn from_levels<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let levels = levels
            .into_iter()
            .map(Into::into)
            .filter(|l| !l.is_empty())
            .collect();
        Self { levels }
    }

    /// Build a filter from a comma-separated configuration string.
    pub fn from_spec(spec: &str) -> Self {
        Self::from_levels(spec.split(','))
    }

    /// True when the filter has no levels and therefore accepts everything.
    pub fn is_pass_through(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn accepts(&self, vuln: &Vulnerability) -> bool {
        self.levels.is_empty() || self.levels.iter().any(|l| *l == vuln.maturity)
    }
}
