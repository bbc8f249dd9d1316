//! Issues found while building or checking a network snapshot.
//!
//! The importer records records it had to skip and [`Network::validate_into`]
//! records data that will make filters silently miss (a substation without a
//! country, a non-positive nominal voltage). Neither aborts on the first issue.
//!
//! ```
//! use gat_core::diagnostics::{Category, Diagnostics};
//!
//! let mut diag = Diagnostics::new();
//! diag.warning(Category::Structure, "substation has no country")
//!     .on("Substation S_XX");
//! diag.error(Category::Reference, "unknown voltage level 'VL9'")
//!     .on("GENERATOR G1");
//!
//! assert!(diag.has_errors());
//! assert_eq!(diag.summary(), "1 warning, 1 error");
//! ```
//!
//! [`Network::validate_into`]: crate::Network::validate_into

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The snapshot was built but filters may not see what the document meant.
    Warning,
    /// A record was dropped.
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// What went wrong with a snapshot record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// A value could not be read (country code, ...).
    Parse,
    /// Missing or duplicated parts of the topology.
    Structure,
    /// A reference to an element, voltage level or variant that does not exist.
    Reference,
    /// Physically meaningless values.
    Physical,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Parse => "parse",
            Category::Structure => "structure",
            Category::Reference => "reference",
            Category::Physical => "physical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    /// Record the issue is about, e.g. `Substation S_FR`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    /// Attach the record the issue is about.
    pub fn on(&mut self, entity: impl Into<String>) -> &mut Self {
        self.entity = Some(entity.into());
        self
    }
}

impl fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}] {}",
            self.severity.as_str(),
            self.category.as_str(),
            self.message
        )?;
        if let Some(entity) = &self.entity {
            write!(f, " ({entity})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warning(
        &mut self,
        category: Category,
        message: impl Into<String>,
    ) -> &mut DiagnosticIssue {
        self.push(Severity::Warning, category, message.into())
    }

    pub fn error(
        &mut self,
        category: Category,
        message: impl Into<String>,
    ) -> &mut DiagnosticIssue {
        self.push(Severity::Error, category, message.into())
    }

    fn push(
        &mut self,
        severity: Severity,
        category: Category,
        message: String,
    ) -> &mut DiagnosticIssue {
        self.issues.push(DiagnosticIssue {
            severity,
            category,
            message,
            entity: None,
        });
        let last = self.issues.len() - 1;
        &mut self.issues[last]
    }

    pub fn issues(&self) -> &[DiagnosticIssue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// Issues about one record, e.g. every issue on `Substation S_FR`.
    pub fn about<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a DiagnosticIssue> {
        self.issues
            .iter()
            .filter(move |i| i.entity.as_deref() == Some(entity))
    }

    /// `No issues`, `2 warnings`, `1 warning, 3 errors`, ...
    pub fn summary(&self) -> String {
        fn plural(n: usize, word: &str) -> String {
            format!("{n} {word}{}", if n == 1 { "" } else { "s" })
        }
        match (self.count(Severity::Warning), self.count(Severity::Error)) {
            (0, 0) => "No issues".to_string(),
            (w, 0) => plural(w, "warning"),
            (0, e) => plural(e, "error"),
            (w, e) => format!("{}, {}", plural(w, "warning"), plural(e, "error")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let mut diag = Diagnostics::new();
        assert_eq!(diag.summary(), "No issues");
        assert!(diag.is_empty());

        diag.warning(Category::Parse, "unknown country code 'ZZ'");
        assert_eq!(diag.summary(), "1 warning");
        assert!(!diag.has_errors());

        diag.error(Category::Reference, "unknown voltage level");
        diag.warning(Category::Structure, "no equipment");
        assert_eq!(diag.summary(), "2 warnings, 1 error");
        assert!(diag.has_errors());
    }

    #[test]
    fn test_issues_by_entity() {
        let mut diag = Diagnostics::new();
        diag.warning(Category::Parse, "unknown country code 'ZZ'")
            .on("Substation S_ZZ");
        diag.warning(Category::Structure, "substation has no country")
            .on("Substation S_ZZ");
        diag.error(Category::Reference, "unknown voltage level")
            .on("LINE L1");

        assert_eq!(diag.about("Substation S_ZZ").count(), 2);
        assert_eq!(diag.about("LINE L1").count(), 1);
        assert_eq!(diag.about("LINE L2").count(), 0);
    }

    #[test]
    fn test_display_and_json() {
        let mut diag = Diagnostics::new();
        diag.error(Category::Physical, "non-positive nominal voltage 0 kV")
            .on("VoltageLevel VL1");

        assert_eq!(
            diag.issues()[0].to_string(),
            "[error:physical] non-positive nominal voltage 0 kV (VoltageLevel VL1)"
        );
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json[0]["severity"], "error");
        assert_eq!(json[0]["category"], "physical");
        assert_eq!(json[0]["entity"], "VoltageLevel VL1");
    }
}
