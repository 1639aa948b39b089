/*!
# Violation Model

Unified representation of a single finding imported from an external
analysis tool. Every importer (CppCheck, PHP_CodeSniffer, Gendarme)
produces values of this type, so the rest of the pipeline never has to
know which tool a finding came from.
*/

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity scale shared by all imported findings.
///
/// Ordered from least to most severe, so `a >= b` means "a is at least
/// as severe as b" and can be used directly for threshold filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Minor,
    Major,
    Critical,
    Blocker,
}

impl Severity {
    /// All severities, most severe first. Handy for summary tables.
    pub fn all_desc() -> [Severity; 5] {
        [
            Severity::Blocker,
            Severity::Critical,
            Severity::Major,
            Severity::Minor,
            Severity::Info,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Blocker => "blocker",
            Severity::Critical => "critical",
            Severity::Major => "major",
            Severity::Minor => "minor",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blocker" => Ok(Severity::Blocker),
            "critical" => Ok(Severity::Critical),
            "major" => Ok(Severity::Major),
            "minor" => Ok(Severity::Minor),
            "info" => Ok(Severity::Info),
            _ => Err(anyhow::anyhow!("Unknown severity: {}", s)),
        }
    }
}

/// A single finding attributed to a resource in the analyzed project.
///
/// `resource_path` is the project-relative path with `/` separators.
/// `None` means the finding could not be attached to a concrete file
/// and is reported at project level. `line` is `None` for findings
/// that apply to a whole file or module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub resource_path: Option<String>,
    pub line: Option<u32>,
    /// Key of the tool that produced the finding ("cppcheck", "gendarme", ...).
    pub tool: String,
    /// Rule identifier inside the tool, e.g. "nullPointer" or "AvoidLongMethodsRule".
    pub rule_key: String,
    pub message: String,
    pub severity: Severity,
}

impl Violation {
    pub fn new(
        tool: impl Into<String>,
        rule_key: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            resource_path: None,
            line: None,
            tool: tool.into(),
            rule_key: rule_key.into(),
            message: message.into(),
            severity,
        }
    }

    pub fn with_resource(mut self, resource_path: impl Into<String>) -> Self {
        self.resource_path = Some(resource_path.into());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Fully qualified rule key in `tool:rule` form, used by the rule
    /// override table and by report generators.
    pub fn qualified_rule(&self) -> String {
        format!("{}:{}", self.tool, self.rule_key)
    }

    /// Finding without a resolvable resource, attributed to the project.
    pub fn is_project_level(&self) -> bool {
        self.resource_path.is_none()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.severity)?;
        match (&self.resource_path, self.line) {
            (Some(path), Some(line)) => write!(f, "{}:{}", path, line)?,
            (Some(path), None) => write!(f, "{}", path)?,
            (None, _) => write!(f, "<project>")?,
        }
        write!(f, " {}: {}", self.qualified_rule(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Blocker > Severity::Critical);
        assert!(Severity::Critical > Severity::Major);
        assert!(Severity::Major > Severity::Minor);
        assert!(Severity::Minor > Severity::Info);
    }

    #[test]
    fn test_severity_roundtrip() {
        for severity in Severity::all_desc() {
            let parsed: Severity = severity.as_str().parse().unwrap();
            assert_eq!(parsed, severity);
        }
        assert!("bogus".parse::<Severity>().is_err());
    }

    #[test]
    fn test_violation_display() {
        let violation = Violation::new("cppcheck", "nullPointer", "Null pointer dereference", Severity::Critical)
            .with_resource("src/main.cpp")
            .with_line(42);

        let text = violation.to_string();
        assert!(text.contains("src/main.cpp:42"));
        assert!(text.contains("cppcheck:nullPointer"));
        assert!(text.contains("[critical]"));
    }

    #[test]
    fn test_project_level_violation() {
        let violation = Violation::new("gendarme", "SomeAssemblyRule", "Assembly issue", Severity::Major);
        assert!(violation.is_project_level());
        assert!(violation.to_string().contains("<project>"));
    }
}
