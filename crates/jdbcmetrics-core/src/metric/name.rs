use std::fmt;

use serde::Serialize;

/// Identity of a metric inside a registry: `(group, type, name, scope)`.
///
/// Two names are the same metric iff all four parts match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MetricName {
    group: String,
    #[serde(rename = "type")]
    kind: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
}

impl MetricName {
    pub fn new(group: impl Into<String>, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
            name: name.into(),
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// The measurement type (`read`, `write`, ...).
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Flattened identifier safe for text exposition formats
    /// (`jdbc_read_total_of_reads`).
    pub fn flat(&self) -> String {
        let mut parts = vec![self.group.as_str(), self.kind.as_str(), self.name.as_str()];
        if let Some(scope) = &self.scope {
            parts.push(scope.as_str());
        }
        parts
            .join("_")
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.group, self.kind, self.name)?;
        if let Some(scope) = &self.scope {
            write!(f, ".{scope}")?;
        }
        Ok(())
    }
}
