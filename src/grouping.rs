use serde::Deserialize;

use crate::ident::Ident;

/// `GROUP_CONCAT(DISTINCT source) AS alias`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupConcat {
    #[serde(rename = "for")]
    pub source: Ident,
    #[serde(rename = "as")]
    pub alias: Ident,
}

impl GroupConcat {
    pub fn new(source: Ident, alias: Ident) -> Self {
        Self { source, alias }
    }
}

/// Collapse rows by `identifier`, concatenating the distinct values of each group column.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Grouping {
    pub identifier: Ident,
    #[serde(default)]
    pub groups: Vec<GroupConcat>,
}

impl Grouping {
    pub fn by(identifier: Ident) -> Self {
        Self { identifier, groups: Vec::new() }
    }
    pub fn concat(mut self, source: Ident, alias: Ident) -> Self {
        self.groups.push(GroupConcat::new(source, alias));
        self
    }
}

/// Comma separated `GROUP_CONCAT` columns, no leading comma.
pub fn build(groups: &[GroupConcat]) -> String {
    groups
        .iter()
        .map(|g| format!("GROUP_CONCAT(DISTINCT {}) AS {}", g.source, g.alias))
        .collect::<Vec<_>>()
        .join(", ")
}
