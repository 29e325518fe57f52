//! Compiled query plans
//!
//! A plan is backend-agnostic: it names what to select and which predicates
//! to apply, with every heuristic choice already resolved by the compiler.

use serde::{Deserialize, Serialize};

/// Kind of commit the query targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    #[default]
    Commit,
    Merge,
    Initial,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commit => "Commit",
            Self::Merge => "Merge",
            Self::Initial => "Initial",
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete predicate behind an entity-kind constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindConstraint {
    /// Two or more parents, or a merge-like message
    MergeStructural,
    /// Merge-like message only (no parent edges in the dataset)
    MergeHeuristic,
    /// No recorded parents
    InitialStructural,
    /// Named as some branch's initial commit (no parent edges in the dataset)
    InitialDeclared,
    /// Neither merge nor initial under the dataset's classification mode
    Normal { has_parent_edges: bool },
}

/// How a message filter compares text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "needle", rename_all = "snake_case")]
pub enum MessageMatch {
    /// Case-insensitive raw substring (needle lower-cased)
    Substring(String),
    /// Whole-word match (needle normalized)
    Words(String),
    /// Contiguous run of whole words (needle normalized)
    Phrase(String),
}

/// Attribute of a user used as the author comparison key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorKey {
    Login,
    IdLocalName,
}

/// Case-insensitive author match.
///
/// `keys` is the preference order; the first key the user actually has
/// is the one compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorMatch {
    pub needle: String,
    pub keys: Vec<AuthorKey>,
}

/// A single filter predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "filter", rename_all = "snake_case")]
pub enum Filter {
    Kind { constraint: KindConstraint },
    Message { matcher: MessageMatch },
    Author { matcher: AuthorMatch },
    /// Exact, case-sensitive branch name
    Branch { name: String },
    /// Case-insensitive substring of the repository display name
    Repo { needle: String },
}

/// Compiled query plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlan {
    pub kind: TargetKind,
    pub filters: Vec<Filter>,
    pub limit: usize,
}

impl QueryPlan {
    pub fn new(kind: TargetKind, limit: usize) -> Self {
        Self {
            kind,
            filters: Vec::new(),
            limit,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn is_unfiltered(&self) -> bool {
        self.filters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_serializes_with_tags() {
        let plan = QueryPlan::new(TargetKind::Merge, 10)
            .with_filter(Filter::Kind {
                constraint: KindConstraint::MergeHeuristic,
            })
            .with_filter(Filter::Message {
                matcher: MessageMatch::Phrase("unit test".to_string()),
            });

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["kind"], "merge");
        assert_eq!(json["filters"][0]["filter"], "kind");
        assert_eq!(json["filters"][0]["constraint"], "merge_heuristic");
        assert_eq!(json["filters"][1]["matcher"]["mode"], "phrase");
        assert_eq!(json["filters"][1]["matcher"]["needle"], "unit test");
    }
}
