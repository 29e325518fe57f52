//! Entity (node) types of the commit history graph
//!
//! Field names on the wire follow the ontology properties (`hasBranch`,
//! `branchName`, `madeBy`, ...). References between entities are held by
//! identifier; the [`Snapshot`](crate::Snapshot) owns every entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Unique identifier for an entity (an IRI or a plain name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trailing segment of the identifier (after the last `#` or `/`)
    pub fn local_name(&self) -> &str {
        let trimmed = self.0.trim_end_matches(['/', '#']);
        match trimmed.rfind(['/', '#']) {
            Some(pos) => &trimmed[pos + 1..],
            None => trimmed,
        }
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of entity held in a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Repository,
    Branch,
    Commit,
    User,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Repository => "Repository",
            Self::Branch => "Branch",
            Self::Commit => "Commit",
            Self::User => "User",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// A repository owning a set of branches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: EntityId,

    /// Dedicated display attribute (`owner/name`)
    #[serde(rename = "repoFullName", default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    /// Generic label, used when no full name is recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(rename = "hasBranch", default)]
    pub branches: Vec<EntityId>,

    /// Asserted type names
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub types: BTreeSet<String>,
}

impl Repository {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            full_name: None,
            label: None,
            branches: Vec::new(),
            types: BTreeSet::new(),
        }
    }

    pub fn with_full_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = Some(name.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_branch(mut self, branch: impl Into<EntityId>) -> Self {
        self.branches.push(branch.into());
        self
    }

    /// Display name: full name, then label, then the identifier's local name
    pub fn display_name(&self) -> &str {
        non_blank(&self.full_name)
            .or_else(|| non_blank(&self.label))
            .unwrap_or_else(|| self.id.local_name())
    }
}

/// A branch: its name values, declared initial commit(s), and member commits
///
/// Name and initial commit are expected exactly once but are stored as lists
/// so that the validator can report wrong cardinalities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: EntityId,

    #[serde(rename = "branchName", default)]
    pub names: Vec<String>,

    #[serde(rename = "hasInitialCommit", default)]
    pub initial_commits: Vec<EntityId>,

    #[serde(rename = "hasCommit", default)]
    pub commits: Vec<EntityId>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub types: BTreeSet<String>,
}

impl Branch {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            names: Vec::new(),
            initial_commits: Vec::new(),
            commits: Vec::new(),
            types: BTreeSet::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    pub fn with_initial_commit(mut self, commit: impl Into<EntityId>) -> Self {
        self.initial_commits.push(commit.into());
        self
    }

    pub fn with_commit(mut self, commit: impl Into<EntityId>) -> Self {
        self.commits.push(commit.into());
        self
    }

    /// First recorded name, if any
    pub fn name(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    /// Human-readable label for reports
    pub fn label(&self) -> &str {
        self.name().unwrap_or("(unnamed)")
    }

    pub fn contains(&self, commit: &EntityId) -> bool {
        self.commits.contains(commit)
    }
}

/// A commit with its optional metadata and parent edges
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub id: EntityId,

    #[serde(rename = "madeBy", default, skip_serializing_if = "Option::is_none")]
    pub author: Option<EntityId>,

    #[serde(rename = "commitMessage", default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(rename = "commitTimestamp", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(rename = "hasParent", default)]
    pub parents: Vec<EntityId>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub types: BTreeSet<String>,
}

impl Commit {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            author: None,
            message: None,
            timestamp: None,
            parents: Vec::new(),
            types: BTreeSet::new(),
        }
    }

    pub fn with_author(mut self, user: impl Into<EntityId>) -> Self {
        self.author = Some(user.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_parent(mut self, parent: impl Into<EntityId>) -> Self {
        self.parents.push(parent.into());
        self
    }

    /// Add an asserted type (e.g. `MergeCommit`)
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.types.insert(type_name.into());
        self
    }

    /// Message text, empty when absent
    pub fn message_text(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }

    /// RFC 3339 timestamp, empty when absent
    pub fn timestamp_text(&self) -> String {
        self.timestamp.map(|ts| ts.to_rfc3339()).unwrap_or_default()
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.contains(type_name)
    }
}

/// A commit author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub types: BTreeSet<String>,
}

impl User {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            login: None,
            types: BTreeSet::new(),
        }
    }

    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }

    /// Login when present, otherwise the identifier's local name
    pub fn display_name(&self) -> &str {
        non_blank(&self.login).unwrap_or_else(|| self.id.local_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name() {
        assert_eq!(EntityId::from("http://example.org/git#alice").local_name(), "alice");
        assert_eq!(EntityId::from("users/bob").local_name(), "bob");
        assert_eq!(EntityId::from("users/bob/").local_name(), "bob");
        assert_eq!(EntityId::from("carol").local_name(), "carol");
    }

    #[test]
    fn test_repository_display_name_fallbacks() {
        let repo = Repository::new("git#repo_1").with_full_name("acme/widgets");
        assert_eq!(repo.display_name(), "acme/widgets");

        let repo = Repository::new("git#repo_1")
            .with_full_name("  ")
            .with_label("Widgets");
        assert_eq!(repo.display_name(), "Widgets");

        let repo = Repository::new("git#repo_1");
        assert_eq!(repo.display_name(), "repo_1");
    }

    #[test]
    fn test_branch_label() {
        let branch = Branch::new("b1");
        assert_eq!(branch.name(), None);
        assert_eq!(branch.label(), "(unnamed)");

        let branch = Branch::new("b1").with_name("main").with_name("trunk");
        assert_eq!(branch.name(), Some("main"));
    }

    #[test]
    fn test_user_display_name() {
        assert_eq!(User::new("git#u1").with_login("alice").display_name(), "alice");
        assert_eq!(User::new("git#u1").display_name(), "u1");
    }

    #[test]
    fn test_commit_wire_names() {
        let json = r#"{
            "id": "c2",
            "madeBy": "u1",
            "commitMessage": "Fix build",
            "commitTimestamp": "2024-03-01T12:00:00Z",
            "hasParent": ["c1"],
            "types": ["NormalCommit"]
        }"#;
        let commit: Commit = serde_json::from_str(json).unwrap();
        assert_eq!(commit.author, Some(EntityId::from("u1")));
        assert_eq!(commit.message_text(), "Fix build");
        assert_eq!(commit.parents.len(), 1);
        assert!(commit.has_type("NormalCommit"));
        assert!(commit.timestamp_text().starts_with("2024-03-01T12:00:00"));
    }
}
