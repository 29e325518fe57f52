//! Commit classification rules
//!
//! A commit is Initial, Merge, or Normal. Structural evidence (the number of
//! recorded parents) is only trusted when the snapshot carries parent edges
//! at all; otherwise classification falls back to the message heuristic.

use crate::entity::Commit;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Merge heuristic, applied to the lower-cased commit message
pub const MERGE_MESSAGE_PATTERN: &str = r"^(merge( pull request)?|merge branch|merged )";

static MERGE_MESSAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(MERGE_MESSAGE_PATTERN).expect("merge message pattern is valid"));

/// Classified kind of a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommitKind {
    Initial,
    Merge,
    Normal,
}

impl CommitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "Initial",
            Self::Merge => "Merge",
            Self::Normal => "Normal",
        }
    }
}

impl std::fmt::Display for CommitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True if the message reads like a merge commit
pub fn message_suggests_merge(message: &str) -> bool {
    MERGE_MESSAGE.is_match(&message.to_lowercase())
}

/// True iff the commit records no parents
pub fn is_initial(commit: &Commit) -> bool {
    commit.parents.is_empty()
}

/// True iff the commit has two or more parents or a merge-like message.
///
/// Parent counts are ignored when `has_parent_edges` is false.
pub fn is_merge(commit: &Commit, has_parent_edges: bool) -> bool {
    (has_parent_edges && commit.parents.len() >= 2) || message_suggests_merge(commit.message_text())
}

/// Classify a commit.
///
/// Merge takes precedence over Initial: a parentless commit whose message
/// matches the merge heuristic is a Merge, even though [`is_initial`] holds
/// for it. Without parent edges in the snapshot every commit is
/// structurally parentless, so Initial is never returned in that mode.
pub fn classify(commit: &Commit, has_parent_edges: bool) -> CommitKind {
    if is_merge(commit, has_parent_edges) {
        CommitKind::Merge
    } else if has_parent_edges && is_initial(commit) {
        CommitKind::Initial
    } else {
        CommitKind::Normal
    }
}

pub fn is_normal(commit: &Commit, has_parent_edges: bool) -> bool {
    classify(commit, has_parent_edges) == CommitKind::Normal
}

/// Total number of parent edges across a set of commits
pub fn count_parent_edges<'a>(commits: impl IntoIterator<Item = &'a Commit>) -> usize {
    commits.into_iter().map(|c| c.parents.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_heuristic() {
        assert!(message_suggests_merge("Merge pull request #42 from acme/fix"));
        assert!(message_suggests_merge("Merge branch 'dev' into main"));
        assert!(message_suggests_merge("merged feature work"));
        assert!(message_suggests_merge("MERGE"));
        assert!(!message_suggests_merge("Fix merge conflict handling"));
        assert!(!message_suggests_merge(""));
    }

    #[test]
    fn test_structural_classification() {
        let root = Commit::new("c0").with_message("Initial import");
        let normal = Commit::new("c1").with_message("Add parser").with_parent("c0");
        let merge = Commit::new("c2")
            .with_message("Add lexer")
            .with_parent("c0")
            .with_parent("c1");

        assert_eq!(classify(&root, true), CommitKind::Initial);
        assert_eq!(classify(&normal, true), CommitKind::Normal);
        assert_eq!(classify(&merge, true), CommitKind::Merge);
        assert!(is_normal(&normal, true));
    }

    #[test]
    fn test_heuristic_only_without_parent_edges() {
        let merge = Commit::new("c1").with_message("Merge branch 'feature'");
        let plain = Commit::new("c2").with_message("Update README");

        assert!(is_merge(&merge, false));
        assert_eq!(classify(&merge, false), CommitKind::Merge);
        assert_eq!(classify(&plain, false), CommitKind::Normal);
        assert!(!is_merge(&plain, false));
    }

    #[test]
    fn test_merge_takes_precedence_over_initial() {
        let commit = Commit::new("c0").with_message("Merge branch 'import'");
        assert!(is_initial(&commit));
        assert_eq!(classify(&commit, true), CommitKind::Merge);
        assert!(!is_normal(&commit, true));
    }

    #[test]
    fn test_parent_count_untrusted_without_parent_edges() {
        let commit = Commit::new("c3")
            .with_message("Refactor")
            .with_parent("c1")
            .with_parent("c2");
        assert!(is_merge(&commit, true));
        assert!(!is_merge(&commit, false));
    }

    #[test]
    fn test_count_parent_edges() {
        let commits = vec![
            Commit::new("c0"),
            Commit::new("c1").with_parent("c0"),
            Commit::new("c2").with_parent("c0").with_parent("c1"),
        ];
        assert_eq!(count_parent_edges(&commits), 3);
    }
}
