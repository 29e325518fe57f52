//! Structural validation of a snapshot
//!
//! Each check looks at one entity and its direct edges. Problems are
//! returned as [`Issue`]s, never as errors: a snapshot with missing data is
//! still a valid input.

use gitonto_core::fact::vocab;
use gitonto_core::{is_merge, Branch, Commit, EntityKind, Repository, Snapshot};
use serde::{Deserialize, Serialize};

/// Which integrity rule an issue violates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    RepositoryWithoutBranches,
    BranchNameCount,
    BranchInitialCommitCount,
    BranchWithoutCommits,
    MissingAuthor,
    MissingTimestamp,
    MissingMessage,
    InitialWithParents,
    MergeWithFewParents,
    NonInitialWithoutParent,
}

/// One violated invariant, tied to one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub entity_kind: EntityKind,
    pub entity_label: String,
    pub rule: Rule,
    pub description: String,
}

impl Issue {
    fn new(kind: EntityKind, label: impl Into<String>, rule: Rule, description: impl Into<String>) -> Self {
        Self {
            entity_kind: kind,
            entity_label: label.into(),
            rule,
            description: description.into(),
        }
    }
}

/// Validate a snapshot.
///
/// Issues come out grouped by kind (repositories, branches, commits) and in
/// snapshot order within each kind.
pub fn validate(snapshot: &Snapshot) -> Vec<Issue> {
    let mut issues = Vec::new();
    for repo in snapshot.repositories() {
        check_repository(repo, &mut issues);
    }
    for branch in snapshot.branches() {
        check_branch(branch, &mut issues);
    }
    let has_parent_edges = snapshot.has_parent_edges();
    for commit in snapshot.commits() {
        check_commit(commit, has_parent_edges, &mut issues);
    }

    tracing::debug!(issues = issues.len(), "Validated snapshot");
    issues
}

fn check_repository(repo: &Repository, issues: &mut Vec<Issue>) {
    if repo.branches.is_empty() {
        issues.push(Issue::new(
            EntityKind::Repository,
            repo.display_name(),
            Rule::RepositoryWithoutBranches,
            "Repository has no branches",
        ));
    }
}

fn check_branch(branch: &Branch, issues: &mut Vec<Issue>) {
    let label = branch.label();
    if branch.names.len() != 1 {
        issues.push(Issue::new(
            EntityKind::Branch,
            label,
            Rule::BranchNameCount,
            format!("branchName count != 1 (got {})", branch.names.len()),
        ));
    }
    if branch.initial_commits.len() != 1 {
        issues.push(Issue::new(
            EntityKind::Branch,
            label,
            Rule::BranchInitialCommitCount,
            format!("initialCommit count != 1 (got {})", branch.initial_commits.len()),
        ));
    }
    if branch.commits.is_empty() {
        issues.push(Issue::new(
            EntityKind::Branch,
            label,
            Rule::BranchWithoutCommits,
            "Branch has no commits",
        ));
    }
}

fn check_commit(commit: &Commit, has_parent_edges: bool, issues: &mut Vec<Issue>) {
    let label = commit.id.local_name();
    let mut report = |rule: Rule, description: &str| {
        issues.push(Issue::new(EntityKind::Commit, label, rule, description));
    };

    if commit.author.is_none() {
        report(Rule::MissingAuthor, "Missing author");
    }
    if commit.timestamp.is_none() {
        report(Rule::MissingTimestamp, "Missing timestamp");
    }
    if commit.message_text().trim().is_empty() {
        report(Rule::MissingMessage, "Missing message");
    }

    let parents = commit.parents.len();
    let asserted_initial = commit.has_type(vocab::INITIAL_COMMIT);
    let asserted_merge = commit.has_type(vocab::MERGE_COMMIT);
    let asserted_non_initial = asserted_merge || commit.has_type(vocab::NORMAL_COMMIT);

    if asserted_initial && parents > 0 {
        report(Rule::InitialWithParents, "Initial commit has parent(s)");
    }
    if (asserted_merge || is_merge(commit, has_parent_edges)) && parents < 2 {
        report(Rule::MergeWithFewParents, "Merge commit has <2 parents");
    }
    if asserted_non_initial && !asserted_initial && parents == 0 {
        report(Rule::NonInitialWithoutParent, "Non-initial commit missing parent");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use gitonto_core::{SnapshotData, User};

    fn complete_commit(id: &str) -> Commit {
        Commit::new(id)
            .with_author("u1")
            .with_message("Work")
            .with_timestamp(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    fn healthy() -> SnapshotData {
        SnapshotData::new()
            .with_repository(Repository::new("r1").with_full_name("acme/app").with_branch("b1"))
            .with_branch(
                Branch::new("b1")
                    .with_name("main")
                    .with_initial_commit("c0")
                    .with_commit("c0")
                    .with_commit("c1"),
            )
            .with_commit(complete_commit("c0"))
            .with_commit(complete_commit("c1").with_parent("c0"))
            .with_user(User::new("u1"))
    }

    #[test]
    fn test_healthy_snapshot_has_no_issues() {
        let snapshot = healthy().build().unwrap();
        assert!(validate(&snapshot).is_empty());
    }

    #[test]
    fn test_repository_without_branches() {
        let snapshot = healthy()
            .with_repository(Repository::new("r2").with_label("empty"))
            .build()
            .unwrap();
        let issues = validate(&snapshot);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].entity_kind, EntityKind::Repository);
        assert_eq!(issues[0].entity_label, "empty");
        assert_eq!(issues[0].rule, Rule::RepositoryWithoutBranches);
    }

    #[test]
    fn test_branch_with_two_names() {
        let mut data = healthy();
        data.branches[0].names.push("trunk".to_string());
        let issues = validate(&data.build().unwrap());

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].entity_kind, EntityKind::Branch);
        assert_eq!(issues[0].description, "branchName count != 1 (got 2)");
    }

    #[test]
    fn test_bare_branch_reports_each_rule() {
        let snapshot = healthy().with_branch(Branch::new("b2")).build().unwrap();
        let issues = validate(&snapshot);
        let rules: Vec<Rule> = issues.iter().map(|i| i.rule).collect();

        assert_eq!(
            rules,
            vec![
                Rule::BranchNameCount,
                Rule::BranchInitialCommitCount,
                Rule::BranchWithoutCommits
            ]
        );
        assert!(issues.iter().all(|i| i.entity_label == "(unnamed)"));
    }

    #[test]
    fn test_commit_reports_several_issues() {
        let snapshot = healthy()
            .with_commit(
                Commit::new("git#c9")
                    .with_type(vocab::INITIAL_COMMIT)
                    .with_parent("c0"),
            )
            .build()
            .unwrap();
        let issues = validate(&snapshot);
        let descriptions: Vec<&str> = issues.iter().map(|i| i.description.as_str()).collect();

        assert_eq!(
            descriptions,
            vec![
                "Missing author",
                "Missing timestamp",
                "Missing message",
                "Initial commit has parent(s)"
            ]
        );
        assert!(issues.iter().all(|i| i.entity_label == "c9"));
    }

    #[test]
    fn test_heuristic_merge_with_one_parent() {
        let snapshot = healthy()
            .with_commit(complete_commit("c2").with_message("Merge branch 'x'").with_parent("c1"))
            .build()
            .unwrap();
        let issues = validate(&snapshot);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, Rule::MergeWithFewParents);
    }

    #[test]
    fn test_asserted_normal_without_parent() {
        let snapshot = healthy()
            .with_commit(complete_commit("c3").with_type(vocab::NORMAL_COMMIT))
            .build()
            .unwrap();
        let issues = validate(&snapshot);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].description, "Non-initial commit missing parent");
    }

    #[test]
    fn test_order_is_stable_and_grouped_by_kind() {
        let snapshot = SnapshotData::new()
            .with_commit(Commit::new("c0"))
            .with_branch(Branch::new("b1"))
            .with_repository(Repository::new("r1"))
            .build()
            .unwrap();

        let first = validate(&snapshot);
        let kinds: Vec<EntityKind> = first.iter().map(|i| i.entity_kind).collect();
        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(kinds, sorted);
        assert_eq!(first, validate(&snapshot));
    }
}
