//! In-memory plan execution over a [`Snapshot`]
//!
//! Walks repository → branch → commit, applies the plan's predicates, and
//! yields each matching commit once (attributed to the first repository and
//! branch under which it matched) until the limit is reached.

use crate::error::{QueryError, QueryResult};
use crate::matching::{contains_substring, contains_words};
use crate::plan::{AuthorKey, AuthorMatch, Filter, KindConstraint, MessageMatch, QueryPlan, TargetKind};
use gitonto_core::{
    classify, is_initial, is_merge, is_normal, message_suggests_merge, Branch, Commit, CommitKind,
    EntityId, Repository, Snapshot,
};
use serde::Serialize;
use std::collections::HashSet;

/// One search result row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    pub repository: String,
    pub branch: String,
    pub commit: String,
    pub message: String,
    pub author: String,
    /// The commit's own classification, not the plan's target kind
    pub kind: CommitKind,
    pub timestamp: String,
}

#[derive(Clone, Copy)]
struct Candidate<'a> {
    repo: &'a Repository,
    branch: &'a Branch,
    commit: &'a Commit,
}

/// Executes plans against a borrowed snapshot
#[derive(Debug, Clone, Copy)]
pub struct Executor<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> Executor<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    /// Prepare a plan for execution.
    ///
    /// Fails if the plan was compiled for a different parent-edge mode than
    /// this snapshot has.
    pub fn execute(&self, plan: &'a QueryPlan) -> QueryResult<ResultSet<'a>> {
        let has_edges = self.snapshot.has_parent_edges();
        for filter in &plan.filters {
            let Filter::Kind { constraint } = filter else {
                continue;
            };
            let compiled_with_edges = match constraint {
                KindConstraint::MergeStructural | KindConstraint::InitialStructural => true,
                KindConstraint::MergeHeuristic | KindConstraint::InitialDeclared => false,
                KindConstraint::Normal { has_parent_edges } => *has_parent_edges,
            };
            if compiled_with_edges != has_edges {
                return Err(QueryError::ProfileMismatch(format!(
                    "{:?} used on a snapshot with has_parent_edges={}",
                    constraint, has_edges
                )));
            }
        }

        Ok(ResultSet {
            snapshot: self.snapshot,
            plan,
        })
    }
}

/// A prepared, side-effect free result sequence.
///
/// Each call to [`ResultSet::rows`] restarts evaluation from the beginning.
#[derive(Debug, Clone, Copy)]
pub struct ResultSet<'a> {
    snapshot: &'a Snapshot,
    plan: &'a QueryPlan,
}

impl<'a> ResultSet<'a> {
    /// Kind the plan targets, for column headers
    pub fn kind(&self) -> TargetKind {
        self.plan.kind
    }

    pub fn limit(&self) -> usize {
        self.plan.limit
    }

    /// Lazily evaluate the plan
    pub fn rows(&self) -> Rows<'a> {
        let snapshot = self.snapshot;
        let plan = self.plan;
        let mut seen: HashSet<&'a EntityId> = HashSet::new();

        let inner = snapshot
            .repositories()
            .iter()
            .flat_map(move |repo| snapshot.branches_of(repo).map(move |branch| (repo, branch)))
            .flat_map(move |(repo, branch)| {
                snapshot
                    .commits_of(branch)
                    .map(move |commit| Candidate { repo, branch, commit })
            })
            .filter(move |candidate| plan_matches(snapshot, plan, candidate))
            .filter(move |candidate: &Candidate<'a>| {
                let commit: &'a Commit = candidate.commit;
                seen.insert(&commit.id)
            })
            .take(plan.limit)
            .map(move |candidate| to_row(snapshot, candidate));

        Rows {
            inner: Box::new(inner),
        }
    }

    pub fn collect_rows(&self) -> Vec<ResultRow> {
        self.rows().collect()
    }
}

/// Iterator over result rows
pub struct Rows<'a> {
    inner: Box<dyn Iterator<Item = ResultRow> + 'a>,
}

impl Iterator for Rows<'_> {
    type Item = ResultRow;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

fn plan_matches(snapshot: &Snapshot, plan: &QueryPlan, candidate: &Candidate<'_>) -> bool {
    let matched = plan
        .filters
        .iter()
        .all(|filter| filter_matches(snapshot, filter, candidate));
    tracing::trace!(commit = %candidate.commit.id, matched, "Evaluated commit");
    matched
}

fn filter_matches(snapshot: &Snapshot, filter: &Filter, candidate: &Candidate<'_>) -> bool {
    let commit = candidate.commit;
    match filter {
        Filter::Kind { constraint } => match *constraint {
            KindConstraint::MergeStructural => is_merge(commit, true),
            KindConstraint::MergeHeuristic => message_suggests_merge(commit.message_text()),
            KindConstraint::InitialStructural => is_initial(commit),
            KindConstraint::InitialDeclared => snapshot.is_declared_initial(&commit.id),
            KindConstraint::Normal { has_parent_edges } => is_normal(commit, has_parent_edges),
        },
        Filter::Message { matcher } => match (&commit.message, matcher) {
            (None, _) => false,
            (Some(message), MessageMatch::Substring(needle)) => contains_substring(message, needle),
            (Some(message), MessageMatch::Words(needle) | MessageMatch::Phrase(needle)) => {
                contains_words(message, needle)
            }
        },
        Filter::Author { matcher } => author_matches(snapshot, matcher, commit),
        Filter::Branch { name } => candidate.branch.names.iter().any(|n| n == name),
        Filter::Repo { needle } => candidate
            .repo
            .display_name()
            .to_lowercase()
            .contains(needle.as_str()),
    }
}

fn author_matches(snapshot: &Snapshot, matcher: &AuthorMatch, commit: &Commit) -> bool {
    let Some(user) = snapshot.author_of(commit) else {
        return false;
    };
    let key = matcher.keys.iter().find_map(|key| match key {
        AuthorKey::Login => user
            .login
            .as_deref()
            .map(str::trim)
            .filter(|login| !login.is_empty()),
        AuthorKey::IdLocalName => Some(user.id.local_name()),
    });
    key.is_some_and(|k| k.to_lowercase() == matcher.needle)
}

fn to_row(snapshot: &Snapshot, candidate: Candidate<'_>) -> ResultRow {
    let commit = candidate.commit;
    ResultRow {
        repository: candidate.repo.display_name().to_string(),
        branch: candidate.branch.name().unwrap_or_default().to_string(),
        commit: commit.id.to_string(),
        message: commit.message_text().to_string(),
        author: snapshot
            .author_of(commit)
            .map(|u| u.display_name().to_string())
            .unwrap_or_default(),
        kind: classify(commit, snapshot.has_parent_edges()),
        timestamp: commit.timestamp_text(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_query;
    use gitonto_core::{SnapshotData, User};

    fn history() -> Snapshot {
        SnapshotData::new()
            .with_repository(
                Repository::new("git#repo_widgets")
                    .with_full_name("acme/widgets")
                    .with_branch("git#b_main")
                    .with_branch("git#b_dev"),
            )
            .with_repository(Repository::new("git#repo_tools").with_branch("git#b_tools"))
            .with_branch(
                Branch::new("git#b_main")
                    .with_name("main")
                    .with_initial_commit("git#c0")
                    .with_commit("git#c0")
                    .with_commit("git#c1")
                    .with_commit("git#c3"),
            )
            .with_branch(
                Branch::new("git#b_dev")
                    .with_name("dev")
                    .with_initial_commit("git#c0")
                    .with_commit("git#c0")
                    .with_commit("git#c2"),
            )
            .with_branch(
                Branch::new("git#b_tools")
                    .with_name("Main")
                    .with_initial_commit("git#t0")
                    .with_commit("git#t0"),
            )
            .with_commit(Commit::new("git#c0").with_author("git#alice").with_message("Initial commit"))
            .with_commit(
                Commit::new("git#c1")
                    .with_author("git#alice")
                    .with_message("Added unit test coverage")
                    .with_parent("git#c0"),
            )
            .with_commit(
                Commit::new("git#c2")
                    .with_author("git#bob")
                    .with_message("Contested API naming")
                    .with_parent("git#c0"),
            )
            .with_commit(
                Commit::new("git#c3")
                    .with_author("git#bob")
                    .with_message("Merge branch 'dev'")
                    .with_parent("git#c1")
                    .with_parent("git#c2"),
            )
            .with_commit(Commit::new("git#t0").with_message("Added unittest coverage"))
            .with_user(User::new("git#alice").with_login("Alice"))
            .with_user(User::new("git#bob"))
            .build()
            .unwrap()
    }

    fn run(snapshot: &Snapshot, query: &str) -> Vec<ResultRow> {
        let plan = compile_query(query, snapshot.profile());
        let executor = Executor::new(snapshot);
        let result = executor.execute(&plan).unwrap();
        result.collect_rows()
    }

    fn ids(rows: &[ResultRow]) -> Vec<&str> {
        rows.iter().map(|r| r.commit.as_str()).collect()
    }

    #[test]
    fn test_unfiltered_returns_each_commit_once() {
        let snapshot = history();
        let rows = run(&snapshot, "type:commit");
        assert_eq!(ids(&rows), vec!["git#c0", "git#c1", "git#c3", "git#c2", "git#t0"]);
        assert_eq!(rows[0].repository, "acme/widgets");
        assert_eq!(rows[0].branch, "main");
        assert_eq!(rows[4].repository, "repo_tools");
    }

    #[test]
    fn test_initial_filter_reports_classified_kind() {
        let snapshot = SnapshotData::new()
            .with_repository(Repository::new("r1").with_branch("b1"))
            .with_branch(
                Branch::new("b1")
                    .with_name("main")
                    .with_initial_commit("c0")
                    .with_commit("c0")
                    .with_commit("c1"),
            )
            .with_commit(Commit::new("c0").with_message("Merge branch 'import'"))
            .with_commit(Commit::new("c1").with_message("Tidy").with_parent("c0"))
            .build()
            .unwrap();

        // Parentless, so it matches the initial filter, but merge wins classification
        let rows = run(&snapshot, "type:initial");
        assert_eq!(ids(&rows), vec!["c0"]);
        assert_eq!(rows[0].kind, CommitKind::Merge);
    }

    #[test]
    fn test_limit() {
        let snapshot = history();
        assert!(run(&snapshot, "limit:0").is_empty());
        assert_eq!(run(&snapshot, "limit:2").len(), 2);
    }

    #[test]
    fn test_result_set_is_restartable() {
        let snapshot = history();
        let plan = compile_query("author:bob", snapshot.profile());
        let executor = Executor::new(&snapshot);
        let result = executor.execute(&plan).unwrap();

        let first: Vec<_> = result.rows().take(1).collect();
        let all: Vec<_> = result.rows().collect();
        assert_eq!(first.len(), 1);
        assert_eq!(all.len(), 2);
        assert_eq!(first[0], all[0]);
        assert_eq!(result.kind(), TargetKind::Commit);
    }

    #[test]
    fn test_kind_filters_with_parent_edges() {
        let snapshot = history();
        assert_eq!(ids(&run(&snapshot, "type:merge")), vec!["git#c3"]);
        assert_eq!(ids(&run(&snapshot, "type:initial")), vec!["git#c0", "git#t0"]);
        assert_eq!(ids(&run(&snapshot, "type:normal")), vec!["git#c1", "git#c2"]);

        let rows = run(&snapshot, "type:merge");
        assert_eq!(rows[0].kind, CommitKind::Merge);
    }

    #[test]
    fn test_phrase_and_word_semantics() {
        let snapshot = history();
        assert_eq!(ids(&run(&snapshot, r#"msg:"unit test" author:alice"#)), vec!["git#c1"]);
        assert_eq!(ids(&run(&snapshot, "msg:~test")), vec!["git#c1", "git#c2", "git#t0"]);
        assert_eq!(ids(&run(&snapshot, "msg:test")), vec!["git#c1"]);
        assert_eq!(ids(&run(&snapshot, "contested")), vec!["git#c2"]);
    }

    #[test]
    fn test_author_login_and_local_name() {
        let snapshot = history();
        assert_eq!(ids(&run(&snapshot, "author:ALICE")), vec!["git#c0", "git#c1"]);
        assert_eq!(ids(&run(&snapshot, "author:bob")), vec!["git#c3", "git#c2"]);
        // alice has a login, so her identifier is not a comparison key
        assert!(run(&snapshot, "author:ali").is_empty());

        let rows = run(&snapshot, "author:bob");
        assert_eq!(rows[0].author, "bob");
    }

    #[test]
    fn test_branch_exact_and_repo_substring() {
        let snapshot = history();
        assert_eq!(ids(&run(&snapshot, "branch:dev")), vec!["git#c0", "git#c2"]);
        assert_eq!(ids(&run(&snapshot, "branch:Main")), vec!["git#t0"]);
        assert!(run(&snapshot, "branch:mai").is_empty());
        assert_eq!(run(&snapshot, "repo:WIDGET").len(), 4);

        let rows = run(&snapshot, "branch:dev");
        assert_eq!(rows[0].branch, "dev");
    }

    #[test]
    fn test_heuristic_mode_without_parent_edges() {
        let snapshot = SnapshotData::new()
            .with_repository(Repository::new("r").with_branch("b"))
            .with_branch(
                Branch::new("b")
                    .with_name("main")
                    .with_initial_commit("c0")
                    .with_commit("c0")
                    .with_commit("c1")
                    .with_commit("c2"),
            )
            .with_commit(Commit::new("c0").with_message("Start project"))
            .with_commit(Commit::new("c1").with_message("Merge branch 'feature'"))
            .with_commit(Commit::new("c2").with_message("Tweak docs"))
            .build()
            .unwrap();

        assert_eq!(ids(&run(&snapshot, "type:merge")), vec!["c1"]);
        assert_eq!(ids(&run(&snapshot, "type:initial")), vec!["c0"]);
        assert_eq!(ids(&run(&snapshot, "type:normal")), vec!["c0", "c2"]);

        let rows = run(&snapshot, "");
        assert!(rows.iter().all(|r| r.kind != CommitKind::Initial));
    }

    #[test]
    fn test_missing_fields_surface_as_empty() {
        let snapshot = history();
        let rows = run(&snapshot, "repo:tools");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].author, "");
        assert_eq!(rows[0].timestamp, "");
    }

    #[test]
    fn test_profile_mismatch_is_rejected() {
        let snapshot = history();
        let plan = compile_query("type:merge", &gitonto_core::SnapshotProfile::default());
        let err = Executor::new(&snapshot).execute(&plan).unwrap_err();
        assert!(matches!(err, QueryError::ProfileMismatch(_)));
    }
}
