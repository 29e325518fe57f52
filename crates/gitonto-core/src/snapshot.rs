//! Immutable point-in-time graph snapshot
//!
//! The snapshot is the single owner of every entity. It is built once from
//! [`SnapshotData`], checks that every reference resolves, and computes the
//! [`SnapshotProfile`] that the other components consult instead of
//! re-deriving dataset-wide facts per commit.

use crate::classify::count_parent_edges;
use crate::entity::{Branch, Commit, EntityId, EntityKind, Repository, User};
use crate::error::{Error, Result};
use crate::fact::{vocab, Fact, FactSet};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Raw entity collections as supplied by a loader
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotData {
    #[serde(default)]
    pub repositories: Vec<Repository>,
    #[serde(default)]
    pub branches: Vec<Branch>,
    #[serde(default)]
    pub commits: Vec<Commit>,
    #[serde(default)]
    pub users: Vec<User>,
}

impl SnapshotData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repository(mut self, repository: Repository) -> Self {
        self.repositories.push(repository);
        self
    }

    pub fn with_branch(mut self, branch: Branch) -> Self {
        self.branches.push(branch);
        self
    }

    pub fn with_commit(mut self, commit: Commit) -> Self {
        self.commits.push(commit);
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }

    /// Build the snapshot, checking references
    pub fn build(self) -> Result<Snapshot> {
        Snapshot::new(self)
    }
}

/// Dataset-wide capability flags, computed once per snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotProfile {
    /// Number of parent edges across all commits
    pub parent_edge_count: usize,

    /// Whether parent-count evidence can be trusted at all
    pub has_parent_edges: bool,

    /// Whether the caller attached an external closure computation
    pub reasoner_available: bool,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Repository(usize),
    Branch(usize),
    Commit(usize),
    User(usize),
}

/// Read-only commit history graph
#[derive(Debug, Clone)]
pub struct Snapshot {
    repositories: Vec<Repository>,
    branches: Vec<Branch>,
    commits: Vec<Commit>,
    users: Vec<User>,
    index: HashMap<EntityId, Slot>,
    declared_initial: HashSet<EntityId>,
    profile: SnapshotProfile,
}

impl Snapshot {
    /// Build a snapshot from loader output.
    ///
    /// Fails if identifiers collide or any edge points at a missing entity
    /// of the expected kind.
    pub fn new(data: SnapshotData) -> Result<Self> {
        let SnapshotData {
            repositories,
            branches,
            commits,
            users,
        } = data;

        let mut index = HashMap::new();
        let slots = repositories
            .iter()
            .enumerate()
            .map(|(i, r)| (&r.id, Slot::Repository(i)))
            .chain(branches.iter().enumerate().map(|(i, b)| (&b.id, Slot::Branch(i))))
            .chain(commits.iter().enumerate().map(|(i, c)| (&c.id, Slot::Commit(i))))
            .chain(users.iter().enumerate().map(|(i, u)| (&u.id, Slot::User(i))));
        for (id, slot) in slots {
            if index.insert(id.clone(), slot).is_some() {
                return Err(Error::DuplicateEntity(id.to_string()));
            }
        }

        let parent_edge_count = count_parent_edges(&commits);
        let declared_initial = branches
            .iter()
            .flat_map(|b| b.initial_commits.iter().cloned())
            .collect();

        let snapshot = Self {
            repositories,
            branches,
            commits,
            users,
            index,
            declared_initial,
            profile: SnapshotProfile {
                parent_edge_count,
                has_parent_edges: parent_edge_count > 0,
                reasoner_available: false,
            },
        };
        snapshot.check_references()?;

        tracing::debug!(
            repositories = snapshot.repositories.len(),
            branches = snapshot.branches.len(),
            commits = snapshot.commits.len(),
            users = snapshot.users.len(),
            parent_edges = parent_edge_count,
            "Built snapshot"
        );

        Ok(snapshot)
    }

    /// Parse a JSON document shaped like [`SnapshotData`] and build it
    pub fn from_json(json: &str) -> Result<Self> {
        let data: SnapshotData = serde_json::from_str(json)?;
        Self::new(data)
    }

    /// Record whether an external closure computation is attached
    pub fn with_reasoner_available(mut self, available: bool) -> Self {
        self.profile.reasoner_available = available;
        self
    }

    fn check_references(&self) -> Result<()> {
        let expect = |from: &EntityId, edge: &'static str, to: &EntityId, kind: EntityKind| {
            if self.kind_of(to) == Some(kind) {
                Ok(())
            } else {
                Err(Error::DanglingReference {
                    from: from.to_string(),
                    edge,
                    to: to.to_string(),
                })
            }
        };

        for repo in &self.repositories {
            for b in &repo.branches {
                expect(&repo.id, vocab::HAS_BRANCH, b, EntityKind::Branch)?;
            }
        }
        for branch in &self.branches {
            for c in &branch.initial_commits {
                expect(&branch.id, vocab::HAS_INITIAL_COMMIT, c, EntityKind::Commit)?;
            }
            for c in &branch.commits {
                expect(&branch.id, vocab::HAS_COMMIT, c, EntityKind::Commit)?;
            }
        }
        for commit in &self.commits {
            if let Some(author) = &commit.author {
                expect(&commit.id, vocab::MADE_BY, author, EntityKind::User)?;
            }
            for p in &commit.parents {
                expect(&commit.id, vocab::HAS_PARENT, p, EntityKind::Commit)?;
            }
        }
        Ok(())
    }

    pub fn profile(&self) -> &SnapshotProfile {
        &self.profile
    }

    pub fn has_parent_edges(&self) -> bool {
        self.profile.has_parent_edges
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn kind_of(&self, id: &EntityId) -> Option<EntityKind> {
        self.index.get(id).map(|slot| match slot {
            Slot::Repository(_) => EntityKind::Repository,
            Slot::Branch(_) => EntityKind::Branch,
            Slot::Commit(_) => EntityKind::Commit,
            Slot::User(_) => EntityKind::User,
        })
    }

    pub fn repository(&self, id: &EntityId) -> Option<&Repository> {
        match self.index.get(id)? {
            Slot::Repository(i) => self.repositories.get(*i),
            _ => None,
        }
    }

    /// Look up a repository by identifier or by its identifier's local name
    pub fn find_repository(&self, key: &str) -> Option<&Repository> {
        self.repository(&EntityId::from(key))
            .or_else(|| self.repositories.iter().find(|r| r.id.local_name() == key))
    }

    pub fn branch(&self, id: &EntityId) -> Option<&Branch> {
        match self.index.get(id)? {
            Slot::Branch(i) => self.branches.get(*i),
            _ => None,
        }
    }

    pub fn commit(&self, id: &EntityId) -> Option<&Commit> {
        match self.index.get(id)? {
            Slot::Commit(i) => self.commits.get(*i),
            _ => None,
        }
    }

    pub fn user(&self, id: &EntityId) -> Option<&User> {
        match self.index.get(id)? {
            Slot::User(i) => self.users.get(*i),
            _ => None,
        }
    }

    /// Branches owned by a repository, in the repository's order
    pub fn branches_of<'a>(&'a self, repo: &'a Repository) -> impl Iterator<Item = &'a Branch> + 'a {
        repo.branches.iter().filter_map(move |id| self.branch(id))
    }

    /// Commits belonging to a branch, in the branch's order
    pub fn commits_of<'a>(&'a self, branch: &'a Branch) -> impl Iterator<Item = &'a Commit> + 'a {
        branch.commits.iter().filter_map(move |id| self.commit(id))
    }

    pub fn author_of(&self, commit: &Commit) -> Option<&User> {
        commit.author.as_ref().and_then(|id| self.user(id))
    }

    /// True if some branch names this commit as its initial commit
    pub fn is_declared_initial(&self, commit: &EntityId) -> bool {
        self.declared_initial.contains(commit)
    }

    /// Facts stated directly in the snapshot: asserted types, the entity's
    /// kind, and its outgoing edges.
    pub fn asserted_facts(&self, id: &EntityId) -> FactSet {
        let mut facts = FactSet::new();
        let Some(slot) = self.index.get(id) else {
            return facts;
        };

        let (kind, types) = match *slot {
            Slot::Repository(i) => {
                let repo = &self.repositories[i];
                facts.extend(repo.branches.iter().map(|b| Fact::relation(vocab::HAS_BRANCH, b.clone())));
                (vocab::REPOSITORY, &repo.types)
            }
            Slot::Branch(i) => {
                let branch = &self.branches[i];
                facts.extend(
                    branch
                        .initial_commits
                        .iter()
                        .map(|c| Fact::relation(vocab::HAS_INITIAL_COMMIT, c.clone())),
                );
                facts.extend(branch.commits.iter().map(|c| Fact::relation(vocab::HAS_COMMIT, c.clone())));
                (vocab::BRANCH, &branch.types)
            }
            Slot::Commit(i) => {
                let commit = &self.commits[i];
                facts.extend(commit.parents.iter().map(|p| Fact::relation(vocab::HAS_PARENT, p.clone())));
                if let Some(author) = &commit.author {
                    facts.insert(Fact::relation(vocab::MADE_BY, author.clone()));
                }
                (vocab::COMMIT, &commit.types)
            }
            Slot::User(i) => (vocab::USER, &self.users[i].types),
        };

        facts.insert(Fact::type_of(kind));
        facts.extend(types.iter().map(Fact::type_of));
        facts
    }
}
