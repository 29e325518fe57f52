//! Facts about entities and their provenance
//!
//! Asserted facts come straight from the snapshot (type names and outgoing
//! edges). Derived facts are computed elsewhere and kept in a separate set,
//! so a caller can always tell which is which.

use crate::entity::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ontology vocabulary shared by the loader, the inference engine, and
/// plan rendering.
pub mod vocab {
    pub const REPOSITORY: &str = "Repository";
    pub const BRANCH: &str = "Branch";
    pub const COMMIT: &str = "Commit";
    pub const USER: &str = "User";

    pub const INITIAL_COMMIT: &str = "InitialCommit";
    pub const MERGE_COMMIT: &str = "MergeCommit";
    pub const NORMAL_COMMIT: &str = "NormalCommit";
    pub const MULTI_BRANCH_REPOSITORY: &str = "MultiBranchRepository";

    pub const HAS_BRANCH: &str = "hasBranch";
    pub const HAS_COMMIT: &str = "hasCommit";
    pub const HAS_INITIAL_COMMIT: &str = "hasInitialCommit";
    pub const HAS_PARENT: &str = "hasParent";
    pub const MADE_BY: &str = "madeBy";
    pub const BRANCH_NAME: &str = "branchName";
    pub const COMMIT_MESSAGE: &str = "commitMessage";
    pub const COMMIT_TIMESTAMP: &str = "commitTimestamp";
    pub const REPO_FULL_NAME: &str = "repoFullName";
    pub const LOGIN: &str = "login";
}

/// A single type or relation fact about an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "fact", rename_all = "lowercase")]
pub enum Fact {
    /// The entity is an instance of `name`
    Type { name: String },
    /// The entity is linked to `object` through `predicate`
    Relation { predicate: String, object: EntityId },
}

impl Fact {
    pub fn type_of(name: impl Into<String>) -> Self {
        Self::Type { name: name.into() }
    }

    pub fn relation(predicate: impl Into<String>, object: impl Into<EntityId>) -> Self {
        Self::Relation {
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl std::fmt::Display for Fact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Type { name } => write!(f, "a {}", name),
            Self::Relation { predicate, object } => write!(f, "{} {}", predicate, object),
        }
    }
}

/// Ordered, duplicate-free set of facts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactSet(BTreeSet<Fact>);

impl FactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fact; returns false if it was already present
    pub fn insert(&mut self, fact: Fact) -> bool {
        self.0.insert(fact)
    }

    pub fn contains(&self, fact: &Fact) -> bool {
        self.0.contains(fact)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.0.iter()
    }

    /// Facts in `self` that are not in `other`
    pub fn difference(&self, other: &FactSet) -> FactSet {
        Self(self.0.difference(&other.0).cloned().collect())
    }

    pub fn extend(&mut self, facts: impl IntoIterator<Item = Fact>) {
        self.0.extend(facts);
    }
}

impl FromIterator<Fact> for FactSet {
    fn from_iter<I: IntoIterator<Item = Fact>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FactSet {
    type Item = Fact;
    type IntoIter = std::collections::btree_set::IntoIter<Fact>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Where a fact came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Asserted,
    Derived,
}

/// A fact tagged with its provenance
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProvenancedFact {
    #[serde(flatten)]
    pub fact: Fact,
    pub provenance: Provenance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_set_deduplicates() {
        let mut facts = FactSet::new();
        assert!(facts.insert(Fact::type_of(vocab::COMMIT)));
        assert!(!facts.insert(Fact::type_of(vocab::COMMIT)));
        assert_eq!(facts.len(), 1);
    }

    #[test]
    fn test_difference() {
        let asserted: FactSet = [Fact::type_of(vocab::COMMIT)].into_iter().collect();
        let computed: FactSet = [
            Fact::type_of(vocab::COMMIT),
            Fact::type_of(vocab::MERGE_COMMIT),
        ]
        .into_iter()
        .collect();

        let derived = computed.difference(&asserted);
        assert_eq!(derived.len(), 1);
        assert!(derived.contains(&Fact::type_of(vocab::MERGE_COMMIT)));
    }

    #[test]
    fn test_fact_display() {
        assert_eq!(Fact::type_of("MergeCommit").to_string(), "a MergeCommit");
        assert_eq!(Fact::relation("hasParent", "c1").to_string(), "hasParent c1");
    }
}
