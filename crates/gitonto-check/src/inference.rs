//! Derived facts
//!
//! Derived facts are the union of an optional external closure (for example
//! a class hierarchy) and a few local heuristics, minus whatever the
//! snapshot already asserts. The engine only reads the snapshot.

use gitonto_core::fact::vocab;
use gitonto_core::limits::MULTI_BRANCH_THRESHOLD;
use gitonto_core::{EntityId, EntityKind, Fact, FactSet, Provenance, ProvenancedFact, Snapshot};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// External closure computation (a reasoner)
pub trait ClosureProvider: Send + Sync {
    /// All facts entailed for the entity, asserted ones included
    fn closure(&self, snapshot: &Snapshot, id: &EntityId) -> FactSet;
}

/// Transitive `subClassOf` closure over asserted types
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    supertypes: BTreeMap<String, BTreeSet<String>>,
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// The git ontology's own class hierarchy
    pub fn git_ontology() -> Self {
        Self::new()
            .with_subclass(vocab::INITIAL_COMMIT, vocab::COMMIT)
            .with_subclass(vocab::MERGE_COMMIT, vocab::COMMIT)
            .with_subclass(vocab::NORMAL_COMMIT, vocab::COMMIT)
            .with_subclass(vocab::MULTI_BRANCH_REPOSITORY, vocab::REPOSITORY)
    }

    pub fn with_subclass(mut self, sub: impl Into<String>, sup: impl Into<String>) -> Self {
        self.supertypes.entry(sub.into()).or_default().insert(sup.into());
        self
    }

    /// Every supertype reachable from `type_name`, excluding itself
    pub fn ancestors(&self, type_name: &str) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        let mut pending = vec![type_name.to_string()];
        while let Some(current) = pending.pop() {
            for sup in self.supertypes.get(&current).into_iter().flatten() {
                if sup != type_name && found.insert(sup.clone()) {
                    pending.push(sup.clone());
                }
            }
        }
        found
    }
}

impl ClosureProvider for TypeHierarchy {
    fn closure(&self, snapshot: &Snapshot, id: &EntityId) -> FactSet {
        let asserted = snapshot.asserted_facts(id);
        let mut closed = asserted.clone();
        for fact in asserted.iter() {
            if let Fact::Type { name } = fact {
                closed.extend(self.ancestors(name).into_iter().map(Fact::type_of));
            }
        }
        closed
    }
}

/// All facts of one entity, tagged with provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityFacts {
    pub id: EntityId,
    pub kind: EntityKind,
    pub facts: Vec<ProvenancedFact>,
}

impl EntityFacts {
    pub fn derived(&self) -> impl Iterator<Item = &Fact> {
        self.facts
            .iter()
            .filter(|f| f.provenance == Provenance::Derived)
            .map(|f| &f.fact)
    }
}

/// Computes derived facts over a snapshot
pub struct InferenceEngine<'a> {
    snapshot: &'a Snapshot,
    closure: Option<&'a dyn ClosureProvider>,
}

impl<'a> InferenceEngine<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            closure: None,
        }
    }

    pub fn with_closure(mut self, provider: &'a dyn ClosureProvider) -> Self {
        self.closure = Some(provider);
        self
    }

    /// Heuristic facts computable without a closure.
    ///
    /// Parentless commits are only tagged initial when the snapshot carries
    /// parent edges at all.
    fn local_facts(&self, id: &EntityId) -> FactSet {
        let mut facts = FactSet::new();
        if let Some(commit) = self.snapshot.commit(id) {
            if commit.parents.len() >= 2 {
                facts.insert(Fact::type_of(vocab::MERGE_COMMIT));
            }
            if commit.parents.is_empty() && self.snapshot.has_parent_edges() {
                facts.insert(Fact::type_of(vocab::INITIAL_COMMIT));
            }
        } else if let Some(repo) = self.snapshot.repository(id) {
            if repo.branches.len() >= MULTI_BRANCH_THRESHOLD {
                facts.insert(Fact::type_of(vocab::MULTI_BRANCH_REPOSITORY));
            }
        }
        facts
    }

    /// Facts about `id` that are entailed but not asserted
    pub fn derived_facts(&self, id: &EntityId) -> FactSet {
        let mut candidates = self.local_facts(id);
        if let Some(provider) = self.closure {
            candidates.extend(provider.closure(self.snapshot, id));
        }
        candidates.difference(&self.snapshot.asserted_facts(id))
    }

    /// Asserted and derived facts together, provenance preserved
    pub fn facts(&self, id: &EntityId) -> Vec<ProvenancedFact> {
        let tag = |provenance: Provenance| move |fact: Fact| ProvenancedFact { fact, provenance };
        self.snapshot
            .asserted_facts(id)
            .into_iter()
            .map(tag(Provenance::Asserted))
            .chain(self.derived_facts(id).into_iter().map(tag(Provenance::Derived)))
            .collect()
    }

    /// Facts for every entity: repositories, branches, commits, then users
    pub fn infer_all(&self) -> Vec<EntityFacts> {
        let snapshot = self.snapshot;
        let ids = snapshot
            .repositories()
            .iter()
            .map(|r| (&r.id, EntityKind::Repository))
            .chain(snapshot.branches().iter().map(|b| (&b.id, EntityKind::Branch)))
            .chain(snapshot.commits().iter().map(|c| (&c.id, EntityKind::Commit)))
            .chain(snapshot.users().iter().map(|u| (&u.id, EntityKind::User)));

        let all: Vec<EntityFacts> = ids
            .map(|(id, kind)| EntityFacts {
                id: id.clone(),
                kind,
                facts: self.facts(id),
            })
            .collect();

        tracing::debug!(
            entities = all.len(),
            derived = all.iter().map(|e| e.derived().count()).sum::<usize>(),
            closure = self.closure.is_some(),
            "Computed derived facts"
        );
        all
    }
}
