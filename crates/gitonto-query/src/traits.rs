//! Query backend traits

use crate::executor::{Executor, ResultRow};
use crate::plan::{QueryPlan, TargetKind};
use serde::Serialize;

pub use crate::error::{QueryError, QueryResult as Result};

/// Materialized query output
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutput {
    /// Kind the plan targeted
    pub kind: TargetKind,
    pub rows: Vec<ResultRow>,
}

/// Trait for anything that can run a compiled plan.
///
/// The in-memory [`Executor`] is one implementation; a remote graph store
/// would be another, reporting its failures as [`QueryError::Execution`].
pub trait QueryBackend: Send + Sync {
    /// Short backend name used in logs and errors
    fn name(&self) -> &str;

    /// Run a plan to completion
    fn run(&self, plan: &QueryPlan) -> Result<QueryOutput>;
}

impl QueryBackend for Executor<'_> {
    fn name(&self) -> &str {
        "memory"
    }

    fn run(&self, plan: &QueryPlan) -> Result<QueryOutput> {
        let result = Executor::new(self.snapshot()).execute(plan)?;
        let rows = result.collect_rows();
        tracing::debug!(backend = self.name(), rows = rows.len(), "Query finished");
        Ok(QueryOutput {
            kind: result.kind(),
            rows,
        })
    }
}

/// Run a plan, turning a backend failure into an empty result.
///
/// Contract violations such as a profile mismatch are still returned.
pub fn run_or_empty(backend: &dyn QueryBackend, plan: &QueryPlan) -> Result<QueryOutput> {
    match backend.run(plan) {
        Err(QueryError::Execution { backend, message }) => {
            tracing::warn!(%backend, %message, "Query backend failed, returning no rows");
            Ok(QueryOutput {
                kind: plan.kind,
                rows: Vec::new(),
            })
        }
        other => other,
    }
}
