//! Gitonto Query - Search mini-language for commit history
//!
//! Pipeline: [`tokenize`] a query string, [`compile`] the tokens into a
//! backend-agnostic [`QueryPlan`], then run it with the in-memory
//! [`Executor`] or render it with [`render_sparql`].

pub mod compiler;
pub mod error;
pub mod executor;
pub mod matching;
pub mod plan;
pub mod sparql;
pub mod tokenizer;
pub mod traits;

pub use compiler::{compile, compile_query};
pub use error::{QueryError, QueryResult};
pub use executor::{Executor, ResultRow, ResultSet, Rows};
pub use plan::{AuthorKey, AuthorMatch, Filter, KindConstraint, MessageMatch, QueryPlan, TargetKind};
pub use sparql::{render_sparql, DEFAULT_BASE_IRI};
pub use tokenizer::{tokenize, Tokens};
pub use traits::{run_or_empty, QueryBackend, QueryOutput};
