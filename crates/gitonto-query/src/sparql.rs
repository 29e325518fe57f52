//! Render a [`QueryPlan`] as a SPARQL SELECT over the git ontology
//!
//! The rendered query projects the same columns as the in-memory executor.
//! `DISTINCT` stands in for the executor's once-per-commit rule.

use crate::plan::{AuthorKey, Filter, KindConstraint, MessageMatch, QueryPlan};
use gitonto_core::classify::MERGE_MESSAGE_PATTERN;
use gitonto_core::fact::vocab;
use std::fmt::Write;

/// Namespace used when the caller does not supply one
pub const DEFAULT_BASE_IRI: &str = "http://example.org/git#";

const NORMALIZED_MESSAGE: &str =
    r#"CONCAT(" ", LCASE(REPLACE(STR(?message), "[^\\p{L}\\p{N}]+", " ")), " ")"#;

fn literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn merge_regex() -> String {
    format!(
        "(BOUND(?message) && REGEX(LCASE(STR(?message)), {}))",
        literal(MERGE_MESSAGE_PATTERN)
    )
}

const HAS_TWO_PARENTS: &str =
    "EXISTS { ?commit git:hasParent ?p1 , ?p2 . FILTER(?p1 != ?p2) }";
const HAS_PARENT: &str = "EXISTS { ?commit git:hasParent ?anyParent }";

fn kind_condition(constraint: KindConstraint) -> String {
    match constraint {
        KindConstraint::MergeStructural => format!("({} || {})", HAS_TWO_PARENTS, merge_regex()),
        KindConstraint::MergeHeuristic => merge_regex(),
        KindConstraint::InitialStructural => format!("NOT {}", HAS_PARENT),
        KindConstraint::InitialDeclared => {
            "EXISTS { ?anyBranch git:hasInitialCommit ?commit }".to_string()
        }
        KindConstraint::Normal { has_parent_edges: true } => format!(
            "(!{} && !{} && {})",
            HAS_TWO_PARENTS,
            merge_regex(),
            HAS_PARENT
        ),
        KindConstraint::Normal { has_parent_edges: false } => format!("!{}", merge_regex()),
    }
}

fn filter_condition(filter: &Filter) -> String {
    match filter {
        Filter::Kind { constraint } => kind_condition(*constraint),
        Filter::Message { matcher } => match matcher {
            MessageMatch::Substring(needle) => {
                format!("CONTAINS(LCASE(STR(?message)), {})", literal(needle))
            }
            MessageMatch::Words(needle) | MessageMatch::Phrase(needle) => format!(
                "CONTAINS({}, {})",
                NORMALIZED_MESSAGE,
                literal(&format!(" {} ", needle))
            ),
        },
        Filter::Author { matcher } => {
            let keys: Vec<&str> = matcher
                .keys
                .iter()
                .map(|key| match key {
                    AuthorKey::Login => "?login",
                    AuthorKey::IdLocalName => "?authorLocal",
                })
                .collect();
            format!(
                "LCASE(STR(COALESCE({}))) = {}",
                keys.join(", "),
                literal(&matcher.needle)
            )
        }
        Filter::Branch { name } => format!("?branchName = {}", literal(name)),
        Filter::Repo { needle } => format!("CONTAINS(LCASE(?repoName), {})", literal(needle)),
    }
}

/// Render the plan against the ontology rooted at `base_iri`
pub fn render_sparql(plan: &QueryPlan, base_iri: &str) -> String {
    let mut q = String::new();
    let _ = writeln!(q, "PREFIX git: <{}>", base_iri);
    let _ = writeln!(q, "PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>");
    let _ = writeln!(
        q,
        "SELECT DISTINCT ?repoName ?branchName ?commit ?message ?authorName ?timestamp WHERE {{"
    );
    let _ = writeln!(q, "  ?repo a git:{} ; git:{} ?branch .", vocab::REPOSITORY, vocab::HAS_BRANCH);
    let _ = writeln!(q, "  ?branch git:{} ?commit .", vocab::HAS_COMMIT);
    let _ = writeln!(q, "  OPTIONAL {{ ?repo git:{} ?fullName }}", vocab::REPO_FULL_NAME);
    let _ = writeln!(q, "  OPTIONAL {{ ?repo rdfs:label ?label }}");
    let _ = writeln!(
        q,
        "  BIND(STR(COALESCE(?fullName, ?label, REPLACE(STR(?repo), \"^.*[#/]\", \"\"))) AS ?repoName)"
    );
    let _ = writeln!(q, "  OPTIONAL {{ ?branch git:{} ?branchName }}", vocab::BRANCH_NAME);
    let _ = writeln!(q, "  OPTIONAL {{ ?commit git:{} ?message }}", vocab::COMMIT_MESSAGE);
    let _ = writeln!(q, "  OPTIONAL {{ ?commit git:{} ?timestamp }}", vocab::COMMIT_TIMESTAMP);
    let _ = writeln!(
        q,
        "  OPTIONAL {{ ?commit git:{} ?author . OPTIONAL {{ ?author git:{} ?login }} }}",
        vocab::MADE_BY,
        vocab::LOGIN
    );
    let _ = writeln!(
        q,
        "  BIND(REPLACE(STR(?author), \"^.*[#/]\", \"\") AS ?authorLocal)"
    );
    let _ = writeln!(q, "  BIND(COALESCE(?login, ?authorLocal, \"\") AS ?authorName)");
    for filter in &plan.filters {
        let _ = writeln!(q, "  FILTER({})", filter_condition(filter));
    }
    let _ = writeln!(q, "}}");
    let _ = write!(q, "LIMIT {}", plan.limit);
    q
}
