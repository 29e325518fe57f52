//! Query compiler: tokens → [`QueryPlan`]
//!
//! Resolves the dataset-dependent kind constraints and the message match
//! mode once, so that any backend executes the same semantics.

use crate::matching::normalize_words;
use crate::plan::{AuthorKey, AuthorMatch, Filter, KindConstraint, MessageMatch, QueryPlan, TargetKind};
use crate::tokenizer::{tokenize, Tokens, MSG_KEY};
use gitonto_core::SnapshotProfile;

/// Keys the compiler understands; anything else is ignored
pub const KNOWN_KEYS: &[&str] = &[MSG_KEY, "author", "type", "branch", "repo", "limit"];

/// Compile tokens against a snapshot profile
pub fn compile(tokens: &Tokens, profile: &SnapshotProfile) -> QueryPlan {
    let has_parent_edges = profile.has_parent_edges;
    let type_value = tokens.get("type").map(str::to_lowercase);

    let (kind, constraint) = match type_value.as_deref() {
        Some("merge") => (
            TargetKind::Merge,
            Some(if has_parent_edges {
                KindConstraint::MergeStructural
            } else {
                KindConstraint::MergeHeuristic
            }),
        ),
        Some("initial") | Some("root") => (
            TargetKind::Initial,
            Some(if has_parent_edges {
                KindConstraint::InitialStructural
            } else {
                KindConstraint::InitialDeclared
            }),
        ),
        Some("normal") | Some("regular") => {
            (TargetKind::Commit, Some(KindConstraint::Normal { has_parent_edges }))
        }
        _ => (TargetKind::Commit, None),
    };

    let mut plan = QueryPlan::new(kind, tokens.limit());
    if let Some(constraint) = constraint {
        plan = plan.with_filter(Filter::Kind { constraint });
    }
    if let Some(matcher) = tokens.get(MSG_KEY).and_then(message_match) {
        plan = plan.with_filter(Filter::Message { matcher });
    }
    if let Some(author) = tokens.get("author") {
        plan = plan.with_filter(Filter::Author {
            matcher: AuthorMatch {
                needle: author.to_lowercase(),
                keys: vec![AuthorKey::Login, AuthorKey::IdLocalName],
            },
        });
    }
    if let Some(branch) = tokens.get("branch") {
        plan = plan.with_filter(Filter::Branch {
            name: branch.to_string(),
        });
    }
    if let Some(repo) = tokens.get("repo") {
        plan = plan.with_filter(Filter::Repo {
            needle: repo.to_lowercase(),
        });
    }

    for (key, _) in tokens.iter().filter(|(k, _)| !KNOWN_KEYS.contains(k)) {
        tracing::debug!(key, "Ignoring unknown query key");
    }
    tracing::debug!(?plan, has_parent_edges, "Compiled query plan");
    plan
}

/// Tokenize and compile in one step
pub fn compile_query(input: &str, profile: &SnapshotProfile) -> QueryPlan {
    compile(&tokenize(input), profile)
}

fn strip_double_quotes(value: &str) -> Option<&str> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Some(&value[1..value.len() - 1])
    } else {
        None
    }
}

/// Resolve a `msg` value into a match mode.
///
/// `~text` is a substring match, `=text` or bare text a whole-word match,
/// and a double-quoted value a phrase. Empty needles disable the filter.
fn message_match(raw: &str) -> Option<MessageMatch> {
    let (quoted, value) = match strip_double_quotes(raw) {
        Some(inner) => (true, inner),
        None => (false, raw),
    };

    let (sigil, rest) = match value.chars().next() {
        Some(c @ ('~' | '=')) => (Some(c), &value[1..]),
        _ => (None, value),
    };
    let (quoted, rest) = match strip_double_quotes(rest) {
        Some(inner) => (true, inner),
        None => (quoted, rest.trim_matches('"')),
    };

    if sigil == Some('~') {
        let needle = rest.trim().to_lowercase();
        return (!needle.is_empty()).then_some(MessageMatch::Substring(needle));
    }

    let needle = normalize_words(rest);
    if needle.is_empty() {
        return None;
    }
    Some(if quoted {
        MessageMatch::Phrase(needle)
    } else {
        MessageMatch::Words(needle)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_edges() -> SnapshotProfile {
        SnapshotProfile {
            parent_edge_count: 3,
            has_parent_edges: true,
            reasoner_available: false,
        }
    }

    fn without_edges() -> SnapshotProfile {
        SnapshotProfile::default()
    }

    #[test]
    fn test_default_plan() {
        let plan = compile_query("", &with_edges());
        assert_eq!(plan.kind, TargetKind::Commit);
        assert!(plan.is_unfiltered());
        assert_eq!(plan.limit, 50);
    }

    #[test]
    fn test_kind_constraint_depends_on_parent_edges() {
        let plan = compile_query("type:merge", &with_edges());
        assert_eq!(plan.kind, TargetKind::Merge);
        assert_eq!(
            plan.filters,
            vec![Filter::Kind {
                constraint: KindConstraint::MergeStructural
            }]
        );

        let plan = compile_query("type:Merge", &without_edges());
        assert_eq!(
            plan.filters,
            vec![Filter::Kind {
                constraint: KindConstraint::MergeHeuristic
            }]
        );

        let plan = compile_query("type:root", &with_edges());
        assert_eq!(plan.kind, TargetKind::Initial);
        assert_eq!(
            plan.filters,
            vec![Filter::Kind {
                constraint: KindConstraint::InitialStructural
            }]
        );

        let plan = compile_query("type:initial", &without_edges());
        assert_eq!(
            plan.filters,
            vec![Filter::Kind {
                constraint: KindConstraint::InitialDeclared
            }]
        );
    }

    #[test]
    fn test_normal_and_unknown_types() {
        let plan = compile_query("type:regular", &with_edges());
        assert_eq!(plan.kind, TargetKind::Commit);
        assert_eq!(
            plan.filters,
            vec![Filter::Kind {
                constraint: KindConstraint::Normal {
                    has_parent_edges: true
                }
            }]
        );

        let plan = compile_query("type:octopus", &with_edges());
        assert_eq!(plan.kind, TargetKind::Commit);
        assert!(plan.is_unfiltered());
    }

    #[test]
    fn test_message_modes() {
        assert_eq!(message_match("~Test"), Some(MessageMatch::Substring("test".into())));
        assert_eq!(message_match("=Test"), Some(MessageMatch::Words("test".into())));
        assert_eq!(message_match("Test"), Some(MessageMatch::Words("test".into())));
        assert_eq!(
            message_match("\"Unit  Test\""),
            Some(MessageMatch::Phrase("unit test".into()))
        );
        assert_eq!(
            message_match("=\"unit test\""),
            Some(MessageMatch::Phrase("unit test".into()))
        );
        assert_eq!(
            message_match("\"~unit test\""),
            Some(MessageMatch::Substring("unit test".into()))
        );
    }

    #[test]
    fn test_empty_message_disables_filter() {
        assert_eq!(message_match("~"), None);
        assert_eq!(message_match("="), None);
        assert_eq!(message_match("\"\""), None);
        assert_eq!(message_match("\""), None);
        assert_eq!(message_match("--"), None);
        assert!(compile_query("msg:~", &with_edges()).is_unfiltered());
    }

    #[test]
    fn test_author_fallback_is_explicit() {
        let plan = compile_query("author:Alice", &with_edges());
        assert_eq!(
            plan.filters,
            vec![Filter::Author {
                matcher: AuthorMatch {
                    needle: "alice".into(),
                    keys: vec![AuthorKey::Login, AuthorKey::IdLocalName],
                }
            }]
        );
    }

    #[test]
    fn test_branch_kept_exact_repo_lowered() {
        let plan = compile_query("branch:Main repo:ACME", &with_edges());
        assert!(plan.filters.contains(&Filter::Branch { name: "Main".into() }));
        assert!(plan.filters.contains(&Filter::Repo { needle: "acme".into() }));
    }

    #[test]
    fn test_limit_carried_into_plan() {
        assert_eq!(compile_query("limit:7", &with_edges()).limit, 7);
        assert_eq!(compile_query("limit:x", &with_edges()).limit, 50);
    }
}
