//! Repository overview

use serde::Serialize;
use std::collections::BTreeSet;

use crate::output::{format_output, OutputFormat, Tabular};
use crate::{AppContext, Cli};
use gitonto_core::{Repository, Snapshot};

#[derive(Debug, Serialize)]
pub struct RepoSummary {
    pub id: String,
    pub name: String,
    pub branches: usize,
    pub commits: usize,
}

impl RepoSummary {
    /// Commits are counted once per branch that contains them
    pub fn new(snapshot: &Snapshot, repo: &Repository) -> Self {
        let mut branches = BTreeSet::new();
        let mut commits = 0;
        for branch in snapshot.branches_of(repo) {
            if branches.insert(&branch.id) {
                commits += branch.commits.len();
            }
        }
        Self {
            id: repo.id.to_string(),
            name: repo.display_name().to_string(),
            branches: branches.len(),
            commits,
        }
    }
}

impl Tabular for RepoSummary {
    fn headers() -> &'static [&'static str] {
        &["repository", "branches", "commits", "id"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.branches.to_string(),
            self.commits.to_string(),
            self.id.clone(),
        ]
    }
}

pub fn run(_cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let summaries: Vec<RepoSummary> = ctx
        .snapshot
        .repositories()
        .iter()
        .map(|repo| RepoSummary::new(&ctx.snapshot, repo))
        .collect();

    if summaries.is_empty() && ctx.format == OutputFormat::Table {
        println!("No repositories in snapshot");
    } else {
        print!("{}", format_output(&summaries, ctx.format));
        if ctx.format == OutputFormat::Json {
            println!();
        }
    }
    Ok(())
}
