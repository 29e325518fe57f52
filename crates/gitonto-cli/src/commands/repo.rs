//! Repository detail

use clap::Args;
use serde::Serialize;

use crate::output::{format_output, OutputFormat, Tabular};
use crate::{AppContext, Cli};
use gitonto_core::{classify, is_initial, Branch, Commit, CommitKind, Snapshot};

#[derive(Args)]
pub struct RepoArgs {
    /// Repository identifier or its local name
    pub repo: String,
}

#[derive(Debug, Serialize)]
pub struct CommitDetail {
    pub id: String,
    pub author: String,
    pub timestamp: String,
    pub message: String,
    pub kind: CommitKind,
    pub merge: bool,
    pub initial: bool,
    pub parents: Vec<String>,
}

impl CommitDetail {
    /// Parentless means initial when the snapshot records parent edges;
    /// otherwise only the branch's declared initial commit counts.
    fn new(snapshot: &Snapshot, branch: &Branch, commit: &Commit) -> Self {
        let has_parent_edges = snapshot.has_parent_edges();
        let kind = classify(commit, has_parent_edges);
        let initial = if has_parent_edges {
            is_initial(commit)
        } else {
            branch.initial_commits.contains(&commit.id)
        };
        let author = snapshot
            .author_of(commit)
            .map(|user| user.display_name().to_string())
            .unwrap_or_default();
        Self {
            id: commit.id.local_name().to_string(),
            author,
            timestamp: commit.timestamp_text(),
            message: commit.message_text().to_string(),
            kind,
            merge: kind == CommitKind::Merge,
            initial,
            parents: commit.parents.iter().map(|p| p.local_name().to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BranchDetail {
    pub name: String,
    pub initial_commit: Option<String>,
    pub commits: Vec<CommitDetail>,
}

#[derive(Debug, Serialize)]
pub struct RepoDetail {
    pub id: String,
    pub name: String,
    pub branches: Vec<BranchDetail>,
}

/// One commit with its branch, for table and CSV output
#[derive(Serialize)]
struct CommitLine<'a> {
    branch: &'a str,
    #[serde(flatten)]
    commit: &'a CommitDetail,
}

impl Tabular for CommitLine<'_> {
    fn headers() -> &'static [&'static str] {
        &["branch", "commit", "kind", "initial", "parents", "author", "timestamp", "message"]
    }

    fn cells(&self) -> Vec<String> {
        let c = self.commit;
        vec![
            self.branch.to_string(),
            c.id.clone(),
            c.kind.to_string(),
            if c.initial { "yes" } else { "" }.to_string(),
            c.parents.join(" "),
            c.author.clone(),
            c.timestamp.clone(),
            c.message.clone(),
        ]
    }
}

pub fn run(args: &RepoArgs, _cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let snapshot = &ctx.snapshot;
    let repo = snapshot
        .find_repository(&args.repo)
        .ok_or_else(|| anyhow::anyhow!("Repository not found: {}", args.repo))?;

    let detail = RepoDetail {
        id: repo.id.to_string(),
        name: repo.display_name().to_string(),
        branches: snapshot
            .branches_of(repo)
            .map(|branch| BranchDetail {
                name: branch.label().to_string(),
                initial_commit: branch
                    .initial_commits
                    .first()
                    .map(|c| c.local_name().to_string()),
                commits: snapshot
                    .commits_of(branch)
                    .map(|commit| CommitDetail::new(snapshot, branch, commit))
                    .collect(),
            })
            .collect(),
    };

    if ctx.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    let lines: Vec<CommitLine> = detail
        .branches
        .iter()
        .flat_map(|b| b.commits.iter().map(move |commit| CommitLine { branch: &b.name, commit }))
        .collect();

    if ctx.format == OutputFormat::Table {
        println!("{} ({} branches)", detail.name, detail.branches.len());
        for branch in &detail.branches {
            println!(
                "  {}: {} commits, initial {}",
                branch.name,
                branch.commits.len(),
                branch.initial_commit.as_deref().unwrap_or("(none)")
            );
        }
        println!();
    }
    print!("{}", format_output(&lines, ctx.format));
    Ok(())
}
