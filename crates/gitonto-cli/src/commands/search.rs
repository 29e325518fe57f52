//! Search commands

use clap::Args;

use crate::output::{format_output, OutputFormat, Tabular};
use crate::{AppContext, Cli};
use gitonto_core::limits::clamp_query_limit;
use gitonto_query::{compile_query, render_sparql, run_or_empty, Executor, ResultRow, DEFAULT_BASE_IRI};

#[derive(Args)]
pub struct SearchArgs {
    /// Query terms, e.g. `type:merge author:alice msg:~fix`
    #[arg(num_args = 0..)]
    pub query: Vec<String>,

    /// Override the query's limit
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Print the compiled plan as JSON instead of running it
    #[arg(long, conflicts_with = "sparql")]
    pub explain: bool,

    /// Print the plan as a SPARQL query instead of running it
    #[arg(long)]
    pub sparql: bool,

    /// Ontology namespace used by --sparql
    #[arg(long, default_value = DEFAULT_BASE_IRI)]
    pub base_iri: String,
}

impl Tabular for ResultRow {
    fn headers() -> &'static [&'static str] {
        &["repository", "branch", "commit", "kind", "author", "timestamp", "message"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.repository.clone(),
            self.branch.clone(),
            self.commit.clone(),
            self.kind.to_string(),
            self.author.clone(),
            self.timestamp.clone(),
            self.message.clone(),
        ]
    }
}

pub fn run(args: &SearchArgs, _cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let input = args.query.join(" ");
    let mut plan = compile_query(&input, ctx.snapshot.profile());
    if let Some(limit) = args.limit {
        plan.limit = clamp_query_limit(limit);
    }

    if args.explain {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }
    if args.sparql {
        println!("{}", render_sparql(&plan, &args.base_iri));
        return Ok(());
    }

    let executor = Executor::new(&ctx.snapshot);
    let output = run_or_empty(&executor, &plan)?;

    tracing::info!("Search returned {} {} rows", output.rows.len(), output.kind.as_str());

    if output.rows.is_empty() && ctx.format == OutputFormat::Table {
        println!("No matching commits");
    } else {
        print!("{}", format_output(&output.rows, ctx.format));
        if ctx.format == OutputFormat::Json {
            println!();
        }
    }

    Ok(())
}
