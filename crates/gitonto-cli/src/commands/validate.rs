//! Validate command

use clap::Args;

use crate::output::{format_output, OutputFormat, Tabular};
use crate::{AppContext, Cli};
use gitonto_check::{validate, Issue};

#[derive(Args)]
pub struct ValidateArgs {
    /// Exit with an error when any issue is found
    #[arg(long)]
    pub strict: bool,
}

impl Tabular for Issue {
    fn headers() -> &'static [&'static str] {
        &["kind", "entity", "description"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.entity_kind.to_string(),
            self.entity_label.clone(),
            self.description.clone(),
        ]
    }
}

pub fn run(args: &ValidateArgs, _cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let issues = validate(&ctx.snapshot);
    tracing::info!("Validation found {} issues", issues.len());

    if issues.is_empty() && ctx.format == OutputFormat::Table {
        println!("No issues found");
    } else {
        print!("{}", format_output(&issues, ctx.format));
        if ctx.format == OutputFormat::Json {
            println!();
        }
    }

    if args.strict && !issues.is_empty() {
        anyhow::bail!("{} integrity issue(s) found", issues.len());
    }
    Ok(())
}
