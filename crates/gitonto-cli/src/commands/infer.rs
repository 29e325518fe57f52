//! Inference report

use clap::Args;
use serde::Serialize;

use crate::output::{format_output, OutputFormat, Tabular};
use crate::{AppContext, Cli};
use gitonto_check::{EntityFacts, InferenceEngine, TypeHierarchy};
use gitonto_core::{EntityId, Provenance};

#[derive(Args)]
pub struct InferArgs {
    /// Only report this entity
    pub entity: Option<String>,

    /// Hide asserted facts
    #[arg(long)]
    pub derived: bool,

    /// Skip the ontology class hierarchy and use local heuristics only
    #[arg(long)]
    pub no_hierarchy: bool,
}

#[derive(Serialize)]
struct FactLine {
    entity: String,
    kind: String,
    fact: String,
    provenance: Provenance,
}

impl Tabular for FactLine {
    fn headers() -> &'static [&'static str] {
        &["entity", "kind", "fact", "provenance"]
    }

    fn cells(&self) -> Vec<String> {
        let provenance = match self.provenance {
            Provenance::Asserted => "asserted",
            Provenance::Derived => "derived",
        };
        vec![
            self.entity.clone(),
            self.kind.clone(),
            self.fact.clone(),
            provenance.to_string(),
        ]
    }
}

pub fn run(args: &InferArgs, _cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let snapshot = &ctx.snapshot;
    let hierarchy = TypeHierarchy::git_ontology();
    let mut engine = InferenceEngine::new(snapshot);
    if snapshot.profile().reasoner_available {
        engine = engine.with_closure(&hierarchy);
    }

    let mut report: Vec<EntityFacts> = match &args.entity {
        Some(key) => {
            let id = EntityId::from(key.as_str());
            let kind = snapshot
                .kind_of(&id)
                .ok_or_else(|| anyhow::anyhow!("Entity not found: {}", key))?;
            let facts = engine.facts(&id);
            vec![EntityFacts { id, kind, facts }]
        }
        None => engine.infer_all(),
    };

    if args.derived {
        for entity in &mut report {
            entity.facts.retain(|f| f.provenance == Provenance::Derived);
        }
        report.retain(|entity| !entity.facts.is_empty());
    }

    if ctx.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let lines: Vec<FactLine> = report
        .iter()
        .flat_map(|entity| {
            entity.facts.iter().map(move |f| FactLine {
                entity: entity.id.local_name().to_string(),
                kind: entity.kind.to_string(),
                fact: f.fact.to_string(),
                provenance: f.provenance,
            })
        })
        .collect();

    if lines.is_empty() && ctx.format == OutputFormat::Table {
        println!("No facts to report");
    } else {
        print!("{}", format_output(&lines, ctx.format));
    }
    Ok(())
}
