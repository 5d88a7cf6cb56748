use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Row, Table};
use serde::Serialize;

use crate::demand;

#[derive(Debug, Clone, Copy, ValueEnum, Serialize, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "querybridge")]
#[command(
    about = "Translate GraphQL queries to XSB Datalog with demand transformation",
    version
)]
pub struct Cli {
    /// Path to the GraphQL schema file.
    pub schema: PathBuf,

    /// Path to the GraphQL query file.
    pub query: PathBuf,

    /// Apply the demand (magic-set) transformation.
    #[arg(long, short = 'd')]
    pub demand: bool,

    /// Also write the generated program to this file.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Summarise the demand transformation per root field.
    #[arg(long)]
    pub explain: bool,

    /// Print only the generated program.
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    root_fields: Vec<String>,
    demand: bool,
    program: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    transformations: Option<Vec<TransformationRow>>,
}

#[derive(Debug, Serialize)]
struct TransformationRow {
    field: String,
    adornment: String,
    reason: String,
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let schema_text = fs::read_to_string(&cli.schema)
        .with_context(|| format!("reading schema {}", cli.schema.display()))?;
    let query_text = fs::read_to_string(&cli.query)
        .with_context(|| format!("reading query {}", cli.query.display()))?;

    crate::parse_schema(&schema_text)?;
    let mut roots = crate::parse_query(&query_text)?;

    let transformations = cli.explain.then(|| {
        demand::transform(&roots)
            .applied
            .into_iter()
            .map(|(field, info)| TransformationRow {
                field,
                adornment: info.adornment,
                reason: info.reason,
            })
            .collect::<Vec<_>>()
    });

    let root_fields: Vec<String> = roots.iter().map(|root| root.name.clone()).collect();
    let program = crate::generate_datalog(&mut roots, cli.demand);

    if let Some(path) = &cli.output {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &program)
            .with_context(|| format!("writing output {}", path.display()))?;
    }

    match cli.format {
        OutputFormat::Json => {
            let report = Report {
                root_fields,
                demand: cli.demand,
                program,
                transformations,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("Translating GraphQL to XSB...");
                println!("Schema: {}", cli.schema.display());
                println!("Query: {}", cli.query.display());
                println!(
                    "Demand Transformation: {}",
                    if cli.demand { "Enabled" } else { "Disabled" }
                );
                println!();
            }
            println!("{program}");

            if let Some(rows) = transformations {
                println!();
                println!("{}", render_transformations(&rows));
            }
        }
    }

    Ok(())
}

fn render_transformations(rows: &[TransformationRow]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(Row::from(vec!["field", "adornment", "reason"]));
    for row in rows {
        table.add_row(Row::from(vec![
            row.field.as_str(),
            row.adornment.as_str(),
            row.reason.as_str(),
        ]));
    }
    table
}
