use crate::error::CliError;
use clap::Parser;
use commands::Commands;
use elaborator::{
    Elaborator,
    catalog::MemoryCatalog,
    notice::Notices,
    partition::{PartitionBoundarySpec, PartitionKey, StartEndRequest, resolve_start_end},
    settings::{ElaborateRequest, ElaborateSettings},
};
use model::core::{boundary::BoundaryValue, data_type::DataType, value::Value};
use statement::ast::{Statement, partition::StartEndDef};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

#[derive(Parser)]
#[command(name = "ddlx", version = "0.1.0", about = "Table DDL elaborator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<(), CliError> {
    // Logs go to stderr so the script on stdout stays clean
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Elaborate {
            stmt,
            catalog,
            settings,
            query,
            json,
            output,
        } => {
            info!(
                "Elaborating statement: {}, catalog: {}, settings: {:?}",
                stmt, catalog, settings
            );
            let statement: Statement = serde_json::from_str(&std::fs::read_to_string(&stmt)?)?;
            let catalog = MemoryCatalog::from_json(&std::fs::read_to_string(&catalog)?)?;
            let settings = load_settings(settings.as_deref())?;
            let request = ElaborateRequest::new(query.unwrap_or_default());

            let elaboration = Elaborator::new(&catalog, settings)
                .elaborate(&statement, &request)
                .inspect_err(|err| {
                    if let Some(detail) = err.detail() {
                        error!("DETAIL: {detail}");
                    }
                    if let Some(hint) = err.hint() {
                        error!("HINT: {hint}");
                    }
                })?;

            let rendered = output::render_elaboration(&elaboration, json)?;
            output::write_or_print(&rendered, output)?;
        }
        Commands::Split {
            name,
            key_type,
            start,
            end,
            every,
            json,
        } => {
            let spec = preview_split(&name, &key_type, start, end, every)?;
            let rendered = output::render_partitions(&spec, json)?;
            output::write_or_print(&rendered, None)?;
        }
    }

    Ok(())
}

fn load_settings(path: Option<&str>) -> Result<ElaborateSettings, CliError> {
    match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&source)?)
        }
        None => Ok(ElaborateSettings::default()),
    }
}

fn preview_split(
    name: &str,
    key_type: &str,
    start: Option<String>,
    end: Option<String>,
    every: Option<String>,
) -> Result<PartitionBoundarySpec, CliError> {
    let data_type = DataType::from_name(key_type);
    let keys = [PartitionKey::new("key", data_type)];

    let mut def = StartEndDef::new(name);
    if let Some(start) = start {
        def = def.start(parse_operand(&start)?);
    }
    if let Some(end) = end {
        def = def.end(parse_operand(&end)?);
    }
    if let Some(every) = every {
        def = def.every(parse_operand(&every)?);
    }

    let definitions = [def];
    let settings = ElaborateSettings::default();
    let mut notices = Notices::new();
    let spec = resolve_start_end(
        &StartEndRequest::new(&keys, &definitions),
        &settings,
        &mut notices,
    )?;
    Ok(spec)
}

/// Integers stay integers, decimals become numerics, and anything else
/// (dates, timestamps, intervals) is left as a literal for the key type cast.
fn parse_operand(text: &str) -> Result<BoundaryValue, CliError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CliError::InvalidOperand("empty value".to_string()));
    }
    if text.eq_ignore_ascii_case("maxvalue") {
        return Ok(BoundaryValue::MaxValue);
    }
    if text.eq_ignore_ascii_case("minvalue") {
        return Ok(BoundaryValue::MinValue);
    }
    if let Ok(int) = text.parse::<i64>() {
        return Ok(Value::int(int).into());
    }
    if text.parse::<f64>().is_ok()
        && let Some(numeric) = Value::numeric(text)
    {
        return Ok(numeric.into());
    }
    Ok(Value::text(text).into())
}
