use crate::error::CliError;
use elaborator::{Elaboration, partition::PartitionBoundarySpec};
use statement::renderer::action::render_script;

pub fn render_elaboration(elaboration: &Elaboration, as_json: bool) -> Result<String, CliError> {
    if as_json {
        return serde_json::to_string_pretty(elaboration).map_err(CliError::JsonSerialize);
    }
    let mut script = render_script(&elaboration.actions);
    if !script.is_empty() {
        script.push('\n');
    }
    Ok(script)
}

pub fn render_partitions(spec: &PartitionBoundarySpec, as_json: bool) -> Result<String, CliError> {
    if as_json {
        return serde_json::to_string_pretty(spec).map_err(CliError::JsonSerialize);
    }
    let mut table = format!("{:<24} {}\n", "Partition", "Values less than");
    table.push_str(&format!("{}\n", "-".repeat(40)));
    for partition in &spec.partitions {
        let boundary = partition
            .boundary
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        table.push_str(&format!("{:<24} {}\n", partition.name, boundary));
    }
    Ok(table)
}

pub fn write_or_print(content: &str, output: Option<String>) -> Result<(), CliError> {
    match output {
        Some(path) => std::fs::write(path, content)?,
        None => print!("{content}"),
    }
    Ok(())
}
