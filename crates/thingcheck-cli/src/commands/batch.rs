//! Batch command implementation.

use chrono::DateTime;
use thingcheck_core::{TimeParam, Validator};
use thingcheck_msg::Req;

use crate::input::{load_model, load_options, read_json};
use crate::output::{format_json, format_param_row, print_param_header};
use crate::OptionArgs;

pub fn run(
    model: String,
    input: Option<String>,
    json: bool,
    options: OptionArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let model = load_model(&model)?;
    let options = load_options(&options)?;
    let req: Req = read_json(input.as_deref())?;

    if !req.sub_devices.is_empty() {
        // Sub-devices belong to other products and need their own models.
        tracing::info!(count = req.sub_devices.len(), "skipping sub-device reports");
    }

    let report = req.verify_batch_with(Validator::new(&model, options))?;

    if json {
        println!("{}", format_json(&report));
        return Ok(());
    }

    for entry in report.properties.iter().chain(report.events.iter()) {
        print_snapshot(entry);
    }
    println!(
        "{} property and {} event snapshots verified",
        report.properties.len(),
        report.events.len()
    );
    Ok(())
}

fn print_snapshot(entry: &TimeParam) {
    let at = DateTime::from_timestamp_millis(entry.timestamp)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| entry.timestamp.to_string());
    match entry.event_type {
        Some(event_type) => println!("{} event {} ({})", at, entry.event_id, event_type),
        None => println!("{} property", at),
    }
    print_param_header();
    for param in entry.params.values() {
        println!("{}", format_param_row(param));
    }
    println!();
}
