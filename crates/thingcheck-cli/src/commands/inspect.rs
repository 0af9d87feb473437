//! Inspect command implementation.

use thingcheck_schema::PropertyMode;

use crate::input::load_model;
use crate::output::{format_definition_row, format_json, print_definition_header};

pub fn run(model: String, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let model = load_model(&model)?;

    if json {
        println!("{}", format_json(&model));
        return Ok(());
    }

    print_definition_header();
    for property in model.properties() {
        let mode = match property.mode {
            PropertyMode::R => "r",
            PropertyMode::Rw => "rw",
        };
        println!(
            "{}",
            format_definition_row(
                "property",
                property.identifier.as_str(),
                property.define.data_type().as_str(),
                mode,
                &property.name,
            )
        );
    }
    for event in model.events() {
        println!(
            "{}",
            format_definition_row(
                "event",
                event.identifier.as_str(),
                event.event_type.as_str(),
                "-",
                &format!("{} ({} params)", event.name, event.params.len()),
            )
        );
    }
    for action in model.actions() {
        println!(
            "{}",
            format_definition_row(
                "action",
                action.identifier.as_str(),
                "-",
                "-",
                &format!(
                    "{} ({} in, {} out)",
                    action.name,
                    action.input.len(),
                    action.output.len()
                ),
            )
        );
    }
    Ok(())
}
