//! Verify command implementation.

use thingcheck_core::Validator;
use thingcheck_msg::Req;
use thingcheck_schema::ParamCategory;

use crate::input::{load_model, load_options, read_json};
use crate::output::{format_json, format_param_row, print_param_header};
use crate::OptionArgs;

pub fn run(
    model: String,
    category: ParamCategory,
    input: Option<String>,
    json: bool,
    options: OptionArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let model = load_model(&model)?;
    let options = load_options(&options)?;
    let req: Req = read_json(input.as_deref())?;

    let verified = req.verify_params_with(Validator::new(&model, options), category)?;

    if json {
        println!("{}", format_json(&verified));
        return Ok(());
    }

    if let Some(event_type) = verified.event_type {
        println!("type: {}", event_type);
    }
    print_param_header();
    for param in verified.params.values() {
        println!("{}", format_param_row(param));
    }
    println!("\n{} of {} fields verified", verified.len(), req.params.len());
    Ok(())
}
