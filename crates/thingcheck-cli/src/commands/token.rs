//! Token command implementation.

use thingcheck_msg::MsgTokenGenerator;

pub fn run(node_id: i64, count: u32) -> Result<(), Box<dyn std::error::Error>> {
    if count == 0 {
        return Err("count must be at least 1".into());
    }
    let generator = MsgTokenGenerator::new(node_id);
    for _ in 0..count {
        println!("{}", generator.next_token());
    }
    Ok(())
}
