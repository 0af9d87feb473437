//! Ingest command implementation.

use thingcheck_core::Validator;
use thingcheck_msg::{route, DevConn, GatewayMsg, MsgError, Req};

use crate::input::{load_model, load_options, read_json};
use crate::output::format_json;
use crate::OptionArgs;

pub fn run(
    model: String,
    input: Option<String>,
    options: OptionArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let model = load_model(&model)?;
    let options = load_options(&options)?;
    let publish = match read_json::<GatewayMsg>(input.as_deref())? {
        GatewayMsg::Publish(publish) => publish,
        GatewayMsg::Conn(conn) => return report_conn(&conn),
    };
    let (product, device) = publish.sender()?;
    tracing::info!(%product, %device, %publish, "ingesting");

    let mut req = Req::from_payload(&publish.payload)?;
    let category = route(&publish.handle, &publish.msg_type, &req.common.method).ok_or_else(|| {
        MsgError::Unroutable {
            handle: publish.handle.clone(),
            msg_type: publish.msg_type.clone(),
            method: req.common.method.clone(),
        }
    })?;

    let received = req.timestamp_or(publish.timestamp);
    tracing::info!(%category, at = %received.to_rfc3339(), "routed");

    match req.fmt_params_with(Validator::new(&model, options), category) {
        Ok(()) => {
            println!("{}", format_json(&req));
            Ok(())
        }
        Err(err) => {
            let reply = req.with_status(&err);
            println!("{}", format_json(&reply));
            Err(err.into())
        }
    }
}

fn report_conn(conn: &DevConn) -> Result<(), Box<dyn std::error::Error>> {
    let (product, device) = conn.sender()?;
    tracing::info!(%product, %device, action = %conn.action, reason = %conn.reason, "connection state");
    println!("{}", format_json(conn));
    Ok(())
}
