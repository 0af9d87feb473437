use serde_json::json;
use thingcheck_core::{ActionOutputParams, ErrorCode, ParamValue, Validator, VerifyOptions};
use thingcheck_msg::{get_publish, publish_to_dev, route, DevPublish, MsgError, Req};
use thingcheck_schema::{Model, ParamCategory};

fn make_model() -> Model {
    let doc = json!({
        "properties": [
            { "identifier": "target", "dataType": { "type": "int", "min": 5, "max": 30 } },
            { "identifier": "power", "dataType": { "type": "bool" } }
        ],
        "events": [
            {
                "identifier": "overheat",
                "type": "alert",
                "params": [ { "identifier": "temperature", "dataType": { "type": "float" } } ]
            }
        ],
        "actions": [
            {
                "identifier": "move",
                "input": [ { "identifier": "speed", "dataType": { "type": "int" } } ],
                "output": [ { "identifier": "ok", "dataType": { "type": "bool" } } ]
            }
        ]
    });
    Model::from_json(&doc.to_string()).unwrap()
}

fn make_publish(msg_type: &str, payload: serde_json::Value) -> DevPublish {
    DevPublish {
        topic: format!("$thing/up/{msg_type}/p1/d1"),
        timestamp: 1_700_000_000_000,
        product_id: "p1".to_string(),
        device_name: "d1".to_string(),
        handle: "thing".to_string(),
        msg_type: msg_type.to_string(),
        payload: serde_json::to_vec(&payload).unwrap(),
        protocol_code: "iThings".to_string(),
    }
}

#[test]
fn property_report_is_normalized() {
    let model = make_model();
    let publish = make_publish(
        "property",
        json!({
            "method": "report",
            "msgToken": "0011a",
            "params": { "target": "21", "power": 1, "firmware": "1.2.0" }
        }),
    );

    let mut req = Req::from_payload(&publish.payload).unwrap();
    let category = route(&publish.handle, &publish.msg_type, &req.common.method).unwrap();
    assert_eq!(category, ParamCategory::Property);

    req.fmt_params(&model, category).unwrap();
    assert_eq!(req.params["target"], json!(21));
    assert_eq!(req.params["power"], json!(true));
    assert!(!req.params.contains_key("firmware"));
}

#[test]
fn event_post_fills_in_declared_type() {
    let model = make_model();
    let mut req = Req::from_payload(
        json!({
            "method": "eventPost",
            "eventID": "overheat",
            "params": { "temperature": 98 }
        })
        .to_string()
        .as_bytes(),
    )
    .unwrap();

    req.fmt_params(&model, ParamCategory::Event).unwrap();
    assert_eq!(req.msg_type, "alert");
    assert_eq!(req.params["temperature"], json!(98.0));
}

#[test]
fn failed_verification_leaves_request_untouched_and_stamps_status() {
    let model = make_model();
    let payload = json!({ "method": "report", "msgToken": "t1", "params": { "target": 99 } });
    let mut req = Req::from_payload(payload.to_string().as_bytes()).unwrap();
    let before = req.clone();

    let err = req.fmt_params(&model, ParamCategory::Property).unwrap_err();
    assert_eq!(req, before);
    assert!(err.is(ErrorCode::InvalidParameter));

    let reply = req.with_status(&err);
    assert_eq!(reply.common.code, Some(ErrorCode::InvalidParameter.code()));
    assert!(reply.common.msg.contains("target"));

    let value = serde_json::to_value(&reply).unwrap();
    assert_eq!(value["code"], 100006);
    assert_eq!(value["msgToken"], "t1");
}

#[test]
fn action_reply_respects_validator_options() {
    let model = make_model();
    let req = Req::from_payload(
        json!({ "method": "actionReply", "actionID": "move", "params": { "ok": true } })
            .to_string()
            .as_bytes(),
    )
    .unwrap();
    let category = route("thing", "action", &req.common.method).unwrap();
    assert_eq!(category, ParamCategory::ActionOutput);

    assert!(req.verify_params(&model, category).is_err());

    let validator = Validator::new(
        &model,
        VerifyOptions::default().with_action_output_params(ActionOutputParams::Output),
    );
    let verified = req.verify_params_with(validator, category).unwrap();
    assert_eq!(verified.get("ok").unwrap().value, ParamValue::Bool(true));
}

#[test]
fn batched_report_verifies_properties_and_events() {
    let model = make_model();
    let req: Req = serde_json::from_value(json!({
        "method": "packReport",
        "properties": [
            { "timestamp": 1, "params": { "target": 10 } },
            { "timestamp": 2, "params": { "target": 11 } }
        ],
        "events": [
            { "timestamp": 3, "eventID": "overheat", "params": { "temperature": 80 } }
        ],
        "subDevices": [
            {
                "productID": "p2",
                "deviceName": "child",
                "properties": [ { "timestamp": 4, "params": { "target": 3 } } ],
                "events": []
            }
        ]
    }))
    .unwrap();

    let report = req.verify_batch(&model).unwrap();
    assert_eq!(report.properties.len(), 2);
    assert_eq!(report.properties[1].timestamp, 2);
    assert_eq!(report.events[0].event_id, "overheat");

    let err = req.sub_devices[0].verify(&model).unwrap_err();
    assert!(err.is(ErrorCode::InvalidParameter));
}

#[test]
fn timestamp_falls_back_to_default() {
    let mut req = Req::default();
    assert_eq!(req.timestamp_or(1_000).timestamp_millis(), 1_000);
    req.common.timestamp = 2_000;
    assert_eq!(req.timestamp_or(1_000).timestamp_millis(), 2_000);
}

#[test]
fn inner_publish_round_trips_through_bytes() {
    let payload = json!({ "method": "action", "actionID": "move", "params": { "speed": 3 } });
    let bytes = publish_to_dev(
        "thing",
        "action",
        payload.to_string().as_bytes(),
        "iThings",
        "p1",
        "d1",
    )
    .unwrap();
    let publish = get_publish(&bytes).unwrap();
    assert_eq!(publish.device_name, "d1");

    let req = Req::from_payload(&publish.payload).unwrap();
    assert_eq!(req.action_id, "move");
}

#[test]
fn malformed_payload_maps_to_parameter_error() {
    let err = Req::from_payload(b"{not json").unwrap_err();
    assert!(matches!(err, MsgError::Json(_)));
    let code_err: thingcheck_core::CodeError = err.into();
    assert!(code_err.is(ErrorCode::Parameter));
}
