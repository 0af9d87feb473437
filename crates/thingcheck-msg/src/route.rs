use thingcheck_schema::ParamCategory;

/// Handle of thing model messages.
pub const HANDLE_THING: &str = "thing";

/// Picks the parameter category an envelope is verified against.
///
/// `msg_type` is the envelope type and `method` the request method from the
/// payload. Returns `None` for anything that is not a verifiable thing
/// message (other handles, or thing messages such as `getReport` replies).
pub fn route(handle: &str, msg_type: &str, method: &str) -> Option<ParamCategory> {
    if handle != HANDLE_THING {
        return None;
    }
    match (msg_type, method) {
        ("property", _) => Some(ParamCategory::Property),
        ("event", _) => Some(ParamCategory::Event),
        ("action", "action") => Some(ParamCategory::ActionInput),
        ("action", "actionReply") => Some(ParamCategory::ActionOutput),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_thing_messages() {
        assert_eq!(route("thing", "property", "report"), Some(ParamCategory::Property));
        assert_eq!(route("thing", "event", "eventPost"), Some(ParamCategory::Event));
        assert_eq!(route("thing", "action", "action"), Some(ParamCategory::ActionInput));
        assert_eq!(
            route("thing", "action", "actionReply"),
            Some(ParamCategory::ActionOutput)
        );
    }

    #[test]
    fn other_handles_are_not_routed() {
        assert_eq!(route("ota", "property", "report"), None);
        assert_eq!(route("thing", "action", "control"), None);
        assert_eq!(route("thing", "gateway", "topo"), None);
    }
}
