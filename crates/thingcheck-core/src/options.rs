use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What happens to property fields the schema does not declare.
///
/// Output is the same either way: undeclared fields never reach the
/// verified mapping. Only the log level of the skip changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Drop silently (logged at debug).
    #[default]
    Drop,
    /// Drop and log a warning.
    Warn,
}

impl FromStr for UnknownFieldPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drop" => Ok(UnknownFieldPolicy::Drop),
            "warn" => Ok(UnknownFieldPolicy::Warn),
            other => Err(format!("unknown field policy: {other} (expected drop|warn)")),
        }
    }
}

/// Which declared list drives action-output verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionOutputParams {
    /// The action's input list, as deployed devices have always been checked.
    #[default]
    Input,
    /// The action's output list.
    Output,
}

impl FromStr for ActionOutputParams {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(ActionOutputParams::Input),
            "output" => Ok(ActionOutputParams::Output),
            other => Err(format!(
                "unknown action output params: {other} (expected input|output)"
            )),
        }
    }
}

/// Options tuning a [`Validator`](crate::Validator).
///
/// Deserializes from `{"unknownFields": "warn", "actionOutputParams": "output"}`;
/// missing keys take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VerifyOptions {
    /// Handling of undeclared property fields.
    pub unknown_fields: UnknownFieldPolicy,
    /// List driving action-output verification.
    pub action_output_params: ActionOutputParams,
}

impl VerifyOptions {
    /// Sets the unknown field policy.
    pub fn with_unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }

    /// Sets the list driving action-output verification.
    pub fn with_action_output_params(mut self, params: ActionOutputParams) -> Self {
        self.action_output_params = params;
        self
    }
}
