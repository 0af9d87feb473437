use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which part of a Thing Model a message is verified against.
///
/// Each category has its own policy: properties are lenient (unknown or
/// null fields are dropped), events and actions require every declared
/// parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParamCategory {
    /// Property snapshot.
    Property,
    /// Event report.
    Event,
    /// Action invocation parameters.
    ActionInput,
    /// Action reply parameters.
    ActionOutput,
}

impl ParamCategory {
    /// Returns the kebab-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamCategory::Property => "property",
            ParamCategory::Event => "event",
            ParamCategory::ActionInput => "action-input",
            ParamCategory::ActionOutput => "action-output",
        }
    }

    /// Returns true for the two action categories.
    pub fn is_action(&self) -> bool {
        matches!(self, ParamCategory::ActionInput | ParamCategory::ActionOutput)
    }
}

impl fmt::Display for ParamCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "property" => Ok(ParamCategory::Property),
            "event" => Ok(ParamCategory::Event),
            "action-input" => Ok(ParamCategory::ActionInput),
            "action-output" => Ok(ParamCategory::ActionOutput),
            other => Err(format!("unknown parameter category: {other}")),
        }
    }
}
