//! Process-wide relation settings, kept in the option store

use crate::error::{RelatedError, Result};
use crate::store::OptionStore;
use serde::Serialize;
use serde_json::Value;

pub const EMPTY_BEHAVIOR_OPTION: &str = "crpr_empty_behavior";
pub const RECIPROCATE_OPTION: &str = "crpr_reciprocate";

/// What to show for an entity with no curated relations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyBehavior {
    /// Fall back to the host's category/tag similarity
    #[default]
    Fallback,
    /// Show no related products at all
    None,
}

impl EmptyBehavior {
    /// Parse a submitted form value; the empty string selects the default
    pub fn from_form(value: &str) -> Result<Self> {
        match value {
            "" => Ok(Self::Fallback),
            "none" => Ok(Self::None),
            other => Err(RelatedError::InvalidOption {
                option: EMPTY_BEHAVIOR_OPTION.to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// Stored option value; `None` means the option is deleted
    pub fn option_value(self) -> Option<&'static str> {
        match self {
            Self::Fallback => Option::None,
            Self::None => Some("none"),
        }
    }
}

/// Relation settings, passed explicitly into every decision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub empty_behavior: EmptyBehavior,
    pub reciprocate: bool,
}

impl Settings {
    /// Read settings; missing options mean defaults
    pub fn load<S: OptionStore + ?Sized>(options: &S) -> Result<Self> {
        let empty_behavior = match options.get_option(EMPTY_BEHAVIOR_OPTION)? {
            Some(Value::String(s)) if s == "none" => EmptyBehavior::None,
            _ => EmptyBehavior::Fallback,
        };

        let reciprocate = options
            .get_option(RECIPROCATE_OPTION)?
            .is_some_and(|v| is_truthy(&v));

        Ok(Self {
            empty_behavior,
            reciprocate,
        })
    }

    /// Persist settings, deleting options that hold their default value
    pub fn save<S: OptionStore + ?Sized>(&self, options: &mut S) -> Result<()> {
        match self.empty_behavior.option_value() {
            Some(value) => options.update_option(EMPTY_BEHAVIOR_OPTION, &Value::from(value))?,
            None => options.delete_option(EMPTY_BEHAVIOR_OPTION)?,
        }

        if self.reciprocate {
            options.update_option(RECIPROCATE_OPTION, &Value::Bool(true))?;
        } else {
            options.delete_option(RECIPROCATE_OPTION)?;
        }

        Ok(())
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
