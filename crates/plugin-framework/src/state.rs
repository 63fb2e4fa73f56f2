//! Configuration and state values
//!
//! Both wrap the raw JSON object Terraform hands over. Typed access goes
//! through serde; conversion failures become diagnostics.

use crate::diagnostics::Diagnostics;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

const CONVERSION_SUMMARY: &str = "Value Conversion Error";

/// Configuration of one resource as written by the user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    raw: Value,
}

impl Config {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Decodes the whole configuration into `T`
    pub fn get<T: DeserializeOwned>(&self) -> Result<T, Diagnostics> {
        decode(&self.raw)
    }
}

/// Stored state of one resource; a null value means no state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    raw: Value,
}

impl State {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// No state (resource absent)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_null()
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }

    /// Decodes the whole state into `T`
    pub fn get<T: DeserializeOwned>(&self) -> Result<T, Diagnostics> {
        decode(&self.raw)
    }

    /// Replaces the state with the serialized form of `value`
    ///
    /// On failure the state is left as it was.
    pub fn set<T: Serialize>(&mut self, value: &T) -> Diagnostics {
        match serde_json::to_value(value) {
            Ok(raw) => {
                self.raw = raw;
                Diagnostics::new()
            }
            Err(e) => Diagnostics::from_error(
                CONVERSION_SUMMARY,
                format!("An unexpected error was encountered trying to set the state: {e}"),
            ),
        }
    }
}

fn decode<T: DeserializeOwned>(raw: &Value) -> Result<T, Diagnostics> {
    T::deserialize(raw).map_err(|e| {
        Diagnostics::from_error(
            CONVERSION_SUMMARY,
            format!("An unexpected error was encountered trying to convert the value: {e}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Model {
        id: Option<i64>,
        name: String,
    }

    #[test]
    fn test_config_get() {
        let config = Config::new(json!({ "id": null, "name": "db" }));
        let model: Model = config.get().expect("config decodes");
        assert_eq!(model, Model { id: None, name: "db".to_string() });
    }

    #[test]
    fn test_config_get_conversion_error() {
        let config = Config::new(json!({ "name": 5 }));
        let diagnostics = config.get::<Model>().expect_err("name is not a string");
        assert!(diagnostics.has_error());
        let summary = &diagnostics.iter().next().expect("one diagnostic").summary;
        assert_eq!(summary, CONVERSION_SUMMARY);
    }

    #[test]
    fn test_state_set() {
        let mut state = State::empty();
        assert!(state.is_empty());

        let diagnostics = state.set(&Model { id: Some(7), name: "db".to_string() });
        assert!(diagnostics.is_empty());
        assert_eq!(state.raw(), &json!({ "id": 7, "name": "db" }));
        assert!(!state.is_empty());
    }
}
