//! `deserialize_with` helpers for string-valued configuration.

use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Deserializer};

/// A list setting: the raw value must be a JSON array whose items have the
/// element type. `1,2`, `5` and the empty string are all rejected.
pub fn json_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = String::deserialize(deserializer)?;
    serde_json::from_str(raw.trim())
        .map_err(|e| D::Error::custom(format!("expected a JSON array: {e}")))
}

/// `1/0`, `true/false`, `t/f`, `yes/no`, `y/n`, `on/off`, in any case.
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        _ => Err(D::Error::custom(format!(
            "expected a boolean (true/false, 1/0, yes/no, on/off), got '{raw}'"
        ))),
    }
}
