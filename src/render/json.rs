use serde::Serialize;

use crate::error::OrangeBookError;

pub fn to_pretty<T: Serialize>(value: &T) -> Result<String, OrangeBookError> {
    Ok(serde_json::to_string_pretty(value)?)
}
