pub mod competition;
pub mod entry;
pub mod image;
pub mod team;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>> {
    rows.into_iter()
        .map(|row| -> Result<T> { Ok(serde_json::from_value(row)?) })
        .collect()
}
