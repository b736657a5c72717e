//! Row type for query results.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::AppError;

/// A single row from a query result.
///
/// Contains column values as JSON, with typed extraction via [`Row::get`].
#[derive(Debug, Clone)]
pub struct Row {
    data: HashMap<String, JsonValue>,
}

impl Row {
    /// Creates a new row from a map of column names to values.
    pub fn new(data: HashMap<String, JsonValue>) -> Self {
        Self { data }
    }

    /// Gets a value from the row by column name, deserializing to the requested type.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not found or if deserialization fails.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, AppError> {
        self.data
            .get(key)
            .ok_or_else(|| AppError::Db(format!("column not found: {}", key)))
            .and_then(|v| {
                serde_json::from_value(v.clone())
                    .map_err(|e| AppError::Db(format!("failed to deserialize '{}': {}", key, e)))
            })
    }

    /// Gets a value from the row, returning `None` if the key doesn't exist
    /// or holds SQL NULL.
    ///
    /// Still returns an error if the key exists but deserialization fails.
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.data.get(key) {
            Some(v) if v.is_null() => Ok(None),
            Some(v) => serde_json::from_value(v.clone())
                .map(Some)
                .map_err(|e| AppError::Db(format!("failed to deserialize '{}': {}", key, e))),
            None => Ok(None),
        }
    }
}

impl From<HashMap<String, JsonValue>> for Row {
    fn from(data: HashMap<String, JsonValue>) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_get_string() {
        let mut data = HashMap::new();
        data.insert("version".to_string(), json!("2.1.8.0"));
        let row = Row::new(data);

        let version: String = row.get("version").unwrap();
        assert_eq!(version, "2.1.8.0");
    }

    #[test]
    fn test_row_get_number() {
        let mut data = HashMap::new();
        data.insert("count".to_string(), json!(42));
        let row = Row::new(data);

        let count: i64 = row.get("count").unwrap();
        assert_eq!(count, 42);
    }

    #[test]
    fn test_row_get_missing_key() {
        let row = Row::new(HashMap::new());
        let result: Result<String, _> = row.get("missing");
        assert!(result.is_err());
    }

    #[test]
    fn test_row_get_opt_null() {
        let mut data = HashMap::new();
        data.insert("step_id".to_string(), JsonValue::Null);
        let row = Row::new(data);

        let step_id: Option<String> = row.get_opt("step_id").unwrap();
        assert_eq!(step_id, None);
    }
}
