use crate::error::HelperResult;
use crate::query::HydratedRow;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt::{Display, Formatter};

/// What an assertion looks for in a result set.
#[derive(Debug, Clone, PartialEq)]
pub enum Expected {
    /// Substring searched in the serialized result set.
    Text(String),
    /// Row shape: every key must be present and loosely equal in one row.
    Row(HydratedRow),
}

impl Expected {
    /// Builds an expectation from any serializable value.
    ///
    /// Structs and maps become [`Expected::Row`]; strings become
    /// [`Expected::Text`].
    pub fn from_serialize<T: Serialize>(value: &T) -> HelperResult<Self> {
        Ok(Self::from(serde_json::to_value(value)?))
    }
}

impl From<&str> for Expected {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Expected {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<HydratedRow> for Expected {
    fn from(value: HydratedRow) -> Self {
        Self::Row(value)
    }
}

impl From<JsonValue> for Expected {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Object(row) => Self::Row(row),
            JsonValue::String(text) => Self::Text(text),
            other => Self::Text(other.to_string()),
        }
    }
}

impl Display for Expected {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => write!(f, "`{text}`"),
            Self::Row(row) => write!(f, "{}", JsonValue::Object(row.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Expected;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Serialize)]
    struct Shape {
        email: &'static str,
        age: u8,
    }

    #[test]
    fn json_values_pick_the_matching_variant() {
        assert!(matches!(Expected::from(json!({"a": 1})), Expected::Row(_)));
        assert_eq!(Expected::from(json!("abc")), Expected::Text("abc".to_string()));
        assert_eq!(Expected::from(json!(42)), Expected::Text("42".to_string()));
    }

    #[test]
    fn serializable_structs_become_rows() {
        let expected = Expected::from_serialize(&Shape {
            email: "a@example.com",
            age: 30,
        })
        .unwrap();

        match expected {
            Expected::Row(row) => {
                assert_eq!(row["email"], json!("a@example.com"));
                assert_eq!(row["age"], json!(30));
            }
            other => panic!("unexpected expectation: {other}"),
        }
    }
}
