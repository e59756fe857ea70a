/// Response envelope
///
/// Every JSON body this service emits, success or failure, has the same
/// two-field shape:
///
/// ```json
/// { "message": "OK", "data": ... }
/// ```

use serde::{Deserialize, Serialize};

/// The `{ message, data }` body wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub message: String,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }

    /// Envelope with the plain success message used by read endpoints
    pub fn ok(data: T) -> Self {
        Self::new("OK", data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shape() {
        let envelope = Envelope::ok(json!([1, 2]));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value, json!({"message": "OK", "data": [1, 2]}));
    }
}
