use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `response` object of an API envelope, returned as-is.
pub type ApiResponse = Map<String, Value>;

/// Status block found at `response.msg`.
///
/// `err_code` is kept as the raw JSON value: the API is not consistent about
/// sending it as an integer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub err_code: Option<Value>,
    #[serde(rename = "type", default)]
    pub error_type: String,
    #[serde(default)]
    pub text: String,
}

impl ApiMessage {
    /// Read `msg` out of a response object. Missing or malformed fields
    /// become defaults.
    pub fn from_response(response: &ApiResponse) -> Self {
        let msg = match response.get("msg") {
            Some(Value::Object(msg)) => msg,
            _ => return Self::default(),
        };
        Self {
            err_code: msg.get("err_code").cloned(),
            error_type: string_field(msg, "type"),
            text: string_field(msg, "text"),
        }
    }

    /// True when `err_code` is present, not null and not zero.
    pub fn is_error(&self) -> bool {
        match &self.err_code {
            None | Some(Value::Null) => false,
            Some(Value::Number(n)) => n.as_f64() != Some(0.0),
            Some(Value::String(s)) => s.trim() != "0",
            Some(Value::Bool(b)) => *b,
            Some(_) => true,
        }
    }

    /// `err_code` as display text, e.g. `1` or `E42`. Empty when absent.
    pub fn code_text(&self) -> String {
        match &self.err_code {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

fn string_field(msg: &Map<String, Value>, key: &str) -> String {
    match msg.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Pull the `response` object out of a decoded envelope. Anything that is not
/// an object is treated as an empty response.
pub fn extract_response(envelope: Value) -> ApiResponse {
    match envelope {
        Value::Object(mut top) => match top.remove("response") {
            Some(Value::Object(response)) => response,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: Value) -> ApiResponse {
        extract_response(json!({ "response": value }))
    }

    #[test]
    fn success_message() {
        let msg = ApiMessage::from_response(&response(
            json!({"msg": {"err_code": 0, "type": "message", "text": "OK"}}),
        ));
        assert_eq!(msg.err_code, Some(json!(0)));
        assert!(!msg.is_error());
        assert_eq!(msg.text, "OK");
    }

    #[test]
    fn error_message() {
        let msg = ApiMessage::from_response(&response(
            json!({"msg": {"err_code": 4, "type": "error", "text": "bad list"}}),
        ));
        assert!(msg.is_error());
        assert_eq!(msg.code_text(), "4");
        assert_eq!(msg.error_type, "error");
        assert_eq!(msg.text, "bad list");
    }

    fn message_with_code(code: Value) -> ApiMessage {
        ApiMessage::from_response(&response(json!({"msg": {"err_code": code}})))
    }

    #[test]
    fn string_error_codes() {
        assert!(message_with_code(json!("2")).is_error());
        assert!(message_with_code(json!("E42")).is_error());
        assert_eq!(message_with_code(json!("E42")).code_text(), "E42");
        assert!(!message_with_code(json!("0")).is_error());
    }

    #[test]
    fn non_integer_numeric_codes() {
        assert!(message_with_code(json!(1.5)).is_error());
        assert_eq!(message_with_code(json!(1.5)).code_text(), "1.5");
        let huge = message_with_code(json!(u64::MAX));
        assert!(huge.is_error());
        assert_eq!(huge.code_text(), "18446744073709551615");
        assert!(!message_with_code(json!(0.0)).is_error());
    }

    #[test]
    fn null_code_is_not_an_error() {
        assert!(!message_with_code(Value::Null).is_error());
        assert_eq!(message_with_code(Value::Null).code_text(), "");
    }

    #[test]
    fn missing_msg_is_not_an_error() {
        let msg = ApiMessage::from_response(&response(json!({"data": []})));
        assert_eq!(msg, ApiMessage::default());
        assert!(!msg.is_error());
    }

    #[test]
    fn missing_response_becomes_empty() {
        assert!(extract_response(json!({"other": 1})).is_empty());
        assert!(extract_response(json!([1, 2, 3])).is_empty());
        assert!(extract_response(json!({"response": "nope"})).is_empty());
    }

    #[test]
    fn response_keeps_sibling_fields() {
        let resp = response(json!({"msg": {"err_code": 0}, "data": [{"id": 1}]}));
        assert_eq!(resp.get("data"), Some(&json!([{"id": 1}])));
    }
}
