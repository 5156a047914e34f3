use axum::Json;
use serde::{Deserialize, Serialize};

/// Body of every JSON response: `error` is null on success, `result`
/// holds zero or more records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub error: Option<String>,
    pub result: Vec<T>,
}

impl<T> Envelope<T> {
    pub fn ok(result: Vec<T>) -> Json<Self> {
        Json(Self {
            error: None,
            result,
        })
    }

    pub fn one(item: T) -> Json<Self> {
        Self::ok(vec![item])
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            result: Vec::new(),
        }
    }
}

impl Envelope<()> {
    /// A success with nothing to return.
    pub fn empty() -> Json<Self> {
        Self::ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_has_null_error() {
        let Json(body) = Envelope::one(5u32);
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({ "error": null, "result": [5] })
        );
    }

    #[test]
    fn failure_has_empty_result() {
        let body = Envelope::<()>::error("nope");
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({ "error": "nope", "result": [] })
        );
    }
}
