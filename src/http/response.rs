//! Response Envelopes
//!
//! Every success body carries `status: "success"`; list bodies add a
//! `results` count; auth bodies add the freshly signed `token`.

use axum::Json;
use serde_json::{json, Value};

/// `{"status": "success", "data": {<key>: <value>}}`
pub fn success(key: &str, value: Value) -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": { key: value },
    }))
}

/// `{"status": "success", "results": n, "data": {<key>: [..]}}`
pub fn success_list(key: &str, items: Vec<Value>) -> Json<Value> {
    Json(json!({
        "status": "success",
        "results": items.len(),
        "data": { key: items },
    }))
}

/// `{"status": "success", "token": .., "data": {"user": ..}}`
pub fn success_with_token(token: &str, user: Value) -> Json<Value> {
    Json(json!({
        "status": "success",
        "token": token,
        "data": { "user": user },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_wraps_under_data_key() {
        let Json(body) = success("tour", json!({"name": "Forest Hiker"}));
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["tour"]["name"], "Forest Hiker");
    }

    #[test]
    fn list_carries_result_count() {
        let Json(body) = success_list("tours", vec![json!({"a": 1}), json!({"b": 2})]);
        assert_eq!(body["results"], 2);
        assert_eq!(body["data"]["tours"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn token_sits_beside_data() {
        let Json(body) = success_with_token("jwt-here", json!({"name": "Alice"}));
        assert_eq!(body["token"], "jwt-here");
        assert_eq!(body["data"]["user"]["name"], "Alice");
    }
}
