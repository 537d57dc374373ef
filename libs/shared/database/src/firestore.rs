use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde_json::{json, Map, Value};
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::error::DatabaseError;

/// Minimal client for the Firestore REST `documents:commit` endpoint.
pub struct FirestoreClient {
    client: Client,
    base_url: String,
    project_id: String,
    access_token: String,
}

impl FirestoreClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.firestore_base_url.trim_end_matches('/').to_string(),
            project_id: config.firestore_project_id.clone(),
            access_token: config.firestore_access_token.clone(),
        }
    }

    pub fn documents_root(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    /// Upsert of one document; the update mask limits the write to the given
    /// fields so existing remote fields survive.
    pub fn upsert_write(&self, collection: &str, document_id: &str, data: &Map<String, Value>) -> Value {
        let field_paths: Vec<&String> = data.keys().collect();
        json!({
            "update": {
                "name": format!("{}/{}/{}", self.documents_root(), collection, document_id),
                "fields": to_firestore_fields(data),
            },
            "updateMask": { "fieldPaths": field_paths },
        })
    }

    pub async fn commit(&self, writes: Vec<Value>) -> Result<(), DatabaseError> {
        let url = format!("{}/{}:commit", self.base_url, self.documents_root());
        debug!("Committing {} writes to {}", writes.len(), url);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.access_token))?,
        );

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&json!({ "writes": writes }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Firestore commit failed ({}): {}", status, error_text);
            return Err(DatabaseError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        Ok(())
    }
}

pub fn to_firestore_fields(data: &Map<String, Value>) -> Value {
    let fields: Map<String, Value> = data
        .iter()
        .map(|(key, value)| (key.clone(), to_firestore_value(value)))
        .collect();
    Value::Object(fields)
}

/// Converts plain JSON into Firestore's typed value representation.
pub fn to_firestore_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // integerValue is transported as a string
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(to_firestore_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": to_firestore_fields(map) } }),
    }
}
