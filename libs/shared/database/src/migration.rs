use reqwest::Method;
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::error::DatabaseError;
use crate::firestore::FirestoreClient;
use crate::supabase::SupabaseClient;

/// Firestore accepts up to 500 writes per commit; stay well below it.
pub const BATCH_SIZE: usize = 400;

const SOURCES: [(&str, &str); 3] = [
    ("dentists", "/rest/v1/users?role=eq.DENTIST&order=id.asc"),
    ("patients", "/rest/v1/users?role=eq.PATIENT&select=*,address:addresses(*)&order=id.asc"),
    ("appointments", "/rest/v1/appointments?order=id.asc"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub collection: String,
    pub documents: usize,
    pub batches: usize,
}

/// One-shot export of clinic records into Firestore collections.
pub struct FirestoreMigration {
    supabase: SupabaseClient,
    firestore: FirestoreClient,
    batch_size: usize,
}

impl FirestoreMigration {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            firestore: FirestoreClient::new(config),
            batch_size: BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub async fn run(&self) -> Result<Vec<MigrationReport>, DatabaseError> {
        info!("Starting Firestore migration");

        let mut reports = Vec::with_capacity(SOURCES.len());
        for (collection, path) in SOURCES {
            let rows: Vec<Value> = self.supabase.request(Method::GET, path, None).await?;
            let report = self.migrate_collection(collection, rows).await?;
            info!(
                "Collection '{}' -> {} documents migrated in {} batches",
                report.collection, report.documents, report.batches
            );
            reports.push(report);
        }

        info!("Firestore migration finished");
        Ok(reports)
    }

    pub async fn migrate_collection(&self, collection: &str, rows: Vec<Value>) -> Result<MigrationReport, DatabaseError> {
        let documents: Vec<(String, Map<String, Value>)> = rows
            .into_iter()
            .filter_map(|row| {
                let document = sanitize_document(row);
                if document.is_none() {
                    warn!("Skipping non-object row in '{}'", collection);
                }
                document
            })
            .collect();

        let mut batches = 0;
        for chunk in documents.chunks(self.batch_size) {
            let writes = chunk
                .iter()
                .map(|(id, data)| self.firestore.upsert_write(collection, id, data))
                .collect();
            self.firestore.commit(writes).await?;
            batches += 1;
        }

        Ok(MigrationReport {
            collection: collection.to_string(),
            documents: documents.len(),
            batches,
        })
    }
}

/// Strips credentials and nested collections, and resolves the document id.
/// Rows without an id get a generated one.
pub fn sanitize_document(row: Value) -> Option<(String, Map<String, Value>)> {
    let Value::Object(mut data) = row else {
        return None;
    };

    let id = match data.get("id") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => Uuid::new_v4().to_string(),
    };

    sanitize_map(&mut data);
    Some((id, data))
}

fn sanitize_map(data: &mut Map<String, Value>) {
    data.remove("password");
    data.retain(|_, value| !value.is_array());
    for value in data.values_mut() {
        if let Value::Object(nested) = value {
            sanitize_map(nested);
        }
    }
}
