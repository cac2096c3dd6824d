use axum::http::{header, Method};
use axum::routing::{get, options};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::airtable::{AirtableClient, AirtableRecord, SelectOptions};
use crate::config::Config;
use crate::error::Error;

pub const RECORDS_PATH: &str = "/api/airtable";

/// Builds the app router. With CORS enabled every response carries the
/// permissive headers and a preflight route exists; disabled, neither does.
pub fn router(cors_enabled: bool) -> Router {
    let router = Router::new()
        .route(RECORDS_PATH, get(fetch_records))
        .route("/health", get(health));

    if cors_enabled {
        router
            .route(RECORDS_PATH, options(preflight))
            .layer(cors_layer())
    } else {
        router
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[derive(Serialize, Debug, Clone)]
pub struct RecordsEnvelope {
    pub success: bool,
    pub records: Vec<RecordSummary>,
    pub count: usize,
}

/// The flattened shape served to callers. `created_time` is the value of
/// the field literally named "Created", not Airtable's system timestamp,
/// so it is null for tables without such a field.
#[derive(Serialize, Debug, Clone)]
pub struct RecordSummary {
    pub id: String,
    pub fields: Map<String, Value>,
    #[serde(rename = "createdTime")]
    pub created_time: Value,
}

impl From<AirtableRecord> for RecordSummary {
    fn from(record: AirtableRecord) -> Self {
        let created_time = record.fields.get("Created").cloned().unwrap_or(Value::Null);
        Self {
            id: record.id,
            fields: record.fields,
            created_time,
        }
    }
}

async fn fetch_records() -> Result<Json<RecordsEnvelope>, Error> {
    let config = Config::from_env()?;
    let client = AirtableClient::new(&config);

    let records = client
        .first_page(&config.base_id, &config.table_id, &SelectOptions::default())
        .await?;

    let records: Vec<RecordSummary> = records.into_iter().map(RecordSummary::from).collect();
    tracing::info!("fetched {} records from table {}", records.len(), config.table_id);

    let count = records.len();
    Ok(Json(RecordsEnvelope {
        success: true,
        records,
        count,
    }))
}

// Browser preflights are answered by the CORS layer; this covers a bare
// OPTIONS probe with an empty JSON body.
async fn preflight() -> Json<Value> {
    Json(json!({}))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, fields: Value) -> AirtableRecord {
        AirtableRecord {
            id: id.to_string(),
            fields: fields.as_object().cloned().unwrap_or_default(),
            created_time: Some("2024-01-01T09:00:00.000Z".to_string()),
        }
    }

    #[test]
    fn summary_reads_the_created_field() {
        let summary = RecordSummary::from(record(
            "rec1",
            json!({ "Name": "A", "Created": "2024-01-01" }),
        ));
        assert_eq!(summary.id, "rec1");
        assert_eq!(summary.created_time, json!("2024-01-01"));
    }

    #[test]
    fn summary_without_created_field_is_null() {
        let summary = RecordSummary::from(record("rec2", json!({ "Name": "B" })));
        assert_eq!(summary.created_time, Value::Null);
    }

    #[test]
    fn envelope_serializes_expected_shape() {
        let envelope = RecordsEnvelope {
            success: true,
            records: vec![RecordSummary::from(record(
                "rec1",
                json!({ "Name": "A", "Created": "2024-01-01" }),
            ))],
            count: 1,
        };

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "records": [{
                    "id": "rec1",
                    "fields": { "Name": "A", "Created": "2024-01-01" },
                    "createdTime": "2024-01-01"
                }],
                "count": 1
            })
        );
    }
}
