use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::error::Error;

/// Thin client over the Airtable REST API, bound to one API key and
/// endpoint. Built fresh from the request's config rather than configured
/// globally.
#[derive(Debug, Clone)]
pub struct AirtableClient {
    client: reqwest::Client,
    api_key: Arc<String>,
    endpoint_url: Arc<String>,
}

impl AirtableClient {
    pub fn new_with_client(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            api_key: Arc::new(config.api_key.clone()),
            endpoint_url: Arc::new(config.endpoint_url.trim_end_matches('/').to_string()),
        }
    }

    pub fn new(config: &Config) -> Self {
        Self::new_with_client(reqwest::Client::new(), config)
    }

    /// Fetches the first page of records from a table. The pagination
    /// offset in the response is ignored, one page is all we serve.
    pub async fn first_page(
        &self,
        base_id: &str,
        table_id: &str,
        select: &SelectOptions,
    ) -> Result<Vec<AirtableRecord>, Error> {
        let url = format!("{}/v0/{}/{}", self.endpoint_url, base_id, table_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.api_key.as_str())
            .query(&select.query_pairs())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<Value>().await {
                Ok(body) => upstream_message(&body),
                Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
            };
            return Err(Error::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let page: RecordPage = response.json().await?;
        Ok(page.records)
    }
}

// Airtable error bodies come as {"error": {"type": ..., "message": ...}}
// or occasionally {"error": "NOT_FOUND"}.
fn upstream_message(body: &Value) -> String {
    body.pointer("/error/message")
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

/// Query options for a list call. The handler sends the defaults (no
/// filter, no sort); the fields exist so callers can narrow a page the way
/// the Airtable `select()` API does.
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    pub filter_by_formula: Option<String>,
    pub sort: Vec<SortField>,
    pub page_size: Option<u16>,
}

#[derive(Debug, Clone)]
pub struct SortField {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn as_param(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl SelectOptions {
    fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(formula) = &self.filter_by_formula {
            pairs.push(("filterByFormula".to_string(), formula.clone()));
        }
        for (i, sort) in self.sort.iter().enumerate() {
            pairs.push((format!("sort[{i}][field]"), sort.field.clone()));
            pairs.push((format!("sort[{i}][direction]"), sort.direction.as_param().to_string()));
        }
        if let Some(size) = self.page_size {
            pairs.push(("pageSize".to_string(), size.to_string()));
        }
        pairs
    }
}

#[derive(Deserialize, Debug, Clone)]
struct RecordPage {
    #[serde(default)]
    records: Vec<AirtableRecord>,
}

/// One row as Airtable returns it. `created_time` is the system-managed
/// timestamp; the response mapping reads the user-defined "Created" field
/// instead (see `routes::RecordSummary`).
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AirtableRecord {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(rename = "createdTime", default)]
    pub created_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_a_record_page() {
        let body = json!({
            "records": [
                {
                    "id": "rec1",
                    "fields": { "Name": "A", "Created": "2024-01-01" },
                    "createdTime": "2024-01-01T09:00:00.000Z"
                },
                { "id": "rec2", "fields": {} }
            ],
            "offset": "itrXYZ/rec2"
        });

        let page: RecordPage = serde_json::from_value(body).unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].id, "rec1");
        assert_eq!(page.records[0].fields["Name"], "A");
        assert_eq!(
            page.records[0].created_time.as_deref(),
            Some("2024-01-01T09:00:00.000Z")
        );
        assert!(page.records[1].created_time.is_none());
    }

    #[test]
    fn default_select_sends_no_query() {
        assert!(SelectOptions::default().query_pairs().is_empty());
    }

    #[test]
    fn select_options_build_airtable_query_params() {
        let select = SelectOptions {
            filter_by_formula: Some("NOT({Status} = 'Completed')".to_string()),
            sort: vec![SortField {
                field: "Created".to_string(),
                direction: SortDirection::Desc,
            }],
            page_size: Some(50),
        };

        assert_eq!(
            select.query_pairs(),
            vec![
                (
                    "filterByFormula".to_string(),
                    "NOT({Status} = 'Completed')".to_string()
                ),
                ("sort[0][field]".to_string(), "Created".to_string()),
                ("sort[0][direction]".to_string(), "desc".to_string()),
                ("pageSize".to_string(), "50".to_string()),
            ]
        );
    }

    #[test]
    fn upstream_message_prefers_nested_error() {
        assert_eq!(
            upstream_message(&json!({"error": {"type": "NOT_FOUND", "message": "Could not find table"}})),
            "Could not find table"
        );
        assert_eq!(upstream_message(&json!({"error": "NOT_FOUND"})), "NOT_FOUND");
        assert_eq!(upstream_message(&json!({"weird": true})), r#"{"weird":true}"#);
    }
}
