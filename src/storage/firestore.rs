//! Cloud Firestore storage implementation.
//!
//! Talks to the Firestore REST API (v1):
//! - Reads: `GET .../documents/{path}` (404 means absent)
//! - Writes: `POST .../documents:commit`, which applies every write or none
//!
//! Credentials come from `FIRESTORE_ACCESS_TOKEN`. When an emulator endpoint
//! is configured, requests are sent without authentication.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use url::Url;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::StoreConfig;
use crate::storage::{BatchOp, CommitSummary, DocPath, Document, DocumentStore, WriteBatch};

const DEFAULT_ENDPOINT: &str = "https://firestore.googleapis.com";

/// Firestore-backed document store.
#[derive(Clone)]
pub struct FirestoreStore {
    client: Client,
    endpoint: Url,
    project_id: String,
    database: String,
    access_token: Option<String>,
}

/// Document resource as returned by the REST API.
#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    #[serde(default)]
    fields: Map<String, Value>,
}

impl FirestoreStore {
    /// Create a new Firestore store.
    pub fn new(
        client: Client,
        endpoint: &str,
        project_id: impl Into<String>,
        database: impl Into<String>,
        access_token: Option<String>,
    ) -> Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        if endpoint.cannot_be_a_base() {
            return Err(AppError::config(format!(
                "Firestore endpoint is not a base URL: {endpoint}"
            )));
        }
        Ok(Self {
            client,
            endpoint,
            project_id: project_id.into(),
            database: database.into(),
            access_token,
        })
    }

    /// Create a Firestore store from configuration and environment.
    ///
    /// `client` carries the configured timeout and user agent.
    pub fn from_config(config: &StoreConfig, client: Client) -> Result<Self> {
        let project_id = config
            .project_id
            .clone()
            .ok_or_else(|| AppError::config("store.project_id is required for firestore"))?;

        let (endpoint, access_token) = match &config.endpoint {
            Some(endpoint) => (endpoint.clone(), None),
            None => {
                let token = std::env::var("FIRESTORE_ACCESS_TOKEN").ok();
                if token.is_none() {
                    log::warn!("FIRESTORE_ACCESS_TOKEN is not set; requests will be anonymous");
                }
                (DEFAULT_ENDPOINT.to_string(), token)
            }
        };

        Self::new(
            client,
            &endpoint,
            project_id,
            config.database.clone(),
            access_token,
        )
    }

    /// `projects/{project}/databases/{database}`
    fn database_name(&self) -> String {
        format!("projects/{}/databases/{}", self.project_id, self.database)
    }

    /// Full resource name of a document.
    fn document_name(&self, path: &DocPath) -> String {
        format!("{}/documents/{}", self.database_name(), path)
    }

    /// REST URL of `.../documents` followed by `extra` segments.
    fn documents_url<'a>(&self, extra: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::config("Firestore endpoint is not a base URL"))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                self.project_id.as_str(),
                "databases",
                self.database.as_str(),
            ])
            .extend(extra);
        Ok(url)
    }

    fn document_url(&self, path: &DocPath) -> Result<Url> {
        let mut segments = vec!["documents"];
        segments.extend(path.segments().iter().map(String::as_str));
        self.documents_url(segments)
    }

    fn commit_url(&self) -> Result<Url> {
        self.documents_url(["documents:commit"])
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Encode one batch operation as a Firestore `Write`.
    fn encode_write(&self, op: &BatchOp) -> Value {
        match op {
            BatchOp::Set { path, document } => json!({
                "update": {
                    "name": self.document_name(path),
                    "fields": encode_fields(document),
                }
            }),
            BatchOp::Create { path, document } => json!({
                "update": {
                    "name": self.document_name(path),
                    "fields": encode_fields(document),
                },
                "currentDocument": { "exists": false },
            }),
            BatchOp::Update { path, fields } => json!({
                "update": {
                    "name": self.document_name(path),
                    "fields": encode_fields(fields),
                },
                "updateMask": {
                    "fieldPaths": fields.keys().map(|k| field_path(k)).collect::<Vec<_>>(),
                },
                "currentDocument": { "exists": true },
            }),
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>> {
        let url = self.document_url(path)?;
        let response = self.authorize(self.client.get(url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response, path).await?;
        let document: FirestoreDocument = response.json().await?;
        Ok(Some(decode_fields(&document.fields)?))
    }

    async fn commit(&self, batch: WriteBatch) -> Result<CommitSummary> {
        let mut summary = CommitSummary::default();
        if batch.is_empty() {
            return Ok(summary);
        }

        let writes: Vec<Value> = batch
            .ops()
            .iter()
            .map(|op| {
                match op {
                    BatchOp::Set { .. } => summary.sets += 1,
                    BatchOp::Create { .. } => summary.creates += 1,
                    BatchOp::Update { .. } => summary.updates += 1,
                }
                self.encode_write(op)
            })
            .collect();

        let url = self.commit_url()?;
        let response = self
            .authorize(self.client.post(url))
            .json(&json!({ "writes": writes }))
            .send()
            .await?;
        check_status(response, "commit").await?;

        log::debug!(
            "Committed {} writes to {}",
            summary.total(),
            self.database_name()
        );
        Ok(summary)
    }

    fn supports_conditional_create(&self) -> bool {
        true
    }
}

/// Map Firestore error statuses onto the error taxonomy.
async fn check_status(
    response: reqwest::Response,
    context: impl std::fmt::Display,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::NOT_FOUND => AppError::not_found(format!("{context}: {body}")),
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
            AppError::conflict(format!("{context}: {body}"))
        }
        _ => AppError::store(format!("{context}: HTTP {status}: {body}")),
    })
}

/// Quote a field name for use in an update mask.
fn field_path(name: &str) -> String {
    let simple = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

fn encode_fields(doc: &Document) -> Value {
    Value::Object(
        doc.iter()
            .map(|(k, v)| (k.clone(), encode_value(v)))
            .collect(),
    )
}

/// Encode a JSON value as a Firestore typed value.
fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

fn decode_fields(fields: &Map<String, Value>) -> Result<Document> {
    fields
        .iter()
        .map(|(k, v)| Ok((k.clone(), decode_value(v)?)))
        .collect()
}

/// Decode a Firestore typed value into plain JSON.
fn decode_value(value: &Value) -> Result<Value> {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Err(AppError::store(format!("malformed Firestore value: {value}")));
    };

    Ok(match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => Value::Bool(inner.as_bool().unwrap_or_default()),
        "integerValue" => match inner {
            Value::String(s) => s
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| AppError::store(format!("bad integerValue '{s}': {e}")))?,
            other => other.clone(),
        },
        // Non-finite doubles arrive as strings and have no JSON form
        "doubleValue" => match inner {
            Value::Number(_) => inner.clone(),
            _ => Value::Null,
        },
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "geoPointValue" => inner.clone(),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect::<Result<Vec<_>>>())
                .transpose()?
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .transpose()?
                .unwrap_or_default(),
        ),
        other => return Err(AppError::store(format!("unsupported Firestore value type {other}"))),
    })
}
