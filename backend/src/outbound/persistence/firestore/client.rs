//! Thin Firestore REST client.
//!
//! Owns transport details only: URL construction, authentication header,
//! status mapping and pagination. Entity encoding lives in the store
//! adapter on top of the [`super::value`] codec.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::domain::{StoreError, StoreResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const LIST_PAGE_SIZE: u32 = 300;

/// Connection settings for the durable backend.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// Google Cloud project id.
    pub project_id: String,
    /// `host:port` of a Firestore emulator; production endpoint when unset.
    pub emulator_host: Option<String>,
    /// Static bearer token for production access; the emulator needs none.
    pub auth_token: Option<String>,
}

/// A Firestore document: its resource name plus decoded-envelope fields.
#[derive(Debug, Clone)]
pub struct Document {
    /// Full resource name, `projects/.../documents/{collection}/{id}`.
    pub name: String,
    /// Raw typed-value fields.
    pub fields: Map<String, Value>,
}

impl Document {
    /// Final path segment of the resource name, i.e. the document id.
    #[must_use]
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// REST client scoped to one project's `(default)` database.
pub struct FirestoreClient {
    http: Client,
    /// Base URL ending in `/documents` (no trailing slash).
    documents_url: String,
    auth_token: Option<String>,
}

impl FirestoreClient {
    /// Build a client for the configured project or emulator.
    ///
    /// # Errors
    /// Returns [`StoreError::Backend`] when the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: &FirestoreConfig) -> StoreResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::backend(format!("http client: {e}")))?;
        let origin = match &config.emulator_host {
            Some(host) => format!("http://{host}"),
            None => "https://firestore.googleapis.com".to_owned(),
        };
        Ok(Self {
            http,
            documents_url: format!(
                "{origin}/v1/projects/{}/databases/(default)/documents",
                config.project_id
            ),
            auth_token: config.auth_token.clone(),
        })
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, context: &str) -> StoreResult<(StatusCode, Value)> {
        let response = builder
            .send()
            .await
            .map_err(|e| StoreError::backend(format!("{context}: {e}")))?;
        let status = response.status();
        let body: Value = if status == StatusCode::NOT_FOUND || status.is_success() {
            response.json().await.unwrap_or(Value::Null)
        } else {
            Value::Null
        };
        Ok((status, body))
    }

    /// Create a document under `collection` with an explicit id.
    ///
    /// # Errors
    /// Returns [`StoreError`] on transport failure or a non-success status.
    pub async fn create_document(
        &self,
        collection: &str,
        document_id: &str,
        fields: Map<String, Value>,
    ) -> StoreResult<Document> {
        let url = format!(
            "{}/{collection}?documentId={document_id}",
            self.documents_url
        );
        let (status, body) = self
            .send(
                self.request(Method::POST, url).json(&json!({ "fields": fields })),
                collection,
            )
            .await?;
        if !status.is_success() {
            return Err(StoreError::backend(format!(
                "create {collection}: status {status}"
            )));
        }
        parse_document(&body)
    }

    /// Fetch one document; `None` when it does not exist.
    ///
    /// # Errors
    /// Returns [`StoreError`] on transport failure or unexpected status.
    pub async fn get_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> StoreResult<Option<Document>> {
        let url = format!("{}/{collection}/{document_id}", self.documents_url);
        let (status, body) = self.send(self.request(Method::GET, url), collection).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StoreError::backend(format!(
                "get {collection}/{document_id}: status {status}"
            )));
        }
        parse_document(&body).map(Some)
    }

    /// Fetch every document in `collection`, following pagination.
    ///
    /// Deliberately used for listings whose filters would otherwise need a
    /// composite index; the caller filters and sorts in process.
    ///
    /// # Errors
    /// Returns [`StoreError`] on transport failure or a non-success status.
    pub async fn list_documents(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut url = format!(
                "{}/{collection}?pageSize={LIST_PAGE_SIZE}",
                self.documents_url
            );
            if let Some(token) = &page_token {
                url.push_str("&pageToken=");
                url.push_str(token);
            }
            let (status, body) = self.send(self.request(Method::GET, url), collection).await?;
            if !status.is_success() {
                return Err(StoreError::backend(format!(
                    "list {collection}: status {status}"
                )));
            }
            if let Some(page) = body.get("documents").and_then(Value::as_array) {
                for doc in page {
                    documents.push(parse_document(doc)?);
                }
            }
            match body.get("nextPageToken").and_then(Value::as_str) {
                Some(token) if !token.is_empty() => page_token = Some(token.to_owned()),
                _ => break,
            }
        }
        debug!(collection, count = documents.len(), "listed collection");
        Ok(documents)
    }

    /// Patch the named fields of an existing document; `None` when it does
    /// not exist (enforced via the `currentDocument.exists` precondition).
    ///
    /// # Errors
    /// Returns [`StoreError`] on transport failure or unexpected status.
    pub async fn patch_document(
        &self,
        collection: &str,
        document_id: &str,
        fields: Map<String, Value>,
        mask: &[&str],
    ) -> StoreResult<Option<Document>> {
        let mut url = format!(
            "{}/{collection}/{document_id}?currentDocument.exists=true",
            self.documents_url
        );
        for path in mask {
            url.push_str("&updateMask.fieldPaths=");
            url.push_str(path);
        }
        let (status, body) = self
            .send(
                self.request(Method::PATCH, url).json(&json!({ "fields": fields })),
                collection,
            )
            .await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StoreError::backend(format!(
                "patch {collection}/{document_id}: status {status}"
            )));
        }
        parse_document(&body).map(Some)
    }

    /// Delete a document. Firestore deletes are idempotent and report
    /// success for missing documents; callers needing a removal flag check
    /// existence first.
    ///
    /// # Errors
    /// Returns [`StoreError`] on transport failure or a non-success status.
    pub async fn delete_document(&self, collection: &str, document_id: &str) -> StoreResult<()> {
        let url = format!("{}/{collection}/{document_id}", self.documents_url);
        let (status, _) = self
            .send(self.request(Method::DELETE, url), collection)
            .await?;
        if !status.is_success() {
            return Err(StoreError::backend(format!(
                "delete {collection}/{document_id}: status {status}"
            )));
        }
        Ok(())
    }

    /// Run a structured query with equality filters only. Single and
    /// double equality filters are served by Firestore's automatic
    /// single-field indexes, so no composite index is ever required.
    ///
    /// # Errors
    /// Returns [`StoreError`] on transport failure or a non-success status.
    pub async fn run_query(
        &self,
        collection: &str,
        filters: &[(&str, Value)],
    ) -> StoreResult<Vec<Document>> {
        let url = format!("{}:runQuery", self.documents_url);
        let query = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "where": build_filter(filters),
            }
        });
        let (status, body) = self
            .send(self.request(Method::POST, url).json(&query), collection)
            .await?;
        if !status.is_success() {
            return Err(StoreError::backend(format!(
                "query {collection}: status {status}"
            )));
        }
        // :runQuery returns an array of result entries; entries without a
        // `document` key carry read metadata only.
        let entries = body
            .as_array()
            .ok_or_else(|| StoreError::serialization("runQuery payload is not an array"))?;
        entries
            .iter()
            .filter_map(|entry| entry.get("document"))
            .map(parse_document)
            .collect()
    }
}

fn build_filter(filters: &[(&str, Value)]) -> Value {
    let field_filters: Vec<Value> = filters
        .iter()
        .map(|(field, value)| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": value,
                }
            })
        })
        .collect();
    match field_filters.as_slice() {
        [single] => single.clone(),
        _ => json!({
            "compositeFilter": { "op": "AND", "filters": field_filters }
        }),
    }
}

fn parse_document(body: &Value) -> StoreResult<Document> {
    let name = body
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::serialization("document missing name"))?;
    let fields = body
        .get("fields")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    Ok(Document {
        name: name.to_owned(),
        fields,
    })
}
