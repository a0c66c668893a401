use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use super::value::{encode_fields, expand_field_paths, quote_field_path, update_paths};
use super::{auto_id, DocumentStore, StoreError};
use crate::models::{validate_collection_path, DocumentRef, Fields};

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
pub const DEFAULT_DATABASE_ID: &str = "(default)";

/// Firestore REST endpoint configuration
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub base_url: String,
    pub project_id: String,
    pub database_id: String,
    pub api_key: Option<String>,
    pub auth_token: Option<String>,
    pub timeout_seconds: u64,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: project_id.into(),
            database_id: DEFAULT_DATABASE_ID.to_string(),
            api_key: None,
            auth_token: None,
            timeout_seconds: 30,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.project_id.is_empty() {
            return Err(anyhow!("Project ID cannot be empty"));
        }

        if self.database_id.is_empty() {
            return Err(anyhow!("Database ID cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(anyhow!("Base URL must start with http:// or https://"));
        }

        if self.timeout_seconds == 0 {
            return Err(anyhow!("Timeout must be at least one second"));
        }

        Ok(())
    }

    /// Root URL of the documents resource
    pub fn documents_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            self.database_id,
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Deserialize)]
struct DocumentResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Document store backed by the Firestore v1 REST API
#[derive(Debug, Clone)]
pub struct FirestoreRestStore {
    client: Client,
    config: FirestoreConfig,
}

impl FirestoreRestStore {
    pub fn new(config: FirestoreConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    fn collection_url(&self, collection: &str) -> String {
        let encoded: Vec<String> = collection
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", self.config.documents_url(), encoded.join("/"))
    }

    fn document_url(&self, doc: &DocumentRef) -> String {
        format!(
            "{}/{}",
            self.collection_url(&doc.collection),
            urlencoding::encode(&doc.id)
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!("Firestore {} {}", method, url);
        let mut builder = self.client.request(method, url);

        if let Some(token) = &self.config.auth_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(key) = &self.config.api_key {
            builder = builder.query(&[("key", key.as_str())]);
        }

        builder
    }

    /// Map non-2xx responses onto store errors
    async fn check(response: Response, doc: Option<&DocumentRef>) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ErrorEnvelope>(&text) {
            Ok(envelope) => (envelope.error.status, envelope.error.message),
            Err(_) => ("UNKNOWN".to_string(), format!("HTTP {}: {}", status.as_u16(), text.trim())),
        };
        warn!("Firestore request failed with {} ({}): {}", status.as_u16(), code, message);

        if let Some(doc) = doc {
            if status.as_u16() == 404 || code == "NOT_FOUND" {
                return Err(StoreError::not_found(doc.path()));
            }
        }

        Err(StoreError::Api {
            status: status.as_u16(),
            code,
            message,
        })
    }
}

#[async_trait]
impl DocumentStore for FirestoreRestStore {
    async fn add_document(&self, collection: &str, fields: Fields) -> Result<DocumentRef, StoreError> {
        validate_collection_path(collection)?;

        let body = json!({ "fields": encode_fields(&fields) });
        let response = self
            .request(Method::POST, &self.collection_url(collection))
            .query(&[("documentId", auto_id())])
            .json(&body)
            .send()
            .await?;

        let created: DocumentResponse = Self::check(response, None).await?.json().await?;
        let id = created
            .name
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| StoreError::invalid_data(format!("unexpected document name '{}'", created.name)))?;

        DocumentRef::new(collection, id)
    }

    async fn update_document(&self, doc: &DocumentRef, fields: Fields) -> Result<(), StoreError> {
        update_paths(&fields)?;

        // A PATCH without updateMask replaces the whole document, so an
        // empty update only checks that the document exists
        if fields.is_empty() {
            let response = self
                .request(Method::GET, &self.document_url(doc))
                .query(&[("mask.fieldPaths", "__name__")])
                .send()
                .await?;
            Self::check(response, Some(doc)).await?;
            return Ok(());
        }

        let mut query: Vec<(&str, String)> = Vec::with_capacity(fields.len() + 1);
        for path in fields.keys() {
            query.push(("updateMask.fieldPaths", quote_field_path(path)?));
        }
        query.push(("currentDocument.exists", "true".to_string()));

        let body = json!({ "fields": encode_fields(&expand_field_paths(&fields)?) });
        let response = self
            .request(Method::PATCH, &self.document_url(doc))
            .query(&query)
            .json(&body)
            .send()
            .await?;

        Self::check(response, Some(doc)).await?;
        Ok(())
    }

    async fn delete_document(&self, doc: &DocumentRef) -> Result<(), StoreError> {
        let response = self
            .request(Method::DELETE, &self.document_url(doc))
            .send()
            .await?;

        match Self::check(response, Some(doc)).await {
            Ok(_) | Err(StoreError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
