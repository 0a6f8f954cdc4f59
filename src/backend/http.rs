//! REST client for the backend platform.
//!
//! Admin calls authenticate with the project's server API key. Calls made
//! on behalf of a signed-in user carry the session secret instead.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{
    Account, AccountService, BackendError, BackendResult, BlobStore, Document, DocumentList,
    DocumentStore, EmailToken, Query, Session, StoredBlob,
};
use crate::config::BackendConfig;

/// Error body returned by the platform.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// Map a non-success response body to a [`BackendError`].
fn error_from_body(status: u16, body: &str) -> BackendError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => BackendError::Status {
            status,
            message: parsed.message,
            kind: parsed.kind,
        },
        Err(_) => BackendError::Status {
            status,
            message: body.trim().to_string(),
            kind: None,
        },
    }
}

/// Backend reached over the platform's REST API.
pub struct HttpBackend {
    client: Client,
    endpoint: String,
    project_id: String,
    api_key: String,
    database_id: String,
    bucket_id: String,
}

impl HttpBackend {
    /// Create a client from configuration.
    pub fn new(config: &BackendConfig) -> BackendResult<Self> {
        url::Url::parse(&config.endpoint)
            .map_err(|e| BackendError::Transport(format!("invalid endpoint: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("cloudstash/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            api_key: config.api_key.clone(),
            database_id: config.database_id.clone(),
            bucket_id: config.bucket_id.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    fn documents_url(&self, collection: &str) -> String {
        self.url(&format!(
            "/databases/{}/collections/{}/documents",
            self.database_id, collection
        ))
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.documents_url(collection), id)
    }

    fn files_url(&self) -> String {
        self.url(&format!("/storage/buckets/{}/files", self.bucket_id))
    }

    fn admin(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
    }

    fn with_session(&self, builder: RequestBuilder, secret: &str) -> RequestBuilder {
        builder
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Session", secret)
    }

    async fn check(response: Response) -> BackendResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = error_from_body(status.as_u16(), &body);
        tracing::debug!(status = status.as_u16(), error = %err, "Backend request failed");
        Err(err)
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> BackendResult<T> {
        let response = Self::check(builder.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_empty(builder: RequestBuilder) -> BackendResult<()> {
        Self::check(builder.send().await?).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for HttpBackend {
    async fn create_document(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> BackendResult<Document> {
        let request = self
            .admin(self.client.post(self.documents_url(collection)))
            .json(&json!({ "documentId": id, "data": data }));
        Self::send(request).await
    }

    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> BackendResult<DocumentList> {
        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|q| ("queries[]", q.to_query_string()))
            .collect();
        let request = self
            .admin(self.client.get(self.documents_url(collection)))
            .query(&params);
        Self::send(request).await
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> BackendResult<Document> {
        let request = self
            .admin(self.client.patch(self.document_url(collection, id)))
            .json(&json!({ "data": data }));
        Self::send(request).await
    }

    async fn delete_document(&self, collection: &str, id: &str) -> BackendResult<()> {
        let request = self.admin(self.client.delete(self.document_url(collection, id)));
        Self::send_empty(request).await
    }
}

#[async_trait]
impl BlobStore for HttpBackend {
    async fn create_blob(&self, id: &str, name: &str, data: Bytes) -> BackendResult<StoredBlob> {
        let mime = mime_guess::from_path(name).first_or_octet_stream();
        let part = Part::bytes(data.to_vec())
            .file_name(name.to_string())
            .mime_str(mime.essence_str())?;
        let form = Form::new().text("fileId", id.to_string()).part("file", part);

        let request = self.admin(self.client.post(self.files_url())).multipart(form);
        Self::send(request).await
    }

    async fn delete_blob(&self, id: &str) -> BackendResult<()> {
        let url = format!("{}/{}", self.files_url(), id);
        Self::send_empty(self.admin(self.client.delete(url))).await
    }
}

#[async_trait]
impl AccountService for HttpBackend {
    async fn create_email_token(&self, user_id: &str, email: &str) -> BackendResult<EmailToken> {
        let request = self
            .admin(self.client.post(self.url("/account/tokens/email")))
            .json(&json!({ "userId": user_id, "email": email }));
        Self::send(request).await
    }

    async fn create_session(&self, user_id: &str, secret: &str) -> BackendResult<Session> {
        let request = self
            .admin(self.client.post(self.url("/account/sessions/token")))
            .json(&json!({ "userId": user_id, "secret": secret }));
        Self::send(request).await
    }

    async fn get_account(&self, session_secret: &str) -> BackendResult<Account> {
        let request = self.with_session(self.client.get(self.url("/account")), session_secret);
        Self::send(request).await
    }

    async fn delete_session(&self, session_secret: &str) -> BackendResult<()> {
        let request = self.with_session(
            self.client.delete(self.url("/account/sessions/current")),
            session_secret,
        );
        Self::send_empty(request).await
    }
}
