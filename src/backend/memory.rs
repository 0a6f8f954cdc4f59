//! In-process backend.
//!
//! Implements the document store, blob store and account service entirely
//! in memory. Used for local development (`backend.kind = "memory"`) and as
//! the base of the test doubles.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use super::{
    unique_id, Account, AccountService, BackendError, BackendResult, BlobStore, Document,
    DocumentList, DocumentStore, EmailToken, Query, Session, StoredBlob,
};

struct AccountRecord {
    id: String,
    email: String,
    pending_otp: Option<String>,
}

struct BlobEntry {
    name: String,
    data: Bytes,
}

#[derive(Default)]
struct MemoryState {
    /// Documents per collection, in creation order.
    collections: HashMap<String, Vec<Document>>,
    blobs: HashMap<String, BlobEntry>,
    accounts: Vec<AccountRecord>,
    /// Sessions keyed by secret.
    sessions: HashMap<String, Session>,
}

/// Backend that keeps all state in process memory.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub async fn document_count(&self, collection: &str) -> usize {
        let state = self.state.lock().await;
        state.collections.get(collection).map_or(0, Vec::len)
    }

    /// Number of stored blobs.
    pub async fn blob_count(&self) -> usize {
        self.state.lock().await.blobs.len()
    }

    /// Contents of a stored blob.
    pub async fn blob_data(&self, id: &str) -> Option<Bytes> {
        let state = self.state.lock().await;
        state.blobs.get(id).map(|entry| entry.data.clone())
    }

    /// Stored names of all blobs, sorted.
    pub async fn blob_names(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut names: Vec<String> = state.blobs.values().map(|e| e.name.clone()).collect();
        names.sort();
        names
    }

    /// The passcode most recently issued for `email` and not yet used.
    pub async fn pending_otp(&self, email: &str) -> Option<String> {
        let state = self.state.lock().await;
        state
            .accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .and_then(|a| a.pending_otp.clone())
    }

    /// Number of active sessions.
    pub async fn session_count(&self) -> usize {
        self.state.lock().await.sessions.len()
    }
}

fn not_found(what: &str, id: &str) -> BackendError {
    BackendError::NotFound(format!("{what} {id}"))
}

fn conflict(message: &str, kind: &str) -> BackendError {
    BackendError::Status {
        status: 409,
        message: message.to_string(),
        kind: Some(kind.to_string()),
    }
}

fn unauthorized(message: &str, kind: &str) -> BackendError {
    BackendError::Status {
        status: 401,
        message: message.to_string(),
        kind: Some(kind.to_string()),
    }
}

/// Attribute value of a document, including system attributes.
fn attribute(doc: &Document, name: &str) -> Value {
    match name {
        "$id" => Value::String(doc.id.clone()),
        "$createdAt" => Value::String(doc.created_at.to_rfc3339_opts(SecondsFormat::Micros, true)),
        "$updatedAt" => Value::String(doc.updated_at.to_rfc3339_opts(SecondsFormat::Micros, true)),
        _ => doc.data.get(name).cloned().unwrap_or(Value::Null),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Whether a document satisfies a filter predicate.
///
/// Limit and order predicates never exclude a document.
fn matches(doc: &Document, query: &Query) -> bool {
    match query {
        Query::Equal { attribute: name, values } => match attribute(doc, name) {
            Value::Array(items) => items
                .iter()
                .any(|item| values.iter().any(|v| values_equal(item, v))),
            value => values.iter().any(|v| values_equal(&value, v)),
        },
        Query::Contains { attribute: name, values } => match attribute(doc, name) {
            Value::Array(items) => items
                .iter()
                .any(|item| values.iter().any(|v| values_equal(item, v))),
            Value::String(s) => values
                .iter()
                .filter_map(Value::as_str)
                .any(|needle| s.contains(needle)),
            _ => false,
        },
        Query::Or(queries) => queries.iter().any(|q| matches(doc, q)),
        Query::Limit(_) | Query::OrderAsc(_) | Query::OrderDesc(_) => true,
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn create_document(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> BackendResult<Document> {
        let mut state = self.state.lock().await;
        let docs = state.collections.entry(collection.to_string()).or_default();
        if docs.iter().any(|d| d.id == id) {
            return Err(conflict(
                "Document with the requested ID already exists.",
                "document_already_exists",
            ));
        }

        let now = Utc::now();
        let doc = Document {
            id: id.to_string(),
            created_at: now,
            updated_at: now,
            data,
        };
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> BackendResult<DocumentList> {
        let state = self.state.lock().await;
        let mut documents: Vec<Document> = state
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| queries.iter().all(|q| matches(doc, q)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let orders: Vec<(&str, bool)> = queries
            .iter()
            .filter_map(|q| match q {
                Query::OrderAsc(attr) => Some((attr.as_str(), true)),
                Query::OrderDesc(attr) => Some((attr.as_str(), false)),
                _ => None,
            })
            .collect();
        if !orders.is_empty() {
            documents.sort_by(|a, b| {
                orders
                    .iter()
                    .map(|(attr, asc)| {
                        let ord = compare_values(&attribute(a, attr), &attribute(b, attr));
                        if *asc {
                            ord
                        } else {
                            ord.reverse()
                        }
                    })
                    .find(|ord| *ord != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        let total = documents.len() as u64;
        let limit = queries.iter().find_map(|q| match q {
            Query::Limit(n) => Some(*n as usize),
            _ => None,
        });
        if let Some(limit) = limit {
            documents.truncate(limit);
        }

        Ok(DocumentList { total, documents })
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> BackendResult<Document> {
        let mut state = self.state.lock().await;
        let doc = state
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| not_found("document", id))?;

        doc.data.extend(data);
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> BackendResult<()> {
        let mut state = self.state.lock().await;
        let docs = state
            .collections
            .get_mut(collection)
            .ok_or_else(|| not_found("document", id))?;
        let pos = docs
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| not_found("document", id))?;
        docs.remove(pos);
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryBackend {
    async fn create_blob(&self, id: &str, name: &str, data: Bytes) -> BackendResult<StoredBlob> {
        let mut state = self.state.lock().await;
        if state.blobs.contains_key(id) {
            return Err(conflict(
                "A storage file with the requested ID already exists.",
                "storage_file_already_exists",
            ));
        }

        let blob = StoredBlob {
            id: id.to_string(),
            name: name.to_string(),
            size: data.len() as u64,
            mime_type: mime_guess::from_path(name)
                .first_or_octet_stream()
                .to_string(),
        };
        state.blobs.insert(
            id.to_string(),
            BlobEntry {
                name: name.to_string(),
                data,
            },
        );
        Ok(blob)
    }

    async fn delete_blob(&self, id: &str) -> BackendResult<()> {
        let mut state = self.state.lock().await;
        state
            .blobs
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("blob", id))
    }
}

#[async_trait]
impl AccountService for MemoryBackend {
    async fn create_email_token(&self, user_id: &str, email: &str) -> BackendResult<EmailToken> {
        let otp = format!("{:06}", rand::rng().random_range(0..1_000_000u32));
        let mut state = self.state.lock().await;

        let account = match state
            .accounts
            .iter()
            .position(|a| a.email.eq_ignore_ascii_case(email))
        {
            Some(pos) => &mut state.accounts[pos],
            None => {
                let id = if user_id.is_empty() {
                    unique_id()
                } else {
                    user_id.to_string()
                };
                state.accounts.push(AccountRecord {
                    id,
                    email: email.to_string(),
                    pending_otp: None,
                });
                let last = state.accounts.len() - 1;
                &mut state.accounts[last]
            }
        };
        account.pending_otp = Some(otp.clone());
        tracing::info!(email = %account.email, code = %otp, "Memory backend issued OTP");

        Ok(EmailToken {
            id: unique_id(),
            user_id: account.id.clone(),
        })
    }

    async fn create_session(&self, user_id: &str, secret: &str) -> BackendResult<Session> {
        let mut state = self.state.lock().await;
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.id == user_id)
            .ok_or_else(|| not_found("account", user_id))?;

        if account.pending_otp.as_deref() != Some(secret) {
            return Err(unauthorized(
                "Invalid token passed in the request.",
                "user_invalid_token",
            ));
        }
        account.pending_otp = None;

        let session = Session {
            id: unique_id(),
            user_id: account.id.clone(),
            secret: format!("{}{}", unique_id(), unique_id()),
        };
        state
            .sessions
            .insert(session.secret.clone(), session.clone());
        Ok(session)
    }

    async fn get_account(&self, session_secret: &str) -> BackendResult<Account> {
        let state = self.state.lock().await;
        let session = state.sessions.get(session_secret).ok_or_else(|| {
            unauthorized(
                "User (role: guests) missing scope (account)",
                "general_unauthorized_scope",
            )
        })?;
        state
            .accounts
            .iter()
            .find(|a| a.id == session.user_id)
            .map(|a| Account {
                id: a.id.clone(),
                email: a.email.clone(),
                name: String::new(),
            })
            .ok_or_else(|| not_found("account", &session.user_id))
    }

    async fn delete_session(&self, session_secret: &str) -> BackendResult<()> {
        let mut state = self.state.lock().await;
        state
            .sessions
            .remove(session_secret)
            .map(|_| ())
            .ok_or_else(|| {
                unauthorized(
                    "User (role: guests) missing scope (account)",
                    "general_unauthorized_scope",
                )
            })
    }
}
