//! In-memory fakes for the store and analyzer seams, plus fixture builders.

use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::assessments::store::AssessmentStore;
use crate::auth::service::AccountService;
use crate::auth::store::{AccountStore, DUPLICATE_EMAIL};
use crate::auth::token::TokenIssuer;
use crate::config::AuthSettings;
use crate::documents::extractor::TextExtractor;
use crate::documents::pipeline::UploadPipeline;
use crate::documents::storage::UploadDir;
use crate::errors::AppError;
use crate::llm_client::{DocumentAnalyzer, LlmError};
use crate::models::account::{Account, NewAccount};
use crate::models::assessment::{Assessment, AssessmentPatch, NewAssessment};
use crate::state::AppState;

#[derive(Default)]
pub struct MemoryAssessmentStore {
    rows: Mutex<Vec<Assessment>>,
    next_id: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryAssessmentStore {
    pub fn snapshot(&self) -> Vec<Assessment> {
        self.rows.lock().unwrap().clone()
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AssessmentStore for MemoryAssessmentStore {
    async fn create(&self, new: NewAssessment) -> Result<Assessment, AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Internal(anyhow::anyhow!("store is read-only")));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i32 + 1;
        let assessment = Assessment {
            id,
            product: new.product,
            filename: new.filename,
            summary: new.summary,
            controls: new.controls,
            risks: new.risks,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(assessment.clone());
        Ok(assessment)
    }

    async fn list(&self) -> Result<Vec<Assessment>, AppError> {
        let mut rows = self.snapshot();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn get(&self, id: i32) -> Result<Option<Assessment>, AppError> {
        Ok(self.snapshot().into_iter().find(|a| a.id == id))
    }

    async fn update(
        &self,
        id: i32,
        patch: AssessmentPatch,
    ) -> Result<Option<Assessment>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|a| a.id == id).map(|row| {
            patch.apply_to(row);
            row.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|a| a.id != id);
        Ok(rows.len() != before)
    }
}

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<Vec<Account>>,
}

impl MemoryAccountStore {
    pub fn set_active(&self, id: Uuid, active: bool) {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts.iter_mut().find(|a| a.id == id) {
            account.is_active = active;
        }
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn insert(&self, new: NewAccount) -> Result<Account, AppError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|a| a.email == new.email) {
            return Err(AppError::BadRequest(DUPLICATE_EMAIL.to_string()));
        }
        let account = Account {
            id: Uuid::new_v4(),
            email: new.email,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            role: new.role,
            is_active: true,
            created_at: Utc::now(),
        };
        accounts.push(account.clone());
        Ok(account)
    }
}

/// Analyzer that answers every call with a canned reply (or fails).
pub struct StubAnalyzer {
    reply: Option<String>,
    calls: AtomicUsize,
    last: Mutex<Option<(String, String)>>,
}

impl StubAnalyzer {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(text, product)` of the most recent call.
    pub fn last_request(&self) -> Option<(String, String)> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentAnalyzer for StubAnalyzer {
    async fn analyze(&self, text: &str, product: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((text.to_string(), product.to_string()));
        self.reply
            .clone()
            .ok_or_else(|| LlmError::AllProvidersFailed {
                primary: "not configured".to_string(),
                fallback: "connection refused".to_string(),
            })
    }
}

/// A minimal DOCX package with one paragraph per entry.
pub fn docx_bytes(paragraphs: &[&str]) -> Bytes {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{body}</w:body></w:document>"
    );

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    Bytes::from(zip.finish().unwrap().into_inner())
}

pub struct TestApp {
    pub state: AppState,
    pub assessments: Arc<MemoryAssessmentStore>,
    pub accounts: Arc<MemoryAccountStore>,
    pub analyzer: Arc<StubAnalyzer>,
    pub upload_dir: tempfile::TempDir,
}

pub fn test_app(analyzer: StubAnalyzer) -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let assessments = Arc::new(MemoryAssessmentStore::default());
    let accounts = Arc::new(MemoryAccountStore::default());
    let analyzer = Arc::new(analyzer);

    let tokens = TokenIssuer::new(&AuthSettings {
        jwt_secret: "test-secret".to_string(),
        token_ttl: chrono::Duration::hours(1),
    });
    let state = AppState {
        assessments: assessments.clone(),
        accounts: AccountService::new(accounts.clone(), tokens),
        pipeline: UploadPipeline::new(
            UploadDir::new(upload_dir.path()),
            TextExtractor::new("definitely-not-an-installed-extractor"),
            analyzer.clone(),
            assessments.clone(),
        ),
        upload_limit: 1024 * 1024,
    };

    TestApp {
        state,
        assessments,
        accounts,
        analyzer,
        upload_dir,
    }
}
