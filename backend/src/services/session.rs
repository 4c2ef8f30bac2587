//! In-memory store of operator sessions

use std::collections::HashMap;

use serde::Serialize;
use shared::{Catalog, EntryRequest, FlowOptions, OutputRecord, ScanOutcome, Session};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::export::to_spreadsheet_bytes;

/// Snapshot of a session for the form
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub options: FlowOptions,
    pub active_code: Option<String>,
    pub scanned_code: Option<String>,
    pub entries: Vec<OutputRecord>,
}

/// Workbook ready for download
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: &'static str,
    pub bytes: Vec<u8>,
    pub records: usize,
}

/// Sessions keyed by id; each session is only touched under the store lock
pub struct SessionStore {
    options: FlowOptions,
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new(options: FlowOptions) -> Self {
        Self {
            options,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub async fn create(&self) -> SessionView {
        let id = Uuid::new_v4();
        let session = Session::new(self.options);
        let view = view(id, &session);
        self.sessions.lock().await.insert(id, session);
        tracing::info!(session_id = %id, "Session created");
        view
    }

    pub async fn get(&self, id: Uuid) -> AppResult<SessionView> {
        let sessions = self.sessions.lock().await;
        let session = sessions.get(&id).ok_or(AppError::SessionNotFound(id))?;
        Ok(view(id, session))
    }

    pub async fn set_code(&self, id: Uuid, code: &str) -> AppResult<SessionView> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&id).ok_or(AppError::SessionNotFound(id))?;
        session.set_code(code);
        Ok(view(id, session))
    }

    /// Hand a decoded barcode to the session.
    ///
    /// Returns the outcome and the code the next lookup should use.
    pub async fn accept_scan(&self, id: Uuid, raw: &str) -> AppResult<(ScanOutcome, Option<String>)> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&id).ok_or(AppError::SessionNotFound(id))?;
        let outcome = session.accept_scan(raw);
        tracing::debug!(session_id = %id, ?outcome, "Scan accepted");
        Ok((outcome, session.active_code().map(str::to_string)))
    }

    /// Save one entry; returns it with the session's entry count
    pub async fn add_entry(
        &self,
        id: Uuid,
        catalog: &Catalog,
        request: &EntryRequest,
    ) -> AppResult<(OutputRecord, usize)> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&id).ok_or(AppError::SessionNotFound(id))?;
        let record = session.add_entry(catalog, request)?.clone();
        tracing::info!(
            session_id = %id,
            codart = %record.codart,
            numlote = %record.numlote,
            "Entry saved"
        );
        Ok((record, session.entries().len()))
    }

    pub async fn clear(&self, id: Uuid) -> AppResult<SessionView> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&id).ok_or(AppError::SessionNotFound(id))?;
        session.clear();
        Ok(view(id, session))
    }

    pub async fn remove(&self, id: Uuid) -> AppResult<()> {
        self.sessions
            .lock()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::SessionNotFound(id))
    }

    /// Encode the session's entries under its export mode
    pub async fn export(&self, id: Uuid, sheet_name: &str) -> AppResult<ExportFile> {
        let sessions = self.sessions.lock().await;
        let session = sessions.get(&id).ok_or(AppError::SessionNotFound(id))?;
        let records = session.export_records().map_err(AppError::from)?;
        Ok(ExportFile {
            file_name: session.options().export_mode.file_name(),
            bytes: to_spreadsheet_bytes(records, sheet_name)?,
            records: records.len(),
        })
    }
}

fn view(id: Uuid, session: &Session) -> SessionView {
    SessionView {
        id,
        options: *session.options(),
        active_code: session.active_code().map(str::to_string),
        scanned_code: session.scanned_code().map(str::to_string),
        entries: session.entries().to_vec(),
    }
}
