use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use ykk_database::TwoTierDraftRepository;
use ykk_models::{BomHeader, NewBom};
use ykk_utils::{validate_model, AppConfig, BomPartStore, ParsedSheet, PortalError, PortalResult, RevisionSession};

use crate::metrics::Metrics;

/// One BOM with its parts, its revision session and the uploaded sheet awaiting commit.
pub struct BomEntry {
    pub header: BomHeader,
    pub store: BomPartStore,
    pub session: RevisionSession,
    /// At most one sheet per BOM; a new upload replaces it
    pending_import: Option<ParsedSheet>,
}

impl BomEntry {
    fn new(header: BomHeader) -> Self {
        let store = BomPartStore::new(header.variant());
        Self {
            header,
            store,
            session: RevisionSession::new(),
            pending_import: None,
        }
    }

    /// Holds `sheet` for preview and commit, returning the id of the sheet it replaced.
    pub fn stage_import(&mut self, sheet: ParsedSheet) -> Option<Uuid> {
        self.pending_import.replace(sheet).map(|previous| previous.id)
    }

    pub fn pending_import(&self, sheet_id: Uuid) -> PortalResult<&ParsedSheet> {
        self.pending_import
            .as_ref()
            .filter(|sheet| sheet.id == sheet_id)
            .ok_or_else(|| PortalError::not_found(format!("import {}", sheet_id)))
    }

    pub fn take_import(&mut self, sheet_id: Uuid) -> PortalResult<ParsedSheet> {
        self.pending_import(sheet_id)?;
        self.pending_import
            .take()
            .ok_or_else(|| PortalError::not_found(format!("import {}", sheet_id)))
    }
}

#[derive(Default)]
pub struct BomCatalog {
    entries: HashMap<Uuid, BomEntry>,
    order: Vec<Uuid>,
}

impl BomCatalog {
    pub fn create(&mut self, request: NewBom) -> PortalResult<&BomEntry> {
        validate_model(&request)?;
        let header = request
            .into_header()
            .map_err(|message| PortalError::validation("glassGroove", message))?;

        if self.entries.values().any(|e| e.header.code == header.code) {
            return Err(PortalError::conflict(format!("BOM code {} already exists", header.code)));
        }

        let id = header.id;
        self.order.push(id);
        let entry = self.entries.entry(id).or_insert_with(|| BomEntry::new(header));
        Ok(entry)
    }

    /// Headers in creation order.
    pub fn headers(&self) -> Vec<&BomHeader> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .map(|entry| &entry.header)
            .collect()
    }

    pub fn get(&self, id: Uuid) -> PortalResult<&BomEntry> {
        self.entries
            .get(&id)
            .ok_or_else(|| PortalError::not_found(format!("BOM {}", id)))
    }

    pub fn get_mut(&mut self, id: Uuid) -> PortalResult<&mut BomEntry> {
        self.entries
            .get_mut(&id)
            .ok_or_else(|| PortalError::not_found(format!("BOM {}", id)))
    }
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<RwLock<BomCatalog>>,
    pub drafts: Arc<TwoTierDraftRepository>,
    pub metrics: Arc<Metrics>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let drafts = TwoTierDraftRepository::from_config(&config.draft_api)?;
        Ok(Self {
            catalog: Arc::new(RwLock::new(BomCatalog::default())),
            drafts: Arc::new(drafts),
            metrics: Arc::new(Metrics::new()?),
            config,
        })
    }
}
