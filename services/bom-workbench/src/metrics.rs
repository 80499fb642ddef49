use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    pub parts_imported: IntCounter,
    pub revisions_committed: IntCounter,
    pub exports: IntCounterVec,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let parts_imported = IntCounter::new("bom_parts_imported_total", "Parts added by spreadsheet import")?;
        let revisions_committed = IntCounter::new("bom_revisions_committed_total", "Confirmed revision sessions")?;
        let exports = IntCounterVec::new(Opts::new("bom_exports_total", "BOM exports by format"), &["format"])?;

        registry.register(Box::new(parts_imported.clone()))?;
        registry.register(Box::new(revisions_committed.clone()))?;
        registry.register(Box::new(exports.clone()))?;

        Ok(Self {
            registry,
            parts_imported,
            revisions_committed,
            exports,
        })
    }

    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            tracing::error!(error = %e, "Failed to encode metrics");
            return "Error encoding metrics".to_string();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
