//! Draft persistence: the key-value store behind the draft service, and the
//! client-side two-tier repository that falls back to a local file.

pub mod fallback;
pub mod kv;
pub mod local;
pub mod remote;
pub mod repositories;
pub mod wire;

pub use fallback::{Fetched, Tier, TwoTierDraftRepository};
pub use kv::KvBackend;
pub use local::LocalDraftStore;
pub use remote::RemoteDraftClient;
pub use repositories::*;
