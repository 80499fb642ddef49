//! Repository module for draft store records
//!
//! Typed repositories over the key-value backend.

pub mod quotation;
pub mod smtp;

pub use quotation::QuotationRepository;
pub use smtp::SmtpConfigRepository;

use ykk_utils::PortalError;

pub(crate) fn storage_error(err: anyhow::Error) -> PortalError {
    PortalError::storage(format!("{:#}", err))
}
