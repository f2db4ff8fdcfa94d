//! Tabular-store client — appends one row per confirmed submission.

pub mod client;
pub mod credentials;

use async_trait::async_trait;

use crate::error::SheetsError;

pub use client::SheetsClient;
pub use credentials::AuthorizedUser;

/// Append-only sink for finished report rows.
///
/// The only write the system ever performs is "create a new row"; the
/// store serializes concurrent appends on its own.
#[async_trait]
pub trait RowSink: Send + Sync {
    async fn append_row(&self, row: Vec<String>) -> Result<(), SheetsError>;
}
