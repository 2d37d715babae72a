//! Spreadsheet-driven photo delivery.
//!
//! An upload lists recipients and photo identifiers; each recipient gets one
//! email with the matching files from a local folder, and the caller gets back
//! a workbook saying which rows went out and which did not.

pub use photomail_macros::HttpError;

pub mod batch;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod mail;
pub mod normalize;
pub mod report;
pub mod resolve;
pub mod row;
pub mod sheet;
pub mod upload;

mod serve;

pub use batch::{BatchReport, BatchRequest, BatchRunner, BatchSettings};
pub use config::AppConfig;
pub use error::BatchError;
pub use serve::serve;
