//! Master-detail document engine.
//!
//! A [`Document`] owns a list of [`Detail`]s and carries `total_sum`, the sum
//! of its details' `item_sum`. Every operation on [`Engine`] runs in a single
//! database transaction and keeps that total consistent; failures are written
//! to the error log through [`ErrorLogRecorder`] in a transaction of their own.

pub use commands::{CreateDocumentCmd, DetailInput, UpdateDocumentCmd};
pub use details::Detail;
pub use documents::Document;
pub use error::EngineError;
pub use error_log::{ErrorCategory, ErrorLogEntry, ErrorLogRecorder};
pub use money::Money;
pub use ops::{Engine, EngineBuilder};

mod commands;
mod details;
mod documents;
mod error;
mod error_log;
mod money;
mod ops;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
