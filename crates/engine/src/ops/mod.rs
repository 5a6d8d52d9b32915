use sea_orm::DatabaseConnection;

use crate::{ErrorLogRecorder, ResultEngine};

mod details;
mod documents;

/// Run a future inside a DB transaction, committing on success and rolling
/// back on error.
///
/// Evaluates to the result instead of returning early, so the caller can
/// report the failure once the transaction is gone.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let result: $crate::ResultEngine<_> = match $self.database.begin().await {
            Err(err) => Err($crate::EngineError::from(err)),
            Ok($tx) => {
                let outcome = $body.await;
                match outcome {
                    Ok(value) => $tx
                        .commit()
                        .await
                        .map(|()| value)
                        .map_err($crate::EngineError::from),
                    Err(err) => {
                        if let Err(rollback_err) = $tx.rollback().await {
                            tracing::warn!("rollback failed after \"{err}\": {rollback_err}");
                        }
                        Err(err)
                    }
                }
            }
        };
        result
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    error_log: ErrorLogRecorder,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The recorder failures are written to.
    pub fn error_log(&self) -> &ErrorLogRecorder {
        &self.error_log
    }

    /// Write a failed `result` to the error log, then hand it back untouched.
    ///
    /// Must be called after the operation's transaction has been closed: the
    /// recorder commits on its own and may share the same pool.
    async fn reported<T>(&self, operation: &str, result: ResultEngine<T>) -> ResultEngine<T> {
        if let Err(err) = &result {
            let category = err.category();
            tracing::warn!(operation, category = category.as_str(), "{err}");
            self.error_log.record(category, &err.to_string()).await;
        }
        result
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    error_log: Option<ErrorLogRecorder>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Use a dedicated recorder. By default failures are logged through the
    /// engine's own database.
    pub fn error_log(mut self, recorder: ErrorLogRecorder) -> EngineBuilder {
        self.error_log = Some(recorder);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let error_log = self
            .error_log
            .unwrap_or_else(|| ErrorLogRecorder::new(self.database.clone()));
        Ok(Engine {
            database: self.database,
            error_log,
        })
    }
}
