//! Durable error log.
//!
//! [`ErrorLogRecorder`] writes every entry in its own transaction, begun and
//! committed on its own, so an entry survives even when the operation that
//! produced it rolls back. Recording never fails from the caller's point of
//! view: a store failure is reported through `tracing` and dropped.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseConnection, QueryOrder, QuerySelect, TransactionTrait, entity::prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    DocNumberDuplicate,
    DocNotFound,
    DetailNotFound,
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    #[serde(rename = "GENERAL_ERROR")]
    General,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DocNumberDuplicate => "DOC_NUMBER_DUPLICATE",
            Self::DocNotFound => "DOC_NOT_FOUND",
            Self::DetailNotFound => "DETAIL_NOT_FOUND",
            Self::Validation => "VALIDATION_ERROR",
            Self::General => "GENERAL_ERROR",
        }
    }

    /// Human readable description of the category.
    pub fn description(self) -> &'static str {
        match self {
            Self::DocNumberDuplicate => "document number already exists",
            Self::DocNotFound => "Document not found",
            Self::DetailNotFound => "Detail not found",
            Self::Validation => "Validation error",
            Self::General => "Internal error",
        }
    }
}

impl TryFrom<&str> for ErrorCategory {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "DOC_NUMBER_DUPLICATE" => Ok(Self::DocNumberDuplicate),
            "DOC_NOT_FOUND" => Ok(Self::DocNotFound),
            "DETAIL_NOT_FOUND" => Ok(Self::DetailNotFound),
            "VALIDATION_ERROR" => Ok(Self::Validation),
            "GENERAL_ERROR" => Ok(Self::General),
            other => Err(EngineError::Validation(format!(
                "invalid error category: {other}"
            ))),
        }
    }
}

/// A persisted error log entry. Entries are never modified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    pub id: i64,
    pub recorded_at: DateTime<Utc>,
    pub category: ErrorCategory,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "error_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub recorded_at: DateTimeUtc,
    pub category: String,
    pub message: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ErrorLogEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            recorded_at: model.recorded_at,
            category: ErrorCategory::try_from(model.category.as_str())?,
            message: model.message,
        })
    }
}

#[derive(Clone, Debug)]
pub struct ErrorLogRecorder {
    database: DatabaseConnection,
}

impl ErrorLogRecorder {
    /// The connection may be shared with the engine or dedicated to the log.
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    /// Persists `message` under `category`, best effort.
    pub async fn record(&self, category: ErrorCategory, message: &str) {
        tracing::debug!(category = category.as_str(), "recording error: {message}");
        if let Err(err) = self.try_record(category, message).await {
            tracing::error!(
                category = category.as_str(),
                "failed to persist error log entry ({message}): {err}"
            );
        }
    }

    async fn try_record(&self, category: ErrorCategory, message: &str) -> Result<(), DbErr> {
        let log_tx = self.database.begin().await?;
        let active = ActiveModel {
            id: ActiveValue::NotSet,
            recorded_at: ActiveValue::Set(Utc::now()),
            category: ActiveValue::Set(category.as_str().to_string()),
            message: ActiveValue::Set(message.to_string()),
        };
        active.insert(&log_tx).await?;
        log_tx.commit().await
    }

    /// Most recent entries first, at most `limit`.
    pub async fn entries(&self, limit: u64) -> ResultEngine<Vec<ErrorLogEntry>> {
        let models = Entity::find()
            .order_by_desc(Column::Id)
            .limit(limit)
            .all(&self.database)
            .await?;
        models.into_iter().map(ErrorLogEntry::try_from).collect()
    }
}
