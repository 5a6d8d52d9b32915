use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder,
    SqlErr, TransactionTrait, prelude::*,
};

use crate::{
    CreateDocumentCmd, DetailInput, Document, EngineError, Money, ResultEngine,
    UpdateDocumentCmd, details, documents,
    util::{normalize_optional_text, normalize_required, overflow},
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a document together with its initial details.
    ///
    /// `total_sum` starts as the sum of the supplied details (missing sums
    /// count as zero) and a missing `doc_date` becomes the current time.
    ///
    /// Fails with [`EngineError::DuplicateKey`] if the number is taken.
    pub async fn create_document(&self, cmd: CreateDocumentCmd) -> ResultEngine<Document> {
        let result = with_tx!(self, |db_tx| insert_document(&db_tx, cmd));
        self.reported("create_document", result).await
    }

    /// Updates number, date and notes of a document.
    ///
    /// When `cmd.details` is present the detail collection is replaced
    /// wholesale and `total_sum` recomputed from the new details only.
    /// Otherwise details and total stay as they are.
    pub async fn update_document(
        &self,
        document_id: i64,
        cmd: UpdateDocumentCmd,
    ) -> ResultEngine<Document> {
        let result = with_tx!(self, |db_tx| rewrite_document(&db_tx, document_id, cmd));
        self.reported("update_document", result).await
    }

    /// Deletes a document and all of its details.
    pub async fn delete_document(&self, document_id: i64) -> ResultEngine<()> {
        let result = with_tx!(self, |db_tx| remove_document(&db_tx, document_id));
        self.reported("delete_document", result).await
    }

    /// All documents with their details, ordered by id.
    pub async fn documents(&self) -> ResultEngine<Vec<Document>> {
        let result = load_documents(&self.database, None).await;
        self.reported("documents", result).await
    }

    /// A single document with its details.
    pub async fn document_with_details(&self, document_id: i64) -> ResultEngine<Document> {
        let filter = Condition::all().add(documents::Column::Id.eq(document_id));
        let result = load_documents(&self.database, Some(filter))
            .await
            .and_then(|found| {
                found
                    .into_iter()
                    .next()
                    .ok_or_else(|| document_not_found(document_id))
            });
        self.reported("document_with_details", result).await
    }

    /// Looks a document up by its business key.
    pub async fn document_by_number(&self, doc_number: &str) -> ResultEngine<Document> {
        let doc_number = doc_number.trim();
        let filter = Condition::all().add(documents::Column::DocNumber.eq(doc_number));
        let result = load_documents(&self.database, Some(filter))
            .await
            .and_then(|found| {
                found
                    .into_iter()
                    .next()
                    .ok_or_else(|| EngineError::NotFound(doc_number.to_string()))
            });
        self.reported("document_by_number", result).await
    }
}

pub(super) fn document_not_found(document_id: i64) -> EngineError {
    EngineError::NotFound(document_id.to_string())
}

pub(super) async fn require_document<C>(db: &C, document_id: i64) -> ResultEngine<documents::Model>
where
    C: ConnectionTrait,
{
    documents::Entity::find_by_id(document_id)
        .one(db)
        .await?
        .ok_or_else(|| document_not_found(document_id))
}

/// Loads documents with their details in one joined query, details in id
/// order.
async fn load_documents<C>(db: &C, filter: Option<Condition>) -> ResultEngine<Vec<Document>>
where
    C: ConnectionTrait,
{
    let mut query = documents::Entity::find();
    if let Some(filter) = filter {
        query = query.filter(filter);
    }
    let rows = query
        .find_with_related(details::Entity)
        .order_by_asc(documents::Column::Id)
        .order_by_asc(details::Column::Id)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(model, detail_models)| Document::from_models(model, detail_models))
        .collect())
}

/// Maps a unique violation raised while writing `doc_number` to the number
/// itself. The store has the last word when a concurrent writer took the
/// number after the pre-check.
fn number_conflict(doc_number: &str) -> impl FnOnce(DbErr) -> EngineError + '_ {
    move |err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            EngineError::DuplicateKey(doc_number.to_string())
        }
        _ => EngineError::from(err),
    }
}

/// Whether `doc_number` belongs to a document other than `except`.
async fn doc_number_taken(
    db_tx: &DatabaseTransaction,
    doc_number: &str,
    except: Option<i64>,
) -> ResultEngine<bool> {
    let mut query =
        documents::Entity::find().filter(documents::Column::DocNumber.eq(doc_number));
    if let Some(document_id) = except {
        query = query.filter(documents::Column::Id.ne(document_id));
    }
    Ok(query.one(db_tx).await?.is_some())
}

fn normalize_details(inputs: Vec<DetailInput>) -> ResultEngine<Vec<DetailInput>> {
    inputs
        .into_iter()
        .map(|input| {
            Ok(DetailInput {
                item_name: normalize_required(&input.item_name, "item name")?,
                item_sum: input.item_sum,
            })
        })
        .collect()
}

fn details_total(inputs: &[DetailInput]) -> ResultEngine<Money> {
    Money::sum_present(inputs.iter().map(|input| input.item_sum))
        .ok_or_else(|| overflow("total sum"))
}

async fn insert_details(
    db_tx: &DatabaseTransaction,
    document_id: i64,
    inputs: Vec<DetailInput>,
) -> ResultEngine<Vec<details::Model>> {
    let mut out = Vec::with_capacity(inputs.len());
    for input in inputs {
        let active = details::ActiveModel::new_row(document_id, input.item_name, input.item_sum);
        out.push(active.insert(db_tx).await?);
    }
    Ok(out)
}

async fn insert_document(
    db_tx: &DatabaseTransaction,
    cmd: CreateDocumentCmd,
) -> ResultEngine<Document> {
    let doc_number = normalize_required(&cmd.doc_number, "doc number")?;
    let inputs = normalize_details(cmd.details)?;
    let total_sum = details_total(&inputs)?;

    if doc_number_taken(db_tx, &doc_number, None).await? {
        return Err(EngineError::DuplicateKey(doc_number));
    }

    let active = documents::ActiveModel {
        id: ActiveValue::NotSet,
        doc_number: ActiveValue::Set(doc_number.clone()),
        doc_date: ActiveValue::Set(cmd.doc_date.unwrap_or_else(Utc::now)),
        total_sum_minor: ActiveValue::Set(total_sum.minor()),
        notes: ActiveValue::Set(normalize_optional_text(cmd.notes.as_deref())),
    };
    let model = active
        .insert(db_tx)
        .await
        .map_err(number_conflict(&doc_number))?;
    let detail_models = insert_details(db_tx, model.id, inputs).await?;

    tracing::debug!(
        document_id = model.id,
        details = detail_models.len(),
        "document created"
    );
    Ok(Document::from_models(model, detail_models))
}

async fn rewrite_document(
    db_tx: &DatabaseTransaction,
    document_id: i64,
    cmd: UpdateDocumentCmd,
) -> ResultEngine<Document> {
    let existing = require_document(db_tx, document_id).await?;
    let doc_number = normalize_required(&cmd.doc_number, "doc number")?;

    if doc_number != existing.doc_number
        && doc_number_taken(db_tx, &doc_number, Some(document_id)).await?
    {
        return Err(EngineError::DuplicateKey(doc_number));
    }

    let replacement = cmd.details.map(normalize_details).transpose()?;

    let mut active: documents::ActiveModel = existing.into();
    active.doc_number = ActiveValue::Set(doc_number.clone());
    active.doc_date = ActiveValue::Set(cmd.doc_date.unwrap_or_else(Utc::now));
    active.notes = ActiveValue::Set(normalize_optional_text(cmd.notes.as_deref()));
    if let Some(inputs) = &replacement {
        active.total_sum_minor = ActiveValue::Set(details_total(inputs)?.minor());
        details::Entity::delete_many()
            .filter(details::Column::DocumentId.eq(document_id))
            .exec(db_tx)
            .await?;
    }
    let model = active
        .update(db_tx)
        .await
        .map_err(number_conflict(&doc_number))?;

    let detail_models = match replacement {
        Some(inputs) => insert_details(db_tx, document_id, inputs).await?,
        None => {
            details::Entity::find()
                .filter(details::Column::DocumentId.eq(document_id))
                .order_by_asc(details::Column::Id)
                .all(db_tx)
                .await?
        }
    };

    tracing::debug!(document_id, "document updated");
    Ok(Document::from_models(model, detail_models))
}

async fn remove_document(db_tx: &DatabaseTransaction, document_id: i64) -> ResultEngine<()> {
    require_document(db_tx, document_id).await?;

    details::Entity::delete_many()
        .filter(details::Column::DocumentId.eq(document_id))
        .exec(db_tx)
        .await?;
    documents::Entity::delete_by_id(document_id)
        .exec(db_tx)
        .await?;

    tracing::debug!(document_id, "document deleted");
    Ok(())
}
