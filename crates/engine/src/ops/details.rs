use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*,
};

use crate::{
    Detail, DetailInput, EngineError, Money, ResultEngine, details, documents,
    util::{adjust_total, normalize_required},
};

use super::{Engine, documents::require_document, with_tx};

impl Engine {
    /// Appends a detail to a document.
    ///
    /// The document total grows by the detail's sum (zero if missing); the
    /// other details are never read.
    pub async fn add_detail(&self, document_id: i64, input: DetailInput) -> ResultEngine<Detail> {
        let result = with_tx!(self, |db_tx| append_detail(&db_tx, document_id, input));
        self.reported("add_detail", result).await
    }

    /// Removes a detail, subtracting its sum from the document total.
    pub async fn remove_detail(&self, document_id: i64, detail_id: i64) -> ResultEngine<()> {
        let result = with_tx!(self, |db_tx| drop_detail(&db_tx, document_id, detail_id));
        self.reported("remove_detail", result).await
    }

    /// Overwrites name and sum of a detail.
    ///
    /// The document total moves by `new sum - old sum`.
    pub async fn update_detail(
        &self,
        document_id: i64,
        detail_id: i64,
        input: DetailInput,
    ) -> ResultEngine<Detail> {
        let result = with_tx!(self, |db_tx| rewrite_detail(
            &db_tx,
            document_id,
            detail_id,
            input
        ));
        self.reported("update_detail", result).await
    }

    /// A single detail of an existing document.
    pub async fn detail(&self, document_id: i64, detail_id: i64) -> ResultEngine<Detail> {
        let result = find_detail(&self.database, document_id, detail_id).await;
        self.reported("detail", result).await
    }
}

async fn find_detail<C>(db: &C, document_id: i64, detail_id: i64) -> ResultEngine<Detail>
where
    C: ConnectionTrait,
{
    require_document(db, document_id).await?;
    let model = require_owned_detail(db, document_id, detail_id).await?;
    Ok(Detail::from(model))
}

async fn require_owned_detail<C>(
    db: &C,
    document_id: i64,
    detail_id: i64,
) -> ResultEngine<details::Model>
where
    C: ConnectionTrait,
{
    details::Entity::find_by_id(detail_id)
        .filter(details::Column::DocumentId.eq(document_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::DetailNotFound(detail_id.to_string()))
}

async fn store_total(
    db_tx: &DatabaseTransaction,
    document_id: i64,
    total_sum: Money,
) -> ResultEngine<()> {
    let active = documents::ActiveModel {
        id: ActiveValue::Set(document_id),
        total_sum_minor: ActiveValue::Set(total_sum.minor()),
        ..Default::default()
    };
    active.update(db_tx).await?;
    Ok(())
}

async fn append_detail(
    db_tx: &DatabaseTransaction,
    document_id: i64,
    input: DetailInput,
) -> ResultEngine<Detail> {
    let document = require_document(db_tx, document_id).await?;
    let item_name = normalize_required(&input.item_name, "item name")?;
    let total_sum = adjust_total(
        Money::new(document.total_sum_minor),
        input.item_sum.unwrap_or(Money::ZERO),
        Money::ZERO,
    )?;

    let model = details::ActiveModel::new_row(document_id, item_name, input.item_sum)
        .insert(db_tx)
        .await?;
    store_total(db_tx, document_id, total_sum).await?;

    tracing::debug!(document_id, detail_id = model.id, "detail added");
    Ok(Detail::from(model))
}

async fn drop_detail(
    db_tx: &DatabaseTransaction,
    document_id: i64,
    detail_id: i64,
) -> ResultEngine<()> {
    let document = require_document(db_tx, document_id).await?;
    let existing = Detail::from(require_owned_detail(db_tx, document_id, detail_id).await?);
    let total_sum = adjust_total(
        Money::new(document.total_sum_minor),
        Money::ZERO,
        existing.contribution(),
    )?;

    details::Entity::delete_by_id(detail_id).exec(db_tx).await?;
    store_total(db_tx, document_id, total_sum).await?;

    tracing::debug!(document_id, detail_id, "detail removed");
    Ok(())
}

async fn rewrite_detail(
    db_tx: &DatabaseTransaction,
    document_id: i64,
    detail_id: i64,
    input: DetailInput,
) -> ResultEngine<Detail> {
    let document = require_document(db_tx, document_id).await?;
    let model = require_owned_detail(db_tx, document_id, detail_id).await?;
    let item_name = normalize_required(&input.item_name, "item name")?;
    let previous = Detail::from(model.clone()).contribution();
    let total_sum = adjust_total(
        Money::new(document.total_sum_minor),
        input.item_sum.unwrap_or(Money::ZERO),
        previous,
    )?;

    let mut active: details::ActiveModel = model.into();
    active.item_name = ActiveValue::Set(item_name);
    active.item_sum_minor = ActiveValue::Set(input.item_sum.map(Money::minor));
    let updated = active.update(db_tx).await?;
    store_total(db_tx, document_id, total_sum).await?;

    tracing::debug!(document_id, detail_id, "detail updated");
    Ok(Detail::from(updated))
}
