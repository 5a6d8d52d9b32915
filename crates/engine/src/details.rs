//! Document details (line items).
//!
//! `item_sum` is kept exactly as supplied, including `None`; only the
//! aggregation into the parent's total treats a missing sum as zero.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::Money;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    pub id: i64,
    pub document_id: i64,
    pub item_name: String,
    pub item_sum: Option<Money>,
}

impl Detail {
    /// Contribution of this detail to the parent's total.
    #[must_use]
    pub fn contribution(&self) -> Money {
        self.item_sum.unwrap_or(Money::ZERO)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "document_details")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub document_id: i64,
    pub item_name: String,
    pub item_sum_minor: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::documents::Entity",
        from = "Column::DocumentId",
        to = "super::documents::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Documents,
}

impl Related<super::documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    /// New row for `document_id`; the id is assigned by the store.
    pub(crate) fn new_row(document_id: i64, item_name: String, item_sum: Option<Money>) -> Self {
        Self {
            id: ActiveValue::NotSet,
            document_id: ActiveValue::Set(document_id),
            item_name: ActiveValue::Set(item_name),
            item_sum_minor: ActiveValue::Set(item_sum.map(Money::minor)),
        }
    }
}

impl From<Model> for Detail {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            document_id: model.document_id,
            item_name: model.item_name,
            item_sum: model.item_sum_minor.map(Money::new),
        }
    }
}
