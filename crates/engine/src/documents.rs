//! Documents (master records).
//!
//! A [`Document`] owns an ordered list of [`Detail`]s and carries
//! `total_sum`, which always equals the sum of its details' `item_sum`
//! (missing sums count as zero).

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{Detail, Money};

use super::details;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub doc_number: String,
    pub doc_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub total_sum: Money,
    pub details: Vec<Detail>,
}

impl Document {
    /// Sum of the current details, recomputed from scratch.
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub fn details_sum(&self) -> Option<Money> {
        Money::sum_present(self.details.iter().map(|detail| detail.item_sum))
    }

    pub(crate) fn from_models(model: Model, details: Vec<details::Model>) -> Self {
        Self {
            id: model.id,
            doc_number: model.doc_number,
            doc_date: model.doc_date,
            notes: model.notes,
            total_sum: Money::new(model.total_sum_minor),
            details: details.into_iter().map(Detail::from).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub doc_number: String,
    pub doc_date: DateTimeUtc,
    pub total_sum_minor: i64,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::details::Entity")]
    Details,
}

impl Related<super::details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Details.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
