//! Command structs for engine operations.
//!
//! These types group the inputs of the write operations on documents and
//! details, keeping call sites readable.

use chrono::{DateTime, Utc};

use crate::Money;

/// Name and sum of a detail, used both to create a detail and to overwrite
/// an existing one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailInput {
    pub item_name: String,
    pub item_sum: Option<Money>,
}

impl DetailInput {
    #[must_use]
    pub fn new(item_name: impl Into<String>, item_sum: Money) -> Self {
        Self {
            item_name: item_name.into(),
            item_sum: Some(item_sum),
        }
    }

    /// A detail without a sum; it counts as zero towards the total.
    #[must_use]
    pub fn unpriced(item_name: impl Into<String>) -> Self {
        Self {
            item_name: item_name.into(),
            item_sum: None,
        }
    }
}

/// Create a document, optionally with its initial details.
#[derive(Clone, Debug)]
pub struct CreateDocumentCmd {
    pub doc_number: String,
    /// Defaults to the creation time.
    pub doc_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub details: Vec<DetailInput>,
}

impl CreateDocumentCmd {
    #[must_use]
    pub fn new(doc_number: impl Into<String>) -> Self {
        Self {
            doc_number: doc_number.into(),
            doc_date: None,
            notes: None,
            details: Vec::new(),
        }
    }

    #[must_use]
    pub fn doc_date(mut self, doc_date: DateTime<Utc>) -> Self {
        self.doc_date = Some(doc_date);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn detail(mut self, detail: DetailInput) -> Self {
        self.details.push(detail);
        self
    }
}

/// Update a document.
///
/// `doc_date` and `notes` are always applied (a missing date becomes "now",
/// missing notes clear the stored ones). When `details` is `Some`, the whole
/// detail collection is replaced; when `None`, details and total are kept.
#[derive(Clone, Debug)]
pub struct UpdateDocumentCmd {
    pub doc_number: String,
    pub doc_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub details: Option<Vec<DetailInput>>,
}

impl UpdateDocumentCmd {
    #[must_use]
    pub fn new(doc_number: impl Into<String>) -> Self {
        Self {
            doc_number: doc_number.into(),
            doc_date: None,
            notes: None,
            details: None,
        }
    }

    #[must_use]
    pub fn doc_date(mut self, doc_date: DateTime<Utc>) -> Self {
        self.doc_date = Some(doc_date);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn replace_details(mut self, details: Vec<DetailInput>) -> Self {
        self.details = Some(details);
        self
    }
}
