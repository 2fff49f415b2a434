//! Backend-neutral raw records.
//!
//! Both the relational store and the fixture catalog produce these rows.
//! The projector consumes nothing else, so the client contract does not
//! depend on which backend served the request.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the column listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRecord {
    /// Opaque column identifier.
    pub id: String,
    /// Display title.
    pub column_title: String,
    /// Storage key of the first page image, if any.
    pub first_img_file_name: Option<String>,
    /// Calendar publish date.
    pub publish_date: NaiveDate,
    /// Genre or category. Currently unpopulated in the seed data.
    pub genre: Option<String>,
}

/// One row of the detail join: a page image of a column, left-joined to
/// the column's text fragments.
///
/// A column with several text fragments yields one row per
/// (page, fragment) pair, so page filenames may repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Opaque column identifier.
    pub id: String,
    /// Display title.
    pub column_title: String,
    /// Storage key of the column's first page image.
    pub first_img_file_name: Option<String>,
    /// Calendar publish date.
    pub publish_date: NaiveDate,
    /// Genre or category.
    pub genre: Option<String>,
    /// Storage key of this page's image.
    pub page_img_file_name: String,
    /// Storage key of a text fragment, when the column has any.
    pub txt_file_name: Option<String>,
}

