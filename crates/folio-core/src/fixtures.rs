//! Static fallback catalog.
//!
//! When the primary store is unavailable (and fallback is enabled) the
//! handlers serve from a [`FixtureCatalog`] instead. The catalog produces
//! the same [`ColumnRecord`] / [`PageRecord`] rows the relational store
//! does, so the projector cannot tell the two apart. Sorting uses the
//! same [`SortKey`] mapping the SQL `ORDER BY` is built from.
//!
//! Fixtures are either the built-in set or a YAML file:
//!
//! ```yaml
//! columns:
//!   - id: "1987-03-05"
//!     title: "Town Meeting"
//!     publish_date: 1987-03-05
//!     pages: ["1987-03-05_p1.png", "1987-03-05_p2.png"]
//!     text_files: ["1987-03-05.txt"]
//! texts:
//!   "1987-03-05.txt": "Full transcript..."
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use folio_types::{ColumnRecord, PageRecord, SortDirection, SortField, SortKey};
use serde::Deserialize;

use crate::config::ConfigError;
use crate::storage::MemoryObjectStore;

/// `column_type` value of entries hidden from the listing.
pub const COVER_COLUMN_TYPE: &str = "cover";

/// One fixture column with its pages and text fragments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FixtureColumn {
    /// Opaque column identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Calendar publish date.
    pub publish_date: NaiveDate,
    /// `column` or `cover`.
    #[serde(default)]
    pub column_type: Option<String>,
    /// Genre or category.
    #[serde(default)]
    pub genre: Option<String>,
    /// Page image keys in page order.
    #[serde(default)]
    pub pages: Vec<String>,
    /// Text fragment keys in listing order.
    #[serde(default)]
    pub text_files: Vec<String>,
}

impl FixtureColumn {
    fn is_cover(&self) -> bool {
        self.column_type.as_deref() == Some(COVER_COLUMN_TYPE)
    }

    fn record(&self) -> ColumnRecord {
        ColumnRecord {
            id: self.id.clone(),
            column_title: self.title.clone(),
            first_img_file_name: self.pages.first().cloned(),
            publish_date: self.publish_date,
            genre: self.genre.clone(),
        }
    }
}

/// In-memory catalog used when the primary store is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FixtureCatalog {
    /// All fixture columns, covers included.
    #[serde(default)]
    pub columns: Vec<FixtureColumn>,
    /// Text fragment bodies keyed by fragment key.
    #[serde(default)]
    pub texts: BTreeMap<String, String>,
}

impl FixtureCatalog {
    /// Load fixtures from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if it is not a valid fixture document.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse fixtures from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not a valid fixture
    /// document.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// The fixtures compiled into the binary.
    pub fn builtin() -> Self {
        let column = |id: &str, title: &str, date: (i32, u32, u32), pages: u32, texts: &[&str]| {
            FixtureColumn {
                id: id.to_owned(),
                title: title.to_owned(),
                publish_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2)
                    .unwrap_or_default(),
                column_type: Some(String::from("column")),
                genre: None,
                pages: (1..=pages).map(|p| format!("{id}_p{p}.png")).collect(),
                text_files: texts.iter().map(|t| (*t).to_owned()).collect(),
            }
        };

        let mut columns = vec![
            column("1986-11-20", "Snow Before Thanksgiving", (1986, 11, 20), 2, &["1986-11-20.txt"]),
            column(
                "1987-03-05",
                "Town Meeting Day",
                (1987, 3, 5),
                3,
                &["1987-03-05_a.txt", "1987-03-05_b.txt"],
            ),
            column("1987-06-11", "Black Flies", (1987, 6, 11), 1, &[]),
            column("1988-01-14", "A Woodstove Education", (1988, 1, 14), 2, &["1988-01-14.txt"]),
        ];
        columns.push(FixtureColumn {
            id: String::from("cover-1"),
            title: String::from("Collected Columns"),
            publish_date: NaiveDate::from_ymd_opt(1989, 1, 1).unwrap_or_default(),
            column_type: Some(COVER_COLUMN_TYPE.to_owned()),
            genre: None,
            pages: vec![String::from("cover.png")],
            text_files: Vec::new(),
        });

        let mut texts = BTreeMap::new();
        texts.insert(
            String::from("1986-11-20.txt"),
            String::from("The first snow came early this year, a week before the turkey."),
        );
        texts.insert(
            String::from("1987-03-05_a.txt"),
            String::from("Town meeting opened at nine sharp with the usual argument over the road budget."),
        );
        // 1987-03-05_b.txt is intentionally absent: a fragment that fails to load.
        texts.insert(
            String::from("1988-01-14.txt"),
            String::from("Nobody warns you that a woodstove has opinions."),
        );

        Self { columns, texts }
    }

    /// Listing rows: non-cover columns matching `genre`, ordered by `sort`.
    pub fn list_columns(&self, sort: SortKey, genre: Option<&str>) -> Vec<ColumnRecord> {
        let mut records: Vec<ColumnRecord> = self
            .columns
            .iter()
            .filter(|c| !c.is_cover())
            .filter(|c| genre.is_none_or(|g| c.genre.as_deref() == Some(g)))
            .map(FixtureColumn::record)
            .collect();
        sort_records(&mut records, sort);
        records
    }

    /// Detail rows for one column, shaped like the relational join: one
    /// row per (page, text fragment) pair in page order, or one row per
    /// page with no fragment when the column has none.
    ///
    /// Columns without pages yield no rows.
    pub fn column_pages(&self, id: &str) -> Vec<PageRecord> {
        let Some(column) = self.columns.iter().find(|c| c.id == id) else {
            return Vec::new();
        };

        let fragments: Vec<Option<&String>> = if column.text_files.is_empty() {
            vec![None]
        } else {
            column.text_files.iter().map(Some).collect()
        };

        column
            .pages
            .iter()
            .flat_map(|page| {
                fragments.iter().map(move |txt| PageRecord {
                    id: column.id.clone(),
                    column_title: column.title.clone(),
                    first_img_file_name: column.pages.first().cloned(),
                    publish_date: column.publish_date,
                    genre: column.genre.clone(),
                    page_img_file_name: page.clone(),
                    txt_file_name: txt.cloned(),
                })
            })
            .collect()
    }

    /// An object store holding the fixture text fragments.
    pub fn text_store(&self) -> MemoryObjectStore {
        self.texts
            .iter()
            .fold(MemoryObjectStore::new(), |store, (key, body)| {
                store.with_object(key.clone(), body.as_bytes().to_vec())
            })
    }
}

/// Order listing records by a sort key.
///
/// Ties on the sort field are broken by identifier ascending, matching
/// the secondary `ORDER BY column_id` of the relational query.
pub fn sort_records(records: &mut [ColumnRecord], sort: SortKey) {
    records.sort_by(|a, b| compare_records(a, b, sort));
}

fn compare_records(a: &ColumnRecord, b: &ColumnRecord, sort: SortKey) -> Ordering {
    let primary = match sort.field() {
        SortField::Title => a.column_title.cmp(&b.column_title),
        SortField::PublishDate => a.publish_date.cmp(&b.publish_date),
    };
    let primary = match sort.direction() {
        SortDirection::Asc => primary,
        SortDirection::Desc => primary.reverse(),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}
