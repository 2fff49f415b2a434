//! Listing and detail queries against the column catalog.
//!
//! Only two queries exist. The listing filters out cover entries,
//! optionally filters by genre, and orders by one of the closed
//! [`SortKey`]s. The detail joins a column to its page images (inner)
//! and text fragments (left), ordered by page so the projector can take
//! row order as page order.

use chrono::NaiveDate;
use folio_types::{ColumnRecord, PageRecord, SortKey};
use sqlx::PgPool;

use crate::error::DbError;

/// Detail join: one row per (page image, text fragment) pair.
const COLUMN_PAGES_QUERY: &str = r"SELECT
    cmd.column_id AS id,
    cmd.column_title,
    cmd.first_img_file_name,
    cmd.publish_date,
    cmd.genre,
    pi.img_file_name AS page_img_file_name,
    ptf.txt_file_name
  FROM columns_meta_data AS cmd
  INNER JOIN page_images AS pi
    ON cmd.column_id = pi.column_id
  LEFT JOIN page_text_files AS ptf
    ON cmd.column_id = ptf.column_id
  WHERE cmd.column_id = $1
  ORDER BY pi.page_type, pi.page_id, ptf.text_id";

/// Build the listing query for a sort key.
///
/// The `ORDER BY` identifiers come from [`SortKey`]'s fixed mapping, never
/// from request text. Ties are broken by `column_id` so the order is
/// deterministic. Text compares under the `"C"` collation to match the
/// byte order of the fixture catalog.
pub fn listing_query(sort: SortKey) -> String {
    format!(
        r#"SELECT
    column_id AS id,
    column_title,
    first_img_file_name,
    publish_date,
    genre
  FROM columns_meta_data
  WHERE column_type IS DISTINCT FROM 'cover'
    AND ($1::text IS NULL OR genre = $1)
  ORDER BY {} {}, column_id COLLATE "C" ASC"#,
        sort.field().sql_sort_expr(),
        sort.direction().sql_keyword(),
    )
}

/// A row from the listing query.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ColumnRow {
    /// Column identifier.
    pub id: String,
    /// Display title.
    pub column_title: String,
    /// Storage key of the first page image.
    pub first_img_file_name: Option<String>,
    /// Publish date.
    pub publish_date: NaiveDate,
    /// Genre, if populated.
    pub genre: Option<String>,
}

impl From<ColumnRow> for ColumnRecord {
    fn from(row: ColumnRow) -> Self {
        Self {
            id: row.id,
            column_title: row.column_title,
            first_img_file_name: row.first_img_file_name,
            publish_date: row.publish_date,
            genre: row.genre,
        }
    }
}

/// A row from the detail join.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PageRow {
    /// Column identifier.
    pub id: String,
    /// Display title.
    pub column_title: String,
    /// Storage key of the column's first page image.
    pub first_img_file_name: Option<String>,
    /// Publish date.
    pub publish_date: NaiveDate,
    /// Genre, if populated.
    pub genre: Option<String>,
    /// Storage key of this page's image.
    pub page_img_file_name: String,
    /// Storage key of a text fragment, if the column has any.
    pub txt_file_name: Option<String>,
}

impl From<PageRow> for PageRecord {
    fn from(row: PageRow) -> Self {
        Self {
            id: row.id,
            column_title: row.column_title,
            first_img_file_name: row.first_img_file_name,
            publish_date: row.publish_date,
            genre: row.genre,
            page_img_file_name: row.page_img_file_name,
            txt_file_name: row.txt_file_name,
        }
    }
}

/// Read-only operations on `columns_meta_data`, `page_images`, and
/// `page_text_files`.
#[derive(Debug, Clone, Copy)]
pub struct CatalogStore<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogStore<'a> {
    /// Create a new catalog store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List non-cover columns, optionally restricted to one genre.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list_columns(
        &self,
        sort: SortKey,
        genre: Option<&str>,
    ) -> Result<Vec<ColumnRecord>, DbError> {
        let sql = listing_query(sort);
        let rows = sqlx::query_as::<_, ColumnRow>(&sql)
            .bind(genre)
            .fetch_all(self.pool)
            .await?;

        tracing::debug!(sort = %sort, genre, count = rows.len(), "Listed columns");

        Ok(rows.into_iter().map(ColumnRecord::from).collect())
    }

    /// Fetch the page rows of one column in page order.
    ///
    /// An unknown column, or a column without page images, yields an
    /// empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn column_pages(&self, column_id: &str) -> Result<Vec<PageRecord>, DbError> {
        let rows = sqlx::query_as::<_, PageRow>(COLUMN_PAGES_QUERY)
            .bind(column_id)
            .fetch_all(self.pool)
            .await?;

        tracing::debug!(column_id, count = rows.len(), "Fetched column pages");

        Ok(rows.into_iter().map(PageRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_query_orders_by_whitelisted_columns() {
        let sql = listing_query(SortKey::TitleDesc);
        assert!(sql.contains(r#"ORDER BY column_title COLLATE "C" DESC, column_id COLLATE "C" ASC"#));

        let sql = listing_query(SortKey::PublishDateAsc);
        assert!(sql.contains(r#"ORDER BY publish_date ASC, column_id COLLATE "C" ASC"#));
    }

    #[test]
    fn listing_query_excludes_covers_and_binds_genre() {
        let sql = listing_query(SortKey::default());
        assert!(sql.contains("column_type IS DISTINCT FROM 'cover'"));
        assert!(sql.contains("$1::text IS NULL OR genre = $1"));
    }

    #[test]
    fn detail_query_orders_by_page() {
        assert!(COLUMN_PAGES_QUERY.contains("INNER JOIN page_images"));
        assert!(COLUMN_PAGES_QUERY.contains("LEFT JOIN page_text_files"));
        assert!(COLUMN_PAGES_QUERY.ends_with("ORDER BY pi.page_type, pi.page_id, ptf.text_id"));
    }

    #[test]
    fn rows_convert_to_records() {
        let date = NaiveDate::from_ymd_opt(1987, 3, 5).unwrap_or_default();
        let record = PageRecord::from(PageRow {
            id: String::from("c1"),
            column_title: String::from("Town Meeting"),
            first_img_file_name: Some(String::from("p1.png")),
            publish_date: date,
            genre: None,
            page_img_file_name: String::from("p2.png"),
            txt_file_name: None,
        });
        assert_eq!(record.page_img_file_name, "p2.png");
        assert_eq!(record.first_img_file_name.as_deref(), Some("p1.png"));
        assert_eq!(record.column_title, "Town Meeting");
    }
}
