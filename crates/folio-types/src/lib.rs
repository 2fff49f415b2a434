//! Shared type definitions for the Folio column catalog.
//!
//! This crate is the single source of truth for the records that flow
//! between the backends and the HTTP layer, and for the JSON shapes the
//! frontend consumes. Client-facing types are exported to `TypeScript`
//! via `ts-rs`.
//!
//! # Modules
//!
//! - [`enums`] -- Sort keys, image resolution modes, data-source labels
//! - [`records`] -- Backend-neutral raw rows (listing and detail join)
//! - [`responses`] -- Client-facing JSON bodies

pub mod enums;
pub mod records;
pub mod responses;

// Re-export all public types at crate root for convenience.
pub use enums::{
    DataSource, DataSourceMode, DatabaseHealth, ImageMode, ParseEnumError, SortDirection, SortField, SortKey,
};
pub use records::{ColumnRecord, PageRecord};
pub use responses::{
    AUTHOR_LABEL, ColumnDetail, ColumnListResponse, ColumnSummary, ErrorBody, HealthResponse,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the frontend.

    #[test]
    fn export_bindings() {
        // Files are written to `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::enums::SortKey::export_all();
        let _ = crate::enums::DataSource::export_all();
        let _ = crate::enums::DatabaseHealth::export_all();
        let _ = crate::responses::ColumnSummary::export_all();
        let _ = crate::responses::ColumnListResponse::export_all();
        let _ = crate::responses::ColumnDetail::export_all();
        let _ = crate::responses::ErrorBody::export_all();
        let _ = crate::responses::HealthResponse::export_all();
    }
}
