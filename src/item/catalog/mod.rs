//! Items connecting the catalog repository to batch steps.
//!
//! - [`catalog_reader::ProductExportReader`] yields the export cursor rows.
//! - [`record_mapper::ProductRecordMapper`] turns imported CSV records into products.
//! - [`catalog_writer::ProductItemWriter`] inserts products into a repository.

pub mod catalog_reader;

pub mod catalog_writer;

pub mod record_mapper;
