use std::{cell::RefCell, vec::IntoIter};

use crate::{
    catalog::repository::ExportCursor,
    core::item::{ItemReader, ItemReaderResult},
    item::csv::NullableCsvRecord,
};

/// Reads the rows of an [`ExportCursor`], one record per call.
///
/// The column names are not returned as an item; hand them to the writer as
/// its header record.
pub struct ProductExportReader {
    columns: Vec<String>,
    rows: RefCell<IntoIter<NullableCsvRecord>>,
}

impl ProductExportReader {
    pub fn new(cursor: ExportCursor) -> Self {
        let columns = cursor.column_names().to_vec();
        Self {
            columns,
            rows: RefCell::new(cursor.into_rows().into_iter()),
        }
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }
}

impl ItemReader<NullableCsvRecord> for ProductExportReader {
    fn read(&self) -> ItemReaderResult<NullableCsvRecord> {
        Ok(self.rows.borrow_mut().next())
    }
}
