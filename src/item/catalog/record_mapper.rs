use std::cell::Cell;

use log::warn;

use crate::{
    BatchError,
    catalog::product::{Currency, Product, parse_lenient},
    core::item::{ItemProcessor, ItemProcessorResult},
    error::CatalogError,
    item::csv::CsvRecord,
};

/// Maps an imported CSV record to a [`Product`].
///
/// Columns are positional: id, name, description, cost, profitRate, price,
/// currency. The header text is never consulted. Extra trailing fields are
/// ignored; a missing field or a malformed value is an error.
#[derive(Default)]
pub struct ProductRecordMapper {
    mapped: Cell<usize>,
}

impl ProductRecordMapper {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(record: &[String]) -> Result<Product, CatalogError> {
        Ok(Product {
            id: parse_int(field(record, 0, "id")?, "id")?,
            name: field(record, 1, "name")?.to_string(),
            description: field(record, 2, "description")?.to_string(),
            cost: parse_decimal(field(record, 3, "cost")?, "cost")?,
            profit_rate: parse_int(field(record, 4, "profitRate")?, "profitRate")?,
            price: parse_decimal(field(record, 5, "price")?, "price")?,
            currency: field(record, 6, "currency")?.parse::<Currency>()?,
        })
    }
}

impl ItemProcessor<CsvRecord, Product> for ProductRecordMapper {
    fn process(&self, item: &CsvRecord) -> ItemProcessorResult<Product> {
        let position = self.mapped.get() + 1;
        self.mapped.set(position);

        Self::map(item).map_err(|error| {
            warn!("Data record {} rejected: {}", position, error);
            BatchError::from(error)
        })
    }
}

fn field<'r>(record: &'r [String], index: usize, column: &'static str) -> Result<&'r str, CatalogError> {
    record
        .get(index)
        .map(String::as_str)
        .ok_or(CatalogError::MissingField(column))
}

fn parse_int(value: &str, column: &'static str) -> Result<i32, CatalogError> {
    value.parse::<i32>().map_err(|_| CatalogError::InvalidNumber {
        column,
        value: value.to_string(),
    })
}

fn parse_decimal(value: &str, column: &'static str) -> Result<f64, CatalogError> {
    parse_lenient(value).ok_or_else(|| CatalogError::InvalidNumber {
        column,
        value: value.to_string(),
    })
}
