#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # Product Catalog Batch

 A small product catalog with CSV import and export, built on a
 chunk-oriented batch core.

 ## Core Concepts

- **Job:** Represents the entire batch process. A `Job` is composed of one or more `Step`s.
- **Step:** A sequential phase of a job. A chunk-oriented `Step` reads items, processes them and writes them out, one chunk at a time.
- **ItemReader:** Retrieves the input of a `Step`, one item at a time.
- **ItemProcessor:** Turns an item read by the `ItemReader` into the item handed to the `ItemWriter`.
- **ItemWriter:** Writes the output of a `Step`, one chunk of items at a time.

 ## Catalog

- **ProductRepository:** Stores products. The application constructs it and passes it by reference; there is no global instance.
- **ProductListing:** A pollable, searchable snapshot of the products.
- **Settings:** Default profit rate and currency for new products, and the dollar to LBP rate.
- **Import / export:** The catalog is exported as a fully quoted CSV file and imported back from one. An import replaces the whole catalog.

 ## Getting Started

```rust
# use product_catalog_batch::{
#     BatchError,
#     catalog::{Currency, InMemoryProductRepository, Product, ProductRepository, export_catalog, import_catalog},
# };
fn main() -> Result<(), BatchError> {
    let repository = InMemoryProductRepository::new();
    repository.add_product(Product {
        id: 1,
        name: "Olive soap".to_string(),
        description: "Bar, 100g".to_string(),
        cost: 1.5,
        profit_rate: 20,
        price: 1.8,
        currency: Currency::Dollar,
    });

    let mut csv: Vec<u8> = Vec::new();
    assert_eq!(export_catalog(&repository, &mut csv)?, 1);

    let restored = InMemoryProductRepository::new();
    let summary = import_catalog(&restored, csv.as_slice())?;

    assert!(summary.is_imported());
    assert_eq!(restored.all_products(), repository.all_products());

    Ok(())
}
```
 */

/// Core module for batch operations
pub mod core;

/// Error types for batch operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Set of item readers / writers (csv files, catalog repository)
pub mod item;

/// Product catalog model, repository, settings and import / export workflows
pub mod catalog;
