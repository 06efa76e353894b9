//! Product catalog: the product model, its repository, the searchable
//! listing, user settings, and the CSV import and export workflows.

pub mod listing;
pub mod product;
pub mod repository;
pub mod settings;
pub mod transfer;

pub use listing::ProductListing;
pub use product::{Currency, Product, ProductDetails, format_price};
pub use repository::{ExportCursor, InMemoryProductRepository, ProductRepository};
pub use settings::Settings;
pub use transfer::{
    ImportSummary, export_catalog, export_catalog_to_dir, import_catalog,
    import_catalog_from_path,
};
