pub mod mocks;

#[allow(unused_imports)]
pub use mocks::{MockFile, full_disk_file};

use product_catalog_batch::catalog::{
    Currency, InMemoryProductRepository, Product, ProductRepository,
};

/// A catalog exercising quoting: separators, quotes and line breaks in text fields.
#[allow(dead_code)]
pub fn sample_products() -> Vec<Product> {
    vec![
        Product {
            id: 1,
            name: "Olive soap".to_string(),
            description: "Bar, 100g".to_string(),
            cost: 1.5,
            profit_rate: 20,
            price: 1.8,
            currency: Currency::Dollar,
        },
        Product {
            id: 2,
            name: "Za'atar".to_string(),
            description: "The \"good\" one\nfrom the mountains".to_string(),
            cost: 150000.0,
            profit_rate: 10,
            price: 165000.0,
            currency: Currency::Lbp,
        },
        Product {
            id: 5,
            name: "Apricot jam".to_string(),
            description: String::new(),
            cost: 2.25,
            profit_rate: 0,
            price: 2.25,
            currency: Currency::Dollar,
        },
    ]
}

#[allow(dead_code)]
pub fn sample_repository() -> InMemoryProductRepository {
    let repository = InMemoryProductRepository::new();
    for product in sample_products() {
        repository.add_product(product);
    }
    repository
}
