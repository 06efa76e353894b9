use std::cell::Cell;

use log::{debug, warn};

use crate::{
    catalog::{product::Product, repository::ProductRepository},
    core::item::{ItemWriter, ItemWriterResult},
};

/// Inserts products into a [`ProductRepository`].
///
/// Products whose id already exists are ignored by the repository; they are
/// counted in [`ProductItemWriter::ignored_count`].
pub struct ProductItemWriter<'a> {
    repository: &'a dyn ProductRepository,
    inserted: Cell<usize>,
    ignored: Cell<usize>,
}

impl<'a> ProductItemWriter<'a> {
    pub fn new(repository: &'a dyn ProductRepository) -> Self {
        Self {
            repository,
            inserted: Cell::new(0),
            ignored: Cell::new(0),
        }
    }

    pub fn inserted_count(&self) -> usize {
        self.inserted.get()
    }

    pub fn ignored_count(&self) -> usize {
        self.ignored.get()
    }
}

impl ItemWriter<Product> for ProductItemWriter<'_> {
    fn write(&self, items: &[Product]) -> ItemWriterResult {
        for product in items {
            match self.repository.add_product(product.clone()) {
                Some(id) => {
                    debug!("Inserted product {}: {}", id, product.name);
                    self.inserted.set(self.inserted.get() + 1);
                }
                None => {
                    warn!("Product {} already exists, ignored", product.id);
                    self.ignored.set(self.ignored.get() + 1);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ProductItemWriter;
    use crate::{
        catalog::{
            product::{Currency, Product},
            repository::{InMemoryProductRepository, ProductRepository},
        },
        core::item::ItemWriter,
    };

    fn product(id: i32) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            description: String::new(),
            cost: 1.0,
            profit_rate: 0,
            price: 1.0,
            currency: Currency::Lbp,
        }
    }

    #[test]
    fn writer_should_insert_and_count_duplicates() {
        let repository = InMemoryProductRepository::new();
        let writer = ProductItemWriter::new(&repository);

        writer.write(&[product(1), product(2), product(1)]).unwrap();

        assert_eq!(writer.inserted_count(), 2);
        assert_eq!(writer.ignored_count(), 1);
        assert_eq!(repository.all_products().len(), 2);
    }
}
