use log::debug;

use super::{product::Product, repository::ProductRepository};

/// The product list shown to the user, filtered by a search query.
///
/// Instead of subscribing to live query results, callers `poll` the listing:
/// it re-queries the repository only when the query or the repository's
/// revision changed since the last poll.
#[derive(Debug, Default)]
pub struct ProductListing {
    search_query: String,
    last_revision: Option<u64>,
    products: Vec<Product>,
}

impl ProductListing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Changes the query; the next poll refreshes the products.
    pub fn update_search_query(&mut self, search_query: &str) {
        if self.search_query != search_query {
            self.search_query = search_query.to_string();
            self.last_revision = None;
        }
    }

    /// The products as of the last poll.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Refreshes the snapshot if anything changed.
    ///
    /// # Returns
    /// `Some(products)` with the new snapshot, or `None` when it is unchanged.
    pub fn poll(&mut self, repository: &dyn ProductRepository) -> Option<&[Product]> {
        let revision = repository.revision();
        if self.last_revision == Some(revision) {
            return None;
        }

        self.products = if self.search_query.trim().is_empty() {
            repository.all_products()
        } else {
            repository.search_products(&self.search_query)
        };
        self.last_revision = Some(revision);
        debug!(
            "Listing refreshed at revision {}: {} products",
            revision,
            self.products.len()
        );

        Some(&self.products)
    }
}

#[cfg(test)]
mod tests {
    use super::ProductListing;
    use crate::catalog::{
        product::{Currency, Product},
        repository::{InMemoryProductRepository, ProductRepository},
    };

    fn product(id: i32, name: &str) -> Product {
        Product {
            id,
            name: name.to_string(),
            description: String::new(),
            cost: 1.0,
            profit_rate: 0,
            price: 1.0,
            currency: Currency::Dollar,
        }
    }

    #[test]
    fn poll_should_report_changes_only() {
        let repository = InMemoryProductRepository::new();
        repository.add_product(product(1, "Soap"));
        let mut listing = ProductListing::new();

        assert_eq!(listing.poll(&repository).map(|p| p.len()), Some(1));
        assert!(listing.poll(&repository).is_none());

        repository.add_product(product(2, "Apple"));
        let names: Vec<&str> = listing
            .poll(&repository)
            .unwrap()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Apple", "Soap"]);
    }

    #[test]
    fn search_query_should_filter_products() {
        let repository = InMemoryProductRepository::new();
        repository.add_product(product(1, "Soap"));
        repository.add_product(product(2, "Apple"));
        let mut listing = ProductListing::new();
        listing.poll(&repository);

        listing.update_search_query("app");
        assert_eq!(listing.poll(&repository).map(|p| p.len()), Some(1));
        assert_eq!(listing.products()[0].name, "Apple");

        listing.update_search_query("  ");
        assert_eq!(listing.poll(&repository).map(|p| p.len()), Some(2));
        assert_eq!(listing.search_query(), "  ");
    }
}
