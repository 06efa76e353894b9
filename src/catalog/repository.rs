use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
};

use log::debug;

use crate::item::csv::NullableCsvRecord;

use super::product::{Product, format_decimal};

/// Column names of the export cursor, in export order.
pub const EXPORT_COLUMNS: [&str; 7] = [
    "id",
    "name",
    "description",
    "cost",
    "profitRate",
    "price",
    "currency",
];

/// One-shot snapshot of the catalog, stringified for export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportCursor {
    columns: Vec<String>,
    rows: Vec<NullableCsvRecord>,
}

impl ExportCursor {
    pub fn new(columns: Vec<String>, rows: Vec<NullableCsvRecord>) -> Self {
        Self { columns, rows }
    }

    /// Builds the cursor over `products`, keeping their order.
    pub fn from_products(products: &[Product]) -> Self {
        let rows = products
            .iter()
            .map(|product| {
                vec![
                    Some(product.id.to_string()),
                    Some(product.name.clone()),
                    Some(product.description.clone()),
                    Some(format_decimal(product.cost)),
                    Some(product.profit_rate.to_string()),
                    Some(format_decimal(product.price)),
                    Some(product.currency.code().to_string()),
                ]
            })
            .collect();

        Self::new(EXPORT_COLUMNS.iter().map(|c| c.to_string()).collect(), rows)
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<NullableCsvRecord> {
        self.rows
    }
}

/// Storage of catalog products.
///
/// Implementations are constructed by the application and passed by
/// reference to whatever needs them. Queries return snapshots; callers that
/// need to follow changes compare [`ProductRepository::revision`] values.
pub trait ProductRepository {
    /// All products ordered by name.
    fn all_products(&self) -> Vec<Product>;

    /// Products whose name contains `keyword`, ignoring ASCII case, ordered by name.
    fn search_products(&self, keyword: &str) -> Vec<Product>;

    fn product(&self, id: i32) -> Option<Product>;

    /// Inserts a product. An id of `0` asks for a generated id. A product
    /// whose id is already taken is ignored.
    ///
    /// # Returns
    /// The id of the inserted product, or `None` when it was ignored.
    fn add_product(&self, product: Product) -> Option<i32>;

    /// Replaces the product with the same id; returns `false` if there is none.
    fn update_product(&self, product: &Product) -> bool;

    /// Removes the product with the same id; returns `false` if there is none.
    fn delete_product(&self, product: &Product) -> bool;

    fn delete_all_products(&self);

    /// Snapshot of every product, ordered by name, for export.
    fn export_cursor(&self) -> ExportCursor {
        ExportCursor::from_products(&self.all_products())
    }

    /// Counter bumped by every change.
    fn revision(&self) -> u64;
}

/// In-memory [`ProductRepository`].
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    products: RefCell<BTreeMap<i32, Product>>,
    revision: Cell<u64>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.products.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.borrow().is_empty()
    }

    fn touch(&self) {
        self.revision.set(self.revision.get() + 1);
    }

    fn sorted_by_name(&self, filter: impl Fn(&Product) -> bool) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .borrow()
            .values()
            .filter(|product| filter(product))
            .cloned()
            .collect();
        // Stable sort keeps id order between equal names.
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn all_products(&self) -> Vec<Product> {
        self.sorted_by_name(|_| true)
    }

    fn search_products(&self, keyword: &str) -> Vec<Product> {
        let keyword = keyword.to_ascii_lowercase();
        self.sorted_by_name(|product| product.name.to_ascii_lowercase().contains(&keyword))
    }

    fn product(&self, id: i32) -> Option<Product> {
        self.products.borrow().get(&id).cloned()
    }

    fn add_product(&self, mut product: Product) -> Option<i32> {
        let mut products = self.products.borrow_mut();

        if product.id == 0 {
            product.id = products
                .last_key_value()
                .map_or(1, |(id, _)| id.saturating_add(1).max(1));
        }

        if products.contains_key(&product.id) {
            debug!("Product {} already exists, ignored", product.id);
            return None;
        }

        let id = product.id;
        products.insert(id, product);
        drop(products);
        self.touch();
        Some(id)
    }

    fn update_product(&self, product: &Product) -> bool {
        let updated = match self.products.borrow_mut().get_mut(&product.id) {
            Some(existing) => {
                *existing = product.clone();
                true
            }
            None => false,
        };
        if updated {
            self.touch();
        }
        updated
    }

    fn delete_product(&self, product: &Product) -> bool {
        let deleted = self.products.borrow_mut().remove(&product.id).is_some();
        if deleted {
            self.touch();
        }
        deleted
    }

    fn delete_all_products(&self) {
        self.products.borrow_mut().clear();
        self.touch();
    }

    fn revision(&self) -> u64 {
        self.revision.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::product::Currency;

    fn product(id: i32, name: &str) -> Product {
        Product {
            id,
            name: name.to_string(),
            description: format!("{} description", name),
            cost: 10.0,
            profit_rate: 20,
            price: 12.0,
            currency: Currency::Dollar,
        }
    }

    #[test]
    fn products_should_be_listed_by_name() {
        let repository = InMemoryProductRepository::new();
        repository.add_product(product(1, "Soap"));
        repository.add_product(product(2, "Apple"));
        repository.add_product(product(3, "banana"));

        let names: Vec<String> = repository
            .all_products()
            .into_iter()
            .map(|p| p.name)
            .collect();

        assert_eq!(names, vec!["Apple", "Soap", "banana"]);
    }

    #[test]
    fn search_should_match_part_of_name_ignoring_case() {
        let repository = InMemoryProductRepository::new();
        repository.add_product(product(1, "Green Soap"));
        repository.add_product(product(2, "Apple"));
        repository.add_product(product(3, "soap bar"));

        let found: Vec<i32> = repository
            .search_products("SOAP")
            .into_iter()
            .map(|p| p.id)
            .collect();

        assert_eq!(found, vec![1, 3]);
        assert!(repository.search_products("pear").is_empty());
    }

    #[test]
    fn add_should_generate_ids_and_ignore_duplicates() {
        let repository = InMemoryProductRepository::new();

        assert_eq!(repository.add_product(product(0, "First")), Some(1));
        assert_eq!(repository.add_product(product(7, "Second")), Some(7));
        assert_eq!(repository.add_product(product(0, "Third")), Some(8));
        assert_eq!(repository.add_product(product(7, "Duplicate")), None);

        assert_eq!(repository.len(), 3);
        assert_eq!(repository.product(7).unwrap().name, "Second");
    }

    #[test]
    fn update_and_delete_should_bump_revision() {
        let repository = InMemoryProductRepository::new();
        repository.add_product(product(1, "Soap"));
        let revision = repository.revision();

        let mut changed = product(1, "Soap XL");
        changed.price = 15.0;
        assert!(repository.update_product(&changed));
        assert_eq!(repository.product(1), Some(changed.clone()));
        assert!(repository.revision() > revision);

        assert!(!repository.update_product(&product(9, "Missing")));

        let revision = repository.revision();
        assert!(repository.delete_product(&changed));
        assert!(!repository.delete_product(&changed));
        assert_eq!(repository.revision(), revision + 1);
        assert!(repository.is_empty());
    }

    #[test]
    fn delete_all_should_empty_repository() {
        let repository = InMemoryProductRepository::new();
        repository.add_product(product(1, "Soap"));
        repository.add_product(product(2, "Apple"));

        repository.delete_all_products();

        assert!(repository.all_products().is_empty());
    }

    #[test]
    fn export_cursor_should_stringify_rows_in_name_order() {
        let repository = InMemoryProductRepository::new();
        repository.add_product(product(2, "Soap"));
        repository.add_product(Product {
            currency: Currency::Lbp,
            cost: 1500.5,
            ..product(1, "Apple")
        });

        let cursor = repository.export_cursor();

        assert_eq!(cursor.column_names(), EXPORT_COLUMNS);
        assert_eq!(cursor.len(), 2);
        assert_eq!(
            cursor.into_rows()[0],
            vec![
                Some("1".to_string()),
                Some("Apple".to_string()),
                Some("Apple description".to_string()),
                Some("1500.5".to_string()),
                Some("20".to_string()),
                Some("12.0".to_string()),
                Some("LBP".to_string()),
            ]
        );
    }
}
