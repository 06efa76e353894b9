mod common;

use std::fs::{self, read_to_string};

use product_catalog_batch::{
    BatchError,
    catalog::{
        Currency, InMemoryProductRepository, ProductDetails, ProductListing, ProductRepository,
        Settings,
        export_catalog, export_catalog_to_dir, import_catalog, import_catalog_from_path,
    },
    error::CatalogError,
};
use tempfile::tempdir;

use common::{sample_products, sample_repository};

#[test]
fn exported_catalog_should_import_back_unchanged() {
    let _ = env_logger::builder().is_test(true).try_init();
    let repository = sample_repository();
    let mut csv: Vec<u8> = Vec::new();

    let written = export_catalog(&repository, &mut csv).unwrap();
    assert_eq!(written, 3);

    let restored = InMemoryProductRepository::new();
    let summary = import_catalog(&restored, csv.as_slice()).unwrap();

    assert_eq!(summary.imported, 3);
    assert!(summary.is_imported());
    assert_eq!(restored.all_products(), repository.all_products());

    let mut expected = sample_products();
    expected.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(restored.all_products(), expected);
}

#[test]
fn export_should_quote_every_field() {
    let repository = sample_repository();
    let mut csv: Vec<u8> = Vec::new();

    export_catalog(&repository, &mut csv).unwrap();
    let content = String::from_utf8(csv).unwrap();
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(
        lines[0],
        "\"id\",\"name\",\"description\",\"cost\",\"profitRate\",\"price\",\"currency\""
    );
    assert_eq!(lines[1], "\"5\",\"Apricot jam\",\"\",\"2.25\",\"0\",\"2.25\",\"DOLLAR\"");
    assert_eq!(lines[2], "\"1\",\"Olive soap\",\"Bar, 100g\",\"1.5\",\"20\",\"1.8\",\"DOLLAR\"");
    assert_eq!(lines[3], "\"2\",\"Za'atar\",\"The \"\"good\"\" one");
    assert_eq!(
        lines[4],
        "from the mountains\",\"150000.0\",\"10\",\"165000.0\",\"LBP\""
    );
    assert_eq!(lines.len(), 5);
}

#[test]
fn import_should_stop_at_first_malformed_record() {
    let repository = sample_repository();
    let csv = "id,name,description,cost,profitRate,price,currency
1,Soap,,1.5,20,1.8,DOLLAR
2,Jam,,abc,20,1.8,DOLLAR
3,Tea,,1.0,20,1.2,DOLLAR
";

    let result = import_catalog(&repository, csv.as_bytes());

    match result {
        Err(BatchError::Step { name, source }) => {
            assert_eq!(name, "import-products");
            assert!(matches!(
                *source,
                BatchError::Catalog(CatalogError::InvalidNumber { column: "cost", .. })
            ));
        }
        other => panic!("expected a step error, got {:?}", other),
    }

    let names: Vec<String> = repository
        .all_products()
        .into_iter()
        .map(|product| product.name)
        .collect();
    assert_eq!(names, vec!["Soap"]);
}

#[test]
fn import_should_skip_a_multiline_header_whole() {
    let repository = InMemoryProductRepository::new();
    let csv = "\"id\",\"name\nof product\",description,cost,profitRate,price,currency\n\
               7,Tea,Green,1.0,20,1.2,LBP\n";

    let summary = import_catalog(&repository, csv.as_bytes()).unwrap();

    assert_eq!(summary.imported, 1);
    let tea = repository.product(7).unwrap();
    assert_eq!(tea.description, "Green");
    assert_eq!(tea.currency, Currency::Lbp);
}

#[test]
fn import_should_decode_latin1_bytes_lossily() {
    let repository = sample_repository();
    let mut csv: Vec<u8> = b"id,name,description,cost,profitRate,price,currency\n".to_vec();
    csv.extend_from_slice(b"1,Caf\xE9,,1,0,1,DOLLAR\n");
    csv.extend_from_slice(b"2,Tea,,1,0,1,LBP\n");

    let summary = import_catalog(&repository, csv.as_slice()).unwrap();

    assert_eq!(summary.inserted, 2);
    assert_eq!(repository.product(1).unwrap().name, "Caf\u{FFFD}");
    assert_eq!(repository.product(2).unwrap().name, "Tea");
}

#[test]
fn import_should_accept_carriage_return_line_endings() {
    let repository = InMemoryProductRepository::new();
    let csv = "id,name,description,cost,profitRate,price,currency\r1,Soap,,1.5,20,1.8,DOLLAR\r2,Tea,,1,0,1,LBP\r";

    let summary = import_catalog(&repository, csv.as_bytes()).unwrap();

    assert_eq!(summary.inserted, 2);
    assert_eq!(repository.product(1).unwrap().currency, Currency::Dollar);
    assert_eq!(repository.product(2).unwrap().currency, Currency::Lbp);
}

#[test]
fn import_from_file_should_replace_catalog() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.csv");
    fs::write(&path, "id,name,description,cost,profitRate,price,currency\n3,Tea,,1.0,20,1.2,DOLLAR\n")
        .unwrap();
    let repository = sample_repository();

    let summary = import_catalog_from_path(&repository, &path).unwrap();

    assert_eq!(summary.imported, 1);
    assert_eq!(repository.len(), 1);
    assert_eq!(repository.product(3).unwrap().name, "Tea");
}

#[test]
fn import_should_refuse_non_csv_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    fs::write(&path, "id\n1\n").unwrap();
    let repository = sample_repository();

    let error = import_catalog_from_path(&repository, &path).unwrap_err();

    assert!(matches!(
        error,
        BatchError::Catalog(CatalogError::NotCsvFile(_))
    ));
    assert_eq!(repository.len(), 3);
}

#[test]
fn import_of_missing_file_should_fail_with_io_error() {
    let dir = tempdir().unwrap();
    let repository = sample_repository();

    let error = import_catalog_from_path(&repository, dir.path().join("missing.csv")).unwrap_err();

    assert!(matches!(error, BatchError::Io(_)));
    assert_eq!(repository.len(), 3);
}

#[test]
fn export_to_dir_should_create_timestamped_file() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("exports");
    let repository = sample_repository();

    let path = export_catalog_to_dir(&repository, &target).unwrap();

    assert!(target.is_dir());
    assert_eq!(path.parent(), Some(target.as_path()));

    let file_name = path.file_name().unwrap().to_str().unwrap();
    let stem = file_name.strip_suffix(".csv").unwrap();
    let parts: Vec<&str> = stem.split(' ').collect();
    assert_eq!(parts.len(), 4);
    assert_eq!(parts[0].len(), 2);
    assert_eq!(parts[1].len(), 2);
    assert_eq!(parts[2].len(), 4);
    assert_eq!(parts[3].split(':').count(), 3);

    let content = read_to_string(&path).unwrap();
    assert!(content.starts_with("\"id\",\"name\""));

    let restored = InMemoryProductRepository::new();
    import_catalog_from_path(&restored, &path).unwrap();
    assert_eq!(restored.all_products(), repository.all_products());
}

#[test]
fn listing_should_follow_imports() {
    let repository = sample_repository();
    let mut listing = ProductListing::new();
    listing.update_search_query("SOAP");

    assert_eq!(listing.poll(&repository).map(|products| products.len()), Some(1));
    assert!(listing.poll(&repository).is_none());

    let csv = "h\n1,Green soap,,1,0,1,DOLLAR\n2,Soap bar,,1,0,1,DOLLAR\n3,Tea,,1,0,1,DOLLAR\n";
    import_catalog(&repository, csv.as_bytes()).unwrap();

    let names: Vec<&str> = listing
        .poll(&repository)
        .unwrap()
        .iter()
        .map(|product| product.name.as_str())
        .collect();
    assert_eq!(names, vec!["Green soap", "Soap bar"]);
}

#[test]
fn settings_should_drive_new_product_forms() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let settings = Settings {
        dollar_by_lbp: "89500".to_string(),
        profit_rate: 15,
        product_currency: Currency::Dollar,
    };
    settings.save(&path).unwrap();

    let loaded = Settings::load(&path).unwrap();
    let mut details = ProductDetails::from_settings(&loaded);
    details.name = "Tea".to_string();
    details.cost = "10".to_string();
    details.calculate_price();

    assert!(details.is_valid());
    let repository = InMemoryProductRepository::new();
    let id = repository.add_product(details.to_product()).unwrap();

    let tea = repository.product(id).unwrap();
    assert_eq!(tea.price, 11.5);
    assert_eq!(tea.formatted_price(), "$11.50");
    assert_eq!(
        tea.formatted_price_by_dollar(Some(loaded.dollar_by_lbp.as_str())),
        "LBP 1,029,250"
    );
}
