//! CSV support for reading and writing catalog records.
//!
//! # Module Architecture
//!
//! 1. **CsvRecordReader / CsvItemReader**: a line-oriented reader producing one
//!    record (ordered list of fields) per call. It tolerates unquoted fields,
//!    quoted separators, doubled quotes and quoted fields spanning several
//!    physical lines.
//!
//! 2. **CsvRecordWriter / CsvItemWriter**: a writer quoting every field and
//!    doubling inner quotes, one record per line.
//!
//! The `Csv*Item*` types implement the core `ItemReader` and `ItemWriter`
//! traits so they can be used in steps; the `CsvRecord*` types can be used on
//! their own.
//!
//! # Examples
//!
//! ```
//! use product_catalog_batch::item::csv::csv_reader::CsvRecordReader;
//! use product_catalog_batch::item::csv::csv_writer::CsvRecordWriter;
//!
//! let mut writer = CsvRecordWriter::new(Vec::new());
//! writer.write_record(&[Some("a"), Some("b\"c"), Some("d")]).unwrap();
//! let data = writer.into_inner().unwrap();
//! assert_eq!(data, b"\"a\",\"b\"\"c\",\"d\"\n");
//!
//! let mut reader = CsvRecordReader::new(data.as_slice());
//! assert_eq!(
//!     reader.read_next().unwrap(),
//!     Some(vec!["a".to_string(), "b\"c".to_string(), "d".to_string()])
//! );
//! ```

/// A module providing facilities for reading CSV data records.
pub mod csv_reader;

/// A module providing facilities for writing CSV data records.
pub mod csv_writer;

/// One logical CSV row as read: an ordered list of fields.
pub type CsvRecord = Vec<String>;

/// One logical CSV row as written: fields may be missing.
pub type NullableCsvRecord = Vec<Option<String>>;
