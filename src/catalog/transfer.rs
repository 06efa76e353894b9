use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use log::{error, info};
use time::{OffsetDateTime, format_description};

use crate::{
    BatchError,
    core::{
        item::PassThroughProcessor,
        job::{Job, JobBuilder, JobInstance},
        step::StepBuilder,
    },
    error::CatalogError,
    item::{
        catalog::{
            catalog_reader::ProductExportReader, catalog_writer::ProductItemWriter,
            record_mapper::ProductRecordMapper,
        },
        csv::{
            CsvRecord, NullableCsvRecord, csv_reader::CsvItemReaderBuilder,
            csv_writer::CsvItemWriterBuilder,
        },
    },
};

use super::{product::Product, repository::ProductRepository};

pub const EXPORT_STEP: &str = "export-products";
pub const IMPORT_STEP: &str = "import-products";

const EXPORT_CHUNK_SIZE: u16 = 100;
const EXPORT_FILE_NAME_FORMAT: &str = "[day] [month] [year] [hour]:[minute]:[second]";

/// Outcome of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    /// Records handed to the repository, including ones it ignored.
    pub imported: usize,
    /// Products actually added to the repository.
    pub inserted: usize,
    /// Records ignored because their id already existed.
    pub ignored: usize,
}

impl ImportSummary {
    pub fn is_imported(&self) -> bool {
        self.imported > 0
    }
}

/// Writes the whole catalog as CSV to `writer`: the header record, then one
/// record per product ordered by name.
///
/// # Returns
/// The number of products written.
///
/// # Errors
/// `BatchError::Step` wrapping the writer error when the output fails.
pub fn export_catalog<W: Write>(
    repository: &dyn ProductRepository,
    writer: W,
) -> Result<usize, BatchError> {
    let reader = ProductExportReader::new(repository.export_cursor());
    let processor = PassThroughProcessor;
    let writer = CsvItemWriterBuilder::new()
        .headers(reader.column_names())
        .from_writer(writer);

    let step = StepBuilder::new(EXPORT_STEP)
        .chunk::<NullableCsvRecord, NullableCsvRecord>(EXPORT_CHUNK_SIZE)
        .reader(&reader)
        .processor(&processor)
        .writer(&writer)
        .build()?;

    let job = JobBuilder::new()
        .name("export-catalog".to_string())
        .start(&step)
        .build();

    run(&job)?;

    let written = written_count(&job, EXPORT_STEP);
    info!("Exported {} products", written);
    Ok(written)
}

/// Exports the catalog into a new file of `dir`, named after the current
/// local time (`dd MM yyyy HH:mm:ss.csv`). The directory is created when
/// missing.
///
/// # Returns
/// The path of the written file.
pub fn export_catalog_to_dir<P: AsRef<Path>>(
    repository: &dyn ProductRepository,
    dir: P,
) -> Result<PathBuf, BatchError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let path = dir.join(format!("{}.csv", export_timestamp()?));
    let file = fs::File::create(&path)?;
    export_catalog(repository, std::io::BufWriter::new(file))?;

    info!("Catalog exported to {}", path.display());
    Ok(path)
}

fn export_timestamp() -> Result<String, BatchError> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let format = format_description::parse(EXPORT_FILE_NAME_FORMAT)
        .map_err(|error| BatchError::Configuration(error.to_string()))?;
    now.format(&format)
        .map_err(|error| BatchError::Configuration(error.to_string()))
}

/// Replaces the catalog with the products read from `reader`.
///
/// Every product is deleted first. The first record is a header and is
/// skipped; the remaining records are mapped positionally and inserted one
/// by one. A malformed record stops the import and the products inserted
/// before it are kept.
pub fn import_catalog<R: Read>(
    repository: &dyn ProductRepository,
    reader: R,
) -> Result<ImportSummary, BatchError> {
    repository.delete_all_products();

    let reader = CsvItemReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let processor = ProductRecordMapper::new();
    let writer = ProductItemWriter::new(repository);

    let step = StepBuilder::new(IMPORT_STEP)
        .chunk::<CsvRecord, Product>(1)
        .reader(&reader)
        .processor(&processor)
        .writer(&writer)
        .skip_limit(0)
        .build()?;

    let job = JobBuilder::new()
        .name("import-catalog".to_string())
        .start(&step)
        .build();

    run(&job)?;

    let summary = ImportSummary {
        imported: written_count(&job, IMPORT_STEP),
        inserted: writer.inserted_count(),
        ignored: writer.ignored_count(),
    };
    info!(
        "Imported {} products ({} inserted, {} ignored)",
        summary.imported, summary.inserted, summary.ignored
    );
    Ok(summary)
}

/// Imports the catalog from the CSV file at `path`.
///
/// # Errors
/// `CatalogError::NotCsvFile` when the file name does not end with `.csv`;
/// the repository is left untouched in that case.
pub fn import_catalog_from_path<P: AsRef<Path>>(
    repository: &dyn ProductRepository,
    path: P,
) -> Result<ImportSummary, BatchError> {
    let path = path.as_ref();
    let is_csv = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".csv"));
    if !is_csv {
        error!("Import refused, {} is not a csv file", path.display());
        return Err(CatalogError::NotCsvFile(path.display().to_string()).into());
    }

    let file = fs::File::open(path)?;
    import_catalog(repository, file)
}

fn run(job: &JobInstance) -> Result<(), BatchError> {
    job.run().map(|_| ()).inspect_err(|error| {
        error!("Job {} failed: {}", job.get_name(), error);
    })
}

fn written_count(job: &JobInstance, step: &str) -> usize {
    job.get_step_execution(step)
        .map_or(0, |execution| execution.write_count)
}
