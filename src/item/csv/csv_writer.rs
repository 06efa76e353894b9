use std::{
    cell::RefCell,
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use csv::Terminator;
use log::debug;

use crate::{
    BatchError,
    core::item::{ItemWriter, ItemWriterResult},
};

use super::{
    NullableCsvRecord,
    csv_reader::{DEFAULT_QUOTE_CHARACTER, DEFAULT_SEPARATOR},
};

/// The default line terminator.
pub const DEFAULT_LINE_END: &str = "\n";

/// Writes records as CSV lines.
///
/// Every field is quoted, quote characters inside a field are doubled, and a
/// missing (`None`) field is written as an empty quoted field.
pub struct CsvRecordWriter<W: Write> {
    writer: W,
    separator: char,
    quote: char,
    line_end: Vec<u8>,
}

impl<W: Write> CsvRecordWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_options(
            writer,
            DEFAULT_SEPARATOR,
            DEFAULT_QUOTE_CHARACTER,
            DEFAULT_LINE_END,
        )
    }

    /// Creates a writer; `line_end` is written verbatim after each record.
    pub fn with_options<T: AsRef<[u8]>>(
        writer: W,
        separator: char,
        quote: char,
        line_end: T,
    ) -> Self {
        Self {
            writer,
            separator,
            quote,
            line_end: line_end.as_ref().to_vec(),
        }
    }

    /// Serializes one record as a single CSV line and appends it to the stream.
    pub fn write_record<S: AsRef<str>>(&mut self, record: &[Option<S>]) -> io::Result<()> {
        let mut line = String::new();

        for (index, field) in record.iter().enumerate() {
            if index > 0 {
                line.push(self.separator);
            }
            line.push(self.quote);
            if let Some(value) = field {
                for c in value.as_ref().chars() {
                    if c == self.quote {
                        line.push(c);
                    }
                    line.push(c);
                }
            }
            line.push(self.quote);
        }

        let mut bytes = line.into_bytes();
        bytes.extend_from_slice(&self.line_end);
        self.writer.write_all(&bytes)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Flushes and returns the underlying stream, ending the write session.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// A CSV item writer that implements the `ItemWriter` trait.
///
/// The header record, when configured, is written by `open`.
pub struct CsvItemWriter<W: Write> {
    wrapper: RefCell<CsvRecordWriter<W>>,
    headers: Option<Vec<String>>,
}

impl<W: Write> ItemWriter<NullableCsvRecord> for CsvItemWriter<W> {
    fn write(&self, items: &[NullableCsvRecord]) -> ItemWriterResult {
        let mut wrapper = self.wrapper.borrow_mut();
        for item in items {
            wrapper
                .write_record(item)
                .map_err(|error| BatchError::ItemWriter(error.to_string()))?;
        }
        Ok(())
    }

    /// Flush the contents of the internal buffer to the underlying writer.
    fn flush(&self) -> ItemWriterResult {
        self.wrapper
            .borrow_mut()
            .flush()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }

    fn open(&self) -> ItemWriterResult {
        if let Some(headers) = &self.headers {
            debug!("Writing header record: {:?}", headers);
            let header: Vec<Option<&str>> = headers.iter().map(|h| Some(h.as_str())).collect();
            self.wrapper
                .borrow_mut()
                .write_record(&header)
                .map_err(|error| BatchError::ItemWriter(error.to_string()))?;
        }
        Ok(())
    }

    fn close(&self) -> ItemWriterResult {
        ItemWriter::<NullableCsvRecord>::flush(self)
    }
}

impl<W: Write> CsvItemWriter<W> {
    pub fn into_inner(self) -> Result<W, BatchError> {
        self.wrapper
            .into_inner()
            .into_inner()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct CsvItemWriterBuilder {
    delimiter: char,
    quote: char,
    terminator: Terminator,
    headers: Option<Vec<String>>,
}

impl Default for CsvItemWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvItemWriterBuilder {
    pub fn new() -> CsvItemWriterBuilder {
        CsvItemWriterBuilder {
            delimiter: DEFAULT_SEPARATOR,
            quote: DEFAULT_QUOTE_CHARACTER,
            terminator: Terminator::Any(b'\n'),
            headers: None,
        }
    }

    pub fn delimiter(mut self, delimiter: char) -> CsvItemWriterBuilder {
        self.delimiter = delimiter;
        self
    }

    pub fn quote(mut self, quote: char) -> CsvItemWriterBuilder {
        self.quote = quote;
        self
    }

    pub fn terminator(mut self, terminator: Terminator) -> CsvItemWriterBuilder {
        self.terminator = terminator;
        self
    }

    /// Sets the header record written when the writer is opened.
    pub fn headers<S: AsRef<str>>(mut self, headers: &[S]) -> CsvItemWriterBuilder {
        self.headers = Some(headers.iter().map(|h| h.as_ref().to_string()).collect());
        self
    }

    pub fn from_path<P: AsRef<Path>>(
        self,
        path: P,
    ) -> Result<CsvItemWriter<BufWriter<File>>, BatchError> {
        let file = File::create(path)?;
        Ok(self.from_writer(BufWriter::new(file)))
    }

    pub fn from_writer<W: Write>(self, wtr: W) -> CsvItemWriter<W> {
        let line_end: Vec<u8> = match self.terminator {
            Terminator::CRLF => b"\r\n".to_vec(),
            Terminator::Any(byte) => vec![byte],
            _ => DEFAULT_LINE_END.as_bytes().to_vec(),
        };

        CsvItemWriter {
            wrapper: RefCell::new(CsvRecordWriter::with_options(
                wtr,
                self.delimiter,
                self.quote,
                line_end,
            )),
            headers: self.headers,
        }
    }
}
