use std::{
    cell::{Cell, RefCell},
    fs::File,
    io::{self, BufRead, BufReader, Read},
    mem,
    path::Path,
};

use log::debug;

use crate::{
    core::item::{ItemReader, ItemReaderResult},
    error::BatchError,
};

use super::CsvRecord;

/// The default separator to use if none is supplied.
pub const DEFAULT_SEPARATOR: char = ',';

/// The default quote character to use if none is supplied.
pub const DEFAULT_QUOTE_CHARACTER: char = '"';

/// The default number of leading lines to discard.
pub const DEFAULT_SKIP_LINES: usize = 0;

/// Splits physical lines into fields.
///
/// A tokenizer lives for exactly one record. Its in-quotes flag survives
/// between calls to [`FieldTokenizer::feed`], which is how a quoted field
/// continues onto the next physical line.
struct FieldTokenizer {
    separator: char,
    quote: char,
    fields: CsvRecord,
    field: String,
    in_quotes: bool,
}

impl FieldTokenizer {
    fn new(separator: char, quote: char) -> Self {
        Self {
            separator,
            quote,
            fields: Vec::new(),
            field: String::new(),
            in_quotes: false,
        }
    }

    /// Scans one physical line left to right.
    fn feed(&mut self, line: &str) {
        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c == self.quote {
                if self.in_quotes && chars.get(i + 1) == Some(&self.quote) {
                    // Two quotes inside a quoted field stand for one quote.
                    self.field.push(self.quote);
                    i += 1;
                } else {
                    self.in_quotes = !self.in_quotes;
                    // Embedded quote such as `a,bc"d"ef,g`. The `i > 2` window is
                    // part of the file format and must not be widened or narrowed.
                    if i > 2
                        && chars[i - 1] != self.separator
                        && chars.get(i + 1).is_some_and(|next| *next != self.separator)
                    {
                        self.field.push(c);
                    }
                }
            } else if c == self.separator && !self.in_quotes {
                self.fields.push(mem::take(&mut self.field));
            } else {
                self.field.push(c);
            }
            i += 1;
        }
    }

    /// Marks the line break inside a quoted field that spans lines.
    fn continue_on_next_line(&mut self) {
        self.field.push('\n');
    }

    fn in_quotes(&self) -> bool {
        self.in_quotes
    }

    fn finish(mut self) -> CsvRecord {
        self.fields.push(self.field);
        self.fields
    }
}

/// A line-oriented CSV reader producing one record per call.
///
/// The reader owns its input exclusively. It keeps two sticky flags: whether
/// the configured leading lines were discarded, and whether the input still
/// has lines. Once the input is exhausted every further call to
/// [`CsvRecordReader::read_next`] returns `Ok(None)` without touching the
/// stream again.
///
/// Physical lines end with `\n`, `\r` or `\r\n`; the terminator is not part
/// of the line and a trailing terminator does not produce an extra empty line.
/// Input that is not valid UTF-8 is decoded lossily.
///
/// # Examples
///
/// ```
/// use product_catalog_batch::item::csv::csv_reader::CsvRecordReader;
///
/// let mut reader = CsvRecordReader::new("a,\"b,c\",d\n".as_bytes());
///
/// assert_eq!(reader.read_next().unwrap(), Some(vec!["a".into(), "b,c".into(), "d".into()]));
/// assert_eq!(reader.read_next().unwrap(), None);
/// ```
pub struct CsvRecordReader<R> {
    reader: R,
    separator: char,
    quote: char,
    skip_lines: usize,
    lines_skipped: bool,
    has_next: bool,
}

impl<R: BufRead> CsvRecordReader<R> {
    /// Creates a reader with the default separator, quote and skip count.
    pub fn new(reader: R) -> Self {
        Self::with_options(
            reader,
            DEFAULT_SEPARATOR,
            DEFAULT_QUOTE_CHARACTER,
            DEFAULT_SKIP_LINES,
        )
    }

    /// Creates a reader.
    ///
    /// # Parameters
    /// - `separator`: the delimiter between fields
    /// - `quote`: the character used for quoted fields
    /// - `skip_lines`: the number of physical lines discarded before the first record
    pub fn with_options(reader: R, separator: char, quote: char, skip_lines: usize) -> Self {
        Self {
            reader,
            separator,
            quote,
            skip_lines,
            lines_skipped: false,
            has_next: true,
        }
    }

    /// Reads the next record.
    ///
    /// A quoted field may span several physical lines; the line breaks are
    /// kept in the field as `\n`. When the input ends inside a quoted field
    /// the record is returned with what was accumulated.
    ///
    /// # Returns
    /// - `Ok(Some(record))` for each record; an empty line gives `[""]`
    /// - `Ok(None)` at end of input, and on every call after that
    /// - `Err(io::Error)` when the underlying stream fails
    pub fn read_next(&mut self) -> io::Result<Option<CsvRecord>> {
        match self.next_line()? {
            Some(line) => self.parse_line(&line).map(Some),
            None => Ok(None),
        }
    }

    /// Consumes the reader, closing the parse session and returning the stream.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn next_line(&mut self) -> io::Result<Option<String>> {
        if !self.has_next {
            return Ok(None);
        }

        if !self.lines_skipped {
            for _ in 0..self.skip_lines {
                self.read_physical_line()?;
            }
            self.lines_skipped = true;
            debug!("Skipped {} leading lines", self.skip_lines);
        }

        let line = self.read_physical_line()?;
        if line.is_none() {
            self.has_next = false;
        }
        Ok(line)
    }

    /// Reads one physical line ended by `\n`, `\r` or `\r\n`.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD.
    fn read_physical_line(&mut self) -> io::Result<Option<String>> {
        let mut bytes = Vec::new();
        let mut terminated = false;

        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            };
            if available.is_empty() {
                break;
            }

            match available.iter().position(|b| *b == b'\n' || *b == b'\r') {
                Some(end) => {
                    let terminator = available[end];
                    bytes.extend_from_slice(&available[..end]);
                    self.reader.consume(end + 1);
                    if terminator == b'\r' {
                        self.skip_line_feed()?;
                    }
                    terminated = true;
                    break;
                }
                None => {
                    let len = available.len();
                    bytes.extend_from_slice(available);
                    self.reader.consume(len);
                }
            }
        }

        if bytes.is_empty() && !terminated {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn skip_line_feed(&mut self) -> io::Result<()> {
        loop {
            match self.reader.fill_buf() {
                Ok(available) => {
                    if available.first() == Some(&b'\n') {
                        self.reader.consume(1);
                    }
                    return Ok(());
                }
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            }
        }
    }

    fn parse_line(&mut self, line: &str) -> io::Result<CsvRecord> {
        let mut tokenizer = FieldTokenizer::new(self.separator, self.quote);
        tokenizer.feed(line);

        while tokenizer.in_quotes() {
            tokenizer.continue_on_next_line();
            match self.next_line()? {
                Some(next_line) => tokenizer.feed(&next_line),
                None => break,
            }
        }

        Ok(tokenizer.finish())
    }
}

/// A CSV item reader that implements the `ItemReader` trait.
///
/// Wraps a [`CsvRecordReader`] so it can be driven by a step. When built with
/// `has_headers(true)`, the first record is kept as the header and is not
/// returned as an item. The header is a whole record, so a header holding a
/// quoted line break is skipped entirely.
///
/// # Examples
///
/// ```
/// use product_catalog_batch::item::csv::csv_reader::CsvItemReaderBuilder;
/// use product_catalog_batch::core::item::ItemReader;
///
/// let reader = CsvItemReaderBuilder::new()
///     .has_headers(true)
///     .from_reader("name,value\nfoo,123\n".as_bytes());
///
/// assert_eq!(reader.read().unwrap(), Some(vec!["foo".to_string(), "123".to_string()]));
/// assert_eq!(reader.read().unwrap(), None);
/// assert_eq!(reader.headers(), Some(vec!["name".to_string(), "value".to_string()]));
/// ```
pub struct CsvItemReader<R> {
    /// Uses `RefCell` so records can be read through the `&self` signature of
    /// the `ItemReader` trait.
    records: RefCell<CsvRecordReader<R>>,
    header_pending: Cell<bool>,
    headers: RefCell<Option<CsvRecord>>,
}

impl<R: BufRead> CsvItemReader<R> {
    /// Returns the header record, once it has been read.
    pub fn headers(&self) -> Option<CsvRecord> {
        self.headers.borrow().clone()
    }

    /// Consumes the item reader and returns the underlying stream.
    pub fn into_inner(self) -> R {
        self.records.into_inner().into_inner()
    }
}

impl<R: BufRead> ItemReader<CsvRecord> for CsvItemReader<R> {
    /// Reads the next record.
    ///
    /// # Returns
    /// - `Ok(Some(record))` if a record is read
    /// - `Ok(None)` if there are no more records to read
    /// - `Err(BatchError::ItemReader(error))` if the underlying stream fails
    fn read(&self) -> ItemReaderResult<CsvRecord> {
        let mut records = self.records.borrow_mut();

        if self.header_pending.get() {
            self.header_pending.set(false);
            let header = records
                .read_next()
                .map_err(|error| BatchError::ItemReader(error.to_string()))?;
            debug!("Header record: {:?}", header);
            match header {
                Some(header) => *self.headers.borrow_mut() = Some(header),
                None => return Ok(None),
            }
        }

        records
            .read_next()
            .map_err(|error| BatchError::ItemReader(error.to_string()))
    }
}

/// A builder for configuring CSV item reading.
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Quote: double quote (")
/// - Skip lines: 0
/// - Headers: disabled
#[derive(Debug, Clone)]
pub struct CsvItemReaderBuilder {
    delimiter: char,
    quote: char,
    skip_lines: usize,
    has_headers: bool,
}

impl Default for CsvItemReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvItemReaderBuilder {
    pub fn new() -> Self {
        Self {
            delimiter: DEFAULT_SEPARATOR,
            quote: DEFAULT_QUOTE_CHARACTER,
            skip_lines: DEFAULT_SKIP_LINES,
            has_headers: false,
        }
    }

    /// Sets the field delimiter.
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the quote character.
    pub fn quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    /// Sets the number of physical lines discarded, unparsed, before the
    /// first record.
    pub fn skip_lines(mut self, skip_lines: usize) -> Self {
        self.skip_lines = skip_lines;
        self
    }

    /// Sets whether the first record is a header.
    pub fn has_headers(mut self, yes: bool) -> Self {
        self.has_headers = yes;
        self
    }

    /// Creates a `CsvItemReader` from any source implementing `Read`.
    pub fn from_reader<R: Read>(self, rdr: R) -> CsvItemReader<BufReader<R>> {
        self.from_buf_reader(BufReader::new(rdr))
    }

    /// Creates a `CsvItemReader` from a source that is already buffered.
    pub fn from_buf_reader<R: BufRead>(self, rdr: R) -> CsvItemReader<R> {
        CsvItemReader {
            records: RefCell::new(CsvRecordReader::with_options(
                rdr,
                self.delimiter,
                self.quote,
                self.skip_lines,
            )),
            header_pending: Cell::new(self.has_headers),
            headers: RefCell::new(None),
        }
    }

    /// Creates a `CsvItemReader` from a file path.
    ///
    /// # Errors
    /// `BatchError::Io` if the file cannot be opened.
    pub fn from_path<P: AsRef<Path>>(
        self,
        path: P,
    ) -> Result<CsvItemReader<BufReader<File>>, BatchError> {
        let file = File::open(path)?;
        Ok(self.from_reader(file))
    }
}
