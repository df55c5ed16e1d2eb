// src/source/mod.rs
use crate::error::ExtractError;
use csv::{ReaderBuilder, StringRecord, StringRecordsIter};
use std::{
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::debug;

/// One data row, addressable by header name.
#[derive(Debug, Clone)]
pub struct Record {
    headers: Arc<[String]>,
    fields: StringRecord,
}

impl Record {
    /// Value of the column called `name`, or `None` if the header row has no
    /// such column or this row is too short to reach it. When a header name
    /// repeats, the rightmost column wins.
    pub fn get(&self, name: &str) -> Option<&str> {
        let idx = self.headers.iter().rposition(|h| h == name)?;
        self.fields.get(idx)
    }

    /// 1-based line in the source, if the reader tracked it.
    pub fn line(&self) -> Option<u64> {
        self.fields.position().map(|p| p.line())
    }
}

/// A header-aware CSV reader over a single input. The underlying handle is
/// released when the source is dropped.
pub struct RecordSource<R> {
    path: PathBuf,
    headers: Arc<[String]>,
    reader: csv::Reader<R>,
}

impl RecordSource<File> {
    /// Open `path` and read its header row.
    #[tracing::instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ExtractError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(path, file)
    }
}

impl<R: Read> RecordSource<R> {
    /// Wrap an arbitrary reader. `path` is only used to label errors.
    pub fn from_reader(path: impl Into<PathBuf>, reader: R) -> Result<Self, ExtractError> {
        let path = path.into();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            // rows with missing trailing fields must still be readable
            .flexible(true)
            .from_reader(reader);

        let headers: Arc<[String]> = reader
            .headers()
            .map_err(|e| classify(&path, e))?
            .iter()
            .map(str::to_string)
            .collect();
        debug!(columns = headers.len(), "read header row");

        Ok(Self {
            path,
            headers,
            reader,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Lazily iterate the remaining data rows. Each item is produced on demand
    /// and the sequence cannot be rewound.
    pub fn records(&mut self) -> Records<'_, R> {
        Records {
            inner: self.reader.records(),
            headers: Arc::clone(&self.headers),
            path: &self.path,
        }
    }
}

pub struct Records<'r, R: 'r> {
    inner: StringRecordsIter<'r, R>,
    headers: Arc<[String]>,
    path: &'r Path,
}

impl<R: Read> Iterator for Records<'_, R> {
    type Item = Result<Record, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        Some(match result {
            Ok(fields) => Ok(Record {
                headers: Arc::clone(&self.headers),
                fields,
            }),
            Err(e) => Err(classify(self.path, e)),
        })
    }
}

/// Read failures surface from csv as I/O errors; everything else is a
/// parse problem with the content.
fn classify(path: &Path, err: csv::Error) -> ExtractError {
    let path = path.to_path_buf();
    if !err.is_io_error() {
        return ExtractError::Format { path, source: err };
    }
    let source = match err.into_kind() {
        csv::ErrorKind::Io(source) => source,
        kind => io::Error::other(format!("{kind:?}")),
    };
    ExtractError::FileAccess { path, source }
}
