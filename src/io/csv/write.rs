//! CSV writing operations.

use std::path::Path;

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerWriter, prelude::CsvWriter};
use tracing::warn;

use crate::{common, io::csv::encoding_for_label};

/// Write a DataFrame to a CSV string.
pub(crate) fn write_csv_string(df: &mut DataFrame) -> Result<String> {
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .finish(df)
        .context("[io::csv::write] Failed to write CSV to string")?;
    String::from_utf8(buffer)
        .context("[io::csv::write] CSV output is not valid UTF-8")
}

/// Write a DataFrame to a CSV file in the given encoding, replacing `path` atomically.
pub(crate) fn write_csv(df: &mut DataFrame, path: &Path, encoding_label: &str) -> Result<()> {
    let encoding = encoding_for_label(encoding_label)?;
    let text = write_csv_string(df)?;

    let (bytes, _, unmappable) = encoding.encode(&text);
    if unmappable {
        warn!(path = %path.display(), encoding = encoding.name(),
            "some characters cannot be represented and were written as numeric references");
    }

    common::write_atomic(path, &bytes)
        .with_context(|| format!("[io::csv::write] Failed to write CSV to {:?}", path))
}
