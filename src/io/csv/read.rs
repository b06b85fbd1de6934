//! CSV reading operations.

use std::{io::Cursor, path::Path};

use anyhow::{Context, Result, anyhow};
use encoding_rs::Encoding;
use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReadOptions, CsvReader}};

use crate::common;

/// Look up a WHATWG encoding label such as `"ISO-8859-1"` or `"utf-8"`.
pub(crate) fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| anyhow!("[io::csv::read] Unknown text encoding: {label}"))
}

/// Decode raw file bytes, failing on any byte sequence the encoding cannot represent.
pub(crate) fn decode_text(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF".as_slice())
        .filter(|_| encoding == encoding_rs::UTF_8)
        .unwrap_or(bytes);
    encoding.decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| anyhow!("[io::csv::read] Input is not valid {}", encoding.name()))
}

/// Reads a CSV file from `path` in the given encoding, keeping every column as text.
pub(crate) fn read_csv(path: &Path, encoding_label: &str) -> Result<DataFrame> {
    let encoding = encoding_for_label(encoding_label)?;
    common::require_file_exists(path)?;
    let bytes = std::fs::read(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    let text = decode_text(&bytes, encoding)
        .with_context(|| format!("[io::csv::read] Failed to decode {}", path.display()))?;
    read_csv_string(&text)
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))
}

/// Reads a CSV from a string, keeping every column as text so values like `"0"` survive.
pub(crate) fn read_csv_string(csv: &str) -> Result<DataFrame> {
    let options = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0));

    CsvReader::new(Cursor::new(csv.as_bytes()))
        .with_options(options)
        .finish()
        .context("[io::csv::read] Failed to read CSV from string")
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::DataType;

    #[test]
    fn latin1_bytes_decode() {
        let encoding = encoding_for_label("ISO-8859-1").unwrap();
        let text = decode_text(b"SITENAME\nMuranga Dispens\xe9ire\n", encoding).unwrap();
        assert!(text.contains("Dispenséire"));
    }

    #[test]
    fn invalid_utf8_is_fatal() {
        let encoding = encoding_for_label("utf-8").unwrap();
        assert!(decode_text(b"WARD\n\xff\xfe\n", encoding).is_err());
        assert_eq!(decode_text(b"\xEF\xBB\xBFWARD\n", encoding).unwrap(), "WARD\n");
    }

    #[test]
    fn all_columns_are_text() {
        let df = read_csv_string("WARD,CONSTITUENCY,SITECOORDINATES\n0,,\"-1.2,36.8\"\n").unwrap();
        assert_eq!(df.height(), 1);
        for column in df.get_columns() {
            assert_eq!(column.dtype(), &DataType::String);
        }
        let ward = df.column("WARD").unwrap().as_materialized_series().str().unwrap().get(0);
        assert_eq!(ward, Some("0"));
        let coords = df.column("SITECOORDINATES").unwrap().as_materialized_series().str().unwrap().get(0);
        assert_eq!(coords, Some("-1.2,36.8"));
    }
}
