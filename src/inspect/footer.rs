// src/inspect/footer.rs

use bytes::Bytes;
use parquet::file::metadata::{ParquetMetaData, ParquetMetaDataReader};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::non_negative;
use crate::error::{ParseError, ParseOutcome};

pub const PARQUET_MAGIC: &[u8; 4] = b"PAR1";
/// Trailer magic of a file whose footer is encrypted.
pub const ENCRYPTED_FOOTER_MAGIC: &[u8; 4] = b"PARE";
/// Footer length (u32 LE) followed by the magic.
pub const FOOTER_TRAILER_LEN: usize = 8;
/// Writer identity reported when the footer does not carry one.
pub const UNKNOWN_WRITER: &str = "Unknown";

/// File-level facts taken from the footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub num_row_groups: u64,
    pub num_rows: u64,
    /// Leaf column count.
    pub num_columns: u64,
    /// Byte length of the encoded footer metadata block.
    pub serialized_size: u64,
    pub created_by: String,
}

/// A decoded footer: the normalized [`FileMetadata`] plus the full Parquet
/// metadata that the later stages walk.
#[derive(Debug, Clone)]
pub struct Footer {
    pub metadata: FileMetadata,
    parquet: Arc<ParquetMetaData>,
}

impl Footer {
    pub fn parquet(&self) -> &ParquetMetaData {
        &self.parquet
    }

    pub fn parquet_arc(&self) -> Arc<ParquetMetaData> {
        Arc::clone(&self.parquet)
    }
}

/// Validate the trailer and return the declared footer length.
fn footer_len(bytes: &[u8]) -> ParseOutcome<usize> {
    let len = bytes.len();
    if len < PARQUET_MAGIC.len() + FOOTER_TRAILER_LEN {
        return Err(ParseError::Format(format!(
            "file size of {} bytes is too small to be a Parquet file",
            len
        )));
    }

    let magic = &bytes[len - 4..];
    if magic == ENCRYPTED_FOOTER_MAGIC {
        return Err(ParseError::format(
            "Parquet files with encrypted footers are not supported",
        ));
    }
    if magic != PARQUET_MAGIC || &bytes[..4] != PARQUET_MAGIC {
        return Err(ParseError::format(
            "Invalid Parquet file. Corrupt footer: magic bytes not found",
        ));
    }

    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[len - FOOTER_TRAILER_LEN..len - 4]);
    let metadata_len = u32::from_le_bytes(raw) as usize;

    let available = len - PARQUET_MAGIC.len() - FOOTER_TRAILER_LEN;
    if metadata_len > available {
        return Err(ParseError::Format(format!(
            "Invalid Parquet file. Footer length {} exceeds the {} bytes available",
            metadata_len, available
        )));
    }
    Ok(metadata_len)
}

fn normalize_created_by(created_by: Option<&str>) -> String {
    match created_by.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => UNKNOWN_WRITER.to_string(),
    }
}

/// Decode the footer of an in-memory Parquet image.
pub fn read_footer(bytes: &Bytes) -> ParseOutcome<Footer> {
    let serialized_size = footer_len(bytes)?;

    let parquet = ParquetMetaDataReader::new()
        .parse_and_finish(bytes)
        .map_err(ParseError::format)?;

    let file_meta = parquet.file_metadata();
    let metadata = FileMetadata {
        num_row_groups: parquet.num_row_groups() as u64,
        num_rows: non_negative(file_meta.num_rows(), "num_rows").map_err(ParseError::Format)?,
        num_columns: file_meta.schema_descr().num_columns() as u64,
        serialized_size: serialized_size as u64,
        created_by: normalize_created_by(file_meta.created_by()),
    };

    debug!(
        row_groups = metadata.num_row_groups,
        rows = metadata.num_rows,
        columns = metadata.num_columns,
        footer_bytes = metadata.serialized_size,
        "decoded footer"
    );

    Ok(Footer {
        metadata,
        parquet: Arc::new(parquet),
    })
}
