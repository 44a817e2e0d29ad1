//! Segment file formats.
//!
//! Each segment of a rowset is a pair of files in the tablet (or snapshot)
//! directory, named after the rowset id:
//!
//! ```text
//! <rowset-id>_<n>.dat    row payloads
//! <rowset-id>_<n>.idx    row offset table
//! ```
//!
//! # Modern layout
//!
//! ```text
//! .dat: magic("TSG2", 4) + version(4) + row_count(4)
//!       + rows: [len(4) + payload]...
//!       + crc32 over everything preceding (4)
//! .idx: magic("TIX2", 4) + version(4) + row_count(4)
//!       + offsets: [u64]... (offset of each row's length prefix in .dat)
//!       + crc32 over everything preceding (4)
//! ```
//!
//! # Legacy layout
//!
//! ```text
//! .dat: magic("TSG1", 4) + version(4) + row_count(4)
//!       + rows: [len(4) + crc32(payload)(4) + payload]...
//! .idx: magic("TIX1", 4) + version(4) + row_count(4) + offsets: [u64]...
//! ```
//!
//! The Legacy layout checksums rows individually and has no file footer.
//! All integers are little-endian.

use std::path::{Path, PathBuf};

use tessera_core::{Result, RowsetId, RowsetType, TesseraError};

/// Modern data file magic.
pub const MODERN_DATA_MAGIC: &[u8; 4] = b"TSG2";
/// Modern index file magic.
pub const MODERN_INDEX_MAGIC: &[u8; 4] = b"TIX2";
/// Legacy data file magic.
pub const LEGACY_DATA_MAGIC: &[u8; 4] = b"TSG1";
/// Legacy index file magic.
pub const LEGACY_INDEX_MAGIC: &[u8; 4] = b"TIX1";

/// Format version written into segment headers.
pub const SEGMENT_FORMAT_VERSION: u32 = 1;

const HEADER_LEN: usize = 12;

/// Path of segment `n`'s data file for rowset `id` under `dir`.
pub fn data_path(dir: &Path, id: RowsetId, n: u32) -> PathBuf {
    dir.join(format!("{id}_{n}.dat"))
}

/// Path of segment `n`'s index file for rowset `id` under `dir`.
pub fn index_path(dir: &Path, id: RowsetId, n: u32) -> PathBuf {
    dir.join(format!("{id}_{n}.idx"))
}

/// In-memory row offset table for one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentIndex {
    /// Byte offset of each row record within the data file.
    pub offsets: Vec<u64>,
}

impl SegmentIndex {
    /// Number of rows in the segment.
    pub fn row_count(&self) -> usize {
        self.offsets.len()
    }
}

/// Write one segment (data + index pair) in the given layout.
pub fn write_segment(
    dir: &Path,
    id: RowsetId,
    n: u32,
    rows: &[Vec<u8>],
    layout: RowsetType,
) -> Result<()> {
    let mut data = Vec::new();
    let mut offsets = Vec::with_capacity(rows.len());

    let data_magic = match layout {
        RowsetType::Modern => MODERN_DATA_MAGIC,
        RowsetType::Legacy => LEGACY_DATA_MAGIC,
    };
    data.extend_from_slice(data_magic);
    data.extend_from_slice(&SEGMENT_FORMAT_VERSION.to_le_bytes());
    data.extend_from_slice(&(rows.len() as u32).to_le_bytes());

    for row in rows {
        offsets.push(data.len() as u64);
        data.extend_from_slice(&(row.len() as u32).to_le_bytes());
        if layout == RowsetType::Legacy {
            data.extend_from_slice(&crc32fast::hash(row).to_le_bytes());
        }
        data.extend_from_slice(row);
    }
    if layout == RowsetType::Modern {
        let crc = crc32fast::hash(&data);
        data.extend_from_slice(&crc.to_le_bytes());
    }

    let mut index = Vec::new();
    let index_magic = match layout {
        RowsetType::Modern => MODERN_INDEX_MAGIC,
        RowsetType::Legacy => LEGACY_INDEX_MAGIC,
    };
    index.extend_from_slice(index_magic);
    index.extend_from_slice(&SEGMENT_FORMAT_VERSION.to_le_bytes());
    index.extend_from_slice(&(offsets.len() as u32).to_le_bytes());
    for offset in &offsets {
        index.extend_from_slice(&offset.to_le_bytes());
    }
    if layout == RowsetType::Modern {
        let crc = crc32fast::hash(&index);
        index.extend_from_slice(&crc.to_le_bytes());
    }

    std::fs::write(data_path(dir, id, n), &data)?;
    std::fs::write(index_path(dir, id, n), &index)?;
    Ok(())
}

/// Load and validate one segment's index file.
pub fn load_index(dir: &Path, id: RowsetId, n: u32, layout: RowsetType) -> Result<SegmentIndex> {
    let path = index_path(dir, id, n);
    let bytes = read_file(&path)?;
    let expected_magic = match layout {
        RowsetType::Modern => MODERN_INDEX_MAGIC,
        RowsetType::Legacy => LEGACY_INDEX_MAGIC,
    };
    let body = validate_framing(&path, &bytes, expected_magic, layout == RowsetType::Modern)?;

    let row_count = u32::from_le_bytes(body[8..12].try_into().unwrap()) as usize;
    let table = &body[HEADER_LEN..];
    if table.len() != row_count * 8 {
        return Err(TesseraError::SegmentCorrupt {
            path,
            detail: format!(
                "index table holds {} bytes for {} rows",
                table.len(),
                row_count
            ),
        });
    }

    let offsets = table
        .chunks_exact(8)
        .map(|c| u64::from_le_bytes(c.try_into().unwrap()))
        .collect();
    Ok(SegmentIndex { offsets })
}

/// Read and validate all rows of one segment data file.
pub fn read_rows(dir: &Path, id: RowsetId, n: u32, layout: RowsetType) -> Result<Vec<Vec<u8>>> {
    let path = data_path(dir, id, n);
    let bytes = read_file(&path)?;
    let expected_magic = match layout {
        RowsetType::Modern => MODERN_DATA_MAGIC,
        RowsetType::Legacy => LEGACY_DATA_MAGIC,
    };
    let body = validate_framing(&path, &bytes, expected_magic, layout == RowsetType::Modern)?;

    let row_count = u32::from_le_bytes(body[8..12].try_into().unwrap()) as usize;
    let mut rows = Vec::with_capacity(row_count);
    let mut cursor = HEADER_LEN;
    for _ in 0..row_count {
        if cursor + 4 > body.len() {
            return Err(truncated(&path));
        }
        let len = u32::from_le_bytes(body[cursor..cursor + 4].try_into().unwrap()) as usize;
        cursor += 4;

        let mut stored_crc = None;
        if layout == RowsetType::Legacy {
            if cursor + 4 > body.len() {
                return Err(truncated(&path));
            }
            stored_crc = Some(u32::from_le_bytes(body[cursor..cursor + 4].try_into().unwrap()));
            cursor += 4;
        }

        if cursor + len > body.len() {
            return Err(truncated(&path));
        }
        let row = body[cursor..cursor + len].to_vec();
        cursor += len;

        if let Some(stored) = stored_crc {
            let computed = crc32fast::hash(&row);
            if stored != computed {
                return Err(TesseraError::SegmentCorrupt {
                    path,
                    detail: format!(
                        "row checksum mismatch: stored {stored:#010x}, computed {computed:#010x}"
                    ),
                });
            }
        }
        rows.push(row);
    }
    if cursor != body.len() {
        return Err(TesseraError::SegmentCorrupt {
            path,
            detail: format!("{} trailing bytes after last row", body.len() - cursor),
        });
    }
    Ok(rows)
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(TesseraError::DirNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(TesseraError::Io(e)),
    }
}

/// Check magic, format version, and (Modern only) the CRC32 footer.
/// Returns the body slice with any footer stripped.
fn validate_framing<'a>(
    path: &Path,
    bytes: &'a [u8],
    magic: &[u8; 4],
    has_footer: bool,
) -> Result<&'a [u8]> {
    let min_len = HEADER_LEN + if has_footer { 4 } else { 0 };
    if bytes.len() < min_len {
        return Err(truncated(path));
    }
    if &bytes[0..4] != magic {
        return Err(TesseraError::SegmentCorrupt {
            path: path.to_path_buf(),
            detail: "bad magic bytes".to_string(),
        });
    }
    let version = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
    if version != SEGMENT_FORMAT_VERSION {
        return Err(TesseraError::SegmentCorrupt {
            path: path.to_path_buf(),
            detail: format!("unsupported format version {version}"),
        });
    }
    if has_footer {
        let body = &bytes[..bytes.len() - 4];
        let stored = u32::from_le_bytes(bytes[bytes.len() - 4..].try_into().unwrap());
        let computed = crc32fast::hash(body);
        if stored != computed {
            return Err(TesseraError::SegmentCorrupt {
                path: path.to_path_buf(),
                detail: format!(
                    "file checksum mismatch: stored {stored:#010x}, computed {computed:#010x}"
                ),
            });
        }
        Ok(body)
    } else {
        Ok(bytes)
    }
}

fn truncated(path: &Path) -> TesseraError {
    TesseraError::SegmentCorrupt {
        path: path.to_path_buf(),
        detail: "file truncated".to_string(),
    }
}
