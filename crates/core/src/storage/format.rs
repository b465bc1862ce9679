use std::collections::BTreeMap;

use crate::errors::CoreError;

/// Magic bytes identifying a WLKV (wishlist key-value) file.
pub const MAGIC: &[u8; 4] = b"WLKV";

/// Current file format version.
pub const CURRENT_VERSION: u16 = 1;

/// Header size in bytes:
/// magic(4) + version(2) + entry_count(4) + payload_len(8) = 18
pub const HEADER_SIZE: usize = 18;

/// File header read from a .wlkv file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub version: u16,
    pub entry_count: u32,
    pub payload_len: u64,
}

/// Serialize the whole key-value map into file bytes.
///
/// Layout:
/// ```text
/// [WLKV: 4B] [version: 2B LE] [entry_count: 4B LE] [payload_len: 8B LE]
/// [payload: bincode(BTreeMap<String, String>)]
/// ```
pub fn write_file(entries: &BTreeMap<String, String>) -> Result<Vec<u8>, CoreError> {
    let entry_count = u32::try_from(entries.len()).map_err(|_| {
        CoreError::Serialization(format!("Too many entries to store: {}", entries.len()))
    })?;
    let payload = bincode::serialize(entries)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize storage: {e}")))?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&CURRENT_VERSION.to_le_bytes());
    buf.extend_from_slice(&entry_count.to_le_bytes());
    buf.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Parse the header from raw file bytes.
/// Returns the header and the payload slice.
pub fn read_header(data: &[u8]) -> Result<(FileHeader, &[u8]), CoreError> {
    if data.len() < HEADER_SIZE {
        return Err(CoreError::InvalidFileFormat(
            "File too small to be a valid WLKV file".into(),
        ));
    }

    if &data[0..4] != MAGIC {
        return Err(CoreError::InvalidFileFormat(
            "Invalid magic bytes, not a WLKV file".into(),
        ));
    }

    let version = u16::from_le_bytes([data[4], data[5]]);
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let entry_count = u32::from_le_bytes(data[6..10].try_into().map_err(|_| {
        CoreError::InvalidFileFormat("Failed to read entry count".into())
    })?);
    let payload_len = u64::from_le_bytes(data[10..18].try_into().map_err(|_| {
        CoreError::InvalidFileFormat("Failed to read payload length".into())
    })?);

    let available = (data.len() - HEADER_SIZE) as u64;
    if available < payload_len {
        return Err(CoreError::InvalidFileFormat(format!(
            "File truncated: expected {payload_len} bytes of payload, got {available}"
        )));
    }

    let payload = &data[HEADER_SIZE..HEADER_SIZE + payload_len as usize];
    let header = FileHeader {
        version,
        entry_count,
        payload_len,
    };
    Ok((header, payload))
}

/// Decode a complete file back into the key-value map.
pub fn read_file(data: &[u8]) -> Result<BTreeMap<String, String>, CoreError> {
    let (header, payload) = read_header(data)?;

    let entries: BTreeMap<String, String> = bincode::deserialize(payload)
        .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize storage: {e}")))?;

    if entries.len() != header.entry_count as usize {
        return Err(CoreError::InvalidFileFormat(format!(
            "Entry count mismatch: header says {}, payload holds {}",
            header.entry_count,
            entries.len()
        )));
    }

    Ok(entries)
}
