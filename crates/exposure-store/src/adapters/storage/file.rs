use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, ScanResult};

use super::memory::{apply_batch, scan_range};

/// File-backed key-value store for deployments without RocksDB.
///
/// Keeps an ordered copy in memory and rewrites the whole file through a
/// temp file + rename on every batch. Suitable for development and light
/// production.
#[derive(Debug)]
pub struct FileBackedKVStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    path: PathBuf,
}

fn io_error(e: std::io::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: e.to_string(),
    }
}

impl FileBackedKVStore {
    /// Open the store at `path`, creating an empty one if the file is missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();

        let data = match std::fs::File::open(&path) {
            Ok(mut file) => {
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes).map_err(io_error)?;
                let data = decode_entries(&bytes)?;
                tracing::info!(
                    path = %path.display(),
                    bytes = bytes.len(),
                    keys = data.len(),
                    "[exposure-store] loaded storage file"
                );
                data
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "[exposure-store] no existing storage file");
                BTreeMap::new()
            }
            Err(e) => return Err(io_error(e)),
        };

        Ok(Self { data, path })
    }

    fn save_to_file(&self, data: &BTreeMap<Vec<u8>, Vec<u8>>) -> Result<(), KVStoreError> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let bytes = encode_entries(data)?;

        // Write atomically via temp file
        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path).map_err(io_error)?;
        file.write_all(&bytes).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;

        std::fs::rename(&temp_path, &self.path).map_err(io_error)
    }
}

/// Binary format: `[key_len:u32][key][value_len:u32][value]...`, little-endian.
fn encode_entries(data: &BTreeMap<Vec<u8>, Vec<u8>>) -> Result<Vec<u8>, KVStoreError> {
    let mut bytes = Vec::new();
    for (key, value) in data {
        write_chunk(&mut bytes, key)?;
        write_chunk(&mut bytes, value)?;
    }
    Ok(bytes)
}

fn write_chunk(bytes: &mut Vec<u8>, chunk: &[u8]) -> Result<(), KVStoreError> {
    bytes.extend_from_slice(&chunk_len(chunk.len())?.to_le_bytes());
    bytes.extend_from_slice(chunk);
    Ok(())
}

/// Length prefix for a chunk; entries must fit a `u32`.
fn chunk_len(len: usize) -> Result<u32, KVStoreError> {
    u32::try_from(len).map_err(|_| KVStoreError::IOError {
        message: format!("entry of {len} bytes exceeds the u32 length prefix"),
    })
}

fn decode_entries(bytes: &[u8]) -> Result<BTreeMap<Vec<u8>, Vec<u8>>, KVStoreError> {
    let mut data = BTreeMap::new();
    let mut rest = bytes;

    while !rest.is_empty() {
        let (key, after_key) = read_chunk(rest)?;
        let (value, after_value) = read_chunk(after_key)?;
        data.insert(key.to_vec(), value.to_vec());
        rest = after_value;
    }

    Ok(data)
}

fn read_chunk(bytes: &[u8]) -> Result<(&[u8], &[u8]), KVStoreError> {
    let truncated = || KVStoreError::CorruptionError {
        message: "storage file is truncated".to_string(),
    };

    let len_bytes: [u8; 4] = bytes
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(truncated)?;
    let len = u32::from_le_bytes(len_bytes) as usize;
    let rest = &bytes[4..];
    if rest.len() < len {
        return Err(truncated());
    }
    Ok(rest.split_at(len))
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        // Stage on a copy so a failed write leaves memory and disk unchanged.
        let mut staged = self.data.clone();
        apply_batch(&mut staged, operations);
        self.save_to_file(&staged)?;
        self.data = staged;
        Ok(())
    }

    fn range_scan(
        &self,
        start: &[u8],
        end: &[u8],
        limit: usize,
    ) -> Result<ScanResult, KVStoreError> {
        Ok(scan_range(&self.data, start, end, limit))
    }
}
