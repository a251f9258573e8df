use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::Digest;

use crate::error::{IngestError, Result};

/// Hash a file in 64 KiB chunks.
pub fn file_sha256_hex(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| IngestError::read(path, e))?;
    let mut hasher = sha2::Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let read = file.read(&mut buf).map_err(|e| IngestError::read(path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}
