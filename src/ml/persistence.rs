//! Model artifact file format.
//!
//! ```text
//! magic    4 bytes   "RLFM"
//! version  u32 LE    format version
//! length   u64 LE    payload length in bytes
//! payload  length    bincode-encoded TrainedModel
//! checksum u32 LE    CRC32 of the payload
//! ```
//!
//! Artifacts are written to a temporary file next to the destination and
//! renamed into place once fully flushed, so a failed write never leaves a
//! partial artifact at the destination path.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, info};
use uuid::Uuid;

use crate::error::{ReliefError, Result};
use crate::ml::model::TrainedModel;

/// File signature of a model artifact.
pub const MAGIC: [u8; 4] = *b"RLFM";

/// Current artifact format version.
pub const FORMAT_VERSION: u32 = 1;

const HEADER_LEN: usize = 4 + 4 + 8;
const CHECKSUM_LEN: usize = 4;

/// Encode `model` into artifact bytes.
pub fn encode(model: &TrainedModel) -> Result<Vec<u8>> {
    let payload = bincode::serialize(model)?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len() + CHECKSUM_LEN);
    bytes.extend_from_slice(&MAGIC);
    bytes.write_u32::<LittleEndian>(FORMAT_VERSION)?;
    bytes.write_u64::<LittleEndian>(payload.len() as u64)?;
    bytes.extend_from_slice(&payload);
    bytes.write_u32::<LittleEndian>(crc32fast::hash(&payload))?;
    Ok(bytes)
}

/// Verify and decode artifact bytes.
pub fn decode(bytes: &[u8]) -> Result<TrainedModel> {
    if bytes.len() < HEADER_LEN + CHECKSUM_LEN {
        return Err(ReliefError::persistence(format!(
            "artifact is truncated ({} bytes)",
            bytes.len()
        )));
    }

    let mut reader = bytes;
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(ReliefError::persistence("not a model artifact (bad magic)"));
    }

    let version = reader.read_u32::<LittleEndian>()?;
    if version != FORMAT_VERSION {
        return Err(ReliefError::persistence(format!(
            "unsupported artifact version {version} (expected {FORMAT_VERSION})"
        )));
    }

    let length = reader.read_u64::<LittleEndian>()?;
    let expected = (reader.len() - CHECKSUM_LEN) as u64;
    if length != expected {
        return Err(ReliefError::persistence(format!(
            "payload length {length} does not match artifact size ({expected} bytes available)"
        )));
    }

    let (payload, mut trailer) = reader.split_at(reader.len() - CHECKSUM_LEN);
    let checksum = trailer.read_u32::<LittleEndian>()?;
    let actual = crc32fast::hash(payload);
    if checksum != actual {
        return Err(ReliefError::persistence(format!(
            "checksum mismatch (stored {checksum:08x}, computed {actual:08x})"
        )));
    }

    Ok(bincode::deserialize(payload)?)
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
}

fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

/// Write `model` to `path`, replacing any existing file.
pub fn save(model: &TrainedModel, path: &Path) -> Result<()> {
    let bytes = encode(model)?;
    let temp = temp_path(path);

    let result = write_file(&temp, &bytes).and_then(|_| fs::rename(&temp, path));
    if let Err(err) = result {
        // The temporary file may not exist; nothing to report if removal fails.
        let _ = fs::remove_file(&temp);
        return Err(ReliefError::persistence(format!(
            "cannot write model to {}: {err}",
            path.display()
        )));
    }

    info!("Wrote {} byte model artifact to {}", bytes.len(), path.display());
    Ok(())
}

/// Read and verify the artifact at `path`.
pub fn load(path: &Path) -> Result<TrainedModel> {
    let bytes = fs::read(path).map_err(|err| {
        ReliefError::persistence(format!("cannot read model from {}: {err}", path.display()))
    })?;
    debug!("Read {} byte model artifact from {}", bytes.len(), path.display());
    decode(&bytes)
}
