use std::{collections::BTreeMap, fs::File, io::Read, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHash {
    pub path: String,
    pub sha256: String,
}

/// Digest sidecar of a run: what went in, what came out, and the run counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    version: String,
    generated_at: String,
    counts: BTreeMap<String, u64>,
    files: BTreeMap<String, FileHash>,
}

impl Manifest {
    pub fn new(counts: BTreeMap<&'static str, u64>, files: BTreeMap<&'static str, FileHash>) -> Self {
        Self {
            version: "1".into(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            counts: counts.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            files: files.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn counts(&self) -> &BTreeMap<String, u64> { &self.counts }

    pub fn files(&self) -> &BTreeMap<String, FileHash> { &self.files }
}

/// SHA-256 of a file, hex encoded.
pub fn sha256_file(path: &Path) -> Result<FileHash> {
    let mut file = File::open(path)
        .with_context(|| format!("[report::manifest] open for hash {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 1 << 16];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(FileHash { path: path.display().to_string(), sha256: hex::encode(hasher.finalize()) })
}
