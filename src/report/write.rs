use std::{fs::File, io::{BufWriter, Write}, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use serde::Serialize;
use tempfile::NamedTempFile;

/// Write-then-rename wrapper so a failed run never leaves a half written report behind.
pub struct PendingWrite {
    target: PathBuf,
    tmp: NamedTempFile,
}

impl PendingWrite {
    /// Open a temp file next to `target`, creating parent directories as needed.
    pub fn open(target: &Path) -> Result<Self> {
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("[report::write] create dir {}", dir.display()))?;
        let tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("[report::write] create temp file in {}", dir.display()))?;
        Ok(Self { target: target.to_path_buf(), tmp })
    }

    pub fn target(&self) -> &Path { &self.target }

    /// Flush, fsync and move the temp file onto the target.
    pub fn finalize(self) -> Result<()> {
        self.tmp.as_file().sync_all().ok(); // best-effort fsync file
        self.tmp.persist(&self.target)
            .with_context(|| format!("[report::write] rename to {}", self.target.display()))?;
        if let Some(dir) = self.target.parent() {
            let _ = File::open(dir).and_then(|f| f.sync_all());
        }
        Ok(())
    }
}

impl Write for PendingWrite {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.tmp.write(buf) }
    fn flush(&mut self) -> std::io::Result<()> { self.tmp.flush() }
}

impl PendingWrite {
    /// Serialize `value` as JSON and commit it to the target. Output ends with a newline.
    pub fn write_json<T: Serialize>(self, value: &T, pretty: bool) -> Result<()> {
        let target = self.target.clone();
        let mut out = BufWriter::new(self);
        if pretty {
            serde_json::to_writer_pretty(&mut out, value)
        } else {
            serde_json::to_writer(&mut out, value)
        }
        .with_context(|| format!("[report::write] serialize {}", target.display()))?;
        out.write_all(b"\n")?;

        let sink = out.into_inner()
            .map_err(|e| e.into_error())
            .with_context(|| format!("[report::write] flush {}", target.display()))?;
        sink.finalize()
    }
}

/// Serialize `value` as JSON to `path`, atomically.
pub fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    PendingWrite::open(path)?.write_json(value, pretty)
}
