//! Opening of cartography exports (plain, gzipped or zipped KML).

use std::{fs::File, io::{self, BufRead, BufReader, Seek}, path::Path};

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use zip::ZipArchive;

/// Container format of a cartography file, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartographyFormat {
    /// Bare `.kml` (or any unknown extension).
    Kml,
    /// `.kml.gz` / `.gz`
    Gzip,
    /// `.kmz`, a zip archive holding the document
    Kmz,
}

impl CartographyFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("gz") => Self::Gzip,
            Some("kmz") => Self::Kmz,
            _ => Self::Kml,
        }
    }
}

/// Open a cartography file for streaming.
pub fn open_cartography(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)
        .with_context(|| format!("[kml::source] Failed to open cartography file: {}", path.display()))?;

    Ok(match CartographyFormat::from_path(path) {
        CartographyFormat::Kml => Box::new(BufReader::new(file)),
        CartographyFormat::Gzip => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        CartographyFormat::Kmz => Box::new(BufReader::new(spool_kmz(file, path)?)),
    })
}

/// Copy the first `.kml` entry of a KMZ archive into an anonymous temp file.
///
/// Zip entries borrow their archive, so the entry is spooled to disk instead of being held in
/// memory; census exports run to several hundred megabytes once inflated.
fn spool_kmz(file: File, path: &Path) -> Result<File> {
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("[kml::source] Failed to read zip archive {}", path.display()))?;

    let mut found = None;
    for i in 0..archive.len() {
        let entry = archive.by_index(i)
            .with_context(|| format!("[kml::source] Failed to read entry {i} of {}", path.display()))?;
        if entry.name().to_ascii_lowercase().ends_with(".kml") {
            found = Some(i);
            break;
        }
    }
    let index = found.with_context(|| format!("[kml::source] No .kml entry in {}", path.display()))?;

    let mut entry = archive.by_index(index)
        .with_context(|| format!("[kml::source] Failed to open entry {index} of {}", path.display()))?;
    let mut spool = tempfile::tempfile().context("[kml::source] Failed to create spool file")?;
    io::copy(&mut entry, &mut spool)
        .with_context(|| format!("[kml::source] Failed to inflate {} from {}", entry.name(), path.display()))?;
    spool.rewind()?;
    Ok(spool)
}
