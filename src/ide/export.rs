//! Debug export of synthetic documents.
//!
//! Writes every synthetic document of an [`Analysis`] to a directory, named
//! `<document index>-<file name>.<kind>.<language>`. With the `serde`
//! feature each file gets a `.map.json` sibling holding its mappings and
//! teleports.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[cfg(feature = "serde")]
use crate::mapping::{Mapping, Teleport};
#[cfg(feature = "serde")]
use crate::project::{SyntheticDocument, SyntheticId};

use super::analysis::Analysis;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[cfg(feature = "serde")]
    #[error("failed to serialize mappings for {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Write every synthetic document under `dir`, creating it if needed.
///
/// Returns the written paths in document order.
pub fn dump_synthetic_documents(analysis: &Analysis, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    for synthetic in analysis.synthetic_documents() {
        let original = analysis
            .path(synthetic.id.document)
            .map_or("unnamed", |path| path.file_name());
        let name = format!(
            "{}-{}.{}.{}",
            synthetic.id.document.index(),
            original,
            synthetic.id.kind,
            synthetic.language
        );
        let path = dir.join(&name);
        write(&path, synthetic.text.as_bytes())?;
        written.push(path.clone());

        #[cfg(feature = "serde")]
        written.push(write_mappings(&path, synthetic)?);
    }
    tracing::debug!(dir = %dir.display(), files = written.len(), "synthetic documents exported");
    Ok(written)
}

fn write(path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    fs::write(path, contents).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize)]
struct MapFile<'a> {
    id: SyntheticId,
    version: u32,
    language: &'a str,
    mappings: &'a [Mapping],
    teleports: &'a [Teleport],
}

#[cfg(feature = "serde")]
fn write_mappings(document_path: &Path, synthetic: &SyntheticDocument) -> Result<PathBuf, ExportError> {
    let mut name = document_path.as_os_str().to_owned();
    name.push(".map.json");
    let path = PathBuf::from(name);

    let map = MapFile {
        id: synthetic.id,
        version: synthetic.version,
        language: &synthetic.language,
        mappings: synthetic.source_map.mappings(),
        teleports: synthetic.teleports.teleports(),
    };
    let json = serde_json::to_vec_pretty(&map).map_err(|source| ExportError::Json {
        path: path.clone(),
        source,
    })?;
    write(&path, &json)?;
    Ok(path)
}
