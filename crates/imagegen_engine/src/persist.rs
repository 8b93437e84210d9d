//! Atomic writes for saved images and shell state.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

const MAX_NAME_ATTEMPTS: u32 = 100;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{0:?} exists and is not a directory")]
    NotADirectory(PathBuf),
    #[error("{0:?} does not name a file")]
    InvalidTarget(PathBuf),
    #[error("no free file name for {stem:?}")]
    NamesExhausted { stem: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

fn prepare_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PersistError::NotADirectory(dir.to_path_buf())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(fs::create_dir_all(dir)?),
        Err(err) => Err(err.into()),
    }
}

/// Content fully written and synced next to its final location.
fn stage(dir: &Path, content: &[u8]) -> Result<NamedTempFile, PersistError> {
    prepare_dir(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file_mut().sync_all()?;
    Ok(tmp)
}

/// Replaces `path` in one rename, creating its directory when missing.
pub fn replace_file(path: &Path, content: impl AsRef<[u8]>) -> Result<(), PersistError> {
    if path.file_name().is_none() {
        return Err(PersistError::InvalidTarget(path.to_path_buf()));
    }
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    stage(dir, content.as_ref())?
        .persist(path)
        .map_err(|err| PersistError::Io(err.error))?;
    Ok(())
}

/// Writes `content` to `<stem>.<extension>` in `dir`, falling back to
/// `<stem>-<n>.<extension>` when the name is taken. Existing files are never
/// overwritten.
pub fn create_unique(
    dir: &Path,
    stem: &str,
    extension: &str,
    content: impl AsRef<[u8]>,
) -> Result<PathBuf, PersistError> {
    let mut tmp = stage(dir, content.as_ref())?;
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let name = match attempt {
            0 => format!("{stem}.{extension}"),
            n => format!("{stem}-{n}.{extension}"),
        };
        let target = dir.join(name);
        match tmp.persist_noclobber(&target) {
            Ok(_) => return Ok(target),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => tmp = err.file,
            Err(err) => return Err(PersistError::Io(err.error)),
        }
    }
    Err(PersistError::NamesExhausted {
        stem: stem.to_owned(),
    })
}
