//! Starter project archive extraction

use crate::devfile::DEVFILE_NAME;
use anyhow::{Context, Result};
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use zip::ZipArchive;

/// Folder receiving a starter project whose files clash with existing ones
pub const CONFLICT_DIR_NAME: &str = "CONFLICT_STARTER_PROJECT";

/// Outcome of a starter project extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarterFiles {
    /// Directory the starter project was written to
    pub root: PathBuf,

    /// Extracted files, relative to `root`
    pub files: Vec<PathBuf>,

    /// Files already present in the component directory that the starter
    /// project ships as well, relative to the component directory
    pub conflicts: Vec<PathBuf>,
}

impl StarterFiles {
    /// Whether the starter project shipped its own devfile
    pub fn contains_devfile(&self) -> bool {
        self.files.iter().any(|f| f == Path::new(DEVFILE_NAME))
    }

    /// Whether the starter project was set aside in [`CONFLICT_DIR_NAME`]
    pub fn set_aside(&self) -> bool {
        self.root.ends_with(CONFLICT_DIR_NAME)
    }
}

struct Entry {
    index: usize,
    path: PathBuf,
    is_dir: bool,
}

/// Extract a starter project zip into `dest`
///
/// When every entry lives under one top-level folder (the usual layout of
/// repository archives), that folder is stripped. With `sub_dir`, only the
/// content of that folder is extracted. Entries escaping `dest` are rejected.
///
/// A starter project shipping a devfile is written over the content of
/// `dest`. Otherwise, if any of its files already exists in `dest`, the whole
/// starter project goes to `dest/CONFLICT_STARTER_PROJECT` and existing files
/// are left untouched.
pub fn extract_starter_project(
    archive: &[u8],
    dest: &Path,
    sub_dir: Option<&str>,
) -> Result<StarterFiles> {
    let mut zip =
        ZipArchive::new(Cursor::new(archive)).context("Failed to read starter project archive")?;

    let mut entries = Vec::with_capacity(zip.len());
    for index in 0..zip.len() {
        let file = zip.by_index(index)?;
        let path = file
            .enclosed_name()
            .ok_or_else(|| anyhow::anyhow!("Archive entry {:?} has an unsafe path", file.name()))?;
        entries.push(Entry {
            index,
            path,
            is_dir: file.is_dir(),
        });
    }

    if let Some(root) = single_root(&entries) {
        strip_entries(&mut entries, &root);
    }

    if let Some(sub_dir) = sub_dir.filter(|s| !s.is_empty()) {
        let sub_dir = Path::new(sub_dir);
        entries.retain(|e| e.path.starts_with(sub_dir) && e.path != sub_dir);
        strip_entries(&mut entries, sub_dir);
        if entries.is_empty() {
            anyhow::bail!("Sub directory {:?} not found in starter project", sub_dir);
        }
    }

    let conflicts: Vec<PathBuf> = entries
        .iter()
        .filter(|e| !e.is_dir && e.path != Path::new(DEVFILE_NAME))
        .filter(|e| dest.join(&e.path).exists())
        .map(|e| e.path.clone())
        .collect();
    let ships_devfile = entries
        .iter()
        .any(|e| !e.is_dir && e.path == Path::new(DEVFILE_NAME));

    let root = if conflicts.is_empty() || ships_devfile {
        dest.to_path_buf()
    } else {
        tracing::debug!(
            "{} conflicting files, extracting starter project into {}",
            conflicts.len(),
            CONFLICT_DIR_NAME
        );
        dest.join(CONFLICT_DIR_NAME)
    };

    let mut extracted = Vec::new();
    for entry in entries {
        let target = root.join(&entry.path);
        if entry.is_dir {
            std::fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create directory: {}", target.display()))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = zip.by_index(entry.index)?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        std::fs::write(&target, &contents)
            .with_context(|| format!("Failed to write file: {}", target.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = file.unix_mode() {
                std::fs::set_permissions(&target, std::fs::Permissions::from_mode(mode & 0o777))?;
            }
        }

        extracted.push(entry.path);
    }

    Ok(StarterFiles {
        root,
        files: extracted,
        conflicts,
    })
}

/// The folder shared by every entry, if any
fn single_root(entries: &[Entry]) -> Option<PathBuf> {
    let first = entries.first()?;
    let root = match first.path.components().next()? {
        Component::Normal(name) => PathBuf::from(name),
        _ => return None,
    };

    let all_under_root = entries.iter().all(|e| {
        e.path.starts_with(&root) && (e.is_dir || e.path.components().count() > 1)
    });
    all_under_root.then_some(root)
}

fn strip_entries(entries: &mut Vec<Entry>, prefix: &Path) {
    entries.retain_mut(|e| match e.path.strip_prefix(prefix) {
        Ok(rest) if !rest.as_os_str().is_empty() => {
            e.path = rest.to_path_buf();
            true
        }
        _ => false,
    });
}
