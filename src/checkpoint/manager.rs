use crate::checkpoint::{CheckpointError, CheckpointKind, CrawlSnapshot};
use chrono::{DateTime, Local, Utc};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Prefix shared by every checkpoint file name
pub const CHECKPOINT_PREFIX: &str = "crawler_checkpoint_";

/// Automatic checkpoints kept after cleanup
const KEEP_AUTO: usize = 5;

/// Final checkpoints kept after cleanup
const KEEP_FINAL: usize = 1;

/// Metadata about a checkpoint file on disk
#[derive(Debug, Clone)]
pub struct CheckpointInfo {
    pub path: PathBuf,
    pub kind: CheckpointKind,
    pub modified: DateTime<Utc>,
    pub size_bytes: u64,
    /// Snapshot timestamp and (visited, queued, results) counts; None when
    /// the file could not be parsed
    pub summary: Option<(String, (usize, usize, usize))>,
}

/// Writes, reads, lists and prunes checkpoint files in one directory
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    directory: PathBuf,
}

impl CheckpointManager {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Writes a snapshot to a new, uniquely named file and prunes old files
    ///
    /// The directory is created on demand. The file is written under a
    /// temporary name and renamed into place, so a crash mid-write never
    /// leaves a truncated checkpoint behind.
    pub fn save(
        &self,
        kind: CheckpointKind,
        snapshot: &CrawlSnapshot,
    ) -> Result<PathBuf, CheckpointError> {
        fs::create_dir_all(&self.directory)?;

        let path = self.unique_path(kind);
        let tmp = path.with_extension("json.tmp");

        {
            let file = fs::File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, snapshot)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &path)?;

        if let Err(e) = self.cleanup() {
            tracing::warn!("Failed to clean up old checkpoints: {}", e);
        }

        Ok(path)
    }

    /// Reads and parses a checkpoint file
    pub fn load(path: &Path) -> Result<CrawlSnapshot, CheckpointError> {
        let file = fs::File::open(path)?;
        let snapshot = serde_json::from_reader(BufReader::new(file))?;
        Ok(snapshot)
    }

    /// Lists checkpoint files, newest first
    pub fn list(&self) -> Result<Vec<CheckpointInfo>, CheckpointError> {
        let mut infos: Vec<CheckpointInfo> = self
            .checkpoint_files()?
            .into_iter()
            .map(|(path, kind, modified)| {
                let size_bytes = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
                let summary = Self::load(&path)
                    .ok()
                    .map(|snapshot| (snapshot.timestamp.clone(), snapshot.counts()));
                CheckpointInfo {
                    path,
                    kind,
                    modified: DateTime::<Utc>::from(modified),
                    size_bytes,
                    summary,
                }
            })
            .collect();

        infos.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| b.path.file_name().cmp(&a.path.file_name()))
        });
        Ok(infos)
    }

    /// Deletes all but the newest auto and final checkpoints
    ///
    /// Keeps the five newest automatic checkpoints, every manual checkpoint,
    /// and the newest final checkpoint. Returns how many files were removed.
    pub fn cleanup(&self) -> Result<usize, CheckpointError> {
        let mut auto = Vec::new();
        let mut finals = Vec::new();

        for (path, kind, modified) in self.checkpoint_files()? {
            match kind {
                CheckpointKind::Auto => auto.push((modified, path)),
                CheckpointKind::Final => finals.push((modified, path)),
                CheckpointKind::Manual => {}
            }
        }

        let mut removed = 0;
        for (mut files, keep) in [(auto, KEEP_AUTO), (finals, KEEP_FINAL)] {
            // Newest first; file names embed the save time, which breaks mtime ties
            files.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
            for (_, path) in files.into_iter().skip(keep) {
                fs::remove_file(&path)?;
                tracing::debug!("Removed old checkpoint {}", path.display());
                removed += 1;
            }
        }

        Ok(removed)
    }

    fn unique_path(&self, kind: CheckpointKind) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S_%6f");
        let base = format!("{}{}_{}", CHECKPOINT_PREFIX, kind.as_str(), stamp);

        let mut path = self.directory.join(format!("{}.json", base));
        let mut n = 1;
        while path.exists() {
            path = self.directory.join(format!("{}_{}.json", base, n));
            n += 1;
        }
        path
    }

    /// Checkpoint files in the directory with their kind and modification time
    fn checkpoint_files(&self) -> Result<Vec<(PathBuf, CheckpointKind, SystemTime)>, CheckpointError> {
        if !self.directory.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(".json") {
                continue;
            }
            let Some(kind) = CheckpointKind::from_file_name(&name) else {
                continue;
            };
            let modified = entry.metadata()?.modified()?;
            files.push((entry.path(), kind, modified));
        }
        Ok(files)
    }
}
