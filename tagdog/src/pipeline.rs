//! Tag pipeline orchestration
//!
//! For each matching file under a root directory:
//! 1. Fresh [`Record`]
//! 2. Populators, in list order
//! 3. One-line summary log
//! 4. Writers, in list order (skipped in dry-run mode)
//!
//! A failure in any stage is logged with the file's absolute path and the scan
//! moves on to the next file. Nothing is written for a file whose population
//! failed.

use crate::error::TagResult;
use crate::services::file_scanner::{FileScanner, ScanError};
use crate::types::{Populator, Record, TagWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome counts for one directory scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Files whose extension matched
    pub matched: usize,
    /// Files processed without error
    pub processed: usize,
    /// Files that failed in any stage
    pub failed: usize,
    pub dry_run: bool,
}

/// Ordered populator and writer chains applied to each file
#[derive(Default)]
pub struct TagPipeline {
    populators: Vec<Box<dyn Populator>>,
    writers: Vec<Box<dyn TagWriter>>,
    dry_run: bool,
}

impl TagPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip the writer pass (lookups still run and are logged)
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Append a populator; it sees the writes of every populator added before it
    pub fn add_populator(&mut self, populator: impl Populator + 'static) -> &mut Self {
        self.populators.push(Box::new(populator));
        self
    }

    /// Append a writer
    pub fn add_writer(&mut self, writer: impl TagWriter + 'static) -> &mut Self {
        self.writers.push(Box::new(writer));
        self
    }

    /// Tag every file under `root` whose extension is in `extensions`
    ///
    /// Per-file failures are logged and counted, never returned.
    pub async fn process_directory<S: AsRef<str>>(
        &self,
        root: &Path,
        extensions: &[S],
    ) -> Result<ScanSummary, ScanError> {
        let scanner = FileScanner::new(extensions.iter().map(|ext| ext.as_ref()));
        let files = scanner.scan(root)?;

        let mut summary = ScanSummary {
            matched: files.len(),
            dry_run: self.dry_run,
            ..ScanSummary::default()
        };

        for path in &files {
            match self.process_file(path).await {
                Ok(_) => summary.processed += 1,
                Err(e) => {
                    summary.failed += 1;
                    warn!(
                        file = %absolute(path).display(),
                        error = %e,
                        "Failed to tag file"
                    );
                }
            }
        }

        Ok(summary)
    }

    /// Run the populator and writer chains for one file
    pub async fn process_file(&self, path: &Path) -> TagResult<Record> {
        let mut record = Record::new(path);

        for populator in &self.populators {
            debug!(populator = populator.name(), file = %path.display(), "Populating");
            populator.populate(&mut record).await?;
        }

        info!(
            "Tagging {} (artist: {:?}, title: {:?}, album: {:?}, genre: {:?})",
            absolute(path).display(),
            record.artist,
            record.title,
            record.album,
            record.genre
        );

        if self.dry_run {
            return Ok(record);
        }

        for writer in &self.writers {
            debug!(writer = writer.name(), file = %path.display(), "Writing");
            writer.write(path, &record).await?;
        }

        Ok(record)
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
