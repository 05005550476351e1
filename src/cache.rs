use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

const FILE_NAME: &str = "programm.html";

/// The single cached report file.
#[derive(Debug, Clone)]
pub struct ReportCache {
    path: PathBuf,
}

impl ReportCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<user cache dir>/kino-scrape/programm.html`, falling back to the
    /// system temp dir when the platform has no cache dir.
    pub fn default_location() -> Self {
        let dir = dirs::cache_dir().unwrap_or_else(std::env::temp_dir);
        Self::new(dir.join("kino-scrape").join(FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Remove the cached report. A missing file is not an error.
    pub fn clean(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "removed cached report");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Replace the cached report with `contents`.
    ///
    /// Written to a sibling file first and renamed into place, so readers
    /// never see a half-written report.
    pub fn store(&self, contents: &[u8]) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("html.part");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        info!(path = %self.path.display(), bytes = contents.len(), "report written");
        Ok(())
    }
}
