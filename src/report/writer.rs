// ABOUTME: Writes deployment reports to the reports directory.
// ABOUTME: Write failures are logged and swallowed, never returned to the deployer.

use snafu::{ResultExt, Snafu};
use std::path::{Path, PathBuf};

use super::{DeploymentReport, render_html};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ReportError {
    #[snafu(display("could not create {}: {source}", path.display()))]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("could not serialize report: {source}"))]
    Serialize { source: serde_json::Error },

    #[snafu(display("could not render report page: {source}"))]
    Render { source: minijinja::Error },

    #[snafu(display("could not write {}: {source}", path.display()))]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Persists reports as `{stem}.json` and `{stem}.html`.
#[derive(Debug, Clone)]
pub struct Reporter {
    dir: PathBuf,
}

impl Reporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write both artifacts. Returns the JSON path, or `None` if anything failed.
    pub fn record(&self, report: &DeploymentReport) -> Option<PathBuf> {
        match self.write(report) {
            Ok(path) => {
                tracing::info!("report saved to {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::warn!("deployment report not saved: {}", e);
                None
            }
        }
    }

    fn write(&self, report: &DeploymentReport) -> Result<PathBuf, ReportError> {
        std::fs::create_dir_all(&self.dir).context(CreateDirSnafu { path: &self.dir })?;

        let stem = report.file_stem();
        let json_path = self.dir.join(format!("{}.json", stem));
        let json = serde_json::to_string_pretty(report).context(SerializeSnafu)?;
        std::fs::write(&json_path, json).context(WriteSnafu { path: &json_path })?;

        let html_path = self.dir.join(format!("{}.html", stem));
        let html = render_html(report).context(RenderSnafu)?;
        std::fs::write(&html_path, html).context(WriteSnafu { path: &html_path })?;

        Ok(json_path)
    }
}
