use std::path::PathBuf;

use serde_json::Value;
use tracing::{info, warn};

use super::types::{Inventory, Page};

/// Anything that can produce the workload inventory for one run.
pub trait WorkloadSource {
    /// Where the workloads come from, for log lines and errors.
    fn origin(&self) -> String;

    /// Collect every workload. Failures are logged and reflected in
    /// [`Inventory::complete`], never raised.
    async fn fetch_all_workloads(&self) -> Inventory;
}

/// A saved API response on disk, read with the same page rules as the PCE.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read(&self) -> anyhow::Result<Value> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl WorkloadSource for FileSource {
    fn origin(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch_all_workloads(&self) -> Inventory {
        let body = match self.read().await {
            Ok(body) => body,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot load workloads file");
                return Inventory::default();
            }
        };

        let (workloads, next) = match Page::from_value(body) {
            Ok(page) => page.into_parts(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "workloads file is malformed");
                return Inventory::default();
            }
        };
        if let Some(next) = next {
            info!(%next, "file source ignores the pagination cursor");
        }
        Inventory {
            workloads,
            pages: 1,
            complete: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_saved_listing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workloads.json");
        std::fs::write(
            &path,
            r#"{"results": [{"hostname": "a"}, {"hostname": "b"}], "pagination": {"next": "/x"}}"#,
        )
        .unwrap();

        let inventory = FileSource::new(&path).fetch_all_workloads().await;
        assert_eq!(inventory.workloads.len(), 2);
        assert!(inventory.complete);
        assert_eq!(inventory.pages, 1);
    }

    #[tokio::test]
    async fn missing_or_invalid_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let missing = FileSource::new(dir.path().join("nope.json"));
        assert!(missing.fetch_all_workloads().await.is_unavailable());

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(FileSource::new(&path).fetch_all_workloads().await.is_unavailable());

        let malformed = dir.path().join("malformed.json");
        std::fs::write(&malformed, r#"{"results": {"hostname": "a"}}"#).unwrap();
        assert!(FileSource::new(&malformed).fetch_all_workloads().await.is_unavailable());
    }
}
