//! Append-only error log for upstream failures.
//!
//! Every dispatcher failure is recorded here with a timestamp, independent
//! of whether the caller handles the error. The log is a plain text file,
//! one line per failure, meant for post-hoc debugging rather than replay.

use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

pub struct FaultLog {
    path: PathBuf,
    // Serializes appends so concurrent failures never interleave lines.
    write_lock: Mutex<()>,
}

impl FaultLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Append one timestamped entry. Logging failures are reported via
    /// tracing but never propagated; the log must not break the request.
    pub async fn record(&self, detail: &str) {
        let line = format!(
            "{} - {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            detail
        );

        let _guard = self.write_lock.lock().await;
        let result = async {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await?;
            file.write_all(line.as_bytes()).await
        }
        .await;

        if let Err(e) = result {
            warn!(path = %self.path.display(), "failed to append to error log: {}", e);
        }
    }
}
