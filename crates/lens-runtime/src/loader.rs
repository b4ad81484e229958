//! Asynchronous loading of the raw inflation and USD/TRY payloads.
//!
//! Reading the two files is the only suspension point of the pipeline. Both
//! reads run concurrently and each is retried up to [`MAX_READ_ATTEMPTS`]
//! times with linear back-off (0 ms → 100 ms → 200 ms).

use std::path::{Path, PathBuf};
use std::time::Duration;

use lens_core::error::{LensError, Result};

/// Maximum number of read attempts per file.
pub const MAX_READ_ATTEMPTS: u32 = 3;

/// Back-off step between attempts.
const BACKOFF_STEP_MS: u64 = 100;

/// Raw text of both payloads, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayloads {
    pub inflation: String,
    pub fx: String,
}

/// Where to read the payloads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadPaths {
    pub inflation: PathBuf,
    pub fx: PathBuf,
}

impl PayloadPaths {
    pub fn new(inflation: impl Into<PathBuf>, fx: impl Into<PathBuf>) -> Self {
        Self {
            inflation: inflation.into(),
            fx: fx.into(),
        }
    }

    /// Read both files concurrently.
    ///
    /// Fails with the first [`LensError::FileRead`] encountered.
    pub async fn load(&self) -> Result<RawPayloads> {
        let (inflation, fx) = tokio::try_join!(
            read_text_with_retry(&self.inflation),
            read_text_with_retry(&self.fx),
        )?;
        tracing::debug!(
            inflation_bytes = inflation.len(),
            fx_bytes = fx.len(),
            "payloads loaded"
        );
        Ok(RawPayloads { inflation, fx })
    }
}

/// Read `path` as UTF-8 text, retrying transient failures.
///
/// A missing file is not retried.
pub async fn read_text_with_retry(path: &Path) -> Result<String> {
    let mut attempt = 0;
    loop {
        if attempt > 0 {
            let sleep_ms = attempt as u64 * BACKOFF_STEP_MS;
            tracing::debug!(attempt, sleep_ms, path = %path.display(), "retrying read after back-off");
            tokio::time::sleep(Duration::from_millis(sleep_ms)).await;
        }

        match tokio::fs::read_to_string(path).await {
            Ok(text) => return Ok(text),
            Err(source) => {
                attempt += 1;
                let permanent = source.kind() == std::io::ErrorKind::NotFound;
                if permanent || attempt >= MAX_READ_ATTEMPTS {
                    tracing::warn!(attempt, path = %path.display(), error = %source, "read failed");
                    return Err(LensError::FileRead {
                        path: path.to_path_buf(),
                        source,
                    });
                }
                tracing::warn!(attempt, path = %path.display(), error = %source, "read attempt failed");
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
