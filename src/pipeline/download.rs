//! Concurrent image download into the run's staging directory.
//!
//! ## Why a bounded fan-out?
//!
//! The downloads are the only network-bound step that benefits from
//! parallelism, but an image-heavy page could open one socket per image if
//! left uncapped. `buffer_unordered(cap)` launches at most `cap` downloads
//! at a time while still letting results complete in any order; the caller
//! joins the whole stream before moving on, so downstream stages always see
//! the complete, stable asset set.
//!
//! A failed download never aborts its siblings: every task resolves to a
//! [`DownloadedAsset`], with the failure recorded in `error` and the local
//! path absent.

use crate::error::ImageError;
use crate::output::ImageRef;
use crate::pipeline::extract::url_basename;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One image after the download fan-out.
///
/// `local_path` is `Some` only when the body was fetched with a success
/// status and written to staging. The file lives exactly as long as the
/// run's staging directory.
#[derive(Debug)]
pub struct DownloadedAsset {
    /// The image reference this asset was downloaded from.
    pub image: ImageRef,
    /// Path of the staged file; `None` when the download failed.
    pub local_path: Option<PathBuf>,
    /// Why the download failed, when it did.
    pub error: Option<ImageError>,
}

/// Download every referenced image into `staging`, at most `cap` at a time.
///
/// Returns one [`DownloadedAsset`] per input reference, joined before
/// returning. Failures are per-asset and logged here.
pub async fn download_all(
    client: &reqwest::Client,
    refs: &[ImageRef],
    staging: &Path,
    cap: usize,
) -> Vec<DownloadedAsset> {
    stream::iter(refs.iter().cloned().map(|image| async move {
        download_one(client, image, staging).await
    }))
    .buffer_unordered(cap.max(1))
    .collect()
    .await
}

/// Download a single image and write it to staging.
///
/// Each asset stages under its URL basename, so concurrent tasks never write
/// the same file twice unless the page embeds duplicate URLs — in which case
/// both write identical bytes and the last write wins harmlessly.
async fn download_one(
    client: &reqwest::Client,
    image: ImageRef,
    staging: &Path,
) -> DownloadedAsset {
    let url = image.url.clone();

    let failed = |image: ImageRef, error: ImageError| {
        warn!("{}", error);
        DownloadedAsset {
            image,
            local_path: None,
            error: Some(error),
        }
    };

    let response = match client.get(&url).send().await {
        Ok(r) => r,
        Err(e) => {
            return failed(
                image,
                ImageError::Download {
                    url,
                    detail: e.to_string(),
                },
            );
        }
    };

    if !response.status().is_success() {
        let status = response.status();
        return failed(
            image,
            ImageError::Download {
                url,
                detail: format!("HTTP {status}"),
            },
        );
    }

    let bytes = match response.bytes().await {
        Ok(b) => b,
        Err(e) => {
            return failed(
                image,
                ImageError::Download {
                    url,
                    detail: e.to_string(),
                },
            );
        }
    };

    let path = staging.join(url_basename(&url));
    if let Err(e) = tokio::fs::write(&path, &bytes).await {
        return failed(
            image,
            ImageError::Stage {
                url,
                detail: e.to_string(),
            },
        );
    }

    debug!("Staged {} ({} bytes) at {}", url, bytes.len(), path.display());
    DownloadedAsset {
        image,
        local_path: Some(path),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Network download behaviour is covered by the gated e2e tests; here we
    // pin the staging-path construction that the orchestrator depends on.
    #[test]
    fn staged_path_uses_url_basename() {
        let staging = Path::new("/tmp/webcap-staging");
        let url = "https://upload.wikimedia.org/x/y/pic.jpg";
        assert_eq!(
            staging.join(url_basename(url)),
            PathBuf::from("/tmp/webcap-staging/pic.jpg")
        );
    }
}
