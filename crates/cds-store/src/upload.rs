use std::io;
use std::path::Path;

use cds_archive::ArchiveReport;
use futures_util::{Stream, StreamExt};
use tokio::io::AsyncWriteExt;

use crate::error::{Error, IoResultExt, Result};
use crate::layout::ContentId;
use crate::store::{PackageStore, extract_staged};

const TRACING_TARGET: &str = "cds_store::upload";

/// Outcome of a completed upload.
#[derive(Clone, Debug)]
pub struct UploadReceipt {
    pub id: ContentId,
    /// Bytes of the stored archive.
    pub archive_bytes: u64,
    pub report: ArchiveReport,
}

impl PackageStore {
    /// Store an uploaded archive and replace the extracted tree.
    ///
    /// The byte stream is written to a staging file and renamed over the
    /// archive once durable. Extraction happens in a staging directory that
    /// is swapped over the previous tree. If the stream fails, nothing on
    /// disk changes. If extraction fails, the new archive stays but no
    /// extracted tree remains for `id`.
    pub async fn accept_upload<S, B, E>(&self, id: &ContentId, stream: S) -> Result<UploadReceipt>
    where
        S: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let _guard = self.locks.lock(id).await;

        let archive = self.layout().archive_path(id);
        let archive_bytes = self.persist_archive(id, &archive, stream).await?;
        tracing::debug!(
            target: TRACING_TARGET,
            id = %id,
            bytes = archive_bytes,
            "stored content archive"
        );

        let destination = self.layout().extracted_dir(id);
        let options = self.extract_options.clone();
        let extracted = {
            let destination = destination.clone();
            tokio::task::spawn_blocking(move || extract_staged(&archive, &destination, &options))
                .await?
        };

        match extracted {
            Ok(report) => {
                tracing::info!(
                    target: TRACING_TARGET,
                    id = %id,
                    entries = report.entry_count,
                    bytes = report.total_bytes,
                    "deployed content package"
                );
                Ok(UploadReceipt {
                    id: id.clone(),
                    archive_bytes,
                    report,
                })
            }
            Err(source) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    id = %id,
                    error = %source,
                    "failed to extract uploaded content"
                );
                discard_stale_tree(&destination).await;
                Err(Error::Unpack {
                    id: id.clone(),
                    source,
                })
            }
        }
    }

    async fn persist_archive<S, B, E>(&self, id: &ContentId, archive: &Path, stream: S) -> Result<u64>
    where
        S: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let staging = cds_fs::staging_path(archive, "upload")?;
        let written = match write_stream(id, &staging, stream).await {
            Ok(written) => written,
            Err(e) => {
                discard_staging_file(&staging).await;
                return Err(e);
            }
        };
        if let Err(e) = tokio::fs::rename(&staging, archive).await {
            discard_staging_file(&staging).await;
            return Err(e).with_path(archive);
        }
        Ok(written)
    }
}

async fn write_stream<S, B, E>(id: &ContentId, path: &Path, stream: S) -> Result<u64>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut stream = std::pin::pin!(stream);
    let mut file = tokio::fs::File::create(path).await.with_path(path)?;
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::Receive {
            id: id.clone(),
            source: io::Error::other(e),
        })?;
        let bytes = chunk.as_ref();
        file.write_all(bytes).await.with_path(path)?;
        written += bytes.len() as u64;
    }

    file.flush().await.with_path(path)?;
    file.sync_all().await.with_path(path)?;
    Ok(written)
}

async fn discard_staging_file(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(
                target: TRACING_TARGET,
                path = %path.display(),
                error = %e,
                "failed to remove staging file"
            );
        }
    }
}

/// Remove the extracted tree left from an earlier upload. Anything that is
/// not a directory belongs to someone else and stays.
async fn discard_stale_tree(path: &Path) {
    match tokio::fs::symlink_metadata(path).await {
        Ok(metadata) if metadata.is_dir() => {}
        _ => return,
    }
    if let Err(e) = tokio::fs::remove_dir_all(path).await {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(
                target: TRACING_TARGET,
                path = %path.display(),
                error = %e,
                "failed to remove stale content directory"
            );
        }
    }
}
