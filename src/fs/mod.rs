//! Local file access for `file:` URLs.
//!
//! Reads seek straight to the requested range. Writes go to a temporary
//! sibling that is renamed over the target once every byte is on disk, so a
//! failed write never leaves a partial file behind.

use std::io;
use std::path::{Path, PathBuf};

use crate::data::PushStream;
use crate::range::Window;

#[cfg(feature = "fs")]
mod imp {
    use std::io::{self, SeekFrom};
    use std::path::{Path, PathBuf};

    use futures_util::StreamExt;
    use tokio::fs::{self, File};
    use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
    use tokio_util::io::ReaderStream;
    use tracing::{trace, warn};
    use uuid::Uuid;

    use crate::data::PushStream;
    use crate::range::Window;

    async fn open_at(path: &Path, window: Window) -> io::Result<(File, u64)> {
        let mut file = File::open(path).await?;
        let len = file.metadata().await?.len();
        let r = window.clip(len);
        file.seek(SeekFrom::Start(r.start)).await?;
        Ok((file, r.end - r.start))
    }

    pub(super) async fn read_range(path: &Path, window: Window) -> io::Result<Vec<u8>> {
        let (file, len) = open_at(path, window).await?;
        let mut buf = Vec::with_capacity(len as usize);
        file.take(len).read_to_end(&mut buf).await?;
        Ok(buf)
    }

    pub(super) async fn open_stream(
        path: &Path,
        window: Window,
        chunk_size: usize,
    ) -> io::Result<PushStream> {
        let (file, len) = open_at(path, window).await?;
        trace!(path = %path.display(), len, "streaming file");
        Ok(ReaderStream::with_capacity(file.take(len), chunk_size.max(1)).boxed())
    }

    fn temp_sibling(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4()))
    }

    pub(super) async fn write_stream(path: &Path, mut stream: PushStream) -> io::Result<u64> {
        let temp = temp_sibling(path);
        let mut file = File::create(&temp).await?;

        let written = async {
            let mut written = 0u64;
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            file.sync_all().await?;
            Ok::<_, io::Error>(written)
        }
        .await;
        drop(file);

        match written {
            Ok(written) => {
                fs::rename(&temp, path).await?;
                trace!(path = %path.display(), written, "file written");
                Ok(written)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "write failed, discarding temporary file");
                let _ = fs::remove_file(&temp).await;
                Err(e)
            }
        }
    }
}

#[cfg(not(feature = "fs"))]
mod imp {
    use std::io;
    use std::path::Path;

    use crate::data::PushStream;
    use crate::range::Window;

    fn unsupported() -> io::Error {
        io::Error::new(io::ErrorKind::Unsupported, "built without the `fs` feature")
    }

    pub(super) async fn read_range(_path: &Path, _window: Window) -> io::Result<Vec<u8>> {
        Err(unsupported())
    }

    pub(super) async fn open_stream(
        _path: &Path,
        _window: Window,
        _chunk_size: usize,
    ) -> io::Result<PushStream> {
        Err(unsupported())
    }

    pub(super) async fn write_stream(_path: &Path, _stream: PushStream) -> io::Result<u64> {
        Err(unsupported())
    }
}

/// Reads the bytes of the file at `path` inside `window`.
pub(crate) async fn read_range(path: &Path, window: Window) -> io::Result<Vec<u8>> {
    imp::read_range(path, window).await
}

/// Streams the bytes of the file at `path` inside `window`.
pub(crate) async fn open_stream(
    path: &Path,
    window: Window,
    chunk_size: usize,
) -> io::Result<PushStream> {
    imp::open_stream(path, window, chunk_size).await
}

/// Length of the file at `path`.
pub(crate) fn file_len(path: &Path) -> io::Result<u64> {
    std::fs::metadata(path).map(|m| m.len())
}

/// Replaces the file at `path` with the bytes of `stream`.
pub(crate) async fn write_stream(path: &Path, stream: PushStream) -> io::Result<u64> {
    imp::write_stream(path, stream).await
}

/// Writes `stream` to a fresh file in `dir` and returns its path.
pub(crate) async fn write_temp(dir: &Path, stream: PushStream) -> io::Result<PathBuf> {
    let path = dir.join(format!("binconv-{}", uuid::Uuid::new_v4()));
    write_stream(&path, stream).await?;
    Ok(path)
}
