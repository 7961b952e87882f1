//! Piping a value into a byte sink.

use std::fmt;
use std::io;
use std::pin::Pin;

use bytes::Bytes;
use futures_io::AsyncWrite;
use futures_util::sink::Sink;
use futures_util::{AsyncWriteExt, SinkExt, StreamExt};
use tracing::warn;
use url::Url;

use super::Registry;
use crate::config::ConvertOptions;
use crate::converter::push;
use crate::data::{Data, PushStream};
use crate::error::{ConvertError, Result};
use crate::fs;

/// Where [`Registry::pipe`] writes.
pub enum Destination {
    /// Any async writer. Flushed and closed on success.
    Writer(Pin<Box<dyn AsyncWrite + Send>>),
    /// Any sink of byte chunks. Closed on success.
    Sink(Pin<Box<dyn Sink<Bytes, Error = io::Error> + Send>>),
    /// A `file:` URL. The file is replaced only once every byte is written.
    Url(String),
}

impl Destination {
    /// Wraps an async writer.
    pub fn writer<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + 'static,
    {
        Destination::Writer(Box::pin(writer))
    }

    /// Wraps a sink.
    pub fn sink<S>(sink: S) -> Self
    where
        S: Sink<Bytes, Error = io::Error> + Send + 'static,
    {
        Destination::Sink(Box::pin(sink))
    }

    /// Targets a URL.
    pub fn url(url: impl Into<String>) -> Self {
        Destination::Url(url.into())
    }
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Writer(_) => f.write_str("Writer(..)"),
            Destination::Sink(_) => f.write_str("Sink(..)"),
            Destination::Url(url) => f.debug_tuple("Url").field(url).finish(),
        }
    }
}

impl Registry {
    /// Streams the bytes of `value` inside the options' range into
    /// `destination`.
    ///
    /// If the source fails, the destination is dropped without being
    /// flushed or closed and the source error is returned. If the
    /// destination fails, the source is dropped.
    pub async fn pipe(
        &self,
        value: Data,
        destination: Destination,
        options: &ConvertOptions,
    ) -> Result<()> {
        options.validate()?;
        let stream = push::stream_of(self, value, options).await?;
        match destination {
            Destination::Writer(writer) => drain_into_writer(stream, writer).await,
            Destination::Sink(sink) => drain_into_sink(stream, sink).await,
            Destination::Url(url) => self.write_url(&url, stream).await,
        }
    }

    async fn write_url(&self, url: &str, stream: PushStream) -> Result<()> {
        let parsed = Url::parse(url).map_err(|e| ConvertError::illegal(e.to_string()))?;
        if parsed.scheme() != "file" {
            return Err(ConvertError::illegal(format!(
                "cannot write to {} URLs",
                parsed.scheme()
            )));
        }
        if !self.capabilities().file_urls {
            return Err(ConvertError::illegal("file URLs are not supported in this runtime"));
        }
        let path = parsed
            .to_file_path()
            .map_err(|()| ConvertError::illegal("file URL has no local path"))?;
        fs::write_stream(&path, stream).await?;
        Ok(())
    }
}

async fn drain_into_writer(
    mut stream: PushStream,
    mut writer: Pin<Box<dyn AsyncWrite + Send>>,
) -> Result<()> {
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => writer.write_all(&chunk).await?,
            Err(e) => {
                warn!(error = %e, "source failed, abandoning writer");
                return Err(e.into());
            }
        }
    }
    writer.flush().await?;
    writer.close().await?;
    Ok(())
}

async fn drain_into_sink(
    mut stream: PushStream,
    mut sink: Pin<Box<dyn Sink<Bytes, Error = io::Error> + Send>>,
) -> Result<()> {
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => sink.feed(chunk).await?,
            Err(e) => {
                warn!(error = %e, "source failed, abandoning sink");
                return Err(e.into());
            }
        }
    }
    sink.close().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};

    /// Records what reaches it and whether it was closed.
    #[derive(Clone, Default)]
    struct Recorder {
        bytes: Arc<Mutex<Vec<u8>>>,
        closed: Arc<Mutex<bool>>,
    }

    impl AsyncWrite for Recorder {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            self.bytes.lock().unwrap().extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            *self.closed.lock().unwrap() = true;
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_pipe_range_into_writer() {
        let reg = Registry::new();
        let recorder = Recorder::default();
        let opts = ConvertOptions::new().with_range(2, 4).with_buffer_size(3);
        reg.pipe(
            Data::buffer(&b"0123456789"[..]),
            Destination::writer(recorder.clone()),
            &opts,
        )
        .await
        .unwrap();
        assert_eq!(&recorder.bytes.lock().unwrap()[..], b"2345");
        assert!(*recorder.closed.lock().unwrap());
    }

    #[tokio::test]
    async fn test_source_error_leaves_writer_open() {
        let reg = Registry::new();
        let recorder = Recorder::default();
        let failing = futures_util::stream::iter(vec![
            Ok(Bytes::from_static(b"ab")),
            Err(io::Error::other("disk gone")),
        ]);
        let err = reg
            .pipe(
                Data::push(failing),
                Destination::writer(recorder.clone()),
                &ConvertOptions::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Io);
        assert_eq!(&recorder.bytes.lock().unwrap()[..], b"ab");
        assert!(!*recorder.closed.lock().unwrap());
    }

    #[tokio::test]
    async fn test_pipe_into_sink() {
        let reg = Registry::new();
        let collected = Arc::new(Mutex::new(Vec::<u8>::new()));
        let target = collected.clone();
        let sink = futures_util::sink::unfold((), move |(), chunk: Bytes| {
            let target = target.clone();
            async move {
                target.lock().unwrap().extend_from_slice(&chunk);
                Ok::<_, io::Error>(())
            }
        });
        reg.pipe(
            Data::text("hello"),
            Destination::sink(sink),
            &ConvertOptions::new().with_start(1),
        )
        .await
        .unwrap();
        assert_eq!(&collected.lock().unwrap()[..], b"ello");
    }

    #[tokio::test]
    async fn test_pipe_rejects_non_file_urls() {
        let reg = Registry::new();
        let err = reg
            .pipe(
                Data::text("x"),
                Destination::url("https://example.com/upload"),
                &ConvertOptions::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::IllegalArgument);
    }
}
