use std::path::PathBuf;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use futures_util::StreamExt;
use percent_encoding::percent_decode_str;
use tracing::debug;
use url::Url;

use super::push::{collect, stream_of};
use super::{Converter, into_string, mismatch, windowed_len};
use crate::config::{ConvertOptions, UrlKind};
use crate::data::{Blob, Data, PushStream, RepresentationTag};
use crate::error::{ConvertError, Result};
use crate::fs;
use crate::merge::concat_bytes;
use crate::range::Window;
use crate::registry::Registry;
use crate::util::{clip_vec, split_bytes};

const TAG: RepresentationTag = RepresentationTag::UrlReference;
const DATA_URL_PREFIX: &str = "data:application/octet-stream;base64,";

/// A URL whose target holds the bytes.
///
/// Reads accept `data:`, `file:` and `blob:` URLs. Writes produce the kind
/// named by `dst_url_kind`, or the runtime default when it is absent.
#[derive(Debug, Default, Clone, Copy)]
pub struct UrlConverter;

/// Where the bytes behind a URL live.
enum Target {
    Inline(Vec<u8>),
    File(PathBuf),
    Object(Blob),
}

fn resolve(reg: &Registry, url: &str) -> Result<Target> {
    if let Some(rest) = url.strip_prefix("data:") {
        return parse_data_url(rest).map(Target::Inline);
    }
    if url.starts_with("blob:") {
        return reg
            .object_urls()
            .get(url)
            .map(Target::Object)
            .ok_or_else(|| ConvertError::illegal(format!("object URL {url} is not registered")));
    }

    let parsed = Url::parse(url).map_err(|e| ConvertError::invalid(TAG, e))?;
    match parsed.scheme() {
        "file" if reg.capabilities().file_urls => parsed
            .to_file_path()
            .map(Target::File)
            .map_err(|()| ConvertError::invalid(TAG, "file URL has no local path")),
        _ => Err(ConvertError::UnsupportedUrl {
            url: url.to_string(),
        }),
    }
}

/// Decodes the part of a data URL after `data:`.
fn parse_data_url(rest: &str) -> Result<Vec<u8>> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ConvertError::invalid(TAG, "data URL has no payload separator"))?;
    if meta.ends_with(";base64") {
        BASE64
            .decode(payload)
            .map_err(|e| ConvertError::invalid(TAG, e))
    } else {
        Ok(percent_decode_str(payload).collect())
    }
}

/// Opens the bytes behind `url` inside `window` as a push stream.
pub(crate) async fn open_stream(
    reg: &Registry,
    url: &str,
    window: Window,
    chunk_size: usize,
) -> Result<PushStream> {
    match resolve(reg, url)? {
        Target::Inline(bytes) => {
            let bytes = Bytes::from(clip_vec(bytes, window));
            Ok(futures_util::stream::iter(split_bytes(bytes, chunk_size).into_iter().map(Ok)).boxed())
        }
        Target::Object(blob) => Ok(blob.slice(window).stream(chunk_size)),
        Target::File(path) => Ok(fs::open_stream(&path, window, chunk_size).await?),
    }
}

impl UrlConverter {
    async fn write(
        &self,
        reg: &Registry,
        value: Data,
        options: &ConvertOptions,
    ) -> Result<String> {
        let capabilities = reg.capabilities();
        let kind = options
            .dst_url_kind()
            .unwrap_or_else(|| capabilities.default_url_kind());
        if !capabilities.supports_url(kind) {
            return Err(ConvertError::illegal(format!(
                "{kind:?} URLs are not supported in this runtime"
            )));
        }

        match kind {
            UrlKind::Data => {
                let bytes = collect(stream_of(reg, value, options).await?).await?;
                Ok(format!("{DATA_URL_PREFIX}{}", BASE64.encode(bytes)))
            }
            UrlKind::Blob => {
                let blob = match value {
                    Data::Blob(blob) => blob.slice(options.window()),
                    other => Blob::from_bytes(collect(stream_of(reg, other, options).await?).await?),
                };
                Ok(reg.object_urls().register(blob))
            }
            UrlKind::File => {
                let stream = stream_of(reg, value, options).await?;
                let path = fs::write_temp(reg.temp_dir(), stream).await?;
                debug!(path = %path.display(), "wrote file URL target");
                Url::from_file_path(&path)
                    .map(String::from)
                    .map_err(|()| ConvertError::illegal("temporary directory is not absolute"))
            }
        }
    }
}

#[async_trait]
impl Converter for UrlConverter {
    fn tag(&self) -> RepresentationTag {
        TAG
    }

    fn empty(&self) -> Data {
        Data::Str(DATA_URL_PREFIX.to_string())
    }

    fn is(&self, value: &Data) -> bool {
        matches!(value, Data::Str(_))
    }

    async fn convert_data(
        &self,
        reg: &Registry,
        value: Data,
        options: &ConvertOptions,
    ) -> Result<Data> {
        if self.matches(&value, options) && !options.has_range() && options.dst_url_kind().is_none()
        {
            return Ok(value);
        }
        Ok(Data::Str(self.write(reg, value, options).await?))
    }

    async fn merge_chunks(
        &self,
        reg: &Registry,
        chunks: Vec<Data>,
        options: &ConvertOptions,
    ) -> Result<Data> {
        let read = options.without_range().with_string_type(TAG);
        let mut parts = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            parts.push(self.to_byte_array(reg, chunk, &read).await?);
        }
        let merged = Data::ByteArray(concat_bytes(&parts));
        Ok(Data::Str(self.write(reg, merged, &options.without_range()).await?))
    }

    fn size(&self, reg: &Registry, value: &Data, options: &ConvertOptions) -> Result<u64> {
        let Data::Str(url) = value else {
            return Err(mismatch(value, options));
        };
        let total = match resolve(reg, url)? {
            Target::Inline(bytes) => bytes.len() as u64,
            Target::Object(blob) => blob.len(),
            Target::File(path) => fs::file_len(&path)?,
        };
        Ok(windowed_len(total, options))
    }

    async fn to_byte_array(
        &self,
        reg: &Registry,
        value: Data,
        options: &ConvertOptions,
    ) -> Result<Vec<u8>> {
        let url = into_string(value, options)?;
        match resolve(reg, &url)? {
            Target::Inline(bytes) => Ok(clip_vec(bytes, options.window())),
            Target::Object(blob) => Ok(Vec::from(blob.slice(options.window()).bytes().await?)),
            Target::File(path) => Ok(fs::read_range(&path, options.window()).await?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url_opts() -> ConvertOptions {
        ConvertOptions::new().with_src_string_type(TAG)
    }

    #[test]
    fn test_parse_data_urls() {
        assert_eq!(parse_data_url("text/plain;base64,YWI=").unwrap(), b"ab");
        assert_eq!(parse_data_url(",a%20b").unwrap(), b"a b");
        assert!(parse_data_url("no-separator").is_err());
        // Malformed escapes are kept as written.
        assert_eq!(parse_data_url(",%zz%4").unwrap(), b"%zz%4");
        assert_eq!(parse_data_url(",%E2%82%AC").unwrap(), "\u{20ac}".as_bytes());
    }

    #[tokio::test]
    async fn test_data_url_roundtrip() {
        let reg = Registry::new();
        let opts = ConvertOptions::new().with_dst_url_kind(UrlKind::Data);
        let url = UrlConverter
            .convert(&reg, Data::text("ab"), &opts)
            .await
            .unwrap();
        assert_eq!(url.as_str(), Some("data:application/octet-stream;base64,YWI="));

        let bytes = UrlConverter
            .to_byte_array(&reg, url, &url_opts())
            .await
            .unwrap();
        assert_eq!(bytes, b"ab");
    }

    #[tokio::test]
    async fn test_object_url_lifecycle() {
        let reg = Registry::builder()
            .capabilities(crate::Capabilities::all())
            .build();
        let opts = ConvertOptions::new().with_dst_url_kind(UrlKind::Blob);
        let url = UrlConverter
            .convert(&reg, Data::text("hello"), &opts)
            .await
            .unwrap()
            .into_string()
            .unwrap();
        assert!(url.starts_with("blob:"));

        let value = Data::text(url.clone());
        assert_eq!(
            UrlConverter
                .size(&reg, &value, &url_opts().with_start(1))
                .unwrap(),
            4
        );

        assert!(reg.revoke_object_url(&url));
        let err = UrlConverter
            .to_byte_array(&reg, value, &url_opts())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::IllegalArgument);
    }

    #[test]
    fn test_unsupported_scheme() {
        let reg = Registry::new();
        let err = UrlConverter
            .size(&reg, &Data::text("https://example.com/x"), &url_opts())
            .unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedUrl { .. }));
    }
}
