//! Background image loading: measure the image's intrinsic size, then apply
//! aspect ratio, height, and reference to the canvas config in one patch.
//!
//! Measuring sits behind a trait so sessions can be driven without network or disk in
//! tests. [`HttpImageMeasure`] accepts `http(s)` URLs, `data:` URIs, and local
//! file paths, and reads dimensions from the image header only.

#[cfg(test)]
#[path = "background_test.rs"]
mod background_test;

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use canvas::config::{CanvasConfigPatch, ConfigError, background_patch};
use canvas::engine::Action;
use tracing::{info, warn};

use crate::session::CanvasSession;
use crate::settings::Timeouts;
use crate::store::CanvasStore;

#[derive(Debug, thiserror::Error)]
pub enum BackgroundError {
    #[error("image fetch failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("image fetch returned status {0}")]
    Status(u16),
    #[error("image read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed data URI")]
    DataUri,
    #[error("data URI payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Reports the pixel dimensions of an image reference.
#[async_trait::async_trait]
pub trait ImageMeasure: Send + Sync {
    async fn dimensions(&self, reference: &str) -> Result<(u32, u32), BackgroundError>;
}

pub struct HttpImageMeasure {
    http: reqwest::Client,
}

impl HttpImageMeasure {
    /// # Errors
    ///
    /// Returns `Http` if the HTTP client cannot be built.
    pub fn new(timeouts: Timeouts) -> Result<Self, BackgroundError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .build()?;
        Ok(Self { http })
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, BackgroundError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackgroundError::Status(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait::async_trait]
impl ImageMeasure for HttpImageMeasure {
    async fn dimensions(&self, reference: &str) -> Result<(u32, u32), BackgroundError> {
        let bytes = if reference.starts_with("http://") || reference.starts_with("https://") {
            self.fetch(reference).await?
        } else if reference.starts_with("data:") {
            decode_data_uri(reference)?
        } else {
            tokio::fs::read(reference).await?
        };
        image_dimensions(&bytes)
    }
}

/// Decode the payload of a `data:` URI. Base64 payloads are decoded; plain
/// payloads are returned as-is.
///
/// # Errors
///
/// Returns `DataUri` when there is no `data:` prefix or no comma, and
/// `Base64` for a bad base64 payload.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, BackgroundError> {
    let rest = uri.strip_prefix("data:").ok_or(BackgroundError::DataUri)?;
    let (meta, payload) = rest.split_once(',').ok_or(BackgroundError::DataUri)?;
    if meta.ends_with(";base64") {
        Ok(STANDARD.decode(payload.trim())?)
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

/// Width and height read from an encoded image's header.
///
/// # Errors
///
/// Returns `Decode` for unknown formats or truncated headers.
pub fn image_dimensions(bytes: &[u8]) -> Result<(u32, u32), BackgroundError> {
    let reader = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    Ok(reader.into_dimensions()?)
}

/// Load `reference` as the session's background.
///
/// The reference is exposed through [`CanvasSession::pending_background`]
/// while the image is measured. On success one `SetCanvasConfig` patch writes
/// aspect ratio, size, and image together. On failure the config is left as
/// it was and the error is returned.
///
/// # Errors
///
/// Returns the measuring error, or `Config` for an image with a zero dimension.
pub async fn load_background<S, P>(
    session: &mut CanvasSession<S>,
    measure: &P,
    reference: &str,
    container_width: f64,
) -> Result<CanvasConfigPatch, BackgroundError>
where
    S: CanvasStore,
    P: ImageMeasure + ?Sized,
{
    session.set_pending_background(Some(reference.to_owned()));
    let measured = measure.dimensions(reference).await;
    session.set_pending_background(None);

    let patch = measured.and_then(|(width, height)| {
        background_patch(reference, width, height, container_width).map_err(BackgroundError::from)
    });
    match patch {
        Ok(patch) => {
            info!(key = %session.key(), aspect = ?patch.aspect_ratio, "background loaded");
            session.dispatch(Action::SetCanvasConfig(patch.clone())).await;
            Ok(patch)
        }
        Err(e) => {
            warn!(key = %session.key(), error = %e, "background load failed");
            Err(e)
        }
    }
}
