//! Decoding of browser-encoded images (`data:image/...;base64,...`) into RGB
//! pixels the layout engine can embed.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine as _;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbImage};
use thiserror::Error;
use tracing::debug;

/// Longest edge, in pixels, kept after downsampling.
pub const MAX_EDGE_PX: u32 = 1200;

#[derive(Debug, Error)]
pub enum ImagePayloadError {
    #[error("image payload is empty")]
    Empty,
    #[error("data URL is not base64 encoded")]
    NotBase64,
    #[error("invalid base64 data: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("unsupported image format (expected PNG or JPEG)")]
    UnsupportedFormat,
    #[error("image could not be decoded: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image has no pixels")]
    ZeroSized,
}

/// Opaque 8-bit RGB pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// Decodes a data URL or bare base64 string into embeddable pixels.
pub fn decode_payload(payload: &str) -> Result<DecodedImage, ImagePayloadError> {
    let bytes = payload_bytes(payload)?;

    let format = match image::guess_format(&bytes) {
        Ok(format @ (ImageFormat::Png | ImageFormat::Jpeg)) => format,
        _ => return Err(ImagePayloadError::UnsupportedFormat),
    };

    let decoded = image::load_from_memory_with_format(&bytes, format)?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(ImagePayloadError::ZeroSized);
    }

    let decoded = downsample(decoded);
    let rgb = flatten_onto_white(&decoded);
    debug!(
        width = rgb.width(),
        height = rgb.height(),
        encoded_bytes = bytes.len(),
        "decoded image payload"
    );

    Ok(DecodedImage {
        width: rgb.width(),
        height: rgb.height(),
        rgb: rgb.into_raw(),
    })
}

fn payload_bytes(payload: &str) -> Result<Vec<u8>, ImagePayloadError> {
    let payload = payload.trim();
    let encoded = match payload.strip_prefix("data:") {
        Some(rest) => {
            let (header, body) = rest.split_once(',').ok_or(ImagePayloadError::NotBase64)?;
            if !header
                .split(';')
                .any(|part| part.trim().eq_ignore_ascii_case("base64"))
            {
                return Err(ImagePayloadError::NotBase64);
            }
            body
        }
        None => payload,
    };

    let compact: String = encoded
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Err(ImagePayloadError::Empty);
    }

    let bytes = STANDARD
        .decode(&compact)
        .or_else(|err| STANDARD_NO_PAD.decode(&compact).map_err(|_| err))?;
    if bytes.is_empty() {
        return Err(ImagePayloadError::Empty);
    }
    Ok(bytes)
}

fn downsample(image: DynamicImage) -> DynamicImage {
    if image.width().max(image.height()) <= MAX_EDGE_PX {
        return image;
    }
    image.resize(MAX_EDGE_PX, MAX_EDGE_PX, FilterType::Triangle)
}

// Canvas signatures are black strokes on a fully transparent background.
fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());

    for (src, dst) in rgba.pixels().zip(rgb.pixels_mut()) {
        let [r, g, b, a] = src.0;
        let alpha = u16::from(a);
        let blend = |channel: u8| -> u8 {
            let mixed = u16::from(channel) * alpha + 255 * (255 - alpha);
            (mixed / 255) as u8
        };
        dst.0 = [blend(r), blend(g), blend(b)];
    }

    rgb
}
