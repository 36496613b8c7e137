//! # QR Codes
//!
//! Encoding exit passes into PNGs and reading codes back out of camera
//! snapshots.
//!
//! ## Decode Outcomes
//! ```text
//! bytes ──► load image ──fail──► RenderError::Image
//!               │
//!               ▼
//!          detect grids ──none──► Ok(vec![])   (not an error)
//!               │
//!               ▼
//!          decode each ──unreadable symbol──► skipped, logged
//!               │
//!               ▼
//!          Ok(payloads) in detection order
//! ```

#[cfg(any(feature = "qr-encode", feature = "qr-decode"))]
use crate::error::RenderError;
use crate::error::RenderResult;

/// True if this build can produce QR PNGs.
pub fn encoder_available() -> bool {
    cfg!(feature = "qr-encode")
}

/// True if this build can read codes from images.
pub fn decoder_available() -> bool {
    cfg!(feature = "qr-decode")
}

/// Renders `payload` as a black-on-white QR PNG with a quiet zone.
///
/// ## Errors
/// * `Encoding` - payload exceeds QR capacity
/// * `CapabilityUnavailable("qr-encode")` - built without the feature
#[cfg(feature = "qr-encode")]
pub fn encode_png(payload: &str) -> RenderResult<Vec<u8>> {
    use image::{DynamicImage, ImageFormat, Luma};
    use qrcode::QrCode;
    use std::io::Cursor;

    let code = QrCode::new(payload.as_bytes()).map_err(|e| RenderError::Encoding(e.to_string()))?;
    let symbol = code
        .render::<Luma<u8>>()
        .module_dimensions(10, 10)
        .quiet_zone(true)
        .build();

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(symbol)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| RenderError::Image(e.to_string()))?;

    tracing::debug!(bytes = png.len(), "Encoded QR code");
    Ok(png)
}

#[cfg(not(feature = "qr-encode"))]
pub fn encode_png(_payload: &str) -> RenderResult<Vec<u8>> {
    Err(crate::error::RenderError::CapabilityUnavailable(
        "qr-encode".to_string(),
    ))
}

/// Returns the text of every QR symbol found in the image.
///
/// ## Errors
/// * `Image` - bytes are not a readable PNG/JPEG
/// * `DecodingUnavailable` - built without the feature
#[cfg(feature = "qr-decode")]
pub fn decode_image(bytes: &[u8]) -> RenderResult<Vec<String>> {
    let luma = image::load_from_memory(bytes)
        .map_err(|e| RenderError::Image(e.to_string()))?
        .to_luma8();
    let (width, height) = luma.dimensions();

    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
            luma.get_pixel(x as u32, y as u32).0[0]
        });

    let mut payloads = Vec::new();
    for grid in prepared.detect_grids() {
        match grid.decode() {
            Ok((_, content)) => payloads.push(content),
            Err(e) => tracing::debug!(error = ?e, "Skipping unreadable symbol"),
        }
    }

    tracing::debug!(width, height, found = payloads.len(), "Decoded image");
    Ok(payloads)
}

#[cfg(not(feature = "qr-decode"))]
pub fn decode_image(_bytes: &[u8]) -> RenderResult<Vec<String>> {
    Err(crate::error::RenderError::DecodingUnavailable)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(all(test, feature = "qr-encode", feature = "qr-decode"))]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, ImageFormat, Luma};
    use std::io::Cursor;

    const PASS: &str = "EXIT:EXIT-20240501140322|TOTAL:257.24|TXN:TXN-20240501140322-9f86d081";

    #[test]
    fn test_exit_pass_survives_encode_and_decode() {
        let png = encode_png(PASS).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));

        assert_eq!(decode_image(&png).unwrap(), vec![PASS.to_string()]);
    }

    #[test]
    fn test_blank_image_has_no_symbols() {
        let blank: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_pixel(200, 200, Luma([255u8]));
        let mut png = Vec::new();
        DynamicImage::ImageLuma8(blank)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        assert!(decode_image(&png).unwrap().is_empty());
    }

    #[test]
    fn test_garbage_bytes_are_image_error() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, RenderError::Image(_)));
    }

    #[test]
    fn test_oversized_payload_is_encoding_error() {
        let huge = "X".repeat(8_000);
        assert!(matches!(encode_png(&huge), Err(RenderError::Encoding(_))));
    }

    #[test]
    fn test_capabilities_reported() {
        assert!(encoder_available());
        assert!(decoder_available());
    }
}
