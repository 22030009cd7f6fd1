//! Image attachment decoding
//!
//! PNG uploads are decoded to raw RGB samples and embedded as plain
//! DeviceRGB image XObjects (stream compression happens at save time).
//! JPEG uploads keep their compressed payload and are embedded behind a
//! DCTDecode filter; only the frame header is parsed for dimensions.

use crate::error::ReportError;
use lopdf::{dictionary, Object, Stream};
use std::io::Cursor;

/// A decoded image ready to be placed on a page.
#[derive(Debug)]
pub struct ImageXObject {
    pub width: u32,
    pub height: u32,
    pub stream: Stream,
}

/// Build an image XObject from PNG bytes.
pub fn png_xobject(bytes: &[u8]) -> Result<ImageXObject, ReportError> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder
        .read_info()
        .map_err(|e| ReportError::ImageError(format!("Invalid PNG: {}", e)))?;

    let mut buffer = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buffer)
        .map_err(|e| ReportError::ImageError(format!("Failed to decode PNG: {}", e)))?;
    buffer.truncate(info.buffer_size());

    let rgb = to_rgb8(&buffer, info.color_type)?;

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => info.width as i64,
        "Height" => info.height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };

    Ok(ImageXObject {
        width: info.width,
        height: info.height,
        stream: Stream::new(dict, rgb),
    })
}

/// Build an image XObject from JPEG bytes, keeping the compressed payload.
pub fn jpeg_xobject(bytes: &[u8]) -> Result<ImageXObject, ReportError> {
    let (width, height) = jpeg_dimensions(bytes)?;

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => "DCTDecode",
    };

    let mut stream = Stream::new(dict, bytes.to_vec());
    // The payload is already compressed; re-deflating it would only bloat it.
    stream.allows_compression = false;

    Ok(ImageXObject {
        width,
        height,
        stream,
    })
}

fn to_rgb8(samples: &[u8], color_type: png::ColorType) -> Result<Vec<u8>, ReportError> {
    use png::ColorType;

    let rgb = match color_type {
        ColorType::Rgb => samples.to_vec(),
        ColorType::Rgba => samples
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect(),
        ColorType::Grayscale => samples.iter().flat_map(|&g| [g, g, g]).collect(),
        ColorType::GrayscaleAlpha => samples
            .chunks_exact(2)
            .flat_map(|px| [px[0], px[0], px[0]])
            .collect(),
        other => {
            return Err(ReportError::ImageError(format!(
                "Unsupported PNG color type: {:?}",
                other
            )))
        }
    };
    Ok(rgb)
}

/// Read width/height from a JPEG start-of-frame marker.
fn jpeg_dimensions(bytes: &[u8]) -> Result<(u32, u32), ReportError> {
    // SOI magic: FF D8
    if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] != 0xD8 {
        return Err(ReportError::ImageError("Invalid JPEG magic bytes".into()));
    }

    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let marker = bytes[pos + 1];
        // Standalone markers carry no length segment.
        if (0xD0..=0xD9).contains(&marker) || marker == 0xFF || marker == 0x01 {
            pos += 2;
            continue;
        }

        let length = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        let is_sof = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            if pos + 9 > bytes.len() {
                break;
            }
            let height = u16::from_be_bytes([bytes[pos + 5], bytes[pos + 6]]) as u32;
            let width = u16::from_be_bytes([bytes[pos + 7], bytes[pos + 8]]) as u32;
            if width == 0 || height == 0 {
                break;
            }
            return Ok((width, height));
        }
        pos += 2 + length;
    }

    Err(ReportError::ImageError(
        "No start-of-frame marker found in JPEG".into(),
    ))
}
