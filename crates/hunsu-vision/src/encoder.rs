//! 전송용 WebP 인코딩.
//!
//! 샘플 프레임을 손실 WebP로 압축하고 base64로 감싸 비전 백엔드
//! 요청에 실을 수 있는 형태로 만든다.

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use hunsu_core::config::WebPQuality;
use hunsu_core::error::CoreError;
use hunsu_core::models::frame::PixelBuffer;
use image::{DynamicImage, RgbaImage};
use tracing::debug;

use crate::scaler;

/// WebP MIME 타입 (data URI의 media type)
pub const WEBP_MEDIA_TYPE: &str = "image/webp";

/// 전송 준비가 끝난 인코딩 프레임
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    /// base64 인코딩된 WebP 바이트
    pub base64: String,
    /// MIME 타입 (`image/webp`)
    pub media_type: &'static str,
    /// 인코딩 시점 너비 (다운스케일 반영)
    pub width: u32,
    /// 인코딩 시점 높이
    pub height: u32,
    /// 압축 후 바이트 수 (base64 이전)
    pub byte_len: usize,
}

/// WebP 인코딩
pub fn encode_webp(image: &DynamicImage, quality: WebPQuality) -> Result<Vec<u8>, CoreError> {
    let rgba = image.to_rgba8();
    let (w, h) = (rgba.width(), rgba.height());
    if w == 0 || h == 0 {
        return Err(CoreError::Internal("인코딩 대상 이미지 크기 0".to_string()));
    }
    let raw_size = (w * h * 4) as usize;

    let encoder = webp::Encoder::from_rgba(&rgba, w, h);
    let encoded_vec = encoder.encode(quality.as_factor()).to_vec();

    debug!(
        "WebP 인코딩: {}x{} → {} bytes (품질 {}, 압축률 {:.1}%)",
        w,
        h,
        encoded_vec.len(),
        quality as u8,
        (encoded_vec.len() as f32 / raw_size as f32) * 100.0
    );

    Ok(encoded_vec)
}

/// 픽셀 버퍼를 이미지로 복원 후 (선택적 다운스케일 →) WebP → base64.
///
/// `max_edge`가 Some이면 긴 변을 그 이하로 축소한 뒤 인코딩한다.
pub fn encode_frame(
    pixels: &PixelBuffer,
    quality: WebPQuality,
    max_edge: Option<u32>,
) -> Result<EncodedFrame, CoreError> {
    let rgba = RgbaImage::from_raw(pixels.width, pixels.height, pixels.data.clone())
        .ok_or_else(|| CoreError::Internal("픽셀 버퍼 → 이미지 복원 실패".to_string()))?;
    let mut image = DynamicImage::ImageRgba8(rgba);

    if let Some(edge) = max_edge {
        image = scaler::downscale_to_edge(&image, edge)?;
    }

    let bytes = encode_webp(&image, quality)?;
    let byte_len = bytes.len();

    Ok(EncodedFrame {
        base64: B64.encode(&bytes),
        media_type: WEBP_MEDIA_TYPE,
        width: image.width(),
        height: image.height(),
        byte_len,
    })
}
