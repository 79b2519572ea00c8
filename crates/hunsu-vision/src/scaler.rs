//! 전송 전 다운스케일.
//!
//! fast_image_resize 기반 고속 리사이즈. 긴 변이 한도를 넘는 프레임만
//! 종횡비를 유지한 채 축소해서 비전 백엔드로 가는 페이로드를 줄인다.

use fast_image_resize::{images::Image as FirImage, ResizeAlg, ResizeOptions, Resizer};
use hunsu_core::error::CoreError;
use image::{DynamicImage, RgbaImage};
use tracing::debug;

/// 긴 변이 `max_edge`를 넘으면 종횡비 유지 축소, 아니면 원본 복제 반환.
pub fn downscale_to_edge(image: &DynamicImage, max_edge: u32) -> Result<DynamicImage, CoreError> {
    let (src_w, src_h) = (image.width(), image.height());

    if src_w == 0 || src_h == 0 {
        return Err(CoreError::Internal("소스 이미지 크기 0".to_string()));
    }
    if max_edge == 0 {
        return Err(CoreError::Internal("목표 긴 변 0".to_string()));
    }
    if src_w.max(src_h) <= max_edge {
        return Ok(image.clone());
    }

    // 종횡비 유지 목표 크기 (u64 중간 연산으로 오버플로 방지)
    let (dst_w, dst_h) = if src_w >= src_h {
        let h = ((src_h as u64 * max_edge as u64) / src_w as u64).max(1) as u32;
        (max_edge, h)
    } else {
        let w = ((src_w as u64 * max_edge as u64) / src_h as u64).max(1) as u32;
        (w, max_edge)
    };

    let src_rgba = image.to_rgba8();
    let src_image = FirImage::from_vec_u8(
        src_w,
        src_h,
        src_rgba.into_raw(),
        fast_image_resize::PixelType::U8x4,
    )
    .map_err(|e| CoreError::Internal(format!("소스 이미지 생성 실패: {e}")))?;

    let mut dst_image = FirImage::new(dst_w, dst_h, fast_image_resize::PixelType::U8x4);

    let mut resizer = Resizer::new();
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(
        fast_image_resize::FilterType::Bilinear,
    ));

    resizer
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| CoreError::Internal(format!("리사이즈 실패: {e}")))?;

    let result = RgbaImage::from_raw(dst_w, dst_h, dst_image.into_vec())
        .ok_or_else(|| CoreError::Internal("결과 이미지 생성 실패".to_string()))?;

    debug!("다운스케일: {src_w}x{src_h} → {dst_w}x{dst_h} (한도 {max_edge})");

    Ok(DynamicImage::ImageRgba8(result))
}
