//! 영역 스크린 캡처.
//!
//! `FrameSource` 포트 구현. xcap으로 모니터 전체를 뜬 뒤 설정 영역으로
//! 잘라낸다. 블로킹 캡처 호출은 tokio 블로킹 풀에 격리해서
//! 캡처 루프의 타이머를 굶기지 않는다.

use async_trait::async_trait;
use hunsu_core::config::CaptureRegion;
use hunsu_core::error::CoreError;
use hunsu_core::models::frame::PixelBuffer;
use hunsu_core::ports::frame_source::FrameSource;
use image::DynamicImage;
use tracing::debug;
use xcap::Monitor;

/// 영역 캡처러 — `FrameSource` 포트 구현
///
/// 영역과 모니터 선택은 생성 시점에 고정된다 (한 번의 실행 동안 불변).
pub struct RegionCapturer {
    region: CaptureRegion,
    monitor_index: Option<usize>,
}

impl RegionCapturer {
    /// 새 영역 캡처러 생성
    pub fn new(region: CaptureRegion, monitor_index: Option<usize>) -> Self {
        Self {
            region,
            monitor_index,
        }
    }

    /// 모니터 전체 캡처 (블로킹 — 블로킹 풀에서 호출할 것)
    fn grab_monitor(monitor_index: Option<usize>) -> Result<DynamicImage, CoreError> {
        let monitors =
            Monitor::all().map_err(|e| CoreError::Capture(format!("모니터 목록 조회 실패: {e}")))?;

        let monitor = match monitor_index {
            Some(index) => monitors
                .into_iter()
                .nth(index)
                .ok_or_else(|| CoreError::Capture(format!("모니터 인덱스 {index} 없음")))?,
            None => monitors
                .into_iter()
                .find(|m| m.is_primary().unwrap_or(false))
                .or_else(|| Monitor::all().ok()?.into_iter().next())
                .ok_or_else(|| CoreError::Capture("모니터를 찾을 수 없음".to_string()))?,
        };

        let image = monitor
            .capture_image()
            .map_err(|e| CoreError::Capture(format!("스크린 캡처 실패: {e}")))?;

        Ok(DynamicImage::ImageRgba8(image))
    }
}

/// 전체 화면 이미지에서 설정 영역을 잘라 픽셀 버퍼로 변환.
///
/// 영역은 화면 경계로 클램프된다. 클램프 후 면적이 0이면
/// 부분/쓰레기 프레임 대신 캡처 실패로 처리한다.
fn crop_region(full: &DynamicImage, region: CaptureRegion) -> Result<PixelBuffer, CoreError> {
    let (full_w, full_h) = (full.width(), full.height());

    let left = region.left.max(0) as u32;
    let top = region.top.max(0) as u32;
    if left >= full_w || top >= full_h {
        return Err(CoreError::Capture(format!(
            "캡처 영역이 화면 밖: 오프셋 ({}, {}), 화면 {}x{}",
            region.left, region.top, full_w, full_h
        )));
    }

    let width = region.width.min(full_w - left);
    let height = region.height.min(full_h - top);
    if width == 0 || height == 0 {
        return Err(CoreError::Capture("캡처 영역 면적 0".to_string()));
    }

    let cropped = full.crop_imm(left, top, width, height).to_rgba8();
    PixelBuffer::new(width, height, cropped.into_raw())
}

#[async_trait]
impl FrameSource for RegionCapturer {
    async fn capture_once(&self) -> Result<PixelBuffer, CoreError> {
        let region = self.region;
        let monitor_index = self.monitor_index;

        let pixels = tokio::task::spawn_blocking(move || {
            let full = RegionCapturer::grab_monitor(monitor_index)?;
            crop_region(&full, region)
        })
        .await
        .map_err(|e| CoreError::Capture(format!("캡처 태스크 조인 실패: {e}")))??;

        if pixels.is_empty() {
            return Err(CoreError::Capture("빈 프레임".to_string()));
        }

        debug!("영역 캡처 완료: {}x{}", pixels.width, pixels.height);
        Ok(pixels)
    }
}
