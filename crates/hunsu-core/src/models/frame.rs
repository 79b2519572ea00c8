//! 프레임(스크린샷) 모델.
//!
//! 캡처 루프가 생산하는 원시 픽셀 버퍼와 순서 메타데이터,
//! 그리고 샘플러가 추출하는 샘플 세트를 정의한다.
//! 프레임 시퀀스의 쓰기 주체는 캡처 루프 하나뿐이며,
//! 샘플러에 넘어간 뒤로는 읽기 전용이다.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::error::CoreError;

/// 원시 RGBA8 픽셀 버퍼.
/// 이미지 라이브러리 타입은 어댑터 경계에서 변환하고, 코어는 바이트만 들고 다닌다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// 픽셀 너비
    pub width: u32,
    /// 픽셀 높이
    pub height: u32,
    /// RGBA8 바이트 (길이 = width * height * 4)
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// 버퍼 생성. 크기와 데이터 길이가 맞지 않으면 거부한다.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CoreError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(CoreError::Capture(format!(
                "픽셀 버퍼 크기 불일치: {}x{} 기대 {}바이트, 실제 {}바이트",
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// 내용이 없는(면적 0) 버퍼인지 여부
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }

    /// 버퍼 바이트 수
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}

/// 캡처된 프레임 한 장
#[derive(Debug, Clone)]
pub struct Frame {
    /// 캡처 순서대로 0부터 부여되는 시퀀스 인덱스 (빈틈 없음)
    pub index: u64,
    /// 캡처 시작 기준 경과 시간 (모노토닉)
    pub offset: Duration,
    /// 캡처 시각 (벽시계, 리포트 표기용)
    pub captured_at: DateTime<Utc>,
    /// 픽셀 데이터
    pub pixels: PixelBuffer,
}

/// 샘플로 선택된 프레임 참조
#[derive(Debug, Clone, Copy)]
pub struct SampledFrame<'a> {
    /// 원본 프레임 시퀀스 인덱스
    pub frame_index: u64,
    /// 프레임 참조 (소유권은 세션 결과에 남는다)
    pub frame: &'a Frame,
}

/// 균등 샘플링 결과 — 원본 인덱스가 엄격히 증가하는 프레임 참조 목록
#[derive(Debug, Clone, Default)]
pub struct SampleSet<'a> {
    entries: Vec<SampledFrame<'a>>,
}

impl<'a> SampleSet<'a> {
    /// 샘플 세트 생성. 인덱스 단조 증가는 샘플러가 보장한다.
    pub fn new(entries: Vec<SampledFrame<'a>>) -> Self {
        debug_assert!(
            entries.windows(2).all(|w| w[0].frame_index < w[1].frame_index),
            "샘플 인덱스는 엄격히 증가해야 한다"
        );
        Self { entries }
    }

    /// 샘플 수
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 샘플이 하나도 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 샘플 순회 (원본 캡처 순서)
    pub fn iter(&self) -> impl Iterator<Item = &SampledFrame<'a>> {
        self.entries.iter()
    }

    /// 선택된 원본 프레임 인덱스 목록
    pub fn frame_indices(&self) -> Vec<u64> {
        self.entries.iter().map(|s| s.frame_index).collect()
    }
}
