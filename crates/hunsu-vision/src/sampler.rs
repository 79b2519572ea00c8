//! 결정적 균등 샘플링.
//!
//! 캡처된 프레임 시퀀스에서 일정 간격(stride)으로 분석 대상을 추출한다.
//! 같은 입력은 항상 같은 샘플 세트를 낸다 — 무작위성 없음.

use hunsu_core::models::frame::{Frame, SampleSet, SampledFrame};
use tracing::debug;

/// 프레임 시퀀스에서 `sample_size`개를 균등 간격으로 추출.
///
/// `stride = max(1, total / sample_size)`, 선택 인덱스는
/// `i * stride` (i = 0 .. min(sample_size, total / stride)).
/// 결과 크기는 항상 `min(sample_size, total)`이고 원본 인덱스는 엄격히 증가한다.
/// 프레임이 없으면 빈 세트를 반환한다 — 파이프라인 중단 판단은 호출자 몫.
pub fn sample_frames(frames: &[Frame], sample_size: usize) -> SampleSet<'_> {
    let total = frames.len();
    if total == 0 || sample_size == 0 {
        return SampleSet::default();
    }

    let stride = (total / sample_size).max(1);
    let count = sample_size.min(total / stride);

    let entries: Vec<SampledFrame> = (0..count)
        .map(|i| {
            let frame = &frames[i * stride];
            SampledFrame {
                frame_index: frame.index,
                frame,
            }
        })
        .collect();

    debug!(
        "샘플링: 프레임 {total}장 → {count}장 (stride={stride}, 인덱스 {:?})",
        entries.iter().map(|s| s.frame_index).collect::<Vec<_>>()
    );

    SampleSet::new(entries)
}
