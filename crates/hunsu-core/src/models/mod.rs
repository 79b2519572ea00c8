//! 도메인 모델.
//!
//! 파이프라인 단계 간에 흐르는 데이터 구조체를 정의한다.
//! 프레임(캡처) → 샘플 세트(샘플링) → 프레임 분석 결과(분석) → 리포트(종합).

pub mod analysis;
pub mod frame;
pub mod report;
