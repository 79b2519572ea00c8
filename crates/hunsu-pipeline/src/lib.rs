//! # hunsu-pipeline
//!
//! 게임플레이 분석 파이프라인 — 캡처 → 샘플링 → 비전 분석 → 리포트 합성.
//!
//! ## 모듈 구성
//!
//! - [`orchestrator`]: 단계 시퀀싱과 가드 ([`GameplayPipeline`])
//! - [`analyzer`]: 샘플 단위 비전 질의 + 재시도 + 순서 보존
//! - [`synthesizer`]: 결과 목록 → 마크다운 리포트 합성
//! - [`prompt`]: 분석/합성 프롬프트 구성 (입력의 순수 함수)
//! - [`error`]: 실행을 중단시키는 파이프라인 오류

pub mod analyzer;
pub mod error;
pub mod orchestrator;
pub mod prompt;
pub mod synthesizer;

pub use analyzer::FrameAnalyzer;
pub use error::PipelineError;
pub use orchestrator::{AnalysisRequest, GameplayPipeline};
pub use synthesizer::ReportSynthesizer;
