//! 파이프라인 수준 오류.
//!
//! 프레임 단위 실패(캡처 스킵, 분석 플레이스홀더)는 데이터로
//! 흡수되고, 여기 정의된 오류만 실행 전체를 중단시킨다.
//! 최종 사용자에게는 항상 리포트 하나 또는 설명 문자열 하나만 보인다.

use hunsu_core::error::CoreError;
use thiserror::Error;

/// 파이프라인 실행을 중단시키는 오류
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 요청 필드 검증 실패
    #[error("잘못된 요청: {0}")]
    InvalidRequest(String),

    /// 캡처 세션이 게이트 정책에 의해 중단됨
    #[error("캡처 세션 중단: {reason}")]
    SessionAborted {
        /// 세션이 보고한 중단 사유
        reason: String,
    },

    /// 캡처된 프레임이 한 장도 없음 — 샘플링/분석/합성 진입 전 중단
    #[error("캡처된 프레임 없음: 분석을 진행할 수 없습니다")]
    NoFramesCaptured,

    /// 모든 샘플 분석 실패 + Abort 정책
    #[error("샘플 프레임 {sampled}장 전부 분석 실패")]
    AllFramesFailed {
        /// 분석을 시도한 샘플 수
        sampled: usize,
    },

    /// 리포트 합성 실패 — 열화 경로 없이 치명적
    #[error("리포트 합성 실패: {0}")]
    Synthesis(#[source] CoreError),
}
