//! 종합 백엔드 포트.
//!
//! 프레임별 분석 결과를 모은 프롬프트 하나를 원격 요약 모델에 보내
//! 구조화된 리포트 텍스트를 받아 오는 인터페이스.

use async_trait::async_trait;

use crate::error::CoreError;

/// 원격 리포트 종합 백엔드
///
/// 구현체: `RemoteSynthesisBackend` (Gemini generateContent)
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    /// 종합 요청 1회 (단일 시도 — 종합 실패는 실행 전체의 치명 에러다).
    async fn summarize(&self, prompt: &str) -> Result<String, CoreError>;

    /// 백엔드 이름 (예: "gemini")
    fn backend_name(&self) -> &str;
}
