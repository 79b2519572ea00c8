//! 비전 백엔드 포트.
//!
//! 인코딩된 프레임 이미지 한 장과 지시 프롬프트를 원격 비전 모델에 보내
//! 텍스트 코멘트를 받아 오는 인터페이스. 재시도는 호출자(재시도 정책) 몫이고
//! 구현체는 단일 시도만 수행한다.

use async_trait::async_trait;

use crate::error::CoreError;

/// 원격 비전 분석 백엔드
///
/// 구현체: `RemoteVisionBackend` (OpenAI 호환 chat-completions)
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// 프레임 1장 분석 요청 (단일 시도).
    ///
    /// `image_base64`는 base64 인코딩된 이미지 바이트이고 `media_type`은
    /// `image/webp` 같은 MIME 타입이다. 성공 시 백엔드의 코멘트 텍스트를,
    /// 실패 시 [`CoreError`]를 반환한다 — 일시/종결 분류는
    /// `CoreError::is_transient`로 호출자가 판정한다.
    async fn describe_frame(
        &self,
        prompt: &str,
        image_base64: &str,
        media_type: &str,
        max_tokens: u32,
    ) -> Result<String, CoreError>;

    /// 백엔드 이름 (예: "openrouter")
    fn backend_name(&self) -> &str;
}
