//! # hunsu-network
//!
//! 외부 AI API 네트워크 어댑터.
//! 비전 분석(OpenAI 호환 chat completions)과 리포트 합성(Gemini
//! generateContent) 백엔드를 HTTP로 호출하며, 일시 오류에 대한
//! 지수 백오프 재시도를 제공한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use hunsu_network::retry::RetryPolicy;
//! use hunsu_network::synthesis::RemoteSynthesisBackend;
//! use hunsu_network::vision::RemoteVisionBackend;
//! ```

pub mod retry;
mod status;
pub mod synthesis;
pub mod vision;

pub use retry::RetryPolicy;
pub use synthesis::RemoteSynthesisBackend;
pub use vision::RemoteVisionBackend;
