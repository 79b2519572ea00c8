//! # hunsu-vision
//!
//! 화면 캡처 파이프라인 어댑터.
//! 영역 캡처(`FrameSource` 구현), 페이싱 캡처 루프(캡처 세션),
//! 결정적 균등 샘플링, 전송용 WebP 인코딩을 담당한다.

pub mod capturer;
pub mod encoder;
pub mod sampler;
pub mod scaler;
pub mod session;

pub use capturer::RegionCapturer;
pub use encoder::EncodedFrame;
pub use hunsu_core::config::WebPQuality;
pub use sampler::sample_frames;
pub use session::{CaptureOutcome, CaptureSession, SessionEnd, SessionState};
