//! Hexagonal Architecture 포트 인터페이스.
//!
//! 어댑터 crate(hunsu-monitor, hunsu-vision, hunsu-network)가 구현하고
//! hunsu-pipeline이 `Arc<dyn Port>`로 주입받는 경계 trait 정의.

pub mod frame_source;
pub mod process_probe;
pub mod synthesis_backend;
pub mod vision_backend;

pub use frame_source::FrameSource;
pub use process_probe::ProcessProbe;
pub use synthesis_backend::SynthesisBackend;
pub use vision_backend::VisionBackend;
