//! # hunsu-monitor
//!
//! 프로세스 생존 탐지 어댑터.
//! 캡처 세션의 게이트가 게임 프로세스 실행 여부를 확인할 때 사용한다.

pub mod liveness;

pub use liveness::ProcessLivenessProbe;
