//! # hunsu-core
//!
//! HUNSU 도메인 모델, 포트(trait) 정의, 에러 타입.
//! 캡처 → 샘플링 → 프레임 분석 → 리포트 종합 파이프라인의
//! 모든 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`] — 도메인 데이터 구조체 (프레임, 분석 결과, 리포트)
//! - [`ports`] — Hexagonal Architecture 포트 인터페이스 (async_trait)
//! - [`error`] — 핵심 에러 타입 (thiserror)
//! - [`config`] — 파이프라인 설정 구조체

pub mod config;
pub mod error;
pub mod models;
pub mod ports;
