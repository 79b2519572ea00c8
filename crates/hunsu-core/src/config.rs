//! 파이프라인 설정 구조체.
//!
//! 캡처 영역/페이싱, 샘플링/분석, 비전·종합 백엔드 엔드포인트 등
//! 한 번의 실행 동안 불변인 설정을 정의한다. JSON 파일에서 로드 가능.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::CoreError;

/// 실행 파일명을 알 수 없을 때 상류 컴포넌트가 넘기는 센티널 값.
/// 생존 탐지는 이 값을 "검증 불가 — 낙관적으로 진행"으로 해석한다.
pub const UNKNOWN_EXECUTABLE: &str = "unknown";

/// 최상위 파이프라인 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// 화면 캡처 설정
    pub capture: CaptureConfig,
    /// 샘플링/분석 설정
    pub analysis: AnalysisConfig,
    /// 비전 백엔드 엔드포인트
    pub vision: VisionEndpoint,
    /// 종합(리포트) 백엔드 엔드포인트
    pub synthesis: SynthesisEndpoint,
}

impl PipelineConfig {
    /// JSON 문자열에서 설정 로드
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 전체 설정 유효성 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        self.capture.validate()?;
        self.analysis.validate()?;
        self.vision.validate()?;
        self.synthesis.validate()?;
        Ok(())
    }
}

// ============================================================
// 캡처 설정
// ============================================================

/// 캡처 대상 화면 영역 (픽셀 단위)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CaptureRegion {
    /// 모니터 좌상단 기준 Y 오프셋
    pub top: i32,
    /// 모니터 좌상단 기준 X 오프셋
    pub left: i32,
    /// 영역 너비
    pub width: u32,
    /// 영역 높이
    pub height: u32,
}

impl Default for CaptureRegion {
    fn default() -> Self {
        Self {
            top: 0,
            left: 0,
            width: 1920,
            height: 1080,
        }
    }
}

/// 게임 프로세스 미탐지 시 동작 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessGatePolicy {
    /// 프로세스가 뜰 때까지 대기, 대기 한도 초과 시 세션 중단
    #[default]
    FailClosed,
    /// 경고 로그만 남기고 캡처 진행
    WarnAndProceed,
}

/// 화면 캡처 설정 — 한 번의 실행 동안 불변
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// 캡처 영역
    #[serde(default)]
    pub region: CaptureRegion,
    /// 목표 캡처 빈도 (초당 프레임)
    #[serde(default = "default_target_fps")]
    pub target_fps: f64,
    /// 총 캡처 시간 (초)
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
    /// 감시 대상 프로세스명 (None이면 생존 탐지 생략)
    #[serde(default)]
    pub target_process: Option<String>,
    /// 프로세스 미탐지 시 정책
    #[serde(default)]
    pub gate_policy: ProcessGatePolicy,
    /// 생존 재탐지 주기 (초)
    #[serde(default = "default_reprobe_interval_secs")]
    pub reprobe_interval_secs: u64,
    /// fail-closed 대기 한도 (초) — 초과 시 세션 중단
    #[serde(default = "default_process_wait_timeout_secs")]
    pub process_wait_timeout_secs: u64,
    /// 1회 캡처 호출 타임아웃 (밀리초)
    #[serde(default = "default_capture_timeout_ms")]
    pub capture_timeout_ms: u64,
    /// 캡처할 모니터 인덱스 (None이면 주 모니터)
    #[serde(default)]
    pub monitor_index: Option<usize>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            region: CaptureRegion::default(),
            target_fps: default_target_fps(),
            duration_secs: default_duration_secs(),
            target_process: None,
            gate_policy: ProcessGatePolicy::default(),
            reprobe_interval_secs: default_reprobe_interval_secs(),
            process_wait_timeout_secs: default_process_wait_timeout_secs(),
            capture_timeout_ms: default_capture_timeout_ms(),
            monitor_index: None,
        }
    }
}

impl CaptureConfig {
    /// 설정 유효성 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.region.width == 0 || self.region.height == 0 {
            return Err(CoreError::Validation {
                field: "capture.region".to_string(),
                message: "너비와 높이는 0보다 커야 합니다".to_string(),
            });
        }
        if !self.target_fps.is_finite() || self.target_fps <= 0.0 {
            return Err(CoreError::Validation {
                field: "capture.target_fps".to_string(),
                message: "0보다 커야 합니다".to_string(),
            });
        }
        if self.duration_secs == 0 {
            return Err(CoreError::Validation {
                field: "capture.duration_secs".to_string(),
                message: "0보다 커야 합니다".to_string(),
            });
        }
        if self.capture_timeout_ms == 0 {
            return Err(CoreError::Validation {
                field: "capture.capture_timeout_ms".to_string(),
                message: "0보다 커야 합니다".to_string(),
            });
        }
        if self.reprobe_interval_secs == 0 {
            return Err(CoreError::Validation {
                field: "capture.reprobe_interval_secs".to_string(),
                message: "0보다 커야 합니다".to_string(),
            });
        }
        Ok(())
    }

    /// 캡처 간격을 Duration으로 반환 (1 / target_fps)
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps)
    }

    /// 총 캡처 시간을 Duration으로 반환
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    /// 1회 캡처 타임아웃을 Duration으로 반환
    pub fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.capture_timeout_ms)
    }

    /// 생존 재탐지 주기를 Duration으로 반환
    pub fn reprobe_interval(&self) -> Duration {
        Duration::from_secs(self.reprobe_interval_secs)
    }

    /// fail-closed 대기 한도를 Duration으로 반환
    pub fn process_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.process_wait_timeout_secs)
    }

    /// 생존 탐지를 수행할 실제 대상 프로세스명.
    /// 미설정, 빈 문자열, 센티널(`unknown`)이면 None — 탐지 생략.
    pub fn gate_target(&self) -> Option<&str> {
        match self.target_process.as_deref() {
            Some(name)
                if !name.trim().is_empty()
                    && !name.trim().eq_ignore_ascii_case(UNKNOWN_EXECUTABLE) =>
            {
                Some(name)
            }
            _ => None,
        }
    }
}

// ============================================================
// 분석 설정
// ============================================================

/// 샘플 전체가 실패했을 때의 종합 단계 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllFailedPolicy {
    /// 실패 플레이스홀더만으로도 리포트 종합 진행 (기본)
    #[default]
    SynthesizeDegraded,
    /// 파이프라인 실패로 중단
    Abort,
}

/// WebP 인코딩 품질 등급
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebPQuality {
    /// 저화질 (60) — 전송량 최소화
    Low = 60,
    /// 중간 (75)
    Medium = 75,
    /// 고화질 (85) — 분석 정확도 우선 (기본)
    #[default]
    High = 85,
}

impl WebPQuality {
    /// webp 인코더에 전달할 품질 계수
    pub fn as_factor(self) -> f32 {
        self as u8 as f32
    }
}

/// 샘플링/분석 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// 분석 대상으로 추출할 프레임 수
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// 비전 백엔드 응답 토큰 한도
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// 프레임 분석 동시 요청 수 (샘플 수 이하로 클램프됨)
    #[serde(default = "default_parallel_requests")]
    pub parallel_requests: usize,
    /// WebP 인코딩 품질
    #[serde(default)]
    pub quality: WebPQuality,
    /// 인코딩 전 긴 변 축소 한도 (픽셀, None이면 원본 크기 유지)
    #[serde(default)]
    pub max_edge: Option<u32>,
    /// 샘플 전체 실패 시 정책
    #[serde(default)]
    pub on_all_failed: AllFailedPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            max_tokens: default_max_tokens(),
            parallel_requests: default_parallel_requests(),
            quality: WebPQuality::default(),
            max_edge: None,
            on_all_failed: AllFailedPolicy::default(),
        }
    }
}

impl AnalysisConfig {
    /// 설정 유효성 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.sample_size == 0 {
            return Err(CoreError::Validation {
                field: "analysis.sample_size".to_string(),
                message: "0보다 커야 합니다".to_string(),
            });
        }
        if self.max_tokens == 0 {
            return Err(CoreError::Validation {
                field: "analysis.max_tokens".to_string(),
                message: "0보다 커야 합니다".to_string(),
            });
        }
        if let Some(edge) = self.max_edge {
            if edge == 0 {
                return Err(CoreError::Validation {
                    field: "analysis.max_edge".to_string(),
                    message: "0보다 커야 합니다".to_string(),
                });
            }
        }
        Ok(())
    }
}

// ============================================================
// 백엔드 엔드포인트 설정
// ============================================================

/// 비전 백엔드 엔드포인트 (OpenAI 호환 chat-completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionEndpoint {
    /// 요청 URL
    #[serde(default = "default_vision_endpoint")]
    pub endpoint: String,
    /// API 키 (비어 있으면 환경변수 `HUNSU_VISION_API_KEY` 사용)
    #[serde(default)]
    pub api_key: String,
    /// 모델 식별자
    #[serde(default = "default_vision_model")]
    pub model: String,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_vision_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for VisionEndpoint {
    fn default() -> Self {
        Self {
            endpoint: default_vision_endpoint(),
            api_key: String::new(),
            model: default_vision_model(),
            timeout_secs: default_vision_timeout_secs(),
        }
    }
}

impl VisionEndpoint {
    /// 설정 유효성 검증 (API 키는 클라이언트 생성 시점에 별도 검사)
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.endpoint.trim().is_empty() {
            return Err(CoreError::Validation {
                field: "vision.endpoint".to_string(),
                message: "비어 있을 수 없습니다".to_string(),
            });
        }
        if self.model.trim().is_empty() {
            return Err(CoreError::Validation {
                field: "vision.model".to_string(),
                message: "비어 있을 수 없습니다".to_string(),
            });
        }
        Ok(())
    }

    /// 요청 타임아웃을 Duration으로 반환
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 종합 백엔드 엔드포인트 (Gemini generateContent)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisEndpoint {
    /// API 베이스 URL
    #[serde(default = "default_synthesis_endpoint")]
    pub endpoint: String,
    /// API 키 (비어 있으면 환경변수 `HUNSU_SYNTHESIS_API_KEY` 사용)
    #[serde(default)]
    pub api_key: String,
    /// 모델 식별자
    #[serde(default = "default_synthesis_model")]
    pub model: String,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_synthesis_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SynthesisEndpoint {
    fn default() -> Self {
        Self {
            endpoint: default_synthesis_endpoint(),
            api_key: String::new(),
            model: default_synthesis_model(),
            timeout_secs: default_synthesis_timeout_secs(),
        }
    }
}

impl SynthesisEndpoint {
    /// 설정 유효성 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.endpoint.trim().is_empty() {
            return Err(CoreError::Validation {
                field: "synthesis.endpoint".to_string(),
                message: "비어 있을 수 없습니다".to_string(),
            });
        }
        if self.model.trim().is_empty() {
            return Err(CoreError::Validation {
                field: "synthesis.model".to_string(),
                message: "비어 있을 수 없습니다".to_string(),
            });
        }
        Ok(())
    }

    /// 요청 타임아웃을 Duration으로 반환
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_target_fps() -> f64 {
    10.0
}
fn default_duration_secs() -> u64 {
    30
}
fn default_reprobe_interval_secs() -> u64 {
    5
}
fn default_process_wait_timeout_secs() -> u64 {
    60
}
fn default_capture_timeout_ms() -> u64 {
    5_000
}
fn default_sample_size() -> usize {
    5
}
fn default_max_tokens() -> u32 {
    500
}
fn default_parallel_requests() -> usize {
    3
}
fn default_vision_endpoint() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}
fn default_vision_model() -> String {
    "meta-llama/llama-3.2-11b-vision-instruct:free".to_string()
}
fn default_vision_timeout_secs() -> u64 {
    30
}
fn default_synthesis_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_synthesis_model() -> String {
    "gemini-2.0-flash".to_string()
}
fn default_synthesis_timeout_secs() -> u64 {
    60
}
