//! # hunsu
//!
//! 게임플레이 분석 CLI 진입점.
//! 화면 캡처 → 프레임 샘플링 → 비전 분석 → 코칭 리포트 합성을
//! 한 번 실행하고 리포트를 stdout 또는 파일로 출력한다.

use anyhow::{Context, Result};
use clap::Parser;
use hunsu_core::config::{CaptureRegion, PipelineConfig};
use hunsu_monitor::ProcessLivenessProbe;
use hunsu_network::synthesis::RemoteSynthesisBackend;
use hunsu_network::vision::RemoteVisionBackend;
use hunsu_pipeline::{AnalysisRequest, GameplayPipeline};
use hunsu_vision::RegionCapturer;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// HUNSU 게임플레이 분석기
///
/// 게임 화면을 캡처하고 AI 비전 분석으로 코칭 리포트를 생성합니다
#[derive(Parser, Debug)]
#[command(name = "hunsu")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 분석 대상 게임 이름 (리포트에 그대로 실림)
    game: String,

    /// 게임 프로세스 실행 파일명 (생존 확인용, 예: valorant.exe)
    #[arg(long, short = 'p')]
    process: Option<String>,

    /// 캡처 영역: left,top,WIDTHxHEIGHT (예: 0,0,1920x1080)
    #[arg(long, value_parser = parse_region)]
    region: Option<CaptureRegion>,

    /// 캡처 시간 (초)
    #[arg(long, short = 'd')]
    duration: Option<u64>,

    /// 목표 캡처 프레임 레이트
    #[arg(long)]
    fps: Option<f64>,

    /// 분석할 샘플 프레임 수
    #[arg(long)]
    sample_size: Option<usize>,

    /// 동시 비전 요청 수
    #[arg(long)]
    parallel: Option<usize>,

    /// 설정 파일 경로 (JSON)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 프레임 분석 프롬프트 직접 지정
    #[arg(long)]
    prompt: Option<String>,

    /// 프레임 분석 프롬프트를 파일에서 읽기
    #[arg(long, conflicts_with = "prompt")]
    prompt_file: Option<PathBuf>,

    /// 리포트 저장 경로 (기본: stdout)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,
}

/// 캡처 영역 인자 파싱: "left,top,WIDTHxHEIGHT"
fn parse_region(s: &str) -> Result<CaptureRegion, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err("형식: left,top,WIDTHxHEIGHT (예: 0,0,1920x1080)".to_string());
    }

    let left: i32 = parts[0]
        .trim()
        .parse()
        .map_err(|_| format!("left가 정수가 아님: {}", parts[0]))?;
    let top: i32 = parts[1]
        .trim()
        .parse()
        .map_err(|_| format!("top이 정수가 아님: {}", parts[1]))?;

    let (w, h) = parts[2]
        .trim()
        .split_once('x')
        .ok_or_else(|| format!("크기 형식은 WIDTHxHEIGHT: {}", parts[2]))?;
    let width: u32 = w
        .trim()
        .parse()
        .map_err(|_| format!("너비가 양의 정수가 아님: {w}"))?;
    let height: u32 = h
        .trim()
        .parse()
        .map_err(|_| format!("높이가 양의 정수가 아님: {h}"))?;

    Ok(CaptureRegion {
        top,
        left,
        width,
        height,
    })
}

/// 설정 로드: 파일 → CLI 오버라이드 → 환경 변수 키 폴백 → 검증
fn load_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("설정 파일 읽기 실패: {}", path.display()))?;
            PipelineConfig::from_json_str(&raw)?
        }
        None => PipelineConfig::default(),
    };

    // CLI 인자로 설정 오버라이드
    if let Some(process) = &args.process {
        config.capture.target_process = Some(process.clone());
    }
    if let Some(region) = args.region {
        config.capture.region = region;
    }
    if let Some(duration) = args.duration {
        config.capture.duration_secs = duration;
    }
    if let Some(fps) = args.fps {
        config.capture.target_fps = fps;
    }
    if let Some(sample_size) = args.sample_size {
        config.analysis.sample_size = sample_size;
    }
    if let Some(parallel) = args.parallel {
        config.analysis.parallel_requests = parallel;
    }

    // 설정 파일에 키가 없으면 환경 변수에서 읽는다
    if config.vision.api_key.is_empty() {
        if let Ok(key) = std::env::var("HUNSU_VISION_API_KEY") {
            config.vision.api_key = key;
        }
    }
    if config.synthesis.api_key.is_empty() {
        if let Ok(key) = std::env::var("HUNSU_SYNTHESIS_API_KEY") {
            config.synthesis.api_key = key;
        }
    }

    config.validate()?;
    Ok(config)
}

/// 분석 프롬프트 결정: --prompt → --prompt-file → 기본 코치 프롬프트
fn resolve_instruction_prompt(args: &Args) -> Result<String> {
    if let Some(prompt) = &args.prompt {
        return Ok(prompt.clone());
    }
    if let Some(path) = &args.prompt_file {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("프롬프트 파일 읽기 실패: {}", path.display()))?;
        return Ok(raw);
    }
    Ok(hunsu_pipeline::prompt::default_instruction_prompt(
        &args.game,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // tracing 초기화 — 리포트가 stdout으로 나가므로 로그는 stderr로
    let log_filter = format!(
        "hunsu={},hunsu_pipeline={},hunsu_core={},hunsu_monitor={},hunsu_vision={},hunsu_network={}",
        args.log_level, args.log_level, args.log_level, args.log_level, args.log_level, args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args)?;
    let instruction_prompt = resolve_instruction_prompt(&args)?;

    info!("HUNSU 게임플레이 분석 시작: {}", args.game);
    info!(
        "캡처: {}초 @ {:.1}fps, 샘플 {}장, 동시 요청 {}",
        config.capture.duration_secs,
        config.capture.target_fps,
        config.analysis.sample_size,
        config.analysis.parallel_requests
    );
    if let Some(target) = config.capture.gate_target() {
        info!("대상 프로세스: {target} ({:?})", config.capture.gate_policy);
    }

    // ── 어댑터 생성 (DI 와이어링) ──

    let source = Arc::new(RegionCapturer::new(
        config.capture.region,
        config.capture.monitor_index,
    ));
    let probe = Arc::new(ProcessLivenessProbe::new());
    let vision = Arc::new(RemoteVisionBackend::new(&config.vision)?);
    let synthesis = Arc::new(RemoteSynthesisBackend::new(&config.synthesis)?);

    // 캡처 진행률 로거
    let (progress_tx, mut progress_rx) = watch::channel(0.0f32);
    tokio::spawn(async move {
        let mut last_logged = -10.0f32;
        while progress_rx.changed().await.is_ok() {
            let pct = *progress_rx.borrow();
            if pct - last_logged >= 10.0 || (pct >= 100.0 && last_logged < 100.0) {
                info!("캡처 진행률: {pct:.0}%");
                last_logged = pct;
            }
        }
    });

    let pipeline = GameplayPipeline::new(config, source, probe, vision, synthesis)
        .with_progress(progress_tx);
    let request = AnalysisRequest {
        game_name: args.game.clone(),
        instruction_prompt,
    };

    let report = tokio::select! {
        result = pipeline.run(&request) => result?,
        _ = tokio::signal::ctrl_c() => {
            warn!("중단 신호 수신 — 분석을 종료합니다");
            anyhow::bail!("사용자 중단");
        }
    };

    info!(
        "통계: 캡처 {}장 (실패 {}), 샘플 {}장, 성공 {} / 일시 {} / 터미널 {}",
        report.stats.frames_captured,
        report.stats.failed_captures,
        report.stats.frames_sampled,
        report.stats.successes,
        report.stats.transient_failures,
        report.stats.terminal_failures
    );

    match &args.output {
        Some(path) => {
            std::fs::write(path, &report.markdown)
                .with_context(|| format!("리포트 저장 실패: {}", path.display()))?;
            info!("리포트 저장됨: {}", path.display());
        }
        None => println!("{}", report.markdown),
    }

    Ok(())
}
