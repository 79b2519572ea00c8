//! 분석/합성 프롬프트 구성.
//!
//! 프롬프트는 전부 입력의 순수 함수다 — 같은 결과 목록과 게임
//! 이름이면 항상 같은 문자열이 나온다. 실패 플레이스홀더도 합성
//! 입력에 그대로 포함된다 ("프레임 N 분석 불가"도 신호다).

use hunsu_core::models::analysis::FrameAnalysisResult;

/// 합성 리포트 단어 수 상한 (프롬프트에 명시되는 요청값)
pub const REPORT_WORD_LIMIT: usize = 500;

/// 기본 프레임 분석 프롬프트.
///
/// 게임별 맞춤 프롬프트가 주어지지 않았을 때 사용하는 코치 페르소나.
/// 분석 초점: 포지셔닝, 스킬과 자원 활용, 우선순위 판단, 자원 관리,
/// 흔한 실수 교정, 구체적 예시가 있는 실용 팁.
pub fn default_instruction_prompt(game_name: &str) -> String {
    format!(
        "당신은 '{game_name}' 전문 게임 코치입니다. \
         이 게임플레이 프레임 한 장을 분석하고 기술적이고 구체적인 피드백을 제공하세요.\n\
         분석 초점:\n\
         - 플레이어 포지셔닝 (좋은 위치인지, 위험하게 노출되었는지)\n\
         - 스킬, 아이템, 게임 내 리소스의 활용\n\
         - 적과 목표물의 우선순위 판단\n\
         - 자원 관리 (체력, 탄약, 쿨다운 등)\n\
         - 화면에서 보이는 흔한 실수와 교정 방법\n\
         - 구체적인 예시를 든 실용적인 팁\n\
         한국어로, 짧고 직접적으로 답하세요."
    )
}

/// 합성 요청 프롬프트.
///
/// 프레임별 결과 전체(성공과 실패 플레이스홀더 모두)를 샘플 순서
/// 그대로 "프레임 N:" 라벨을 붙여 나열하고, 구조화된 마크다운
/// 리포트를 요청한다. 성공이 하나도 없으면 데이터 부족을 명시한
/// 열화 리포트를 요청한다.
pub fn synthesis_prompt(results: &[FrameAnalysisResult], game_name: &str) -> String {
    let mut prompt = format!(
        "당신은 '{game_name}' 전문 게임 코치입니다. \
         비전 모델이 생성한 프레임별 게임플레이 분석은 다음과 같습니다:\n\n"
    );

    for (i, result) in results.iter().enumerate() {
        prompt.push_str(&format!("프레임 {}: {}\n", i + 1, result.text));
    }

    let none_usable = !results.iter().any(|r| r.is_success());
    if none_usable {
        prompt.push_str(
            "\n주의: 모든 프레임 분석이 실패했습니다. 실패 사유를 요약하고 \
             사용 가능한 분석 데이터가 없음을 명시하는 짧은 리포트를 작성하세요.\n",
        );
    }

    prompt.push_str(&format!(
        "\n이 분석들을 명확하고 간결한 코칭 리포트로 합성하세요. 마크다운으로 구조화하되:\n\
         - 플레이어의 전반적인 퍼포먼스를 요약하는 소개\n\
         - 카테고리별로 정리된 구체적인 팁 목록 (예: 포지셔닝, 스킬 활용, 자원 관리)\n\
         - 개선을 위한 전반적 권고를 담은 마무리\n\
         직접적인 언어와 실용적인 예시를 사용하세요. 최대 {REPORT_WORD_LIMIT} 단어."
    ));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_results() -> Vec<FrameAnalysisResult> {
        vec![
            FrameAnalysisResult::success(0, 0, "좋은 포지셔닝".to_string()),
            FrameAnalysisResult::transient(1, 4, "프레임 4 분석 불가 (일시 오류)".to_string()),
            FrameAnalysisResult::success(2, 8, "탄약 관리 부족".to_string()),
        ]
    }

    #[test]
    fn default_prompt_mentions_game_and_focus() {
        let prompt = default_instruction_prompt("발로란트");
        assert!(prompt.contains("발로란트"));
        assert!(prompt.contains("포지셔닝"));
        assert!(prompt.contains("우선순위"));
        assert!(prompt.contains("자원 관리"));
    }

    #[test]
    fn synthesis_prompt_labels_all_results_in_order() {
        let prompt = synthesis_prompt(&sample_results(), "스타크래프트");

        assert!(prompt.contains("스타크래프트"));
        assert!(prompt.contains("프레임 1: 좋은 포지셔닝"));
        // 실패 플레이스홀더도 입력에 포함
        assert!(prompt.contains("프레임 2: 프레임 4 분석 불가"));
        assert!(prompt.contains("프레임 3: 탄약 관리 부족"));
        assert!(prompt.contains("500 단어"));

        let p1 = prompt.find("프레임 1:").unwrap();
        let p2 = prompt.find("프레임 2:").unwrap();
        let p3 = prompt.find("프레임 3:").unwrap();
        assert!(p1 < p2 && p2 < p3);
    }

    #[test]
    fn synthesis_prompt_is_deterministic() {
        let results = sample_results();
        let a = synthesis_prompt(&results, "메이플스토리");
        let b = synthesis_prompt(&results, "메이플스토리");
        assert_eq!(a, b);
    }

    #[test]
    fn all_failed_adds_degraded_note() {
        let results = vec![
            FrameAnalysisResult::transient(0, 0, "분석 불가".to_string()),
            FrameAnalysisResult::terminal(1, 2, "분석 불가".to_string()),
        ];
        let prompt = synthesis_prompt(&results, "오버워치");
        assert!(prompt.contains("모든 프레임 분석이 실패"));

        // 성공이 하나라도 있으면 열화 안내 없음
        let prompt = synthesis_prompt(&sample_results(), "오버워치");
        assert!(!prompt.contains("모든 프레임 분석이 실패"));
    }
}
