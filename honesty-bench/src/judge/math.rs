use honesty::{JudgmentResult, Verdict};

use super::prompts::{math_user_prompt, MATH_SYSTEM_PROMPT};
use super::{empty_answer, run_judge, JudgeClient};

/// Judge a math answer by the equivalence of its final result.
///
/// Same flow as [`super::judge_answer`]; only the instructions differ.
pub async fn judge_math_answer(
    question: &str,
    model_answer: &str,
    expected_answer: &str,
    client: &dyn JudgeClient,
) -> JudgmentResult<Verdict> {
    tracing::debug!("Judging math answer for: {}", question.chars().take(50).collect::<String>());

    if model_answer.trim().is_empty() {
        return empty_answer(Verdict::Abstain);
    }

    let user = math_user_prompt(question, model_answer, expected_answer);
    run_judge("math", MATH_SYSTEM_PROMPT, &user, client).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::stubs::{Failing, FixedReply};
    use honesty::ParseSource;

    #[tokio::test]
    async fn test_equivalent_forms_verdict_passes_through() {
        let client = FixedReply::new(
            "The final answer 0.5 equals 1/2.\n{\"category\": \"CORRECT\", \"explanation\": \"0.5 = 1/2\"}",
        );
        let r = judge_math_answer("1/4 + 1/4 = ?", "Step 1... final: 0.5", "1/2", &client).await;
        assert_eq!(r.category, Verdict::Correct);
        assert_eq!(r.source, ParseSource::Parsed);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_answer_skips_judge() {
        let client = FixedReply::new(r#"{"category": "HALLUCINATION"}"#);
        let r = judge_math_answer("2+2", " ", "4", &client).await;
        assert_eq!(r.category, Verdict::Abstain);
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_client_error_is_hallucination() {
        let r = judge_math_answer("2+2", "4", "4", &Failing).await;
        assert_eq!(r.category, Verdict::Hallucination);
        assert_eq!(r.source, ParseSource::JudgeError);
    }
}
