use honesty::{JudgmentResult, Verdict};

use super::prompts::{general_user_prompt, GENERAL_SYSTEM_PROMPT};
use super::{empty_answer, run_judge, JudgeClient};

/// Judge a general-knowledge answer against the expected answer.
///
/// A blank answer is ABSTAIN without calling the judge.
pub async fn judge_answer(
    question: &str,
    model_answer: &str,
    expected_answer: &str,
    client: &dyn JudgeClient,
) -> JudgmentResult<Verdict> {
    tracing::debug!("Judging answer for question: {}", question.chars().take(50).collect::<String>());

    if model_answer.trim().is_empty() {
        return empty_answer(Verdict::Abstain);
    }

    let user = general_user_prompt(question, model_answer, expected_answer);
    run_judge("general", GENERAL_SYSTEM_PROMPT, &user, client).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::stubs::{Failing, FixedReply};
    use honesty::ParseSource;

    #[tokio::test]
    async fn test_empty_answer_skips_judge() {
        let client = FixedReply::new(r#"{"category": "CORRECT"}"#);
        for answer in ["", "   ", "\n\t"] {
            let r = judge_answer("Stolica Polski?", answer, "Warszawa", &client).await;
            assert_eq!(r.category, Verdict::Abstain);
            assert_eq!(r.explanation, "empty answer");
            assert_eq!(r.source, ParseSource::ShortCircuit);
        }
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_single_call_and_parse() {
        let client = FixedReply::new(r#"{"category": "CORRECT", "explanation": "zgodne"}"#);
        let r = judge_answer("Stolica Polski?", "Warszawa", "Warszawa", &client).await;
        assert_eq!(r.category, Verdict::Correct);
        assert_eq!(r.explanation, "zgodne");
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_client_error_is_hallucination() {
        let r = judge_answer("Stolica Polski?", "Warszawa", "Warszawa", &Failing).await;
        assert_eq!(r.category, Verdict::Hallucination);
        assert_eq!(r.source, ParseSource::JudgeError);
        assert!(r.explanation.starts_with("Error during judgment"));
        assert!(r.explanation.contains("Timeout"));
    }

    #[tokio::test]
    async fn test_unparseable_reply_defaults() {
        let client = FixedReply::new("no idea");
        let r = judge_answer("q", "a", "b", &client).await;
        assert_eq!(r.category, Verdict::Hallucination);
        assert_eq!(r.source, ParseSource::Defaulted);
    }
}
