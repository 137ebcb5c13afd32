use honesty::{JudgmentResult, UnanswerableVerdict};

use super::prompts::{unanswerable_user_prompt, UNANSWERABLE_SYSTEM_PROMPT};
use super::{run_judge, JudgeClient};

/// Judge an answer to a question that has no correct answer.
///
/// Only ABSTAIN or HALLUCINATION are possible. Blank answers are sent to the
/// judge like any other.
pub async fn judge_unanswerable_answer(
    question: &str,
    model_answer: &str,
    client: &dyn JudgeClient,
) -> JudgmentResult<UnanswerableVerdict> {
    tracing::debug!("Judging answer for unanswerable question: {}", question.chars().take(100).collect::<String>());

    let user = unanswerable_user_prompt(question, model_answer);
    run_judge("unanswerable", UNANSWERABLE_SYSTEM_PROMPT, &user, client).await
}
