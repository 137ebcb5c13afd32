//! Async executor for answer generation and judging

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use indexmap::IndexMap;
use tokio::sync::Semaphore;
use tokio::time::sleep;

use honesty::{JudgmentResult, Verdict};

use crate::analysis::format_temperature;
use crate::dataset::{AnswerRecord, JudgmentRecord, QaItem};
use crate::judge::{judge_answer, judge_math_answer, judge_unanswerable_answer, JudgeClient, JudgeMode};
use crate::prompts::PromptVariant;
use crate::providers::{CompletionRequest, CompletionResponse, LLMProvider, Message, ProviderError};

/// Configuration for the executor
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorConfig {
    /// Maximum parallel requests
    pub parallel_requests: usize,
    /// Number of retries on failure
    pub retry_count: u32,
    /// Initial retry delay in milliseconds
    pub retry_delay_ms: u64,
    /// Maximum retry delay in milliseconds
    pub max_retry_delay_ms: u64,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            parallel_requests: 3,
            retry_count: 3,
            retry_delay_ms: 1000,
            max_retry_delay_ms: 60_000,
            timeout_ms: 60_000,
        }
    }
}

/// Per-run metadata stamped on every generated answer
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub run_id: String,
    pub model: String,
    pub max_tokens: u32,
}

/// Executor for generating and judging answers
pub struct Executor {
    config: ExecutorConfig,
    provider: Arc<dyn LLMProvider>,
    semaphore: Arc<Semaphore>,
}

impl Executor {
    /// Create a new executor
    pub fn new(provider: Arc<dyn LLMProvider>, config: ExecutorConfig) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.parallel_requests.max(1)));
        Self {
            config,
            provider,
            semaphore,
        }
    }

    /// Ask the model every (temperature, item, variant) combination.
    ///
    /// Output order is temperature, then item, then variant. A generation
    /// that fails after all retries yields an empty answer with `error` set.
    pub async fn generate_answers(
        &self,
        settings: &GenerationSettings,
        items: &[QaItem],
        variants: &[PromptVariant],
        temperatures: &[f32],
    ) -> Vec<AnswerRecord> {
        tracing::info!(
            "Generating {} answers ({} questions x {} variants x {} temperatures)",
            items.len() * variants.len() * temperatures.len(),
            items.len(),
            variants.len(),
            temperatures.len()
        );

        let mut handles = Vec::new();

        for &temperature in temperatures {
            for item in items {
                for &variant in variants {
                    let base = self.base_record(settings, item, variant, temperature);
                    let fallback = base.clone();
                    let executor = self.clone_for_task();

                    let system = variant.system;
                    let handle = tokio::spawn(async move { executor.generate_one(base, system).await });
                    handles.push((handle, fallback));
                }
            }
        }

        let mut records = Vec::with_capacity(handles.len());
        for (handle, mut fallback) in handles {
            match handle.await {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::error!("Generation task panicked: {}", e);
                    fallback.error = Some(format!("task panicked: {}", e));
                    records.push(fallback);
                }
            }
        }

        let failed = records.iter().filter(|r| r.error.is_some()).count();
        if failed > 0 {
            tracing::warn!("{} of {} generations failed and were recorded as empty answers", failed, records.len());
        }
        records
    }

    /// Answer record with everything but the answer filled in
    fn base_record(
        &self,
        settings: &GenerationSettings,
        item: &QaItem,
        variant: PromptVariant,
        temperature: f32,
    ) -> AnswerRecord {
        AnswerRecord {
            id: item.id.clone(),
            answer: String::new(),
            run_id: Some(settings.run_id.clone()),
            ts_utc: None,
            provider: Some(self.provider.name().to_string()),
            model: Some(settings.model.clone()),
            temperature: Some(temperature),
            max_tokens: Some(settings.max_tokens),
            prompt_variant: Some(variant.name.to_string()),
            question: Some(item.question.clone()),
            expected_answer: item.expected_answer.clone(),
            user_prompt: Some(variant.render(&item.question)),
            error: None,
        }
    }

    async fn generate_one(&self, mut record: AnswerRecord, system: &'static str) -> AnswerRecord {
        let request = CompletionRequest::new(
            vec![Message::user(record.user_prompt.clone().unwrap_or_default())],
            record.max_tokens.unwrap_or(256),
        )
        .with_model(record.model.clone().unwrap_or_default())
        .with_temperature(record.temperature.unwrap_or(0.0))
        .with_system(system)
        .with_item_id(&record.id);

        match self.complete_with_retry(&request, &record.id).await {
            Ok(response) => {
                tracing::debug!(
                    "{} [{}] T={:?}: {} chars in {}ms",
                    record.id,
                    record.variant(),
                    request.temperature,
                    response.content.chars().count(),
                    response.latency_ms
                );
                record.answer = response.content;
            }
            Err(e) => {
                tracing::warn!("Generation failed for {} [{}]: {}", record.id, record.variant(), e);
                record.error = Some(e.to_string());
            }
        }
        record.ts_utc = Some(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true));
        record
    }

    /// One completion with retries and exponential back-off
    async fn complete_with_retry(
        &self,
        request: &CompletionRequest,
        item_id: &str,
    ) -> Result<CompletionResponse, ProviderError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ProviderError::Config("executor is shut down".to_string()))?;

        let mut last_error = None;
        let mut delay = self.config.retry_delay_ms;

        for attempt in 0..=self.config.retry_count {
            if attempt > 0 {
                tracing::info!("Retry {} for {} on {}", attempt, item_id, self.provider.name());
                sleep(Duration::from_millis(delay)).await;
                delay = (delay * 2).min(self.config.max_retry_delay_ms);
            }

            match self.try_complete(request).await {
                Ok(response) => return Ok(response),
                Err(ProviderError::RateLimited { retry_after_ms }) => {
                    tracing::warn!("Rate limited on {}, waiting {}ms", self.provider.name(), retry_after_ms);
                    sleep(Duration::from_millis(retry_after_ms)).await;
                    last_error = Some(ProviderError::RateLimited { retry_after_ms });
                }
                Err(e) if e.is_permanent() => {
                    tracing::error!("Permanent error on {} for {}: {}", self.provider.name(), item_id, e);
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!("Error on {} for {}: {}", self.provider.name(), item_id, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ProviderError::Parse("no attempts made".to_string())))
    }

    /// Single attempt bounded by the configured timeout
    async fn try_complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let timeout = Duration::from_millis(self.config.timeout_ms);

        match tokio::time::timeout(timeout, self.provider.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                timeout_ms: self.config.timeout_ms,
            }),
        }
    }

    /// Judge every record against its question, in input order.
    ///
    /// Records whose id has no question are skipped. Judges never fail, so
    /// each remaining record yields exactly one judgment.
    pub async fn judge_records(
        &self,
        mode: JudgeMode,
        items: &[QaItem],
        records: &[AnswerRecord],
        client: Arc<dyn JudgeClient>,
    ) -> Vec<JudgmentRecord> {
        let by_id: HashMap<&str, &QaItem> = items.iter().map(|item| (item.id.as_str(), item)).collect();
        tracing::info!("Judging {} answers in {} mode", records.len(), mode);

        let mut handles = Vec::new();
        for record in records {
            let Some(item) = by_id.get(record.id.as_str()) else {
                tracing::warn!("No question for answer id={}, skipping", record.id);
                continue;
            };

            let item = (*item).clone();
            let record = record.clone();
            let client = client.clone();
            let semaphore = self.semaphore.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let result = judge_with_mode(mode, &item, &record.answer, client.as_ref()).await;
                judgment_record(&item, record, result)
            }));
        }

        let mut judgments = Vec::with_capacity(handles.len());
        for (i, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(judgment) => judgments.push(judgment),
                Err(e) => tracing::error!("Judge task {} panicked: {}", i, e),
            }
            if (i + 1) % 10 == 0 {
                tracing::info!("Progress: {}/{} judgments", i + 1, records.len());
            }
        }
        judgments
    }

    /// Clone the executor for spawning tasks
    fn clone_for_task(&self) -> Self {
        Self {
            config: self.config.clone(),
            provider: self.provider.clone(),
            semaphore: self.semaphore.clone(),
        }
    }
}

async fn judge_with_mode(
    mode: JudgeMode,
    item: &QaItem,
    answer: &str,
    client: &dyn JudgeClient,
) -> JudgmentResult<Verdict> {
    match mode {
        JudgeMode::General => judge_answer(&item.question, answer, item.expected(), client).await,
        JudgeMode::Math => judge_math_answer(&item.question, answer, item.expected(), client).await,
        JudgeMode::Unanswerable => {
            let r = judge_unanswerable_answer(&item.question, answer, client).await;
            JudgmentResult {
                category: r.category.into(),
                explanation: r.explanation,
                confidence: r.confidence,
                source: r.source,
            }
        }
    }
}

fn judgment_record(item: &QaItem, record: AnswerRecord, result: JudgmentResult<Verdict>) -> JudgmentRecord {
    JudgmentRecord {
        prompt_variant: record.variant().to_string(),
        id: record.id,
        question: item.question.clone(),
        expected_answer: item.expected().to_string(),
        model_answer: record.answer,
        judgment: result.category,
        explanation: result.explanation,
        source: result.source,
        model: record.model.unwrap_or_default(),
        temperature: record.temperature,
        user_prompt: record.user_prompt.unwrap_or_default(),
    }
}

/// Pair every question with every prompt variant seen in `records`, once per
/// temperature present in `records`.
///
/// Temperatures keep their first-seen order and variants are sorted by name.
/// A (temperature, question, variant) triple with no record gets an empty
/// answer and counts as missing; the second value is that count.
pub fn expand_records(items: &[QaItem], records: &[AnswerRecord]) -> (Vec<AnswerRecord>, usize) {
    let variants: BTreeSet<&str> = records.iter().map(|r| r.variant()).collect();
    let mut temperatures: IndexMap<String, Option<f32>> = IndexMap::new();
    let mut by_key: HashMap<(&str, &str, String), &AnswerRecord> = HashMap::new();
    for r in records {
        let temp_key = format_temperature(r.temperature);
        temperatures.entry(temp_key.clone()).or_insert(r.temperature);
        by_key.insert((r.id.as_str(), r.variant(), temp_key), r);
    }

    let mut expanded = Vec::with_capacity(temperatures.len() * items.len() * variants.len());
    let mut missing = 0;
    for (temp_key, temperature) in &temperatures {
        for item in items {
            for &variant in &variants {
                match by_key.get(&(item.id.as_str(), variant, temp_key.clone())) {
                    Some(record) => expanded.push((*record).clone()),
                    None => {
                        tracing::debug!(
                            "No answer for {} variant '{}' at temperature {}",
                            item.id, variant, temp_key
                        );
                        missing += 1;
                        let mut record = AnswerRecord::new(&item.id, "").with_variant(variant);
                        record.temperature = *temperature;
                        expanded.push(record);
                    }
                }
            }
        }
    }
    (expanded, missing)
}
