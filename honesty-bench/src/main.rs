//! Honesty Benchmark CLI

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use honesty_bench::{
    analysis::{score_answers, score_records},
    config::{Config, ConfigError},
    dataset::{
        load_answer_records, load_answers, load_math_questions, load_questions,
        load_unanswerable_questions, AnswerRecord, QaItem,
    },
    judge::{JudgeClient, JudgeMode, ProviderJudge},
    prompts::{select_variants, PromptVariant, GENERAL_VARIANTS, MATH_SOLUTION, MATH_VARIANTS},
    providers::{create_provider, LLMProvider, ProviderKind},
    reporting::{print_console_report, write_jsonl, RunSettingsSnapshot, RunSummary},
    runner::{expand_records, new_run_id, parse_temperatures, Executor, GenerationSettings},
};

#[derive(Parser)]
#[command(name = "honesty-bench")]
#[command(about = "Measure correctness, abstention and hallucination of LLM answers across prompt variants")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate answers over prompt variants and temperatures, then score them
    Prompt {
        /// Questions JSONL (id, question, keyword_groups or expected_answer)
        #[arg(short, long)]
        questions: PathBuf,

        /// Use the math variant set and score with the math judge
        #[arg(long)]
        math: bool,

        /// Ask for a step-by-step solution instead of a bare number
        #[arg(long, requires = "math")]
        step_by_step: bool,

        /// Answering provider (openai, mock)
        #[arg(long, default_value = "openai")]
        provider: ProviderKind,

        /// Answering model (default: from config)
        #[arg(long)]
        model: Option<String>,

        /// Comma-separated temperatures, e.g. "0,0.7"
        #[arg(long)]
        temperatures: Option<String>,

        /// Comma-separated prompt variants to run (default: the whole set)
        #[arg(long)]
        variants: Option<String>,

        /// Max tokens per answer (default: config, or 2048 for math)
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Per-request timeout in seconds (default: config, or 180 for math)
        #[arg(long)]
        timeout: Option<u64>,

        /// Output directory for run files (default: from config)
        #[arg(short, long)]
        outdir: Option<PathBuf>,

        /// For --provider mock: answers JSONL with id + answer
        #[arg(long)]
        mock_answers: Option<PathBuf>,

        /// Judge provider for --math (openai, mock)
        #[arg(long, default_value = "openai")]
        judge_provider: ProviderKind,

        /// Judge model (default: from config)
        #[arg(long)]
        judge_model: Option<String>,
    },

    /// Keyword-score an answers file against its questions
    Score {
        /// Questions JSONL with keyword groups
        #[arg(short, long)]
        questions: PathBuf,

        /// Answers JSONL (id + answer)
        #[arg(short, long)]
        answers: PathBuf,

        /// Optional path to save a per-item report JSONL
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Compare diacritics exactly (ą != a)
        #[arg(long)]
        no_diacritics_fold: bool,
    },

    /// Judge an answers file with an LLM
    Judge {
        /// Questions JSONL
        #[arg(short, long)]
        questions: PathBuf,

        /// Answers JSONL (id + answer, optionally prompt_variant)
        #[arg(short, long)]
        answers: PathBuf,

        /// Judgments JSONL; the summary goes next to it as .summary.json
        #[arg(short, long)]
        output: PathBuf,

        /// Judge to use (general, math, unanswerable)
        #[arg(short, long, default_value = "general")]
        mode: JudgeMode,

        /// Judge provider (openai, mock)
        #[arg(long, default_value = "openai")]
        judge_provider: ProviderKind,

        /// Judge model (default: from config)
        #[arg(long)]
        judge_model: Option<String>,
    },

    /// List prompt variants
    ListVariants,

    /// Generate sample configuration
    InitConfig {
        /// Output path for configuration file
        #[arg(short, long, default_value = "config/honesty.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("honesty_bench=debug,honesty=debug,info")
    } else {
        EnvFilter::new("honesty_bench=info,honesty=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Prompt {
            questions,
            math,
            step_by_step,
            provider,
            model,
            temperatures,
            variants,
            max_tokens,
            timeout,
            outdir,
            mock_answers,
            judge_provider,
            judge_model,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let opts = PromptOptions {
                math,
                step_by_step,
                provider,
                model,
                temperatures,
                variants,
                max_tokens,
                timeout,
                outdir,
                mock_answers,
                judge_provider,
                judge_model,
            };
            run_prompting(&config, &questions, opts).await?;
        }

        Commands::Score {
            questions,
            answers,
            report,
            no_diacritics_fold,
        } => {
            score(&questions, &answers, report.as_deref(), !no_diacritics_fold)?;
        }

        Commands::Judge {
            questions,
            answers,
            output,
            mode,
            judge_provider,
            judge_model,
        } => {
            let config = load_config(cli.config.as_deref())?;
            run_judge(&config, &questions, &answers, &output, mode, judge_provider, judge_model).await?;
        }

        Commands::ListVariants => {
            list_variants();
        }

        Commands::InitConfig { output } => {
            init_config(output)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => {
            let config = Config::from_file(path)?;
            tracing::info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(Config::load_or_default()),
    }
}

struct PromptOptions {
    math: bool,
    step_by_step: bool,
    provider: ProviderKind,
    model: Option<String>,
    temperatures: Option<String>,
    variants: Option<String>,
    max_tokens: Option<u32>,
    timeout: Option<u64>,
    outdir: Option<PathBuf>,
    mock_answers: Option<PathBuf>,
    judge_provider: ProviderKind,
    judge_model: Option<String>,
}

async fn run_prompting(
    config: &Config,
    questions_path: &Path,
    opts: PromptOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let run_id = new_run_id();
    tracing::info!("Starting {} prompting run: {}", if opts.math { "math" } else { "general" }, run_id);

    let items = if opts.math {
        load_math_questions(questions_path)?
    } else {
        load_questions(questions_path)?
    };
    if items.is_empty() {
        return Err("No questions to run".into());
    }

    let default_temperature = if opts.math { 0.0 } else { config.provider.temperature };
    let temps = parse_temperatures(
        opts.temperatures
            .as_deref()
            .unwrap_or(&format!("{:?}", default_temperature)),
    )?;

    let variant_set: &[PromptVariant] = if opts.step_by_step {
        std::slice::from_ref(&MATH_SOLUTION)
    } else if opts.math {
        MATH_VARIANTS
    } else {
        GENERAL_VARIANTS
    };
    let variants = select_variants(variant_set, opts.variants.as_deref())?;

    let mut settings = config.provider.clone();
    if let Some(model) = opts.model {
        settings.model = model;
    }
    let max_tokens = opts
        .max_tokens
        .unwrap_or(if opts.math { 2048 } else { settings.max_tokens });

    let mock = match &opts.mock_answers {
        Some(path) => Some(load_answers(path)?),
        None => None,
    };
    let provider = create_provider(opts.provider, &settings, mock)?;

    let mut exec_config = config.executor_config();
    if let Some(secs) = opts.timeout {
        exec_config.timeout_ms = secs.saturating_mul(1000);
    } else if opts.math {
        exec_config.timeout_ms = exec_config.timeout_ms.max(180_000);
    }
    let executor = Executor::new(provider.clone(), exec_config);

    let outdir = opts
        .outdir
        .unwrap_or_else(|| PathBuf::from(&config.run.output_dir));
    std::fs::create_dir_all(&outdir)?;
    let prefix = if opts.math { "math_" } else { "" };
    let answers_path = outdir.join(format!("{}answers_{}.jsonl", prefix, run_id));
    let summary_path = outdir.join(format!("{}summary_{}.json", prefix, run_id));

    println!("=== Honesty Benchmark ===");
    println!("Run ID: {}", run_id);
    println!("Provider: {} (model={})", provider.name(), settings.model);
    println!("Questions: {}", items.len());
    println!(
        "Variants: {}",
        variants.iter().map(|v| v.name).collect::<Vec<_>>().join(", ")
    );
    println!("Temperatures: {:?}", temps);
    println!();

    let generation = GenerationSettings {
        run_id: run_id.clone(),
        model: settings.model.clone(),
        max_tokens,
    };
    let records = executor.generate_answers(&generation, &items, &variants, &temps).await;
    write_jsonl(&answers_path, &records)?;

    let missing = records.iter().filter(|r| r.answer.trim().is_empty()).count();
    let snapshot = RunSettingsSnapshot {
        provider: Some(provider.name().to_string()),
        model: Some(settings.model.clone()),
        judge_model: None,
        temperatures: temps.clone(),
        max_tokens: Some(max_tokens),
    };

    let summary = if opts.math {
        let judge_model = opts.judge_model.unwrap_or_else(|| config.judge.model.clone());
        let judge = judge_client(config, judge_provider(config, opts.judge_provider, &judge_model)?, &judge_model);
        let judgments = executor
            .judge_records(JudgeMode::Math, &items, &records, judge)
            .await;
        write_jsonl(outdir.join(format!("math_judgments_{}.jsonl", run_id)), &judgments)?;

        RunSummary::from_rows(&run_id, JudgeMode::Math.as_str(), &judgments).with_config(RunSettingsSnapshot {
            judge_model: Some(judge_model),
            ..snapshot
        })
    } else {
        let scored = score_records(&items, &records, true);
        write_jsonl(outdir.join(format!("scores_{}.jsonl", run_id)), &scored)?;
        RunSummary::from_rows(&run_id, "keyword", &scored).with_config(snapshot)
    };

    let summary = summary
        .with_paths(questions_path, &answers_path)
        .with_counts(items.len(), missing);
    summary.write_to_file(&summary_path)?;

    print_console_report(&summary);
    println!("Saved answers: {}", answers_path.display());
    println!("Saved summary: {}", summary_path.display());
    Ok(())
}

/// Provider the judge model is called through
fn judge_provider(
    config: &Config,
    kind: ProviderKind,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, Box<dyn std::error::Error>> {
    let mut settings = config.provider.clone();
    settings.model = model.to_string();
    Ok(create_provider(kind, &settings, Some(HashMap::new()))?)
}

/// Judge client with sampling settings from `[judge]`
fn judge_client(config: &Config, provider: Arc<dyn LLMProvider>, model: &str) -> Arc<dyn JudgeClient> {
    tracing::info!("Initializing judge LLM: {} via {}", model, provider.name());
    let judge = ProviderJudge::new(provider, model)
        .with_temperature(config.judge.temperature)
        .with_max_tokens(config.judge.max_tokens)
        .with_timeout_ms(config.run.timeout_ms);
    Arc::new(judge)
}

fn score(
    questions_path: &Path,
    answers_path: &Path,
    report: Option<&Path>,
    fold_diacritics: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let items = load_questions(questions_path)?;
    let answers = load_answers(answers_path)?;

    let (records, missing) = score_answers(&items, &answers, fold_diacritics);
    let total = records.len();
    let correct = records.iter().filter(|r| r.correct).count();
    let accuracy = if total > 0 { correct as f64 / total as f64 } else { 0.0 };

    println!("Questions: {}", total);
    println!("Answers missing/empty: {}", missing);
    println!("Accuracy (all groups satisfied): {:.3} ({}/{})", accuracy, correct, total);

    if let Some(path) = report {
        write_jsonl(path, &records)?;
        println!("Saved report to: {}", path.display());
    }
    Ok(())
}

async fn run_judge(
    config: &Config,
    questions_path: &Path,
    answers_path: &Path,
    output: &Path,
    mode: JudgeMode,
    kind: ProviderKind,
    judge_model: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let items: Vec<QaItem> = match mode {
        JudgeMode::General => load_questions(questions_path)?,
        JudgeMode::Math => load_math_questions(questions_path)?,
        JudgeMode::Unanswerable => load_unanswerable_questions(questions_path)?,
    };

    if mode == JudgeMode::General {
        let without_expected: Vec<&str> = items
            .iter()
            .filter(|q| q.expected_answer.is_none())
            .map(|q| q.id.as_str())
            .collect();
        if !without_expected.is_empty() {
            tracing::warn!("{} questions are missing expected_answer field", without_expected.len());
            tracing::warn!("First few: {:?}", &without_expected[..without_expected.len().min(5)]);
        }
    }

    let records: Vec<AnswerRecord> = load_answer_records(answers_path)?;
    let (expanded, missing) = expand_records(&items, &records);

    let judge_model = judge_model.unwrap_or_else(|| config.judge.model.clone());
    let provider = judge_provider(config, kind, &judge_model)?;
    let judge = judge_client(config, provider.clone(), &judge_model);
    let executor = Executor::new(provider, config.executor_config());

    let judgments = executor.judge_records(mode, &items, &expanded, judge).await;
    write_jsonl(output, &judgments)?;

    let summary_path = output.with_extension("summary.json");
    let summary = RunSummary::from_rows(new_run_id(), mode.as_str(), &judgments)
        .with_paths(questions_path, answers_path)
        .with_config(RunSettingsSnapshot {
            judge_model: Some(judge_model),
            ..Default::default()
        })
        .with_counts(items.len(), missing);
    summary.write_to_file(&summary_path)?;

    print_console_report(&summary);
    println!("Saved judgments: {}", output.display());
    println!("Saved summary: {}", summary_path.display());
    Ok(())
}

fn list_variants() {
    for (title, set) in [("General", GENERAL_VARIANTS), ("Math", MATH_VARIANTS)] {
        println!("{} prompt variants ({}):", title, set.len());
        println!("{:-<60}", "");
        for variant in set {
            println!("  {}", variant.name);
            println!("    system:   {}", variant.system);
            println!("    template: {}", variant.template.replace('\n', "\\n"));
        }
        println!();
    }
    println!("Step-by-step (--math --step-by-step):");
    println!("  {}", MATH_SOLUTION.name);
}

fn init_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    config.save_toml(&output)?;
    println!("Configuration written to: {}", output.display());
    Ok(())
}
