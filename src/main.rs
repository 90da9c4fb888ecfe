use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use bedrock_adapter::domain::{
    DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TOP_P, GenerationParams, LlmError,
    SchemaHint, SchemaValidation,
};
use bedrock_adapter::infra::llm::{BedrockConfig, BedrockLanguageModel, LanguageModel};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

// sysexits EX_TEMPFAIL: the same input may succeed on a later run.
const EXIT_TEMPORARY_FAILURE: u8 = 75;

/// Runs each stdin line as a prompt against a Bedrock model and prints one
/// output per line.
#[derive(Debug, Parser)]
#[command(name = "bedrock-infer", version)]
struct Cli {
    /// Model identifier, e.g. `bedrock:anthropic.claude-3-5-sonnet-20240620-v1:0`.
    model_id: String,

    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    #[arg(long, env = "AWS_PROFILE")]
    profile: Option<String>,

    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f64,

    #[arg(long, default_value_t = DEFAULT_MAX_OUTPUT_TOKENS)]
    max_output_tokens: u32,

    #[arg(long, default_value_t = DEFAULT_TOP_P)]
    top_p: f64,

    /// JSON file holding the schema hint.
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Ask for JSON-only output and validate it against `--schema`.
    #[arg(long)]
    structured: bool,

    /// Also require output to satisfy the schema hint as a JSON Schema.
    #[arg(long, requires = "schema")]
    conform: bool,
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let (message, code) = describe_failure(&err);
            eprintln!("bedrock-infer: {message}");
            ExitCode::from(code)
        }
    }
}

/// Adapter failures are reported with their user-facing wording; retryable
/// ones exit with `EX_TEMPFAIL`.
fn describe_failure(err: &anyhow::Error) -> (String, u8) {
    let Some(llm_error) = err.downcast_ref::<LlmError>() else {
        return (format!("{err:#}"), 1);
    };

    error!(
        category = ?llm_error.category(),
        retryable = llm_error.is_retryable(),
        error = %llm_error,
        "inference failed"
    );
    let message = if err.chain().count() > 1 {
        format!("{err}: {}", llm_error.user_message())
    } else {
        llm_error.user_message()
    };
    let code = if llm_error.is_retryable() {
        EXIT_TEMPORARY_FAILURE
    } else {
        1
    };
    (message, code)
}

fn run(cli: Cli) -> Result<()> {
    let model = BedrockLanguageModel::new(build_config(&cli)?)
        .with_context(|| format!("failed to set up model '{}'", cli.model_id))?;

    let prompts = io::stdin()
        .lock()
        .lines()
        .collect::<io::Result<Vec<_>>>()
        .context("failed to read prompts from stdin")?;

    let mut stdout = io::stdout().lock();
    for (index, result) in model.infer(&prompts).enumerate() {
        let outputs = result.with_context(|| format!("prompt {} failed", index + 1))?;
        for scored in outputs {
            writeln!(stdout, "{}", scored.output).context("failed to write output")?;
        }
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<BedrockConfig> {
    let mut config = BedrockConfig::from_env(cli.model_id.as_str())?
        .with_params(GenerationParams {
            temperature: cli.temperature,
            max_output_tokens: cli.max_output_tokens,
            top_p: cli.top_p,
        })
        .with_structured_output(cli.structured);

    if let Some(region) = &cli.region {
        config = config.with_region(region.as_str());
    }
    if let Some(profile) = &cli.profile {
        config = config.with_profile(profile.as_str());
    }
    if let Some(path) = &cli.schema {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read schema hint {}", path.display()))?;
        let schema = serde_json::from_str(&raw)
            .with_context(|| format!("schema hint {} is not JSON", path.display()))?;
        let validation = if cli.conform {
            SchemaValidation::Conformance
        } else {
            SchemaValidation::JsonOnly
        };
        config = config.with_schema_hint(SchemaHint::new(schema).with_validation(validation));
    }
    Ok(config)
}
