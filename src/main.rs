use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

use halpi::adapters::ai::{ThreadApiClient, ThreadApiConfig};
use halpi::application::{InteractionContent, InteractionRequest, InteractionService};
use halpi::config::AppConfig;
use halpi::domain::foundation::InteractionType;

/// Reads student content from stdin, runs one interaction and prints the
/// result as JSON. Stdin holding a JSON object is sent as structured content.
#[derive(Parser)]
#[command(name = "halpi", about = "Run one AI-graded interaction")]
#[command(version)]
struct Cli {
    /// Interaction type, e.g. concept_restitution or quiz-evaluation
    interaction_type: InteractionType,

    /// Organization id (defaults to HALPI__AI__ORGANIZATION_ID)
    organization_id: Option<String>,

    /// Agent id overriding the configured binding
    agent_id: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Pretty-print the result
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    let api_key = config
        .ai
        .api_key
        .clone()
        .context("HALPI__AI__API_KEY is required")?;
    let client = ThreadApiClient::new(
        ThreadApiConfig::new(secrecy::ExposeSecret::expose_secret(&api_key).clone())
            .with_base_url(config.ai.base_url.clone())
            .with_timeout(config.ai.timeout())
            .with_organization_header(config.ai.organization_header.clone()),
    )?;

    let mut service = InteractionService::new(Arc::new(client), config.agent_bindings()?);
    if let Some(org) = &config.ai.organization_id {
        service = service.with_default_organization(org.clone());
    }

    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("failed to read content from stdin")?;
    let content = match serde_json::from_str::<serde_json::Value>(&input) {
        Ok(value) if value.is_object() => InteractionContent::Structured(value),
        _ => InteractionContent::Text(input.trim_end().to_string()),
    };

    let mut request = InteractionRequest::new(
        cli.organization_id.unwrap_or_default(),
        content,
        cli.interaction_type,
    );
    if let Some(agent) = cli.agent_id {
        request = request.with_agent(agent);
    }
    if let Some(secs) = cli.timeout {
        request = request.with_timeout(Duration::from_secs(secs));
    }

    let result = service.execute(request).await?;
    let output = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", output);
    Ok(())
}

/// `RUST_LOG` filters (default `halpi=info`); `HALPI_LOG_FORMAT=json` emits JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("halpi=info"));
    let json = std::env::var("HALPI_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
