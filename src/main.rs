use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use text2sql::generator::{GenerationRequest, SqlGenerator};
use text2sql::llm::{LlmClient, ModelConfig};
use text2sql::schema::{ConnectionParams, SchemaInspector, SqlxInspector};
use text2sql::Dialect;

#[derive(Parser)]
#[command(name = "text2sql")]
#[command(about = "Generate a constrained SQL SELECT from a natural-language request")]
struct Args {
    /// The data request in natural language
    query: String,

    /// Database type: mysql, postgresql, oracle, sqlserver
    #[arg(long, default_value = "mysql")]
    db_type: String,

    /// Database host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Database port
    #[arg(long)]
    port: u16,

    /// Database name
    #[arg(long)]
    db_name: String,

    /// Database username
    #[arg(long)]
    username: String,

    /// Database password (or set DB_PASSWORD env var)
    #[arg(long)]
    password: Option<String>,

    /// Model provider label
    #[arg(long, default_value = "openai")]
    provider: String,

    /// Model name
    #[arg(long, default_value = "gpt-4")]
    model: String,

    /// Chat-completions base URL
    #[arg(long)]
    base_url: Option<String>,

    /// API key (or set OPENAI_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let dialect: Dialect = args.db_type.parse()?;

    let password = args
        .password
        .or_else(|| std::env::var("DB_PASSWORD").ok())
        .unwrap_or_default();
    let api_key = args
        .api_key
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .unwrap_or_default();

    let params = ConnectionParams {
        dialect,
        host: args.host,
        port: args.port,
        database: args.db_name,
        username: args.username,
        password,
    };

    let schema = SqlxInspector.fetch_schema(&params).await?;

    let mut model = ModelConfig::new(args.provider, args.model, api_key);
    if let Some(base_url) = args.base_url {
        model.base_url = base_url;
    }

    let request = GenerationRequest {
        dialect,
        user_query: args.query,
        schema,
        model,
    };

    let generator = SqlGenerator::new(LlmClient::new());
    let result = generator.generate(request).await?;

    if result.is_empty() {
        info!("Model reply carried no extractable SQL");
    }
    println!("{}", result.sql);
    Ok(())
}
