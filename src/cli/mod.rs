use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::clients::gemini::GeminiClient;
use crate::clients::ModelClient;
use crate::domain::{GenerationConfig, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::infra::config::Config;

#[derive(Parser)]
#[command(name = "gemini-mcp-gateway")]
#[command(about = "Gemini MCP Gateway - server and admin CLI")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the gateway (HTTP or stdio, per MODE)
    Serve,
    /// Health check the service
    Health {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:8000")]
        url: String,
    },
    /// Validate configuration
    Config {
        /// Validate config without starting service
        #[arg(long)]
        validate: bool,
    },
    /// Show service status and registered tools
    Status {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:8000")]
        url: String,
    },
    /// Send a one-off prompt to the configured model
    Generate {
        /// Prompt text
        #[arg(short, long)]
        prompt: String,
        #[arg(long)]
        temperature: Option<f32>,
        #[arg(long)]
        max_tokens: Option<u32>,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    run_commands(cli.command.unwrap_or(Commands::Serve)).await
}

pub async fn run_commands(command: Commands) -> ExitCode {
    match command {
        Commands::Serve => match crate::infra::boot::run_server().await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "server exited with error");
                ExitCode::FAILURE
            }
        },
        Commands::Health { url } => match health_check(&url).await {
            Ok(_) => {
                println!("✅ Service is healthy");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Health check failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Config { validate } => match validate_config(validate) {
            Ok(_) => {
                println!("✅ Configuration is valid");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Status { url } => match show_status(&url).await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("❌ Status check failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Generate { prompt, temperature, max_tokens } => {
            let gen = GenerationConfig {
                temperature: Some(temperature.unwrap_or(DEFAULT_TEMPERATURE as f32)),
                max_output_tokens: Some(max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)),
            };
            match generate_once(&prompt, &gen).await {
                Ok(text) => {
                    println!("{}", text);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("❌ Generation failed: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

async fn health_check(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/api/ping", url))
        .timeout(std::time::Duration::from_millis(500))
        .send()
        .await?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("HTTP {}", response.status()).into())
    }
}

/// Without `--validate` only the config file and environment are parsed;
/// with it the result is also checked for a usable mode, port and API key.
fn validate_config(strict: bool) -> Result<Config, Box<dyn std::error::Error>> {
    let config = Config::from_env_and_toml()?;
    if strict {
        config.validate()?;
    }
    Ok(config)
}

async fn show_status(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();

    let health_response = client
        .get(format!("{}/api/ping", url))
        .timeout(std::time::Duration::from_secs(5))
        .send()
        .await?;

    println!(
        "🏥 Health Status: {}",
        if health_response.status().is_success() {
            "✅ Healthy"
        } else {
            "❌ Unhealthy"
        }
    );

    let tools_response = client
        .get(format!("{}/api/mcp/tools", url))
        .timeout(std::time::Duration::from_millis(500))
        .send()
        .await;

    match tools_response {
        Ok(resp) if resp.status().is_success() => {
            let names = resp
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| {
                    v["tools"].as_array().map(|tools| {
                        tools
                            .iter()
                            .filter_map(|t| t["name"].as_str().map(str::to_string))
                            .collect::<Vec<_>>()
                    })
                })
                .unwrap_or_default();
            println!("🔧 Tools: ✅ Available ({})", names.join(", "));
        }
        Ok(resp) => {
            println!("🔧 Tools: ❌ HTTP {}", resp.status());
        }
        Err(_) => {
            println!("🔧 Tools: ❌ Unavailable");
        }
    }

    let cfg = Config::from_env();
    println!("\n📋 Configuration:");
    println!("  Mode: {}", cfg.mode);
    println!("  Port: {}", cfg.port);
    println!("  Environment: {}", cfg.environment);
    println!("  Model: {}", cfg.gemini.model);
    println!(
        "  Log Level: {}",
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into())
    );
    println!(
        "  API Key: {}",
        if cfg.gemini.api_key.is_some() { "Configured" } else { "Not configured" }
    );

    Ok(())
}

async fn generate_once(
    prompt: &str,
    gen: &GenerationConfig,
) -> Result<String, Box<dyn std::error::Error>> {
    let cfg = Config::from_env_and_toml()?;
    let client = GeminiClient::from_config(&cfg.gemini)?;
    Ok(client.generate_text(prompt, gen).await?)
}
