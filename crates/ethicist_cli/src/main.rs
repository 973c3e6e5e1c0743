use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ethicist_core::config::{LogFormat, LogLevel, LoggingConfig};
use ethicist_core::EthicistConfig;
use ethicist_mcp::McpServer;
use ethicist_reasoning::{create_client, CompletionParams, ToolDispatcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ethicist", author, version, about = "MCP server for LLM-backed ethical analysis", long_about = None)]
struct Args {
    /// Path to the TOML config file (missing file means defaults)
    #[arg(short, long, default_value = "ethicist.toml", global = true)]
    config: PathBuf,

    /// Completion provider: anthropic, openai or mock
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG wins if set
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve MCP over stdin/stdout (default)
    Stdio,
    /// Serve MCP over HTTP with server-sent events
    Http {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// List tools, resources and prompts
    List,
    /// Invoke one tool and print its text blocks
    Call {
        /// Tool name
        tool: String,
        /// Arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
        /// Print the system instruction and prompt without contacting the provider
        #[arg(long)]
        dry_run: bool,
    },
    /// Print a knowledge resource
    Resource {
        /// e.g. ethicist://frameworks/utilitarian
        uri: String,
    },
    /// Render a prompt template
    Prompt {
        name: String,
        /// Template variable, repeatable
        #[arg(long = "arg", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        args: Vec<(String, String)>,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let (config, from_file) = load_config(&args)?;
    init_logging(&config.logging);
    if !from_file {
        tracing::info!("Config file {} not found, using defaults", args.config.display());
    }

    match args.command.unwrap_or(Command::Stdio) {
        Command::Stdio => {
            let server = build_server(&config)?;
            ethicist_mcp::run_stdio(server).await?;
        }
        Command::Http { host, port } => {
            let server = build_server(&config)?;
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            serve_http(server, &host, port).await?;
        }
        Command::List => print_catalog(&build_server(&config)?),
        Command::Call {
            tool,
            args,
            dry_run,
        } => {
            let server = build_server(&config)?;
            let arguments: serde_json::Value =
                serde_json::from_str(&args).context("--args must be valid JSON")?;
            if dry_run {
                let prepared = server.dispatcher().prepare(&tool, &arguments)?;
                println!("## System\n\n{}\n\n## Prompt\n\n{}", prepared.system, prepared.prompt);
                if let Some(reference) = prepared.reference {
                    println!("\n## Reference\n\n{}", reference);
                }
            } else {
                let result = server.dispatcher().call_tool(&tool, &arguments).await?;
                println!("{}", result.joined_text());
            }
        }
        Command::Resource { uri } => {
            let server = build_server(&config)?;
            println!("{}", server.knowledge().get_resource(&uri)?);
        }
        Command::Prompt { name, args } => {
            let server = build_server(&config)?;
            let vars: HashMap<String, String> = args.into_iter().collect();
            let rendered = server.prompts().get_prompt(&name, &vars)?;
            println!("{}", rendered.text);
        }
    }
    Ok(())
}

/// File, then environment, then command-line flags. The flag reports whether
/// the file was found.
fn load_config(args: &Args) -> Result<(EthicistConfig, bool)> {
    let from_file = Path::new(&args.config).exists();
    let mut config = if from_file {
        EthicistConfig::load(&args.config)?
    } else {
        EthicistConfig::default()
    };

    if let Some(level) = &args.log_level {
        if LogLevel::parse(level).is_none() {
            bail!("Invalid log level '{}'", level);
        }
    }

    // Re-resolve with flags on top so the credential follows a --provider switch
    config.apply_overrides(|key| {
        let flag = match key {
            "ETHICIST_PROVIDER" => args.provider.clone(),
            "ETHICIST_MODEL" => args.model.clone(),
            "ETHICIST_LOG_LEVEL" => args.log_level.clone(),
            _ => None,
        };
        flag.or_else(|| std::env::var(key).ok())
    });
    Ok((config, from_file))
}

fn init_logging(logging: &LoggingConfig) {
    // stdout carries the stdio protocol, so logs always go to stderr
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

fn build_server(config: &EthicistConfig) -> Result<McpServer> {
    let client = create_client(&config.llm)?;
    if config.llm.provider != "mock" && config.llm.api_key.is_none() {
        tracing::warn!(
            "No API key configured; tool calls will fail until {} or ETHICIST_API_KEY is set",
            config.llm.credential_env_var()
        );
    }
    let dispatcher = ToolDispatcher::new(client, CompletionParams::from(&config.llm));
    Ok(McpServer::new(dispatcher))
}

#[cfg(feature = "gateway")]
async fn serve_http(server: McpServer, host: &str, port: u16) -> Result<()> {
    tracing::info!("Starting HTTP transport on {}:{}", host, port);
    ethicist_gateway::GatewayServer::new(server, host, port)
        .serve()
        .await
}

#[cfg(not(feature = "gateway"))]
async fn serve_http(_server: McpServer, _host: &str, _port: u16) -> Result<()> {
    bail!("HTTP transport not compiled in (enable the `gateway` feature)")
}

fn print_catalog(server: &McpServer) {
    println!("Tools:");
    for tool in server.dispatcher().list_tools() {
        println!("  {:<30} {}", tool.name, tool.description);
    }
    println!("\nResources:");
    for resource in server.knowledge().list_resources() {
        println!("  {:<38} {}", resource.uri, resource.name);
    }
    println!("\nPrompts:");
    for prompt in server.prompts().list_prompts() {
        let args: Vec<String> = prompt
            .arguments
            .iter()
            .map(|a| {
                if a.required {
                    a.name.to_string()
                } else {
                    format!("[{}]", a.name)
                }
            })
            .collect();
        println!("  {:<30} ({}) {}", prompt.name, args.join(", "), prompt.description);
    }
}
