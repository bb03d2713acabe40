//! graphbot CLI: Terminal chat client for the GraphBot graph service

use clap::{Parser, Subcommand};
use graphbot_engine::{
    image_url, ChatBackend, CompletionStatus, Config, Conversation, DisplayRecord, HttpBackend,
    RecordKind, CONFIG_FILE, GRAPHBOT_DIR,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Log file name inside the `.graphbot/` directory.
const LOG_FILE: &str = "graphbot.log";

/// Environment variable that overrides the configured log filter.
const LOG_ENV: &str = "GRAPHBOT_LOG";

/// Chat with GraphBot from the terminal
#[derive(Parser)]
#[command(name = "graphbot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Origin of the response service (overrides the config file)
    #[arg(long, global = true, env = "GRAPHBOT_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Path to the config file (default: .graphbot/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat TUI (default when no command specified)
    Tui,

    /// Send one query and print the reply
    Ask {
        /// The query to send
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default config to .graphbot/config.json
    Init,
}

fn main() {
    let cli = Cli::parse();

    if let Some(Commands::Init) = cli.command {
        cmd_init(&config_path(cli.config.as_deref()));
        return;
    }

    let config = match load_config(cli.config.as_deref(), cli.api_base_url) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    init_logging(&config);

    let backend = match HttpBackend::new(&config) {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        None | Some(Commands::Tui) => {
            let backend: Arc<dyn ChatBackend> = Arc::new(backend);
            if let Err(e) = rt.block_on(graphbot_tui::run_tui(&config, backend)) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Ask { query, json }) => {
            let code = rt.block_on(cmd_ask(&config, &backend, &query, json));
            if code != 0 {
                std::process::exit(code);
            }
        }
        Some(Commands::Init) => {}
    }
}

fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(
        || Path::new(GRAPHBOT_DIR).join(CONFIG_FILE),
        Path::to_path_buf,
    )
}

/// Resolve the config: defaults, then the file, then the flag/env override.
fn load_config(
    explicit: Option<&Path>,
    api_base_url: Option<String>,
) -> Result<Config, graphbot_engine::ConfigError> {
    let config = Config::load_or_default(&config_path(explicit))?.with_api_base_url(api_base_url);
    config.validate()?;
    Ok(config)
}

/// Send tracing output to `.graphbot/graphbot.log` so it never mixes with the UI.
fn init_logging(config: &Config) {
    use tracing_subscriber::EnvFilter;

    let log_dir = Path::new(GRAPHBOT_DIR);
    if std::fs::create_dir_all(log_dir).is_err() {
        return;
    }
    let Ok(log_file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LOG_FILE))
    else {
        return;
    };

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .init();
}

/// Run one turn and print the records it produced. Returns the exit code.
async fn cmd_ask(config: &Config, backend: &dyn ChatBackend, query: &str, json: bool) -> i32 {
    let mut conversation = Conversation::new(config.stale_responses);
    let Some(completion) = conversation.submit(backend, query).await else {
        eprintln!("Nothing to send: the query is empty");
        return 2;
    };

    let replies = reply_records(&conversation);
    if json {
        let records: Vec<serde_json::Value> = replies
            .iter()
            .map(|record| record_json(record, &config.api_base_url))
            .collect();
        let output = serde_json::json!({
            "records": records,
            "ignored_parts": completion.ignored_parts,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Failed to serialize output: {e}");
                return 1;
            }
        }
    } else {
        for record in replies {
            println!("{}", format_record(record, &config.api_base_url));
        }
        for tag in &completion.ignored_parts {
            eprintln!("Skipped unsupported reply part: {tag}");
        }
    }

    exit_code(completion.status)
}

/// Records produced by the server for the single turn: everything after the query.
fn reply_records(conversation: &Conversation) -> &[DisplayRecord] {
    conversation.records().get(1..).unwrap_or_default()
}

fn exit_code(status: CompletionStatus) -> i32 {
    match status {
        CompletionStatus::Answered => 0,
        _ => 1,
    }
}

/// Plain-text rendering of a record: markdown as-is, images as their URL.
fn format_record(record: &DisplayRecord, api_base_url: &str) -> String {
    match record.kind() {
        RecordKind::BotImage => {
            let id = record.image_id().unwrap_or_default();
            format!("[graph] {}", image_url(api_base_url, id))
        }
        RecordKind::Error => format!("Error: {}", record.text().unwrap_or_default()),
        RecordKind::User | RecordKind::BotText => record.text().unwrap_or_default().to_string(),
    }
}

fn record_json(record: &DisplayRecord, api_base_url: &str) -> serde_json::Value {
    let mut value = serde_json::json!({
        "kind": record.kind(),
        "label": record.kind().label(),
    });
    if let Some(text) = record.text() {
        value["text"] = text.into();
    }
    if let Some(id) = record.image_id() {
        value["image_id"] = id.into();
        value["image_url"] = image_url(api_base_url, id).into();
    }
    value
}

fn cmd_init(config_path: &Path) {
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return;
    }

    match Config::default().save(config_path) {
        Ok(()) => println!("Created {}", config_path.display()),
        Err(e) => {
            eprintln!("Failed to write config: {e}");
            std::process::exit(1);
        }
    }
    println!("Edit api_base_url there, or set GRAPHBOT_API_BASE_URL");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_command_defaults_to_tui() {
        let cli = Cli::try_parse_from(["graphbot"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_ask_with_override() {
        let cli = Cli::try_parse_from([
            "graphbot",
            "ask",
            "bar chart of sales",
            "--json",
            "--api-base-url",
            "http://graphs.internal:8080",
        ])
        .unwrap();
        assert_eq!(
            cli.api_base_url.as_deref(),
            Some("http://graphs.internal:8080")
        );
        match cli.command {
            Some(Commands::Ask { query, json }) => {
                assert_eq!(query, "bar chart of sales");
                assert!(json);
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_config_path_default() {
        assert_eq!(config_path(None), Path::new(".graphbot").join("config.json"));
        assert_eq!(
            config_path(Some(Path::new("/tmp/gb.json"))),
            PathBuf::from("/tmp/gb.json")
        );
    }

    #[test]
    fn test_load_config_rejects_bad_override() {
        let missing = Path::new("/nonexistent/graphbot/config.json");
        assert!(load_config(Some(missing), Some("not a url".into())).is_err());

        let config = load_config(Some(missing), Some("https://graphs.example.com".into())).unwrap();
        assert_eq!(config.api_base_url, "https://graphs.example.com");
    }

    #[test]
    fn test_format_record() {
        let base = "http://localhost:5001/";
        assert_eq!(
            format_record(&DisplayRecord::bot_text(1, "**Done**"), base),
            "**Done**"
        );
        assert_eq!(
            format_record(&DisplayRecord::bot_image(2, "abc"), base),
            "[graph] http://localhost:5001/generated_graphs/abc.png"
        );
        assert_eq!(
            format_record(&DisplayRecord::error(3, "boom"), base),
            "Error: boom"
        );
    }

    #[test]
    fn test_record_json_includes_image_url() {
        let value = record_json(&DisplayRecord::bot_image(2, "abc"), "http://localhost:5001");
        assert_eq!(value["kind"], "bot-image");
        assert_eq!(value["label"], "GraphBot");
        assert_eq!(
            value["image_url"],
            "http://localhost:5001/generated_graphs/abc.png"
        );
        assert!(value.get("text").is_none());
    }

    #[test]
    fn test_reply_records_exclude_the_query() {
        let mut conversation = Conversation::new(graphbot_engine::StaleResponsePolicy::Discard);
        assert!(reply_records(&conversation).is_empty());

        let pending = conversation.begin_submit("bar chart").unwrap();
        conversation.complete(
            pending.token,
            Ok(graphbot_engine::GenerateResponse::ok(vec![
                graphbot_engine::MessagePart::text("Here"),
                graphbot_engine::MessagePart::graph("g1"),
            ])),
        );

        let kinds: Vec<_> = reply_records(&conversation)
            .iter()
            .map(DisplayRecord::kind)
            .collect();
        assert_eq!(kinds, vec![RecordKind::BotText, RecordKind::BotImage]);
    }

    #[test]
    fn test_exit_code() {
        assert_eq!(exit_code(CompletionStatus::Answered), 0);
        assert_eq!(exit_code(CompletionStatus::Rejected), 1);
        assert_eq!(exit_code(CompletionStatus::TransportFailed), 1);
    }
}
