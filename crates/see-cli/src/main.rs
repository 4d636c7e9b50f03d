//! S.EE CLI - short URLs, text sharing and file hosting

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use see_core::actions::{
    ActionOutcome, connection, file, format as link_format, history, lifecycle, settings,
    short_url, text,
};
use see_core::config::{Config, Environment};
use see_core::context::{HttpClientFactory, SeeContext};
use see_core::domain::domains::DomainKind;
use see_core::domain::history::HistoryKind;
use see_core::storage::{FileOptionStore, FileTransientStore};

#[derive(Parser)]
#[command(name = "see")]
#[command(author, version, about = "S.EE short URLs, text sharing and file hosting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Available domains
    Domains {
        #[command(subcommand)]
        action: DomainsAction,
    },

    /// Check that a key can reach the API
    Connection {
        #[command(subcommand)]
        action: ConnectionAction,
    },

    /// Short URLs
    Short {
        #[command(subcommand)]
        action: ShortAction,
    },

    /// Text shares
    Text {
        #[command(subcommand)]
        action: TextAction,
    },

    /// Hosted files
    File {
        #[command(subcommand)]
        action: FileAction,
    },

    /// Text and file share history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Print a link as URL, HTML, Markdown or BBCode
    Link {
        url: String,
        /// Alt text for image formats
        #[arg(short, long, default_value = "")]
        name: String,
        /// url, html, markdown or bbcode; all when omitted
        #[arg(long = "as")]
        link_format: Option<String>,
    },

    /// Clear cached domain lists
    Deactivate,

    /// Remove all stored settings, history and caches
    Uninstall {
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Store a new API key
    Set { api_key: String },
    /// Remove the stored API key
    Clear,
    /// Show whether a key is configured
    Show,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show current settings
    Show,
    /// Change settings; omitted options stay as they are
    Set {
        #[arg(long)]
        base_url: Option<String>,
        #[arg(long)]
        default_domain: Option<String>,
        #[arg(long)]
        default_file_domain: Option<String>,
        #[arg(long)]
        default_text_domain: Option<String>,
        #[arg(long)]
        auto_shorten: Option<bool>,
        #[arg(long)]
        auto_upload: Option<bool>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a config value
    Get { key: String },
    /// Set a config value
    Set { key: String, value: String },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
    /// Show config file path
    Path,
}

#[derive(Subcommand)]
enum DomainsAction {
    /// List domains of one kind (short_url, file or text)
    List {
        #[arg(default_value = "short_url")]
        kind: String,
        /// Bypass the cache
        #[arg(long)]
        refresh: bool,
    },
    /// Re-fetch all domain lists
    Refresh,
}

#[derive(Subcommand)]
enum ConnectionAction {
    /// Test a key without saving it; the stored key when omitted
    Test {
        #[arg(long)]
        key: Option<String>,
        #[arg(long)]
        base_url: Option<String>,
    },
}

#[derive(Subcommand)]
enum ShortAction {
    /// Shorten a URL
    Create {
        target_url: String,
        #[arg(short, long)]
        domain: Option<String>,
        #[arg(short, long)]
        slug: Option<String>,
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Delete a short URL
    Delete { domain: String, slug: String },
}

#[derive(Subcommand)]
enum TextAction {
    /// Share text given inline, from a file, or from stdin
    Share {
        content: Option<String>,
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(short, long)]
        title: Option<String>,
        /// plain_text, markdown or source_code
        #[arg(long = "type")]
        text_type: Option<String>,
    },
    /// Delete a text share
    Delete { domain: String, slug: String },
}

#[derive(Subcommand)]
enum FileAction {
    /// Upload a file
    Upload {
        path: PathBuf,
        /// Name to upload under
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Delete a file by delete key or delete URL
    Delete { delete_key: String },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List history entries (text or file)
    List { kind: String },
    /// Remove a history entry
    Remove { kind: String, id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load()?;
    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("see={}", level).parse()?),
        )
        .init();

    let out = Output {
        format: cli.format,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Config { action } => cmd_config(action, out.quiet),
        Commands::Link {
            url,
            name,
            link_format,
        } => cmd_link(&url, &name, link_format.as_deref()),
        command => {
            let ctx = build_context(config)?;
            run(&ctx, command, out).await
        }
    }
}

/// Context backed by the data directory and the process environment
fn build_context(config: Config) -> anyhow::Result<SeeContext> {
    let data_dir = Config::data_dir()?;
    debug!(data_dir = %data_dir.display(), "Using data directory");

    Ok(SeeContext::builder()
        .options(Arc::new(FileOptionStore::in_dir(&data_dir)))
        .transients(Arc::new(FileTransientStore::in_dir(&data_dir)))
        .environment(Environment::from_env())
        .client_factory(Arc::new(HttpClientFactory::new(config.api.timeout_secs)))
        .config(config)
        .build())
}

async fn run(ctx: &SeeContext, command: Commands, out: Output) -> anyhow::Result<()> {
    match command {
        Commands::Key { action } => cmd_key(ctx, action, out).await,
        Commands::Settings { action } => cmd_settings(ctx, action, out).await,
        Commands::Domains { action } => cmd_domains(ctx, action, out).await,
        Commands::Connection {
            action: ConnectionAction::Test { key, base_url },
        } => {
            let outcome =
                connection::test_connection(ctx, key.as_deref(), base_url.as_deref()).await;
            out.report(outcome, |refresh| {
                for kind in DomainKind::ALL {
                    println!("  {}: {}", kind, refresh.domains(kind).join(", "));
                }
            })
        }
        Commands::Short { action } => cmd_short(ctx, action, out).await,
        Commands::Text { action } => cmd_text(ctx, action, out).await,
        Commands::File { action } => cmd_file(ctx, action, out).await,
        Commands::History { action } => cmd_history(ctx, action, out).await,
        Commands::Deactivate => out.report(lifecycle::deactivate(ctx).await, |_| {}),
        Commands::Uninstall { force } => {
            if !force {
                bail!("This removes the API key, settings and history. Re-run with --force.");
            }
            out.report(lifecycle::uninstall(ctx).await, |_| {})
        }
        Commands::Config { .. } | Commands::Link { .. } => Ok(()),
    }
}

/// Prints outcomes in the selected format
#[derive(Clone, Copy)]
struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    /// Print an outcome; a failure becomes the command's error
    fn report<T: Serialize>(
        &self,
        outcome: ActionOutcome<T>,
        render: impl FnOnce(&T),
    ) -> anyhow::Result<()> {
        if self.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }

        match outcome {
            ActionOutcome::Success { message, data } => {
                if self.format == OutputFormat::Text {
                    if !self.quiet {
                        println!("{}", message);
                    }
                    render(&data);
                }
                Ok(())
            }
            ActionOutcome::Failure { code, message } => bail!("[{}] {}", code, message),
        }
    }

    fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}

async fn cmd_key(ctx: &SeeContext, action: KeyAction, out: Output) -> anyhow::Result<()> {
    match action {
        KeyAction::Set { api_key } => out.report(settings::save_api_key(ctx, &api_key).await, |_| {}),
        KeyAction::Clear => out.report(settings::save_api_key(ctx, "").await, |_| {}),
        KeyAction::Show => {
            let secrets = ctx.secrets();
            let key = secrets.get_key().await;
            if out.json() {
                let value = serde_json::json!({
                    "configured": !key.is_empty(),
                    "redacted": (!key.is_empty()).then(|| key.redacted()),
                    "from_environment": secrets.is_overridden(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else if key.is_empty() {
                println!("No API key configured.");
                println!("\nSet one with: see key set <api-key>");
            } else {
                let source = if secrets.is_overridden() {
                    "environment"
                } else {
                    "stored"
                };
                println!("API key: {} ({})", key.redacted(), source);
            }
            Ok(())
        }
    }
}

async fn cmd_settings(ctx: &SeeContext, action: SettingsAction, out: Output) -> anyhow::Result<()> {
    let update = match action {
        SettingsAction::Show => {
            let snapshot = ctx.settings().snapshot().await;
            if out.json() {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_snapshot(&snapshot);
            }
            return Ok(());
        }
        SettingsAction::Set {
            base_url,
            default_domain,
            default_file_domain,
            default_text_domain,
            auto_shorten,
            auto_upload,
        } => settings::SettingsUpdate {
            api_key: None,
            api_base_url: base_url,
            default_domain,
            default_file_domain,
            default_text_domain,
            auto_shorten,
            auto_upload,
        },
    };

    out.report(settings::save_settings(ctx, &update).await, print_snapshot)
}

fn print_snapshot(snapshot: &see_core::settings::SettingsSnapshot) {
    let or_none = |v: &Option<String>| v.clone().unwrap_or_else(|| "(none)".to_string());
    let pinned = if snapshot.api_base_url_overridden {
        " (environment)"
    } else {
        ""
    };
    println!("api_base_url = {}{}", snapshot.api_base_url, pinned);
    println!("default_domain = {}", or_none(&snapshot.default_domain));
    println!("default_file_domain = {}", or_none(&snapshot.default_file_domain));
    println!("default_text_domain = {}", or_none(&snapshot.default_text_domain));
    println!("auto_shorten = {}", snapshot.auto_shorten);
    println!("auto_upload = {}", snapshot.auto_upload);
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path()?.display());
        }
    }
    Ok(())
}

async fn cmd_domains(ctx: &SeeContext, action: DomainsAction, out: Output) -> anyhow::Result<()> {
    match action {
        DomainsAction::List { kind, refresh } => {
            let kind: DomainKind = kind.parse()?;
            let domains = ctx.get_domains(kind, refresh).await;
            if out.json() {
                println!("{}", serde_json::to_string_pretty(&domains)?);
            } else if domains.is_empty() {
                if !out.quiet {
                    println!("No {} domains available.", kind);
                    println!("\nCheck your key with: see connection test");
                }
            } else {
                for domain in domains {
                    println!("{}", domain);
                }
            }
            Ok(())
        }
        DomainsAction::Refresh => {
            out.report(connection::refresh_domains(ctx).await, |refresh| {
                for kind in DomainKind::ALL {
                    println!("  {}: {}", kind, refresh.domains(kind).join(", "));
                }
                for (kind, error) in &refresh.failures {
                    println!("  {} failed: {}", kind, error);
                }
            })
        }
    }
}

async fn cmd_short(ctx: &SeeContext, action: ShortAction, out: Output) -> anyhow::Result<()> {
    match action {
        ShortAction::Create {
            target_url,
            domain,
            slug,
            title,
        } => {
            let request = short_url::CreateShortUrl {
                domain,
                custom_slug: slug,
                title,
                ..short_url::CreateShortUrl::new(target_url)
            };
            out.report(short_url::create_short_url(ctx, &request).await, |created| {
                println!("{}", created.short_url);
            })
        }
        ShortAction::Delete { domain, slug } => {
            out.report(short_url::delete_short_url(ctx, &domain, &slug).await, |_| {})
        }
    }
}

async fn cmd_text(ctx: &SeeContext, action: TextAction, out: Output) -> anyhow::Result<()> {
    match action {
        TextAction::Share {
            content,
            file,
            title,
            text_type,
        } => {
            let content = match (content, file) {
                (Some(content), _) => content,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let request = text::ShareText {
                title,
                text_type,
                ..text::ShareText::new(content)
            };
            out.report(text::share_text(ctx, &request).await, |shared| {
                println!("{}", shared.text_url);
            })
        }
        TextAction::Delete { domain, slug } => {
            out.report(text::delete_text(ctx, &domain, &slug).await, |_| {})
        }
    }
}

async fn cmd_file(ctx: &SeeContext, action: FileAction, out: Output) -> anyhow::Result<()> {
    match action {
        FileAction::Upload { path, name } => {
            let request = file::UploadFile {
                filename: name,
                ..file::UploadFile::new(path)
            };
            out.report(file::upload_file(ctx, &request).await, |uploaded| {
                println!("{}", uploaded.file_url);
                if !uploaded.delete_key.is_empty() {
                    println!("Delete key: {}", uploaded.delete_key);
                }
            })
        }
        FileAction::Delete { delete_key } => {
            out.report(file::delete_file(ctx, &delete_key).await, |_| {})
        }
    }
}

async fn cmd_history(ctx: &SeeContext, action: HistoryAction, out: Output) -> anyhow::Result<()> {
    match action {
        HistoryAction::List { kind } => {
            let kind: HistoryKind = kind.parse()?;
            out.report(history::list_history(ctx, kind).await, |entries| {
                if entries.is_empty() {
                    println!("No {} history.", kind);
                }
                for entry in entries {
                    println!(
                        "  {} - {} ({}) {}",
                        entry.id,
                        entry.label(),
                        entry.created_at.format("%Y-%m-%d %H:%M"),
                        entry.url
                    );
                }
            })
        }
        HistoryAction::Remove { kind, id } => {
            let kind: HistoryKind = kind.parse()?;
            out.report(history::remove_history_entry(ctx, kind, &id).await, |removed| {
                if !removed {
                    println!("No entry with id {}.", id);
                }
            })
        }
    }
}

fn cmd_link(url: &str, name: &str, format: Option<&str>) -> anyhow::Result<()> {
    match format {
        Some(format) => {
            let format: link_format::LinkFormat = format.parse()?;
            println!("{}", link_format::format_link(url, name, format));
        }
        None => {
            for format in link_format::LinkFormat::ALL {
                println!(
                    "{:>8}: {}",
                    format.as_str(),
                    link_format::format_link(url, name, format)
                );
            }
        }
    }
    Ok(())
}
