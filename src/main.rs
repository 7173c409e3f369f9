//! CLI entry point for `notemime`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};

use notemime::config::{self, Config};
use notemime::export::eml::write_note;
use notemime::parser::eml::read_note;
use notemime::{Attachment, Classification, Note, NoteEncoder, TextFormat};

/// Create and inspect notes stored as MIME messages.
#[derive(Parser)]
#[command(name = "notemime", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a note and write it as an .eml file
    New {
        /// Note title
        #[arg(short, long)]
        title: Option<String>,
        /// Note text (read from stdin if omitted)
        #[arg(long)]
        text: Option<String>,
        /// Treat the text as HTML
        #[arg(long)]
        rich: bool,
        /// Author
        #[arg(long)]
        from: Option<String>,
        /// public, private or confidential
        #[arg(short, long)]
        classification: Option<Classification>,
        /// Attach a reference to a URL (repeatable)
        #[arg(long = "link", value_name = "URL")]
        links: Vec<String>,
        /// Attach a file inline (repeatable)
        #[arg(long = "attach", value_name = "FILE")]
        files: Vec<PathBuf>,
        /// Metadata entry KEY=VALUE (repeatable)
        #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_meta)]
        meta: Vec<(String, String)>,
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the fields of a note file
    Show {
        path: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a note's text with markup removed
    Text { path: PathBuf },
    /// Show format constants and configuration paths
    Info,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::New {
            title,
            text,
            rich,
            from,
            classification,
            links,
            files,
            meta,
            output,
        } => {
            let text = match text {
                Some(text) => text,
                None => std::io::read_to_string(std::io::stdin()).context("reading stdin")?,
            };
            let mut note = Note::new();
            note.set_title(title.unwrap_or_default());
            note.set_text(
                text,
                if rich { TextFormat::Rich } else { TextFormat::Plain },
            );
            note.set_from(from.unwrap_or_else(|| config.note.default_from.clone()));
            note.set_classification(match classification {
                Some(c) => c,
                None => config.classification()?,
            });
            for url in links {
                note.attachments_mut()
                    .push(Attachment::from_url(url, "text/uri-list"));
            }
            for file in files {
                note.attachments_mut().push(file_attachment(&file)?);
            }
            note.custom_mut().extend(meta);

            let dir = output
                .or_else(|| config.output.directory.clone())
                .unwrap_or_else(|| PathBuf::from("."));
            cmd_new(&note, &config, &dir)
        }
        Commands::Show { path, json } => cmd_show(&path, json, &config),
        Commands::Text { path } => cmd_text(&path),
        Commands::Info => cmd_info(&config),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and a log file in the cache directory.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "notemime.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

fn parse_meta(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

fn file_attachment(path: &Path) -> anyhow::Result<Attachment> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let label = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Attachment::from_data(data, "application/octet-stream").with_label(label))
}

fn cmd_new(note: &Note, config: &Config, dir: &Path) -> anyhow::Result<()> {
    let encoder = NoteEncoder::new().with_options(config.encode_options());
    let path = write_note(note, &encoder, dir)?;
    println!("{}", path.display());
    Ok(())
}

fn cmd_show(path: &Path, json: bool, config: &Config) -> anyhow::Result<()> {
    let note = read_note(path)?;

    if json {
        let output = if config.output.pretty_json {
            serde_json::to_string_pretty(&note)?
        } else {
            serde_json::to_string(&note)?
        };
        println!("{output}");
        return Ok(());
    }

    let date = |d: Option<chrono::DateTime<chrono::Utc>>| {
        d.map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    println!();
    println!("  {:<16} {}", "UID:", note.uid());
    println!("  {:<16} {}", "Title:", note.title());
    println!("  {:<16} {}", "From:", note.from());
    println!("  {:<16} {}", "Created:", date(note.creation_date()));
    println!("  {:<16} {}", "Modified:", date(note.last_modified_date()));
    println!("  {:<16} {}", "Classification:", note.classification());
    println!("  {:<16} {}", "Format:", note.text_format().mime_type());

    if !note.attachments().is_empty() {
        println!();
        println!("  Attachments:");
        for (i, att) in note.attachments().iter().enumerate() {
            let what = match (att.url(), att.data()) {
                (Some(url), _) => url.to_string(),
                (None, Some(data)) => format!("{} bytes inline", data.len()),
                (None, None) => String::new(),
            };
            println!("    {:>2}. [{}] {} {}", i + 1, att.mimetype(), att.label(), what);
        }
    }

    if !note.custom().is_empty() {
        println!();
        println!("  Metadata:");
        for (key, value) in note.custom() {
            println!("    {key} = {value}");
        }
    }

    println!();
    println!("{}", note.text());
    Ok(())
}

fn cmd_text(path: &Path) -> anyhow::Result<()> {
    let note = read_note(path)?;
    println!("{}", note.to_plain_text());
    Ok(())
}

fn cmd_info(config: &Config) -> anyhow::Result<()> {
    println!("  {:<16} {}", "MIME type:", notemime::note_mime_type());
    println!("  {:<16} {}", "Icon:", notemime::note_icon_name());
    let config_path = config::config_file_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("  {:<16} {}", "Config file:", config_path);
    println!(
        "  {:<16} {}",
        "Log file:",
        config::log_file_path(config).display()
    );
    Ok(())
}

fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "notemime", &mut std::io::stdout());
    Ok(())
}

fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}
