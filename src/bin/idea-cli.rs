use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use idea_studio::client::StudioClient;
use idea_studio::codec::{IdeaCodec, JsonCodec, MsgPackCodec};
use idea_studio::config::LlmArgs;
use idea_studio::history::{HistoryStore, JsonFileHistory, SavedIdea, DEFAULT_HISTORY_PATH};
use idea_studio::idea::{Genre, IdeaRequest, IdeaResult, Tone};
use idea_studio::logging::init_tracing;
use idea_studio::pipeline::IdeaPipeline;
use idea_studio::render::{render_history_line, render_text};
use idea_studio::server::GenerateRequest;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "idea-cli")]
#[command(about = "Generate game concepts from the terminal")]
struct Cli {
    /// Saved-ideas file
    #[arg(long, global = true, env = "IDEA_STUDIO_HISTORY", default_value = DEFAULT_HISTORY_PATH)]
    history: PathBuf,

    /// More log output (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate an idea
    Generate {
        /// The game idea, at least a few words
        idea: String,

        /// Genre (blank for any)
        #[arg(short, long, default_value = "")]
        genre: String,

        /// Tone (blank for any)
        #[arg(short, long, default_value = "")]
        tone: String,

        /// Keep the result in the history (the server's, with --server)
        #[arg(long)]
        save: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Use a running idea-studio server instead of calling the model directly
        #[arg(short, long)]
        server: Option<String>,

        /// Server request timeout in seconds
        #[arg(long, default_value = "90")]
        timeout: u64,

        #[command(flatten)]
        llm: LlmArgs,
    },
    /// Inspect or clear saved ideas
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// List the accepted genres and tones
    Options,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Print saved ideas, newest first
    List {
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Remove every saved idea
    Clear,
    /// Add ideas from a file written by `history list --format json|msgpack`
    Import {
        file: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Msgpack,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let history = JsonFileHistory::new(&cli.history);

    match cli.command {
        Command::Generate {
            idea,
            genre,
            tone,
            save,
            format,
            server,
            timeout,
            llm,
        } => {
            let result = match server {
                Some(url) => {
                    let client = StudioClient::new(url, Duration::from_secs(timeout))?;
                    let result = client
                        .generate(&GenerateRequest {
                            prompt: idea,
                            genre,
                            tone,
                        })
                        .await?;
                    // the server owns its history
                    if save {
                        let saved = client.save(&result).await?;
                        eprintln!("Saved on server as {}", saved.id);
                    }
                    print_idea(&result, format)?;
                    return Ok(());
                }
                None => {
                    let request = IdeaRequest::from_selectors(&idea, &genre, &tone)
                        .map_err(|e| anyhow!(e.user_message()))?;
                    let pipeline = IdeaPipeline::from_config(&llm.into_config()?)?;
                    pipeline.generate(&request).await.map_err(|e| match e.raw_text() {
                        Some(raw) => anyhow!("{}\nraw reply:\n{raw}", e.user_message()),
                        None => anyhow!("{} ({e})", e.user_message()),
                    })?
                }
            };

            if save {
                let saved = history.save(result.clone())?;
                eprintln!("Saved as {}", saved.id);
            }
            print_idea(&result, format)?;
        }
        Command::History { action } => match action {
            HistoryAction::List { format } => {
                let saved = history.load()?;
                match format {
                    Format::Text => {
                        if saved.is_empty() {
                            println!("No saved ideas yet.");
                        }
                        for item in &saved {
                            println!("{}", render_history_line(item));
                        }
                    }
                    Format::Json => write_bytes(&JsonCodec.encode(&saved)?)?,
                    Format::Msgpack => write_bytes(&MsgPackCodec.encode(&saved)?)?,
                }
            }
            HistoryAction::Clear => {
                history.clear()?;
                eprintln!("History cleared.");
            }
            HistoryAction::Import { file, format } => {
                let bytes = std::fs::read(&file)
                    .map_err(|e| anyhow!("Failed to read {}: {e}", file.display()))?;
                let items: Vec<SavedIdea> = match format {
                    Format::Json => JsonCodec.decode(&bytes)?,
                    Format::Msgpack => MsgPackCodec.decode(&bytes)?,
                    Format::Text => return Err(anyhow!("Text output cannot be imported; use json or msgpack")),
                };
                let total = items.len();
                let added = history.import(items)?;
                eprintln!("Imported {added} of {total} ideas ({} already saved).", total - added);
            }
        },
        Command::Options => {
            let genres: Vec<String> = Genre::choices().map(|g| g.to_string()).collect();
            let tones: Vec<String> = Tone::choices().map(|t| t.to_string()).collect();
            println!("Genres: {}", genres.join(", "));
            println!("Tones:  {}", tones.join(", "));
        }
    }

    Ok(())
}

fn print_idea(idea: &IdeaResult, format: Format) -> Result<()> {
    match format {
        Format::Text => {
            print!("{}", render_text(idea));
            Ok(())
        }
        Format::Json => write_bytes(&JsonCodec.encode(idea)?),
        Format::Msgpack => write_bytes(&MsgPackCodec.encode(idea)?),
    }
}

fn write_bytes(bytes: &[u8]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(bytes)
        .map_err(|e| anyhow!("Failed to write output: {e}"))?;
    stdout.flush()?;
    Ok(())
}
