use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use xenolexia_config::Config;
use xenolexia_core::VocabularyStore;
use xenolexia_core::state::AppState;
use xenolexia_dictionary::DictionaryLoader;
use xenolexia_types::{
    AppEvent, Chapter, LanguagePair, VocabularyFilter, VocabularyItem, VocabularyStatus,
};
use xenolexia_vocabulary::{
    CardTemplate, ExportFormat, ReviewSession, export_vocabulary, review_item, vocabulary_stats,
};

pub mod controller;
pub mod events;
pub mod persistence;
pub mod profile;
pub mod state;
pub mod surface;

#[cfg(test)]
mod tests;

use self::controller::AppController;
use self::persistence::DataDir;
use self::state::Services;
use self::surface::TerminalSurface;

const EVENT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "xenolexia", version)]
#[command(about = "Read in your language while a share of the words switches to the one you are learning")]
struct Cli {
    /// Profile to load from the data directory
    #[arg(long, global = true, default_value = "main")]
    profile: String,

    /// Data directory (profiles and snapshots)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process a chapter file (.json chapter, or plain text/HTML) and print it
    Read {
        file: PathBuf,

        /// Print the content payload as JSON
        #[arg(long)]
        json: bool,

        #[arg(long)]
        title: Option<String>,

        /// Save the word behind marker N to the vocabulary (repeatable)
        #[arg(long = "save")]
        save: Vec<usize>,
    },
    Dictionary {
        #[command(subcommand)]
        command: DictionaryCommand,
    },
    Vocab {
        #[command(subcommand)]
        command: VocabCommand,
    },
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
}

#[derive(Subcommand)]
enum DictionaryCommand {
    /// Install a JSON dictionary or a TSV frequency list
    Import {
        file: PathBuf,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        target: Option<String>,
    },
    /// Remove every entry of the profile's language pair
    Clear,
    Stats,
}

#[derive(Subcommand)]
enum VocabCommand {
    List {
        #[arg(long)]
        status: Option<VocabularyStatus>,
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        book: Option<String>,
    },
    Due,
    Stats,
    Export {
        /// json, csv or flashcards
        #[arg(long, default_value = "json")]
        format: String,
        #[arg(long)]
        status: Option<VocabularyStatus>,
        /// Write here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Grade due words interactively (0-5, `s` to skip, `q` to stop)
    Review,
    Grade {
        id: String,
        quality: u8,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Create a profile cloned from main
    Add { name: String },
    /// Print the active profile's configuration
    Show,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.with_ansi(atty::is(atty::Stream::Stderr)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let root = profile::data_root(cli.data_dir)?;
    profile::init_user_config(&root)?;
    let config = profile::load_user_profile(&root, &cli.profile)?.with_env_overrides();
    config.validate().context("invalid configuration")?;
    let data = DataDir::open(root)?;

    match cli.command {
        Command::Read {
            file,
            json,
            title,
            save,
        } => read_chapter(&data, config, &file, json, title, &save).await,
        Command::Dictionary { command } => dictionary_command(&data, &config, command).await,
        Command::Vocab { command } => vocab_command(&data, &config, command).await,
        Command::Profile { command } => match command {
            ProfileCommand::Add { name } => {
                let path = profile::add_profile_from_default(data.root(), &name)?;
                println!("{}", path.display());
                Ok(())
            }
            ProfileCommand::Show => {
                println!("{}", serde_json::to_string_pretty(&config)?);
                Ok(())
            }
        },
    }
}

fn load_chapter(file: &Path, title: Option<String>) -> anyhow::Result<Chapter> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let is_json = file
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let mut chapter: Chapter = serde_json::from_str(&content)
            .with_context(|| format!("{} is not a chapter document", file.display()))?;
        if let Some(title) = title {
            chapter.title = title;
        }
        return Ok(chapter);
    }

    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chapter".to_string());
    Ok(Chapter {
        id: stem.clone(),
        index: 0,
        title: title.unwrap_or(stem),
        content,
        word_count: 0,
    })
}

/// Wait for the next event the predicate accepts, skipping the rest
async fn next_event(
    rx: &kanal::AsyncReceiver<AppEvent>,
    mut accept: impl FnMut(&AppEvent) -> bool,
) -> anyhow::Result<AppEvent> {
    tokio::time::timeout(EVENT_TIMEOUT, async {
        loop {
            let event = rx.recv().await?;
            if accept(&event) {
                return Ok::<_, anyhow::Error>(event);
            }
        }
    })
    .await
    .context("timed out waiting for the event loop")?
}

async fn read_chapter(
    data: &DataDir,
    config: Config,
    file: &Path,
    json: bool,
    title: Option<String>,
    save: &[usize],
) -> anyhow::Result<()> {
    let chapter = load_chapter(file, title)?;
    let book = Some((chapter.id.clone(), Some(chapter.title.clone())));

    let services = Services::load(data, Arc::new(TerminalSurface::new(json)), &config, book)?;
    services.install_configured_dictionaries(&config).await;
    let services = Arc::new(services);

    let state = Arc::new(AppState::new(config));
    let controller = AppController::new(state, services.clone());
    let mut tasks = controller.spawn_tasks();
    let tx = controller.sender();
    let rx = controller.receiver();

    tx.send(AppEvent::OpenChapter(chapter)).await?;
    let opened = next_event(&rx, |e| {
        matches!(e, AppEvent::ChapterReady { .. } | AppEvent::ChapterFailed { .. })
    })
    .await?;

    if let AppEvent::ChapterFailed { chapter_id, message } = opened {
        controller.shutdown();
        anyhow::bail!("chapter {chapter_id} failed: {message}");
    }

    let mut saved = 0;
    for &index in save {
        let Some(tap) = services.session.tap_event(index) else {
            tracing::warn!("No marker {index} in this chapter");
            continue;
        };
        tx.send(AppEvent::SaveWord(tap)).await?;
        match next_event(&rx, |e| {
            matches!(e, AppEvent::WordSaved { .. } | AppEvent::StatusUpdate(_))
        })
        .await?
        {
            AppEvent::WordSaved { source_word, .. } => {
                saved += 1;
                eprintln!("Saved '{source_word}'");
            }
            AppEvent::StatusUpdate(message) => eprintln!("{message}"),
            _ => {}
        }
    }

    tx.send(AppEvent::Shutdown).await?;
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("task exited with error: {e}"),
            Err(e) => tracing::error!("task panicked: {e}"),
        }
    }
    controller.shutdown();

    if saved > 0 {
        services.persist_vocabulary(data).await?;
    }
    tracing::info!("Session: {:?}", services.session.stats());
    Ok(())
}

async fn dictionary_command(
    data: &DataDir,
    config: &Config,
    command: DictionaryCommand,
) -> anyhow::Result<()> {
    let services = Services::load(data, Arc::new(TerminalSurface::new(false)), config, None)?;
    let profile_pair = config.replacement.language_pair();

    match command {
        DictionaryCommand::Import {
            file,
            source,
            target,
        } => {
            let pair = LanguagePair::new(
                source.unwrap_or_else(|| profile_pair.source.clone()),
                target.unwrap_or_else(|| profile_pair.target.clone()),
            );
            let dictionary = DictionaryLoader::load_from_file(&file, Some(&pair))?;
            let file_pair = dictionary.pair();
            let report = services
                .index
                .bulk_import(dictionary.entries, &file_pair)
                .await?;
            services.persist_words(data).await?;

            println!(
                "{}: imported {}, skipped {}, errors {}",
                file_pair,
                report.imported,
                report.skipped,
                report.errors.len()
            );
            for error in &report.errors {
                eprintln!("  {error}");
            }
        }
        DictionaryCommand::Clear => {
            let removed = services.index.clear_language_pair(&profile_pair).await?;
            services.persist_words(data).await?;
            println!("{profile_pair}: removed {removed} entries");
        }
        DictionaryCommand::Stats => {
            let count = services.index.entry_count(&profile_pair).await?;
            println!("{profile_pair}: {count} entries");
        }
    }
    Ok(())
}

fn print_item(item: &VocabularyItem) {
    println!(
        "{}  {} -> {}  [{}] interval {}d, ease {:.2}",
        item.id,
        item.source_word,
        item.target_word,
        item.status.as_str(),
        item.interval,
        item.ease_factor
    );
}

async fn vocab_command(
    data: &DataDir,
    config: &Config,
    command: VocabCommand,
) -> anyhow::Result<()> {
    let services = Services::load(data, Arc::new(TerminalSurface::new(false)), config, None)?;
    let store = services.vocabulary.clone();

    match command {
        VocabCommand::List {
            status,
            query,
            book,
        } => {
            let filter = VocabularyFilter {
                status,
                query,
                book_id: book,
                ..Default::default()
            };
            let items = store.list_vocabulary(&filter).await?;
            for item in &items {
                print_item(item);
            }
        }
        VocabCommand::Due => {
            let items = store
                .get_due_for_review(Utc::now(), config.review.session_limit)
                .await?;
            for item in &items {
                print_item(item);
            }
        }
        VocabCommand::Stats => {
            let stats = vocabulary_stats(store.as_ref(), Utc::now()).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        VocabCommand::Export {
            format,
            status,
            output,
        } => {
            let format: ExportFormat = format.parse()?;
            let filter = VocabularyFilter {
                status,
                ..Default::default()
            };
            let text = export_vocabulary(
                store.as_ref(),
                &filter,
                format,
                &CardTemplate::default(),
                Utc::now(),
            )
            .await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Wrote {}", path.display());
                }
                None => print!("{text}"),
            }
        }
        VocabCommand::Review => {
            run_review(&services, config.review.session_limit).await?;
            services.persist_vocabulary(data).await?;
        }
        VocabCommand::Grade { id, quality } => {
            let item = review_item(store.as_ref(), &id, quality, Utc::now()).await?;
            print_item(&item);
            services.persist_vocabulary(data).await?;
        }
        VocabCommand::Delete { id } => {
            if store.delete_vocabulary(&id).await? {
                services.persist_vocabulary(data).await?;
                println!("Deleted {id}");
            } else {
                anyhow::bail!("no vocabulary item {id}");
            }
        }
    }
    Ok(())
}

async fn run_review(services: &Services, limit: usize) -> anyhow::Result<()> {
    let mut session = ReviewSession::start(services.vocabulary.clone(), Utc::now(), limit).await?;
    if session.is_finished() {
        println!("Nothing is due.");
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(item) = session.current() {
        println!(
            "\n{}  ({} left)\ngrade 0-5, s = skip, q = quit:",
            item.target_word,
            session.remaining()
        );
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "q" => break,
            "s" => session.skip(),
            answer => match answer.parse::<u8>() {
                Ok(quality) => match session.grade(quality, Utc::now()).await {
                    Ok(item) => println!(
                        "{} = {}  -> {} in {}d",
                        item.target_word,
                        item.source_word,
                        item.status.as_str(),
                        item.interval
                    ),
                    Err(e) => eprintln!("{e}"),
                },
                Err(_) => eprintln!("Enter a grade from 0 to 5"),
            },
        }
    }

    println!("{}", serde_json::to_string_pretty(&session.summary())?);
    Ok(())
}
