use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use podcast_digest::{
    config::LoggingConfig,
    llm::{create_llm, prompt, LLM},
    ApiServer, Config, DraftGenerator, GenerateRequest, JsonFileStore, ListQuery, NewPodcast,
    OEmbedClient, PodcastService, PodcastStore, SortOrder, User,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt::MakeWriter, EnvFilter};

#[derive(Parser)]
#[command(name = "podcast-digest")]
#[command(version, about = "Turn YouTube podcasts into blog articles")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to podcast-digest.toml or config/podcast-digest.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Generate a draft for a video link and print it as JSON
    Generate {
        /// YouTube link
        url: String,
        /// Known video title (skips the metadata lookup)
        #[arg(long)]
        title: Option<String>,
        /// Known channel name
        #[arg(long)]
        author: Option<String>,
        /// Save the draft as this user id
        #[arg(long)]
        save_as: Option<String>,
    },
    /// List saved podcasts
    List {
        #[arg(short, long, default_value = "")]
        search: String,
        /// Exact show name
        #[arg(long, default_value = "")]
        podcast: String,
        /// Exact tag
        #[arg(long, default_value = "")]
        tag: String,
        /// newest, oldest, highest_rated, longest or shortest
        #[arg(long, default_value = "newest")]
        sort: SortOrder,
    },
    /// Print a saved podcast by slug
    Show { slug: String },
    /// Delete a saved podcast by id
    Delete {
        id: String,
        /// Owner user id
        #[arg(long)]
        user: String,
    },
    /// Print the effective configuration, or write it to a file
    Config {
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

fn env_filter(level: &str, verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("podcast_digest=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }
}

/// Load configuration under a temporary subscriber so the loader's own
/// log lines are not lost before `init_logging` runs
fn load_config<W>(path: Option<&Path>, verbose: bool, make_writer: W) -> podcast_digest::Result<Config>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(&LoggingConfig::default().level, verbose))
        .with_writer(make_writer)
        .finish();

    tracing::subscriber::with_default(subscriber, || Config::load(path))
}

fn init_logging(config: &Config, verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config.logging.level, verbose))
        .init();
}

async fn open_service(config: &Config) -> Result<PodcastService> {
    let store: Arc<dyn PodcastStore> = Arc::new(JsonFileStore::open(&config.storage.records_dir).await?);
    Ok(PodcastService::new(store, config.storage.slug_attempts))
}

async fn build_generator(config: &Config) -> Result<DraftGenerator> {
    let llm: Arc<dyn LLM> = Arc::from(
        create_llm(&config.llm).context("completion provider is not configured")?,
    );
    let metadata = Arc::new(OEmbedClient::new(&config.metadata)?);

    let mut generator = DraftGenerator::new(llm, metadata);
    if let Some(path) = &config.llm.prompt_file {
        generator = generator.with_system_prompt(prompt::load_system_prompt(path).await?);
    }
    Ok(generator)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), cli.verbose, std::io::stdout)?;
    init_logging(&config, cli.verbose);
    config.validate()?;

    match cli.command {
        Commands::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
            }
            info!("{}", config.summary());

            let server = ApiServer::from_config(config).await?;
            server.start().await?;
        }
        Commands::Generate {
            url,
            title,
            author,
            save_as,
        } => {
            let generator = build_generator(&config).await?;
            let request = GenerateRequest {
                youtube_url: Some(url.clone()),
                video_title: title,
                video_author: author,
            };

            let draft = match generator.generate(&request).await {
                Ok(draft) => draft,
                Err(e) => {
                    if let Some(raw) = e.raw_response() {
                        eprintln!("--- raw response ---\n{}\n--------------------", raw);
                    }
                    return Err(e.into());
                }
            };

            match save_as {
                Some(user_id) => {
                    let service = open_service(&config).await?;
                    let user = User {
                        id: user_id,
                        email: None,
                    };
                    let record = service.save(&user, NewPodcast::from_draft(draft, url)).await?;
                    info!("💾 Saved as {}", record.slug);
                    print_json(&record)?;
                }
                None => print_json(&draft)?,
            }
        }
        Commands::List {
            search,
            podcast,
            tag,
            sort,
        } => {
            let service = open_service(&config).await?;
            let records = service.store().list().await?;
            let query = ListQuery {
                search,
                podcast,
                tag,
                sort,
            };

            let podcasts = query.apply(&records);
            for record in &podcasts {
                println!(
                    "{}  {:<40}  {:<24}  {}★  {}m  {}",
                    record.created_at.format("%Y-%m-%d"),
                    record.title,
                    record.podcast_name,
                    record.rating,
                    record.duration_minutes,
                    record.slug
                );
            }
            if query.has_filters() {
                println!("{} of {} podcasts", podcasts.len(), records.len());
            }
        }
        Commands::Show { slug } => {
            let service = open_service(&config).await?;
            let record = service
                .store()
                .get_by_slug(&slug)
                .await?
                .ok_or_else(|| anyhow!("No podcast with slug {}", slug))?;
            print_json(&record)?;
        }
        Commands::Delete { id, user } => {
            let service = open_service(&config).await?;
            let user = User { id: user, email: None };
            let removed = service.delete(&user, &id).await?;
            info!("🗑️ Deleted \"{}\"", removed.title);
        }
        Commands::Config { write } => match write {
            Some(path) => config.save(&path)?,
            None => println!("{}", config.summary()),
        },
    }

    Ok(())
}
