use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use curator::application::services::{BuildGate, CacheWriteLock};
use curator::application::use_cases::{
    AppendMediaUseCase, BuildCacheUseCase, BuildSettings, QueryCacheUseCase,
};
use curator::application::AppendOutcome;
use curator::domain::entities::{EntryId, MessageId};
use curator::domain::ports::{CacheStorePort, MessageSourcePort, UrlVerifierPort};
use curator::infrastructure::{
    AppConfig, CliArgs, Command, ConfigLoader, DiscordClient, HttpUrlVerifier, JsonCacheStore,
};
use curator::presentation::{ChatCommand, CommandDispatcher, Reply};

fn init_logging(config: &AppConfig) -> Result<()> {
    let default_level = LevelFilter::from_level(config.log_level.to_tracing_level());
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .init();
    }

    Ok(())
}

/// Shared handles wired from configuration.
struct Services {
    config: AppConfig,
    store: Arc<dyn CacheStorePort>,
    verifier: Arc<dyn UrlVerifierPort>,
    source: Option<Arc<dyn MessageSourcePort>>,
    gate: BuildGate,
    write_lock: CacheWriteLock,
}

impl Services {
    fn wire(config: AppConfig) -> Result<Self> {
        let storage_dir = config.effective_storage_dir();
        info!(path = %storage_dir.display(), "Using cache storage directory");

        let store: Arc<dyn CacheStorePort> = Arc::new(JsonCacheStore::new(storage_dir));
        let verifier: Arc<dyn UrlVerifierPort> =
            Arc::new(HttpUrlVerifier::with_timeout(config.cache.verify_timeout())?);

        let source = match (&config.token, config.discord.channel_id) {
            (Some(token), Some(channel_id)) => {
                let client: Arc<dyn MessageSourcePort> = Arc::new(DiscordClient::with_base_url(
                    config.discord.api_base_url.as_str(),
                    token.as_str(),
                    channel_id,
                )?);
                Some(client)
            }
            _ => None,
        };

        Ok(Self {
            config,
            store,
            verifier,
            source,
            gate: BuildGate::new(),
            write_lock: CacheWriteLock::new(),
        })
    }

    fn source(&self) -> Result<Arc<dyn MessageSourcePort>> {
        self.source.clone().ok_or_else(|| {
            eyre!("a bot token and channel id are required (set DISCORD_BOT_TOKEN and --channel-id)")
        })
    }

    fn queries(&self) -> QueryCacheUseCase {
        QueryCacheUseCase::new(self.store.clone(), self.write_lock.clone(), self.gate.clone())
    }

    fn builder(&self) -> Result<BuildCacheUseCase> {
        let settings = BuildSettings {
            page_size: self.config.discord.page_size,
            max_items: self.config.cache.max_items,
        };
        Ok(BuildCacheUseCase::new(
            self.source()?,
            self.verifier.clone(),
            self.store.clone(),
            self.gate.clone(),
            self.write_lock.clone(),
        )
        .with_settings(settings))
    }

    fn dispatcher(&self) -> Result<CommandDispatcher> {
        let dispatcher = CommandDispatcher::new(self.config.commands.clone(), self.queries());
        Ok(if self.source.is_some() {
            dispatcher.with_builder(self.builder()?)
        } else {
            dispatcher
        })
    }
}

async fn run(command: Command, services: &Services) -> Result<()> {
    match command {
        Command::Init => match services.builder()?.initialize().await? {
            Some(outcome) => println!("{}", Reply::from(outcome)),
            None => println!("Cache already exists."),
        },
        Command::Build => {
            let outcome = services.builder()?.execute().await?;
            println!("{}", Reply::from(outcome));
        }
        Command::Random => {
            let reply = services.dispatcher()?.execute(ChatCommand::Random).await?;
            println!("{reply}");
        }
        Command::Get { id } => {
            let reply = services
                .dispatcher()?
                .execute(ChatCommand::Get(EntryId(id)))
                .await?;
            println!("{reply}");
        }
        Command::Delete { id } => {
            let reply = services
                .dispatcher()?
                .execute(ChatCommand::Delete(EntryId(id)))
                .await?;
            println!("{reply}");
        }
        Command::Append { message_id } => {
            let message = services.source()?.fetch_message(MessageId(message_id)).await?;
            let appender = AppendMediaUseCase::new(
                services.verifier.clone(),
                services.store.clone(),
                services.write_lock.clone(),
            );
            match appender.execute(&message).await? {
                AppendOutcome::Added(entry) => println!("{}", Reply::Entry(entry)),
                AppendOutcome::NoCandidate => println!("No media found in message."),
                AppendOutcome::Unverified => println!("Media URL could not be verified."),
                AppendOutcome::Duplicate => println!("Media is already cached."),
                AppendOutcome::Excluded => println!("Media was deleted and will not be added."),
                AppendOutcome::IgnoredBot => println!("Bot messages are not cached."),
            }
        }
        Command::Status => println!("{}", services.queries().status().await?),
        Command::Dispatch { text } => match services.dispatcher()?.dispatch(&text).await? {
            Some(reply) => println!("{reply}"),
            None => info!("Text is not a command"),
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let mut config = ConfigLoader::resolve(args.config.as_deref())?.load()?;
    config.merge_with_args(&args);

    init_logging(&config)?;

    info!(version = curator::VERSION, "Starting {}", curator::NAME);

    let services = Services::wire(config)?;
    run(args.command, &services).await
}
