//! CLI for tickerbus
//!
//! Subcommands:
//! - `run`: start one publisher per configured topic, attach the configured
//!   subscribers and log every update until Ctrl-C (or `--duration-secs`)
//! - `config`: print the effective configuration as JSON

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use tickerbus::config::{Settings, load_config};
use tickerbus::utils::logging;
use tickerbus::{MessageBus, Publisher, Subscriber};

#[derive(Parser)]
#[command(name = "tickerbus")]
enum Command {
    /// Run the simulated price feed
    Run {
        /// Publish interval in milliseconds (overrides configuration)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Topic to publish; repeat for several (overrides configuration)
        #[arg(long = "topic")]
        topics: Vec<String>,
        /// Stop after this many seconds instead of waiting for Ctrl-C
        #[arg(long)]
        duration_secs: Option<u64>,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let cmd = Command::parse();

    let mut settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            logging::init("info");
            error!("Failed to load configuration: {e}");
            return Err(e.into());
        }
    };
    logging::init(&settings.logging.level);

    match cmd {
        Command::Run {
            interval_ms,
            topics,
            duration_secs,
        } => {
            if let Some(ms) = interval_ms {
                settings.publisher.interval_ms = ms;
            }
            if !topics.is_empty() {
                settings.demo.topics = topics;
            }
            run_feed(settings, duration_secs.map(Duration::from_secs))
                .await
                .inspect_err(|e| error!("Feed failed: {e}"))?;
        }
        Command::Config => println!("{}", serde_json::to_string_pretty(&settings)?),
    }
    Ok(())
}

async fn run_feed(
    settings: Settings,
    duration: Option<Duration>,
) -> Result<(), Box<dyn std::error::Error>> {
    let bus = Arc::new(MessageBus::new());

    let subscribers: Vec<Subscriber> = settings
        .demo
        .subscribers
        .iter()
        .map(|name| Subscriber::with_generated_id(name.as_str(), bus.clone()))
        .collect();
    for subscriber in &subscribers {
        let name = subscriber.display_name().to_string();
        subscriber.set_update_callback(move |topic, message| {
            info!(
                subscriber = %name,
                topic,
                price = message.price,
                change_percent = message.change_percent,
                "update"
            );
        });
        for topic in &settings.demo.topics {
            subscriber.subscribe(topic)?;
        }
    }

    let publishers = settings
        .demo
        .topics
        .iter()
        .map(|topic| {
            Publisher::with_price(bus.clone(), topic.as_str(), settings.publisher.starting_price)
        })
        .collect::<Result<Vec<_>, _>>()?;
    for publisher in &publishers {
        publisher.start_publishing(settings.publisher.interval())?;
    }
    info!(
        topics = ?bus.topics(),
        subscribers = subscribers.len(),
        interval_ms = settings.publisher.interval_ms,
        "feed running"
    );

    match duration {
        Some(duration) => tokio::time::sleep(duration).await,
        None => {
            tokio::signal::ctrl_c().await?;
            info!("Shutdown signal received.");
        }
    }

    for publisher in &publishers {
        publisher.stop_publishing();
    }
    for subscriber in &subscribers {
        info!(
            subscriber = subscriber.display_name(),
            received = subscriber.message_history().len(),
            "unsubscribing"
        );
        subscriber.unsubscribe_all();
    }
    Ok(())
}
