//! Configuration loading.
//!
//! Values come from an optional `config/default.{toml,yaml,json}` file and
//! from `TICKERBUS_`-prefixed environment variables (nested keys joined with
//! `__`, lists separated by `,`), then get merged over `Settings::default()`.
//!
//! ```text
//! TICKERBUS_PUBLISHER__INTERVAL_MS=500
//! TICKERBUS_DEMO__TOPICS=AAPL,NVDA
//! ```

mod settings;

use config::{Config, Environment, File};

use crate::config::settings::PartialSettings;
use crate::utils::Result;

pub use settings::{DemoSettings, LoggingSettings, PublisherSettings, Settings};

/// Loads the configuration from `config/default` and the environment.
pub fn load_config() -> Result<Settings> {
    load_config_from("config/default")
}

/// Same as `load_config` but reads the optional file at `path` (extension
/// may be omitted).
pub fn load_config_from(path: &str) -> Result<Settings> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix("TICKERBUS")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("demo.topics")
                .with_list_parse_key("demo.subscribers")
                .try_parsing(true),
        );

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;
    Ok(merge(partial, Settings::default()))
}

fn merge(partial: PartialSettings, default: Settings) -> Settings {
    let publisher = partial.publisher;
    let logging = partial.logging;
    let demo = partial.demo;

    Settings {
        publisher: PublisherSettings {
            interval_ms: publisher
                .as_ref()
                .and_then(|p| p.interval_ms)
                .unwrap_or(default.publisher.interval_ms),
            starting_price: publisher
                .as_ref()
                .and_then(|p| p.starting_price)
                .unwrap_or(default.publisher.starting_price),
        },
        logging: LoggingSettings {
            level: logging
                .and_then(|l| l.level)
                .unwrap_or(default.logging.level),
        },
        demo: DemoSettings {
            topics: demo
                .as_ref()
                .and_then(|d| d.topics.clone())
                .unwrap_or(default.demo.topics),
            subscribers: demo
                .and_then(|d| d.subscribers)
                .unwrap_or(default.demo.subscribers),
        },
    }
}
