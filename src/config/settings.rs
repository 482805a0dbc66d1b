use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration settings for the application.
///
/// Includes the publish cycle, logging and the demo wiring used by the binary.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub publisher: PublisherSettings,
    pub logging: LoggingSettings,
    pub demo: DemoSettings,
}

/// Configuration settings for publishers.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PublisherSettings {
    pub interval_ms: u64,
    pub starting_price: f64,
}

impl PublisherSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
}

/// Topics published and subscribers attached by `tickerbus run`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DemoSettings {
    pub topics: Vec<String>,
    pub subscribers: Vec<String>,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values are filled from defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub publisher: Option<PartialPublisherSettings>,
    pub logging: Option<PartialLoggingSettings>,
    pub demo: Option<PartialDemoSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialPublisherSettings {
    pub interval_ms: Option<u64>,
    pub starting_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialDemoSettings {
    pub topics: Option<Vec<String>>,
    pub subscribers: Option<Vec<String>>,
}

/// Provides default values for `Settings`.
impl Default for Settings {
    fn default() -> Self {
        Self {
            publisher: PublisherSettings {
                interval_ms: 2000,
                starting_price: 100.0,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
            demo: DemoSettings {
                topics: ["AAPL", "GOOGL", "MSFT", "TSLA"]
                    .map(String::from)
                    .to_vec(),
                subscribers: ["Alice", "Bob"].map(String::from).to_vec(),
            },
        }
    }
}
