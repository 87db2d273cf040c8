use crate::application_impl::DomainPolicy;
use crate::domain_model::{FeedConfig, FeedLimit, PageIncrement};
use anyhow::{Result, anyhow};
use config::{Config, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub auth: Auth,
    pub store: Store,
    pub feed: Feed,
    pub log: Log,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub backend: String, // "memory"
    pub allowed_domain: String,
    pub institution: String,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory"
    pub collection: String,
}

#[derive(Debug, Deserialize)]
pub struct Feed {
    pub initial_limit: FeedLimit,
    pub page_increment: PageIncrement,
    pub scroll_threshold: u32,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

impl Settings {
    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            initial_limit: self.feed.initial_limit,
            page_increment: self.feed.page_increment,
            scroll_threshold: self.feed.scroll_threshold,
        }
    }

    /// Rejects values the feed cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.feed.initial_limit.0 == 0 {
            return Err(anyhow!("feed.initial_limit must be at least 1"));
        }
        if self.feed.page_increment.0 == 0 {
            return Err(anyhow!("feed.page_increment must be at least 1"));
        }
        if self.auth.allowed_domain.is_empty() {
            return Err(anyhow!("auth.allowed_domain must not be empty"));
        }
        Ok(())
    }

    pub fn domain_policy(&self) -> DomainPolicy {
        DomainPolicy {
            allowed_suffix: self.auth.allowed_domain.clone(),
            institution: self.auth.institution.clone(),
        }
    }
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let config = Config::builder()
        .add_source(File::with_name(path))
        .build()
        .map_err(|e| anyhow!(e))?;
    load(config)
}

fn load(config: Config) -> Result<Settings> {
    let settings: Settings = config.try_deserialize().map_err(|e| anyhow!(e))?;
    settings.validate()?;
    Ok(settings)
}
