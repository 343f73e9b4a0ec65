use crate::Cli;
use anyhow::{anyhow, Result};
use astrace_trace::{Locale, TracerSettings};
use encoding_rs::Encoding;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub destination: String,
    pub locale: Locale,
    pub encoding: &'static Encoding,
    pub tracer: TracerSettings,
    pub replay: Option<PathBuf>,
    pub lookup_url: String,
    pub lookup_timeout: Duration,
    pub concurrency: usize,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let destination = cli.destination.trim();
        if destination.is_empty() {
            return Err(anyhow!("destination must not be empty"));
        }

        let mut locale = Locale::by_name(&cli.locale)
            .ok_or_else(|| anyhow!("unsupported locale: {} (expected ru or en)", cli.locale))?;
        if let Some(label) = &cli.codepage {
            locale = locale.with_codepage(label);
        }
        let encoding = locale.encoding()?;

        if cli.timeout_ms == 0 {
            return Err(anyhow!("--timeout-ms must be greater than zero"));
        }

        Ok(Self {
            destination: destination.to_string(),
            locale,
            encoding,
            tracer: TracerSettings {
                program: cli.tracer.clone(),
                ..TracerSettings::default()
            },
            replay: cli.replay.clone(),
            lookup_url: cli.lookup_url.clone(),
            lookup_timeout: Duration::from_millis(cli.timeout_ms),
            concurrency: cli.concurrency.max(1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn config(args: &[&str]) -> Result<Config> {
        let cli = Cli::try_parse_from(std::iter::once("astrace").chain(args.iter().copied()))?;
        Config::from_cli(&cli)
    }

    #[test]
    fn defaults_follow_russian_tracert() {
        let config = config(&["ya.ru"]).unwrap();

        assert_eq!(config.destination, "ya.ru");
        assert_eq!(config.locale.name, "ru");
        assert_eq!(config.encoding, encoding_rs::IBM866);
        assert_eq!(config.tracer.program, "tracert");
        assert_eq!(config.lookup_url, "https://ipinfo.io");
        assert_eq!(config.lookup_timeout, Duration::from_secs(5));
        assert_eq!(config.concurrency, 1);
        assert!(config.replay.is_none());
    }

    #[test]
    fn codepage_override_applies_to_locale() {
        let config = config(&["--locale", "en", "--codepage", "utf-8", "1.1.1.1"]).unwrap();

        assert_eq!(config.locale.name, "en");
        assert_eq!(config.encoding, encoding_rs::UTF_8);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&["--locale", "fr", "ya.ru"]).is_err());
        assert!(config(&["--codepage", "klingon", "ya.ru"]).is_err());
        assert!(config(&["--timeout-ms", "0", "ya.ru"]).is_err());
        assert!(config(&[]).is_err());
    }

    #[test]
    fn concurrency_is_at_least_one() {
        let config = config(&["--concurrency", "0", "ya.ru"]).unwrap();
        assert_eq!(config.concurrency, 1);
    }
}
