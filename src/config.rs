use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Server configuration, read once before the listener starts.
///
/// ```toml
/// port = 1234
/// banned_words = "spam,scam"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    pub port: u16,
    /// Comma-separated, as operators write it in the file.
    #[serde(default)]
    pub banned_words: String,
    /// Capacity of each session's outbound queue. A recipient whose queue
    /// fills up is treated as dead.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
}

fn default_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_outbound_queue() -> usize {
    64
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder {
            addr: default_addr(),
            port: 1234,
            banned_words: Vec::new(),
            outbound_queue: default_outbound_queue(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.outbound_queue == 0 {
            return Err(ConfigError::Invalid(
                "outbound_queue must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }

    /// The banned-word list split out of its comma-separated form.
    /// Blank entries are skipped; normalisation happens in the filter.
    pub fn banned_word_list(&self) -> Vec<String> {
        self.banned_words
            .split(',')
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Builds a config in code, mostly for tests and embedding.
pub struct ServerConfigBuilder {
    addr: String,
    port: u16,
    banned_words: Vec<String>,
    outbound_queue: usize,
}

impl ServerConfigBuilder {
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn banned_word(mut self, word: impl Into<String>) -> Self {
        self.banned_words.push(word.into());
        self
    }

    pub fn outbound_queue(mut self, capacity: usize) -> Self {
        self.outbound_queue = capacity;
        self
    }

    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let config = ServerConfig {
            addr: self.addr,
            port: self.port,
            banned_words: self.banned_words.join(","),
            outbound_queue: self.outbound_queue,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_port_and_words() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 4321").unwrap();
        writeln!(file, "banned_words = \"spam, Scam,,\"").unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.port, 4321);
        assert_eq!(config.addr, "127.0.0.1");
        assert_eq!(config.outbound_queue, 64);
        assert_eq!(config.banned_word_list(), vec!["spam", "Scam"]);
    }

    #[test]
    fn missing_word_list_bans_nothing() {
        let config: ServerConfig = toml::from_str("port = 1").unwrap();
        assert!(config.banned_word_list().is_empty());
    }

    #[test]
    fn missing_port_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "banned_words = \"spam\"").unwrap();
        assert!(matches!(
            ServerConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn zero_queue_is_rejected() {
        assert!(matches!(
            ServerConfig::builder().outbound_queue(0).build(),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn builder_round_trips_words() {
        let config = ServerConfig::builder()
            .port(9000)
            .banned_word("spam")
            .banned_word("eggs")
            .build()
            .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.banned_word_list(), vec!["spam", "eggs"]);
    }
}
