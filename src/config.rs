use serde_derive::Deserialize;
use serde_derive::Serialize;

use log::{info, warn};
use std::fs::File;
use std::io::prelude::*;
use std::time::Duration;

use crate::{exception::Exception, param::JSON_CONTENT_TYPE, util::normalize_base_path};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_local")]
    local: bool,
    #[serde(default)]
    worker_threads: usize,
    /// 挂载前缀，例如 `/api`；空字符串表示挂载在根路径
    #[serde(default)]
    base_path: String,
    #[serde(default = "default_content_type")]
    content_type: String,
    #[serde(default = "default_max_request_size")]
    max_request_size: usize,
    /// 读取单个请求的时限（秒），超时返回 408
    #[serde(default = "default_read_timeout")]
    read_timeout: u64,
}

fn default_port() -> u16 {
    7878
}

fn default_local() -> bool {
    true
}

fn default_content_type() -> String {
    JSON_CONTENT_TYPE.to_string()
}

fn default_max_request_size() -> usize {
    8192 // 8KB
}

fn default_read_timeout() -> u64 {
    5
}

impl Config {
    pub fn new() -> Self {
        Self {
            port: default_port(),
            local: default_local(),
            worker_threads: num_cpus::get(),
            base_path: String::new(),
            content_type: default_content_type(),
            max_request_size: default_max_request_size(),
            read_timeout: default_read_timeout(),
        }
    }

    pub fn from_toml(filename: &str) -> Result<Self, Exception> {
        let mut file = File::open(filename)
            .map_err(|e| Exception::ConfigUnreadable(format!("{}: {}", filename, e)))?;
        let mut str_val = String::new();
        file.read_to_string(&mut str_val)
            .map_err(|e| Exception::ConfigUnreadable(format!("{}: {}", filename, e)))?;
        Self::from_toml_str(&str_val)
    }

    pub fn from_toml_str(str_val: &str) -> Result<Self, Exception> {
        let mut raw_config: Config =
            toml::from_str(str_val).map_err(|e| Exception::ConfigInvalid(e.to_string()))?;
        if raw_config.worker_threads == 0 {
            raw_config.worker_threads = num_cpus::get();
        }
        if raw_config.max_request_size == 0 {
            warn!("max_request_size被设置为0，将使用默认值{}", default_max_request_size());
            raw_config.max_request_size = default_max_request_size();
        }
        if raw_config.read_timeout == 0 {
            warn!("read_timeout被设置为0，将使用默认值{}秒", default_read_timeout());
            raw_config.read_timeout = default_read_timeout();
        }
        raw_config.base_path = normalize_base_path(&raw_config.base_path);
        info!(
            "配置已解析：port={}, base_path='{}', content_type={}",
            raw_config.port, raw_config.base_path, raw_config.content_type
        );
        Ok(raw_config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn local(&self) -> bool {
        self.local
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn max_request_size(&self) -> usize {
        self.max_request_size
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.port(), 7878);
        assert!(config.local());
        assert!(config.worker_threads() > 0);
        assert_eq!(config.base_path(), "");
        assert_eq!(config.content_type(), "application/json");
        assert_eq!(config.max_request_size(), 8192);
        assert_eq!(config.read_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "port = 8080\nlocal = false\nworker_threads = 2\nbase_path = \"api\"\ncontent_type = \"text/plain\""
        )
        .unwrap();

        let config = Config::from_toml(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.port(), 8080);
        assert!(!config.local());
        assert_eq!(config.worker_threads(), 2);
        assert_eq!(config.base_path(), "/api");
        assert_eq!(config.content_type(), "text/plain");
        assert_eq!(config.max_request_size(), 8192);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.port(), 7878);
        assert!(config.worker_threads() > 0);
        assert_eq!(config.content_type(), "application/json");
    }

    #[test]
    fn test_zero_request_size_is_replaced() {
        let config = Config::from_toml_str("max_request_size = 0").unwrap();
        assert_eq!(config.max_request_size(), 8192);
    }

    #[test]
    fn test_read_timeout() {
        let config = Config::from_toml_str("read_timeout = 30").unwrap();
        assert_eq!(config.read_timeout(), Duration::from_secs(30));

        let config = Config::from_toml_str("read_timeout = 0").unwrap();
        assert_eq!(config.read_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_toml_str("port = \"not a number\"");
        assert!(matches!(result, Err(Exception::ConfigInvalid(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_toml("/nonexistent/ripple.toml");
        assert!(matches!(result, Err(Exception::ConfigUnreadable(_))));
    }
}
