use std::{env, path::Path};

use serde::Deserialize;

use crate::error::Result;

/// 运行配置
///
/// 先读取 `BLOG_CONFIG` 指向的 TOML 文件（可选），再用环境变量覆盖：
///
/// - `DATABASE_URL`：PostgreSQL 连接串，未设置时使用内存存储
/// - `BLOG_LISTEN`：监听地址
/// - `BLOG_LOG`：日志过滤规则，格式同 `RUST_LOG`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen: String,
    pub database_url: Option<String>,
    pub log: String,
    /// 启动时执行建表脚本
    pub migrate: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
            database_url: None,
            log: "info".to_string(),
            migrate: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let config = match env::var("BLOG_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        Ok(config.with_overrides(|key| env::var(key).ok()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(listen) = lookup("BLOG_LISTEN") {
            self.listen = listen;
        }
        if let Some(log) = lookup("BLOG_LOG") {
            self.log = log;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_toml_fills_defaults() {
        let config = Config::from_toml(
            r#"
            listen = "127.0.0.1:8080"
            database_url = "postgres://blog@localhost/blog"
            "#,
        )
        .expect("Failed to parse config");

        assert_eq!(config.listen, "127.0.0.1:8080");
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://blog@localhost/blog")
        );
        assert_eq!(config.log, "info");
        assert!(config.migrate);
    }

    #[test]
    fn test_config_invalid_toml() {
        assert!(Config::from_toml("listen = ").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let config = Config::default().with_overrides(|key| match key {
            "DATABASE_URL" => Some("postgres://other".to_string()),
            "BLOG_LOG" => Some("debug".to_string()),
            _ => None,
        });

        assert_eq!(config.database_url.as_deref(), Some("postgres://other"));
        assert_eq!(config.log, "debug");
        assert_eq!(config.listen, "0.0.0.0:3000");
    }
}
