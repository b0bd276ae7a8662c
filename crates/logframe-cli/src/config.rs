use logframe_convert::query::ResultFormat;
use logframe_convert::reshape::{FillMode, ReshapeOptions, TimeAxis};
use serde::Deserialize;
use std::time::Duration;

const MAX_QUERY_TIMEOUT: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub datasource: DatasourceConfig,
    #[serde(default)]
    pub reshape: ReshapeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatasourceConfig {
    #[serde(default)]
    pub cluster_url: String,
    #[serde(default = "default_query_timeout")]
    pub query_timeout: String,
    pub cache_max_age: Option<String>,
    #[serde(default)]
    pub default_format: ResultFormat,
    #[serde(default)]
    pub enable_user_tracking: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FillModeName {
    #[default]
    Null,
    Zero,
    Previous,
    Value,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ReshapeConfig {
    #[serde(default)]
    pub fill_mode: FillModeName,
    pub fill_value: Option<f64>,
    pub time_column: Option<String>,
}

fn default_query_timeout() -> String {
    "30s".to_string()
}

impl Default for DatasourceConfig {
    fn default() -> Self {
        Self {
            cluster_url: String::new(),
            query_timeout: default_query_timeout(),
            cache_max_age: None,
            default_format: ResultFormat::default(),
            enable_user_tracking: false,
        }
    }
}

impl Config {
    pub fn from_path(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        config.datasource.cluster_url = config
            .datasource
            .cluster_url
            .trim_end_matches(['/', '\\'])
            .to_string();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let timeout = self.datasource.query_timeout()?;
        if timeout.is_zero() {
            return Err(anyhow::anyhow!("query_timeout must be greater than zero"));
        }
        if timeout > MAX_QUERY_TIMEOUT {
            return Err(anyhow::anyhow!("query_timeout must be one hour or less"));
        }
        if self.reshape.fill_mode == FillModeName::Value && self.reshape.fill_value.is_none() {
            return Err(anyhow::anyhow!("fill_mode = \"value\" requires fill_value"));
        }
        if let Some(name) = &self.reshape.time_column {
            if name.trim().is_empty() {
                return Err(anyhow::anyhow!("time_column must not be empty"));
            }
        }
        Ok(())
    }

    pub fn reshape_options(&self) -> ReshapeOptions {
        let fill = match self.reshape.fill_mode {
            FillModeName::Null => FillMode::Null,
            FillModeName::Zero => FillMode::Zero,
            FillModeName::Previous => FillMode::Previous,
            FillModeName::Value => FillMode::Value(self.reshape.fill_value.unwrap_or(0.0)),
        };
        let time_axis = match &self.reshape.time_column {
            Some(name) => TimeAxis::ByName(name.clone()),
            None => TimeAxis::ByType,
        };
        ReshapeOptions { fill, time_axis }
    }
}

/// Options sent alongside each query to the query service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionProperties {
    pub cache_max_age: Option<String>,
    pub server_timeout: String,
}

pub const USER_ID_HEADER: &str = "x-ms-user-id";

impl DatasourceConfig {
    /// `cache_override` wins over the configured `cache_max_age`.
    pub fn connection_properties(
        &self,
        cache_override: Option<&str>,
    ) -> anyhow::Result<ConnectionProperties> {
        Ok(ConnectionProperties {
            cache_max_age: cache_override
                .map(str::to_string)
                .or_else(|| self.cache_max_age.clone()),
            server_timeout: self.server_timeout_value()?,
        })
    }

    /// Extra request headers; the user is only forwarded with tracking enabled.
    pub fn request_headers(&self, user: Option<&str>) -> Vec<(&'static str, String)> {
        match user {
            Some(login) if self.enable_user_tracking => vec![(USER_ID_HEADER, login.to_string())],
            _ => Vec::new(),
        }
    }

    pub fn query_timeout(&self) -> anyhow::Result<Duration> {
        humantime::parse_duration(&self.query_timeout)
            .map_err(|e| anyhow::anyhow!("invalid query_timeout {:?}: {e}", self.query_timeout))
    }

    /// Query timeout as the `hh:mm:ss` timespan the query service expects.
    pub fn server_timeout_value(&self) -> anyhow::Result<String> {
        format_timeout(self.query_timeout()?)
    }
}

pub fn format_timeout(timeout: Duration) -> anyhow::Result<String> {
    if timeout > MAX_QUERY_TIMEOUT {
        return Err(anyhow::anyhow!("timeout must be one hour or less"));
    }
    if timeout == MAX_QUERY_TIMEOUT {
        return Ok("01:00:00".to_string());
    }
    let secs = timeout.as_secs_f64().round() as u64;
    Ok(format!("00:{:02}:{:02}", secs / 60, secs % 60))
}

#[cfg(test)]
mod tests {
    use super::{format_timeout, Config, USER_ID_HEADER};
    use logframe_convert::query::ResultFormat;
    use logframe_convert::reshape::{FillMode, TimeAxis};
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_file_and_normalises_url() {
        let mut file = NamedTempFile::new().expect("tempfile");
        write!(
            file,
            r#"
[datasource]
cluster_url = "https://logs.example.com///"
query_timeout = "1m 30s"
default_format = "time_series"

[reshape]
fill_mode = "value"
fill_value = 1.5
time_column = "Timestamp"
"#
        )
        .expect("write");
        let config = Config::from_path(file.path().to_str().expect("path")).expect("load");
        assert_eq!(config.datasource.cluster_url, "https://logs.example.com");
        assert_eq!(config.datasource.default_format, ResultFormat::TimeSeries);
        assert_eq!(config.datasource.server_timeout_value().unwrap(), "00:01:30");
        let options = config.reshape_options();
        assert_eq!(options.fill, FillMode::Value(1.5));
        assert_eq!(options.time_axis, TimeAxis::ByName("Timestamp".into()));
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").expect("defaults");
        assert_eq!(config.datasource.default_format, ResultFormat::Table);
        assert_eq!(config.datasource.server_timeout_value().unwrap(), "00:00:30");
        assert_eq!(config.reshape_options().fill, FillMode::Null);
        assert_eq!(config.reshape_options().time_axis, TimeAxis::ByType);
    }

    #[test]
    fn rejects_invalid_settings() {
        assert!(Config::parse("[datasource]\nquery_timeout = \"2h\"").is_err());
        assert!(Config::parse("[datasource]\nquery_timeout = \"soon\"").is_err());
        assert!(Config::parse("[reshape]\nfill_mode = \"value\"").is_err());
        assert!(Config::parse("[datasource]\ndefault_format = \"logs\"").is_err());
    }

    #[test]
    fn connection_properties_follow_settings() {
        let config = Config::parse(
            "[datasource]\nquery_timeout = \"2m\"\ncache_max_age = \"5m\"\nenable_user_tracking = true",
        )
        .expect("load");
        let properties = config.datasource.connection_properties(None).unwrap();
        assert_eq!(properties.cache_max_age.as_deref(), Some("5m"));
        assert_eq!(properties.server_timeout, "00:02:00");
        let properties = config.datasource.connection_properties(Some("1h")).unwrap();
        assert_eq!(properties.cache_max_age.as_deref(), Some("1h"));

        assert_eq!(
            config.datasource.request_headers(Some("ada")),
            vec![(USER_ID_HEADER, "ada".to_string())]
        );
        assert!(config.datasource.request_headers(None).is_empty());
        let untracked = Config::default();
        assert!(untracked.datasource.request_headers(Some("ada")).is_empty());
    }

    #[test]
    fn formats_timespans() {
        assert_eq!(format_timeout(Duration::from_secs(3600)).unwrap(), "01:00:00");
        assert_eq!(format_timeout(Duration::from_secs(45)).unwrap(), "00:00:45");
        assert_eq!(format_timeout(Duration::from_secs(125)).unwrap(), "00:02:05");
        assert!(format_timeout(Duration::from_secs(3601)).is_err());
    }
}
