use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub server: ServerConfig,
    pub runner: RunnerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
    /// The only chat allowed to run poll commands; also where announcements go before a poll
    /// has been published.
    pub group_chat_id: i64,
    pub api_base_url: String,
    pub long_poll_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct RunnerConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bot_token: Option<String>,
    pub group_chat_id: Option<i64>,
    pub api_base_url: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig {
                bot_token: String::new().into(),
                group_chat_id: 0,
                api_base_url: "https://api.telegram.org".to_string(),
                long_poll_timeout_secs: 30,
                request_timeout_secs: 10,
            },
            server: ServerConfig { bind_address: "0.0.0.0".to_string(), port: 3000 },
            runner: RunnerConfig { max_retries: 8, base_delay_ms: 500, max_delay_ms: 30_000 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl TelegramConfig {
    pub fn is_authorized_chat(&self, chat_id: i64) -> bool {
        group_accepts_chat(self.group_chat_id, chat_id)
    }
}

/// Accepts the configured group id, and the supergroup form (`-100` prefix) of a legacy
/// group id, since Telegram migrates groups and reports the new id on inbound updates.
pub fn group_accepts_chat(group_chat_id: i64, chat_id: i64) -> bool {
    if chat_id == group_chat_id {
        return true;
    }

    group_chat_id < 0 && format!("-100{}", group_chat_id.unsigned_abs()) == chat_id.to_string()
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("courtside.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// One-line-per-setting view with the bot token redacted.
    pub fn redacted_summary(&self) -> String {
        let token = self.telegram.bot_token.expose_secret();
        let token_hint = match token.split_once(':') {
            Some((bot_id, _)) => format!("{bot_id}:<redacted>"),
            None => "<redacted>".to_string(),
        };

        [
            format!("telegram.bot_token = {token_hint}"),
            format!("telegram.group_chat_id = {}", self.telegram.group_chat_id),
            format!("telegram.api_base_url = {}", self.telegram.api_base_url),
            format!("telegram.long_poll_timeout_secs = {}", self.telegram.long_poll_timeout_secs),
            format!("telegram.request_timeout_secs = {}", self.telegram.request_timeout_secs),
            format!("server.bind_address = {}", self.server.bind_address),
            format!("server.port = {}", self.server.port),
            format!("runner.max_retries = {}", self.runner.max_retries),
            format!("runner.base_delay_ms = {}", self.runner.base_delay_ms),
            format!("runner.max_delay_ms = {}", self.runner.max_delay_ms),
            format!("logging.level = {}", self.logging.level),
            format!("logging.format = {:?}", self.logging.format).to_ascii_lowercase(),
        ]
        .join("\n")
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(telegram) = patch.telegram {
            if let Some(bot_token_value) = telegram.bot_token {
                self.telegram.bot_token = secret_value(bot_token_value);
            }
            if let Some(group_chat_id) = telegram.group_chat_id {
                self.telegram.group_chat_id = group_chat_id;
            }
            if let Some(api_base_url) = telegram.api_base_url {
                self.telegram.api_base_url = api_base_url;
            }
            if let Some(long_poll_timeout_secs) = telegram.long_poll_timeout_secs {
                self.telegram.long_poll_timeout_secs = long_poll_timeout_secs;
            }
            if let Some(request_timeout_secs) = telegram.request_timeout_secs {
                self.telegram.request_timeout_secs = request_timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(runner) = patch.runner {
            if let Some(max_retries) = runner.max_retries {
                self.runner.max_retries = max_retries;
            }
            if let Some(base_delay_ms) = runner.base_delay_ms {
                self.runner.base_delay_ms = base_delay_ms;
            }
            if let Some(max_delay_ms) = runner.max_delay_ms {
                self.runner.max_delay_ms = max_delay_ms;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let bot_token = read_env("COURTSIDE_TELEGRAM_BOT_TOKEN").or_else(|| read_env("BOT_TOKEN"));
        if let Some(value) = bot_token {
            self.telegram.bot_token = secret_value(value);
        }
        let group_chat_id =
            read_env("COURTSIDE_TELEGRAM_GROUP_CHAT_ID").map(|value| ("COURTSIDE_TELEGRAM_GROUP_CHAT_ID", value));
        if let Some((key, value)) = group_chat_id.or_else(|| read_env("CHAT_ID").map(|value| ("CHAT_ID", value))) {
            self.telegram.group_chat_id = parse_i64(key, &value)?;
        }
        if let Some(value) = read_env("COURTSIDE_TELEGRAM_API_BASE_URL") {
            self.telegram.api_base_url = value;
        }
        if let Some(value) = read_env("COURTSIDE_TELEGRAM_LONG_POLL_TIMEOUT_SECS") {
            self.telegram.long_poll_timeout_secs =
                parse_u64("COURTSIDE_TELEGRAM_LONG_POLL_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("COURTSIDE_TELEGRAM_REQUEST_TIMEOUT_SECS") {
            self.telegram.request_timeout_secs =
                parse_u64("COURTSIDE_TELEGRAM_REQUEST_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("COURTSIDE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        let port = read_env("COURTSIDE_SERVER_PORT")
            .map(|value| ("COURTSIDE_SERVER_PORT", value))
            .or_else(|| read_env("PORT").map(|value| ("PORT", value)));
        if let Some((key, value)) = port {
            self.server.port = parse_u16(key, &value)?;
        }

        if let Some(value) = read_env("COURTSIDE_RUNNER_MAX_RETRIES") {
            self.runner.max_retries = parse_u32("COURTSIDE_RUNNER_MAX_RETRIES", &value)?;
        }
        if let Some(value) = read_env("COURTSIDE_RUNNER_BASE_DELAY_MS") {
            self.runner.base_delay_ms = parse_u64("COURTSIDE_RUNNER_BASE_DELAY_MS", &value)?;
        }
        if let Some(value) = read_env("COURTSIDE_RUNNER_MAX_DELAY_MS") {
            self.runner.max_delay_ms = parse_u64("COURTSIDE_RUNNER_MAX_DELAY_MS", &value)?;
        }

        let log_level =
            read_env("COURTSIDE_LOGGING_LEVEL").or_else(|| read_env("COURTSIDE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("COURTSIDE_LOGGING_FORMAT").or_else(|| read_env("COURTSIDE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bot_token) = overrides.bot_token {
            self.telegram.bot_token = secret_value(bot_token);
        }
        if let Some(group_chat_id) = overrides.group_chat_id {
            self.telegram.group_chat_id = group_chat_id;
        }
        if let Some(api_base_url) = overrides.api_base_url {
            self.telegram.api_base_url = api_base_url;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_telegram(&self.telegram)?;
        validate_server(&self.server)?;
        validate_runner(&self.runner)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("courtside.toml"), PathBuf::from("config/courtside.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_telegram(telegram: &TelegramConfig) -> Result<(), ConfigError> {
    let bot_token = telegram.bot_token.expose_secret();
    if bot_token.is_empty() {
        return Err(ConfigError::Validation(
            "telegram.bot_token is required. Create a bot with @BotFather and copy its HTTP API token".to_string(),
        ));
    }
    let well_formed = match bot_token.split_once(':') {
        Some((bot_id, secret)) => {
            !bot_id.is_empty() && bot_id.bytes().all(|byte| byte.is_ascii_digit()) && !secret.is_empty()
        }
        None => false,
    };
    if !well_formed {
        return Err(ConfigError::Validation(
            "telegram.bot_token must look like `<bot id>:<secret>` as issued by @BotFather"
                .to_string(),
        ));
    }

    if telegram.group_chat_id == 0 {
        return Err(ConfigError::Validation(
            "telegram.group_chat_id is required (the numeric id of the group running the poll)"
                .to_string(),
        ));
    }

    let base_url = telegram.api_base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "telegram.api_base_url must start with http:// or https://".to_string(),
        ));
    }

    if telegram.long_poll_timeout_secs == 0 || telegram.long_poll_timeout_secs > 50 {
        return Err(ConfigError::Validation(
            "telegram.long_poll_timeout_secs must be in range 1..=50".to_string(),
        ));
    }

    if telegram.request_timeout_secs == 0 || telegram.request_timeout_secs > 120 {
        return Err(ConfigError::Validation(
            "telegram.request_timeout_secs must be in range 1..=120".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    Ok(())
}

fn validate_runner(runner: &RunnerConfig) -> Result<(), ConfigError> {
    if runner.max_delay_ms < runner.base_delay_ms {
        return Err(ConfigError::Validation(
            "runner.max_delay_ms must be greater than or equal to runner.base_delay_ms".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_i64(key: &str, value: &str) -> Result<i64, ConfigError> {
    value.trim().parse::<i64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    telegram: Option<TelegramPatch>,
    server: Option<ServerPatch>,
    runner: Option<RunnerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct TelegramPatch {
    bot_token: Option<String>,
    group_chat_id: Option<i64>,
    api_base_url: Option<String>,
    long_poll_timeout_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct RunnerPatch {
    max_retries: Option<u32>,
    base_delay_ms: Option<u64>,
    max_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::{ExposeSecret, SecretString};
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, TelegramConfig};

    const TOKEN_VARS: &[&str] = &[
        "COURTSIDE_TELEGRAM_BOT_TOKEN",
        "BOT_TOKEN",
        "COURTSIDE_TELEGRAM_GROUP_CHAT_ID",
        "CHAT_ID",
        "COURTSIDE_SERVER_PORT",
        "PORT",
        "COURTSIDE_LOG_LEVEL",
        "COURTSIDE_LOG_FORMAT",
    ];

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    fn telegram(group_chat_id: i64) -> TelegramConfig {
        TelegramConfig {
            bot_token: SecretString::from("123:abc"),
            group_chat_id,
            api_base_url: "https://api.telegram.org".to_string(),
            long_poll_timeout_secs: 30,
            request_timeout_secs: 10,
        }
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(TOKEN_VARS);

        env::set_var("TEST_COURTSIDE_TOKEN", "4242:from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("courtside.toml");
            fs::write(
                &path,
                r#"
[telegram]
bot_token = "${TEST_COURTSIDE_TOKEN}"
group_chat_id = -5040590820
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.telegram.bot_token.expose_secret() == "4242:from-env",
                "bot token should be interpolated from environment",
            )?;
            ensure(config.telegram.group_chat_id == -5040590820, "group id should come from file")
        })();

        clear_vars(&["TEST_COURTSIDE_TOKEN"]);
        result
    }

    #[test]
    fn legacy_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(TOKEN_VARS);

        env::set_var("BOT_TOKEN", "77:legacy");
        env::set_var("CHAT_ID", "-5040590820");
        env::set_var("PORT", "8081");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.telegram.bot_token.expose_secret() == "77:legacy", "BOT_TOKEN alias")?;
            ensure(config.telegram.group_chat_id == -5040590820, "CHAT_ID alias")?;
            ensure(config.server.port == 8081, "PORT alias")
        })();

        clear_vars(TOKEN_VARS);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(TOKEN_VARS);

        env::set_var("COURTSIDE_TELEGRAM_BOT_TOKEN", "1:from-env");
        env::set_var("COURTSIDE_LOG_FORMAT", "json");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("courtside.toml");
            fs::write(
                &path,
                r#"
[telegram]
bot_token = "1:from-file"
group_chat_id = -1

[server]
port = 9000

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    port: Some(9100),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.server.port == 9100, "override port should win")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(matches!(config.logging.format, LogFormat::Json), "env log format should win")?;
            ensure(
                config.telegram.bot_token.expose_secret() == "1:from-env",
                "env token should win over file and defaults",
            )
        })();

        clear_vars(TOKEN_VARS);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(TOKEN_VARS);

        env::set_var("COURTSIDE_TELEGRAM_BOT_TOKEN", "not-a-token");
        env::set_var("COURTSIDE_TELEGRAM_GROUP_CHAT_ID", "-1");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("telegram.bot_token")
            );
            ensure(has_message, "validation failure should mention telegram.bot_token")
        })();

        clear_vars(TOKEN_VARS);
        result
    }

    #[test]
    fn missing_group_chat_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(TOKEN_VARS);

        let result = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                bot_token: Some("1:abc".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::Validation(ref message)) if message.contains("group_chat_id")),
            "missing group chat id should fail validation",
        )
    }

    #[test]
    fn invalid_numeric_env_override_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(TOKEN_VARS);

        env::set_var("COURTSIDE_TELEGRAM_BOT_TOKEN", "1:abc");
        env::set_var("CHAT_ID", "group");

        let result = AppConfig::load(LoadOptions::default());
        clear_vars(TOKEN_VARS);

        ensure(
            matches!(result, Err(ConfigError::InvalidEnvOverride { ref key, .. }) if key == "CHAT_ID"),
            "non-numeric CHAT_ID should be reported",
        )
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug_or_summary() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(TOKEN_VARS);

        env::set_var("COURTSIDE_TELEGRAM_BOT_TOKEN", "999:super-secret-value");
        env::set_var("COURTSIDE_TELEGRAM_GROUP_CHAT_ID", "-42");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");
            let summary = config.redacted_summary();

            ensure(!debug.contains("super-secret-value"), "debug output should not contain token")?;
            ensure(!summary.contains("super-secret-value"), "summary should not contain token")?;
            ensure(summary.contains("telegram.bot_token = 999:<redacted>"), "summary keeps bot id")?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )
        })();

        clear_vars(TOKEN_VARS);
        result
    }

    #[test]
    fn authorization_accepts_exact_and_supergroup_ids() {
        let legacy = telegram(-5040590820);
        assert!(legacy.is_authorized_chat(-5040590820));
        assert!(legacy.is_authorized_chat(-1005040590820));
        assert!(!legacy.is_authorized_chat(-100504059082));
        assert!(!legacy.is_authorized_chat(5040590820));

        let supergroup = telegram(-1005040590820);
        assert!(supergroup.is_authorized_chat(-1005040590820));
        assert!(!supergroup.is_authorized_chat(-5040590820));
    }
}
