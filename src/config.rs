//! Configuration loader: defaults, config.toml, .env, then environment.

use std::path::Path;

use common::{Error, NotifierConfig};

fn parse_positive_u32(raw: &str, env_name: &str) -> Result<u32, Error> {
    match raw.trim().parse::<u32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(Error::Config(format!("{env_name} must be an integer > 0"))),
    }
}

fn parse_positive_i64(raw: &str, env_name: &str) -> Result<i64, Error> {
    match raw.trim().parse::<i64>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(Error::Config(format!("{env_name} must be an integer > 0"))),
    }
}

fn parse_non_negative_f64(raw: &str, env_name: &str) -> Result<f64, Error> {
    let parsed = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::Config(format!("{env_name} must be a number >= 0")))?;
    if parsed < 0.0 {
        return Err(Error::Config(format!("{env_name} must be a number >= 0")));
    }
    Ok(parsed)
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_config(config: &NotifierConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.mfl.base_url.trim().is_empty() {
        issues.push("mfl.base_url must not be empty".into());
    }
    if config.mfl.requests_per_sec == 0 {
        issues.push("mfl.requests_per_sec must be > 0".into());
    }
    if config.groupme.base_url.trim().is_empty() {
        issues.push("groupme.base_url must not be empty".into());
    }
    if config.groupme.character_limit == 0 {
        issues.push("groupme.character_limit must be > 0".into());
    }
    if config.store.db_path.trim().is_empty() {
        issues.push("store.db_path must not be empty".into());
    }
    if config.store.queue_name.trim().is_empty() {
        issues.push("store.queue_name must not be empty".into());
    }
    if config.policy.recency_window_secs <= 0 {
        issues.push("policy.recency_window_secs must be > 0".into());
    }
    if config.policy.close_game_margin.is_nan() || config.policy.close_game_margin < 0.0 {
        issues.push("policy.close_game_margin must be a number >= 0".into());
    }
    if config.policy.delivery_batch_size == 0 {
        issues.push("policy.delivery_batch_size must be > 0".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Settings every upstream call needs. Checked only by commands that talk to
/// MFL.
pub fn require_mfl(config: &NotifierConfig) -> Result<(), Error> {
    let mut missing = Vec::new();
    if config.mfl.league_id.is_empty() {
        missing.push("MFL_LEAGUEID");
    }
    if config.mfl.year.is_empty() {
        missing.push("MFL_API_YEAR");
    }
    if config.mfl.username.is_empty() {
        missing.push("MFL_USERNAME");
    }
    if config.mfl.password.is_empty() {
        missing.push("MFL_PASSWORD");
    }
    require(missing)
}

pub fn require_groupme(config: &NotifierConfig) -> Result<(), Error> {
    let mut missing = Vec::new();
    if config.groupme.bot_id.is_empty() {
        missing.push("GROUPME_BOT_ID");
    }
    require(missing)
}

fn require(missing: Vec<&str>) -> Result<(), Error> {
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{} required (set in .env or environment)",
            missing.join(", ")
        )))
    }
}

/// Apply environment overrides (highest priority).
fn apply_env(config: &mut NotifierConfig) -> Result<(), Error> {
    if let Some(v) = env_string("MFL_USERNAME") {
        config.mfl.username = v;
    }
    if let Some(v) = env_string("MFL_PASSWORD") {
        config.mfl.password = v;
    }
    if let Some(v) = env_string("MFL_LEAGUEID") {
        config.mfl.league_id = v;
    }
    if let Some(v) = env_string("MFL_API_YEAR") {
        config.mfl.year = v;
    }
    if let Some(v) = env_string("MFL_BASE_URL") {
        config.mfl.base_url = v;
    }
    if let Some(v) = env_string("MFL_REQUESTS_PER_SEC") {
        config.mfl.requests_per_sec = parse_positive_u32(&v, "MFL_REQUESTS_PER_SEC")?;
    }
    if let Some(v) = env_string("GROUPME_API_KEY") {
        config.groupme.api_key = v;
    }
    if let Some(v) = env_string("GROUPME_BOT_ID") {
        config.groupme.bot_id = v;
    }
    if let Some(v) = env_string("GROUPME_BASE_URL") {
        config.groupme.base_url = v;
    }
    if let Some(v) = env_string("NOTIFIER_DB_PATH") {
        config.store.db_path = v;
    }
    if let Some(v) = env_string("NOTIFIER_QUEUE_NAME") {
        config.store.queue_name = v;
    }
    if let Some(v) = env_string("NOTIFIER_RECENCY_WINDOW_SECS") {
        config.policy.recency_window_secs =
            parse_positive_i64(&v, "NOTIFIER_RECENCY_WINDOW_SECS")?;
    }
    if let Some(v) = env_string("NOTIFIER_CLOSE_GAME_MARGIN") {
        config.policy.close_game_margin = parse_non_negative_f64(&v, "NOTIFIER_CLOSE_GAME_MARGIN")?;
    }
    Ok(())
}

/// Load notifier configuration. `path` defaults to `config.toml`; a missing
/// default file is fine, a missing explicit one is not.
pub fn load_config(path: Option<&Path>) -> Result<NotifierConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = NotifierConfig::default();

    // 3. Config file, if any.
    let config_path = path.unwrap_or_else(|| Path::new("config.toml"));
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", config_path.display(), e))
        })?;
        config = toml::from_str(&contents).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", config_path.display(), e))
        })?;
    } else if path.is_some() {
        return Err(Error::Config(format!(
            "Config file {} not found",
            config_path.display()
        )));
    }

    // 4. Environment variables.
    apply_env(&mut config)?;

    validate_config(&config)?;
    Ok(config)
}
