//! MyFantasyLeague export API client.
//!
//! Covers: login, league franchises, the player universe, trade and waiver
//! transactions, and live scoring. Every request is rate limited. A non-200
//! answer is surfaced as a transient `Error::Mfl`.

pub mod rate_limit;
pub mod types;

use async_trait::async_trait;
use common::config::MflConfig;
use common::{
    format_error_chain, Error, Franchise, LeagueSource, Player, RawMatchup, RawTrade, RawWaiver,
};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

pub use rate_limit::RateLimiter;
use types::{LeagueResponse, LiveScoringResponse, PlayersResponse, TransactionsResponse};

fn summarize_response_body(raw: &str) -> String {
    const MAX_CHARS: usize = 500;
    let compact = raw.replace(['\n', '\r'], " ");
    if compact.chars().count() > MAX_CHARS {
        let cut: String = compact.chars().take(MAX_CHARS).collect();
        format!("{cut}…")
    } else {
        compact
    }
}

/// Transaction filter accepted by `TYPE=transactions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Trade,
    Waiver,
}

impl TransactionType {
    fn as_param(&self) -> &'static str {
        match self {
            Self::Trade => "TRADE",
            Self::Waiver => "WAIVER",
        }
    }
}

/// Async client for one league in one season.
#[derive(Debug, Clone)]
pub struct MflClient {
    client: reqwest::Client,
    export_url: String,
    login_url: String,
    league_id: String,
    username: String,
    password: String,
    limiter: RateLimiter,
}

impl MflClient {
    pub fn new(cfg: &MflConfig) -> Self {
        let base = cfg.base_url.trim().trim_end_matches('/');

        // Login sets a session cookie that later export calls rely on.
        let client = reqwest::Client::builder()
            .user_agent("league-notifier/0.1")
            .cookie_store(true)
            .pool_max_idle_per_host(2)
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .expect("failed to build MFL HTTP client");

        Self {
            client,
            export_url: format!("{}/{}/export", base, cfg.year),
            login_url: format!("{}/{}/login", base, cfg.year),
            league_id: cfg.league_id.clone(),
            username: cfg.username.clone(),
            password: cfg.password.clone(),
            limiter: RateLimiter::per_second(cfg.requests_per_sec),
        }
    }

    /// Authenticate and keep the session cookie for later requests.
    pub async fn login(&self) -> Result<(), Error> {
        self.limiter.wait().await;

        let resp = self
            .client
            .get(&self.login_url)
            .query(&[
                ("USERNAME", self.username.as_str()),
                ("PASSWORD", self.password.as_str()),
                ("XML", "1"),
            ])
            .send()
            .await
            .map_err(|e| Error::Http(format_error_chain(&e)))?;

        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        if status != 200 || body.contains("<error") {
            return Err(Error::Mfl {
                status,
                message: format!("login rejected: {}", summarize_response_body(&body)),
            });
        }

        info!("Logged in to MFL as {}", self.username);
        Ok(())
    }

    /// GET `<base>/<year>/export?TYPE=<endpoint>&L=<league>&...&JSON=1`.
    async fn export<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        extra: &[(&str, &str)],
    ) -> Result<T, Error> {
        self.limiter.wait().await;

        let mut query: Vec<(&str, &str)> = vec![("TYPE", endpoint), ("L", self.league_id.as_str())];
        query.extend_from_slice(extra);
        query.push(("JSON", "1"));

        debug!("Fetching MFL export TYPE={} {:?}", endpoint, extra);

        let resp = self
            .client
            .get(&self.export_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::Http(format_error_chain(&e)))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::Http(format_error_chain(&e)))?;
        if status != 200 {
            return Err(Error::Mfl {
                status,
                message: summarize_response_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Mfl {
            status,
            message: format!(
                "unexpected {} payload ({}): {}",
                endpoint,
                e,
                summarize_response_body(&body)
            ),
        })
    }

    /// Completed transactions of one type. Without `days`, MFL returns its
    /// default lookback.
    pub async fn transactions<T: DeserializeOwned>(
        &self,
        kind: TransactionType,
        days: Option<u32>,
    ) -> Result<Vec<T>, Error> {
        let days = days.map(|d| d.to_string());
        let mut extra = vec![("TRANS_TYPE", kind.as_param())];
        if let Some(days) = days.as_deref() {
            extra.push(("DAYS", days));
        }
        let resp: TransactionsResponse<T> = self.export("transactions", &extra).await?;
        Ok(resp.transactions.transaction)
    }
}

#[async_trait]
impl LeagueSource for MflClient {
    async fn franchises(&self) -> Result<Vec<Franchise>, Error> {
        let resp: LeagueResponse = self.export("league", &[]).await?;
        let franchises: Vec<Franchise> = resp
            .league
            .franchises
            .map(|list| list.franchise)
            .unwrap_or_default()
            .into_iter()
            .map(Franchise::from)
            .collect();
        debug!("Fetched {} franchises", franchises.len());
        Ok(franchises)
    }

    async fn players(&self) -> Result<Vec<Player>, Error> {
        let resp: PlayersResponse = self.export("players", &[]).await?;
        let players: Vec<Player> = resp.players.player.into_iter().map(Player::from).collect();
        debug!("Fetched {} players", players.len());
        Ok(players)
    }

    async fn trades(&self) -> Result<Vec<RawTrade>, Error> {
        self.transactions(TransactionType::Trade, None).await
    }

    async fn waivers(&self) -> Result<Vec<RawWaiver>, Error> {
        self.transactions(TransactionType::Waiver, None).await
    }

    async fn live_scores(&self) -> Result<Vec<RawMatchup>, Error> {
        let resp: LiveScoringResponse = self.export("liveScoring", &[]).await?;
        debug!(
            "Live scoring week {}: {} matchups",
            resp.live_scoring.week.as_deref().unwrap_or("?"),
            resp.live_scoring.matchup.len()
        );
        Ok(resp.live_scoring.matchup)
    }
}
