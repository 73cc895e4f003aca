//! HTTP keeper store backed by the league REST API

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keeper_ledger::{KeeperLockState, ManualTrade, NewManualTrade, RosterId, SeasonYear};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::store::{KeeperSelection, KeeperStore, SavedKeepers, SeasonRoster};
use crate::{KeeperServiceError, Result};

/// League API client implementing [`KeeperStore`]
#[derive(Debug, Clone)]
pub struct HttpKeeperStore {
    config: ApiConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RostersResponse {
    #[serde(default)]
    rosters: Vec<SeasonRoster>,
}

#[derive(Debug, Deserialize)]
struct TradesResponse {
    #[serde(default)]
    trades: Vec<ManualTrade>,
}

#[derive(Debug, Deserialize)]
struct CreatedTrade {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "message")]
    error: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LockResponse {
    locked: bool,
    #[serde(default)]
    locked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct SaveKeepersRequest<'a> {
    keepers: &'a [KeeperSelection],
}

#[derive(Debug, Serialize)]
struct CreateTradeRequest<'a> {
    year: SeasonYear,
    from_roster_id: RosterId,
    to_roster_id: RosterId,
    amount: u32,
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct LockRequest {
    locked: bool,
}

impl HttpKeeperStore {
    /// Create a new client
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Map a non-2xx response to [`KeeperServiceError::Api`]
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.error)
            .unwrap_or_else(|_| if body.is_empty() { status.to_string() } else { body });
        tracing::error!(status = status.as_u16(), %message, "keeper API error");
        Err(KeeperServiceError::Api { status: status.as_u16(), message })
    }
}

#[async_trait]
impl KeeperStore for HttpKeeperStore {
    async fn season_rosters(&self, year: SeasonYear) -> Result<Vec<SeasonRoster>> {
        let url = self.url(&format!("/seasons/{}/keepers", year));
        tracing::debug!(%url, "fetching season rosters");
        let response = self.authorize(self.client.get(&url)).send().await?;
        let body: RostersResponse = Self::check(response).await?.json().await?;
        Ok(body.rosters)
    }

    async fn saved_keepers(&self, year: SeasonYear) -> Result<SavedKeepers> {
        let url = self.url(&format!("/keepers/{}", year));
        tracing::debug!(%url, "fetching saved keepers");
        let response = self.authorize(self.client.get(&url)).send().await?;

        // Seasons that were never saved have no rows
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(SavedKeepers::default());
        }
        Ok(Self::check(response).await?.json().await?)
    }

    async fn save_keepers(
        &self,
        year: SeasonYear,
        roster_id: RosterId,
        keepers: &[KeeperSelection],
    ) -> Result<()> {
        let url = self.url(&format!("/keepers/{}/{}", year, roster_id));
        let request = self.client.post(&url).json(&SaveKeepersRequest { keepers });
        let response = self.authorize(request).send().await?;
        Self::check(response).await?;
        tracing::info!(year, roster_id, count = keepers.len(), "keepers saved");
        Ok(())
    }

    async fn manual_trades(&self, year: SeasonYear) -> Result<Vec<ManualTrade>> {
        let url = self.url(&format!("/trades/{}", year));
        let response = self.authorize(self.client.get(&url)).send().await?;
        let body: TradesResponse = Self::check(response).await?.json().await?;
        Ok(body.trades)
    }

    async fn create_manual_trade(&self, trade: &NewManualTrade) -> Result<i64> {
        let url = self.url("/trades");
        let request = self.client.post(&url).json(&CreateTradeRequest {
            year: trade.year,
            from_roster_id: trade.from_roster_id,
            to_roster_id: trade.to_roster_id,
            amount: trade.amount,
            description: trade.note.as_deref().unwrap_or_default(),
        });
        let response = self.authorize(request).send().await?;
        let created: CreatedTrade = Self::check(response).await?.json().await?;
        tracing::info!(id = created.id, year = trade.year, "manual trade created");
        Ok(created.id)
    }

    async fn delete_manual_trade(&self, id: i64) -> Result<()> {
        let url = self.url(&format!("/trades/{}", id));
        let response = self.authorize(self.client.delete(&url)).send().await?;
        Self::check(response).await?;
        tracing::info!(id, "manual trade deleted");
        Ok(())
    }

    async fn set_keeper_lock(&self, year: SeasonYear, locked: bool) -> Result<KeeperLockState> {
        let url = self.url(&format!("/keepers/trade-lock/{}", year));
        let request = self.client.put(&url).json(&LockRequest { locked });
        let response = self.authorize(request).send().await?;
        let body: LockResponse = Self::check(response).await?.json().await?;
        Ok(KeeperLockState { locked: body.locked, locked_at: body.locked_at, updated_at: body.updated_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn store_for(server: &MockServer, token: Option<&str>) -> HttpKeeperStore {
        HttpKeeperStore::new(ApiConfig {
            base_url: format!("{}/api/", server.base_url()),
            auth_token: token.map(str::to_string),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_season_rosters_and_saved_keepers() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/seasons/2024/keepers");
                then.status(200).json_body(json!({
                    "rosters": [{
                        "roster_id": 1,
                        "manager_name": "Alice",
                        "team_name": "Team A",
                        "players": [{ "id": "p1", "name": "Pat", "draft_cost": 40 }]
                    }]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/keepers/2024");
                then.status(200).json_body(json!({
                    "keepers": [{ "roster_id": 1, "player_id": "p1", "player_name": "Pat", "trade_amount": null }],
                    "locked": false,
                    "lockedAt": null,
                    "updatedAt": null
                }));
            })
            .await;

        let store = store_for(&server, None);
        let rosters = store.season_rosters(2024).await.unwrap();
        assert_eq!(rosters.len(), 1);
        assert_eq!(rosters[0].players[0].draft_cost, Some(40));

        let saved = store.saved_keepers(2024).await.unwrap();
        assert_eq!(saved.keepers.len(), 1);
        assert!(!saved.locked);
    }

    #[tokio::test]
    async fn test_missing_prior_season_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/keepers/2023");
                then.status(404).json_body(json!({ "error": "Not found" }));
            })
            .await;

        let saved = store_for(&server, None).saved_keepers(2023).await.unwrap();
        assert!(saved.keepers.is_empty());
    }

    #[tokio::test]
    async fn test_save_keepers_posts_camel_case_payload_with_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/keepers/2024/3")
                    .header("authorization", "Bearer tok")
                    .json_body_partial(r#"{"keepers":[{"playerId":"p1","tradeFromRosterId":1,"tradeAmount":20}]}"#);
                then.status(200).json_body(json!({ "year": 2024, "rosterId": 3, "keepers": [] }));
            })
            .await;

        let selection = KeeperSelection {
            player_id: "p1".into(),
            player_name: "Pat".into(),
            previous_cost: Some(100),
            years_kept: 0,
            trade_from_roster_id: Some(1),
            trade_amount: Some(20),
            trade_note: None,
        };
        store_for(&server, Some("tok")).save_keepers(2024, 3, &[selection]).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_locked_save_surfaces_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/keepers/2024/1");
                then.status(403)
                    .json_body(json!({ "error": "Keeper selections are locked for this season" }));
            })
            .await;

        let err = store_for(&server, None).save_keepers(2024, 1, &[]).await.unwrap_err();
        match err {
            KeeperServiceError::Api { status, message } => {
                assert_eq!(status, 403);
                assert!(message.contains("locked"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_manual_trade_round_trip() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/trades")
                    .json_body_partial(r#"{"from_roster_id":1,"to_roster_id":2,"description":"buyout"}"#);
                then.status(201).json_body(json!({ "id": 17 }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/trades/2024");
                then.status(200).json_body(json!({
                    "trades": [{ "id": 17, "year": 2024, "from_roster_id": 1, "to_roster_id": 2, "amount": 15, "description": "buyout" }]
                }));
            })
            .await;
        let delete = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/trades/17");
                then.status(200).json_body(json!({ "message": "Trade deleted successfully" }));
            })
            .await;

        let store = store_for(&server, None);
        let trade = NewManualTrade {
            year: 2024,
            from_roster_id: 1,
            to_roster_id: 2,
            amount: 15,
            note: Some("buyout".into()),
        };
        assert_eq!(store.create_manual_trade(&trade).await.unwrap(), 17);
        let trades = store.manual_trades(2024).await.unwrap();
        assert_eq!(trades[0].note.as_deref(), Some("buyout"));
        store.delete_manual_trade(17).await.unwrap();
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn test_set_keeper_lock() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/keepers/trade-lock/2024").json_body(json!({ "locked": true }));
                then.status(200).json_body(json!({
                    "seasonYear": 2024,
                    "locked": true,
                    "lockedAt": "2024-08-20T18:00:00Z",
                    "updatedAt": "2024-08-20T18:00:00Z"
                }));
            })
            .await;

        let lock = store_for(&server, None).set_keeper_lock(2024, true).await.unwrap();
        assert!(lock.locked);
        assert!(lock.locked_at.is_some());
    }
}
