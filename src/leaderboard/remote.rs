//! HTTP leaderboard (WASM only)
//!
//! Talks to two serverless functions:
//! - `POST {base}/submit-score` with `{mode, name, score}`
//! - `GET {base}/get-leaderboard?mode=<mode>` returning `{leaderboard: [{name, score}]}`
//!
//! The functions have no notion of player names, so every name is available.

use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::{LeaderboardBackend, LeaderboardEntry, LeaderboardError, ScoreRow};
use crate::sim::Mode;

#[derive(Serialize)]
struct SubmitBody<'a> {
    mode: &'a str,
    name: &'a str,
    score: u64,
}

#[derive(Deserialize)]
struct LeaderboardResponse {
    leaderboard: Vec<ScoreRow>,
}

fn js_err(e: JsValue) -> LeaderboardError {
    LeaderboardError::Network(format!("{:?}", e))
}

/// Leaderboard behind HTTP functions
#[derive(Debug, Clone)]
pub struct RemoteLeaderboard {
    base_url: String,
}

impl RemoteLeaderboard {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// Send a request and return the response body
    async fn send(&self, request: Request) -> Result<String, LeaderboardError> {
        let window =
            web_sys::window().ok_or_else(|| LeaderboardError::Network("no window".into()))?;
        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_err)?;
        let response: Response = response.dyn_into().map_err(js_err)?;
        if !response.ok() {
            return Err(LeaderboardError::Rejected(response.status()));
        }
        let body = JsFuture::from(response.text().map_err(js_err)?)
            .await
            .map_err(js_err)?;
        Ok(body.as_string().unwrap_or_default())
    }
}

impl LeaderboardBackend for RemoteLeaderboard {
    async fn submit(&self, entry: &LeaderboardEntry) -> Result<(), LeaderboardError> {
        let body = serde_json::to_string(&SubmitBody {
            mode: entry.mode.as_str(),
            name: &entry.name,
            score: entry.score,
        })?;

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        opts.set_body(&JsValue::from_str(&body));
        let url = format!("{}/submit-score", self.base_url);
        let request = Request::new_with_str_and_init(&url, &opts).map_err(js_err)?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(js_err)?;

        self.send(request).await.map(|_| ())
    }

    async fn top_scores(
        &self,
        mode: Mode,
        limit: usize,
    ) -> Result<Vec<ScoreRow>, LeaderboardError> {
        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::Cors);
        let url = format!("{}/get-leaderboard?mode={}", self.base_url, mode.as_str());
        let request = Request::new_with_str_and_init(&url, &opts).map_err(js_err)?;

        let body = self.send(request).await?;
        let mut rows = serde_json::from_str::<LeaderboardResponse>(&body)?.leaderboard;
        rows.truncate(limit);
        Ok(rows)
    }

    async fn is_name_available(&self, _name: &str) -> Result<bool, LeaderboardError> {
        Ok(true)
    }

    async fn register_name(&self, _name: &str) -> Result<(), LeaderboardError> {
        Ok(())
    }
}
