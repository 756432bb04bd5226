//! Filecoin chain queries over the Lotus JSON-RPC API.

use geokyc_types::ChainEpoch;
use serde::Deserialize;
use serde_json::json;

use crate::http::{check_status, map_send_error, with_retry, HttpSettings};
use crate::{ChainSource, ProviderError};

/// Public Lotus gateway.
pub const DEFAULT_LOTUS_URL: &str = "https://api.chain.love/rpc/v1";

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct TipSet {
    #[serde(rename = "Height")]
    height: u64,
}

#[derive(Debug, Deserialize)]
struct MinerPowerResponse {
    #[serde(rename = "MinerPower")]
    miner_power: Claim,
}

#[derive(Debug, Deserialize)]
struct Claim {
    #[serde(rename = "QualityAdjPower")]
    quality_adj_power: String,
}

/// JSON-RPC client for a Lotus node or gateway.
#[derive(Clone)]
pub struct LotusClient {
    http: reqwest::Client,
    url: String,
    settings: HttpSettings,
}

impl LotusClient {
    pub fn new(url: impl Into<String>, settings: HttpSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            http: settings.build_client()?,
            url: url.into(),
            settings,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a JSON-RPC request and return the `result` field.
    async fn rpc_call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, ProviderError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;
        let response = check_status(response).await?;
        let rpc: RpcResponse<T> = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("invalid JSON-RPC response to {method}: {e}"))
        })?;
        unwrap_rpc(method, rpc)
    }
}

fn unwrap_rpc<T>(method: &str, rpc: RpcResponse<T>) -> Result<T, ProviderError> {
    if let Some(err) = rpc.error {
        return Err(ProviderError::Rejected(format!(
            "{method} failed ({}): {}",
            err.code, err.message
        )));
    }
    rpc.result
        .ok_or_else(|| ProviderError::InvalidResponse(format!("{method} returned no result")))
}

fn parse_power(raw: &str) -> Result<u128, ProviderError> {
    raw.parse::<u128>()
        .map_err(|e| ProviderError::InvalidResponse(format!("invalid power value {raw:?}: {e}")))
}

impl ChainSource for LotusClient {
    async fn current_epoch(&self) -> Result<ChainEpoch, ProviderError> {
        let head: TipSet = with_retry(&self.settings.retry, "Filecoin.ChainHead", || {
            self.rpc_call("Filecoin.ChainHead", json!([]))
        })
        .await?;
        tracing::info!(height = head.height, "chain height");
        Ok(ChainEpoch::new(head.height))
    }

    async fn miner_power(&self, miner_id: &str) -> Result<u128, ProviderError> {
        let power: MinerPowerResponse =
            with_retry(&self.settings.retry, "Filecoin.StateMinerPower", || {
                self.rpc_call("Filecoin.StateMinerPower", json!([miner_id, null]))
            })
            .await?;
        let qa = parse_power(&power.miner_power.quality_adj_power)?;
        tracing::info!(miner = miner_id, quality_adj_power = %qa, "miner power");
        Ok(qa)
    }
}
