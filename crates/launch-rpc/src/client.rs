use anyhow::Context;
use async_trait::async_trait;
use launch_core::{LedgerQuery, SignatureRecord};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::models::{RpcRequest, RpcResponse, SignatureInfo, TransactionEnvelope};

pub const DEFAULT_HOST: &str = "https://mainnet.helius-rpc.com";

/// Explicit connection configuration. The caller reads the credential from
/// wherever it lives (environment, flag) and passes it in; this crate never
/// touches the process environment.
#[derive(Clone, Debug)]
pub struct HeliusConfig {
    pub api_key: String,
    pub commitment: String,
}

impl HeliusConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            commitment: "confirmed".to_string(),
        }
    }

    pub fn with_commitment(mut self, commitment: impl Into<String>) -> Self {
        self.commitment = commitment.into();
        self
    }
}

/// JSON-RPC client for the Helius mainnet endpoint. Stateless between calls;
/// recovery from transient failures belongs to the caller's retry policy.
pub struct HeliusClient {
    client: Client,
    endpoint: String,
    commitment: String,
}

impl HeliusClient {
    pub fn new(config: HeliusConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint_url(DEFAULT_HOST, &config.api_key),
            commitment: config.commitment,
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> anyhow::Result<Option<T>> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .context("send rpc request")?
            .error_for_status()
            .context("rpc response status")?;
        let payload: RpcResponse<T> = response.json().await.context("decode rpc response")?;
        if let Some(error) = payload.error {
            anyhow::bail!("rpc error {}: {}", error.code, error.message);
        }
        Ok(payload.result)
    }
}

#[async_trait]
impl LedgerQuery for HeliusClient {
    async fn signatures_for_address(
        &self,
        address: &str,
        limit: usize,
        before: Option<&str>,
    ) -> anyhow::Result<Vec<SignatureRecord>> {
        debug!(address, limit, before = before.unwrap_or("-"), "listing signatures");
        let params = signatures_params(address, limit, before, &self.commitment);
        let infos: Vec<SignatureInfo> = self
            .call("getSignaturesForAddress", params)
            .await?
            .context("missing result for getSignaturesForAddress")?;
        Ok(infos.into_iter().map(SignatureRecord::from).collect())
    }

    async fn transaction_block_time(
        &self,
        signature: &str,
    ) -> anyhow::Result<Option<Option<i64>>> {
        debug!(signature, "fetching transaction");
        let params = transaction_params(signature, &self.commitment);
        let tx: Option<TransactionEnvelope> = self.call("getTransaction", params).await?;
        Ok(tx.map(|tx| tx.block_time))
    }
}

fn endpoint_url(host: &str, api_key: &str) -> String {
    format!("{host}/?api-key={api_key}")
}

fn signatures_params(address: &str, limit: usize, before: Option<&str>, commitment: &str) -> Value {
    let mut config = json!({ "limit": limit, "commitment": commitment });
    if let Some(before) = before {
        config["before"] = json!(before);
    }
    json!([address, config])
}

fn transaction_params(signature: &str, commitment: &str) -> Value {
    json!([
        signature,
        { "commitment": commitment, "maxSupportedTransactionVersion": 0 }
    ])
}
