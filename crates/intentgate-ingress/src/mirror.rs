//! Ledger mirror-node REST client.
//!
//! Serves both identity resolution and collateral lookups:
//!
//! | Lookup | Endpoint |
//! |---|---|
//! | registered key | `GET /api/v1/accounts/{account}` |
//! | allowance | `GET /api/v1/accounts/{owner}/allowances/tokens?spender.id=..&token.id=..` |
//! | balance | `GET /api/v1/tokens/{token}/balances?account.id=..` |
//!
//! Any non-200 status or undecodable body is `UpstreamUnavailable`. Missing
//! allowance or balance entries read as zero.

use std::time::Duration;

use async_trait::async_trait;
use intentgate_types::{
    AccountId, IntentgateError, KeyType, MirrorConfig, Network, Result, U256, constants,
};
use serde::{Deserialize, de::DeserializeOwned};

use crate::collaborators::{CollateralOracle, IdentityResolver, ResolvedKey};

/// DER `SubjectPublicKeyInfo` header some mirror versions put in front of a
/// compressed secp256k1 key.
const SECP256K1_DER_PREFIX: &str = "302d300706052b8104000a032200";

#[derive(Debug, Deserialize)]
struct AccountResponse {
    key: Option<KeyResponse>,
}

#[derive(Debug, Deserialize)]
struct KeyResponse {
    #[serde(rename = "_type")]
    key_type: String,
    key: String,
}

#[derive(Debug, Deserialize)]
struct AllowancesResponse {
    #[serde(default)]
    allowances: Vec<AllowanceEntry>,
}

#[derive(Debug, Deserialize)]
struct AllowanceEntry {
    amount: u64,
}

#[derive(Debug, Deserialize)]
struct BalancesResponse {
    #[serde(default)]
    balances: Vec<BalanceEntry>,
}

#[derive(Debug, Deserialize)]
struct BalanceEntry {
    account: AccountId,
    balance: u64,
}

/// HTTP client for the per-network mirror nodes.
#[derive(Debug, Clone)]
pub struct MirrorNodeClient {
    http: reqwest::Client,
    config: MirrorConfig,
    spender: AccountId,
    token: AccountId,
    timeout: Duration,
}

impl MirrorNodeClient {
    pub fn new(config: &MirrorConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", constants::SERVICE_NAME, constants::VERSION))
            .build()
            .map_err(|e| IntentgateError::Configuration(format!("http client: {e}")))?;
        Ok(Self {
            http,
            config: config.clone(),
            spender: config.spender()?,
            token: config.collateral_token()?,
            timeout,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        collaborator: &'static str,
        url: String,
        query: &[(&str, String)],
    ) -> Result<T> {
        let unavailable = |reason: String| IntentgateError::UpstreamUnavailable {
            collaborator,
            reason,
        };
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    IntentgateError::UpstreamTimeout {
                        collaborator,
                        after: self.timeout,
                    }
                } else {
                    unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("GET {url} returned {status}")));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| unavailable(format!("GET {url}: undecodable body: {e}")))
    }
}

/// Interpret the mirror's `key` object.
fn resolved_key(key: KeyResponse) -> Result<Option<ResolvedKey>> {
    let Ok(key_type) = key.key_type.parse::<KeyType>() else {
        tracing::warn!(key_type = %key.key_type, "unrecognised key type on account");
        return Ok(None);
    };
    let trimmed = key.key.trim();
    let digits = if key_type == KeyType::EcdsaSecp256k1 {
        trimmed.strip_prefix(SECP256K1_DER_PREFIX).unwrap_or(trimmed)
    } else {
        trimmed
    };
    let public_key = hex::decode(digits).map_err(|e| IntentgateError::UpstreamUnavailable {
        collaborator: "identity",
        reason: format!("key is not hex: {e}"),
    })?;
    Ok(Some(ResolvedKey {
        key_type,
        public_key,
    }))
}

#[async_trait]
impl IdentityResolver for MirrorNodeClient {
    async fn resolve(&self, network: Network, account: AccountId) -> Result<Option<ResolvedKey>> {
        let url = format!("{}/api/v1/accounts/{account}", self.config.base_url(network));
        let body: AccountResponse = self.get_json("identity", url, &[]).await?;
        match body.key {
            Some(key) => resolved_key(key),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CollateralOracle for MirrorNodeClient {
    async fn allowance(&self, network: Network, owner: AccountId) -> Result<U256> {
        let url = format!(
            "{}/api/v1/accounts/{owner}/allowances/tokens",
            self.config.base_url(network)
        );
        let query = [
            ("spender.id", self.spender.to_string()),
            ("token.id", self.token.to_string()),
        ];
        let body: AllowancesResponse = self.get_json("allowance", url, &query).await?;
        Ok(body
            .allowances
            .first()
            .map_or(U256::ZERO, |entry| U256::from(entry.amount)))
    }

    async fn balance(&self, network: Network, owner: AccountId) -> Result<U256> {
        let url = format!(
            "{}/api/v1/tokens/{}/balances",
            self.config.base_url(network),
            self.token
        );
        let query = [("account.id", owner.to_string())];
        let body: BalancesResponse = self.get_json("balance", url, &query).await?;
        Ok(body
            .balances
            .iter()
            .find(|entry| entry.account == owner)
            .map_or(U256::ZERO, |entry| U256::from(entry.balance)))
    }
}
