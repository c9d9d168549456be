//! Configuration types for an IntentGate node.

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{AccountId, IntentgateError, Network, Result, constants};

/// Top-level admission configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// How far in the past an intent's generation timestamp may lie.
    pub past_window_secs: u64,
    /// How far in the future an intent's generation timestamp may lie.
    pub future_window_secs: u64,
    /// Bound applied to every collaborator call.
    pub upstream_timeout_ms: u64,
    /// Ledger mirror-node settings.
    pub mirror: MirrorConfig,
    /// Matching-engine forwarding settings.
    pub forwarder: ForwarderConfig,
    /// Emit JSON log lines instead of human-readable ones.
    pub log_json: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            past_window_secs: constants::DEFAULT_PAST_WINDOW_SECS,
            future_window_secs: constants::DEFAULT_FUTURE_WINDOW_SECS,
            upstream_timeout_ms: constants::DEFAULT_UPSTREAM_TIMEOUT_MS,
            mirror: MirrorConfig::default(),
            forwarder: ForwarderConfig::default(),
            log_json: false,
        }
    }
}

impl GateConfig {
    /// Load from a JSON file. Missing keys fall back to defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    #[must_use]
    pub fn past_window(&self) -> Duration {
        Duration::from_secs(self.past_window_secs)
    }

    #[must_use]
    pub fn future_window(&self) -> Duration {
        Duration::from_secs(self.future_window_secs)
    }

    #[must_use]
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.upstream_timeout_ms == 0 {
            return Err(IntentgateError::Configuration(
                "upstream_timeout_ms must be > 0".into(),
            ));
        }
        if self.forwarder.channel_capacity == 0 || self.forwarder.dedup_capacity == 0 {
            return Err(IntentgateError::Configuration(
                "forwarder capacities must be > 0".into(),
            ));
        }
        self.mirror.spender()?;
        self.mirror.collateral_token()?;
        for network in Network::ALL {
            let url = self.mirror.base_url(network);
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(IntentgateError::Configuration(format!(
                    "mirror URL for {network} must be http(s): {url}"
                )));
            }
        }
        Ok(())
    }
}

/// Mirror-node endpoints and the collateral token being spent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    pub mainnet_url: String,
    pub testnet_url: String,
    pub previewnet_url: String,
    /// Account (settlement contract) the allowance is granted to.
    pub spender_account: String,
    /// Token id of the USD collateral token.
    pub collateral_token: String,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            mainnet_url: "https://mainnet-public.mirrornode.hedera.com".to_string(),
            testnet_url: "https://testnet.mirrornode.hedera.com".to_string(),
            previewnet_url: "https://previewnet.mirrornode.hedera.com".to_string(),
            spender_account: "0.0.0".to_string(),
            collateral_token: "0.0.0".to_string(),
        }
    }
}

impl MirrorConfig {
    /// Base URL for a network, without trailing slash.
    #[must_use]
    pub fn base_url(&self, network: Network) -> &str {
        let url = match network {
            Network::Mainnet => &self.mainnet_url,
            Network::Testnet => &self.testnet_url,
            Network::Previewnet => &self.previewnet_url,
        };
        url.trim_end_matches('/')
    }

    pub fn spender(&self) -> Result<AccountId> {
        AccountId::parse_field("spender_account", &self.spender_account)
            .map_err(|e| IntentgateError::Configuration(e.to_string()))
    }

    /// Token ids share the account id shape.
    pub fn collateral_token(&self) -> Result<AccountId> {
        AccountId::parse_field("collateral_token", &self.collateral_token)
            .map_err(|e| IntentgateError::Configuration(e.to_string()))
    }
}

/// Forwarding channel sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwarderConfig {
    pub channel_capacity: usize,
    pub dedup_capacity: usize,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            channel_capacity: constants::DEFAULT_CHANNEL_CAPACITY,
            dedup_capacity: constants::DEFAULT_PUBLISH_DEDUP_CAPACITY,
        }
    }
}
