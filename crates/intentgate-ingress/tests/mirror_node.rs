//! Mirror-node client against a mocked REST API.

use std::time::Duration;

use httpmock::prelude::*;
use intentgate_ingress::{CollateralOracle, IdentityResolver, MirrorNodeClient};
use intentgate_types::{AccountId, IntentgateError, KeyType, MirrorConfig, Network, U256};
use serde_json::json;

const OWNER: AccountId = AccountId::new(0, 0, 4515);
const PUBKEY: &str = "02a1633cafcc01ebfb6d78e39f687a1f0995c62fc95f51ead10a02ee0be551b5dc";

fn client(server: &MockServer, timeout: Duration) -> MirrorNodeClient {
    let config = MirrorConfig {
        testnet_url: server.base_url(),
        spender_account: "0.0.777".into(),
        collateral_token: "0.0.456858".into(),
        ..MirrorConfig::default()
    };
    MirrorNodeClient::new(&config, timeout).unwrap()
}

#[tokio::test]
async fn resolves_registered_secp256k1_key() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/accounts/0.0.4515");
            then.status(200).json_body(json!({
                "account": "0.0.4515",
                "key": { "_type": "ECDSA_SECP256K1", "key": PUBKEY }
            }));
        })
        .await;

    let key = client(&server, Duration::from_secs(2))
        .resolve(Network::Testnet, OWNER)
        .await
        .unwrap()
        .unwrap();
    mock.assert_async().await;
    assert_eq!(key.key_type, KeyType::EcdsaSecp256k1);
    assert_eq!(hex::encode(&key.public_key), PUBKEY);
}

#[tokio::test]
async fn null_key_resolves_to_none() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/accounts/0.0.4515");
            then.status(200)
                .json_body(json!({ "account": "0.0.4515", "key": null }));
        })
        .await;

    let key = client(&server, Duration::from_secs(2))
        .resolve(Network::Testnet, OWNER)
        .await
        .unwrap();
    assert_eq!(key, None);
}

#[tokio::test]
async fn non_200_is_upstream_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/accounts/0.0.4515");
            then.status(404).json_body(json!({ "_status": { "messages": [] } }));
        })
        .await;

    let err = client(&server, Duration::from_secs(2))
        .resolve(Network::Testnet, OWNER)
        .await
        .unwrap_err();
    assert!(
        matches!(err, IntentgateError::UpstreamUnavailable { collaborator: "identity", .. }),
        "got {err:?}"
    );
    assert!(err.is_retryable());
}

#[tokio::test]
async fn malformed_json_is_upstream_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/accounts/0.0.4515");
            then.status(200).body("<html>gateway</html>");
        })
        .await;

    let err = client(&server, Duration::from_secs(2))
        .resolve(Network::Testnet, OWNER)
        .await
        .unwrap_err();
    assert!(matches!(err, IntentgateError::UpstreamUnavailable { .. }));
}

#[tokio::test]
async fn slow_mirror_is_upstream_timeout() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/accounts/0.0.4515");
            then.status(200)
                .delay(Duration::from_secs(2))
                .json_body(json!({ "key": null }));
        })
        .await;

    let err = client(&server, Duration::from_millis(200))
        .resolve(Network::Testnet, OWNER)
        .await
        .unwrap_err();
    assert!(
        matches!(err, IntentgateError::UpstreamTimeout { collaborator: "identity", .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn allowance_is_queried_for_spender_and_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/accounts/0.0.4515/allowances/tokens")
                .query_param("spender.id", "0.0.777")
                .query_param("token.id", "0.0.456858");
            then.status(200).json_body(json!({
                "allowances": [ { "amount": 5_000_000, "amount_granted": 10_000_000 } ],
                "links": { "next": null }
            }));
        })
        .await;

    let allowance = client(&server, Duration::from_secs(2))
        .allowance(Network::Testnet, OWNER)
        .await
        .unwrap();
    mock.assert_async().await;
    assert_eq!(allowance, U256::from(5_000_000u64));
}

#[tokio::test]
async fn missing_allowance_is_zero() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/accounts/0.0.4515/allowances/tokens");
            then.status(200)
                .json_body(json!({ "allowances": [], "links": { "next": null } }));
        })
        .await;

    let allowance = client(&server, Duration::from_secs(2))
        .allowance(Network::Testnet, OWNER)
        .await
        .unwrap();
    assert_eq!(allowance, U256::ZERO);
}

#[tokio::test]
async fn balance_reads_owner_entry() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/tokens/0.0.456858/balances")
                .query_param("account.id", "0.0.4515");
            then.status(200).json_body(json!({
                "timestamp": "1700000000.000000000",
                "balances": [ { "account": "0.0.4515", "balance": 12_340_000, "decimals": 6 } ]
            }));
        })
        .await;

    let balance = client(&server, Duration::from_secs(2))
        .balance(Network::Testnet, OWNER)
        .await
        .unwrap();
    mock.assert_async().await;
    assert_eq!(balance, U256::from(12_340_000u64));
}

#[tokio::test]
async fn balance_without_entry_is_zero() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/tokens/0.0.456858/balances");
            then.status(200).json_body(json!({ "balances": [] }));
        })
        .await;

    let balance = client(&server, Duration::from_secs(2))
        .balance(Network::Testnet, OWNER)
        .await
        .unwrap();
    assert_eq!(balance, U256::ZERO);
}

#[tokio::test]
async fn network_selects_base_url() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/accounts/0.0.4515");
            then.status(200).json_body(json!({ "key": null }));
        })
        .await;

    // Mainnet points at a closed port; only the testnet lookup reaches the mock.
    let config = MirrorConfig {
        mainnet_url: "http://127.0.0.1:9".into(),
        testnet_url: server.base_url(),
        ..MirrorConfig::default()
    };
    let client = MirrorNodeClient::new(&config, Duration::from_secs(2)).unwrap();
    assert!(client.resolve(Network::Testnet, OWNER).await.is_ok());
    assert!(client.resolve(Network::Mainnet, OWNER).await.is_err());
}
