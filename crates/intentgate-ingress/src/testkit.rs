//! Test helpers: a wallet that signs the way a conforming wallet does, a
//! submission builder, and fake collaborators that count their calls.

use std::{
    collections::HashMap,
    str::FromStr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use intentgate_sigverify::{digest, payload};
use intentgate_types::{
    AccountId, CancelOrderMessage, Intent, IntentSubmission, IntentgateError, KeyType, MarketId,
    Network, NewOrderMessage, Result, TxId, U256, constants,
};
use k256::ecdsa::{Signature, SigningKey, signature::hazmat::PrehashSigner};
use rust_decimal::Decimal;

use crate::{
    collaborators::{
        CollateralOracle, Collaborators, IdentityResolver, IntentForwarder, IntentRegistry,
        OrphanedIntent, PersistOutcome, PublishOutcome, ReconciliationSink, ResolvedKey,
    },
    registry::InMemoryIntentRegistry,
};

/// Account every default submission is made from.
pub const TEST_ACCOUNT: AccountId = AccountId::new(0, 0, 4515);

pub const TEST_EVM_ADDRESS: &str = "0x00000000000000000000000000000000000011a3";

/// Whole USD amount in collateral units.
#[must_use]
pub fn usd(dollars: u64) -> U256 {
    U256::from(dollars) * U256::from(10u64.pow(constants::COLLATERAL_DECIMALS))
}

/// USD cents in collateral units.
#[must_use]
pub fn usd_cents(cents: u64) -> U256 {
    U256::from(cents) * U256::from(10u64.pow(constants::COLLATERAL_DECIMALS - 2))
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

/// Deterministic secp256k1 wallet.
pub struct WalletSigner {
    key: SigningKey,
}

impl WalletSigner {
    /// Same seed, same key.
    ///
    /// # Panics
    /// Never for the seeds produced here: every one is a valid scalar.
    #[must_use]
    pub fn from_seed(seed: u8) -> Self {
        let mut secret = [0x42u8; 32];
        secret[31] = seed;
        let key = SigningKey::from_slice(&secret).expect("seeded secret is a valid scalar");
        Self { key }
    }

    #[must_use]
    pub fn public_key(&self) -> [u8; constants::COMPRESSED_PUBKEY_LEN] {
        let point = self.key.verifying_key().to_encoded_point(true);
        let mut out = [0u8; constants::COMPRESSED_PUBKEY_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    #[must_use]
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key())
    }

    /// The registration a mirror node would report for this wallet.
    #[must_use]
    pub fn registered_key(&self) -> ResolvedKey {
        ResolvedKey {
            key_type: KeyType::EcdsaSecp256k1,
            public_key: self.public_key().to_vec(),
        }
    }

    /// Frame, hash and sign a canonical payload.
    ///
    /// # Panics
    /// Panics if the signer rejects the digest, which k256 never does for a
    /// 32-byte prehash.
    #[must_use]
    pub fn sign_payload(&self, canonical: &str) -> [u8; constants::SIGNATURE_LEN] {
        let digest = digest::keccak256(&digest::frame(canonical));
        let signature: Signature = self
            .key
            .sign_prehash(&digest)
            .expect("32-byte prehash is always signable");
        let mut out = [0u8; constants::SIGNATURE_LEN];
        out.copy_from_slice(&signature.to_bytes());
        out
    }
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

/// Builds signed wire submissions with sensible defaults.
///
/// Defaults: a fresh transaction and market id, [`TEST_ACCOUNT`] on testnet,
/// buying 10 at $0.55 (collateral $5.50), generated now.
#[derive(Debug, Clone)]
pub struct SubmissionBuilder {
    tx_id: TxId,
    market_id: MarketId,
    account: AccountId,
    network: Network,
    price: String,
    quantity: String,
    generated_at: DateTime<Utc>,
}

impl Default for SubmissionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tx_id: TxId::new(),
            market_id: MarketId::new(),
            account: TEST_ACCOUNT,
            network: Network::Testnet,
            price: "0.55".to_string(),
            quantity: "10".to_string(),
            generated_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn tx_id(mut self, tx_id: TxId) -> Self {
        self.tx_id = tx_id;
        self
    }

    #[must_use]
    pub fn account(mut self, account: AccountId) -> Self {
        self.account = account;
        self
    }

    #[must_use]
    pub fn price(mut self, price: &str) -> Self {
        self.price = price.to_string();
        self
    }

    #[must_use]
    pub fn quantity(mut self, quantity: &str) -> Self {
        self.quantity = quantity.to_string();
        self
    }

    #[must_use]
    pub fn generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = at;
        self
    }

    /// Canonical payload a wallet would compute for these fields.
    ///
    /// # Panics
    /// Panics if price or quantity are not exact decimals with at most six
    /// fractional digits of notional.
    #[must_use]
    pub fn canonical_payload(&self) -> String {
        let price = Decimal::from_str(&self.price).expect("builder price is a decimal");
        let quantity = Decimal::from_str(&self.quantity).expect("builder quantity is a decimal");
        let collateral =
            payload::scaled_collateral(price, quantity).expect("builder collateral is exact");
        payload::encode(collateral, self.market_id.as_u128(), self.tx_id.as_u128()).to_string()
    }

    /// Sign with `wallet` and emit the wire form.
    #[must_use]
    pub fn sign_with(&self, wallet: &WalletSigner) -> IntentSubmission {
        let signature = wallet.sign_payload(&self.canonical_payload());
        IntentSubmission {
            tx_id: self.tx_id.to_string(),
            market_id: self.market_id.to_string(),
            account_id: self.account.to_string(),
            network: self.network.to_string(),
            price: self.price.clone(),
            quantity: self.quantity.clone(),
            generated_at: self.generated_at.to_rfc3339(),
            signature: hex::encode(signature),
            public_key: wallet.public_key_hex(),
            key_type: KeyType::EcdsaSecp256k1.to_string(),
            evm_address: TEST_EVM_ADDRESS.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Fake collaborators
// ---------------------------------------------------------------------------

/// Identity resolver over a fixed table. Unknown accounts behave like a
/// mirror-node 404.
#[derive(Default)]
pub struct FakeIdentity {
    keys: Mutex<HashMap<AccountId, Option<ResolvedKey>>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl FakeIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_key(self, account: AccountId, key: Option<ResolvedKey>) -> Self {
        lock(&self.keys).insert(account, key);
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityResolver for FakeIdentity {
    async fn resolve(&self, _network: Network, account: AccountId) -> Result<Option<ResolvedKey>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        lock(&self.keys)
            .get(&account)
            .cloned()
            .ok_or_else(|| IntentgateError::UpstreamUnavailable {
                collaborator: "identity",
                reason: format!("account {account} not found"),
            })
    }
}

/// Fixed allowance and balance for every account.
pub struct FakeCollateral {
    allowance: U256,
    balance: U256,
    calls: AtomicUsize,
}

impl FakeCollateral {
    #[must_use]
    pub fn new(allowance: U256, balance: U256) -> Self {
        Self {
            allowance,
            balance,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CollateralOracle for FakeCollateral {
    async fn allowance(&self, _network: Network, _owner: AccountId) -> Result<U256> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.allowance)
    }

    async fn balance(&self, _network: Network, _owner: AccountId) -> Result<U256> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.balance)
    }
}

/// Registry whose duplicate check never sees anything, so concurrent
/// admissions of one transaction id all reach persist. The inner registry's
/// uniqueness constraint is then the only thing standing between them.
#[derive(Default)]
pub struct StaleReadRegistry {
    inner: InMemoryIntentRegistry,
}

impl StaleReadRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl IntentRegistry for StaleReadRegistry {
    async fn exists(&self, _tx_id: TxId) -> Result<bool> {
        tokio::task::yield_now().await;
        Ok(false)
    }

    async fn persist(&self, intent: &Intent) -> Result<PersistOutcome> {
        self.inner.persist(intent).await
    }

    async fn owner_of(&self, tx_id: TxId) -> Result<Option<AccountId>> {
        self.inner.owner_of(tx_id).await
    }
}

/// Records everything published; can be switched to fail.
#[derive(Default)]
pub struct RecordingForwarder {
    published: Mutex<Vec<NewOrderMessage>>,
    cancelled: Mutex<Vec<CancelOrderMessage>>,
    failing: AtomicBool,
}

impl RecordingForwarder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<NewOrderMessage> {
        lock(&self.published).clone()
    }

    pub fn cancelled(&self) -> Vec<CancelOrderMessage> {
        lock(&self.cancelled).clone()
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(IntentgateError::UpstreamUnavailable {
                collaborator: "forwarder",
                reason: "broker connection refused".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl IntentForwarder for RecordingForwarder {
    async fn publish(&self, message: NewOrderMessage) -> Result<PublishOutcome> {
        self.check()?;
        lock(&self.published).push(message);
        Ok(PublishOutcome::Published)
    }

    async fn cancel(&self, message: CancelOrderMessage) -> Result<()> {
        self.check()?;
        lock(&self.cancelled).push(message);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingReconciliation {
    orphans: Mutex<Vec<OrphanedIntent>>,
}

impl RecordingReconciliation {
    pub fn orphans(&self) -> Vec<OrphanedIntent> {
        lock(&self.orphans).clone()
    }
}

#[async_trait]
impl ReconciliationSink for RecordingReconciliation {
    async fn report(&self, orphan: OrphanedIntent) {
        lock(&self.orphans).push(orphan);
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// A wallet registered on [`TEST_ACCOUNT`] with $1000 of allowance and
/// balance, plus handles on every fake so tests can inspect them.
pub struct TestWorld {
    pub wallet: WalletSigner,
    pub registry: Arc<InMemoryIntentRegistry>,
    pub identity: Arc<FakeIdentity>,
    pub collateral: Arc<FakeCollateral>,
    pub forwarder: Arc<RecordingForwarder>,
    pub reconciliation: Arc<RecordingReconciliation>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    #[must_use]
    pub fn new() -> Self {
        let wallet = WalletSigner::from_seed(1);
        let identity = FakeIdentity::new().with_key(TEST_ACCOUNT, Some(wallet.registered_key()));
        Self {
            wallet,
            registry: Arc::new(InMemoryIntentRegistry::new()),
            identity: Arc::new(identity),
            collateral: Arc::new(FakeCollateral::new(usd(1_000), usd(1_000))),
            forwarder: Arc::new(RecordingForwarder::new()),
            reconciliation: Arc::new(RecordingReconciliation::default()),
        }
    }

    #[must_use]
    pub fn with_identity(mut self, identity: FakeIdentity) -> Self {
        self.identity = Arc::new(identity);
        self
    }

    #[must_use]
    pub fn with_collateral(mut self, allowance: U256, balance: U256) -> Self {
        self.collateral = Arc::new(FakeCollateral::new(allowance, balance));
        self
    }

    #[must_use]
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            registry: self.registry.clone(),
            identity: self.identity.clone(),
            collateral: self.collateral.clone(),
            forwarder: self.forwarder.clone(),
            reconciliation: self.reconciliation.clone(),
        }
    }

    /// A signed submission from the registered wallet.
    #[must_use]
    pub fn submission(&self, builder: &SubmissionBuilder) -> IntentSubmission {
        builder.sign_with(&self.wallet)
    }
}
