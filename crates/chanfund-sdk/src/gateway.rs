use async_trait::async_trait;
use bitcoincore_rpc::bitcoin::{Address, Amount, FeeRate, OutPoint, Transaction, Txid};

use crate::error::Result;

/// Options for [`WalletGateway::fund`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FundOptions {
    /// Reserve the selected inputs against concurrent funding requests.
    pub lock_inputs: bool,
    /// Target fee rate. `None` leaves the choice to the service's estimator.
    pub fee_rate: Option<FeeRate>,
}

/// Result of asking the service to add inputs and change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingResult {
    /// Still unsigned.
    pub transaction: Transaction,
    /// Index of the change output, if one was added.
    pub change_position: Option<usize>,
    pub fee: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningResult {
    pub transaction: Transaction,
    /// `false` if at least one input could not be signed.
    pub complete: bool,
    /// Per-input signing errors reported by the service.
    pub errors: Vec<String>,
}

/// The external wallet service that owns the coins.
///
/// Every method is a single request/response round trip. Implementations
/// must map a structured error object from the service to
/// [`Error::Rejected`](crate::Error::Rejected) and anything else that went
/// wrong on the way to [`Error::Transport`](crate::Error::Transport).
#[async_trait]
pub trait WalletGateway: Send + Sync {
    /// Add inputs (and possibly a change output) covering the outputs plus fee.
    async fn fund(&self, tx: &Transaction, options: FundOptions) -> Result<FundingResult>;

    /// Sign every input the service holds keys for.
    async fn sign(&self, tx: &Transaction) -> Result<SigningResult>;

    /// Broadcast a signed transaction and return its txid.
    async fn publish(&self, tx: &Transaction) -> Result<Txid>;

    /// Fetch a transaction from the service's mempool or chain view.
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) if the service
    /// has no record of it.
    async fn fetch_by_id(&self, txid: &Txid) -> Result<Transaction>;

    /// Release previously locked outpoints.
    async fn unlock_outpoints(&self, outpoints: &[OutPoint]) -> Result<bool>;

    /// Aggregate spendable balance.
    async fn balance(&self) -> Result<Amount>;

    /// A fresh receiving address from the service's key pool.
    async fn new_address(&self) -> Result<Address>;
}
