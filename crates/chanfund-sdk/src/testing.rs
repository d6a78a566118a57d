//! Test utilities: an in-memory [`WalletGateway`] with scriptable failures.
//!
//! `MockGateway` behaves like a small wallet service. It adds inputs from a
//! fixed coin list when funding, optionally inserts a change output, locks
//! what it selects, "signs" by attaching placeholder witnesses, and keeps a
//! mempool of published transactions for lookups. Every request is recorded
//! so tests can assert on the exact call sequence.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use bitcoincore_rpc::bitcoin::hashes::Hash;
use bitcoincore_rpc::bitcoin::{
    self, Address, Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid,
    WScriptHash, Witness,
};

use crate::error::{Error, Rejection, Result};
use crate::gateway::{FundOptions, FundingResult, SigningResult, WalletGateway};

/// A P2WSH script distinguished by `tag`.
pub fn test_script(tag: u8) -> ScriptBuf {
    ScriptBuf::new_p2wsh(&WScriptHash::from_byte_array([tag; 32]))
}

/// An outpoint whose txid is `tag` repeated.
pub fn test_outpoint(tag: u8, vout: u32) -> OutPoint {
    OutPoint::new(Txid::from_byte_array([tag; 32]), vout)
}

pub fn rejection(code: i32, message: &str) -> Error {
    Error::Rejected(Rejection {
        code,
        message: message.to_string(),
    })
}

/// A request as seen by [`MockGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Fund(FundOptions),
    Sign(Txid),
    Publish(Txid),
    FetchById(Txid),
    Unlock(Vec<OutPoint>),
    Balance,
    NewAddress,
}

struct MockState {
    calls: Vec<GatewayCall>,
    coins: Vec<OutPoint>,
    change: Option<(usize, TxOut)>,
    fee: Amount,
    fund_error: Option<Error>,
    sign_complete: bool,
    reverse_outputs_on_sign: bool,
    publish_error: Option<Error>,
    lookup_error: Option<Error>,
    mempool: HashMap<Txid, Transaction>,
    locked: BTreeSet<OutPoint>,
    unlock_result: bool,
    balance: Amount,
}

pub struct MockGateway {
    state: Mutex<MockState>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// A wallet holding two coins that funds without change.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                calls: Vec::new(),
                coins: vec![test_outpoint(0xa1, 0), test_outpoint(0xa2, 1)],
                change: None,
                fee: Amount::from_sat(1_410),
                fund_error: None,
                sign_complete: true,
                reverse_outputs_on_sign: false,
                publish_error: None,
                lookup_error: None,
                mempool: HashMap::new(),
                locked: BTreeSet::new(),
                unlock_result: true,
                balance: Amount::from_sat(150_000_000),
            }),
        }
    }

    fn with_state(self, f: impl FnOnce(&mut MockState)) -> Self {
        f(&mut self.state.lock().expect("mock state poisoned"));
        self
    }

    /// Coins added as inputs when funding.
    pub fn with_coins(self, coins: Vec<OutPoint>) -> Self {
        self.with_state(|s| s.coins = coins)
    }

    /// Insert a change output at `position` (clamped to the output count).
    pub fn with_change(self, position: usize, value: Amount, script: ScriptBuf) -> Self {
        self.with_state(|s| {
            s.change = Some((
                position,
                TxOut {
                    value,
                    script_pubkey: script,
                },
            ))
        })
    }

    pub fn with_fee(self, fee: Amount) -> Self {
        self.with_state(|s| s.fee = fee)
    }

    pub fn with_balance(self, balance: Amount) -> Self {
        self.with_state(|s| s.balance = balance)
    }

    pub fn failing_fund(self, err: Error) -> Self {
        self.with_state(|s| s.fund_error = Some(err))
    }

    /// Signing reports `complete = false`.
    pub fn incomplete_signing(self) -> Self {
        self.with_state(|s| s.sign_complete = false)
    }

    /// Signing returns the outputs in reverse order.
    pub fn reversing_outputs(self) -> Self {
        self.with_state(|s| s.reverse_outputs_on_sign = true)
    }

    pub fn failing_publish(self, err: Error) -> Self {
        self.with_state(|s| s.publish_error = Some(err))
    }

    /// Lookups of unknown txids fail with `err` instead of `NotFound`.
    pub fn failing_lookup(self, err: Error) -> Self {
        self.with_state(|s| s.lookup_error = Some(err))
    }

    /// Pretend `tx` already sits in the mempool.
    pub fn with_mempool_tx(self, tx: Transaction) -> Self {
        self.with_state(|s| {
            s.mempool.insert(tx.compute_txid(), tx);
        })
    }

    pub fn refusing_unlock(self) -> Self {
        self.with_state(|s| s.unlock_result = false)
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().expect("mock state poisoned").calls.clone()
    }

    pub fn locked(&self) -> BTreeSet<OutPoint> {
        self.state.lock().expect("mock state poisoned").locked.clone()
    }

    pub fn in_mempool(&self, txid: &Txid) -> bool {
        self.state
            .lock()
            .expect("mock state poisoned")
            .mempool
            .contains_key(txid)
    }

    fn record(&self, call: GatewayCall) -> std::sync::MutexGuard<'_, MockState> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.calls.push(call);
        state
    }
}

#[async_trait]
impl WalletGateway for MockGateway {
    async fn fund(&self, tx: &Transaction, options: FundOptions) -> Result<FundingResult> {
        let mut state = self.record(GatewayCall::Fund(options));
        if let Some(err) = &state.fund_error {
            return Err(err.clone());
        }
        if tx.output.is_empty() {
            return Err(rejection(-4, "Transaction must have at least one output"));
        }

        let mut funded = tx.clone();
        for coin in state.coins.clone() {
            funded.input.push(TxIn {
                previous_output: coin,
                script_sig: ScriptBuf::new(),
                sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
                witness: Witness::new(),
            });
            if options.lock_inputs {
                state.locked.insert(coin);
            }
        }

        let change_position = match &state.change {
            Some((position, change)) => {
                let position = (*position).min(funded.output.len());
                funded.output.insert(position, change.clone());
                Some(position)
            }
            None => None,
        };

        Ok(FundingResult {
            transaction: funded,
            change_position,
            fee: state.fee,
        })
    }

    async fn sign(&self, tx: &Transaction) -> Result<SigningResult> {
        let state = self.record(GatewayCall::Sign(tx.compute_txid()));
        let mut signed = tx.clone();
        for txin in &mut signed.input {
            txin.witness = Witness::from_slice(&[vec![0x30; 71], vec![0x02; 33]]);
        }
        if state.reverse_outputs_on_sign {
            signed.output.reverse();
        }
        let errors = if state.sign_complete {
            Vec::new()
        } else {
            vec!["Unable to sign input, missing key".to_string()]
        };
        Ok(SigningResult {
            transaction: signed,
            complete: state.sign_complete,
            errors,
        })
    }

    async fn publish(&self, tx: &Transaction) -> Result<Txid> {
        let txid = tx.compute_txid();
        let mut state = self.record(GatewayCall::Publish(txid));
        if let Some(err) = &state.publish_error {
            return Err(err.clone());
        }
        state.mempool.insert(txid, tx.clone());
        Ok(txid)
    }

    async fn fetch_by_id(&self, txid: &Txid) -> Result<Transaction> {
        let state = self.record(GatewayCall::FetchById(*txid));
        match state.mempool.get(txid) {
            Some(tx) => Ok(tx.clone()),
            None => Err(state.lookup_error.clone().unwrap_or(Error::NotFound(*txid))),
        }
    }

    async fn unlock_outpoints(&self, outpoints: &[OutPoint]) -> Result<bool> {
        let mut state = self.record(GatewayCall::Unlock(outpoints.to_vec()));
        if !state.unlock_result {
            return Ok(false);
        }
        for outpoint in outpoints {
            state.locked.remove(outpoint);
        }
        Ok(true)
    }

    async fn balance(&self) -> Result<Amount> {
        Ok(self.record(GatewayCall::Balance).balance)
    }

    async fn new_address(&self) -> Result<Address> {
        drop(self.record(GatewayCall::NewAddress));
        Ok(Address::p2wsh(&test_script(0xee), bitcoin::Network::Regtest))
    }
}
