//! `WalletGateway` backed by a Bitcoin Core wallet over JSON-RPC.
//!
//! `bitcoincore-rpc` is a blocking client, so every request runs on the
//! tokio blocking pool and callers stay in async land. The client holds no
//! mutable state and is shared between requests through an `Arc`.

use std::sync::Arc;

use async_trait::async_trait;
use bitcoincore_rpc::bitcoin::address::NetworkUnchecked;
use bitcoincore_rpc::bitcoin::{Address, Amount, OutPoint, Transaction, Txid};
use bitcoincore_rpc::jsonrpc;
use bitcoincore_rpc::{Client, RpcApi};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::amount::{coins_to_amount, deserialize_coins};
use crate::config::GatewayConfig;
use crate::error::{Error, Rejection, Result};
use crate::gateway::{FundOptions, FundingResult, SigningResult, WalletGateway};
use crate::model::{decode_hex, encode_hex};
use crate::network::Network;

/// `RPC_INVALID_ADDRESS_OR_KEY`, returned by `getrawtransaction` for an
/// unknown txid.
const RPC_INVALID_ADDRESS_OR_KEY: i32 = -5;

pub struct BitcoinCoreGateway {
    client: Arc<Client>,
    network: Network,
}

impl BitcoinCoreGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let endpoint = config.endpoint();
        let client = Client::new(&endpoint, config.auth.clone().into_rpc())
            .map_err(|e| Error::Config(format!("{endpoint}: {e}")))?;
        log::debug!("wallet gateway for {} at {endpoint}", config.network);
        Ok(Self {
            client: Arc::new(client),
            network: config.network,
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Issue one RPC request on a blocking thread.
    async fn call<T>(&self, method: &'static str, params: Vec<Value>) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || {
            log::debug!("rpc: {method}");
            client.call::<T>(method, &params).map_err(map_rpc_error)
        })
        .await
        .map_err(|e| Error::Task(e.to_string()))?
    }
}

#[async_trait]
impl WalletGateway for BitcoinCoreGateway {
    async fn fund(&self, tx: &Transaction, options: FundOptions) -> Result<FundingResult> {
        let is_witness = tx.input.iter().any(|txin| !txin.witness.is_empty());
        let resp: FundRawTransactionResponse = self
            .call(
                "fundrawtransaction",
                vec![
                    json!(encode_hex(tx)),
                    fund_options(options),
                    json!(is_witness),
                ],
            )
            .await?;
        resp.into_funding_result()
    }

    async fn sign(&self, tx: &Transaction) -> Result<SigningResult> {
        let resp: SignRawTransactionResponse = self
            .call("signrawtransactionwithwallet", vec![json!(encode_hex(tx))])
            .await?;
        resp.into_signing_result()
    }

    async fn publish(&self, tx: &Transaction) -> Result<Txid> {
        let txid: String = self
            .call("sendrawtransaction", vec![json!(encode_hex(tx))])
            .await?;
        txid.parse()
            .map_err(|e| Error::Decode(format!("bad txid {txid}: {e}")))
    }

    async fn fetch_by_id(&self, txid: &Txid) -> Result<Transaction> {
        let tx_hex: String = self
            .call("getrawtransaction", vec![json!(txid.to_string())])
            .await
            .map_err(|e| map_lookup_error(e, *txid))?;
        decode_hex(&tx_hex)
    }

    async fn unlock_outpoints(&self, outpoints: &[OutPoint]) -> Result<bool> {
        self.call("lockunspent", vec![json!(true), outpoints_json(outpoints)])
            .await
    }

    async fn balance(&self) -> Result<Amount> {
        let coins: f64 = self.call("getbalance", Vec::new()).await?;
        coins_to_amount(coins)
    }

    async fn new_address(&self) -> Result<Address> {
        let address: String = self.call("getnewaddress", Vec::new()).await?;
        address
            .parse::<Address<NetworkUnchecked>>()
            .map_err(|e| Error::Address(format!("{address}: {e}")))?
            .require_network(self.network.into_bitcoin())
            .map_err(|e| Error::Address(format!("{address}: {e}")))
    }
}

// ── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct FundRawTransactionResponse {
    hex: String,
    #[serde(deserialize_with = "deserialize_coins")]
    fee: Amount,
    /// -1 when no change output was added.
    changepos: i64,
}

impl FundRawTransactionResponse {
    fn into_funding_result(self) -> Result<FundingResult> {
        Ok(FundingResult {
            transaction: decode_hex(&self.hex)?,
            change_position: usize::try_from(self.changepos).ok(),
            fee: self.fee,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SignRawTransactionResponse {
    hex: String,
    complete: bool,
    #[serde(default)]
    errors: Vec<SignInputError>,
}

#[derive(Debug, Deserialize)]
struct SignInputError {
    txid: String,
    vout: u32,
    error: String,
}

impl SignRawTransactionResponse {
    fn into_signing_result(self) -> Result<SigningResult> {
        Ok(SigningResult {
            transaction: decode_hex(&self.hex)?,
            complete: self.complete,
            errors: self
                .errors
                .into_iter()
                .map(|e| format!("{}:{}: {}", e.txid, e.vout, e.error))
                .collect(),
        })
    }
}

fn fund_options(options: FundOptions) -> Value {
    let mut opts = json!({ "lockUnspents": options.lock_inputs });
    if let Some(rate) = options.fee_rate {
        // sat/vB; 1 sat/kwu is 0.004 sat/vB so three decimals are exact.
        opts["fee_rate"] = json!(rate.to_sat_per_kwu() as f64 / 250.0);
    }
    opts
}

fn outpoints_json(outpoints: &[OutPoint]) -> Value {
    Value::Array(
        outpoints
            .iter()
            .map(|op| json!({ "txid": op.txid.to_string(), "vout": op.vout }))
            .collect(),
    )
}

/// Split client failures into structured service errors and everything else.
fn map_rpc_error(err: bitcoincore_rpc::Error) -> Error {
    match err {
        bitcoincore_rpc::Error::JsonRpc(jsonrpc::error::Error::Rpc(e)) => {
            Error::Rejected(Rejection {
                code: e.code,
                message: e.message,
            })
        }
        other => Error::Transport(other.to_string()),
    }
}

fn map_lookup_error(err: Error, txid: Txid) -> Error {
    match err {
        Error::Rejected(rejection) if rejection.code == RPC_INVALID_ADDRESS_OR_KEY => {
            Error::NotFound(txid)
        }
        other => other,
    }
}
