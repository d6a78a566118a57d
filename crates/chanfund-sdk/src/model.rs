//! Transaction model helpers.
//!
//! The value types themselves come from `bitcoin` (re-exported by
//! `bitcoincore-rpc`); this module adds the funding-specific pieces: the
//! unfunded template, output lookup, the hex codec used on the RPC boundary,
//! and the set of outpoints a transaction reserves.

use std::collections::BTreeSet;

use bitcoincore_rpc::bitcoin::absolute::LockTime;
use bitcoincore_rpc::bitcoin::consensus::encode::{self, VarInt};
use bitcoincore_rpc::bitcoin::transaction::Version;
use bitcoincore_rpc::bitcoin::{Amount, OutPoint, Script, Transaction, TxOut};

use crate::error::{Error, Result};

/// Build the unfunded transaction paying `amount` to `script`.
///
/// Version 2, no inputs, a single output and a zero locktime. Inputs and
/// change are added by the wallet service.
pub fn funding_template(script: &Script, amount: Amount) -> Transaction {
    Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: Vec::new(),
        output: vec![TxOut {
            value: amount,
            script_pubkey: script.to_owned(),
        }],
    }
}

/// Index of the first output paying exactly `amount` to `script`.
///
/// Funding and signing may reorder outputs or insert change on either side,
/// so the caller's output is found by value, never by position. If the same
/// pair appears more than once the lowest index wins.
pub fn find_output(tx: &Transaction, script: &Script, amount: Amount) -> Option<usize> {
    tx.output
        .iter()
        .position(|out| out.value == amount && out.script_pubkey.as_script() == script)
}

/// Hex-encode a transaction for the wallet service.
pub fn encode_hex(tx: &Transaction) -> String {
    if !tx.input.is_empty() {
        return encode::serialize_hex(tx);
    }
    // An input-less transaction must use the legacy layout: the segwit
    // marker would be read back as an empty input vector followed by a
    // witness section with nothing to attach to.
    let mut bytes = encode::serialize(&tx.version);
    bytes.extend(encode::serialize(&VarInt(0)));
    bytes.extend(encode::serialize(&tx.output));
    bytes.extend(encode::serialize(&tx.lock_time));
    hex::encode(bytes)
}

/// Decode a hex-encoded transaction returned by the wallet service.
pub fn decode_hex(tx_hex: &str) -> Result<Transaction> {
    let bytes = hex::decode(tx_hex.trim()).map_err(|e| Error::Decode(format!("bad hex: {e}")))?;
    encode::deserialize(&bytes).map_err(|e| Error::Decode(e.to_string()))
}

/// Outpoints spent by a transaction, i.e. the coins it keeps reserved.
///
/// Ordered and free of duplicates. Always derived from the input list and
/// never stored on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationSet {
    outpoints: BTreeSet<OutPoint>,
}

impl ReservationSet {
    pub fn from_transaction(tx: &Transaction) -> Self {
        Self {
            outpoints: tx.input.iter().map(|txin| txin.previous_output).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.outpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outpoints.is_empty()
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.outpoints.contains(outpoint)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutPoint> {
        self.outpoints.iter()
    }

    pub fn to_vec(&self) -> Vec<OutPoint> {
        self.outpoints.iter().copied().collect()
    }
}
