//! # Ledger Payloads
//!
//! Wire shapes returned by the ledger explorer API and their conversion into
//! the internal `Block` / `CommitteeMember` / `PendingTransaction` types.
//!
//! Every field is optional on the wire; the conversion step decides what is
//! required and fails with a validation error otherwise.

use std::collections::BTreeMap;

use serde::de::IgnoredAny;
use serde::Deserialize;
use shared_types::{
    Address, Block, BlockTransaction, CommitteeMember, Height, PendingTransaction, U256,
};

use super::errors::LedgerError;

/// A number the API may send either as JSON integer or as decimal string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    /// JSON integer.
    Int(u64),
    /// Decimal string, optionally suffixed with a unit (`"100u64"`).
    Text(String),
}

impl Numeric {
    /// Value as `u64`, if representable.
    pub fn to_u64(&self) -> Option<u64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Text(s) => strip_unit(s)?.parse().ok(),
        }
    }

    /// Value as an arbitrary precision amount.
    pub fn to_u256(&self) -> Option<U256> {
        match self {
            Self::Int(v) => Some(U256::from(*v)),
            Self::Text(s) => U256::from_dec_str(strip_unit(s)?).ok(),
        }
    }
}

fn strip_unit(s: &str) -> Option<&str> {
    let s = s.trim();
    let digits = s
        .find(|c: char| !c.is_ascii_digit())
        .map(|idx| &s[..idx])
        .unwrap_or(s);
    (!digits.is_empty()).then_some(digits)
}

/// Fee field: an amount when the API flattened it, anything else is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FeeField {
    /// Plain amount.
    Amount(Numeric),
    /// Structured fee transition (not an amount).
    Other(IgnoredAny),
}

impl FeeField {
    fn amount(&self) -> Option<U256> {
        match self {
            Self::Amount(n) => n.to_u256(),
            Self::Other(_) => None,
        }
    }
}

/// Block as returned by `GET /block/{height}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiBlock {
    /// Block hash.
    pub block_hash: Option<String>,
    /// Previous block hash.
    pub previous_hash: Option<String>,
    /// Header with metadata.
    pub header: Option<ApiHeader>,
    /// Confirmed transactions.
    #[serde(default)]
    pub transactions: Vec<ApiConfirmedTransaction>,
    /// Block authority (beacon signature or quorum subdag).
    pub authority: Option<ApiAuthority>,
}

/// Block header.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiHeader {
    /// Header metadata.
    pub metadata: Option<ApiMetadata>,
}

/// Block header metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMetadata {
    /// Block height.
    pub height: Option<Numeric>,
    /// Unix timestamp in seconds.
    pub timestamp: Option<Numeric>,
}

/// A confirmed transaction entry of a block.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfirmedTransaction {
    /// The transaction itself.
    pub transaction: Option<ApiTransaction>,
    /// Flattened fee, when the explorer provides one.
    pub fee: Option<FeeField>,
}

/// A transaction body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTransaction {
    /// Transaction id.
    pub id: Option<String>,
    /// Transaction type.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Fee; a plain amount on some endpoints, a fee transition on others.
    pub fee: Option<FeeField>,
}

/// Block authority.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiAuthority {
    /// `beacon` or `quorum`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Quorum subdag.
    pub subdag: Option<ApiSubdag>,
}

/// Subdag wrapper: round -> batch certificates.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSubdag {
    /// Certificates keyed by round number.
    #[serde(default)]
    pub subdag: BTreeMap<String, Vec<ApiBatchCertificate>>,
}

/// A batch certificate.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiBatchCertificate {
    /// Batch header.
    pub batch_header: Option<ApiBatchHeader>,
}

/// A batch header.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiBatchHeader {
    /// Author address.
    pub author: Option<String>,
}

/// Committee as returned by `GET /committee/latest`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCommittee {
    /// Members keyed by address.
    #[serde(default)]
    pub members: BTreeMap<String, ApiCommitteeEntry>,
}

/// A committee member entry: `[stake, is_open, commission]` or `[stake, is_open]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiCommitteeEntry {
    /// Entry with commission.
    Full(Numeric, bool, u64),
    /// Legacy entry without commission.
    Pair(Numeric, bool),
}

impl ApiCommitteeEntry {
    fn stake(&self) -> &Numeric {
        match self {
            Self::Full(stake, _, _) | Self::Pair(stake, _) => stake,
        }
    }

    fn is_open(&self) -> bool {
        match self {
            Self::Full(_, open, _) | Self::Pair(_, open) => *open,
        }
    }
}

// =============================================================================
// CONVERSION
// =============================================================================

/// Convert an API block into the internal `Block`.
///
/// Required: height, hash, timestamp and an id for every transaction.
/// The producer is the author of the first batch in the lowest subdag round;
/// a beacon block has no producer.
pub fn convert_block(api: ApiBlock) -> Result<Block, LedgerError> {
    let metadata = api.header.as_ref().and_then(|h| h.metadata.as_ref());

    let height = metadata
        .and_then(|m| m.height.as_ref())
        .and_then(Numeric::to_u64)
        .ok_or_else(|| invalid(None, "missing or malformed height"))?;

    let hash = api
        .block_hash
        .filter(|h| !h.is_empty())
        .ok_or_else(|| invalid(Some(height), "missing block hash"))?;

    let timestamp = metadata
        .and_then(|m| m.timestamp.as_ref())
        .and_then(Numeric::to_u64)
        .ok_or_else(|| invalid(Some(height), "missing or malformed timestamp"))?;

    let mut transactions = Vec::with_capacity(api.transactions.len());
    for (index, entry) in api.transactions.iter().enumerate() {
        let tx = entry.transaction.as_ref();
        let id = tx
            .and_then(|t| t.id.clone())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| invalid(Some(height), &format!("transaction {index} has no id")))?;
        let fee = entry
            .fee
            .as_ref()
            .and_then(FeeField::amount)
            .or_else(|| tx.and_then(|t| t.fee.as_ref()).and_then(FeeField::amount))
            .unwrap_or_default();
        transactions.push(BlockTransaction { id, fee, timestamp });
    }

    let total_fees = transactions
        .iter()
        .fold(U256::zero(), |acc, tx| acc.saturating_add(tx.fee));

    Ok(Block {
        height,
        hash,
        previous_hash: api.previous_hash.unwrap_or_default(),
        timestamp,
        validator_address: api.authority.as_ref().and_then(producer_of),
        total_fees,
        transactions,
    })
}

fn producer_of(authority: &ApiAuthority) -> Option<Address> {
    let subdag = authority.subdag.as_ref()?;
    subdag
        .subdag
        .iter()
        .filter_map(|(round, certs)| round.parse::<u64>().ok().map(|r| (r, certs)))
        .min_by_key(|(round, _)| *round)
        .and_then(|(_, certs)| certs.first())
        .and_then(|cert| cert.batch_header.as_ref())
        .and_then(|header| header.author.clone())
        .filter(|author| !author.is_empty())
        .map(Address::from)
}

fn invalid(height: Option<Height>, reason: &str) -> LedgerError {
    LedgerError::InvalidBlock {
        height,
        reason: reason.to_string(),
    }
}

/// Convert a committee payload into members. Bonded equals stake on this ledger.
pub fn convert_committee(api: ApiCommittee) -> Result<Vec<CommitteeMember>, LedgerError> {
    api.members
        .into_iter()
        .map(|(address, entry)| {
            let stake = entry.stake().to_u64().ok_or_else(|| {
                LedgerError::InvalidCommittee(format!("malformed stake for {address}"))
            })?;
            Ok(CommitteeMember {
                address: Address::new(address),
                stake,
                is_active: entry.is_open(),
                bonded: stake,
            })
        })
        .collect()
}

/// Convert mempool entries into pending transactions.
pub fn convert_mempool(api: Vec<ApiTransaction>) -> Result<Vec<PendingTransaction>, LedgerError> {
    api.into_iter()
        .enumerate()
        .map(|(index, tx)| {
            let id = tx
                .id
                .filter(|id| !id.is_empty())
                .ok_or_else(|| LedgerError::InvalidMempool(format!("entry {index} has no id")))?;
            Ok(PendingTransaction { id, kind: tx.kind })
        })
        .collect()
}
