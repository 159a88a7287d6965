//! HTTP Ledger Source Adapter
//!
//! Implements `LedgerSource` against the ledger explorer REST API.
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | latest height | `GET {base}/{network}/latest/height` |
//! | block | `GET {base}/{network}/block/{height}` |
//! | committee | `GET {base}/{network}/committee/latest` |
//! | mempool | `GET {base}/{network}/memoryPool/transactions` |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use shared_types::{Block, CommitteeMember, Height, PendingTransaction};
use tracing::{debug, warn};

use crate::config::LedgerSourceConfig;
use crate::domain::{
    convert_block, convert_committee, convert_mempool, ApiBlock, ApiCommittee, ApiTransaction,
    LedgerError, Numeric,
};
use crate::ports::outbound::LedgerSource;

/// HTTP-based ledger connection.
pub struct HttpLedgerSource {
    client: reqwest::Client,
    /// `{base_url}/{network}` without trailing slash.
    root: String,
}

impl HttpLedgerSource {
    /// Create a new connection from configuration.
    pub fn new(config: &LedgerSourceConfig) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| LedgerError::Network(e.to_string()))?;

        Ok(Self {
            client,
            root: format!(
                "{}/{}",
                config.base_url.trim_end_matches('/'),
                config.network.trim_matches('/')
            ),
        })
    }

    /// Root URL all endpoints hang off.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// GET `path` and decode the JSON body; `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, LedgerError> {
        let url = format!("{}/{}", self.root, path);
        debug!("[vp-01] GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            warn!("[vp-01] {} answered {}", url, status);
            return Err(LedgerError::Http {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| LedgerError::MalformedResponse {
                endpoint: path.to_string(),
                reason: e.to_string(),
            })
    }

    async fn get_required<T: DeserializeOwned>(&self, path: &str) -> Result<T, LedgerError> {
        self.get_json(path).await?.ok_or_else(|| LedgerError::Http {
            status: StatusCode::NOT_FOUND.as_u16(),
            url: format!("{}/{}", self.root, path),
        })
    }
}

#[async_trait]
impl LedgerSource for HttpLedgerSource {
    async fn latest_height(&self) -> Result<Height, LedgerError> {
        let height: Numeric = self.get_required("latest/height").await?;
        height
            .to_u64()
            .ok_or_else(|| LedgerError::HeightUnavailable(format!("unexpected value {height:?}")))
    }

    async fn block_by_height(&self, height: Height) -> Result<Option<Block>, LedgerError> {
        let Some(api) = self.get_json::<ApiBlock>(&format!("block/{height}")).await? else {
            return Ok(None);
        };
        let block = convert_block(api)?;
        if block.height != height {
            return Err(LedgerError::InvalidBlock {
                height: Some(block.height),
                reason: format!("requested height {height}"),
            });
        }
        Ok(Some(block))
    }

    async fn latest_committee(&self) -> Result<Vec<CommitteeMember>, LedgerError> {
        let committee: ApiCommittee = self.get_required("committee/latest").await?;
        convert_committee(committee)
    }

    async fn transactions_in_mempool(&self) -> Result<Vec<PendingTransaction>, LedgerError> {
        let pending: Vec<ApiTransaction> = self
            .get_json("memoryPool/transactions")
            .await?
            .unwrap_or_default();
        convert_mempool(pending)
    }
}
