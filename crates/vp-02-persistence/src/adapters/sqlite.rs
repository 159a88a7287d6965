//! SQLite Store Adapter
//!
//! Production `PersistenceStore`. One connection behind a mutex; every call
//! runs on the blocking pool. Fee and reward amounts are stored as decimal
//! text so the full 256-bit range survives.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use shared_types::{
    Address, Block, BlockRecord, CommitteeMember, Height, Timestamp, TransactionRecord, Validator,
    U256,
};
use tracing::{debug, info, warn};

use crate::config::PersistenceConfig;
use crate::domain::{write_block, InsertOutcome, StoreError, StoreTransaction};
use crate::ports::outbound::{PersistenceStore, UpsertOutcome};

const SCHEMA: &str = include_str!("schema.sql");

const BLOCK_COLUMNS: &str =
    "height, hash, previous_hash, timestamp, transactions_count, validator_address, total_fees";

const VALIDATOR_COLUMNS: &str =
    "address, stake, is_active, bonded, last_seen, total_blocks_produced, total_rewards";

/// SQLite-backed store.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database named by `config` and bootstrap the schema.
    pub fn open(config: &PersistenceConfig) -> Result<Self, StoreError> {
        let conn = if config.is_in_memory() {
            Connection::open_in_memory()?
        } else {
            Connection::open(&config.database_path)?
        };
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        Self::from_connection(conn)
    }

    /// Private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(SCHEMA)?;
        info!("[vp-02] SQLite schema ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Database(format!("store task failed: {e}")))?
    }
}

fn amount_column(row: &Row<'_>, idx: usize, column: &str) -> rusqlite::Result<U256> {
    let raw: String = row.get(idx)?;
    U256::from_dec_str(&raw).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            Box::new(StoreError::Corrupt {
                column: column.to_string(),
                value: raw.clone(),
            }),
        )
    })
}

fn block_from_row(row: &Row<'_>) -> rusqlite::Result<BlockRecord> {
    Ok(BlockRecord {
        height: row.get(0)?,
        hash: row.get(1)?,
        previous_hash: row.get(2)?,
        timestamp: row.get(3)?,
        transactions_count: row.get(4)?,
        validator_address: row.get::<_, Option<String>>(5)?.map(Address::from),
        total_fees: amount_column(row, 6, "blocks.total_fees")?,
    })
}

fn validator_from_row(row: &Row<'_>) -> rusqlite::Result<Validator> {
    Ok(Validator {
        address: Address::from(row.get::<_, String>(0)?),
        stake: row.get(1)?,
        is_active: row.get(2)?,
        bonded: row.get(3)?,
        last_seen: row.get(4)?,
        total_blocks_produced: row.get(5)?,
        total_rewards: amount_column(row, 6, "validators.total_rewards")?,
    })
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<TransactionRecord> {
    Ok(TransactionRecord {
        id: row.get(0)?,
        block_height: row.get(1)?,
        fee: amount_column(row, 2, "transactions.fee")?,
        timestamp: row.get(3)?,
    })
}

fn load_validator(conn: &Connection, address: &Address) -> Result<Option<Validator>, StoreError> {
    let sql = format!("SELECT {VALIDATOR_COLUMNS} FROM validators WHERE address = ?1");
    Ok(conn
        .prepare_cached(&sql)?
        .query_row(params![address.as_str()], validator_from_row)
        .optional()?)
}

fn query_blocks(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<BlockRecord>, StoreError> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map(params, block_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// One open SQLite transaction seen through the write-path primitives.
struct SqliteUnit<'c>(&'c Connection);

impl StoreTransaction for SqliteUnit<'_> {
    fn append_block(&mut self, block: &BlockRecord) -> Result<bool, StoreError> {
        let sql = format!(
            "INSERT INTO blocks ({BLOCK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
             ON CONFLICT (height) DO NOTHING"
        );
        let changed = self.0.prepare_cached(&sql)?.execute(params![
            block.height,
            block.hash,
            block.previous_hash,
            block.timestamp,
            block.transactions_count,
            block.validator_address.as_ref().map(Address::as_str),
            block.total_fees.to_string(),
        ])?;
        Ok(changed == 1)
    }

    fn load_validator(&mut self, address: &Address) -> Result<Option<Validator>, StoreError> {
        load_validator(self.0, address)
    }

    fn save_validator(&mut self, validator: &Validator) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO validators ({VALIDATOR_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
             ON CONFLICT (address) DO UPDATE SET \
             stake = excluded.stake, is_active = excluded.is_active, bonded = excluded.bonded, \
             last_seen = excluded.last_seen, \
             total_blocks_produced = excluded.total_blocks_produced, \
             total_rewards = excluded.total_rewards"
        );
        self.0.prepare_cached(&sql)?.execute(params![
            validator.address.as_str(),
            validator.stake,
            validator.is_active,
            validator.bonded,
            validator.last_seen,
            validator.total_blocks_produced,
            validator.total_rewards.to_string(),
        ])?;
        Ok(())
    }

    fn append_transaction(&mut self, tx: &TransactionRecord) -> Result<(), StoreError> {
        self.0
            .prepare_cached(
                "INSERT INTO transactions (id, block_height, fee, timestamp) \
                 VALUES (?1, ?2, ?3, ?4)",
            )?
            .execute(params![tx.id, tx.block_height, tx.fee.to_string(), tx.timestamp])?;
        Ok(())
    }
}

#[async_trait]
impl PersistenceStore for SqliteStore {
    async fn latest_height(&self) -> Result<Option<Height>, StoreError> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT MAX(height) FROM blocks", [], |row| {
                row.get::<_, Option<u64>>(0)
            })?)
        })
        .await
    }

    async fn insert_block(&self, block: &Block) -> Result<InsertOutcome, StoreError> {
        let block = block.clone();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            match write_block(&mut SqliteUnit(&tx), &block) {
                Ok(outcome) => {
                    tx.commit()?;
                    Ok(outcome)
                }
                Err(err) => {
                    debug!("[vp-02] rolling back block {}: {}", block.height, err);
                    if let Err(rollback) = tx.rollback() {
                        warn!("[vp-02] rollback of block {} failed: {}", block.height, rollback);
                    }
                    Err(err)
                }
            }
        })
        .await
    }

    async fn block_by_height(&self, height: Height) -> Result<Option<BlockRecord>, StoreError> {
        if height > i64::MAX as u64 {
            return Ok(None);
        }
        self.with_conn(move |conn| {
            let sql = format!("SELECT {BLOCK_COLUMNS} FROM blocks WHERE height = ?1");
            Ok(conn
                .prepare_cached(&sql)?
                .query_row(params![height], block_from_row)
                .optional()?)
        })
        .await
    }

    async fn latest_block(&self) -> Result<Option<BlockRecord>, StoreError> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {BLOCK_COLUMNS} FROM blocks ORDER BY height DESC LIMIT 1");
            Ok(conn
                .prepare_cached(&sql)?
                .query_row([], block_from_row)
                .optional()?)
        })
        .await
    }

    async fn blocks_in_range(
        &self,
        from: Height,
        to: Height,
    ) -> Result<Vec<BlockRecord>, StoreError> {
        // SQLite integers are signed.
        let to = to.min(i64::MAX as u64);
        if from > to {
            return Ok(Vec::new());
        }
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {BLOCK_COLUMNS} FROM blocks WHERE height BETWEEN ?1 AND ?2 ORDER BY height"
            );
            query_blocks(conn, &sql, params![from, to])
        })
        .await
    }

    async fn transactions_for_block(
        &self,
        height: Height,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT id, block_height, fee, timestamp FROM transactions \
                 WHERE block_height = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![height], transaction_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn blocks_by_validator_since(
        &self,
        address: &Address,
        since: Timestamp,
    ) -> Result<Vec<BlockRecord>, StoreError> {
        let address = address.clone();
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {BLOCK_COLUMNS} FROM blocks \
                 WHERE validator_address = ?1 AND timestamp > ?2 ORDER BY height"
            );
            query_blocks(conn, &sql, params![address.as_str(), since])
        })
        .await
    }

    async fn recent_blocks_by_validator(
        &self,
        address: &Address,
        limit: usize,
    ) -> Result<Vec<BlockRecord>, StoreError> {
        let address = address.clone();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {BLOCK_COLUMNS} FROM blocks \
                 WHERE validator_address = ?1 ORDER BY height DESC LIMIT ?2"
            );
            let mut recent = query_blocks(conn, &sql, params![address.as_str(), limit])?;
            recent.reverse();
            Ok(recent)
        })
        .await
    }

    async fn count_blocks_since(&self, since: Timestamp) -> Result<u64, StoreError> {
        self.with_conn(move |conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM blocks WHERE timestamp > ?1",
                params![since],
                |row| row.get::<_, u64>(0),
            )?)
        })
        .await
    }

    async fn count_transactions_by_validator_since(
        &self,
        address: &Address,
        since: Timestamp,
    ) -> Result<u64, StoreError> {
        let address = address.clone();
        self.with_conn(move |conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM transactions t \
                 JOIN blocks b ON t.block_height = b.height \
                 WHERE b.validator_address = ?1 AND b.timestamp > ?2",
                params![address.as_str(), since],
                |row| row.get::<_, u64>(0),
            )?)
        })
        .await
    }

    async fn validators(&self) -> Result<Vec<Validator>, StoreError> {
        self.with_conn(|conn| {
            let sql =
                format!("SELECT {VALIDATOR_COLUMNS} FROM validators ORDER BY stake DESC, address");
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt.query_map([], validator_from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn validator(&self, address: &Address) -> Result<Option<Validator>, StoreError> {
        let address = address.clone();
        self.with_conn(move |conn| load_validator(conn, &address))
            .await
    }

    async fn upsert_committee_member(
        &self,
        member: &CommitteeMember,
        seen_at: Timestamp,
    ) -> Result<UpsertOutcome, StoreError> {
        let member = member.clone();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let existed = load_validator(&tx, &member.address)?.is_some();
            tx.execute(
                "INSERT INTO validators (address, stake, is_active, bonded, last_seen) \
                 VALUES (?1, ?2, ?3, ?4, ?5) \
                 ON CONFLICT (address) DO UPDATE SET \
                 stake = excluded.stake, is_active = excluded.is_active, \
                 bonded = excluded.bonded, last_seen = excluded.last_seen",
                params![
                    member.address.as_str(),
                    member.stake,
                    member.is_active,
                    member.bonded,
                    seen_at,
                ],
            )?;
            tx.commit()?;
            Ok(if existed {
                UpsertOutcome::Updated
            } else {
                UpsertOutcome::Inserted
            })
        })
        .await
    }
}
