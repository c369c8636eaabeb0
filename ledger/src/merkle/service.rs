//! # Four-Tree Storage Service
//!
//! The ingestion and lookup surface over four independent merkle trees:
//!
//! - **block** — blocks by content hash
//! - **transaction** — transaction+receipt composites by content hash
//! - **state** — state records by content hash
//! - **index** — every secondary pointer: height to block hash, inner
//!   transaction hash and (account, sequence) to composite hash, state key
//!   (latest and versioned) to state hash
//!
//! Content trees hold envelope bytes keyed by their own hash, so a pointer
//! resolved from the index can be followed with a plain content lookup.
//! Commit flushes the content trees before the index, so a reader never
//! follows an index pointer into an uncommitted tree.

use tracing::{debug, info};

use crate::block::{Address, AnyState, Block, TransactionWithData};
use crate::codec::{Canonical, CodecError};
use crate::config::{StorageConfig, TREE_BLOCK, TREE_INDEX, TREE_STATE, TREE_TRANSACTION};
use crate::crypto::{CryptoService, Hash, RawMode};
use crate::merkle::MerkleTree;
use crate::store::{KvStore, MemoryStore, SledStore, StoreError};

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Storage-level failures. `NotFound` is a distinct outcome — a missing
/// entity is not a decode failure and not a store failure, and callers
/// routinely branch on it.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type StorageResult<T> = Result<T, StorageError>;

// ---------------------------------------------------------------------------
// Index key layout
// ---------------------------------------------------------------------------

// The index tree is a flat namespace of formatted strings. The layouts
// below are part of the persisted format.

/// `block@<height>`
fn block_key(height: u64) -> String {
    format!("block@{height}")
}

/// `<name>@<hex(hash)>`
fn hash_key(name: &str, hash: &Hash) -> String {
    format!("{name}@{}", hash.to_hex())
}

/// `<name>@<key>`
fn name_key(name: &str, key: &str) -> String {
    format!("{name}@{key}")
}

/// `<key>:<index>` — the versioned form of a natural key.
fn index_key(key: &str, index: u64) -> String {
    format!("{key}:{index}")
}

// ---------------------------------------------------------------------------
// MerkleService
// ---------------------------------------------------------------------------

/// The four-tree storage service.
pub struct MerkleService {
    config: StorageConfig,
    crypto: CryptoService,

    index: MerkleTree,
    blocks: MerkleTree,
    transactions: MerkleTree,
    states: MerkleTree,
}

impl MerkleService {
    /// Open the four trees per the configuration: sled-backed at
    /// `<path>/<tree-name>` normally, map-backed when `in_memory` is set.
    pub fn open(config: StorageConfig) -> StorageResult<Self> {
        let open_tree = |name: &str| -> StorageResult<MerkleTree> {
            let store: Box<dyn KvStore> = if config.in_memory {
                Box::new(MemoryStore::new())
            } else {
                Box::new(SledStore::open(config.store_path(name))?)
            };
            Ok(MerkleTree::new(store))
        };

        let service = Self {
            index: open_tree(TREE_INDEX)?,
            blocks: open_tree(TREE_BLOCK)?,
            transactions: open_tree(TREE_TRANSACTION)?,
            states: open_tree(TREE_STATE)?,
            crypto: CryptoService::new(),
            config,
        };
        info!(
            path = %service.config.path.display(),
            in_memory = service.config.in_memory,
            "merkle storage opened"
        );
        Ok(service)
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Lifecycle hook for the service host. Opening already initialized the
    /// trees, so there is nothing left to do here.
    pub fn start(&self) -> StorageResult<()> {
        Ok(())
    }

    /// Flush and release all four trees.
    pub fn close(&self) -> StorageResult<()> {
        self.blocks.close()?;
        self.transactions.close()?;
        self.states.close()?;
        self.index.close()?;
        debug!("merkle storage closed");
        Ok(())
    }

    fn resolve(&self, key: &str) -> StorageResult<Hash> {
        let pointer = self
            .index
            .get(key.as_bytes())?
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        Ok(Hash::from_slice(&pointer)?)
    }

    // -----------------------------------------------------------------------
    // States
    // -----------------------------------------------------------------------

    /// Store a state record content-addressed, assign its hash, and point
    /// both the versioned and the latest index entries at it.
    pub fn put_state(&self, state: &mut AnyState) -> StorageResult<Hash> {
        let (hash, data) = self.crypto.raw(state, RawMode::Binary)?;
        self.states.put(hash.as_bytes(), &data);
        state.set_hash(hash);

        let key = state.state_key();
        let versioned = name_key(TREE_STATE, &index_key(&key, state.version()));
        self.index.put(versioned.as_bytes(), hash.as_bytes());
        let latest = name_key(TREE_STATE, &key);
        self.index.put(latest.as_bytes(), hash.as_bytes());

        debug!(key = %key, version = state.version(), hash = %hash, "state stored");
        Ok(hash)
    }

    /// Latest version of the state under `key`.
    pub fn get_state(&self, key: &str) -> StorageResult<AnyState> {
        let hash = self.resolve(&name_key(TREE_STATE, key))?;
        self.get_state_by_hash(&hash)
    }

    /// A specific version of the state under `key`.
    pub fn get_state_by_index(&self, key: &str, index: u64) -> StorageResult<AnyState> {
        let hash = self.resolve(&name_key(TREE_STATE, &index_key(key, index)))?;
        self.get_state_by_hash(&hash)
    }

    pub fn get_state_by_hash(&self, hash: &Hash) -> StorageResult<AnyState> {
        let data = self
            .states
            .get(hash.as_bytes())?
            .ok_or_else(|| StorageError::NotFound(hash_key(TREE_STATE, hash)))?;
        let mut state = AnyState::read(&data)?;
        state.set_hash(*hash);
        Ok(state)
    }

    pub fn get_state_root(&self) -> StorageResult<Hash> {
        Ok(self.states.root_hash()?)
    }

    // -----------------------------------------------------------------------
    // Transactions
    // -----------------------------------------------------------------------

    /// Store a transaction+receipt composite content-addressed; index it by
    /// the embedded transaction's own hash and by (account, sequence).
    pub fn put_transaction(&self, txd: &mut TransactionWithData) -> StorageResult<Hash> {
        let (hash, data) = self.crypto.raw(txd, RawMode::Binary)?;
        self.transactions.put(hash.as_bytes(), &data);
        txd.set_hash(hash);

        // The embedded transaction gets its own content hash; lookups use
        // it, not the composite hash.
        let (tx_hash, _) = self.crypto.raw(&txd.transaction, RawMode::Binary)?;
        txd.transaction.set_hash(tx_hash);

        let by_hash = hash_key(TREE_TRANSACTION, &tx_hash);
        self.index.put(by_hash.as_bytes(), hash.as_bytes());
        let by_position = name_key(
            TREE_TRANSACTION,
            &index_key(&txd.transaction.account().to_hex(), txd.transaction.sequence()),
        );
        self.index.put(by_position.as_bytes(), hash.as_bytes());

        debug!(tx = %tx_hash, composite = %hash, "transaction stored");
        Ok(hash)
    }

    /// Direct lookup by the composite's own storage hash.
    pub fn get_transaction(&self, hash: &Hash) -> StorageResult<TransactionWithData> {
        self.read_composite(hash)
    }

    /// Lookup by the embedded transaction's hash.
    pub fn get_transaction_by_hash(&self, tx_hash: &Hash) -> StorageResult<TransactionWithData> {
        let composite = self.resolve(&hash_key(TREE_TRANSACTION, tx_hash))?;
        self.read_composite(&composite)
    }

    /// Lookup by the (account, sequence) position.
    pub fn get_transaction_by_index(
        &self,
        account: &Address,
        sequence: u64,
    ) -> StorageResult<TransactionWithData> {
        let key = name_key(TREE_TRANSACTION, &index_key(&account.to_hex(), sequence));
        let composite = self.resolve(&key)?;
        self.read_composite(&composite)
    }

    fn read_composite(&self, hash: &Hash) -> StorageResult<TransactionWithData> {
        let data = self
            .transactions
            .get(hash.as_bytes())?
            .ok_or_else(|| StorageError::NotFound(hash_key(TREE_TRANSACTION, hash)))?;
        let mut txd = TransactionWithData::unmarshal(&data)?;
        txd.set_hash(*hash);
        let (tx_hash, _) = self.crypto.raw(&txd.transaction, RawMode::Binary)?;
        txd.transaction.set_hash(tx_hash);
        Ok(txd)
    }

    pub fn get_transaction_root(&self) -> StorageResult<Hash> {
        Ok(self.transactions.root_hash()?)
    }

    // -----------------------------------------------------------------------
    // Blocks
    // -----------------------------------------------------------------------

    /// Store a block content-addressed, index it by height, then ingest its
    /// transactions and states so every child is retrievable on its own.
    pub fn put_block(&self, block: &mut Block) -> StorageResult<Hash> {
        let (hash, data) = self.crypto.raw(block, RawMode::Binary)?;
        self.blocks.put(hash.as_bytes(), &data);
        block.set_hash(hash);

        self.index
            .put(block_key(block.index).as_bytes(), hash.as_bytes());

        for txd in block.transactions.iter_mut() {
            self.put_transaction(txd)?;
        }
        for state in block.states.iter_mut() {
            self.put_state(state)?;
        }

        info!(
            height = block.index,
            hash = %hash,
            transactions = block.transactions.len(),
            states = block.states.len(),
            "block stored"
        );
        Ok(hash)
    }

    pub fn get_block_by_index(&self, height: u64) -> StorageResult<Block> {
        let hash = self.resolve(&block_key(height))?;
        self.get_block_by_hash(&hash)
    }

    pub fn get_block_by_hash(&self, hash: &Hash) -> StorageResult<Block> {
        let data = self
            .blocks
            .get(hash.as_bytes())?
            .ok_or_else(|| StorageError::NotFound(hash_key(TREE_BLOCK, hash)))?;
        let mut block = Block::unmarshal(&data)?;
        block.set_hash(*hash);
        Ok(block)
    }

    pub fn get_block_root(&self) -> StorageResult<Hash> {
        Ok(self.blocks.root_hash()?)
    }

    // -----------------------------------------------------------------------
    // Commit / cancel
    // -----------------------------------------------------------------------

    /// Flush every staged write across the four trees.
    ///
    /// Targets commit before the index, so a reader never follows an index
    /// pointer into an uncommitted tree.
    pub fn commit(&self) -> StorageResult<()> {
        self.blocks.commit()?;
        self.transactions.commit()?;
        self.states.commit()?;
        self.index.commit()?;
        debug!("staged writes committed");
        Ok(())
    }

    /// Drop every staged write across the four trees.
    pub fn cancel(&self) {
        self.blocks.cancel();
        self.transactions.cancel();
        self.states.cancel();
        self.index.cancel();
        debug!("staged writes cancelled");
    }

    pub fn is_dirty(&self) -> bool {
        self.blocks.is_dirty()
            || self.transactions.is_dirty()
            || self.states.is_dirty()
            || self.index.is_dirty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{
        AccountState, AnyTransaction, CurrencyState, Payment, Receipt, Transaction,
        TransactionType,
    };
    use crate::crypto::{PublicKey, Signature};

    fn memory_service() -> MerkleService {
        MerkleService::open(StorageConfig::in_memory()).unwrap()
    }

    fn payment(account: Address, sequence: u64) -> AnyTransaction {
        AnyTransaction::Payment(Payment {
            base: Transaction {
                hash: None,
                tx_type: TransactionType::Payment,
                account,
                sequence,
                amount: 100,
                gas: 5,
                type_name: "payment".to_string(),
                destination: Address::new([0xBB; 20]),
                payload: Vec::new(),
                public_key: PublicKey(vec![0x02; 33]),
                signature: Signature(vec![0x77; 64]),
            },
            timestamp: 1_725_000_000_000,
            device: "till-1".to_string(),
            tags: vec!["pos".to_string()],
            name: "espresso".to_string(),
            value: "2.20".to_string(),
        })
    }

    fn composite(account: Address, sequence: u64, position: u64) -> TransactionWithData {
        TransactionWithData::new(
            payment(account, sequence),
            Receipt {
                transaction_index: position,
                transaction_result: 0,
                gas_used: 5,
            },
        )
    }

    fn account_state(account: Address, index: u64, amount: i64) -> AnyState {
        AnyState::Account(AccountState {
            hash: None,
            index,
            account,
            sequence: index,
            amount,
        })
    }

    #[test]
    fn state_roundtrip_by_key_and_hash() {
        let service = memory_service();
        let account = Address::new([0x10; 20]);
        let mut state = account_state(account, 0, 1_000);
        let hash = service.put_state(&mut state).unwrap();
        assert_eq!(state.hash(), Some(hash));

        let by_key = service.get_state(&account.to_hex()).unwrap();
        assert_eq!(by_key, state);
        let by_hash = service.get_state_by_hash(&hash).unwrap();
        assert_eq!(by_hash, state);
    }

    #[test]
    fn state_versions_stay_addressable() {
        let service = memory_service();
        let account = Address::new([0x20; 20]);
        let key = account.to_hex();

        let mut v0 = account_state(account, 0, 1_000);
        service.put_state(&mut v0).unwrap();
        let mut v1 = account_state(account, 1, 900);
        service.put_state(&mut v1).unwrap();

        // Latest pointer follows the newest write; old versions remain.
        assert_eq!(service.get_state(&key).unwrap(), v1);
        assert_eq!(service.get_state_by_index(&key, 0).unwrap(), v0);
        assert_eq!(service.get_state_by_index(&key, 1).unwrap(), v1);
    }

    #[test]
    fn currency_state_keys_by_symbol() {
        let service = memory_service();
        let mut state = AnyState::Currency(CurrencyState {
            hash: None,
            index: 0,
            account: Address::new([0x30; 20]),
            symbol: "NOV".to_string(),
            decimals: 8,
            total_supply: 1_000_000,
        });
        service.put_state(&mut state).unwrap();
        assert_eq!(service.get_state("NOV").unwrap(), state);
    }

    #[test]
    fn missing_state_is_not_found() {
        let service = memory_service();
        assert!(matches!(
            service.get_state("nobody"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn transaction_lookup_by_hash_and_position() {
        let service = memory_service();
        let account = Address::new([0x40; 20]);
        let mut txd = composite(account, 7, 0);
        let composite_hash = service.put_transaction(&mut txd).unwrap();
        let tx_hash = txd.transaction.hash().unwrap();
        assert_ne!(composite_hash, tx_hash);

        let direct = service.get_transaction(&composite_hash).unwrap();
        assert_eq!(direct, txd);
        let by_hash = service.get_transaction_by_hash(&tx_hash).unwrap();
        assert_eq!(by_hash, txd);
        let by_position = service.get_transaction_by_index(&account, 7).unwrap();
        assert_eq!(by_position, txd);
    }

    #[test]
    fn content_address_matches_recomputed_hash() {
        let service = memory_service();
        let mut txd = composite(Address::new([0x50; 20]), 1, 0);
        let composite_hash = service.put_transaction(&mut txd).unwrap();

        let crypto = CryptoService::new();
        let fetched = service
            .get_transaction_by_hash(&txd.transaction.hash().unwrap())
            .unwrap();
        let (recomputed, _) = crypto.raw(&fetched, RawMode::Binary).unwrap();
        assert_eq!(recomputed, composite_hash);
    }

    #[test]
    fn reads_see_staged_writes_before_commit() {
        let service = memory_service();
        let account = Address::new([0x60; 20]);
        let mut state = account_state(account, 0, 42);
        service.put_state(&mut state).unwrap();
        assert!(service.is_dirty());
        assert_eq!(service.get_state(&account.to_hex()).unwrap(), state);
    }

    #[test]
    fn cancel_discards_everything_staged() {
        let service = memory_service();
        let account = Address::new([0x70; 20]);

        let mut kept = account_state(account, 0, 10);
        service.put_state(&mut kept).unwrap();
        service.commit().unwrap();
        let state_root = service.get_state_root().unwrap();

        let mut dropped = account_state(account, 1, 20);
        service.put_state(&mut dropped).unwrap();
        let mut txd = composite(account, 1, 0);
        service.put_transaction(&mut txd).unwrap();
        service.cancel();

        assert!(!service.is_dirty());
        assert_eq!(service.get_state_root().unwrap(), state_root);
        assert_eq!(service.get_state(&account.to_hex()).unwrap(), kept);
        assert!(matches!(
            service.get_transaction_by_index(&account, 1),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn roots_move_on_commit_content() {
        let service = memory_service();
        let before = service.get_state_root().unwrap();
        assert!(before.is_zero());

        let mut state = account_state(Address::new([0x80; 20]), 0, 1);
        service.put_state(&mut state).unwrap();
        let staged = service.get_state_root().unwrap();
        assert_ne!(before, staged);

        service.commit().unwrap();
        assert_eq!(service.get_state_root().unwrap(), staged);
    }

    #[test]
    fn block_ingestion_end_to_end() {
        let service = memory_service();
        let account = Address::new([0x90; 20]);

        let tx_root_before = service.get_transaction_root().unwrap();
        let state_root_before = service.get_state_root().unwrap();

        let mut block = Block::new(42, Hash::new([9u8; 32]));
        block.transactions.push(composite(account, 0, 0));
        block.transactions.push(composite(account, 1, 1));
        block.states.push(account_state(account, 0, 800));

        let block_hash = service.put_block(&mut block).unwrap();
        service.commit().unwrap();

        // Ingesting the block moves both commitments off their empty values.
        let tx_root = service.get_transaction_root().unwrap();
        assert!(!tx_root.is_zero());
        assert_ne!(tx_root, tx_root_before);
        let state_root = service.get_state_root().unwrap();
        assert!(!state_root.is_zero());
        assert_ne!(state_root, state_root_before);

        let by_height = service.get_block_by_index(42).unwrap();
        assert_eq!(by_height.hash(), Some(block_hash));
        assert_eq!(by_height.transactions.len(), 2);

        let by_hash = service.get_block_by_hash(&block_hash).unwrap();
        assert_eq!(by_hash.index, 42);

        // Children are individually retrievable after block ingestion.
        let tx_hash = block.transactions[1].transaction.hash().unwrap();
        let txd = service.get_transaction_by_hash(&tx_hash).unwrap();
        assert_eq!(txd.transaction.sequence(), 1);
        assert_eq!(
            service.get_state(&account.to_hex()).unwrap().hash(),
            block.states[0].hash()
        );
    }

    #[test]
    fn missing_block_height_is_not_found() {
        let service = memory_service();
        assert!(matches!(
            service.get_block_by_index(999),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn sled_backed_service_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let account = Address::new([0xA0; 20]);
        let block_hash;
        let state_root;
        {
            let service = MerkleService::open(StorageConfig::at(dir.path())).unwrap();
            let mut block = Block::new(42, Hash::ZERO);
            block.transactions.push(composite(account, 0, 0));
            block.states.push(account_state(account, 0, 500));
            block_hash = service.put_block(&mut block).unwrap();
            service.commit().unwrap();
            state_root = service.get_state_root().unwrap();
            service.close().unwrap();
        }

        let service = MerkleService::open(StorageConfig::at(dir.path())).unwrap();
        let block = service.get_block_by_index(42).unwrap();
        assert_eq!(block.hash(), Some(block_hash));
        assert_eq!(service.get_state_root().unwrap(), state_root);
        let state = service.get_state(&account.to_hex()).unwrap();
        assert!(matches!(state, AnyState::Account(ref s) if s.amount == 500));
    }
}
