// Copyright (c) 2026 Arbor Contributors. MIT License.
// See LICENSE for details.

//! # Arbor Ledger — Merkle-Indexed Storage Core
//!
//! This crate is the persistence heart of an Arbor ledger node: every block,
//! transaction, and state record that survives a restart passes through here.
//! Storage is content-addressed — an entity's primary key *is* the hash of
//! its canonical bytes — and cryptographically committed, so a single root
//! hash attests to the entire transaction set or state set.
//!
//! ## Architecture
//!
//! The modules mirror the layers of the engine, leaf-first:
//!
//! - **codec** — The tagged envelope format. One discriminator byte, then
//!   canonical bincode. The discriminator space is closed; an unknown byte
//!   is a format error, never a guess.
//! - **block** — The entity families: transactions (base, payment, device
//!   registration), execution receipts, the with-data composites that get
//!   persisted, state records, and blocks.
//! - **crypto** — Hashing primitives and the stateless service that turns
//!   any canonical entity into `(hash, bytes)`.
//! - **store** — The key-value seam. One backing store per tree, sled on
//!   disk or an in-memory map for tests.
//! - **trie** — A staged-overlay commitment structure over one store:
//!   put/get, a root hash that reflects staged writes, commit, abort.
//! - **merkle** — The storage service proper: four independent trees
//!   (index, block, transaction, state) plus the secondary indexes that
//!   make height, hash, and account/sequence lookups work.
//!
//! ## Design Philosophy
//!
//! 1. Canonical bytes are the single source of truth — hash them, store
//!    them, never re-derive them two different ways.
//! 2. Absence and corruption are different failures and stay different.
//! 3. Everything is synchronous; callers own their threads and timeouts.

pub mod block;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod merkle;
pub mod store;
pub mod trie;
