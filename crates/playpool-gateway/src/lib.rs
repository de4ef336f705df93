//! The ledger gateway: Playpool's view of the remote authoritative store.
//!
//! Room and player state is owned by smart contracts the client can
//! neither lock nor transact against atomically. This crate models that
//! boundary:
//!
//! - [`LedgerGateway`]: the asynchronous, fee-costing, possibly-failing
//!   call surface (write intents + snapshot reads).
//! - [`GatewayError`]: what a failed call looks like, including the
//!   nested revert-reason payloads real nodes return.
//! - [`InMemoryLedger`]: a reference implementation of the contract
//!   rules, used by tests and local demos in place of a deployed chain.
//!
//! Reads return *raw* records; converting them into the strict model is
//! the protocol crate's parse boundary, deliberately outside this crate.

#![allow(async_fn_in_trait)]

mod error;
mod gateway;
mod memory;

pub use error::GatewayError;
pub use gateway::LedgerGateway;
pub use memory::{InMemoryLedger, ReadScript};
