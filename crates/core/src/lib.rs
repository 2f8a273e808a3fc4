//! Functional core of the quote store.
//!
//! Domain types, id derivation, validation and the storage contracts. Nothing in
//! this crate performs I/O; engines live in the `quotes` crate.

pub mod quote;
pub mod serde;
pub mod storage;
