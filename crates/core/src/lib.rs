//! Domain vocabulary for the tasktrail service.
//!
//! Zero internal dependencies so both the storage layer (building audit
//! payloads) and the transport layer (decoding them for display) can use
//! this crate without depending on each other.

pub mod audit;
pub mod error;
pub mod types;
