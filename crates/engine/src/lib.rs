//! `docflow-engine` — orchestration facade.
//!
//! Owns the document store, the stock ledger, and the settlement engine, and
//! exposes the request/response operations callers consume: create, update,
//! get, list with filters, and one method per transition verb. A transition's
//! status change and its ledger batch commit under the same document-store
//! write lock, so a rejected ledger batch leaves the status untouched and a
//! repeated verb is stopped by the transition table before the ledger is ever
//! reached.

pub mod query;
pub mod service;

pub use query::{DocumentFilter, Page};
pub use service::DocumentEngine;
