// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Record store boundary for the demande approval system.
//!
//! Durable storage is an external collaborator of the workflow; this
//! crate specifies it at its interface: CRUD with relational includes,
//! append-only history, and two concurrency disciplines the workflow
//! depends on:
//!
//! - **Conditional writes** — a demande update is applied only if the
//!   stored status still equals the caller's expected status. A failed
//!   guard surfaces as [`PersistenceError::Conflict`]; the caller must
//!   reload and re-evaluate against the new status.
//! - **Retrying sequence numbers** — the "count existing + 1" proposal
//!   for demande numbering is not atomic under concurrent creation, so
//!   the generator reserves its proposal, retries on collision, and
//!   falls back to a randomized suffix once the retry budget is spent.
//!
//! The in-memory [`DemandeStore`] is the reference implementation used
//! by the test suite; a relational backend must provide the same
//! guarantees (e.g. via an expected-status `WHERE` clause).

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod data_models;
mod error;
mod numbering;
mod store;

#[cfg(test)]
mod tests;

pub use data_models::{
    DeliveryItem, DemandeRecord, StoredAuditEvent, StoredReception, StoredSignature,
};
pub use error::PersistenceError;
pub use numbering::{NUMERO_RETRY_BUDGET, generate_numero};
pub use store::DemandeStore;
