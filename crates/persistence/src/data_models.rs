// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Stored representations of workflow data.
//!
//! The store wraps core and audit types with the fields only the
//! durable layer can provide: canonical identifiers and timestamps.

use demande_audit::{AuditEvent, ValidationSignature};
use demande_domain::{Demande, ItemDemande, ReceptionValidation};

/// A demande with its line items and delivery splits, as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandeRecord {
    /// The demande. `demande_id` is always `Some` once stored.
    pub demande: Demande,
    /// All line items, with assigned `item_id`s.
    pub items: Vec<ItemDemande>,
    /// Partial-delivery records summing toward each line's validated
    /// quantity.
    pub deliveries: Vec<DeliveryItem>,
}

/// One partial delivery against a line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryItem {
    /// Canonical identifier of this delivery record.
    pub delivery_id: i64,
    /// The line item this delivery counts toward.
    pub item_id: i64,
    /// Quantity delivered in this batch.
    pub quantite: u32,
    /// Timestamp of the batch (RFC 3339).
    pub recorded_at: String,
}

/// An audit event as stored: append-only, stamped, sequentially numbered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAuditEvent {
    /// Monotonically increasing event identifier.
    pub event_id: i64,
    /// Timestamp of the append (RFC 3339).
    pub recorded_at: String,
    /// The event itself.
    pub event: AuditEvent,
}

/// A validation signature as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSignature {
    /// Timestamp of the signature (RFC 3339).
    pub signed_at: String,
    /// The signature itself.
    pub signature: ValidationSignature,
}

/// A reception validation as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReception {
    /// Timestamp of the reception (RFC 3339).
    pub recorded_at: String,
    /// The settled reception validation.
    pub reception: ReceptionValidation,
}
