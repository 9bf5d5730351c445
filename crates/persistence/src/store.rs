// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The in-memory record store.
//!
//! All mutations run under one mutex, which makes per-demande
//! transitions linearizable; the expected-status guard on
//! [`DemandeStore::update_demande_if_status`] is what a relational
//! backend must reproduce with a conditional `UPDATE`.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use demande::DemandeState;
use demande_audit::{AuditEvent, ValidationSignature};
use demande_domain::{
    Demande, DemandeStatus, ItemDemande, ReceptionValidation, Role, TypeDemande, Utilisateur,
};

use crate::data_models::{
    DeliveryItem, DemandeRecord, StoredAuditEvent, StoredReception, StoredSignature,
};
use crate::error::PersistenceError;

/// Formats the current instant for stored timestamps.
fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

#[derive(Debug, Default)]
struct Inner {
    demandes: HashMap<i64, DemandeRecord>,
    history: HashMap<i64, Vec<StoredAuditEvent>>,
    signatures: HashMap<i64, Vec<StoredSignature>>,
    receptions: HashMap<i64, Vec<StoredReception>>,
    users: HashMap<i64, Utilisateur>,
    /// Every number ever reserved. Numbers are never reused, even after
    /// deletion of their demande.
    numeros: HashSet<String>,
    next_demande_id: i64,
    next_item_id: i64,
    next_event_id: i64,
    next_delivery_id: i64,
}

/// Thread-safe in-memory record store.
#[derive(Debug, Default)]
pub struct DemandeStore {
    inner: Mutex<Inner>,
}

impl DemandeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, PersistenceError> {
        self.inner.lock().map_err(|_| PersistenceError::LockPoisoned)
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Registers a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn add_user(&self, user: Utilisateur) -> Result<(), PersistenceError> {
        let mut inner = self.lock()?;
        inner.users.insert(user.user_id, user);
        Ok(())
    }

    /// Loads a user by id.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::UserNotFound` if the id does not resolve.
    pub fn get_user(&self, user_id: i64) -> Result<Utilisateur, PersistenceError> {
        let inner = self.lock()?;
        inner
            .users
            .get(&user_id)
            .cloned()
            .ok_or(PersistenceError::UserNotFound(user_id))
    }

    /// Lists the users holding `role` within a project.
    ///
    /// Used to resolve notification recipients for a validator role.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn users_with_role_in_project(
        &self,
        role: Role,
        projet_id: i64,
    ) -> Result<Vec<Utilisateur>, PersistenceError> {
        let inner = self.lock()?;
        Ok(inner
            .users
            .values()
            .filter(|u| u.role == role && u.is_member_of(projet_id))
            .cloned()
            .collect())
    }

    // ------------------------------------------------------------------
    // Demandes
    // ------------------------------------------------------------------

    /// Inserts a new demande with its line items, assigning ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn insert_demande(
        &self,
        mut demande: Demande,
        mut items: Vec<ItemDemande>,
    ) -> Result<DemandeRecord, PersistenceError> {
        let mut inner = self.lock()?;
        inner.next_demande_id += 1;
        let demande_id = inner.next_demande_id;
        demande.demande_id = Some(demande_id);
        for item in &mut items {
            if item.item_id.is_none() {
                inner.next_item_id += 1;
                item.item_id = Some(inner.next_item_id);
            }
        }
        inner.numeros.insert(demande.numero.clone());

        let record = DemandeRecord {
            demande,
            items,
            deliveries: Vec::new(),
        };
        inner.demandes.insert(demande_id, record.clone());
        tracing::debug!(demande_id, numero = %record.demande.numero, "demande stored");
        Ok(record)
    }

    /// Loads a demande record by id.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::DemandeNotFound` if the id does not resolve.
    pub fn get_demande(&self, demande_id: i64) -> Result<DemandeRecord, PersistenceError> {
        let inner = self.lock()?;
        inner
            .demandes
            .get(&demande_id)
            .cloned()
            .ok_or(PersistenceError::DemandeNotFound(demande_id))
    }

    /// Loads a demande as a workflow state, including the current
    /// statuses of its sub-demandes.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::DemandeNotFound` if the id does not resolve.
    pub fn get_state(&self, demande_id: i64) -> Result<DemandeState, PersistenceError> {
        let inner = self.lock()?;
        let record = inner
            .demandes
            .get(&demande_id)
            .ok_or(PersistenceError::DemandeNotFound(demande_id))?;
        let sous_demandes: Vec<DemandeStatus> = inner
            .demandes
            .values()
            .filter(|r| r.demande.demande_parent_id == Some(demande_id))
            .map(|r| r.demande.statut)
            .collect();
        Ok(DemandeState {
            demande: record.demande.clone(),
            items: record.items.clone(),
            sous_demandes,
        })
    }

    /// Conditional write: replaces the demande and its items only if
    /// the stored status still equals `expected`.
    ///
    /// The modification timestamp is stamped here, at the durable-write
    /// point.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Conflict` if the stored status has
    /// moved on; the caller must reload and re-evaluate.
    pub fn update_demande_if_status(
        &self,
        demande_id: i64,
        expected: DemandeStatus,
        mut demande: Demande,
        items: Vec<ItemDemande>,
    ) -> Result<DemandeRecord, PersistenceError> {
        let mut inner = self.lock()?;
        let record = inner
            .demandes
            .get_mut(&demande_id)
            .ok_or(PersistenceError::DemandeNotFound(demande_id))?;
        if record.demande.statut != expected {
            tracing::warn!(
                demande_id,
                expected = %expected,
                actual = %record.demande.statut,
                "stale-status write refused"
            );
            return Err(PersistenceError::Conflict {
                demande_id,
                expected,
                actual: record.demande.statut,
            });
        }
        demande.modifie_le = now_rfc3339();
        record.demande = demande;
        record.items = items;
        Ok(record.clone())
    }

    /// Deletes a demande and its dependent records.
    ///
    /// Line items cascade with the record. The demande's number stays
    /// reserved so it is never reissued.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::DemandeNotFound` if the id does not resolve.
    pub fn delete_demande(&self, demande_id: i64) -> Result<(), PersistenceError> {
        let mut inner = self.lock()?;
        if inner.demandes.remove(&demande_id).is_none() {
            return Err(PersistenceError::DemandeNotFound(demande_id));
        }
        inner.history.remove(&demande_id);
        inner.signatures.remove(&demande_id);
        inner.receptions.remove(&demande_id);
        Ok(())
    }

    /// Lists the sub-demandes of a parent demande.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn sous_demandes_of(&self, parent_id: i64) -> Result<Vec<Demande>, PersistenceError> {
        let inner = self.lock()?;
        Ok(inner
            .demandes
            .values()
            .filter(|r| r.demande.demande_parent_id == Some(parent_id))
            .map(|r| r.demande.clone())
            .collect())
    }

    // ------------------------------------------------------------------
    // History, signatures, receptions
    // ------------------------------------------------------------------

    /// Appends an audit event to a demande's history.
    ///
    /// History is append-only and therefore contention-free.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn append_history(
        &self,
        demande_id: i64,
        event: AuditEvent,
    ) -> Result<StoredAuditEvent, PersistenceError> {
        let mut inner = self.lock()?;
        inner.next_event_id += 1;
        let stored = StoredAuditEvent {
            event_id: inner.next_event_id,
            recorded_at: now_rfc3339(),
            event,
        };
        inner
            .history
            .entry(demande_id)
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    /// Returns a demande's history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn history(&self, demande_id: i64) -> Result<Vec<StoredAuditEvent>, PersistenceError> {
        let inner = self.lock()?;
        Ok(inner.history.get(&demande_id).cloned().unwrap_or_default())
    }

    /// Appends a validation signature.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn append_signature(
        &self,
        demande_id: i64,
        signature: ValidationSignature,
    ) -> Result<StoredSignature, PersistenceError> {
        let mut inner = self.lock()?;
        let stored = StoredSignature {
            signed_at: now_rfc3339(),
            signature,
        };
        inner
            .signatures
            .entry(demande_id)
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    /// Returns a demande's signatures, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn signatures(&self, demande_id: i64) -> Result<Vec<StoredSignature>, PersistenceError> {
        let inner = self.lock()?;
        Ok(inner
            .signatures
            .get(&demande_id)
            .cloned()
            .unwrap_or_default())
    }

    /// Appends a settled reception validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn append_reception(
        &self,
        demande_id: i64,
        reception: ReceptionValidation,
    ) -> Result<StoredReception, PersistenceError> {
        let mut inner = self.lock()?;
        let stored = StoredReception {
            recorded_at: now_rfc3339(),
            reception,
        };
        inner
            .receptions
            .entry(demande_id)
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    /// Returns a demande's reception validations, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn receptions(&self, demande_id: i64) -> Result<Vec<StoredReception>, PersistenceError> {
        let inner = self.lock()?;
        Ok(inner
            .receptions
            .get(&demande_id)
            .cloned()
            .unwrap_or_default())
    }

    // ------------------------------------------------------------------
    // Deliveries
    // ------------------------------------------------------------------

    /// Records one partial delivery against a line item.
    ///
    /// # Errors
    ///
    /// Returns an error if the demande or line item does not resolve.
    pub fn add_delivery(
        &self,
        demande_id: i64,
        item_id: i64,
        quantite: u32,
    ) -> Result<DeliveryItem, PersistenceError> {
        let mut inner = self.lock()?;
        inner.next_delivery_id += 1;
        let delivery_id = inner.next_delivery_id;
        let record = inner
            .demandes
            .get_mut(&demande_id)
            .ok_or(PersistenceError::DemandeNotFound(demande_id))?;
        if !record.items.iter().any(|i| i.item_id == Some(item_id)) {
            return Err(PersistenceError::ItemNotFound { demande_id, item_id });
        }
        let delivery = DeliveryItem {
            delivery_id,
            item_id,
            quantite,
            recorded_at: now_rfc3339(),
        };
        record.deliveries.push(delivery.clone());
        Ok(delivery)
    }

    /// Sums the delivered quantity of one line item across batches.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::DemandeNotFound` if the id does not resolve.
    pub fn delivered_total(
        &self,
        demande_id: i64,
        item_id: i64,
    ) -> Result<u64, PersistenceError> {
        let inner = self.lock()?;
        let record = inner
            .demandes
            .get(&demande_id)
            .ok_or(PersistenceError::DemandeNotFound(demande_id))?;
        Ok(record
            .deliveries
            .iter()
            .filter(|d| d.item_id == item_id)
            .map(|d| u64::from(d.quantite))
            .sum())
    }

    // ------------------------------------------------------------------
    // Numbering
    // ------------------------------------------------------------------

    /// Counts the reserved numbers carrying a type's prefix for a year.
    ///
    /// This is the deliberately naive "count existing" read that the
    /// generator's reserve-and-retry loop compensates for.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn count_numeros_for(
        &self,
        type_demande: TypeDemande,
        year: i32,
    ) -> Result<u32, PersistenceError> {
        let inner = self.lock()?;
        let prefix = format!("{}-{year}-", type_demande.numero_prefix());
        let count = inner
            .numeros
            .iter()
            .filter(|n| n.starts_with(&prefix))
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    /// Reserves a number. Returns false if it was already taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn reserve_numero(&self, numero: &str) -> Result<bool, PersistenceError> {
        let mut inner = self.lock()?;
        Ok(inner.numeros.insert(numero.to_string()))
    }
}
