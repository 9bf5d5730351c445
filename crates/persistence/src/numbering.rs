// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Sequential demande numbering with collision fallback.

use demande_domain::{TypeDemande, format_numero};
use rand::RngExt;
use rand::distr::Alphanumeric;

use crate::error::PersistenceError;
use crate::store::DemandeStore;

/// How many sequential proposals are attempted before falling back to
/// a randomized suffix.
pub const NUMERO_RETRY_BUDGET: usize = 5;

/// Randomized-suffix attempts before giving up entirely.
const SUFFIX_ATTEMPTS: usize = 100;

/// Generates and reserves a unique demande number.
///
/// The sequential proposal is "count existing + 1", which is racy under
/// concurrent creation: two writers can both count N and propose N+1.
/// Reservation arbitrates; the loser re-reads and retries. Once the
/// retry budget is spent, a randomized 4-character suffix is appended
/// to the proposal instead.
///
/// # Errors
///
/// Returns `PersistenceError::NumberingExhausted` if no number could be
/// reserved, which indicates a saturated number space rather than a
/// transient race.
pub fn generate_numero(
    store: &DemandeStore,
    type_demande: TypeDemande,
    year: i32,
) -> Result<String, PersistenceError> {
    let mut last_attempt = String::new();

    for _ in 0..NUMERO_RETRY_BUDGET {
        let seq = store.count_numeros_for(type_demande, year)? + 1;
        let numero = format_numero(type_demande, year, seq);
        if store.reserve_numero(&numero)? {
            return Ok(numero);
        }
        tracing::debug!(numero = %numero, "demande number collision, retrying");
        last_attempt = numero;
    }

    let seq = store.count_numeros_for(type_demande, year)? + 1;
    let base = format_numero(type_demande, year, seq);
    for _ in 0..SUFFIX_ATTEMPTS {
        let suffix: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(4)
            .map(char::from)
            .collect::<String>()
            .to_uppercase();
        let numero = format!("{base}-{suffix}");
        if store.reserve_numero(&numero)? {
            tracing::warn!(numero = %numero, "demande number assigned via randomized suffix");
            return Ok(numero);
        }
        last_attempt = numero;
    }

    Err(PersistenceError::NumberingExhausted { last_attempt })
}
