// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

mod auth;
mod error;
mod handlers;
mod notification;
mod request_response;
mod throttle;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService};
pub use error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use handlers::{
    act_on_demande, archive_demande, create_demande, delete_demande, demande_history,
    force_demande_status, get_demande, validate_reception,
};
pub use notification::{Notification, Notifier, NotifyError, RecordingNotifier, TracingNotifier};
pub use request_response::{
    ActionRequest, CreateDemandeRequest, DemandeActionKind, DemandeResponse, ForceStatusRequest,
    HistoryEntryInfo, ItemInfo, ItemValidationRequest, NewItemRequest, QuantiteEdit,
    ReceptionRequest, ReceptionResponse,
};
pub use throttle::{Decision, FixedWindowLimiter, RateLimiter};
