//! Checkout validation state machine.

use serde::{Deserialize, Serialize};

use crate::events;

use super::{FormErrors, OrderDraft, OrderField};

/// One of the two checkout forms.
///
/// Each phase runs its own two-state machine, re-evaluated on every write
/// to one of its fields:
/// ```text
///            field write
/// Invalid ◄─────────────► Valid ──► ready event (after each write)
/// ```
/// Writes to one phase's fields never re-evaluate the other phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckoutPhase {
    /// Payment method and delivery address.
    Delivery,

    /// Email and phone.
    Contacts,
}

impl CheckoutPhase {
    /// Returns the fields validated in this phase.
    pub fn fields(&self) -> &'static [OrderField] {
        match self {
            CheckoutPhase::Delivery => &[OrderField::Payment, OrderField::Address],
            CheckoutPhase::Contacts => &[OrderField::Email, OrderField::Phone],
        }
    }

    /// Returns the event announced after every validation pass.
    pub fn errors_event(&self) -> &'static str {
        match self {
            CheckoutPhase::Delivery => events::DELIVERY_ERRORS_CHANGED,
            CheckoutPhase::Contacts => events::CONTACT_ERRORS_CHANGED,
        }
    }

    /// Returns the event announced when a field write leaves the phase valid.
    pub fn ready_event(&self) -> &'static str {
        match self {
            CheckoutPhase::Delivery => events::DELIVERY_READY,
            CheckoutPhase::Contacts => events::CONTACTS_READY,
        }
    }

    /// Computes this phase's error set from scratch.
    ///
    /// The result only ever contains this phase's fields.
    pub fn validate(&self, draft: &OrderDraft) -> FormErrors {
        self.fields()
            .iter()
            .filter(|field| !draft.is_set(**field))
            .map(|field| (*field, field.missing_message().to_string()))
            .collect()
    }

    /// Returns the phase name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutPhase::Delivery => "delivery",
            CheckoutPhase::Contacts => "contacts",
        }
    }
}

impl std::fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State of one phase's machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ValidationState {
    /// At least one required field is empty.
    #[default]
    Invalid,

    /// Every required field is set.
    Valid,
}

impl ValidationState {
    /// Derives the state from a phase's error set.
    pub fn from_errors(errors: &FormErrors) -> Self {
        if errors.is_empty() {
            ValidationState::Valid
        } else {
            ValidationState::Invalid
        }
    }

    /// Returns true for [`ValidationState::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationState::Valid)
    }
}
