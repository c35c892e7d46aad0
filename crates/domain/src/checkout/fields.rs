//! Order draft field names.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

use super::CheckoutPhase;

/// A user-editable field of the order draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderField {
    /// Payment method ("card", "cash").
    Payment,
    /// Delivery address.
    Address,
    /// Contact email.
    Email,
    /// Contact phone number.
    Phone,
}

impl OrderField {
    /// All fields, in form order.
    pub const ALL: [OrderField; 4] = [
        OrderField::Payment,
        OrderField::Address,
        OrderField::Email,
        OrderField::Phone,
    ];

    /// Returns the wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderField::Payment => "payment",
            OrderField::Address => "address",
            OrderField::Email => "email",
            OrderField::Phone => "phone",
        }
    }

    /// Returns the checkout form the field belongs to.
    pub fn phase(&self) -> CheckoutPhase {
        match self {
            OrderField::Payment | OrderField::Address => CheckoutPhase::Delivery,
            OrderField::Email | OrderField::Phone => CheckoutPhase::Contacts,
        }
    }

    /// Returns the message shown when the field is left empty.
    pub fn missing_message(&self) -> &'static str {
        match self {
            OrderField::Payment => "Select a payment method",
            OrderField::Address => "Enter a delivery address",
            OrderField::Email => "Enter an email address",
            OrderField::Phone => "Enter a phone number",
        }
    }
}

impl std::fmt::Display for OrderField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| DomainError::UnknownField(s.to_string()))
    }
}

/// A field of the delivery form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryField {
    Payment,
    Address,
}

impl From<DeliveryField> for OrderField {
    fn from(field: DeliveryField) -> Self {
        match field {
            DeliveryField::Payment => OrderField::Payment,
            DeliveryField::Address => OrderField::Address,
        }
    }
}

impl TryFrom<OrderField> for DeliveryField {
    type Error = DomainError;

    fn try_from(field: OrderField) -> Result<Self, Self::Error> {
        match field {
            OrderField::Payment => Ok(DeliveryField::Payment),
            OrderField::Address => Ok(DeliveryField::Address),
            other => Err(DomainError::WrongPhase {
                field: other,
                phase: CheckoutPhase::Delivery,
            }),
        }
    }
}

impl FromStr for DeliveryField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<OrderField>()?.try_into()
    }
}

/// A field of the contacts form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    Email,
    Phone,
}

impl From<ContactField> for OrderField {
    fn from(field: ContactField) -> Self {
        match field {
            ContactField::Email => OrderField::Email,
            ContactField::Phone => OrderField::Phone,
        }
    }
}

impl TryFrom<OrderField> for ContactField {
    type Error = DomainError;

    fn try_from(field: OrderField) -> Result<Self, Self::Error> {
        match field {
            OrderField::Email => Ok(ContactField::Email),
            OrderField::Phone => Ok(ContactField::Phone),
            other => Err(DomainError::WrongPhase {
                field: other,
                phase: CheckoutPhase::Contacts,
            }),
        }
    }
}

impl FromStr for ContactField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<OrderField>()?.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_wire_names() {
        for field in OrderField::ALL {
            assert_eq!(field.as_str().parse::<OrderField>().unwrap(), field);
        }
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = "zip".parse::<OrderField>().unwrap_err();
        assert!(matches!(err, DomainError::UnknownField(ref name) if name == "zip"));
    }

    #[test]
    fn fields_belong_to_one_phase() {
        assert_eq!(OrderField::Payment.phase(), CheckoutPhase::Delivery);
        assert_eq!(OrderField::Address.phase(), CheckoutPhase::Delivery);
        assert_eq!(OrderField::Email.phase(), CheckoutPhase::Contacts);
        assert_eq!(OrderField::Phone.phase(), CheckoutPhase::Contacts);
    }

    #[test]
    fn delivery_field_rejects_contact_fields() {
        assert_eq!(
            "address".parse::<DeliveryField>().unwrap(),
            DeliveryField::Address
        );
        let err = "email".parse::<DeliveryField>().unwrap_err();
        assert!(matches!(
            err,
            DomainError::WrongPhase {
                field: OrderField::Email,
                phase: CheckoutPhase::Delivery
            }
        ));
    }

    #[test]
    fn contact_field_rejects_delivery_fields() {
        assert_eq!("phone".parse::<ContactField>().unwrap(), ContactField::Phone);
        assert!("payment".parse::<ContactField>().is_err());
    }

    #[test]
    fn serializes_as_wire_name() {
        assert_eq!(
            serde_json::to_string(&OrderField::Address).unwrap(),
            "\"address\""
        );
        assert_eq!(
            serde_json::to_string(&ContactField::Email).unwrap(),
            "\"email\""
        );
    }
}
