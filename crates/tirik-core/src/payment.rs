//! # Payment Requests
//!
//! Request payloads sent to `/api/ProjectPay/Create` and the typed views
//! callers may decode from success envelopes.

use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Serialize};

/// Card details forwarded to the upstream API as-is.
///
/// Nothing is validated locally; a bad card surfaces as an upstream error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub pan: String,
    pub expiry: String,
}

impl Card {
    /// Numbers and strings are both accepted; they are sent as strings.
    pub fn new(pan: impl ToString, expiry: impl ToString) -> Self {
        Self {
            pan: pan.to_string(),
            expiry: expiry.to_string(),
        }
    }

    /// Last four digits, for logs
    pub fn masked_pan(&self) -> String {
        let skip = self.pan.chars().count().saturating_sub(4);
        let tail: String = self.pan.chars().skip(skip).collect();
        format!("****{}", tail)
    }
}

/// A single card payment towards the client's project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    /// Amount in minor currency units
    pub amount: u64,
    /// Donor display name, may be empty
    pub donater: Option<String>,
    /// Free-text note
    pub notes: Option<String>,
    pub card: Card,
}

impl PaymentRequest {
    pub fn new(amount: u64, card: Card) -> Self {
        Self {
            amount,
            donater: None,
            notes: None,
            card,
        }
    }

    /// Builder: set donor name
    pub fn with_donater(mut self, donater: impl Into<String>) -> Self {
        self.donater = Some(donater.into());
        self
    }

    /// Builder: set note
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Build the wire body for a resolved project.
    ///
    /// Rejects a zero amount before anything is sent.
    pub fn to_body(&self, project_id: i64) -> PaymentResult<CreatePaymentBody<'_>> {
        if self.amount == 0 {
            return Err(PaymentError::failed("Payment amount must be positive"));
        }

        Ok(CreatePaymentBody {
            project_id,
            amount: self.amount,
            source: "",
            donater: self.donater.as_deref().unwrap_or(""),
            notes: self.notes.as_deref().unwrap_or(""),
            card: &self.card,
        })
    }
}

/// JSON body of a create-payment call
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentBody<'a> {
    pub project_id: i64,
    pub amount: u64,
    pub source: &'a str,
    pub donater: &'a str,
    pub notes: &'a str,
    pub card: &'a Card,
}

/// `data` of a successful create-payment envelope
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCreated {
    pub pay_id: String,
    pub checkout_url: String,
    #[serde(default)]
    pub donate_amount: Option<i64>,
    #[serde(default)]
    pub commission_amount: Option<i64>,
    #[serde(default)]
    pub total_amount: Option<i64>,
}

/// `data` of a successful user lookup
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUser {
    pub donate_id: i64,
    #[serde(default)]
    pub user_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Envelope;
    use serde_json::json;

    #[test]
    fn test_body_has_exact_shape() {
        let request = PaymentRequest::new(500186, Card::new(8600123412341234u64, 2709))
            .with_donater("Aziz")
            .with_notes("for the shelter");

        let body = serde_json::to_value(request.to_body(42).unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "projectId": 42,
                "amount": 500186,
                "source": "",
                "donater": "Aziz",
                "notes": "for the shelter",
                "card": { "pan": "8600123412341234", "expiry": "2709" }
            })
        );
    }

    #[test]
    fn test_optional_fields_default_to_empty_strings() {
        let request = PaymentRequest::new(1000, Card::new("8600", "0130"));
        let body = serde_json::to_value(request.to_body(7).unwrap()).unwrap();

        assert_eq!(body["donater"], "");
        assert_eq!(body["notes"], "");
        assert_eq!(body["card"]["expiry"], "0130");
        assert_eq!(body.as_object().unwrap().len(), 6);
    }

    #[test]
    fn test_zero_amount_rejected() {
        let request = PaymentRequest::new(0, Card::new("8600", "0130"));
        let err = request.to_body(7).unwrap_err();
        assert!(matches!(err, PaymentError::Failed(_)));
    }

    #[test]
    fn test_masked_pan() {
        assert_eq!(Card::new("8600123412345678", "0130").masked_pan(), "****5678");
        assert_eq!(Card::new("12", "0130").masked_pan(), "****12");
    }

    #[test]
    fn test_payment_created_view() {
        let envelope = Envelope::from_value(json!({
            "data": {
                "payId": "ecdd416a-1bba-4047-9ebb-808b24424487",
                "checkoutUrl": "https://checkout.multicard.uz/8ba58fb9",
                "donateAmount": 500186,
                "commissionAmount": 26326,
                "totalAmount": 526512
            },
            "success": true,
            "error": null
        }));

        let created: PaymentCreated = envelope.data_as().unwrap();
        assert_eq!(created.pay_id, "ecdd416a-1bba-4047-9ebb-808b24424487");
        assert_eq!(created.total_amount, Some(526512));
    }
}
