use serde::Deserialize;

/// The slice of a gateway event envelope the shop cares about. Unknown
/// fields are ignored so new event payload versions do not break parsing.
#[derive(Debug, Deserialize)]
pub struct GatewayEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: GatewayEventData,
}

#[derive(Debug, Deserialize)]
pub struct GatewayEventData {
    pub object: GatewayObject,
}

#[derive(Debug, Deserialize)]
pub struct GatewayObject {
    pub id: String,
    /// "checkout.session" or "payment_intent".
    #[serde(rename = "object")]
    pub object_type: Option<String>,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
}

impl GatewayObject {
    pub fn is_payment_intent(&self) -> bool {
        self.object_type.as_deref() == Some("payment_intent")
    }

    /// The payment intent id for a failure event: the object's own id when
    /// the object is an intent, otherwise the session's `payment_intent`.
    pub fn failure_intent(&self) -> Option<&str> {
        if self.is_payment_intent() {
            Some(&self.id)
        } else {
            self.payment_intent.as_deref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_checkout_session_completed() {
        let body = r#"{
            "id": "evt_123",
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_abc",
                    "object": "checkout.session",
                    "payment_intent": "pi_123",
                    "payment_status": "paid",
                    "amount_total": 1250
                }
            }
        }"#;

        let event: GatewayEvent = serde_json::from_str(body).unwrap();
        assert_eq!(event.kind, "checkout.session.completed");
        assert_eq!(event.data.object.id, "cs_test_abc");
        assert_eq!(event.data.object.payment_intent.as_deref(), Some("pi_123"));
        assert!(!event.data.object.is_payment_intent());
    }

    #[test]
    fn parses_payment_intent_failed() {
        let body = r#"{
            "type": "payment_intent.payment_failed",
            "data": {
                "object": {
                    "id": "pi_456",
                    "object": "payment_intent",
                    "last_payment_error": {"message": "card declined"}
                }
            }
        }"#;

        let event: GatewayEvent = serde_json::from_str(body).unwrap();
        assert_eq!(event.kind, "payment_intent.payment_failed");
        assert!(event.data.object.is_payment_intent());
        assert_eq!(event.data.object.payment_intent, None);
        // an intent-shaped object is its own intent id
        assert_eq!(event.data.object.failure_intent(), Some("pi_456"));
    }

    #[test]
    fn session_shaped_failure_keeps_its_intent() {
        let body = r#"{
            "type": "checkout.session.async_payment_failed",
            "data": {
                "object": {
                    "id": "cs_test_abc",
                    "object": "checkout.session",
                    "payment_intent": "pi_789",
                    "payment_status": "unpaid"
                }
            }
        }"#;

        let event: GatewayEvent = serde_json::from_str(body).unwrap();
        assert!(!event.data.object.is_payment_intent());
        assert_eq!(event.data.object.failure_intent(), Some("pi_789"));
    }
}
