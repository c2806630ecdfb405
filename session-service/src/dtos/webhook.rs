use serde::Deserialize;
use uuid::Uuid;

/// The only billing event that changes state.
pub const USER_UPGRADED_EVENT: &str = "user.upgraded";

/// Body posted by the billing provider. Missing fields default to empty; only
/// an upgrade needs `data.user_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingEvent {
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub data: BillingEventData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillingEventData {
    #[serde(default)]
    pub user_id: String,
}

/// What a webhook delivery did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Upgraded(Uuid),
    Ignored,
}

impl BillingEvent {
    pub fn is_upgrade(&self) -> bool {
        self.event == USER_UPGRADED_EVENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_payload() {
        let event: BillingEvent = serde_json::from_str(
            r#"{"event":"user.upgraded","data":{"user_id":"3311741c-680c-4546-99f3-fc9efac2036c"}}"#,
        )
        .unwrap();
        assert!(event.is_upgrade());
        assert_eq!(event.data.user_id, "3311741c-680c-4546-99f3-fc9efac2036c");
    }

    #[test]
    fn other_events_are_not_upgrades() {
        let event: BillingEvent =
            serde_json::from_str(r#"{"event":"user.downgraded","data":{"user_id":"x"}}"#).unwrap();
        assert!(!event.is_upgrade());
    }

    #[test]
    fn data_may_be_omitted() {
        let event: BillingEvent = serde_json::from_str(r#"{"event":"user.downgraded"}"#).unwrap();
        assert!(!event.is_upgrade());
        assert!(event.data.user_id.is_empty());
    }
}
