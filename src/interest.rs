//! Buyer interest records, embedded in their owning crop
use crate::crop::TimeStamp;
use crate::error::MarketError;
use crate::utils;
use chrono::Utc;
use std::fmt;
use std::str::FromStr;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterestStatus {
    #[n(0)]
    Pending,
    #[n(1)]
    Accepted,
    #[n(2)]
    Rejected,
    #[n(3)]
    Cancelled,
}

impl InterestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterestStatus::Pending => "pending",
            InterestStatus::Accepted => "accepted",
            InterestStatus::Rejected => "rejected",
            InterestStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InterestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Transport layers hand us the target status as a string; parsing is the
// validation boundary for it.
impl FromStr for InterestStatus {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InterestStatus::Pending),
            "accepted" => Ok(InterestStatus::Accepted),
            "rejected" => Ok(InterestStatus::Rejected),
            "cancelled" => Ok(InterestStatus::Cancelled),
            other => Err(MarketError::InvalidArgument(format!(
                "unknown interest status {other:?}"
            ))),
        }
    }
}

/// One buyer's expression of demand against one crop. Lives only inside the
/// parent crop's interest list.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Interest {
    #[n(0)]
    pub id: String, // uuid7, bech32 encoded with "intr_" prefix
    #[n(1)]
    pub crop_id: String,
    #[n(2)]
    pub buyer_email: String,
    #[n(3)]
    pub buyer_name: String,
    #[n(4)]
    pub quantity: u64, // always > 0
    #[n(5)]
    pub message: Option<String>,
    #[n(6)]
    pub status: InterestStatus,
    #[n(7)]
    pub created_at: TimeStamp<Utc>,
    #[n(8)]
    pub updated_at: TimeStamp<Utc>,
}

impl Interest {
    pub fn new(
        crop_id: &str,
        buyer_email: &str,
        buyer_name: &str,
        quantity: u64,
        message: Option<String>,
    ) -> Result<Self, MarketError> {
        let now = TimeStamp::new();
        Ok(Self {
            id: utils::new_uuid_to_bech32("intr_")?,
            crop_id: crop_id.to_string(),
            buyer_email: buyer_email.to_string(),
            buyer_name: buyer_name.to_string(),
            quantity,
            message,
            status: InterestStatus::Pending,
            created_at: now.clone(),
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_all_known_values() {
        for status in [
            InterestStatus::Pending,
            InterestStatus::Accepted,
            InterestStatus::Rejected,
            InterestStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<InterestStatus>().unwrap(), status);
        }
    }

    #[test]
    fn status_rejects_unknown_value() {
        let err = "approved".parse::<InterestStatus>().unwrap_err();
        assert!(matches!(err, MarketError::InvalidArgument(_)));
    }

    #[test]
    fn new_interest_starts_pending() {
        let interest =
            Interest::new("crop_abc", "buyer@example.com", "B. Buyer", 40, None).unwrap();

        assert!(interest.id.starts_with("intr_"));
        assert_eq!(interest.status, InterestStatus::Pending);
        assert_eq!(interest.quantity, 40);
    }

    #[test]
    fn interest_encoding() {
        let original = Interest::new(
            "crop_abc",
            "buyer@example.com",
            "B. Buyer",
            40,
            Some("half now, half next week?".to_string()),
        )
        .unwrap();

        let encoding = minicbor::to_vec(&original).unwrap();
        let decoded: Interest = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decoded);
    }
}
