//! The crop aggregate: a sell offer together with its embedded interest list
use crate::error::MarketError;
use crate::interest::{Interest, InterestStatus};
use crate::utils;
use chrono::{DateTime, TimeZone, Utc};

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropStatus {
    #[n(0)]
    Pending,
    #[n(1)]
    Active,
    #[n(2)]
    Closed,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct TimeStamp<T: TimeZone>(DateTime<T>);

impl TimeStamp<Utc> {
    pub fn new() -> Self {
        Self(Utc::now())
    }
}

/// A producer's sell offer. Owns its interest list exclusively; interests
/// have no identity outside their parent crop, and every mutation of one is
/// expressed as a scoped update to the whole document.
#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Crop {
    #[n(0)]
    pub id: String, // uuid7, bech32 encoded with "crop_" prefix
    #[n(1)]
    pub name: String,
    #[n(2)]
    pub category: String,
    #[n(3)]
    pub unit_price: u64, // minor currency units
    #[n(4)]
    pub unit: String, // unit label, e.g. "kg"
    #[n(5)]
    pub quantity: u64, // remaining stock
    #[n(6)]
    pub description: String,
    #[n(7)]
    pub location: String,
    #[n(8)]
    pub owner_email: String,
    #[n(9)]
    pub owner_name: String,
    #[n(10)]
    pub status: CropStatus,
    #[n(11)]
    pub created_at: TimeStamp<Utc>,
    #[n(12)]
    pub updated_at: TimeStamp<Utc>,
    #[n(13)]
    pub interests: Vec<Interest>, // insertion order = submission order
}

impl Crop {
    pub fn interest(&self, interest_id: &str) -> Option<&Interest> {
        self.interests.iter().find(|i| i.id == interest_id)
    }
    pub fn interest_index(&self, interest_id: &str) -> Option<usize> {
        self.interests.iter().position(|i| i.id == interest_id)
    }
    pub fn interest_by_buyer(&self, buyer_email: &str) -> Option<&Interest> {
        self.interests.iter().find(|i| i.buyer_email == buyer_email)
    }
    pub fn pending_interest_count(&self) -> usize {
        self.interests
            .iter()
            .filter(|i| i.status == InterestStatus::Pending)
            .count()
    }
    pub fn touch(&mut self) {
        self.updated_at = TimeStamp::new();
    }
}

/// Draft for a new crop listing. Field setters consume and return the draft;
/// `build` validates everything and mints the finished aggregate.
#[derive(Debug, Default, Clone)]
pub struct CropDraft {
    name: Option<String>,
    category: Option<String>,
    unit_price: u64,
    unit: Option<String>,
    quantity: u64,
    description: Option<String>,
    location: Option<String>,
    owner_email: Option<String>,
    owner_name: Option<String>,
}

impl CropDraft {
    /// Construct a new draft object, the basis for a listing
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
    pub fn set_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }
    pub fn set_unit_price(mut self, price: u64) -> Self {
        self.unit_price = price;
        self
    }
    pub fn set_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }
    pub fn set_quantity(mut self, quantity: u64) -> Self {
        self.quantity = quantity;
        self
    }
    pub fn set_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
    pub fn set_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }
    pub fn set_owner(mut self, email: &str, name: &str) -> Self {
        self.owner_email = Some(email.to_string());
        self.owner_name = Some(name.to_string());
        self
    }

    /// Checks fields, then mints the aggregate with a fresh id, `Pending`
    /// status and creation timestamps.
    pub fn build(self) -> Result<Crop, MarketError> {
        let name = require(self.name, "name")?;
        let category = require(self.category, "category")?;
        let unit = require(self.unit, "unit")?;
        let owner_email = require(self.owner_email, "owner email")?;
        let owner_name = require(self.owner_name, "owner name")?;

        if !owner_email.contains('@') {
            return Err(MarketError::InvalidArgument(format!(
                "owner email {owner_email:?} is not an email address"
            )));
        }
        if self.unit_price == 0 {
            return Err(MarketError::InvalidArgument(
                "unit price must be positive".into(),
            ));
        }
        if self.quantity == 0 {
            return Err(MarketError::InvalidArgument(
                "a listing needs a positive quantity of stock".into(),
            ));
        }

        let now = TimeStamp::new();
        Ok(Crop {
            id: utils::new_uuid_to_bech32("crop_")?,
            name,
            category,
            unit_price: self.unit_price,
            unit,
            quantity: self.quantity,
            description: self.description.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            owner_email,
            owner_name,
            status: CropStatus::Pending,
            created_at: now.clone(),
            updated_at: now,
            interests: vec![],
        })
    }
}

fn require(field: Option<String>, what: &str) -> Result<String, MarketError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(MarketError::InvalidArgument(format!("{what} is required"))),
    }
}

impl<T: TimeZone> From<DateTime<T>> for TimeStamp<T> {
    fn from(value: DateTime<T>) -> Self {
        TimeStamp(value)
    }
}

impl<C> minicbor::Encode<C> for TimeStamp<Utc> {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if let Some(nsec) = self.0.timestamp_nanos_opt() {
            return e.i64(nsec)?.ok();
        }

        Err(minicbor::encode::Error::message(
            "failed to encode timestamp. timestamp_nanos_opt returned None",
        ))
    }
}

impl<'b, C> minicbor::Decode<'b, C> for TimeStamp<Utc> {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let nsecs = d.i64()?;

        Ok(TimeStamp(DateTime::from_timestamp_nanos(nsecs)))
    }
}
