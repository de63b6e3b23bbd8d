//! Service layer API for marketplace operations
use crate::crop::{Crop, CropDraft, CropStatus, TimeStamp};
use crate::error::MarketError;
use crate::interest::{Interest, InterestStatus};
use crate::store::MarketStore;
use tracing::{debug, info, warn};

pub struct MarketService {
    store: MarketStore,
    // in future we could add a config for acceptance constraints
}

/// Request body for submitting a new interest against a crop.
#[derive(Debug, Clone)]
pub struct SubmitInterestRequest {
    pub crop_id: String,
    pub buyer_email: String,
    pub buyer_name: String,
    pub quantity: u64,
    pub message: Option<String>,
}

/// Outcome of a submission. `warning` is set when the request exceeds the
/// stock recorded at submission time; the interest is still appended as a
/// waitlist-style request and availability is re-checked at acceptance.
#[derive(Debug, Clone)]
pub struct InterestReceipt {
    pub interest_id: String,
    pub status: InterestStatus,
    pub warning: Option<String>,
}

/// Owner edits to a crop's descriptive fields. Remaining quantity is
/// deliberately absent: stock only moves through interest acceptance.
#[derive(Debug, Default, Clone)]
pub struct CropEdits {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit_price: Option<u64>,
    pub unit: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: Option<CropStatus>,
}

/// Result of deleting a crop. `warning` names how many still-pending
/// interests were discarded along with it.
#[derive(Debug)]
pub struct DeleteReceipt {
    pub crop: Crop,
    pub warning: Option<String>,
}

impl MarketService {
    pub fn new(store: MarketStore) -> Self {
        Self { store }
    }

    /// List a new crop for sale
    pub fn list_crop(&self, draft: CropDraft) -> Result<Crop, MarketError> {
        let crop = draft.build()?;
        self.store.create(&crop)?;
        info!(
            crop_id = %crop.id,
            owner = %crop.owner_email,
            quantity = crop.quantity,
            "crop listed"
        );
        Ok(crop)
    }

    pub fn get_crop(&self, crop_id: &str) -> Result<Crop, MarketError> {
        self.store.get(crop_id)
    }

    /// Owner-only field edits. Quantity is not editable here; see the note
    /// on [`CropEdits`].
    pub fn update_crop_details(
        &self,
        crop_id: &str,
        caller_email: &str,
        edits: CropEdits,
    ) -> Result<Crop, MarketError> {
        let updated = self.store.update(crop_id, |mut crop| {
            if crop.owner_email != caller_email {
                return Err(MarketError::Forbidden(format!(
                    "only the owner may edit crop {crop_id}"
                )));
            }
            if let Some(name) = &edits.name {
                crop.name = name.clone();
            }
            if let Some(category) = &edits.category {
                crop.category = category.clone();
            }
            if let Some(price) = edits.unit_price {
                crop.unit_price = price;
            }
            if let Some(unit) = &edits.unit {
                crop.unit = unit.clone();
            }
            if let Some(description) = &edits.description {
                crop.description = description.clone();
            }
            if let Some(location) = &edits.location {
                crop.location = location.clone();
            }
            if let Some(status) = edits.status {
                crop.status = status;
            }
            crop.touch();
            Ok(crop)
        })?;
        debug!(crop_id, "crop details updated");
        Ok(updated)
    }

    /// Owner-only delete. Cascades to every embedded interest; the receipt
    /// warns when any of them was still pending.
    pub fn delete_crop(
        &self,
        crop_id: &str,
        caller_email: &str,
    ) -> Result<DeleteReceipt, MarketError> {
        let crop = self.store.get(crop_id)?;
        if crop.owner_email != caller_email {
            return Err(MarketError::Forbidden(format!(
                "only the owner may delete crop {crop_id}"
            )));
        }

        let crop = self.store.remove(crop_id)?;
        let pending = crop.pending_interest_count();
        let warning = (pending > 0).then(|| {
            format!("{pending} pending interest(s) were discarded along with the crop")
        });
        info!(crop_id, pending_discarded = pending, "crop deleted");
        Ok(DeleteReceipt { crop, warning })
    }

    /// Submit a new interest in `pending` state.
    ///
    /// A request above the currently recorded stock is still accepted, with
    /// an advisory warning; stock can change before acceptance, so the
    /// authoritative check happens there. One interest per buyer per crop.
    pub fn submit_interest(
        &self,
        req: SubmitInterestRequest,
    ) -> Result<InterestReceipt, MarketError> {
        // validate before touching the store
        if req.buyer_email.trim().is_empty() {
            return Err(MarketError::InvalidArgument("buyer email is required".into()));
        }
        if req.buyer_name.trim().is_empty() {
            return Err(MarketError::InvalidArgument("buyer name is required".into()));
        }
        if req.quantity == 0 {
            return Err(MarketError::InvalidArgument(
                "requested quantity must be positive".into(),
            ));
        }

        let interest = Interest::new(
            &req.crop_id,
            &req.buyer_email,
            &req.buyer_name,
            req.quantity,
            req.message.clone(),
        )?;
        let interest_id = interest.id.clone();

        // the duplicate check rides inside the same conditional update as
        // the append, so two racing submissions from one buyer cannot both
        // land
        let crop = self.store.update(&req.crop_id, |mut crop| {
            if crop.interest_by_buyer(&req.buyer_email).is_some() {
                return Err(MarketError::Conflict {
                    crop_id: req.crop_id.clone(),
                    buyer: req.buyer_email.clone(),
                });
            }
            crop.interests.push(interest.clone());
            crop.touch();
            Ok(crop)
        })?;

        let warning = (req.quantity > crop.quantity).then(|| {
            format!(
                "requested {} but only {} currently available; interest is waitlisted",
                req.quantity, crop.quantity
            )
        });
        info!(
            crop_id = %req.crop_id,
            interest_id = %interest_id,
            quantity = req.quantity,
            waitlisted = warning.is_some(),
            "interest submitted"
        );
        Ok(InterestReceipt {
            interest_id,
            status: InterestStatus::Pending,
            warning,
        })
    }

    /// Drive an interest to `target`. Acceptance goes through the stock
    /// ledger; every other target is a plain status overwrite, except that
    /// nothing may leave `accepted` (the decrement has committed and there
    /// is no restock protocol).
    pub fn transition_interest(
        &self,
        interest_id: &str,
        target: InterestStatus,
    ) -> Result<Crop, MarketError> {
        match target {
            InterestStatus::Accepted => self.accept_interest(interest_id),
            _ => self.overwrite_status(interest_id, target),
        }
    }

    /// The stock ledger: accept one interest and decrement the crop's
    /// remaining quantity, indivisibly.
    ///
    /// The first read only produces a friendly early error; it can be stale
    /// by commit time. Correctness is carried entirely by the conditional
    /// update, which re-checks `status != accepted` and
    /// `quantity >= requested` against the document actually being swapped.
    /// Two concurrent acceptances can therefore never jointly decrement more
    /// than the available stock or drive it negative.
    fn accept_interest(&self, interest_id: &str) -> Result<Crop, MarketError> {
        let crop = self.store.find_by_interest(interest_id)?;
        let interest = crop
            .interest(interest_id)
            .ok_or_else(|| MarketError::NotFound(format!("interest {interest_id}")))?;
        if interest.status == InterestStatus::Accepted {
            return Err(MarketError::AlreadyProcessed(interest_id.to_string()));
        }
        if crop.quantity < interest.quantity {
            return Err(MarketError::InsufficientStock {
                requested: interest.quantity,
                available: crop.quantity,
            });
        }

        let crop_id = crop.id.clone();
        let updated = self.store.update(&crop_id, |mut crop| {
            let idx = crop
                .interest_index(interest_id)
                .ok_or_else(|| MarketError::NotFound(format!("interest {interest_id}")))?;
            let requested = crop.interests[idx].quantity;
            if crop.interests[idx].status == InterestStatus::Accepted {
                return Err(MarketError::AlreadyProcessed(interest_id.to_string()));
            }
            if crop.quantity < requested {
                warn!(
                    crop_id = %crop.id,
                    interest_id,
                    requested,
                    available = crop.quantity,
                    "acceptance refused at commit time"
                );
                return Err(MarketError::InsufficientStock {
                    requested,
                    available: crop.quantity,
                });
            }
            crop.quantity -= requested;
            crop.interests[idx].status = InterestStatus::Accepted;
            crop.interests[idx].updated_at = TimeStamp::new();
            crop.touch();
            Ok(crop)
        })?;
        info!(
            crop_id = %updated.id,
            interest_id,
            remaining = updated.quantity,
            "interest accepted, stock decremented"
        );
        Ok(updated)
    }

    fn overwrite_status(
        &self,
        interest_id: &str,
        target: InterestStatus,
    ) -> Result<Crop, MarketError> {
        let crop = self.store.find_by_interest(interest_id)?;
        let crop_id = crop.id.clone();
        let updated = self.store.update(&crop_id, |mut crop| {
            let idx = crop
                .interest_index(interest_id)
                .ok_or_else(|| MarketError::NotFound(format!("interest {interest_id}")))?;
            // accepted is terminal; allowing it to be overwritten would leak
            // the committed decrement
            if crop.interests[idx].status == InterestStatus::Accepted {
                return Err(MarketError::AlreadyProcessed(interest_id.to_string()));
            }
            crop.interests[idx].status = target;
            crop.interests[idx].updated_at = TimeStamp::new();
            crop.touch();
            Ok(crop)
        })?;
        debug!(crop_id = %updated.id, interest_id, status = %target, "interest status updated");
        Ok(updated)
    }
}
