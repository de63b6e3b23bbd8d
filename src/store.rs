//! Sled-backed document store for crop aggregates.
//!
//! Each crop is one CBOR-encoded document keyed by its id. The interesting
//! primitive is [`MarketStore::update`]: a conditional whole-document update
//! built on `compare_and_swap`, which is what makes interest acceptance
//! race-free without any in-process locking.

use crate::crop::Crop;
use crate::error::MarketError;
use std::path::Path;

pub struct MarketStore {
    db: sled::Db,
}

impl MarketStore {
    /// Open (or create) the database at `path`. Connecting is explicit and
    /// fallible; there is no lazy global handle.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MarketError> {
        Ok(Self {
            db: sled::open(path)?,
        })
    }

    fn decode(bytes: &[u8]) -> Result<Crop, MarketError> {
        Ok(minicbor::decode(bytes)?)
    }

    pub fn get(&self, crop_id: &str) -> Result<Crop, MarketError> {
        let bytes = self
            .db
            .get(crop_id.as_bytes())?
            .ok_or_else(|| MarketError::NotFound(format!("crop {crop_id}")))?;
        Self::decode(&bytes)
    }

    /// Insert a brand-new crop. Refuses to overwrite an existing document.
    pub fn create(&self, crop: &Crop) -> Result<(), MarketError> {
        let encoded = minicbor::to_vec(crop)?;
        self.db
            .compare_and_swap(crop.id.as_bytes(), None::<&[u8]>, Some(encoded))?
            .map_err(|_| MarketError::Unavailable(format!("crop id {} already taken", crop.id)))
    }

    /// Remove a crop document, returning its final state. Embedded interests
    /// go with it.
    pub fn remove(&self, crop_id: &str) -> Result<Crop, MarketError> {
        let bytes = self
            .db
            .remove(crop_id.as_bytes())?
            .ok_or_else(|| MarketError::NotFound(format!("crop {crop_id}")))?;
        Self::decode(&bytes)
    }

    /// Find the crop owning the given interest by scanning the tree.
    /// Interests carry no identity of their own outside their parent.
    pub fn find_by_interest(&self, interest_id: &str) -> Result<Crop, MarketError> {
        for entry in self.db.iter() {
            let (_, bytes) = entry?;
            let crop = Self::decode(&bytes)?;
            if crop.interests.iter().any(|i| i.id == interest_id) {
                return Ok(crop);
            }
        }
        Err(MarketError::NotFound(format!("interest {interest_id}")))
    }

    /// Conditional whole-document update.
    ///
    /// `apply` receives the current document and either returns the next
    /// version or aborts with an error; the swap only commits if the
    /// document is still the one `apply` saw. Losing the race re-reads and
    /// re-runs `apply` against the fresh document, so any precondition it
    /// checks (stock level, interest status) holds at commit time, not just
    /// at read time. Concurrent updates to one crop therefore serialize in
    /// commit order and an aborted `apply` leaves the document untouched.
    pub fn update<F>(&self, crop_id: &str, mut apply: F) -> Result<Crop, MarketError>
    where
        F: FnMut(Crop) -> Result<Crop, MarketError>,
    {
        loop {
            let current = self
                .db
                .get(crop_id.as_bytes())?
                .ok_or_else(|| MarketError::NotFound(format!("crop {crop_id}")))?;
            let next = apply(Self::decode(&current)?)?;
            let encoded = minicbor::to_vec(&next)?;
            match self
                .db
                .compare_and_swap(crop_id.as_bytes(), Some(&current), Some(encoded))?
            {
                Ok(()) => return Ok(next),
                // lost to a concurrent writer; retry against the new state
                Err(_) => continue,
            }
        }
    }
}
