//! End-to-end walkthrough of the marketplace core against a throwaway db.
//!
//! Run with `cargo run --example market`.

use anyhow::Result;
use crop_market::auth::{IdentityVerifier, TokenRegistry};
use crop_market::crop::CropDraft;
use crop_market::error::MarketError;
use crop_market::interest::InterestStatus;
use crop_market::service::{MarketService, SubmitInterestRequest};
use crop_market::store::MarketStore;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let dir = tempfile::tempdir()?;
    let store = MarketStore::open(dir.path().join("market.db"))?;
    let service = MarketService::new(store);

    // the transport layer would hand us a verified identity; stand one up
    let mut registry = TokenRegistry::new();
    registry.register("grower-token", "meadow@example.com");
    let grower = registry.verify("grower-token")?;

    let crop = service.list_crop(
        CropDraft::new()
            .set_name("Heritage Tomatoes")
            .set_category("vegetable")
            .set_unit_price(320)
            .set_unit("kg")
            .set_quantity(100)
            .set_location("Riverside polytunnel")
            .set_owner(&grower, "Meadow Farm"),
    )?;
    println!(
        "listed {} with {} {} available",
        crop.name, crop.quantity, crop.unit
    );

    let first = service.submit_interest(SubmitInterestRequest {
        crop_id: crop.id.clone(),
        buyer_email: "kitchen@example.com".into(),
        buyer_name: "Riverside Kitchen".into(),
        quantity: 40,
        message: Some("weekly standing order?".into()),
    })?;

    let second = service.submit_interest(SubmitInterestRequest {
        crop_id: crop.id.clone(),
        buyer_email: "wholesale@example.com".into(),
        buyer_name: "County Wholesale".into(),
        quantity: 120,
        message: None,
    })?;
    if let Some(warning) = &second.warning {
        println!("warning: {warning}");
    }

    let crop_after = service.transition_interest(&first.interest_id, InterestStatus::Accepted)?;
    println!("accepted 40 kg, {} left", crop_after.quantity);

    match service.transition_interest(&second.interest_id, InterestStatus::Accepted) {
        Err(MarketError::InsufficientStock {
            requested,
            available,
        }) => println!("cannot accept: requested {requested}, available {available}"),
        other => println!("unexpected outcome: {other:?}"),
    }

    // decline the waitlisted request the way a route handler would,
    // starting from the raw status string
    let target: InterestStatus = "rejected".parse()?;
    service.transition_interest(&second.interest_id, target)?;

    let receipt = service.delete_crop(&crop.id, &grower)?;
    if let Some(warning) = receipt.warning {
        println!("warning: {warning}");
    }

    Ok(())
}
