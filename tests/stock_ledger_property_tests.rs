//! Property-based tests for the stock ledger and submission invariants
//!
//! These use proptest to check the ledger's accounting across a wide range of
//! generated stock levels and interest quantities. The invariants under test
//! hold for every input, not just the hand-picked scenarios:
//!
//! 1. No oversell - accepted quantities never sum past the initial stock
//! 2. Exact accounting - remaining stock always equals initial minus accepted
//! 3. Deterministic refusal - a failed accept always reports the true
//!    requested/available pair
//! 4. Uniqueness - one interest per buyer per crop, for any quantities
//! 5. Terminality - accepted interests refuse every further transition

use crop_market::crop::CropDraft;
use crop_market::error::MarketError;
use crop_market::interest::InterestStatus;
use crop_market::service::{MarketService, SubmitInterestRequest};
use crop_market::store::MarketStore;
use proptest::prelude::*;
use tempfile::TempDir;

fn fresh_service() -> (TempDir, MarketService) {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let store = MarketStore::open(temp_dir.path().join("prop.db")).expect("open store");
    (temp_dir, MarketService::new(store))
}

fn listed_crop(service: &MarketService, quantity: u64) -> String {
    service
        .list_crop(
            CropDraft::new()
                .set_name("Winter Wheat")
                .set_category("grain")
                .set_unit_price(250)
                .set_unit("kg")
                .set_quantity(quantity)
                .set_owner("grower@example.com", "A. Grower"),
        )
        .expect("list crop")
        .id
}

fn submit(service: &MarketService, crop_id: &str, n: usize, quantity: u64) -> String {
    service
        .submit_interest(SubmitInterestRequest {
            crop_id: crop_id.to_string(),
            buyer_email: format!("buyer-{n}@example.com"),
            buyer_name: format!("Buyer {n}"),
            quantity,
            message: None,
        })
        .expect("submit interest")
        .interest_id
}

/// Strategy to generate a stock level worth contending over
fn stock_strategy() -> impl Strategy<Value = u64> {
    1u64..=150
}

/// Strategy to generate a batch of interest quantities (1 to 8 buyers)
fn quantities_strategy() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(1u64..=60, 1..=8)
}

proptest! {
    // each case opens its own sled db, so keep the case count modest
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: accepting any batch of interests in order never oversells,
    /// and the remaining stock is exactly the initial stock minus everything
    /// accepted. Failed accepts report the true requested/available pair.
    #[test]
    fn prop_accepts_never_oversell(
        stock in stock_strategy(),
        quantities in quantities_strategy(),
    ) {
        let (_dir, service) = fresh_service();
        let crop_id = listed_crop(&service, stock);

        let interest_ids: Vec<String> = quantities
            .iter()
            .enumerate()
            .map(|(n, &q)| submit(&service, &crop_id, n, q))
            .collect();

        let mut remaining = stock;
        for (interest_id, &requested) in interest_ids.iter().zip(&quantities) {
            match service.transition_interest(interest_id, InterestStatus::Accepted) {
                Ok(crop) => {
                    prop_assert!(requested <= remaining, "an accept that does not fit committed");
                    remaining -= requested;
                    prop_assert_eq!(crop.quantity, remaining);
                }
                Err(MarketError::InsufficientStock { requested: r, available }) => {
                    prop_assert_eq!(r, requested);
                    prop_assert_eq!(available, remaining);
                    prop_assert!(requested > remaining);
                }
                Err(other) => prop_assert!(false, "unexpected error: {other:?}"),
            }
        }

        let crop = service.get_crop(&crop_id).unwrap();
        prop_assert_eq!(crop.quantity, remaining);

        let accepted_total: u64 = crop
            .interests
            .iter()
            .filter(|i| i.status == InterestStatus::Accepted)
            .map(|i| i.quantity)
            .sum();
        prop_assert_eq!(accepted_total, stock - remaining);
        prop_assert!(accepted_total <= stock);
    }

    /// Property: a second interest from the same buyer always conflicts and
    /// never disturbs the first, whatever the quantities involved.
    #[test]
    fn prop_duplicate_buyer_always_conflicts(
        stock in stock_strategy(),
        first_quantity in 1u64..=60,
        second_quantity in 1u64..=60,
    ) {
        let (_dir, service) = fresh_service();
        let crop_id = listed_crop(&service, stock);

        let interest_id = submit(&service, &crop_id, 1, first_quantity);

        let result = service.submit_interest(SubmitInterestRequest {
            crop_id: crop_id.clone(),
            buyer_email: "buyer-1@example.com".to_string(),
            buyer_name: "Buyer 1".to_string(),
            quantity: second_quantity,
            message: None,
        });
        prop_assert!(
            matches!(result, Err(MarketError::Conflict { .. })),
            "expected Conflict, got {:?}",
            result
        );

        let crop = service.get_crop(&crop_id).unwrap();
        prop_assert_eq!(crop.interests.len(), 1);
        prop_assert_eq!(crop.interest(&interest_id).unwrap().quantity, first_quantity);
    }

    /// Property: the submission warning fires exactly when the request
    /// exceeds the stock recorded at submission time.
    #[test]
    fn prop_warning_iff_request_exceeds_stock(
        stock in stock_strategy(),
        quantity in 1u64..=300,
    ) {
        let (_dir, service) = fresh_service();
        let crop_id = listed_crop(&service, stock);

        let receipt = service
            .submit_interest(SubmitInterestRequest {
                crop_id,
                buyer_email: "buyer-1@example.com".to_string(),
                buyer_name: "Buyer 1".to_string(),
                quantity,
                message: None,
            })
            .unwrap();

        prop_assert_eq!(receipt.warning.is_some(), quantity > stock);
        prop_assert_eq!(receipt.status, InterestStatus::Pending);
    }

    /// Property: once accepted, an interest refuses every further transition
    /// and the committed decrement never moves again.
    #[test]
    fn prop_accepted_is_terminal(
        stock in stock_strategy(),
        quantity in 1u64..=150,
    ) {
        prop_assume!(quantity <= stock);

        let (_dir, service) = fresh_service();
        let crop_id = listed_crop(&service, stock);
        let interest_id = submit(&service, &crop_id, 1, quantity);

        service
            .transition_interest(&interest_id, InterestStatus::Accepted)
            .unwrap();
        let expected_remaining = stock - quantity;

        for target in [
            InterestStatus::Pending,
            InterestStatus::Accepted,
            InterestStatus::Rejected,
            InterestStatus::Cancelled,
        ] {
            let result = service.transition_interest(&interest_id, target);
            prop_assert!(matches!(result, Err(MarketError::AlreadyProcessed(_))));
        }

        let crop = service.get_crop(&crop_id).unwrap();
        prop_assert_eq!(crop.quantity, expected_remaining);
        prop_assert_eq!(
            crop.interest(&interest_id).unwrap().status,
            InterestStatus::Accepted
        );
    }
}
