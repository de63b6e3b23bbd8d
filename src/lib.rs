//! Interest and stock-ledger core for an agricultural marketplace.
//!
//! Producers list crops, buyers express interest against them, and accepting
//! an interest atomically decrements the crop's remaining stock. Every
//! interest lives embedded inside its owning crop document, so all
//! cross-request safety rides on one conditional update against the store;
//! see [`store::MarketStore::update`] and [`service::MarketService`].

pub mod auth;
pub mod crop;
pub mod error;
pub mod interest;
pub mod service;
pub mod store;
pub mod utils;
