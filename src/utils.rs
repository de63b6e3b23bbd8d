//! Identifier generation helpers

use crate::error::MarketError;
use bech32::Bech32m;
use uuid7::uuid7;

// construct a fresh uuid7 then encode using bech32 with a readable prefix
pub fn new_uuid_to_bech32(hrp: &str) -> Result<String, MarketError> {
    let parsed = bech32::Hrp::parse(hrp)
        .map_err(|err| MarketError::InvalidArgument(format!("bad id prefix {hrp:?}: {err}")))?;
    let encoded = bech32::encode::<Bech32m>(parsed, uuid7().as_bytes())
        .map_err(|err| MarketError::Unavailable(err.to_string()))?;
    Ok(encoded)
}
