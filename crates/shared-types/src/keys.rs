//! # Store Keys
//!
//! Names of the chain's module stores and the keys records live under.
//! Every authenticated read names a store and a key from this module.

use crate::entities::Address;

/// Module store holding oracle params and registration / upgrade records.
pub const ORACLE_STORE: &str = "oracle";

/// Module store holding deals and sales.
pub const DATADEAL_STORE: &str = "datadeal";

/// Module store holding accounts.
pub const AUTH_STORE: &str = "auth";

/// Key of the oracle params.
pub fn oracle_params_key() -> Vec<u8> {
    b"params".to_vec()
}

/// Key of a registration record.
pub fn registration_key(unique_id: &str, node_address: &Address) -> Vec<u8> {
    format!("registration/{}/{}", unique_id, hex::encode(node_address)).into_bytes()
}

/// Key of an upgrade record.
pub fn upgrade_key(unique_id: &str, node_address: &Address) -> Vec<u8> {
    format!("upgrade/{}/{}", unique_id, hex::encode(node_address)).into_bytes()
}

/// Key of a deal.
pub fn deal_key(deal_id: u64) -> Vec<u8> {
    format!("deal/{deal_id}").into_bytes()
}

/// Key of a sale.
pub fn sale_key(deal_id: u64, seller_address: &Address) -> Vec<u8> {
    format!("sale/{}/{}", deal_id, hex::encode(seller_address)).into_bytes()
}

/// Key of an account.
pub fn account_key(address: &Address) -> Vec<u8> {
    format!("account/{}", hex::encode(address)).into_bytes()
}

/// Parse a hex account address from an event attribute.
pub fn parse_address(value: &str) -> Option<Address> {
    hex::decode(value.trim_start_matches("0x"))
        .ok()
        .and_then(|bytes| bytes.try_into().ok())
}
