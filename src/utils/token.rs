use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::default::Default;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A graph vertex. Identity is the address only; symbol and decimals are
/// descriptive and the first sighting wins.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Token {
    address: Address,
    decimals: u8,
    symbol: Option<String>,
}

pub type TokenWrapper = Arc<Token>;

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.get_address()
    }
}

impl Eq for Token {}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        self.address.cmp(&other.get_address())
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Token {
    pub fn new(address: Address) -> Token {
        Token { address, decimals: 18, ..Token::default() }
    }

    pub fn new_with_data(address: Address, symbol: Option<String>, decimals: Option<u8>) -> Token {
        Token { address, symbol, decimals: decimals.unwrap_or(18) }
    }

    // For testing purposes
    pub fn repeat_byte(byte: u8) -> Token {
        Token::new(Address::repeat_byte(byte))
    }

    pub fn get_symbol(&self) -> String {
        self.symbol.clone().unwrap_or(self.address.to_string())
    }

    pub fn get_decimals(&self) -> u8 {
        self.decimals
    }

    pub fn get_address(&self) -> Address {
        self.address
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_serialize() {
        let usdc = Token::new_with_data(address!("0xaf88d065e77c8cc2239327c5edb3a432268e5831"), Some("USDC".to_string()), Some(6));

        let serialized = serde_json::to_string(&usdc).unwrap();
        assert_eq!(serialized, "{\"address\":\"0xaf88d065e77c8cc2239327c5edb3a432268e5831\",\"decimals\":6,\"symbol\":\"USDC\"}");
    }

    #[test]
    fn test_identity_is_address() {
        let a = Token::new_with_data(Address::repeat_byte(1), Some("A".to_string()), Some(6));
        let b = Token::new_with_data(Address::repeat_byte(1), Some("B".to_string()), Some(18));
        assert_eq!(a, b);
        assert!(Token::repeat_byte(1) < Token::repeat_byte(2));
    }
}
