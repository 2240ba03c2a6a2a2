//! Asset descriptors and receiver paths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::address::Address;
use crate::error::DecodeError;

/// The key under which an account exposes its receiver for one asset,
/// e.g. `flowTokenReceiver`.
///
/// Receiver paths are identifiers: ASCII letters, digits and `_`, not
/// starting with a digit.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReceiverPath(String);

impl ReceiverPath {
    pub fn new(raw: impl Into<String>) -> Result<Self, DecodeError> {
        let raw = raw.into();
        let mut chars = raw.chars();
        let valid = match chars.next() {
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            None => false,
        };
        if valid {
            Ok(Self(raw))
        } else {
            Err(DecodeError::MalformedReceiverPath(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ReceiverPath {
    type Err = DecodeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ReceiverPath {
    type Error = DecodeError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ReceiverPath> for String {
    fn from(path: ReceiverPath) -> Self {
        path.0
    }
}

impl fmt::Display for ReceiverPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ReceiverPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReceiverPath({})", self.0)
    }
}

/// Identity of a fungible asset: the issuing contract's address and name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId {
    pub contract_address: Address,
    pub contract_name: String,
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.contract_address, self.contract_name)
    }
}

/// One asset a splitter accepts: which asset, and where receivers for it live.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetDescriptor {
    pub contract_address: Address,
    pub contract_name: String,
    pub receiver_path: ReceiverPath,
}

impl AssetDescriptor {
    pub fn new(contract_address: Address, contract_name: impl Into<String>, receiver_path: ReceiverPath) -> Self {
        Self {
            contract_address,
            contract_name: contract_name.into(),
            receiver_path,
        }
    }

    pub fn asset_id(&self) -> AssetId {
        AssetId {
            contract_address: self.contract_address,
            contract_name: self.contract_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receiver_paths_are_identifiers() {
        assert!(ReceiverPath::new("flowTokenReceiver").is_ok());
        assert!(ReceiverPath::new("_fusd_receiver2").is_ok());
        for bad in ["", "2fast", "flow/receiver", "has space"] {
            assert!(ReceiverPath::new(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn asset_id_ignores_receiver_path() {
        let a = AssetDescriptor::new(Address::new(7), "FUSD", ReceiverPath::new("fusdReceiver").unwrap());
        let b = AssetDescriptor::new(Address::new(7), "FUSD", ReceiverPath::new("otherReceiver").unwrap());
        assert_eq!(a.asset_id(), b.asset_id());
        assert_eq!(a.asset_id().to_string(), "0x0000000000000007.FUSD");
    }
}
