//! Structured-data session signing (OSM-15).
//!
//! The signing scheme itself lives outside this crate. It is consumed
//! through `TypedDataSigner`; this module only shapes the payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::wallet::address::Address;
use crate::wallet::keys::KeyMaterial;
use crate::wallet::types::WalletResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedDomain {
    pub name: String,
    pub version: String,
    #[serde(rename = "chainId")]
    pub chain_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedMember {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl TypedMember {
    pub fn new(name: &str, ty: &str) -> Self {
        Self {
            name: name.to_string(),
            ty: ty.to_string(),
        }
    }
}

/// Domain-separated structured message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedData {
    pub domain: TypedDomain,
    pub types: BTreeMap<String, Vec<TypedMember>>,
    #[serde(rename = "primaryType")]
    pub primary_type: String,
    pub message: Map<String, Value>,
}

/// External structured-data signing capability.
pub trait TypedDataSigner {
    /// Sign `data` with `keys`, returning the scheme's signature text.
    fn sign_typed_data(&self, data: &TypedData, keys: &KeyMaterial) -> WalletResult<String>;
}

/// `Login{action, user}` payload used to open a session as `address`.
pub fn session_login(domain_name: &str, address: &Address) -> TypedData {
    let mut types = BTreeMap::new();
    types.insert(
        "Login".to_string(),
        vec![
            TypedMember::new("action", "string"),
            TypedMember::new("user", "string"),
        ],
    );

    let mut message = Map::new();
    message.insert("action".into(), Value::from("Session Login"));
    message.insert("user".into(), Value::from(address.as_str()));

    TypedData {
        domain: TypedDomain {
            name: domain_name.to_string(),
            version: "1".to_string(),
            chain_id: 1,
        },
        types,
        primary_type: "Login".to_string(),
        message,
    }
}

/// Sign a session login for `keys` through `signer`.
pub fn sign_session_login<S: TypedDataSigner + ?Sized>(
    signer: &S,
    domain_name: &str,
    keys: &KeyMaterial,
) -> WalletResult<String> {
    let data = session_login(domain_name, keys.address());
    let signature = signer.sign_typed_data(&data, keys)?;
    tracing::debug!(address = %keys.address(), domain = domain_name, "Session login signed");
    Ok(signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records what it was asked to sign.
    struct RecordingSigner {
        seen: RefCell<Vec<TypedData>>,
    }

    impl TypedDataSigner for RecordingSigner {
        fn sign_typed_data(&self, data: &TypedData, keys: &KeyMaterial) -> WalletResult<String> {
            self.seen.borrow_mut().push(data.clone());
            Ok(format!("sig-for-{}", keys.address()))
        }
    }

    #[test]
    fn test_session_login_shape() {
        let keys = KeyMaterial::from_seed(&[4u8; 32]).unwrap();
        let data = session_login("octra", keys.address());

        assert_eq!(data.primary_type, "Login");
        assert_eq!(data.types["Login"].len(), 2);
        assert_eq!(data.message["user"], keys.address().as_str());

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["domain"]["chainId"], 1);
        assert_eq!(json["types"]["Login"][0]["type"], "string");
    }

    #[test]
    fn test_signer_is_consumed_through_trait() {
        let keys = KeyMaterial::from_seed(&[4u8; 32]).unwrap();
        let signer = RecordingSigner {
            seen: RefCell::new(Vec::new()),
        };

        let sig = sign_session_login(&signer, "octra", &keys).unwrap();
        assert_eq!(sig, format!("sig-for-{}", keys.address()));
        assert_eq!(signer.seen.borrow()[0].domain.name, "octra");
    }
}
