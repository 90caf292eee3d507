//! Row identities.

use crate::value::Value;
use base58::ToBase58;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter};
use xxhash_rust::xxh3::Xxh3;

/// Version of the value encoding hashed into keys.
const KEY_ENCODING_VERSION: u8 = 1;

/// Opaque 128-bit row identity.
///
/// Keys derived from values with [`Key::for_values`] are stable: the same
/// values produce the same key in every process.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key(u128);

impl Key {
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    pub const fn as_u128(&self) -> u128 {
        self.0
    }

    /// Derives the key identifying a row by `values`.
    pub fn for_values(values: &[Value]) -> Self {
        let mut hasher = Xxh3::new();
        hasher.update(&[KEY_ENCODING_VERSION]);
        hasher.update(&(values.len() as u64).to_le_bytes());
        for value in values {
            value.hash_into(&mut hasher);
        }
        Self(hasher.digest128())
    }

    pub fn for_value(value: &Value) -> Self {
        Self::for_values(std::slice::from_ref(value))
    }

    /// Key assigned to the `n`-th row when the caller supplies no identity.
    pub fn for_sequence_number(n: u64) -> Self {
        Self::for_value(&Value::Int(n as i64))
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "^{}", self.0.to_be_bytes().to_base58())
    }
}

impl Debug for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}
