//! Core types: Asset, Step

use std::fmt;

/// Maximum length of an asset name in bytes.
const MAX_ASSET_LEN: usize = 16;

/// An asset identifier, stored inline (no allocation).
///
/// Holds up to 16 bytes, enough for crypto pair and ticker names.
/// `Asset` is `Copy` and cheap to compare and hash, so it is used as the
/// key for every per-asset map in the crate.
///
/// ```
/// use candlex::Asset;
///
/// let btc = Asset::new("BTC");
/// assert_eq!(btc.as_str(), "BTC");
/// assert_eq!(format!("{}", btc), "BTC");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Asset {
    bytes: [u8; MAX_ASSET_LEN],
    len: u8,
}

impl Asset {
    /// Create an asset identifier from a name.
    ///
    /// Names longer than 16 bytes are a programming error (checked with
    /// `debug_assert`) and are truncated at a character boundary in
    /// release builds.
    pub fn new(name: &str) -> Self {
        debug_assert!(!name.is_empty(), "asset name must not be empty");
        debug_assert!(
            name.len() <= MAX_ASSET_LEN,
            "asset name longer than {MAX_ASSET_LEN} bytes: {name}"
        );
        let mut len = name.len().min(MAX_ASSET_LEN);
        while !name.is_char_boundary(len) {
            len -= 1;
        }
        let mut bytes = [0u8; MAX_ASSET_LEN];
        bytes[..len].copy_from_slice(&name.as_bytes()[..len]);
        Self {
            bytes,
            len: len as u8,
        }
    }

    /// The asset name as a string slice.
    pub fn as_str(&self) -> &str {
        // Always valid: constructed from &str, truncated on a char boundary.
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Asset").field(&self.as_str()).finish()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Asset {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Asset {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = <String as serde::Deserialize>::deserialize(deserializer)?;
        if name.is_empty() || name.len() > MAX_ASSET_LEN {
            return Err(serde::de::Error::custom(format!(
                "asset name must be 1..={MAX_ASSET_LEN} bytes, got {:?}",
                name
            )));
        }
        Ok(Asset::new(&name))
    }
}

/// Index of the current time step, shared across all asset series.
pub type Step = usize;
