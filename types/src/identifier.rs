use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, TimeZone, Utc};
use rand::Rng;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const ID_LEN: usize = 12;
pub const ID_HEX_LEN: usize = ID_LEN * 2;

const COUNTER_MASK: u32 = 0x00FF_FFFF;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Invalid identifier length: expected {ID_HEX_LEN} hex characters, got {0}")]
    InvalidLength(usize),

    #[error("Invalid identifier character: {0:?}")]
    InvalidCharacter(char),
}

/// Primary key of every stored document.
///
/// Twelve bytes: seconds since the Unix epoch (big-endian, 4 bytes), a
/// per-process random value (5 bytes) and a wrapping counter (big-endian,
/// 3 bytes). Ids minted by one process sort in creation order.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier([u8; ID_LEN]);

fn process_value() -> &'static [u8; 5] {
    static PROCESS: OnceLock<[u8; 5]> = OnceLock::new();
    PROCESS.get_or_init(|| {
        let mut bytes = [0u8; 5];
        rand::thread_rng().fill(&mut bytes[..]);
        bytes
    })
}

fn next_counter() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    COUNTER
        .get_or_init(|| AtomicU32::new(rand::thread_rng().gen::<u32>() & COUNTER_MASK))
        .fetch_add(1, Ordering::Relaxed)
        & COUNTER_MASK
}

impl Identifier {
    /// Mints a fresh identifier. Never fails and never touches the store.
    pub fn new() -> Self {
        let seconds = Utc::now().timestamp() as u32;
        let counter = next_counter();

        let mut bytes = [0u8; ID_LEN];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(process_value());
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self(bytes)
    }

    pub const fn nil() -> Self {
        Self([0u8; ID_LEN])
    }

    pub fn is_nil(&self) -> bool {
        self.0 == [0u8; ID_LEN]
    }

    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Creation time embedded in the first four bytes.
    pub fn timestamp(&self) -> DateTime<Utc> {
        let seconds = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        Utc.timestamp_opt(i64::from(seconds), 0)
            .single()
            .unwrap_or_default()
    }

    pub fn to_hex(&self) -> String {
        self.to_string()
    }

    pub fn from_hex(s: &str) -> Result<Self, IdentifierError> {
        if s.len() != ID_HEX_LEN {
            return Err(IdentifierError::InvalidLength(s.chars().count()));
        }

        let mut bytes = [0u8; ID_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| match e {
            hex::FromHexError::InvalidHexCharacter { c, .. } => {
                IdentifierError::InvalidCharacter(c)
            }
            hex::FromHexError::OddLength | hex::FromHexError::InvalidStringLength => {
                IdentifierError::InvalidLength(s.chars().count())
            }
        })?;
        Ok(Self(bytes))
    }
}

/// True iff `s` is the 24-character hex form of an [`Identifier`].
pub fn is_valid_id(s: &str) -> bool {
    s.len() == ID_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Converts input that has already passed [`is_valid_id`].
pub fn string_to_id(s: &str) -> Result<Identifier, IdentifierError> {
    Identifier::from_hex(s)
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier(\"{self}\")")
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Identifier::from_hex(&raw).map_err(de::Error::custom)
    }
}
