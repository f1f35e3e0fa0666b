//! Policy document loading
//!
//! Loads the flow policy from a [`PolicyStore`] during peripheral
//! construction. Tries the TOML text slot first and falls back to the
//! binary postcard slot. Loading happens exactly once per peripheral;
//! a failure here aborts construction.

use rhythmos_core::policy::{RulePolicy, POLICY_VERSION};
use rhythmos_core::traits::{PolicySlot, PolicyStore, StoreError};

pub mod toml;

pub use toml::{parse_policy, ParseError};

/// Maximum policy document size in either format
pub const MAX_POLICY_SIZE: usize = 4096;

/// Policy loading errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PolicyLoadError {
    /// Store read failed
    Store(StoreError),
    /// Invalid UTF-8 in TOML data
    InvalidUtf8,
    /// TOML parsing failed
    Toml(ParseError),
    /// Binary deserialization failed
    Deserialize,
    /// Policy version mismatch
    VersionMismatch,
}

impl From<StoreError> for PolicyLoadError {
    fn from(e: StoreError) -> Self {
        PolicyLoadError::Store(e)
    }
}

/// Load the flow policy from a store
///
/// Tries TOML text first, then the binary postcard slot. The error of
/// the binary attempt is returned if both fail.
pub fn load<S: PolicyStore>(store: &mut S) -> Result<RulePolicy, PolicyLoadError> {
    match load_toml(store) {
        Ok(policy) => return Ok(policy),
        Err(PolicyLoadError::Store(StoreError::NotFound)) => {
            #[cfg(feature = "defmt")]
            defmt::debug!("no TOML policy found, trying binary slot");
        }
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("failed to load TOML policy: {:?}, trying binary", _e);
        }
    }

    load_binary(store)
}

/// Load the policy from the TOML text slot
fn load_toml<S: PolicyStore>(store: &mut S) -> Result<RulePolicy, PolicyLoadError> {
    let mut buffer = [0u8; MAX_POLICY_SIZE];
    let len = store.read(PolicySlot::Toml, &mut buffer)?;

    let text = core::str::from_utf8(&buffer[..len]).map_err(|_| PolicyLoadError::InvalidUtf8)?;
    let policy = parse_policy(text).map_err(PolicyLoadError::Toml)?;

    check_version(policy)
}

/// Load the policy from the binary postcard slot
fn load_binary<S: PolicyStore>(store: &mut S) -> Result<RulePolicy, PolicyLoadError> {
    let mut buffer = [0u8; MAX_POLICY_SIZE];
    let len = store.read(PolicySlot::Binary, &mut buffer)?;

    let policy: RulePolicy =
        postcard::from_bytes(&buffer[..len]).map_err(|_| PolicyLoadError::Deserialize)?;

    check_version(policy)
}

fn check_version(policy: RulePolicy) -> Result<RulePolicy, PolicyLoadError> {
    if policy.version != POLICY_VERSION {
        #[cfg(feature = "defmt")]
        defmt::warn!(
            "policy version mismatch: found {}, expected {}",
            policy.version,
            POLICY_VERSION
        );
        return Err(PolicyLoadError::VersionMismatch);
    }
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhythmos_core::label::Label;
    use rhythmos_core::policy::{FlowPolicy, FlowRule};

    /// Store backed by in-memory slots
    struct MemStore {
        toml: Option<&'static [u8]>,
        binary: Option<heapless::Vec<u8, 256>>,
    }

    impl MemStore {
        fn empty() -> Self {
            Self {
                toml: None,
                binary: None,
            }
        }
    }

    impl PolicyStore for MemStore {
        fn read(&mut self, slot: PolicySlot, buf: &mut [u8]) -> Result<usize, StoreError> {
            let data: &[u8] = match slot {
                PolicySlot::Toml => self.toml.ok_or(StoreError::NotFound)?,
                PolicySlot::Binary => self.binary.as_deref().ok_or(StoreError::NotFound)?,
            };
            if buf.len() < data.len() {
                return Err(StoreError::BufferTooSmall);
            }
            buf[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }
    }

    fn sample_policy() -> RulePolicy {
        let mut policy = RulePolicy::new();
        policy
            .add(FlowRule {
                source: Label::new("throttle").unwrap(),
                dest: Label::new("pin-18").unwrap(),
            })
            .unwrap();
        policy
    }

    #[test]
    fn test_load_from_toml_slot() {
        let mut store = MemStore::empty();
        store.toml = Some(b"version = 1\n\n[[rule]]\nsource = \"throttle\"\ndest = \"pin-18\"\n");

        let policy = load(&mut store).unwrap();
        let throttle = Label::new("throttle").unwrap();
        assert!(policy.can_flow(&throttle, &Label::for_gpio(18)));
    }

    #[test]
    fn test_fallback_to_binary_slot() {
        let mut buf = [0u8; 256];
        let bytes = postcard::to_slice(&sample_policy(), &mut buf).unwrap();

        let mut store = MemStore::empty();
        store.binary = Some(heapless::Vec::from_slice(bytes).unwrap());

        let policy = load(&mut store).unwrap();
        assert_eq!(policy, sample_policy());
    }

    #[test]
    fn test_both_slots_missing() {
        let mut store = MemStore::empty();
        assert_eq!(
            load(&mut store),
            Err(PolicyLoadError::Store(StoreError::NotFound))
        );
    }

    #[test]
    fn test_invalid_utf8_falls_back() {
        let mut store = MemStore::empty();
        store.toml = Some(&[0xff, 0xfe, 0x00]);

        // Bad TOML slot, nothing in binary: the binary error surfaces
        assert_eq!(
            load(&mut store),
            Err(PolicyLoadError::Store(StoreError::NotFound))
        );
    }

    #[test]
    fn test_binary_version_mismatch() {
        let mut stale = sample_policy();
        stale.version = 0;

        let mut buf = [0u8; 256];
        let bytes = postcard::to_slice(&stale, &mut buf).unwrap();

        let mut store = MemStore::empty();
        store.binary = Some(heapless::Vec::from_slice(bytes).unwrap());

        assert_eq!(load(&mut store), Err(PolicyLoadError::VersionMismatch));
    }

    #[test]
    fn test_toml_version_mismatch_falls_back() {
        let mut store = MemStore::empty();
        store.toml = Some(b"version = 2\n");

        let mut buf = [0u8; 256];
        let bytes = postcard::to_slice(&sample_policy(), &mut buf).unwrap();
        store.binary = Some(heapless::Vec::from_slice(bytes).unwrap());

        // Stale TOML, good binary: the binary policy wins
        assert_eq!(load(&mut store), Ok(sample_policy()));
    }
}
