//! Policy document storage traits
//!
//! The policy document is read once, synchronously, during peripheral
//! construction. Where the bytes live (file, flash partition, test
//! fixture) is the store implementation's business.

/// Storage slots for policy data
///
/// A store may hold the policy in either or both formats; the loader
/// prefers TOML text and falls back to the binary form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PolicySlot {
    /// Policy document as TOML text
    Toml,
    /// Policy document in binary postcard format
    Binary,
}

/// Errors from policy storage reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Nothing stored in the requested slot
    NotFound,
    /// Underlying read failed
    Io,
    /// Caller buffer too small for the stored data
    BufferTooSmall,
}

/// Blocking read access to stored policy documents
pub trait PolicyStore {
    /// Read a slot into the provided buffer
    ///
    /// Returns the number of bytes read.
    fn read(&mut self, slot: PolicySlot, buf: &mut [u8]) -> Result<usize, StoreError>;
}
