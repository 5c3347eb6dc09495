//! Condition-flag masks inside the status register.

use indexmap::IndexMap;

/// Bit assignment for an ordered list of flag names.
///
/// The last listed flag occupies bit 0. Flag names are matched
/// case-insensitively; a flag that is not configured has mask 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flags {
    masks: IndexMap<String, u64>,
    configured: u64,
}

impl Flags {
    /// Builds masks from `names`, most significant flag first.
    #[must_use]
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        let masks: IndexMap<String, u64> = names
            .iter()
            .rev()
            .enumerate()
            .map(|(bit, name)| {
                let mask = u32::try_from(bit)
                    .ok()
                    .and_then(|bit| 1u64.checked_shl(bit))
                    .unwrap_or(0);
                (name.as_ref().to_uppercase(), mask)
            })
            .collect();
        let configured = masks.values().fold(0, |acc, mask| acc | mask);
        Self { masks, configured }
    }

    /// Mask of `name`, 0 when the flag is not configured.
    #[must_use]
    pub fn mask_for(&self, name: &str) -> u64 {
        self.masks.get(&name.to_uppercase()).copied().unwrap_or(0)
    }

    /// Union of every configured flag's mask.
    #[must_use]
    pub const fn configured_mask(&self) -> u64 {
        self.configured
    }

    /// Clears every configured flag in `current`, then sets the `seated` ones.
    #[must_use]
    pub fn compose(&self, current: u64, seated: &[&str]) -> u64 {
        let seated = seated
            .iter()
            .fold(0, |acc, name| acc | self.mask_for(name));
        (current & !self.configured) | seated
    }

    /// Whether `name` is set in `status`.
    #[must_use]
    pub fn is_set(&self, status: u64, name: &str) -> bool {
        status & self.mask_for(name) != 0
    }

    /// Sets `name` in `status`.
    #[must_use]
    pub fn set(&self, status: u64, name: &str) -> u64 {
        status | self.mask_for(name)
    }

    /// Clears `name` in `status`.
    #[must_use]
    pub fn clear(&self, status: u64, name: &str) -> u64 {
        status & !self.mask_for(name)
    }

    /// Configured flag names with their masks, most significant first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.masks
            .iter()
            .rev()
            .map(|(name, mask)| (name.as_str(), *mask))
    }
}
