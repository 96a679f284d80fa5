use crate::error::MultisigError;
use std::collections::HashSet;
use treasury_types::Address;

/// Smallest committee the engine accepts.
pub const MIN_OWNERS: usize = 3;

/// The immutable committee of owners and the number of confirmations required.
#[derive(Debug, Clone)]
pub struct OwnerRegistry {
    owners: Vec<Address>,
    members: HashSet<Address>,
    threshold: usize,
}

impl OwnerRegistry {
    /// Validates and freezes the owner set. Owners keep the order given.
    pub fn new(owners: Vec<Address>, threshold: usize) -> Result<Self, MultisigError> {
        let mut members = HashSet::with_capacity(owners.len());

        for owner in &owners {
            if owner.is_zero() {
                return Err(MultisigError::InvalidOwnerSet(
                    "the zero address cannot be an owner".to_string(),
                ));
            }
            if !members.insert(*owner) {
                return Err(MultisigError::InvalidOwnerSet(format!(
                    "duplicate owner {}",
                    owner
                )));
            }
        }

        if owners.len() < MIN_OWNERS {
            return Err(MultisigError::InvalidOwnerSet(format!(
                "need at least {} owners, got {}",
                MIN_OWNERS,
                owners.len()
            )));
        }

        if threshold == 0 || threshold > owners.len() {
            return Err(MultisigError::InvalidThreshold {
                threshold,
                owners: owners.len(),
            });
        }

        Ok(Self {
            owners,
            members,
            threshold,
        })
    }

    /// Builds a registry from hex address strings, e.g. straight from a config file.
    pub fn from_hex<S: AsRef<str>>(owners: &[S], threshold: usize) -> Result<Self, MultisigError> {
        let parsed = owners
            .iter()
            .map(|s| {
                s.as_ref().parse::<Address>().map_err(|e| {
                    MultisigError::InvalidOwnerSet(format!("bad owner {:?}: {}", s.as_ref(), e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(parsed, threshold)
    }

    pub fn is_owner(&self, identity: &Address) -> bool {
        self.members.contains(identity)
    }

    pub fn owners(&self) -> &[Address] {
        &self.owners
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
