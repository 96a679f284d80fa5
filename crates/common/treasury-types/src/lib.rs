// src/lib.rs for treasury-types

pub mod address;
pub mod policy;
pub mod units;

pub use address::{Address, AddressError};
pub use policy::ExecutionPolicy;
pub use units::{format_units, parse_units, UnitsError, DECIMALS};

/// Sequential identifier of a proposed treasury transaction.
pub type TxId = u64;

/// Native-asset quantity in base units (18 decimals).
pub type Amount = u128;
