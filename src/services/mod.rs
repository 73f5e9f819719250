// Service exports
pub mod ledger;

pub use ledger::{LedgerError, PropertyLedger};
