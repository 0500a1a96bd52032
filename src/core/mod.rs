pub mod audit;
pub mod error;
pub mod geo;
pub mod ledger;
pub mod linkage;
pub mod schedule;
