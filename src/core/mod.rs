pub mod currency;
pub mod ledger;
pub mod link;
pub mod node;
pub mod traits;
