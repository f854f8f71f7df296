///
/// Unified façade over the Internet Computer SDK
///
/// Re-exports the pieces of `ic_cdk` and `candid` the ledger layer talks to,
/// so the rest of the workspace imports them from one place and SDK upgrades
/// stay contained in this crate.
///
pub use candid;
pub use ic_cdk::{api, call, eprintln, println};

pub mod utils;
