//! Remote call dispatch.
//!
//! `call` builds and sends one encoded call through the context's transport
//! and maps transport failures onto the public error taxonomy. `transport`
//! is the seam to the network; `ic` is the inter-canister implementation.

pub mod call;
pub mod ic;
pub mod transport;

pub use call::{Call, CallBuilder, CallResult};
pub use ic::IcTransport;
pub use transport::{CallMode, CallRequest, Transport, TransportError};
