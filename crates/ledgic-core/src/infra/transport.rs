use crate::types::Principal;
use async_trait::async_trait;
use derive_more::Display;
use std::time::Duration;
use thiserror::Error as ThisError;

///
/// CallMode
///
/// `Query` reads state and may be repeated freely. `Update` may change
/// state and is never repeated by this layer.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum CallMode {
    #[display("query")]
    Query,
    #[display("update")]
    Update,
}

///
/// CallRequest
/// One encoded call as handed to a transport.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CallRequest {
    pub target: Principal,
    pub method: String,
    pub mode: CallMode,
    pub arg: Vec<u8>,
    pub timeout: Duration,
}

///
/// TransportError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TransportError {
    /// No reply before the deadline; the call may or may not have executed.
    #[error("no reply before the deadline: {0}")]
    Timeout(String),

    /// The call provably never executed.
    #[error("target unreachable: {0}")]
    Unreachable(String),

    #[error("call rejected with code {code}: {message}")]
    Rejected { code: u32, message: String },
}

///
/// Transport
///
/// Carries encoded argument bytes to a method on a target and returns the
/// raw reply bytes. Futures are not `Send`; canister code runs single-threaded.
///

#[async_trait(?Send)]
pub trait Transport {
    async fn call(&self, request: CallRequest) -> Result<Vec<u8>, TransportError>;
}
