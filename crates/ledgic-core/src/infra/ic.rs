//! Transport over inter-canister calls.

use crate::{
    cdk::call::{Call as IcCall, CallFailed, RejectCode},
    infra::transport::{CallRequest, Transport, TransportError},
};
use async_trait::async_trait;

///
/// IcTransport
///
/// Bounded-wait inter-canister calls with the request's timeout. Queries and
/// updates travel the same way; the mode only decides how the dispatcher
/// reads a timeout.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct IcTransport;

#[async_trait(?Send)]
impl Transport for IcTransport {
    async fn call(&self, request: CallRequest) -> Result<Vec<u8>, TransportError> {
        let timeout_secs = u32::try_from(request.timeout.as_secs().max(1)).unwrap_or(u32::MAX);

        let response = IcCall::bounded_wait(request.target, &request.method)
            .with_raw_args(&request.arg)
            .change_timeout(timeout_secs)
            .await
            .map_err(map_call_failed)?;

        Ok(response.into_bytes())
    }
}

fn map_call_failed(err: CallFailed) -> TransportError {
    match err {
        CallFailed::InsufficientLiquidCycleBalance(err) => {
            TransportError::Unreachable(err.to_string())
        }
        CallFailed::CallPerformFailed(err) => TransportError::Unreachable(err.to_string()),
        CallFailed::CallRejected(err) => {
            let message = err.reject_message().to_string();

            match err.reject_code() {
                Ok(RejectCode::SysUnknown) => TransportError::Timeout(message),
                Ok(RejectCode::SysTransient | RejectCode::SysFatal | RejectCode::DestinationInvalid) => {
                    TransportError::Unreachable(message)
                }
                Ok(RejectCode::CanisterReject | RejectCode::CanisterError) | Err(_) => {
                    TransportError::Rejected {
                        code: err.raw_reject_code(),
                        message,
                    }
                }
            }
        }
    }
}
