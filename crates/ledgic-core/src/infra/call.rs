use crate::{
    Error,
    context::ClientContext,
    error::{NetworkError, RejectError, RejectReason},
    infra::transport::{CallMode, CallRequest, TransportError},
    log,
    log::Topic,
    types::Principal,
    wire::{self, DecodingError, Descriptor, EncodedArgument, EncodingError, Value},
};
use std::time::Duration;

///
/// Call
/// Remote call builder; the mode is fixed when the builder is created.
///

pub struct Call;

impl Call {
    #[must_use]
    pub fn query(target: impl Into<Principal>, method: &str) -> CallBuilder {
        CallBuilder::new(CallMode::Query, target.into(), method)
    }

    #[must_use]
    pub fn update(target: impl Into<Principal>, method: &str) -> CallBuilder {
        CallBuilder::new(CallMode::Update, target.into(), method)
    }
}

///
/// CallBuilder
///

pub struct CallBuilder {
    mode: CallMode,
    target: Principal,
    method: String,
    arg: Option<EncodedArgument>,
    timeout: Option<Duration>,
}

impl CallBuilder {
    fn new(mode: CallMode, target: Principal, method: &str) -> Self {
        Self {
            mode,
            target,
            method: method.to_string(),
            arg: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_arg(mut self, arg: EncodedArgument) -> Self {
        self.arg = Some(arg);
        self
    }

    /// Encode a single argument; fails before anything is sent.
    pub fn try_with_arg(self, descriptor: &Descriptor, value: &Value) -> Result<Self, EncodingError> {
        let arg = wire::encode(descriptor, value).inspect_err(|err| {
            log!(Topic::Wire, Warn, "argument to {} does not encode: {err}", self.method);
        })?;

        Ok(self.with_arg(arg))
    }

    /// Overrides the context's call timeout for this call.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub const fn mode(&self) -> CallMode {
        self.mode
    }

    pub async fn execute(self, ctx: &ClientContext) -> Result<CallResult, Error> {
        let arg = match self.arg {
            Some(arg) => arg.into_bytes(),
            None => wire::encode_args(&[], &[])?.into_bytes(),
        };
        let request = CallRequest {
            target: self.target,
            method: self.method.clone(),
            mode: self.mode,
            arg,
            timeout: self.timeout.unwrap_or_else(|| ctx.call_timeout()),
        };

        log!(
            Topic::Call,
            Debug,
            "{} {}::{} ({} bytes)",
            self.mode,
            self.target,
            self.method,
            request.arg.len()
        );

        match ctx.transport().call(request).await {
            Ok(bytes) => Ok(CallResult { bytes }),
            Err(err) => {
                log!(
                    Topic::Call,
                    Warn,
                    "{} {}::{} failed: {err}",
                    self.mode,
                    self.target,
                    self.method
                );

                Err(map_transport_error(self.mode, self.target, self.method, err))
            }
        }
    }
}

fn map_transport_error(
    mode: CallMode,
    target: Principal,
    method: String,
    err: TransportError,
) -> Error {
    match (mode, err) {
        (CallMode::Update, TransportError::Timeout(message)) => Error::OutcomeUnknown {
            target,
            method,
            message,
        },
        (CallMode::Query, TransportError::Timeout(_)) => {
            NetworkError::Timeout { target, method }.into()
        }
        (_, TransportError::Unreachable(message)) => {
            NetworkError::Unreachable { target, message }.into()
        }
        (_, TransportError::Rejected { code, message }) => {
            RejectError::new(RejectReason::CallRejected { reject_code: code }, message).into()
        }
    }
}

///
/// CallResult
/// Raw reply bytes; interpreted only against an expected descriptor.
///

#[derive(Debug)]
pub struct CallResult {
    bytes: Vec<u8>,
}

impl CallResult {
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Decode a single-value reply.
    pub fn decode(&self, expected: &Descriptor) -> Result<Value, DecodingError> {
        wire::decode(expected, &self.bytes).inspect_err(|err| {
            log!(
                Topic::Wire,
                Warn,
                "{}-byte reply does not decode as {expected}: {err}",
                self.bytes.len()
            );
        })
    }

    pub fn decode_args(&self, expected: &[Descriptor]) -> Result<Vec<Value>, DecodingError> {
        wire::decode_args(expected, &self.bytes).inspect_err(|err| {
            log!(Topic::Wire, Warn, "{}-byte reply does not decode: {err}", self.bytes.len());
        })
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::transport::{ScriptedTransport, principal};
    use futures::executor::block_on;
    use std::sync::Arc;

    fn ctx(transport: Arc<ScriptedTransport>) -> ClientContext {
        ClientContext::new(principal(1), transport)
    }

    #[test]
    fn sends_empty_argument_list_when_no_arg_is_set() {
        let transport = Arc::new(ScriptedTransport::replying(Ok(b"DIDL\x00\x00".to_vec())));
        let ctx = ctx(transport.clone());

        let result = block_on(Call::query(principal(1), "icrc1_symbol").execute(&ctx)).unwrap();
        assert_eq!(result.bytes(), b"DIDL\x00\x00");

        let sent = transport.last_request().unwrap();
        assert_eq!(sent.mode, CallMode::Query);
        assert_eq!(sent.method, "icrc1_symbol");
        assert_eq!(sent.arg, b"DIDL\x00\x00");
        assert_eq!(sent.timeout, ctx.call_timeout());
    }

    #[test]
    fn timeout_meaning_depends_on_mode() {
        let timeout = || Err(TransportError::Timeout("deadline".into()));

        let ctx = ctx(Arc::new(ScriptedTransport::replying(timeout())));
        let err = block_on(Call::update(principal(1), "icrc1_transfer").execute(&ctx)).unwrap_err();
        assert!(matches!(err, Error::OutcomeUnknown { ref method, .. } if method == "icrc1_transfer"));
        assert!(!err.is_retryable());

        let ctx = ClientContext::new(principal(1), Arc::new(ScriptedTransport::replying(timeout())));
        let err = block_on(Call::query(principal(1), "icrc1_balance_of").execute(&ctx)).unwrap_err();
        assert!(matches!(err, Error::Network(NetworkError::Timeout { .. })));
        assert!(err.is_retryable());
    }

    #[test]
    fn rejects_carry_the_system_code() {
        let transport = ScriptedTransport::replying(Err(TransportError::Rejected {
            code: 5,
            message: "canister trapped".into(),
        }));
        let ctx = ctx(Arc::new(transport));

        let err = block_on(Call::update(principal(1), "icrc2_approve").execute(&ctx)).unwrap_err();
        assert_eq!(
            err.reject_reason(),
            Some(&RejectReason::CallRejected { reject_code: 5 })
        );
    }

    #[test]
    fn reply_that_does_not_match_the_expected_type_fails_to_decode() {
        // one text argument, "hi"
        let reply = b"DIDL\x00\x01\x71\x02hi".to_vec();
        let ctx = ctx(Arc::new(ScriptedTransport::replying(Ok(reply))));

        let result = block_on(Call::query(principal(1), "icrc1_symbol").execute(&ctx)).unwrap();
        assert_eq!(result.decode(&Descriptor::Text).unwrap(), Value::Text("hi".into()));
        assert_eq!(
            result.decode(&Descriptor::Nat),
            Err(DecodingError::TypeMismatch {
                expected: "nat",
                found: "text"
            })
        );
    }

    #[test]
    fn encoding_failures_never_reach_the_transport() {
        let transport = Arc::new(ScriptedTransport::replying(Ok(Vec::new())));

        let err = Call::update(principal(1), "icrc1_transfer")
            .try_with_arg(&Descriptor::Nat, &Value::Text("ten".into()))
            .err()
            .unwrap();
        assert!(matches!(err, EncodingError::Mismatch { .. }));
        assert!(transport.last_request().is_none());

        // explicit per-call timeout wins over the context default
        let ctx = ctx(transport.clone());
        let _ = block_on(
            Call::query(principal(1), "status")
                .with_timeout(Duration::from_secs(3))
                .execute(&ctx),
        );
        assert_eq!(
            transport.last_request().map(|r| r.timeout),
            Some(Duration::from_secs(3))
        );
    }
}
