use crate::{
    config::{ClientConfig, ConfigError, Validate},
    infra::Transport,
    types::Principal,
};
use std::{fmt, sync::Arc, time::Duration};

///
/// ClientContext
///
/// Immutable handle shared by every call: the transport plus the ledger and
/// index targets. Cloning is cheap; none of it changes after construction.
///

#[derive(Clone)]
pub struct ClientContext {
    transport: Arc<dyn Transport>,
    ledger_canister: Principal,
    index_canister: Option<Principal>,
    call_timeout: Duration,
    max_results: u32,
}

impl ClientContext {
    /// Context with default timeout and page size.
    pub fn new(ledger_canister: Principal, transport: Arc<dyn Transport>) -> Self {
        let config = ClientConfig::new(ledger_canister);

        Self::build(&config, transport)
    }

    pub fn from_config(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self::build(config, transport))
    }

    fn build(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            ledger_canister: config.ledger_canister,
            index_canister: config.index_canister,
            call_timeout: config.call_timeout(),
            max_results: config.max_results,
        }
    }

    #[must_use]
    pub const fn with_index(mut self, index_canister: Principal) -> Self {
        self.index_canister = Some(index_canister);
        self
    }

    #[must_use]
    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    #[must_use]
    pub const fn ledger_canister(&self) -> Principal {
        self.ledger_canister
    }

    pub fn index_canister(&self) -> Result<Principal, ConfigError> {
        self.index_canister.ok_or_else(|| {
            ConfigError::ValidationError("index_canister is not configured".to_string())
        })
    }

    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    #[must_use]
    pub const fn max_results(&self) -> u32 {
        self.max_results
    }
}

impl fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientContext")
            .field("ledger_canister", &self.ledger_canister)
            .field("index_canister", &self.index_canister)
            .field("call_timeout", &self.call_timeout)
            .field("max_results", &self.max_results)
            .finish_non_exhaustive()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::transport::{ScriptedTransport, principal};

    #[test]
    fn from_config_validates_first() {
        let transport = Arc::new(ScriptedTransport::replying(Ok(Vec::new())));

        let mut config = ClientConfig::new(principal(1));
        config.max_results = 0;
        assert!(ClientContext::from_config(&config, transport.clone()).is_err());

        let config = ClientConfig::new(principal(1)).with_index(principal(2));
        let ctx = ClientContext::from_config(&config, transport).unwrap();
        assert_eq!(ctx.ledger_canister(), principal(1));
        assert_eq!(ctx.index_canister().unwrap(), principal(2));
        assert_eq!(ctx.max_results(), 100);
    }

    #[test]
    fn missing_index_is_a_config_error() {
        let ctx = ClientContext::new(
            principal(1),
            Arc::new(ScriptedTransport::replying(Ok(Vec::new()))),
        );

        assert!(matches!(
            ctx.index_canister(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
