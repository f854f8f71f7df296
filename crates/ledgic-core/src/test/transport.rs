use crate::{
    infra::{CallRequest, Transport, TransportError},
    types::Principal,
};
use async_trait::async_trait;
use std::sync::Mutex;

#[must_use]
pub fn principal(id: u8) -> Principal {
    Principal::from_slice(&[id; 29])
}

///
/// ScriptedTransport
/// Answers every call with the same reply and remembers the last request.
///

pub struct ScriptedTransport {
    reply: Result<Vec<u8>, TransportError>,
    last: Mutex<Option<CallRequest>>,
}

impl ScriptedTransport {
    #[must_use]
    pub const fn replying(reply: Result<Vec<u8>, TransportError>) -> Self {
        Self {
            reply,
            last: Mutex::new(None),
        }
    }

    pub fn last_request(&self) -> Option<CallRequest> {
        self.last.lock().expect("scripted transport lock").clone()
    }
}

#[async_trait(?Send)]
impl Transport for ScriptedTransport {
    async fn call(&self, request: CallRequest) -> Result<Vec<u8>, TransportError> {
        *self.last.lock().expect("scripted transport lock") = Some(request);

        self.reply.clone()
    }
}
