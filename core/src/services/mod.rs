//! Thin call-sites over `ApiClient`.
//!
//! Each service borrows a client, shapes the request payload for one family
//! of endpoints and reshapes the envelope of the response. They add no
//! behaviour of their own: every failure is the client's `ApiError`.

mod auth;
mod information;
mod tickets;

pub use auth::AuthService;
pub use information::InformationService;
pub use tickets::TicketService;

use crate::request::RequestDescriptor;
use crate::types::ListParams;

impl ListParams {
    pub(crate) fn apply(&self, desc: RequestDescriptor) -> RequestDescriptor {
        desc.query_opt("limit", self.limit)
            .query_opt("offset", self.offset)
            .query_opt("search", self.search.clone())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::config::ClientConfig;
    use crate::error::ApiError;
    use crate::http::{HttpRequest, HttpResponse};
    use crate::transport::Transport;
    use crate::ApiClient;

    /// Replies with `body` and keeps the last request for inspection.
    pub(crate) struct Recorder {
        pub status: u16,
        pub body: String,
        pub last: Mutex<Option<HttpRequest>>,
    }

    #[async_trait]
    impl Transport for Arc<Recorder> {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            *self.last.lock().unwrap() = Some(request);
            Ok(HttpResponse::new(self.status, self.body.clone()))
        }
    }

    pub(crate) fn client(status: u16, body: &str) -> (ApiClient, Arc<Recorder>) {
        let recorder = Arc::new(Recorder {
            status,
            body: body.to_string(),
            last: Mutex::new(None),
        });
        let client = ApiClient::new(ClientConfig::new("http://agency.test/api"), recorder.clone());
        (client, recorder)
    }

    pub(crate) fn last(recorder: &Recorder) -> HttpRequest {
        recorder.last.lock().unwrap().clone().expect("no request recorded")
    }
}
