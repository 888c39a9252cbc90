//! Asynchronous API client core for the ticketdesk back-office.
//!
//! # Overview
//! Performs single request/response exchanges against the agency's
//! JSON-over-HTTPS API and returns a uniform `Result<Value, ApiError>`.
//! Request building and response parsing are pure; a pluggable `Transport`
//! does the I/O, raced against a per-call timeout.
//!
//! # Design
//! - `ApiClient` is built once from an immutable `ClientConfig` and passed
//!   by reference to every call-site. There is no global instance.
//! - A call is `build_request` → timed `Transport::execute` → `parse_response`.
//! - Timeout, non-2xx, malformed JSON and `error` markers in 2xx payloads
//!   all surface through `ApiError`. No retries.
//! - `services` holds the thin auth, information and ticket call-sites.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod request;
pub mod services;
pub mod transport;
pub mod types;

pub use client::{ApiClient, ConnectionReport};
pub use config::{ClientConfig, Environment};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::{QueryValue, RequestDescriptor};
pub use services::{AuthService, InformationService, TicketService};
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    AuthSession, CreateTicket, Envelope, InformationKind, InformationRecord, ListParams,
    LoginRequest, Page, RegisterRequest, Ticket, TicketStatus, UpdateTicket, User,
};
