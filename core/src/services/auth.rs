use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::RequestDescriptor;
use crate::types::{AuthSession, Envelope, LoginRequest, RegisterRequest};

/// Calls under `/auth`.
#[derive(Debug, Clone, Copy)]
pub struct AuthService<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Rejected credentials arrive as `ApiError::Application`.
    pub async fn login(&self, input: &LoginRequest) -> Result<AuthSession, ApiError> {
        let desc = RequestDescriptor::post("/auth/login").json(input)?;
        let envelope: Envelope<AuthSession> = self.client.fetch(desc).await?;
        Ok(envelope.data)
    }

    pub async fn register(&self, input: &RegisterRequest) -> Result<AuthSession, ApiError> {
        let desc = RequestDescriptor::post("/auth/register").json(input)?;
        let envelope: Envelope<AuthSession> = self.client.fetch(desc).await?;
        Ok(envelope.data)
    }
}
