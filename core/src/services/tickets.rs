use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::RequestDescriptor;
use crate::types::{CreateTicket, Envelope, ListParams, Page, Ticket, UpdateTicket};

/// Ticket CRUD on `/tickets`.
#[derive(Debug, Clone, Copy)]
pub struct TicketService<'a> {
    client: &'a ApiClient,
}

impl<'a> TicketService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, params: &ListParams) -> Result<Page<Ticket>, ApiError> {
        let desc = params.apply(RequestDescriptor::get("/tickets"));
        let envelope: Envelope<Page<Ticket>> = self.client.fetch(desc).await?;
        Ok(envelope.data)
    }

    pub async fn get(&self, id: Uuid) -> Result<Ticket, ApiError> {
        let envelope: Envelope<Ticket> = self
            .client
            .fetch(RequestDescriptor::get(&format!("/tickets/{id}")))
            .await?;
        Ok(envelope.data)
    }

    pub async fn create(&self, input: &CreateTicket) -> Result<Ticket, ApiError> {
        let desc = RequestDescriptor::post("/tickets").json(input)?;
        let envelope: Envelope<Ticket> = self.client.fetch(desc).await?;
        Ok(envelope.data)
    }

    pub async fn update(&self, id: Uuid, input: &UpdateTicket) -> Result<Ticket, ApiError> {
        let desc = RequestDescriptor::put(&format!("/tickets/{id}")).json(input)?;
        let envelope: Envelope<Ticket> = self.client.fetch(desc).await?;
        Ok(envelope.data)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.client
            .request(RequestDescriptor::delete(&format!("/tickets/{id}")))
            .await?;
        Ok(())
    }
}
