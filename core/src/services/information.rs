use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::RequestDescriptor;
use crate::types::{Envelope, InformationKind, InformationRecord, ListParams, Page};

/// Supplier, customer and type lookups on `/information`.
#[derive(Debug, Clone, Copy)]
pub struct InformationService<'a> {
    client: &'a ApiClient,
}

impl<'a> InformationService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        kind: InformationKind,
        params: &ListParams,
    ) -> Result<Page<InformationRecord>, ApiError> {
        let desc = params.apply(RequestDescriptor::get("/information").query("action", kind.action()));
        let envelope: Envelope<Page<InformationRecord>> = self.client.fetch(desc).await?;
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{client, last};

    #[tokio::test]
    async fn list_sends_action_and_paging() {
        let (client, recorder) = client(
            200,
            r#"{"data":{"data":[{"id":1,"code":"TG","name":"Thai Airways"}],"total":12}}"#,
        );
        let params = ListParams {
            limit: Some(1),
            offset: None,
            search: Some("thai air".to_string()),
        };
        let page = InformationService::new(&client)
            .list(InformationKind::Suppliers, &params)
            .await
            .unwrap();
        assert_eq!(page.total, Some(12));
        assert_eq!(page.data[0].name, "Thai Airways");

        assert_eq!(
            last(&recorder).url,
            "http://agency.test/api/information?action=suppliers&limit=1&search=thai+air"
        );
    }

    #[tokio::test]
    async fn unexpected_shape_is_malformed() {
        let (client, _) = client(200, r#"{"data":[1,2]}"#);
        let err = InformationService::new(&client)
            .list(InformationKind::Types, &ListParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }
}
