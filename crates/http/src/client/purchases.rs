//! Purchase client methods

use urlencoding::encode;

use super::{ClientError, RequestConfig, SessionClient};
use crate::types::{ListBody, Purchase, PurchaseQuery, PurchaseRequest};

impl SessionClient {
    /// Buy a product
    pub async fn create_purchase(&self, request: &PurchaseRequest) -> Result<Purchase, ClientError> {
        let config = RequestConfig::post("/purchases").json(request)?;
        self.request_as(config).await
    }

    /// List the current user's purchases
    pub async fn list_purchases(&self, query: &PurchaseQuery) -> Result<Vec<Purchase>, ClientError> {
        let config = RequestConfig::get("/purchases").query(query)?;
        let purchases: ListBody<Purchase> = self.request_as(config).await?;
        Ok(purchases.into_vec())
    }

    /// Get a purchase by id
    pub async fn get_purchase(&self, id: &str) -> Result<Purchase, ClientError> {
        self.request_as(RequestConfig::get(format!("/purchases/{}", encode(id))))
            .await
    }
}
