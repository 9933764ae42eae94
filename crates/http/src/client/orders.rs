//! Order client methods

use urlencoding::encode;

use super::{ClientError, RequestConfig, SessionClient};
use crate::types::{ListBody, Order, OrderQuery, OrderRequest, OrderStatus, OrderStatusUpdate};

impl SessionClient {
    /// List orders visible to the current user
    pub async fn list_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, ClientError> {
        let config = RequestConfig::get("/orders").query(query)?;
        let orders: ListBody<Order> = self.request_as(config).await?;
        Ok(orders.into_vec())
    }

    /// Get an order by id
    pub async fn get_order(&self, id: &str) -> Result<Order, ClientError> {
        self.request_as(RequestConfig::get(format!("/orders/{}", encode(id))))
            .await
    }

    /// Place an order
    pub async fn create_order(&self, request: &OrderRequest) -> Result<Order, ClientError> {
        let config = RequestConfig::post("/orders").json(request)?;
        self.request_as(config).await
    }

    /// Move an order to a new status
    pub async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Order, ClientError> {
        let config = RequestConfig::patch(format!("/orders/{}/status", encode(id)))
            .json(&OrderStatusUpdate { status })?;
        self.request_as(config).await
    }

    /// Cancel an order
    pub async fn cancel_order(&self, id: &str) -> Result<Order, ClientError> {
        self.request_as(RequestConfig::post(format!("/orders/{}/cancel", encode(id))))
            .await
    }
}
