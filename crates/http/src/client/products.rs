//! Product catalog client methods

use serde_json::Value;

use urlencoding::encode;

use super::{ClientError, RequestConfig, SessionClient};
use crate::types::{ListBody, Product, ProductInput, ProductQuery};

impl SessionClient {
    /// List catalog products (public endpoint)
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ClientError> {
        let config = RequestConfig::get("/products").query(query)?.public();
        let products: ListBody<Product> = self.request_as(config).await?;
        Ok(products.into_vec())
    }

    /// Get a single product (public endpoint)
    pub async fn get_product(&self, id: &str) -> Result<Product, ClientError> {
        self.request_as(RequestConfig::get(format!("/products/{}", encode(id))).public())
            .await
    }

    /// Create a product
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ClientError> {
        let config = RequestConfig::post("/products").json(input)?;
        self.request_as(config).await
    }

    /// Update a product; absent fields keep their current value
    pub async fn update_product(
        &self,
        id: &str,
        input: &ProductInput,
    ) -> Result<Product, ClientError> {
        let config = RequestConfig::put(format!("/products/{}", encode(id))).json(input)?;
        self.request_as(config).await
    }

    /// Delete a product
    pub async fn delete_product(&self, id: &str) -> Result<Value, ClientError> {
        self.request(RequestConfig::delete(format!("/products/{}", encode(id))))
            .await
    }
}
