use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::orders::models::{CartLine, EarningsRecord, Order, OrderLine};

#[derive(Clone)]
pub struct MarketplaceRepository {
    client: Client,
    carts_table: String,
    orders_table: String,
    order_items_table: String,
    earnings_table: String,
    products_table: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("DynamoDB error: {0}")]
    DynamoDb(String),
    #[error("Invalid data format: {0}")]
    InvalidData(String),
}

impl MarketplaceRepository {
    pub fn new(
        client: Client,
        carts_table: String,
        orders_table: String,
        order_items_table: String,
        earnings_table: String,
        products_table: String,
    ) -> Self {
        Self {
            client,
            carts_table,
            orders_table,
            order_items_table,
            earnings_table,
            products_table,
        }
    }

    pub async fn get_cart_lines(&self, user_id: Uuid) -> Result<Vec<CartLine>, RepositoryError> {
        let result = self
            .client
            .scan()
            .table_name(&self.carts_table)
            .filter_expression("user_id = :user_id")
            .expression_attribute_values(":user_id", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| RepositoryError::DynamoDb(e.to_string()))?;

        let mut lines = Vec::new();
        if let Some(items) = result.items {
            for item in items {
                lines.push(self.parse_cart_line_from_item(item)?);
            }
        }
        Ok(lines)
    }

    pub async fn put_order(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut item = HashMap::new();
        item.insert("id".to_string(), AttributeValue::S(order.id.to_string()));
        item.insert(
            "user_id".to_string(),
            AttributeValue::S(order.user_id.to_string()),
        );
        item.insert(
            "total_cents".to_string(),
            AttributeValue::N(order.total_cents.to_string()),
        );
        item.insert(
            "status".to_string(),
            AttributeValue::S(order.status.clone()),
        );
        item.insert(
            "created_at".to_string(),
            AttributeValue::S(order.created_at.to_rfc3339()),
        );

        self.client
            .put_item()
            .table_name(&self.orders_table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| RepositoryError::DynamoDb(e.to_string()))?;

        Ok(())
    }

    pub async fn put_order_lines(&self, lines: &[OrderLine]) -> Result<(), RepositoryError> {
        for line in lines {
            let mut item = HashMap::new();
            item.insert("id".to_string(), AttributeValue::S(line.id.to_string()));
            item.insert(
                "order_id".to_string(),
                AttributeValue::S(line.order_id.to_string()),
            );
            item.insert(
                "product_id".to_string(),
                AttributeValue::S(line.product_id.to_string()),
            );
            item.insert(
                "designer_id".to_string(),
                AttributeValue::S(line.designer_id.to_string()),
            );
            item.insert(
                "quantity".to_string(),
                AttributeValue::N(line.quantity.to_string()),
            );
            item.insert(
                "unit_price_cents".to_string(),
                AttributeValue::N(line.unit_price_cents.to_string()),
            );
            item.insert(
                "line_total_cents".to_string(),
                AttributeValue::N(line.line_total_cents.to_string()),
            );

            self.client
                .put_item()
                .table_name(&self.order_items_table)
                .set_item(Some(item))
                .send()
                .await
                .map_err(|e| RepositoryError::DynamoDb(e.to_string()))?;
        }
        Ok(())
    }

    pub async fn put_earnings(&self, records: &[EarningsRecord]) -> Result<(), RepositoryError> {
        for record in records {
            let mut item = HashMap::new();
            item.insert("id".to_string(), AttributeValue::S(record.id.to_string()));
            item.insert(
                "order_id".to_string(),
                AttributeValue::S(record.order_id.to_string()),
            );
            item.insert(
                "order_line_id".to_string(),
                AttributeValue::S(record.order_line_id.to_string()),
            );
            item.insert(
                "designer_id".to_string(),
                AttributeValue::S(record.designer_id.to_string()),
            );
            item.insert(
                "gross_cents".to_string(),
                AttributeValue::N(record.gross_cents.to_string()),
            );
            item.insert(
                "commission_cents".to_string(),
                AttributeValue::N(record.commission_cents.to_string()),
            );
            item.insert(
                "net_cents".to_string(),
                AttributeValue::N(record.net_cents.to_string()),
            );
            item.insert(
                "status".to_string(),
                AttributeValue::S(record.status.clone()),
            );
            item.insert(
                "created_at".to_string(),
                AttributeValue::S(record.created_at.to_rfc3339()),
            );

            self.client
                .put_item()
                .table_name(&self.earnings_table)
                .set_item(Some(item))
                .send()
                .await
                .map_err(|e| RepositoryError::DynamoDb(e.to_string()))?;
        }
        Ok(())
    }

    pub async fn increment_product_sales(
        &self,
        product_id: Uuid,
        quantity: u32,
    ) -> Result<(), RepositoryError> {
        let mut key = HashMap::new();
        key.insert("id".to_string(), AttributeValue::S(product_id.to_string()));

        self.client
            .update_item()
            .table_name(&self.products_table)
            .set_key(Some(key))
            .update_expression("ADD total_sales :quantity")
            .expression_attribute_values(":quantity", AttributeValue::N(quantity.to_string()))
            .send()
            .await
            .map_err(|e| RepositoryError::DynamoDb(e.to_string()))?;

        Ok(())
    }

    pub async fn clear_cart(&self, user_id: Uuid) -> Result<(), RepositoryError> {
        let lines = self.get_cart_lines(user_id).await?;

        for line in lines {
            let mut key = HashMap::new();
            key.insert("id".to_string(), AttributeValue::S(line.id.to_string()));

            self.client
                .delete_item()
                .table_name(&self.carts_table)
                .set_key(Some(key))
                .send()
                .await
                .map_err(|e| RepositoryError::DynamoDb(e.to_string()))?;
        }

        Ok(())
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<Option<Order>, RepositoryError> {
        let mut key = HashMap::new();
        key.insert("id".to_string(), AttributeValue::S(order_id.to_string()));

        let result = self
            .client
            .get_item()
            .table_name(&self.orders_table)
            .set_key(Some(key))
            .send()
            .await
            .map_err(|e| RepositoryError::DynamoDb(e.to_string()))?;

        if let Some(item) = result.item {
            Ok(Some(self.parse_order_from_item(item)?))
        } else {
            Ok(None)
        }
    }

    pub async fn get_order_lines(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<OrderLine>, RepositoryError> {
        let result = self
            .client
            .scan()
            .table_name(&self.order_items_table)
            .filter_expression("order_id = :order_id")
            .expression_attribute_values(":order_id", AttributeValue::S(order_id.to_string()))
            .send()
            .await
            .map_err(|e| RepositoryError::DynamoDb(e.to_string()))?;

        let mut lines = Vec::new();
        if let Some(items) = result.items {
            for item in items {
                lines.push(self.parse_order_line_from_item(item)?);
            }
        }
        Ok(lines)
    }

    // Helper methods for parsing DynamoDB items
    fn parse_cart_line_from_item(
        &self,
        item: HashMap<String, AttributeValue>,
    ) -> Result<CartLine, RepositoryError> {
        Ok(CartLine {
            id: parse_uuid(&item, "id")?,
            user_id: parse_uuid(&item, "user_id")?,
            product_id: parse_uuid(&item, "product_id")?,
            designer_id: parse_uuid(&item, "designer_id")?,
            quantity: parse_number(&item, "quantity")?,
            unit_price_cents: parse_number(&item, "unit_price_cents")?,
            created_at: parse_timestamp(&item, "created_at")?,
        })
    }

    fn parse_order_from_item(
        &self,
        item: HashMap<String, AttributeValue>,
    ) -> Result<Order, RepositoryError> {
        Ok(Order {
            id: parse_uuid(&item, "id")?,
            user_id: parse_uuid(&item, "user_id")?,
            total_cents: parse_number(&item, "total_cents")?,
            status: parse_string(&item, "status")?,
            created_at: parse_timestamp(&item, "created_at")?,
        })
    }

    fn parse_order_line_from_item(
        &self,
        item: HashMap<String, AttributeValue>,
    ) -> Result<OrderLine, RepositoryError> {
        Ok(OrderLine {
            id: parse_uuid(&item, "id")?,
            order_id: parse_uuid(&item, "order_id")?,
            product_id: parse_uuid(&item, "product_id")?,
            designer_id: parse_uuid(&item, "designer_id")?,
            quantity: parse_number(&item, "quantity")?,
            unit_price_cents: parse_number(&item, "unit_price_cents")?,
            line_total_cents: parse_number(&item, "line_total_cents")?,
        })
    }
}

fn parse_uuid(
    item: &HashMap<String, AttributeValue>,
    field: &str,
) -> Result<Uuid, RepositoryError> {
    item.get(field)
        .and_then(|v| v.as_s().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| RepositoryError::InvalidData(format!("Invalid {field}")))
}

fn parse_string(
    item: &HashMap<String, AttributeValue>,
    field: &str,
) -> Result<String, RepositoryError> {
    item.get(field)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| RepositoryError::InvalidData(format!("Invalid {field}")))
}

fn parse_number<T: std::str::FromStr>(
    item: &HashMap<String, AttributeValue>,
    field: &str,
) -> Result<T, RepositoryError> {
    item.get(field)
        .and_then(|v| v.as_n().ok())
        .and_then(|s| s.parse::<T>().ok())
        .ok_or_else(|| RepositoryError::InvalidData(format!("Invalid {field}")))
}

fn parse_timestamp(
    item: &HashMap<String, AttributeValue>,
    field: &str,
) -> Result<DateTime<Utc>, RepositoryError> {
    item.get(field)
        .and_then(|v| v.as_s().ok())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| RepositoryError::InvalidData(format!("Invalid {field}")))
}
