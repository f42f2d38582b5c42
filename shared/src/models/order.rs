//! Order Model
//!
//! Immutable print input. Never persisted by the print subsystem.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Service type of an order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    #[default]
    DineIn,
    Takeout,
    Delivery,
}

impl OrderType {
    /// Label printed on kitchen tickets
    pub fn label(&self) -> &'static str {
        match self {
            Self::DineIn => "Dine-in",
            Self::Takeout => "Takeout",
            Self::Delivery => "Delivery",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub special_instructions: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Order to print
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    #[validate(length(min = 1, max = 64))]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub customer_name: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub order_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub special_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 20))]
    pub table_number: Option<String>,
    #[serde(default)]
    pub order_type: OrderType,
}

impl OrderData {
    /// Canned order used by test prints
    pub fn sample() -> Self {
        Self {
            id: "TEST-001".to_string(),
            customer_name: Some("Test Customer".to_string()),
            items: vec![
                OrderItem {
                    name: "Test Burger".to_string(),
                    quantity: 1,
                    special_instructions: Some("No onions".to_string()),
                    price: Decimal::new(1299, 2),
                },
                OrderItem {
                    name: "Test Fries".to_string(),
                    quantity: 2,
                    special_instructions: None,
                    price: Decimal::new(399, 2),
                },
            ],
            total: Decimal::new(2097, 2),
            order_time: Utc::now(),
            special_instructions: Some("Test print - please ignore".to_string()),
            table_number: Some("T1".to_string()),
            order_type: OrderType::DineIn,
        }
    }
}
