use serde::Deserialize;

/// The broker's acknowledgement of a placed, modified or cancelled order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderResponse {
    pub order_id: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Success,
    Error,
}

impl OrderResponse {
    pub fn accepted(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            status: OrderStatus::Success,
            message: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OrderStatus::Success
    }
}
