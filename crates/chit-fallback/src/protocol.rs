//! Wire types exchanged with the fallback parsing service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One batched request per receipt: the unresolved raw line strings in
/// original order, plus receipt-level context when known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackRequest {
    /// Unresolved line texts, in receipt order.
    pub lines: Vec<String>,

    /// Currency marker observed on the receipt, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// One parsed line item as reported by the collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackItem {
    /// Item name.
    pub item_name: String,

    /// Purchased quantity.
    pub quantity: Decimal,

    /// Unit of measure; may be empty when the line carries none.
    #[serde(default)]
    pub unit: String,

    /// Price per unit.
    pub unit_price: Decimal,
}

/// Response keyed back to request order: one entry per submitted line,
/// `null` for lines the service declined to parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackResponse {
    pub items: Vec<Option<FallbackItem>>,
}
