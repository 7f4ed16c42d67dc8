use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::new_id;
use super::product::Product;
use super::validation::{
    decode_field, immutable_field, parse_patches, unknown_field, Required, ValidationError,
};

pub const COLLECTION: &str = "orders";

pub const EMPTY_ORDER: &str = "Order must include at least one product";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Created,
    Pending,
    Completed,
}

impl OrderStatus {
    /// Wire and storage spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
        }
    }
}

/// Stored order: `products` holds product ids, not snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(rename = "buyerEmail")]
    pub buyer_email: String,
    pub products: Vec<String>,
    #[serde(default)]
    pub status: OrderStatus,
    pub total_price: f64,
}

/// Order with its product references resolved, in slot order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulatedOrder {
    pub id: String,
    #[serde(rename = "buyerEmail")]
    pub buyer_email: String,
    pub products: Vec<Product>,
    pub status: OrderStatus,
    pub total_price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    #[serde(rename = "buyerEmail")]
    pub buyer_email: Option<String>,
    pub products: Option<Vec<String>>,
    pub status: Option<OrderStatus>,
    pub total_price: Option<f64>,
}

impl OrderDraft {
    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        serde_json::from_value(value).map_err(ValidationError::malformed)
    }

    pub fn has_products(&self) -> bool {
        self.products.as_ref().is_some_and(|p| !p.is_empty())
    }

    pub fn validate(self) -> Result<Order, ValidationError> {
        let products = match self.products {
            Some(products) if !products.is_empty() => products,
            _ => {
                return Err(ValidationError::with_fields(
                    EMPTY_ORDER,
                    vec!["products".into()],
                ))
            }
        };
        let mut req = Required::default();
        for (i, id) in products.iter().enumerate() {
            if id.is_empty() {
                req.mark(format!("products[{i}]"));
            }
        }
        let buyer_email = req.text(self.buyer_email, "buyerEmail");
        let total_price = req.number(self.total_price, "total_price");
        let id = self.id.filter(|id| !id.is_empty()).unwrap_or_else(new_id);
        req.finish(Order {
            id,
            buyer_email,
            products,
            status: self.status.unwrap_or_default(),
            total_price,
        })
    }
}

/// One allowed change to a stored order.
///
/// `TotalPrice` is never parsed from caller input; it is produced when an edit
/// replaces the product list and the order gets re-priced.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderPatch {
    BuyerEmail(String),
    Products(Vec<String>),
    Status(OrderStatus),
    TotalPrice(f64),
}

impl OrderPatch {
    pub fn parse_change(change: &Map<String, Value>) -> Result<Vec<Self>, ValidationError> {
        parse_patches(change, Self::parse_field)
    }

    fn parse_field(key: &str, value: &Value) -> Result<Self, ValidationError> {
        match key {
            "buyerEmail" => {
                let email: String = decode_field(key, value)?;
                if email.is_empty() {
                    return Err(ValidationError::missing(vec![key.into()]));
                }
                Ok(Self::BuyerEmail(email))
            }
            "products" => {
                let products: Vec<String> = decode_field(key, value)?;
                if products.is_empty() || products.iter().any(String::is_empty) {
                    return Err(ValidationError::with_fields(EMPTY_ORDER, vec![key.into()]));
                }
                Ok(Self::Products(products))
            }
            "status" => Ok(Self::Status(decode_field(key, value)?)),
            "id" | "_id" | "total_price" => Err(immutable_field(key)),
            _ => Err(unknown_field(key)),
        }
    }

    /// Product list an edit would install, if it replaces one.
    pub fn replaced_products(patches: &[Self]) -> Option<&[String]> {
        patches.iter().rev().find_map(|p| match p {
            Self::Products(ids) => Some(ids.as_slice()),
            _ => None,
        })
    }
}

impl Order {
    pub fn apply(&mut self, patches: impl IntoIterator<Item = OrderPatch>) {
        for patch in patches {
            match patch {
                OrderPatch::BuyerEmail(v) => self.buyer_email = v,
                OrderPatch::Products(v) => self.products = v,
                OrderPatch::Status(v) => self.status = v,
                OrderPatch::TotalPrice(v) => self.total_price = v,
            }
        }
    }

    pub fn populate(self, products: Vec<Product>) -> PopulatedOrder {
        PopulatedOrder {
            id: self.id,
            buyer_email: self.buyer_email,
            products,
            status: self.status,
            total_price: self.total_price,
        }
    }
}
