pub mod listing;
pub mod order;
pub mod product;
pub mod validation;

use uuid::Uuid;

/// Fresh record id: UUIDv7 as 32 hex chars, so ids sort in creation order.
pub fn new_id() -> String {
    Uuid::now_v7().simple().to_string()
}
