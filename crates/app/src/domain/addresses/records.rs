//! Address Records

use jiff::Timestamp;
use serde::Serialize;

use crate::{domain::users::UserId, ids::TypedId};

/// Address ID
pub type AddressId = TypedId<AddressRecord>;

/// Address Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressRecord {
    pub id: AddressId,
    pub user_id: UserId,
    pub user_name: String,
    pub user_phone: String,
    pub province_name: String,
    pub city_name: String,
    pub region_name: String,
    pub detail_address: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
