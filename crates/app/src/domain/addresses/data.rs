//! Address Data

/// New Address Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    pub user_name: String,
    pub user_phone: String,
    pub province_name: String,
    pub city_name: String,
    pub region_name: String,
    pub detail_address: String,
}
