//! Addresses Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::{
    addresses::{
        data::NewAddress,
        records::{AddressId, AddressRecord},
    },
    users::UserId,
};

const CREATE_ADDRESS_SQL: &str = include_str!("sql/create_address.sql");
const GET_ADDRESS_SQL: &str = include_str!("sql/get_address.sql");
const LIST_ADDRESSES_SQL: &str = include_str!("sql/list_addresses.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAddressesRepository;

impl PgAddressesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
        address: &NewAddress,
    ) -> Result<AddressRecord, sqlx::Error> {
        query_as::<Postgres, AddressRecord>(CREATE_ADDRESS_SQL)
            .bind(user.into_i64())
            .bind(&address.user_name)
            .bind(&address.user_phone)
            .bind(&address.province_name)
            .bind(&address.city_name)
            .bind(&address.region_name)
            .bind(&address.detail_address)
            .fetch_one(&mut **tx)
            .await
    }

    /// The address with this id, whoever owns it.
    pub(crate) async fn get_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        address: AddressId,
    ) -> Result<Option<AddressRecord>, sqlx::Error> {
        query_as::<Postgres, AddressRecord>(GET_ADDRESS_SQL)
            .bind(address.into_i64())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_addresses(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserId,
    ) -> Result<Vec<AddressRecord>, sqlx::Error> {
        query_as::<Postgres, AddressRecord>(LIST_ADDRESSES_SQL)
            .bind(user.into_i64())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for AddressRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: AddressId::from_i64(row.try_get("id")?),
            user_id: UserId::from_i64(row.try_get("user_id")?),
            user_name: row.try_get("user_name")?,
            user_phone: row.try_get("user_phone")?,
            province_name: row.try_get("province_name")?,
            city_name: row.try_get("city_name")?,
            region_name: row.try_get("region_name")?,
            detail_address: row.try_get("detail_address")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
