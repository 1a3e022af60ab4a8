//! Addresses service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        addresses::{
            data::NewAddress,
            errors::AddressesServiceError,
            records::{AddressId, AddressRecord},
            repository::PgAddressesRepository,
        },
        users::UserId,
    },
};

#[derive(Debug, Clone)]
pub struct PgAddressesService {
    db: Db,
    repository: PgAddressesRepository,
}

impl PgAddressesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgAddressesRepository::new(),
        }
    }
}

#[async_trait]
impl AddressesService for PgAddressesService {
    #[tracing::instrument(
        name = "addresses.service.create_address",
        skip(self, address),
        fields(user_id = %user),
        err
    )]
    async fn create_address(
        &self,
        user: UserId,
        address: NewAddress,
    ) -> Result<AddressRecord, AddressesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let created = self
            .repository
            .create_address(&mut tx, user, &address)
            .await?;

        tx.commit().await?;

        info!(address_id = %created.id, "created address");

        Ok(created)
    }

    async fn get_address(
        &self,
        user: UserId,
        address: AddressId,
    ) -> Result<AddressRecord, AddressesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let found = self.repository.get_address(&mut tx, address).await?;

        tx.commit().await?;

        // Someone else's address is indistinguishable from a missing one.
        found
            .filter(|record| record.user_id == user)
            .ok_or(AddressesServiceError::NotFound)
    }

    async fn list_addresses(
        &self,
        user: UserId,
    ) -> Result<Vec<AddressRecord>, AddressesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let addresses = self.repository.list_addresses(&mut tx, user).await?;

        tx.commit().await?;

        Ok(addresses)
    }
}

#[automock]
#[async_trait]
pub trait AddressesService: Send + Sync {
    /// Store a shipping address for the user.
    async fn create_address(
        &self,
        user: UserId,
        address: NewAddress,
    ) -> Result<AddressRecord, AddressesServiceError>;

    /// Retrieve one of the user's addresses.
    async fn get_address(
        &self,
        user: UserId,
        address: AddressId,
    ) -> Result<AddressRecord, AddressesServiceError>;

    /// Every address the user has stored.
    async fn list_addresses(
        &self,
        user: UserId,
    ) -> Result<Vec<AddressRecord>, AddressesServiceError>;
}
