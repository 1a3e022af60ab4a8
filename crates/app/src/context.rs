//! App Context

use std::sync::Arc;

use emporium::prelude::BillError;
use thiserror::Error;

use crate::{
    config::{CheckoutConfig, DatabaseConfig},
    database::{self, Db},
    domain::{
        addresses::{AddressesService, PgAddressesService},
        carts::{CartsService, PgCartsService},
        commodities::{CommoditiesService, PgCommoditiesService},
        orders::{OrdersService, PgOrdersService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("invalid checkout benefits")]
    Benefits(#[source] BillError),
}

#[derive(Clone)]
pub struct AppContext {
    pub commodities: Arc<dyn CommoditiesService>,
    pub carts: Arc<dyn CartsService>,
    pub addresses: Arc<dyn AddressesService>,
    pub orders: Arc<dyn OrdersService>,
}

impl AppContext {
    /// Build application context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails or the configured
    /// benefits are invalid.
    pub async fn from_config(
        database: &DatabaseConfig,
        checkout: &CheckoutConfig,
    ) -> Result<Self, AppInitError> {
        let benefits = Arc::new(checkout.benefits().map_err(AppInitError::Benefits)?);

        let pool = database::connect(&database.database_url, database.database_max_connections)
            .await
            .map_err(AppInitError::Database)?;

        let db = Db::new(pool);

        Ok(Self {
            commodities: Arc::new(PgCommoditiesService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone(), benefits.clone())),
            addresses: Arc::new(PgAddressesService::new(db.clone())),
            orders: Arc::new(
                PgOrdersService::new(db, benefits).with_deadline(checkout.deadline()),
            ),
        })
    }
}
