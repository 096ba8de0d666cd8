use std::time::Duration;

use actix_web::web;
use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel::sqlite::SqliteConnection;

use crate::config::Config;
use crate::error::Error;
use crate::schema::CREATE_TABLES;

type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

const BUSY_TIMEOUT_MS: u64 = 5_000;
const POOL_CONNECTION_TIMEOUT_SECONDS: u64 = 10;

/// Prepares each new pooled connection: pragmas plus the schema.
#[derive(Debug)]
struct ConnectionSetup;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionSetup {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            BUSY_TIMEOUT_MS
        ))
        .and_then(|_| conn.batch_execute(CREATE_TABLES))
        .map_err(r2d2::Error::QueryError)
    }
}

/// Handle to the embedded store. Cloning shares the underlying pool.
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
}

impl Store {
    pub fn open(config: &Config) -> Result<Self, Error> {
        if config.database_url == ":memory:" {
            return Self::open_in_memory();
        }
        let manager = ConnectionManager::<SqliteConnection>::new(config.database_url.as_str());
        let pool = r2d2::Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(Duration::from_secs(POOL_CONNECTION_TIMEOUT_SECONDS))
            .connection_customizer(Box::new(ConnectionSetup))
            .build(manager)?;
        log::info!(
            "opened store at {} with {} connections",
            config.database_url,
            config.pool_size
        );
        Ok(Store { pool })
    }

    /// A private in-memory database lives as long as its single connection does.
    pub fn open_in_memory() -> Result<Self, Error> {
        let manager = ConnectionManager::<SqliteConnection>::new(":memory:");
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connection_timeout(Duration::from_secs(POOL_CONNECTION_TIMEOUT_SECONDS))
            .connection_customizer(Box::new(ConnectionSetup))
            .build(manager)?;
        log::debug!("opened in-memory store");
        Ok(Store { pool })
    }

    /// Runs `f` on the blocking worker pool and waits for it.
    pub async fn run<F, R>(&self, f: F) -> Result<R, Error>
    where
        F: FnOnce(&SqliteConnection) -> Result<R, Error> + Send + 'static,
        R: Send + 'static,
    {
        let pool = self.pool.clone();
        web::block(move || {
            let conn = pool.get()?;
            f(&conn)
        })
        .await
        .map_err(|err| Error::DataUnavailable(err.to_string()))?
    }

    pub fn close(self) {
        let state = self.pool.state();
        log::info!(
            "closing store ({} connections, {} idle)",
            state.connections,
            state.idle_connections
        );
        drop(self.pool);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query;

    #[actix_web::test]
    async fn schema_is_ready_on_first_use() {
        let store = Store::open_in_memory().unwrap();
        let lists = store
            .run(|conn| Ok(query::all_purchase_lists(conn)?))
            .await
            .unwrap();
        assert!(lists.is_empty());
        store.close();
    }

    #[actix_web::test]
    async fn file_store_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_url: dir.path().join("lists.db").to_string_lossy().into_owned(),
            pool_size: 2,
            ..Config::default()
        };
        let product = crate::models::Product {
            id: crate::models::RecordId::new(),
            name: "Гречка".into(),
            carbohydrates: 62.0,
            fats: 3.4,
            proteins: 12.6,
            calories: 313.0,
        };

        let store = Store::open(&config).unwrap();
        let stored = product.clone();
        store
            .run(move |conn| Ok(query::insert_product(&stored, conn)?))
            .await
            .unwrap();
        store.close();

        let reopened = Store::open(&config).unwrap();
        let products = reopened
            .run(|conn| Ok(query::all_products(conn)?))
            .await
            .unwrap();
        assert_eq!(products, vec![product]);
    }
}
