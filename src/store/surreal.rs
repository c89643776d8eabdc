use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{NewProperty, NewUser, Property, User};
use crate::store::traits::{PropertyStore, UserStore};
use crate::store::StoreError;

const PROPERTIES: &str = "properties";
const USERS: &str = "users";

/// Connection settings for the document store
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Endpoint, e.g. `ws://127.0.0.1:8000` or `mem://`
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Process-wide handle to the document store.
///
/// Nothing is opened until the first [`Database::acquire`]; every later call
/// returns the same live connection. Concurrent first callers wait on a
/// single connection attempt, and a failed attempt leaves the handle empty
/// so the next caller retries.
pub struct Database {
    config: DbConfig,
    handle: OnceCell<Surreal<Any>>,
}

impl Database {
    pub fn new(config: DbConfig) -> Self {
        Self {
            config,
            handle: OnceCell::new(),
        }
    }

    /// Return the shared connection, opening it on first use.
    pub async fn acquire(&self) -> Result<&Surreal<Any>, StoreError> {
        self.handle.get_or_try_init(|| connect(&self.config)).await
    }

    pub fn is_connected(&self) -> bool {
        self.handle.initialized()
    }
}

async fn connect(config: &DbConfig) -> Result<Surreal<Any>, StoreError> {
    info!(
        url = %config.url,
        namespace = %config.namespace,
        database = %config.database,
        "Connecting to document store"
    );

    let db = any::connect(config.url.as_str())
        .await
        .map_err(StoreError::Connect)?;

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        db.signin(Root {
            username: username.as_str(),
            password: password.as_str(),
        })
        .await
        .map_err(StoreError::Connect)?;
    }

    db.use_ns(config.namespace.as_str())
        .use_db(config.database.as_str())
        .await
        .map_err(StoreError::Connect)?;

    db.query(format!(
        "DEFINE INDEX IF NOT EXISTS users_email ON TABLE {USERS} FIELDS email UNIQUE;"
    ))
    .await?
    .check()?;

    info!("Connected to document store");
    Ok(db)
}

/// Timestamps are stored as fixed-width RFC 3339 strings (always nine
/// fractional digits) so that ordering by them is chronological.
mod stored_time {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Nanos, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PropertyRow {
    property_id: String,
    listing: NewProperty,
    #[serde(with = "stored_time")]
    created_at: DateTime<Utc>,
}

impl From<PropertyRow> for Property {
    fn from(row: PropertyRow) -> Self {
        Property::from_new(row.property_id, row.listing, row.created_at)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct UserRow {
    user_id: String,
    email: String,
    username: String,
    image: Option<String>,
    #[serde(with = "stored_time")]
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.user_id,
            email: row.email,
            username: row.username,
            image: row.image,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl PropertyStore for Database {
    async fn create_one(&self, listing: NewProperty) -> Result<Property, StoreError> {
        let db = self.acquire().await?;
        let id = Uuid::new_v4().to_string();

        let row = PropertyRow {
            property_id: id.clone(),
            listing,
            created_at: Utc::now(),
        };

        let created: Option<PropertyRow> = db.create((PROPERTIES, id.clone())).content(row).await?;
        let created = created.ok_or_else(|| StoreError::NotReturned {
            table: PROPERTIES,
            id: id.clone(),
        })?;

        debug!(property_id = %id, "Stored property");
        Ok(created.into())
    }

    async fn list_all(&self) -> Result<Vec<Property>, StoreError> {
        let db = self.acquire().await?;

        let rows: Vec<PropertyRow> = db
            .query(format!("SELECT * FROM {PROPERTIES} ORDER BY created_at ASC"))
            .await?
            .take(0)?;

        Ok(rows.into_iter().map(Property::from).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Property>, StoreError> {
        let db = self.acquire().await?;

        let row: Option<PropertyRow> = db.select((PROPERTIES, id.to_string())).await?;
        Ok(row.map(Property::from))
    }
}

#[async_trait]
impl UserStore for Database {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let db = self.acquire().await?;

        let mut rows: Vec<UserRow> = db
            .query(format!("SELECT * FROM {USERS} WHERE email = $email LIMIT 1"))
            .bind(("email", email.to_string()))
            .await?
            .take(0)?;

        Ok(rows.pop().map(User::from))
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let db = self.acquire().await?;
        let id = Uuid::new_v4().to_string();

        let row = UserRow {
            user_id: id.clone(),
            email: user.email,
            username: user.username,
            image: user.image,
            created_at: Utc::now(),
        };

        let created: Option<UserRow> = db.create((USERS, id.clone())).content(row).await?;
        let created = created.ok_or_else(|| StoreError::NotReturned { table: USERS, id })?;

        Ok(created.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn memory_config() -> DbConfig {
        DbConfig {
            url: "mem://".to_string(),
            namespace: "test".to_string(),
            database: "test".to_string(),
            username: None,
            password: None,
        }
    }

    #[tokio::test]
    async fn connection_is_opened_once_and_reused() {
        let db = Database::new(memory_config());
        assert!(!db.is_connected());

        let first = db.acquire().await.unwrap() as *const Surreal<Any>;
        let second = db.acquire().await.unwrap() as *const Surreal<Any>;

        assert!(db.is_connected());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unreachable_store_reports_connect_error() {
        let db = Database::new(DbConfig {
            url: "bogus://nowhere".to_string(),
            ..memory_config()
        });

        let err = db.acquire().await.unwrap_err();
        assert!(matches!(err, StoreError::Connect(_)));
        assert!(!db.is_connected());
    }

    fn listing(name: &str) -> NewProperty {
        NewProperty {
            kind: "House".to_string(),
            name: name.to_string(),
            description: String::new(),
            location: Default::default(),
            beds: None,
            baths: None,
            square_feet: None,
            amenities: Default::default(),
            rates: Default::default(),
            seller_info: Default::default(),
            images: Vec::new(),
            owner: "owner-1".to_string(),
        }
    }

    #[tokio::test]
    async fn list_all_is_oldest_first_across_timestamp_precisions() {
        let db = Database::new(memory_config());
        let handle = db.acquire().await.unwrap();

        let whole_second = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 5).unwrap();
        let rows = [
            ("newest", whole_second + Duration::microseconds(500_001)),
            ("middle", whole_second + Duration::milliseconds(500)),
            ("oldest", whole_second),
        ];
        for (name, created_at) in rows {
            let id = Uuid::new_v4().to_string();
            let row = PropertyRow {
                property_id: id.clone(),
                listing: listing(name),
                created_at,
            };
            let _: Option<PropertyRow> =
                handle.create((PROPERTIES, id)).content(row).await.unwrap();
        }

        let listed = db.list_all().await.unwrap();
        let names: Vec<&str> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["oldest", "middle", "newest"]);
        assert_eq!(listed[0].created_at, whole_second);
    }
}
