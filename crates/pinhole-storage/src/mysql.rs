use async_trait::async_trait;
use jiff::Timestamp;
use pinhole_core::repository::{MappingRepository, Result};
use pinhole_core::{Algorithm, NewMapping, ShortCode, StorageError, UrlMapping};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tracing::{debug, trace};

const SCHEMA: &str = include_str!("../ddl/mysql/url_mappings.sql");

const SELECT_COLUMNS: &str = r#"
    SELECT id, short_code, original_url, algorithm, visits,
           expires_at, owner_id, created_at, updated_at
    FROM url_mappings
"#;

/// MySQL implementation of [`MappingRepository`].
///
/// Timestamps are stored as unix seconds, so values read back are truncated
/// to second precision. Uniqueness of short codes is enforced by the
/// `uk_url_mappings_short_code` index; pending rows hold `NULL`.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Creates the `url_mappings` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        debug!("Ensured url_mappings schema");
        Ok(())
    }
}

fn truncate_to_second(ts: Timestamp) -> Timestamp {
    Timestamp::from_second(ts.as_second()).unwrap_or(ts)
}

fn parse_timestamp(column: &str, seconds: i64) -> Result<Timestamp> {
    Timestamp::from_second(seconds).map_err(|e| {
        StorageError::InvalidData(format!("invalid {column} timestamp '{seconds}': {e}"))
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

fn row_to_mapping(row: &MySqlRow) -> Result<UrlMapping> {
    let short_code: Option<String> = row.try_get("short_code").map_err(map_sqlx_error)?;
    let algorithm: String = row.try_get("algorithm").map_err(map_sqlx_error)?;
    let expires_at: Option<i64> = row.try_get("expires_at").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    let updated_at: i64 = row.try_get("updated_at").map_err(map_sqlx_error)?;

    let short_code = short_code
        .map(|code| {
            ShortCode::new(&code).map_err(|e| {
                StorageError::InvalidData(format!("invalid short code '{code}': {e}"))
            })
        })
        .transpose()?;
    let algorithm = Algorithm::from_name(&algorithm).ok_or_else(|| {
        StorageError::InvalidData(format!("unknown algorithm '{algorithm}'"))
    })?;

    Ok(UrlMapping {
        id: row.try_get("id").map_err(map_sqlx_error)?,
        short_code,
        original_url: row.try_get("original_url").map_err(map_sqlx_error)?,
        algorithm,
        visits: row.try_get("visits").map_err(map_sqlx_error)?,
        expires_at: expires_at
            .map(|seconds| parse_timestamp("expires_at", seconds))
            .transpose()?,
        owner_id: row.try_get("owner_id").map_err(map_sqlx_error)?,
        created_at: parse_timestamp("created_at", created_at)?,
        updated_at: parse_timestamp("updated_at", updated_at)?,
    })
}

#[async_trait]
impl MappingRepository for MySqlRepository {
    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE short_code = ? LIMIT 1"))
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_mapping).transpose()
    }

    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<UrlMapping>> {
        let row = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE original_url = ? ORDER BY id DESC LIMIT 1"
        ))
        .bind(original_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_mapping).transpose()
    }

    async fn insert(&self, mapping: NewMapping) -> Result<UrlMapping> {
        let now = truncate_to_second(Timestamp::now());
        let expires_at = mapping.expires_at.map(truncate_to_second);

        let result = sqlx::query(
            r#"
            INSERT INTO url_mappings
                (short_code, original_url, algorithm, visits, expires_at, owner_id, created_at, updated_at)
            VALUES (NULL, ?, ?, 0, ?, ?, ?, ?)
            "#,
        )
        .bind(&mapping.original_url)
        .bind(mapping.algorithm.as_str())
        .bind(expires_at.map(|ts| ts.as_second()))
        .bind(mapping.owner_id)
        .bind(now.as_second())
        .bind(now.as_second())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let id = result.last_insert_id();
        trace!(id, "Inserted pending mapping");

        Ok(NewMapping {
            expires_at,
            ..mapping
        }
        .into_mapping(id, now))
    }

    async fn update(&self, mapping: &UrlMapping) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE url_mappings
            SET short_code = ?,
                original_url = ?,
                algorithm = ?,
                visits = ?,
                expires_at = ?,
                owner_id = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(mapping.short_code.as_ref().map(ShortCode::as_str))
        .bind(&mapping.original_url)
        .bind(mapping.algorithm.as_str())
        .bind(mapping.visits)
        .bind(mapping.expires_at.map(|ts| ts.as_second()))
        .bind(mapping.owner_id)
        .bind(mapping.updated_at.as_second())
        .bind(mapping.id)
        .execute(&self.pool)
        .await;

        match result {
            // MySQL reports zero affected rows for no-op updates, so the count is not checked.
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(StorageError::Conflict(
                mapping
                    .short_code
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            )),
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn list_all(&self) -> Result<Vec<UrlMapping>> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(row_to_mapping).collect()
    }

    async fn delete_expired(&self, now: Timestamp) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM url_mappings
            WHERE expires_at IS NOT NULL
              AND expires_at < ?
            "#,
        )
        .bind(now.as_second())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
