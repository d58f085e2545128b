/// Repository layer for database operations
use crate::domain::FlightRecord;
use crate::errors::ApiResult;
use async_trait::async_trait;
use sqlx::PgPool;

/// Optional sink for fetched flights. Write-only; nothing reads the rows back.
#[async_trait]
pub trait FlightStore: Send + Sync {
    async fn insert_flights(&self, flights: &[FlightRecord]) -> ApiResult<u64>;
}

/// Postgres-backed flight log
#[derive(Clone)]
pub struct PgFlightStore {
    pool: PgPool,
}

impl PgFlightStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FlightStore for PgFlightStore {
    async fn insert_flights(&self, flights: &[FlightRecord]) -> ApiResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for f in flights {
            let result = sqlx::query(
                "INSERT INTO flight_positions
                    (callsign, origin_country, longitude, latitude, altitude, velocity, heading)
                 VALUES ($1,$2,$3,$4,$5,$6,$7)",
            )
            .bind(&f.callsign)
            .bind(&f.origin_country)
            .bind(f.longitude)
            .bind(f.latitude)
            .bind(f.altitude)
            .bind(f.velocity)
            .bind(f.heading)
            .execute(&mut *tx)
            .await?;
            written += result.rows_affected();
        }

        tx.commit().await?;
        Ok(written)
    }
}

/// Initialize database tables
pub async fn init_db(pool: &PgPool) -> ApiResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS flight_positions(
            id BIGSERIAL PRIMARY KEY,
            fetched_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            callsign TEXT NOT NULL,
            origin_country TEXT,
            longitude DOUBLE PRECISION NOT NULL,
            latitude DOUBLE PRECISION NOT NULL,
            altitude DOUBLE PRECISION NOT NULL,
            velocity DOUBLE PRECISION NOT NULL,
            heading DOUBLE PRECISION NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS ix_flight_positions_fetched
         ON flight_positions(fetched_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
