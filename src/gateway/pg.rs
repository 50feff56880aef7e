/// Direct Postgres submission gateway.
///
/// The hosted store is Postgres underneath, so a reading can also be written
/// with a plain connection string. The table name comes from validated
/// configuration (a bare SQL identifier), the values are bound parameters.

use chrono::{DateTime, Utc};
use postgres::{Client, NoTls};

use crate::config::StoreConfig;
use crate::gateway::SubmissionGateway;
use crate::logging::{self, Component};
use crate::model::{GatewayError, ReadingRecord};

pub struct PostgresGateway {
    client: Client,
    table: String,
}

impl PostgresGateway {
    /// Connects to `database_url`.
    pub fn connect(database_url: &str, table: &str) -> Result<Self, GatewayError> {
        let client = Client::connect(database_url, NoTls)
            .map_err(|e| GatewayError::Database(e.to_string()))?;
        logging::info(Component::Store, None, "Database connection established");

        Ok(PostgresGateway {
            client,
            table: table.to_string(),
        })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, GatewayError> {
        let url = config.database_url.as_deref().ok_or_else(|| {
            GatewayError::Unexpected("postgres backend without database_url".to_string())
        })?;
        Self::connect(url, &config.table)
    }
}

/// INSERT statement for `table`. The caller guarantees `table` is a bare
/// identifier.
pub fn insert_statement(table: &str) -> String {
    format!(
        "INSERT INTO {} (location, rain_date, water_level) VALUES ($1, $2, $3)",
        table
    )
}

impl SubmissionGateway for PostgresGateway {
    fn insert_reading(&mut self, record: &ReadingRecord) -> Result<(), GatewayError> {
        let rain_date: DateTime<Utc> = DateTime::parse_from_rfc3339(&record.rain_date)
            .map_err(|e| GatewayError::Encode(format!("rain_date '{}': {}", record.rain_date, e)))?
            .with_timezone(&Utc);

        self.client
            .execute(
                insert_statement(&self.table).as_str(),
                &[&record.location, &rain_date, &record.water_level],
            )
            .map_err(|e| GatewayError::Database(e.to_string()))?;

        Ok(())
    }

    fn describe(&self) -> String {
        format!("postgres:{}", self.table)
    }
}
