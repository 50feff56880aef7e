/// Integration tests for the direct Postgres gateway
///
/// Tests verify:
/// 1. A reading inserted through `PostgresGateway` lands in the table
/// 2. The stored row carries the exact location, instant, and level
///
/// Prerequisites:
/// - PostgreSQL with the athus_data table (sql/001_athus_data.sql)
/// - DATABASE_URL set in .env
///
/// Run with: cargo test --test postgres_integration -- --ignored --test-threads=1

use athus_form::gateway::{PostgresGateway, SubmissionGateway};
use athus_form::model::ReadingRecord;
use chrono::{DateTime, TimeZone, Utc};
use postgres::{Client, NoTls};
use std::env;

const TEST_LOCATION: &str = "-7.0637616,110.3466957";

fn database_url() -> String {
    dotenv::dotenv().ok();
    env::var("DATABASE_URL").expect("DATABASE_URL must be set")
}

fn cleanup(client: &mut Client) {
    let _ = client.execute(
        "DELETE FROM athus_data WHERE location = $1 AND water_level = 123.25",
        &[&TEST_LOCATION],
    );
}

#[test]
#[ignore] // Needs a live database
fn test_insert_reading_stores_one_row() {
    let url = database_url();
    let mut client = Client::connect(&url, NoTls).expect("Failed to connect to test database");
    cleanup(&mut client);

    let mut gateway = PostgresGateway::connect(&url, "athus_data").expect("gateway should connect");
    gateway
        .insert_reading(&ReadingRecord {
            location: TEST_LOCATION.to_string(),
            rain_date: "2024-04-30T00:00:00.000Z".to_string(),
            water_level: 123.25,
        })
        .expect("insert should succeed");

    let rows = client
        .query(
            "SELECT location, rain_date, water_level FROM athus_data
             WHERE location = $1 AND water_level = 123.25",
            &[&TEST_LOCATION],
        )
        .unwrap();

    assert_eq!(rows.len(), 1);
    let location: String = rows[0].get(0);
    let rain_date: DateTime<Utc> = rows[0].get(1);
    let level: f64 = rows[0].get(2);
    assert_eq!(location, TEST_LOCATION);
    assert_eq!(rain_date, Utc.with_ymd_and_hms(2024, 4, 30, 0, 0, 0).unwrap());
    assert_eq!(level, 123.25);

    cleanup(&mut client);
}

#[test]
#[ignore] // Needs a live database
fn test_unknown_table_is_a_database_error() {
    let mut gateway =
        PostgresGateway::connect(&database_url(), "athus_missing_table").expect("gateway should connect");
    let result = gateway.insert_reading(&ReadingRecord {
        location: TEST_LOCATION.to_string(),
        rain_date: "2024-04-30T00:00:00.000Z".to_string(),
        water_level: 1.0,
    });
    assert!(matches!(result, Err(athus_form::model::GatewayError::Database(_))));
}
