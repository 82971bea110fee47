//! Nearest-float proximity heuristic.
//!
//! Recognizes "find the nearest float to 15N 90E" style questions and
//! builds the proximity statement directly, skipping the model round trip.
//! Distance is squared Euclidean over raw degrees; that is inaccurate near
//! the poles and the anti-meridian and is documented behavior, not a bug.

use crate::db::StoreSession;
use crate::error::Result;
use regex::Regex;
use tracing::debug;

/// The trajectory table the proximity statement runs against.
const TRAJECTORY_TABLE: &str = "traj_rel";

const LATITUDE_CANDIDATES: &[&str] = &["latitude", "lat"];
const LONGITUDE_CANDIDATES: &[&str] = &["longitude", "lon", "long"];
const ID_CANDIDATES: &[&str] = &["platform_number", "platform", "float_id", "id"];
const TIME_CANDIDATES: &[&str] = &["juld", "date", "timestamp", "time"];

/// Extracts a `(latitude, longitude)` pair from free text.
///
/// Degree signs (including the mojibake `Â°` form seen in copy-pasted
/// text) are normalized to spaces before matching. A hemisphere letter
/// forces the sign of its number; without one the typed sign is kept.
pub fn extract_lat_lon(text: &str) -> Option<(f64, f64)> {
    let cleaned = text.replace("Â°", " ").replace('°', " ").to_uppercase();
    // Matches patterns like "15 N, 90 E" or "15N 90E"
    let re = Regex::new(r"(-?\d+(?:\.\d+)?)\s*([NS])?\s*[, ]+\s*(-?\d+(?:\.\d+)?)\s*([EW])?").ok()?;
    let caps = re.captures(&cleaned)?;

    let mut lat: f64 = caps[1].parse().ok()?;
    let mut lon: f64 = caps[3].parse().ok()?;

    match caps.get(2).map(|m| m.as_str()) {
        Some("S") => lat = -lat.abs(),
        Some("N") => lat = lat.abs(),
        _ => {}
    }
    match caps.get(4).map(|m| m.as_str()) {
        Some("W") => lon = -lon.abs(),
        Some("E") => lon = lon.abs(),
        _ => {}
    }

    Some((lat, lon))
}

/// Resolves the first candidate name present in `columns`, matching
/// case-insensitively and returning the column's declared spelling.
fn find_column(columns: &[String], candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|candidate| {
        columns
            .iter()
            .find(|col| col.eq_ignore_ascii_case(candidate))
            .cloned()
    })
}

/// Attempts to build the nearest-float statement for the given input.
///
/// Returns `Ok(None)` when the heuristic does not apply: the intent gate
/// ("nearest" and "float" as substrings) fails, no coordinate pair is
/// found, the trajectory table is absent, or it lacks usable latitude and
/// longitude columns. Database failures propagate as errors.
pub async fn nearest_float_statement(
    session: &mut StoreSession,
    input: &str,
) -> Result<Option<String>> {
    let lowered = input.to_lowercase();
    if !lowered.contains("nearest") || !lowered.contains("float") {
        return Ok(None);
    }
    let Some((lat, lon)) = extract_lat_lon(input) else {
        return Ok(None);
    };

    let columns = session.table_columns(TRAJECTORY_TABLE).await?;
    if columns.is_empty() {
        return Ok(None);
    }

    let Some(lat_col) = find_column(&columns, LATITUDE_CANDIDATES) else {
        return Ok(None);
    };
    let Some(lon_col) = find_column(&columns, LONGITUDE_CANDIDATES) else {
        return Ok(None);
    };
    let id_col = find_column(&columns, ID_CANDIDATES);
    let time_col = find_column(&columns, TIME_CANDIDATES);

    let mut select_cols = Vec::new();
    if let Some(id) = &id_col {
        select_cols.push(format!("{id} AS platform_number"));
    }
    select_cols.push(format!("{lat_col} AS latitude"));
    select_cols.push(format!("{lon_col} AS longitude"));
    if let Some(time) = &time_col {
        select_cols.push(format!("{time} AS juld"));
    }

    // 8 decimal places keeps the interpolated literals stable across
    // float formatting quirks.
    let dist_expr = format!(
        "(({lat_col} - ({lat:.8})) * ({lat_col} - ({lat:.8})) + \
         ({lon_col} - ({lon:.8})) * ({lon_col} - ({lon:.8})))"
    );

    let sql = format!(
        "SELECT {}, {dist_expr} AS distance_sq FROM {TRAJECTORY_TABLE} \
         WHERE {lat_col} IS NOT NULL AND {lon_col} IS NOT NULL \
         ORDER BY distance_sq ASC LIMIT 5;",
        select_cols.join(", ")
    );
    debug!(lat, lon, "nearest-float heuristic matched");
    Ok(Some(sql))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::SqliteStore;
    use sqlx::sqlite::SqliteConnectOptions;
    use sqlx::{Connection, SqliteConnection};
    use std::path::Path;
    use tempfile::TempDir;

    async fn seed_database(path: &Path, statements: &[&str]) {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let mut conn = SqliteConnection::connect_with(&options).await.unwrap();
        for sql in statements {
            sqlx::query(sql).execute(&mut conn).await.unwrap();
        }
        conn.close().await.unwrap();
    }

    async fn store_with(dir: &TempDir, statements: &[&str]) -> SqliteStore {
        let path = dir.path().join("argo.db");
        seed_database(&path, statements).await;
        SqliteStore::new(&Config {
            db_path: path,
            ..Config::default()
        })
    }

    #[test]
    fn test_extract_plain_pair() {
        assert_eq!(extract_lat_lon("floats near 15, 90"), Some((15.0, 90.0)));
        assert_eq!(extract_lat_lon("-15, -90"), Some((-15.0, -90.0)));
    }

    #[test]
    fn test_extract_hemisphere_letters() {
        assert_eq!(extract_lat_lon("15N 90E"), Some((15.0, 90.0)));
        assert_eq!(extract_lat_lon("15 n, 90 e"), Some((15.0, 90.0)));
        assert_eq!(extract_lat_lon("15S 90W"), Some((-15.0, -90.0)));
    }

    #[test]
    fn test_extract_hemisphere_overrides_typed_sign() {
        assert_eq!(extract_lat_lon("-15 S -90 W"), Some((-15.0, -90.0)));
        assert_eq!(extract_lat_lon("-15 N -90 E"), Some((15.0, 90.0)));
    }

    #[test]
    fn test_extract_decimal_coordinates() {
        assert_eq!(
            extract_lat_lon("nearest float to 15.25N, 89.75E"),
            Some((15.25, 89.75))
        );
    }

    #[test]
    fn test_extract_degree_signs() {
        assert_eq!(extract_lat_lon("15°N, 90°E"), Some((15.0, 90.0)));
        assert_eq!(extract_lat_lon("15Â°N 90Â°E"), Some((15.0, 90.0)));
    }

    #[test]
    fn test_extract_no_coordinates() {
        assert_eq!(extract_lat_lon("nearest float to India"), None);
        assert_eq!(extract_lat_lon(""), None);
    }

    #[test]
    fn test_find_column_case_insensitive_first_candidate_wins() {
        let columns = vec!["Longitude".to_string(), "LAT".to_string()];
        assert_eq!(
            find_column(&columns, LATITUDE_CANDIDATES),
            Some("LAT".to_string())
        );
        assert_eq!(
            find_column(&columns, LONGITUDE_CANDIDATES),
            Some("Longitude".to_string())
        );
        assert_eq!(find_column(&columns, ID_CANDIDATES), None);
    }

    #[tokio::test]
    async fn test_statement_with_full_trajectory_table() {
        let dir = TempDir::new().unwrap();
        let store = store_with(
            &dir,
            &["CREATE TABLE traj_rel (platform_number INTEGER, latitude REAL, longitude REAL, juld TEXT)"],
        )
        .await;
        let mut session = store.open_session().await.unwrap();

        let sql = nearest_float_statement(&mut session, "find the nearest float to 15N 90E")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            sql,
            "SELECT platform_number AS platform_number, latitude AS latitude, \
             longitude AS longitude, juld AS juld, \
             ((latitude - (15.00000000)) * (latitude - (15.00000000)) + \
             (longitude - (90.00000000)) * (longitude - (90.00000000))) AS distance_sq \
             FROM traj_rel WHERE latitude IS NOT NULL AND longitude IS NOT NULL \
             ORDER BY distance_sq ASC LIMIT 5;"
        );
    }

    #[tokio::test]
    async fn test_statement_with_short_column_names() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, &["CREATE TABLE traj_rel (id INTEGER, lat REAL, lon REAL)"])
            .await;
        let mut session = store.open_session().await.unwrap();

        let sql = nearest_float_statement(&mut session, "nearest float to 10S, 20W")
            .await
            .unwrap()
            .unwrap();

        assert!(sql.starts_with("SELECT id AS platform_number, lat AS latitude, lon AS longitude, "));
        assert!(!sql.contains("AS juld"));
        assert!(sql.contains("(lat - (-10.00000000))"));
        assert!(sql.contains("(lon - (-20.00000000))"));
    }

    #[tokio::test]
    async fn test_intent_gate_requires_both_words() {
        let dir = TempDir::new().unwrap();
        let store = store_with(
            &dir,
            &["CREATE TABLE traj_rel (latitude REAL, longitude REAL)"],
        )
        .await;
        let mut session = store.open_session().await.unwrap();

        let result = nearest_float_statement(&mut session, "nearest port to 15N 90E")
            .await
            .unwrap();
        assert_eq!(result, None);

        let result = nearest_float_statement(&mut session, "show floats at 15N 90E")
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_no_coordinates_does_not_apply() {
        let dir = TempDir::new().unwrap();
        let store = store_with(
            &dir,
            &["CREATE TABLE traj_rel (latitude REAL, longitude REAL)"],
        )
        .await;
        let mut session = store.open_session().await.unwrap();

        let result = nearest_float_statement(&mut session, "find the nearest float to India")
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_missing_trajectory_table_does_not_apply() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, &["CREATE TABLE profiles (temp REAL)"]).await;
        let mut session = store.open_session().await.unwrap();

        let result = nearest_float_statement(&mut session, "nearest float to 15N 90E")
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_missing_longitude_column_does_not_apply() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, &["CREATE TABLE traj_rel (latitude REAL, depth REAL)"]).await;
        let mut session = store.open_session().await.unwrap();

        let result = nearest_float_statement(&mut session, "nearest float to 15N 90E")
            .await
            .unwrap();
        assert_eq!(result, None);
    }
}
