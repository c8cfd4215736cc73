//! Row conversion helpers shared by the query modules.

use std::{fmt::Display, str::FromStr};

use jiff::Timestamp;
use log::warn;
use rusqlite::{types::Type, Row};
use serde::de::DeserializeOwned;

use crate::error::{Result, WorkflowError};

/// Reads a text column and parses it with [`FromStr`].
pub(crate) fn parse_column<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.to_string().into())
    })
}

pub(crate) fn parse_timestamp(row: &Row, idx: usize) -> rusqlite::Result<Timestamp> {
    row.get::<_, String>(idx)?
        .parse::<Timestamp>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_optional_timestamp(
    row: &Row,
    idx: usize,
) -> rusqlite::Result<Option<Timestamp>> {
    row.get::<_, Option<String>>(idx)?
        .map(|raw| {
            raw.parse::<Timestamp>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            })
        })
        .transpose()
}

/// Reads a JSON text column.
pub(crate) fn parse_json<T: DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn get_id(row: &Row, idx: usize) -> rusqlite::Result<u64> {
    Ok(row.get::<_, i64>(idx)? as u64)
}

pub(crate) fn get_optional_id(row: &Row, idx: usize) -> rusqlite::Result<Option<u64>> {
    Ok(row.get::<_, Option<i64>>(idx)?.map(|id| id as u64))
}

/// Trims an optional text field and drops it when blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Fails with a version conflict when the caller saw a different version.
pub(crate) fn ensure_version(
    entity: &'static str,
    id: u64,
    expected: Option<u64>,
    actual: u64,
) -> Result<()> {
    match expected {
        Some(expected) if expected != actual => Err(version_conflict(entity, id, expected, actual)),
        _ => Ok(()),
    }
}

/// Conflict for a conditional write that matched no row.
///
/// Always an error, even when the re-read version equals `expected`.
pub(crate) fn version_conflict(
    entity: &'static str,
    id: u64,
    expected: u64,
    actual: u64,
) -> WorkflowError {
    warn!("{entity} {id}: expected version {expected}, found {actual}");
    WorkflowError::VersionConflict {
        entity,
        id,
        expected,
        actual,
    }
}
