//! This is a library that provides objects and functionality to keep track of
//! favorite food spots on a map: storing them in a database, seeding a fresh
//! database, and the client-side logic for searching them and moving the map
//! around as the user picks a spot.

use serde::{Deserialize, Deserializer};
use std::str::FromStr;

pub mod database;
pub mod error;
pub mod input;
pub mod location;
pub mod search;
pub mod seed;
pub mod timer;
pub mod viewstate;

pub use database::Database;
pub use error::Error;
pub use error::Result;

pub fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => FromStr::from_str(s)
            .map_err(serde::de::Error::custom)
            .map(Some),
    }
}
