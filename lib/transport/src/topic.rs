use std::fmt;
use std::str::FromStr;

use serde::de::{value, Error};

pub const DATA_CATEGORY: &str = "data";
pub const PLUG_SOURCE: &str = "sp_data";

/// `{category}/{source}/{database}`, e.g. `data/sp_data/influx`.
#[derive(Clone, Debug, PartialEq)]
pub struct Topic {
    pub category: String,
    pub source: String,
    pub database: String,
}

impl Topic {
    pub fn plug_data(database: &str) -> Topic {
        Topic {
            category: DATA_CATEGORY.to_string(),
            source: PLUG_SOURCE.to_string(),
            database: database.to_string(),
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}/{}", self.category, self.source, self.database)
    }
}

impl FromStr for Topic {
    type Err = value::Error;

    fn from_str(s: &str) -> std::result::Result<Topic, Self::Err> {
        const ERROR_MSG: &str = "supported topics are <category>/<source>/<database>";

        let mut parts = s.splitn(3, '/');

        match (parts.next(), parts.next(), parts.next()) {
            (Some(category), Some(source), Some(database))
                if !category.is_empty()
                    && !source.is_empty()
                    && !database.is_empty()
                    && !database.contains('/') =>
            {
                Ok(Topic {
                    category: category.to_string(),
                    source: source.to_string(),
                    database: database.to_string(),
                })
            }
            _ => Err(value::Error::custom(ERROR_MSG)),
        }
    }
}
