use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum Unit {
    #[serde(rename = "W")]
    Watt,
    #[serde(rename = "/")]
    Ratio,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Record {
    #[serde(rename = "bn")]
    pub base_name: String,
    #[serde(rename = "bu")]
    pub unit: Unit,
    #[serde(rename = "t")]
    pub time: DateTime<Utc>,
    #[serde(rename = "v")]
    pub value: f64,
}

/// Wrapper the downstream database writers expect around a batch of records.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Envelope {
    pub data: Vec<Record>,
}
