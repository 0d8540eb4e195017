use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Response(Value);

/// Normalized reading of a single plug.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceInfo {
    /// Watts.
    pub power: f64,
    pub relay_state: u8,
    pub mac: String,
}

impl Response {
    pub fn new(value: Value) -> Response {
        Response(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Older firmware reports `power` in watts, newer one `power_mw` in
    /// milliwatts.
    pub fn extract_info(&self) -> Result<DeviceInfo> {
        let realtime = &self.0["emeter"]["get_realtime"];

        let power = match realtime.get("power") {
            Some(power) => power
                .as_f64()
                .ok_or(Error::MissingField("emeter.get_realtime.power"))?,
            None => {
                let power_mw = realtime
                    .get("power_mw")
                    .and_then(Value::as_f64)
                    .ok_or(Error::MissingField("emeter.get_realtime.power_mw"))?;
                power_mw / 1000.0
            }
        };

        let sysinfo = &self.0["system"]["get_sysinfo"];

        let relay_state = sysinfo
            .get("relay_state")
            .and_then(Value::as_u64)
            .and_then(|state| u8::try_from(state).ok())
            .ok_or(Error::MissingField("system.get_sysinfo.relay_state"))?;

        let mac = sysinfo
            .get("mac")
            .and_then(Value::as_str)
            .ok_or(Error::MissingField("system.get_sysinfo.mac"))?;

        Ok(DeviceInfo {
            power,
            relay_state,
            mac: canonical_mac(mac),
        })
    }
}

impl From<Value> for Response {
    fn from(value: Value) -> Self {
        Response(value)
    }
}

/// Upper-case, colon separated form of a MAC address. Strings that do not
/// hold exactly six octets are only trimmed and upper-cased.
pub fn canonical_mac(mac: &str) -> String {
    let digits = mac
        .chars()
        .filter(char::is_ascii_hexdigit)
        .map(|c| c.to_ascii_uppercase())
        .collect::<Vec<_>>();

    if digits.len() != 12 {
        return mac.trim().to_ascii_uppercase();
    }

    let mut result = String::with_capacity(17);
    for (idx, digit) in digits.into_iter().enumerate() {
        if idx > 0 && idx % 2 == 0 {
            result.push(':');
        }
        result.push(digit);
    }

    result
}
