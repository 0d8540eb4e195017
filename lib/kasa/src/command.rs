use serde::{Deserialize, Serialize};

/// A request understood by the plug. Every present module is answered in
/// the same response object, keyed by the module name.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Command {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emeter: Option<Emeter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<System>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Emeter {
    GetRealtime {},
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum System {
    GetSysinfo {},
}

impl Command {
    /// Real-time power reading together with the system info, which carries
    /// the MAC address and the relay state.
    pub fn get_power() -> Command {
        Command {
            emeter: Some(Emeter::GetRealtime {}),
            system: Some(System::GetSysinfo {}),
        }
    }

    pub fn get_sysinfo() -> Command {
        Command {
            emeter: None,
            system: Some(System::GetSysinfo {}),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialization() {
        let command = serde_json::to_value(Command::get_power()).unwrap();
        assert_eq!(
            command,
            json!({"emeter": {"get_realtime": {}}, "system": {"get_sysinfo": {}}})
        );

        let command = serde_json::to_value(Command::get_sysinfo()).unwrap();
        assert_eq!(command, json!({"system": {"get_sysinfo": {}}}));
    }

    #[test]
    fn test_deserialization() {
        let command: Command = serde_json::from_value(json!({
            "system": {"get_sysinfo": {}},
            "emeter": {"get_realtime": {}},
        }))
        .unwrap();
        assert_eq!(command, Command::get_power());

        let command: Command =
            serde_json::from_value(json!({"system": {"get_sysinfo": {}}})).unwrap();
        assert_eq!(command, Command::get_sysinfo());
    }
}
