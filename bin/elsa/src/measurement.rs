use chrono::{DateTime, Utc};
use kasa::DeviceInfo;
use transport::senml::{Record, Unit};

pub fn records(identity: &str, info: &DeviceInfo, time: DateTime<Utc>) -> Vec<Record> {
    vec![
        Record {
            base_name: format!("{identity}/power"),
            unit: Unit::Watt,
            time,
            value: info.power,
        },
        Record {
            base_name: format!("{identity}/relay_state"),
            unit: Unit::Ratio,
            time,
            value: f64::from(info.relay_state),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records() {
        let info = DeviceInfo {
            power: 42.5,
            relay_state: 0,
            mac: "CA:FE:CA:FE:CA:FE".to_string(),
        };
        let time = Utc::now();

        let records = records("w.r0.c0", &info, time);

        assert_eq!(records.len(), 2);

        assert_eq!(records[0].base_name, "w.r0.c0/power");
        assert_eq!(records[0].unit, Unit::Watt);
        assert_eq!(records[0].value, 42.5);
        assert_eq!(records[0].time, time);

        assert_eq!(records[1].base_name, "w.r0.c0/relay_state");
        assert_eq!(records[1].unit, Unit::Ratio);
        assert_eq!(records[1].value, 0.0);
        assert_eq!(records[1].time, time);
    }
}
