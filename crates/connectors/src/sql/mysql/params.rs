use chrono::{Datelike, Timelike};
use model::{core::value::Value, records::params::Params};
use mysql_async::Value as MySqlValue;
use mysql_common::params::Params as MySqlParams;
use tracing::warn;

pub struct MySqlParam(MySqlValue);

impl MySqlParam {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Int(i) => MySqlParam(MySqlValue::Int(*i)),
            Value::Uint(u) => MySqlParam(MySqlValue::UInt(*u)),
            Value::Float(f) => MySqlParam(MySqlValue::Double(*f)),
            Value::String(s) => MySqlParam(MySqlValue::Bytes(s.clone().into_bytes())),
            Value::Boolean(b) => MySqlParam(MySqlValue::Int(i64::from(*b))),
            Value::Bytes(b) => MySqlParam(MySqlValue::Bytes(b.clone())),
            Value::Date(d) => MySqlParam(date_value(d, (0, 0, 0, 0))),
            Value::Timestamp(ts) => MySqlParam(date_value(
                ts,
                (
                    ts.hour() as u8,
                    ts.minute() as u8,
                    ts.second() as u8,
                    ts.and_utc().timestamp_subsec_micros(),
                ),
            )),
            Value::Null => MySqlParam(MySqlValue::NULL),
        }
    }

    pub fn into_inner(self) -> MySqlValue {
        self.0
    }
}

/// Years the driver cannot carry bind as NULL.
fn date_value(
    date: &impl Datelike,
    (hour, minute, second, micros): (u8, u8, u8, u32),
) -> MySqlValue {
    match u16::try_from(date.year()) {
        Ok(year) => MySqlValue::Date(
            year,
            date.month() as u8,
            date.day() as u8,
            hour,
            minute,
            second,
            micros,
        ),
        Err(_) => {
            warn!(year = date.year(), "Date year out of range, binding NULL");
            MySqlValue::NULL
        }
    }
}

/// Named driver parameters; `:name` in the SQL binds the entry `name`.
pub fn named_params(params: &Params) -> MySqlParams {
    if params.is_empty() {
        return MySqlParams::Empty;
    }
    let named: Vec<(String, MySqlValue)> = params
        .iter()
        .map(|(name, value)| (name.to_string(), MySqlParam::from_value(value).into_inner()))
        .collect();
    MySqlParams::from(named)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tracing_test::traced_test;

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(MySqlParam::from_value(&Value::Int(-3)).0, MySqlValue::Int(-3));
        assert_eq!(MySqlParam::from_value(&Value::Boolean(true)).0, MySqlValue::Int(1));
        assert_eq!(
            MySqlParam::from_value(&Value::from("ab")).0,
            MySqlValue::Bytes(b"ab".to_vec())
        );
        assert_eq!(MySqlParam::from_value(&Value::Null).0, MySqlValue::NULL);
    }

    #[test]
    fn test_timestamp_conversion() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(10, 11, 12)
            .unwrap();
        assert_eq!(
            MySqlParam::from_value(&Value::Timestamp(ts)).0,
            MySqlValue::Date(2024, 3, 5, 10, 11, 12, 0)
        );
    }

    #[test]
    #[traced_test]
    fn test_out_of_range_year_binds_null() {
        let bc = NaiveDate::from_ymd_opt(-44, 3, 15).unwrap();
        assert_eq!(MySqlParam::from_value(&Value::Date(bc)).0, MySqlValue::NULL);
        assert!(logs_contain("Date year out of range"));

        let ok = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        assert_eq!(
            MySqlParam::from_value(&Value::Date(ok)).0,
            MySqlValue::Date(1999, 12, 31, 0, 0, 0, 0)
        );
    }

    #[test]
    fn test_named_params() {
        assert_eq!(named_params(&Params::new()), MySqlParams::Empty);

        let params = Params::new().with("param1", 5i64);
        match named_params(&params) {
            MySqlParams::Named(map) => assert_eq!(map.len(), 1),
            other => panic!("expected named params, got {other:?}"),
        }
    }
}
