use chrono::{NaiveDate, NaiveTime};
use model::{
    core::value::Value,
    records::row::{FieldValue, Row},
};
use mysql_async::{Row as MySqlRow, Value as MySqlValue, consts::ColumnType};
use tracing::warn;

/// Converts a driver row into an ordered [`Row`] keyed by column name.
pub fn to_row(row: &MySqlRow) -> Row {
    let field_values = row
        .columns_ref()
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let value = row
                .as_ref(i)
                .map(|raw| to_value(raw, column.column_type()))
                .unwrap_or(Value::Null);
            FieldValue::new(column.name_str(), value)
        })
        .collect();
    Row::new(field_values)
}

pub fn to_value(raw: &MySqlValue, column_type: ColumnType) -> Value {
    match raw {
        MySqlValue::NULL => Value::Null,
        MySqlValue::Int(i) => Value::Int(*i),
        MySqlValue::UInt(u) => Value::Uint(*u),
        MySqlValue::Float(f) => Value::Float(f64::from(*f)),
        MySqlValue::Double(f) => Value::Float(*f),
        MySqlValue::Bytes(bytes) => match String::from_utf8(bytes.clone()) {
            Ok(text) => Value::String(text),
            Err(_) => Value::Bytes(bytes.clone()),
        },
        MySqlValue::Date(y, m, d, hh, mm, ss, us) => {
            let Some(date) = NaiveDate::from_ymd_opt(i32::from(*y), u32::from(*m), u32::from(*d))
            else {
                // Zero dates such as 0000-00-00 have no chrono form.
                warn!(year = y, month = m, day = d, "Invalid date from driver");
                return Value::Null;
            };
            if column_type == ColumnType::MYSQL_TYPE_DATE {
                return Value::Date(date);
            }
            NaiveTime::from_hms_micro_opt(u32::from(*hh), u32::from(*mm), u32::from(*ss), *us)
                .map_or(Value::Date(date), |time| Value::Timestamp(date.and_time(time)))
        }
        MySqlValue::Time(negative, days, hh, mm, ss, _) => {
            let hours = u64::from(*days) * 24 + u64::from(*hh);
            let sign = if *negative { "-" } else { "" };
            Value::String(format!("{sign}{hours:02}:{mm:02}:{ss:02}"))
        }
    }
}
