use chrono::{NaiveDate, NaiveDateTime};
use model::core::value::{Value, ValueError};

/// Conversion between a stored [`Value`] and the Rust type of an entity
/// field. `NULL` maps to `None`.
pub trait FieldType: Sized {
    fn from_value(value: Value) -> Result<Self, ValueError>;

    fn to_value(&self) -> Value;
}

macro_rules! optional_field {
    ($ty:ty, $expected:literal, |$v:ident| $convert:expr) => {
        impl FieldType for Option<$ty> {
            fn from_value(value: Value) -> Result<Self, ValueError> {
                if value.is_null() {
                    return Ok(None);
                }
                let $v = &value;
                match $convert {
                    Some(converted) => Ok(Some(converted)),
                    None => Err(ValueError::new(&value, $expected)),
                }
            }

            fn to_value(&self) -> Value {
                self.clone().into()
            }
        }
    };
}

optional_field!(i64, "i64", |v| v.as_i64());
optional_field!(i32, "i32", |v| v.as_i64().and_then(|i| i32::try_from(i).ok()));
optional_field!(u64, "u64", |v| v.as_u64());
optional_field!(f64, "f64", |v| v.as_f64());
optional_field!(bool, "bool", |v| v.as_bool());
optional_field!(String, "string", |v| v.as_string());
optional_field!(NaiveDate, "date", |v| v.as_date());
optional_field!(NaiveDateTime, "timestamp", |v| v.as_timestamp());

impl FieldType for Value {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        Ok(value)
    }

    fn to_value(&self) -> Value {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_is_none() {
        assert_eq!(Option::<i64>::from_value(Value::Null), Ok(None));
        assert_eq!(None::<String>.to_value(), Value::Null);
    }

    #[test]
    fn test_text_from_database_converts() {
        assert_eq!(Option::<i64>::from_value(Value::from("42")), Ok(Some(42)));
        assert_eq!(
            Option::<NaiveDateTime>::from_value(Value::from("2024-01-02 03:04:05"))
                .unwrap()
                .map(|ts| ts.to_string()),
            Some("2024-01-02 03:04:05".to_string())
        );
    }

    #[test]
    fn test_conversion_failure() {
        let err = Option::<i32>::from_value(Value::Int(i64::MAX)).unwrap_err();
        assert_eq!(err.expected, "i32");
        assert!(Option::<bool>::from_value(Value::from("maybe")).is_err());
    }
}
