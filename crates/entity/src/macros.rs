/// Declares an entity struct and its [`Entity`](crate::Entity) implementation.
///
/// ```ignore
/// entity! {
///     pub struct Order in "order" [key "orderId"] {
///         order_id: Option<i64> = "orderId",
///         customer_id: Option<i64> = "customerId",
///         total: Option<f64> = "total" => "total_amount",
///         created_at: Option<NaiveDateTime> = "createdAt",
///     }
/// }
/// ```
///
/// Each field names its entity field (`"customerId"`) and optionally an
/// explicit column (`=> "total_amount"`); other fields map through snake case.
/// `[core = true]` after the key marks an entity of the core database.
#[macro_export]
macro_rules! entity {
    (@def $fname:literal) => {
        $crate::FieldDef::new($fname)
    };
    (@def $fname:literal, $column:literal) => {
        $crate::FieldDef::with_column($fname, $column)
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident in $table:literal
            $([key $pk:literal])? $([core = $core:literal])? {
            $( $field:ident : $ty:ty = $fname:literal $(=> $column:literal)? ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            $( pub $field: $ty, )*
        }

        impl $crate::Entity for $name {
            const NAME: &'static str = stringify!($name);
            const TABLE: &'static str = $table;
            const FIELDS: &'static [$crate::FieldDef] = &[
                $( $crate::entity!(@def $fname $(, $column)?) ),*
            ];
            $( const PRIMARY_KEY: Option<&'static str> = Some($pk); )?
            $( const CORE: bool = $core; )?

            fn get_field(&self, name: &str) -> Option<$crate::Value> {
                match name {
                    $( $fname => Some($crate::FieldType::to_value(&self.$field)), )*
                    _ => None,
                }
            }

            fn set_field(
                &mut self,
                name: &str,
                value: $crate::Value,
            ) -> Result<bool, $crate::ValueError> {
                match name {
                    $(
                        $fname => {
                            self.$field = $crate::FieldType::from_value(value)?;
                            Ok(true)
                        }
                    )*
                    _ => Ok(false),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{Entity, FieldDef, OrmError, Value};
    use chrono::NaiveDateTime;

    entity! {
        /// Test order.
        pub struct Order in "order" {
            order_id: Option<i64> = "orderId",
            customer_id: Option<i64> = "customerId",
            total: Option<f64> = "total" => "total_amount",
            created_at: Option<NaiveDateTime> = "createdAt",
        }
    }

    entity! {
        struct Shipment in "shipment" [key "trackingNo"] [core = true] {
            tracking_no: Option<String> = "trackingNo",
            note: Value = "note"
        }
    }

    #[test]
    fn test_generated_metadata() {
        assert_eq!(Order::NAME, "Order");
        assert_eq!(Order::TABLE, "order");
        assert_eq!(
            Order::FIELDS[2],
            FieldDef::with_column("total", "total_amount")
        );
        assert_eq!(Order::primary_key(), "orderId");
        assert_eq!(Order::primary_column(), "order_id");
        assert_eq!(Shipment::primary_key(), "trackingNo");
        assert_eq!(Shipment::primary_column(), "tracking_no");
        assert!(Shipment::CORE);
        assert!(!Order::CORE);
        assert_eq!(Order::STATUS_FIELD, "status");
    }

    #[test]
    fn test_field_dispatch() {
        let mut order = Order::default();
        assert_eq!(order.set_field("customerId", Value::from("12")), Ok(true));
        assert_eq!(order.set_field("customer_id", Value::Int(1)), Ok(false));
        assert_eq!(order.customer_id, Some(12));
        assert_eq!(order.get_field("total"), Some(Value::Null));
        assert_eq!(order.get_field("nope"), None);
        assert!(order.set_field("orderId", Value::from("x")).is_err());
    }

    #[test]
    fn test_id_accessors() {
        let mut order = Order::default();
        assert!(order.id().is_null());
        order.set_id(Value::from("7")).unwrap();
        assert_eq!(order.id(), Value::Int(7));
    }

    #[test]
    fn test_to_record() {
        let order = Order {
            order_id: Some(1),
            total: Some(2.5),
            ..Default::default()
        };

        let all = order.to_record(&[]).unwrap();
        assert_eq!(
            all.names().collect::<Vec<_>>(),
            vec!["orderId", "customerId", "total", "createdAt"]
        );

        let some = order.to_record(&["total"]).unwrap();
        assert_eq!(some.get("total"), Some(&Value::Float(2.5)));

        assert_eq!(
            order.to_record(&["missing"]),
            Err(OrmError::Internal("Order has no field `missing`".into()))
        );
    }

    #[test]
    fn test_raw_value_field() {
        let mut shipment = Shipment::default();
        shipment.set_field("note", Value::Int(3)).unwrap();
        assert_eq!(shipment.note, Value::Int(3));
    }
}
