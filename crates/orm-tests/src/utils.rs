use chrono::NaiveDateTime;
use config::settings::Settings;
use connectors::recording::RecordingConnector;
use entity::{Entity, Repositories, Row, Value, entity};
use mapping::registry::{EntityRegistry, MetadataSource};
use model::core::identifiers::ClassId;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

entity! {
    pub struct User in "user" {
        user_id: Option<i64> = "userId",
        first_name: Option<String> = "firstName",
        last_name: Option<String> = "lastName",
        email: Option<String> = "email" => "email_address",
        created_at: Option<NaiveDateTime> = "createdAt",
        updated_at: Option<NaiveDateTime> = "updatedAt",
    }
}

entity! {
    pub struct Order in "order" {
        order_id: Option<i64> = "orderId",
        customer_id: Option<i64> = "customerId",
        total: Option<f64> = "total" => "total_amount",
        status: Option<String> = "status",
        created_at: Option<NaiveDateTime> = "createdAt",
    }
}

entity! {
    pub struct Customer in "customer" {
        customer_id: Option<i64> = "customerId",
        name: Option<String> = "name",
    }
}

entity! {
    pub struct OrderLine in "order_line" [key "lineNo"] {
        line_no: Option<i64> = "lineNo",
        order_id: Option<i64> = "orderId",
        unit_price: Option<f64> = "unitPrice",
    }
}

/// Settings accepted by validation; `mode` is `single` or `multi`.
pub fn settings(mode: &str, connection: &str) -> Settings {
    Settings {
        mode: Some(mode.to_string()),
        user: "app".to_string(),
        password: "secret".to_string(),
        host: "localhost".to_string(),
        database: Some("shop".to_string()),
        database_prefix: "erp_".to_string(),
        connection: Some(connection.to_string()),
        ..Settings::default()
    }
}

/// A factory over the fixture entities, recording every statement.
pub fn repositories(settings: Settings) -> (RecordingConnector, Repositories) {
    let connector = RecordingConnector::new();
    let repos = Repositories::builder(settings)
        .connector(Arc::new(connector.clone()))
        .entity::<User>()
        .entity::<Order>()
        .entity::<Customer>()
        .entity::<OrderLine>()
        .build()
        .expect("build repositories");
    (connector, repos)
}

pub fn single() -> (RecordingConnector, Repositories) {
    repositories(settings("single", "shared"))
}

pub fn record<const N: usize>(pairs: [(&str, Value); N]) -> Row {
    pairs.into_iter().collect()
}

pub fn user_row(id: i64, first_name: &str) -> Row {
    record([
        ("user_id", Value::Int(id)),
        ("first_name", Value::from(first_name)),
        ("last_name", Value::from("Doe")),
        ("email_address", Value::from(format!("{}@example.com", first_name.to_lowercase()))),
    ])
}

/// Registry of the fixture entities under the `models` namespace.
pub fn registry() -> EntityRegistry {
    let mut registry = EntityRegistry::new("models");
    for (name, fields) in [
        (User::NAME, User::FIELDS),
        (Order::NAME, Order::FIELDS),
        (Customer::NAME, Customer::FIELDS),
        (OrderLine::NAME, OrderLine::FIELDS),
    ] {
        registry.register(name, fields).expect("register fixture");
    }
    registry
}

/// Counts override lookups made against the wrapped source.
pub struct CountingSource {
    inner: EntityRegistry,
    lookups: AtomicUsize,
}

impl CountingSource {
    pub fn new(inner: EntityRegistry) -> Arc<Self> {
        Arc::new(CountingSource {
            inner,
            lookups: AtomicUsize::new(0),
        })
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl MetadataSource for CountingSource {
    fn declared_fields(&self, class: &ClassId) -> Vec<String> {
        self.inner.declared_fields(class)
    }

    fn is_public_instance_field(&self, class: &ClassId, field: &str) -> bool {
        self.inner.is_public_instance_field(class, field)
    }

    fn declared_column_name(&self, class: &ClassId, field: &str) -> Option<String> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.declared_column_name(class, field)
    }
}
