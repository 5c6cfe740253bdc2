//! Turning result rows into entities.

use crate::{core::entity::Entity, error::OrmError};
use mapping::{cache::EntityInfo, context::MappingContext};
use model::records::row::Row;
use std::sync::Arc;
use tracing::trace;

/// Result of a read. With [`Collapse::Single`], one row gives `One` and no
/// rows give `Empty`; [`Collapse::List`] always gives `Many`.
#[derive(Debug, Clone, PartialEq)]
pub enum Hydrated<T> {
    Empty,
    One(T),
    Many(Vec<T>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collapse {
    Single,
    List,
}

impl<T> Hydrated<T> {
    pub fn is_empty(&self) -> bool {
        match self {
            Hydrated::Empty => true,
            Hydrated::One(_) => false,
            Hydrated::Many(items) => items.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Hydrated::Empty => 0,
            Hydrated::One(_) => 1,
            Hydrated::Many(items) => items.len(),
        }
    }

    /// The single value, or the first one of a list.
    pub fn into_first(self) -> Option<T> {
        match self {
            Hydrated::Empty => None,
            Hydrated::One(item) => Some(item),
            Hydrated::Many(items) => items.into_iter().next(),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Hydrated::Empty => Vec::new(),
            Hydrated::One(item) => vec![item],
            Hydrated::Many(items) => items,
        }
    }
}

/// How a row becomes a result item: hydrated into the entity `E`, or kept as
/// the raw [`Row`].
pub trait Materialize<E: Entity>: Sized {
    fn materialize(mapper: &Mapper<'_>, row: Row) -> Result<Self, OrmError>;
}

impl<E: Entity> Materialize<E> for E {
    fn materialize(mapper: &Mapper<'_>, row: Row) -> Result<Self, OrmError> {
        let mut entity = Mapper::new_entity::<E>();
        mapper.hydrate(&row, &mut entity)?;
        Ok(entity)
    }
}

impl<E: Entity> Materialize<E> for Row {
    fn materialize(_: &Mapper<'_>, row: Row) -> Result<Self, OrmError> {
        Ok(row)
    }
}

/// Maps columns back to fields through the field/column cache.
#[derive(Debug, Clone, Copy)]
pub struct Mapper<'a> {
    ctx: &'a MappingContext,
}

impl<'a> Mapper<'a> {
    pub fn new(ctx: &'a MappingContext) -> Self {
        Mapper { ctx }
    }

    /// `E::default()` followed by its bootstrap hook.
    pub fn new_entity<E: Entity>() -> E {
        let mut entity = E::default();
        entity.bootstrap();
        entity
    }

    pub fn info<E: Entity>(&self) -> Arc<EntityInfo> {
        self.ctx.info(&self.ctx.class_for_name(E::NAME))
    }

    /// Assigns every column of `row` to the matching field of `target`.
    /// Columns without a field are skipped.
    pub fn hydrate<E: Entity>(&self, row: &Row, target: &mut E) -> Result<(), OrmError> {
        let info = self.info::<E>();
        for (column, value) in row.iter() {
            let field = info.field_of(column);
            if !target.set_field(&field, value.clone())? {
                trace!(entity = E::NAME, column, field = %field, "Skipped column without field");
            }
        }
        Ok(())
    }

    /// Like [`Mapper::hydrate`], but a column without a field is an error.
    pub fn hydrate_strict<E: Entity>(&self, row: &Row, target: &mut E) -> Result<(), OrmError> {
        let info = self.info::<E>();
        for (column, value) in row.iter() {
            let field = info.field_of(column);
            if !target.set_field(&field, value.clone())? {
                return Err(OrmError::internal(format!(
                    "{} has no field `{field}` for column `{column}`",
                    E::NAME
                )));
            }
        }
        Ok(())
    }

    pub fn hydrate_set<E, T>(&self, rows: Vec<Row>, collapse: Collapse) -> Result<Hydrated<T>, OrmError>
    where
        E: Entity,
        T: Materialize<E>,
    {
        let mut items = rows
            .into_iter()
            .map(|row| T::materialize(self, row))
            .collect::<Result<Vec<T>, OrmError>>()?;

        Ok(match (collapse, items.len()) {
            (Collapse::Single, 0) => Hydrated::Empty,
            (Collapse::Single, 1) => match items.pop() {
                Some(item) => Hydrated::One(item),
                None => Hydrated::Empty,
            },
            _ => Hydrated::Many(items),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;
    use mapping::registry::EntityRegistry;
    use tracing_test::traced_test;

    crate::entity! {
        pub struct User in "user" {
            user_id: Option<i64> = "userId",
            first_name: Option<String> = "firstName",
            mail: Option<String> = "mail" => "email_address",
        }
    }

    #[derive(Debug, Default)]
    struct Tagged {
        tag: Option<String>,
    }

    impl Entity for Tagged {
        const NAME: &'static str = "Tagged";
        const TABLE: &'static str = "tagged";
        const FIELDS: &'static [crate::FieldDef] = &[crate::FieldDef::new("tag")];

        fn get_field(&self, name: &str) -> Option<Value> {
            (name == "tag").then(|| self.tag.clone().into())
        }

        fn set_field(&mut self, name: &str, value: Value) -> Result<bool, crate::ValueError> {
            if name != "tag" {
                return Ok(false);
            }
            self.tag = value.as_string();
            Ok(true)
        }

        fn bootstrap(&mut self) {
            self.tag = Some("new".into());
        }
    }

    fn context() -> MappingContext {
        let mut registry = EntityRegistry::new("models");
        registry.register(User::NAME, User::FIELDS).unwrap();
        registry.register(Tagged::NAME, Tagged::FIELDS).unwrap();
        MappingContext::new(registry)
    }

    fn row(user_id: i64, name: &str) -> Row {
        [
            ("user_id", Value::Int(user_id)),
            ("first_name", Value::from(name)),
            ("email_address", Value::from("a@b.c")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_hydrate_maps_columns_to_fields() {
        let ctx = context();
        let mut user = User::default();
        Mapper::new(&ctx).hydrate(&row(3, "Ann"), &mut user).unwrap();

        assert_eq!(user.user_id, Some(3));
        assert_eq!(user.first_name.as_deref(), Some("Ann"));
        assert_eq!(user.mail.as_deref(), Some("a@b.c"));
    }

    #[test]
    #[traced_test]
    fn test_hydrate_skips_unknown_columns() {
        let ctx = context();
        let mut record = row(3, "Ann");
        record.insert("login_count", 9i64);

        let mut user = User::default();
        Mapper::new(&ctx).hydrate(&record, &mut user).unwrap();
        assert_eq!(user.user_id, Some(3));
        assert!(logs_contain("Skipped column without field"));
    }

    #[test]
    fn test_hydrate_strict_rejects_unknown_columns() {
        let ctx = context();
        let mut record = row(3, "Ann");
        record.insert("login_count", 9i64);

        let mut user = User::default();
        let err = Mapper::new(&ctx).hydrate_strict(&record, &mut user).unwrap_err();
        assert_eq!(
            err,
            OrmError::Internal("User has no field `loginCount` for column `login_count`".into())
        );
    }

    #[test]
    fn test_hydrate_reports_bad_values() {
        let ctx = context();
        let record: Row = [("user_id", Value::from("abc"))].into_iter().collect();
        let mut user = User::default();
        assert!(matches!(
            Mapper::new(&ctx).hydrate(&record, &mut user),
            Err(OrmError::Value(_))
        ));
    }

    #[test]
    fn test_hydrate_set_collapsing() {
        let ctx = context();
        let mapper = Mapper::new(&ctx);

        let none: Hydrated<User> = mapper.hydrate_set::<User, _>(vec![], Collapse::Single).unwrap();
        assert_eq!(none, Hydrated::Empty);
        assert!(none.is_empty());

        let one: Hydrated<User> = mapper.hydrate_set::<User, _>(vec![row(1, "a")], Collapse::Single).unwrap();
        assert!(matches!(one, Hydrated::One(ref u) if u.user_id == Some(1)));

        let two: Hydrated<User> = mapper
            .hydrate_set::<User, _>(vec![row(1, "a"), row(2, "b")], Collapse::Single)
            .unwrap();
        let ids: Vec<_> = two.into_vec().into_iter().map(|u| u.user_id).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_hydrate_set_list_never_collapses() {
        let ctx = context();
        let mapper = Mapper::new(&ctx);

        let none: Hydrated<User> = mapper.hydrate_set::<User, _>(vec![], Collapse::List).unwrap();
        assert_eq!(none, Hydrated::Many(vec![]));

        let one: Hydrated<User> = mapper.hydrate_set::<User, _>(vec![row(1, "a")], Collapse::List).unwrap();
        assert_eq!(one.len(), 1);
        assert!(matches!(one, Hydrated::Many(_)));
    }

    #[test]
    fn test_raw_rows_pass_through() {
        let ctx = context();
        let rows: Hydrated<Row> = Mapper::new(&ctx)
            .hydrate_set::<User, Row>(vec![row(1, "a")], Collapse::Single)
            .unwrap();
        assert_eq!(rows.into_first().unwrap().get("first_name"), Some(&Value::from("a")));
    }

    #[test]
    fn test_new_entities_are_bootstrapped() {
        let ctx = context();
        let empty: Row = Row::default();
        let tagged: Hydrated<Tagged> = Mapper::new(&ctx)
            .hydrate_set::<Tagged, _>(vec![empty], Collapse::Single)
            .unwrap();
        assert_eq!(tagged.into_first().unwrap().tag.as_deref(), Some("new"));
    }
}
