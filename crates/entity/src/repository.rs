//! Read and write access to the rows of one entity type.

use crate::{
    core::entity::Entity,
    error::OrmError,
    hydrate::{Collapse, Hydrated, Mapper, Materialize},
};
use chrono::Local;
use connectors::database::Database;
use mapping::{cache::EntityInfo, context::MappingContext};
use model::{
    core::{
        identifiers::ClassId,
        naming::to_snake_case,
        value::{TIMESTAMP_FORMAT, Value},
    },
    records::{params::Params, row::Row},
};
use query_builder::{InsertBuilder, QueryBuilder, UpdateBuilder};
use std::{marker::PhantomData, sync::Arc};
use tracing::{debug, warn};

/// Alias of the entity table in every query built here.
pub const ALIAS: &str = "t";

pub struct Repository<E: Entity> {
    ctx: Arc<MappingContext>,
    db: Database,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Repository {
            ctx: Arc::clone(&self.ctx),
            db: self.db.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> std::fmt::Debug for Repository<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &E::NAME)
            .field("db", &self.db)
            .finish()
    }
}

fn now() -> Value {
    Value::String(Local::now().naive_local().format(TIMESTAMP_FORMAT).to_string())
}

/// Field name of an update key, which may carry the table alias.
fn field_key(key: &str) -> &str {
    key.strip_prefix("t.").unwrap_or(key)
}

impl<E: Entity> Repository<E> {
    pub fn new(ctx: Arc<MappingContext>, db: Database) -> Self {
        Repository {
            ctx,
            db,
            _entity: PhantomData,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn context(&self) -> &MappingContext {
        &self.ctx
    }

    pub fn mapper(&self) -> Mapper<'_> {
        Mapper::new(&self.ctx)
    }

    pub fn class(&self) -> ClassId {
        self.ctx.class_for_name(E::NAME)
    }

    pub fn info(&self) -> Arc<EntityInfo> {
        self.ctx.info(&self.class())
    }

    pub fn table(&self) -> String {
        to_snake_case(E::TABLE)
    }

    /// A fresh, bootstrapped entity.
    pub fn new_entity(&self) -> E {
        Mapper::new_entity::<E>()
    }

    /// `SELECT * FROM <table> AS t`, ready for more clauses.
    pub fn query(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(&self.ctx).select("*").from(E::TABLE, ALIAS)
    }

    /// Builds and runs `query`, materializing rows as `T`: the entity itself
    /// or raw [`Row`]s.
    pub fn select<T: Materialize<E>>(
        &self,
        mut query: QueryBuilder<'_>,
        params: &Params,
        collapse: Collapse,
    ) -> Result<Hydrated<T>, OrmError> {
        let sql = query.build()?;
        let rows = self.db.query(&sql, params)?;
        self.mapper().hydrate_set::<E, T>(rows, collapse)
    }

    /// Runs caller SQL and collapses the result.
    pub fn query_raw<T: Materialize<E>>(
        &self,
        sql: &str,
        params: &Params,
    ) -> Result<Hydrated<T>, OrmError> {
        let rows = self.db.query(sql, params)?;
        self.mapper().hydrate_set::<E, T>(rows, Collapse::Single)
    }

    pub fn get_by_id(&self, id: impl Into<Value>) -> Result<Hydrated<E>, OrmError> {
        let mut params = Params::new();
        let placeholder = params.push(id);
        let query = self
            .query()
            .where_clause(&format!("{ALIAS}.{} = {placeholder}", E::primary_column()));
        self.select(query, &params, Collapse::Single)
    }

    /// Fetches one entity by id, or fails with the error from `on_missing`.
    pub fn require_by_id(
        &self,
        id: impl Into<Value>,
        on_missing: impl FnOnce() -> OrmError,
    ) -> Result<E, OrmError> {
        self.get_by_id(id)?.into_first().ok_or_else(on_missing)
    }

    /// Rows whose `field` equals `value`, collapsed.
    pub fn get_by_field(
        &self,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<Hydrated<E>, OrmError> {
        let mut params = Params::new();
        let placeholder = params.push(value);
        let query = self
            .query()
            .where_clause(&format!("{ALIAS}.{field} = {placeholder}"));
        self.select(query, &params, Collapse::Single)
    }

    pub fn get_all(&self) -> Result<Vec<E>, OrmError> {
        Ok(self
            .select(self.query(), &Params::new(), Collapse::List)?
            .into_vec())
    }

    /// Entities whose primary key is one of `ids`. No ids, no query.
    pub fn get_in_array<I, V>(&self, ids: I) -> Result<Vec<E>, OrmError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut params = Params::new();
        let placeholders: Vec<String> = ids.into_iter().map(|id| params.push(id)).collect();
        if placeholders.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.query().where_clause(&format!(
            "{ALIAS}.{} IN ({})",
            E::primary_column(),
            placeholders.join(", ")
        ));
        Ok(self.select(query, &params, Collapse::List)?.into_vec())
    }

    /// Entities matching every condition. Conditions may use `t.field` and
    /// named placeholders bound from `params`.
    pub fn get_where(&self, conditions: &[&str], params: &Params) -> Result<Vec<E>, OrmError> {
        let query = conditions
            .iter()
            .fold(self.query(), |query, condition| query.where_clause(condition));
        Ok(self.select(query, params, Collapse::List)?.into_vec())
    }

    /// Builds an entity from a record of column values; every column must
    /// belong to a field.
    pub fn create_entity(&self, record: &Row) -> Result<E, OrmError> {
        let mut entity = self.new_entity();
        self.mapper().hydrate_strict(record, &mut entity)?;
        Ok(entity)
    }

    /// Inserts `entity` as a new row and stores the generated key on it.
    ///
    /// Fails when the primary key is already set. With `stamp_created`, a
    /// blank created-at field is written as the current time. The entity is
    /// left untouched when the insert fails.
    pub fn create(&self, entity: &mut E, stamp_created: bool) -> Result<Value, OrmError> {
        let key = E::primary_key();
        if !entity.id().is_blank() {
            return Err(OrmError::internal(format!(
                "cannot create {}: `{key}` is already set",
                E::NAME
            )));
        }

        let stamp = (stamp_created
            && E::has_field(E::CREATED_FIELD)
            && entity
                .get_field(E::CREATED_FIELD)
                .is_none_or(|value| value.is_blank()))
        .then(now);

        let info = self.info();
        let insert = E::FIELDS
            .iter()
            .filter(|field| field.name != key)
            .fold(InsertBuilder::new(&self.table()), |insert, field| {
                let value = match &stamp {
                    Some(stamp) if field.name == E::CREATED_FIELD => stamp.clone(),
                    _ => entity.get_field(field.name).unwrap_or(Value::Null),
                };
                insert.value(&info.column_of(field.name), value)
            });
        let (sql, params) = insert.to_sql();

        // Insert and key lookup must run on the same connection, back to back.
        let id = self.db.with_executor(|executor| {
            executor.prepare_and_execute(&sql, &params)?;
            executor.last_insert_id()
        })?;
        debug!(entity = E::NAME, id = %id, "Created row");

        if let Some(stamp) = stamp {
            entity.set_field(E::CREATED_FIELD, stamp)?;
        }
        entity.set_id(Value::String(id))?;
        Ok(entity.id())
    }

    /// Writes `values` (field name to value) to the rows matching
    /// `conditions` (field name to value), or to this entity's row when no
    /// conditions are given, then copies `values` onto `entity`.
    ///
    /// With `stamp_updated`, the updated-at field is set to the current time
    /// unless `values` already carries it.
    pub fn update(
        &self,
        entity: &mut E,
        values: &Row,
        conditions: &Row,
        stamp_updated: bool,
    ) -> Result<(), OrmError> {
        let mut values = values.clone();
        if stamp_updated
            && E::has_field(E::UPDATED_FIELD)
            && !values.names().any(|key| field_key(key) == E::UPDATED_FIELD)
        {
            values.insert(E::UPDATED_FIELD, now());
        }
        if values.is_empty() {
            return Err(OrmError::internal(format!("nothing to update on {}", E::NAME)));
        }

        let conditions: Row = if conditions.is_empty() {
            let id = entity.id();
            if id.is_blank() {
                return Err(OrmError::internal(format!(
                    "cannot update {} without conditions or `{}`",
                    E::NAME,
                    E::primary_key()
                )));
            }
            [(E::primary_key(), id)].into_iter().collect()
        } else {
            conditions.clone()
        };

        let info = self.info();
        let mut update = UpdateBuilder::new(&self.table());
        for (key, value) in values.iter() {
            let field = field_key(key);
            if !info.is_declared(field) {
                warn!(entity = E::NAME, key, "Updating a key that is not a declared field");
            }
            update = update.set(&info.column_of(field), value.clone());
        }
        for (key, value) in conditions.iter() {
            update = update.condition(&info.column_of(field_key(key)), value.clone());
        }

        let (sql, params) = update.to_sql();
        self.db.execute(&sql, &params)?;

        for (key, value) in values.iter() {
            entity.set_field(field_key(key), value.clone())?;
        }
        Ok(())
    }

    /// Updates a single field of this entity's row.
    pub fn update_field(
        &self,
        entity: &mut E,
        field: &str,
        value: impl Into<Value>,
        stamp_updated: bool,
    ) -> Result<(), OrmError> {
        let id = entity.id();
        if id.is_blank() {
            return Err(OrmError::internal(format!(
                "cannot update `{field}` on {}: `{}` is not set",
                E::NAME,
                E::primary_key()
            )));
        }

        let value: Value = value.into();
        let values: Row = [(field, value)].into_iter().collect();
        let conditions: Row = [(E::primary_key(), id)].into_iter().collect();
        self.update(entity, &values, &conditions, stamp_updated)
    }

    /// Whether the status field holds the active marker.
    pub fn is_active(&self, entity: &E) -> bool {
        entity
            .get_field(E::STATUS_FIELD)
            .and_then(|value| value.as_string())
            .is_some_and(|status| status == E::STATUS_ACTIVE)
    }

    /// Writes `status` to the status field of this entity's row.
    pub fn change_status(&self, entity: &mut E, status: &str) -> Result<(), OrmError> {
        if !E::has_field(E::STATUS_FIELD) {
            return Err(OrmError::internal(format!(
                "{} has no `{}` field",
                E::NAME,
                E::STATUS_FIELD
            )));
        }
        self.update_field(entity, E::STATUS_FIELD, status, true)
    }

    /// Re-reads this entity's row and copies every declared field. Returns
    /// `false` when the row no longer exists.
    pub fn reload(&self, entity: &mut E) -> Result<bool, OrmError> {
        let id = entity.id();
        if id.is_blank() {
            return Err(OrmError::internal(format!(
                "cannot reload {}: `{}` is not set",
                E::NAME,
                E::primary_key()
            )));
        }

        let Some(fresh) = self.get_by_id(id)?.into_first() else {
            return Ok(false);
        };
        for field in E::FIELDS {
            let value = fresh.get_field(field.name).unwrap_or(Value::Null);
            entity.set_field(field.name, value)?;
        }
        Ok(true)
    }
}
