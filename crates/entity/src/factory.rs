//! Entry point of the entity layer: validated settings, the registered
//! entities and the databases their repositories run against.

use crate::{core::entity::Entity, error::OrmError, repository::Repository};
use config::{
    mode::{ConnectionPolicy, OperationMode, Scope},
    settings::Settings,
};
use connectors::{
    database::Database, executor::Connector, sql::mysql::connector::MySqlConnector,
};
use mapping::{context::MappingContext, error::MappingError, registry::EntityRegistry};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError, RwLock},
};
use tracing::info;

pub struct RepositoriesBuilder {
    settings: Settings,
    registry: EntityRegistry,
    connector: Option<Arc<dyn Connector>>,
    error: Option<MappingError>,
}

impl RepositoriesBuilder {
    /// Replaces the default MySQL connector.
    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Registers `E`. The first registration error is reported by
    /// [`RepositoriesBuilder::build`].
    pub fn entity<E: Entity>(mut self) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.registry.register(E::NAME, E::FIELDS) {
                self.error = Some(err);
            }
        }
        self
    }

    pub fn build(self) -> Result<Repositories, OrmError> {
        self.settings.validate()?;
        if let Some(err) = self.error {
            return Err(err.into());
        }

        let mode = self.settings.operation_mode()?;
        let policy = self.settings.connection_policy()?;
        info!(
            ?mode,
            ?policy,
            namespace = %self.settings.namespace,
            entities = self.registry.len(),
            "Repositories ready"
        );

        Ok(Repositories {
            mode,
            policy,
            ctx: Arc::new(MappingContext::new(self.registry)),
            connector: self
                .connector
                .unwrap_or_else(|| Arc::new(MySqlConnector)),
            databases: Mutex::new(HashMap::new()),
            current_client: RwLock::new(None),
            settings: self.settings,
        })
    }
}

/// Hands out repositories bound to the right database.
///
/// In single mode every repository uses the configured database. In multi
/// mode repositories use the core database or a client database, the latter
/// named explicitly or taken from the current client.
pub struct Repositories {
    settings: Settings,
    mode: OperationMode,
    policy: ConnectionPolicy,
    ctx: Arc<MappingContext>,
    connector: Arc<dyn Connector>,
    databases: Mutex<HashMap<String, Database>>,
    current_client: RwLock<Option<String>>,
}

impl Repositories {
    pub fn builder(settings: Settings) -> RepositoriesBuilder {
        RepositoriesBuilder {
            registry: EntityRegistry::new(settings.namespace.clone()),
            settings,
            connector: None,
            error: None,
        }
    }

    pub fn mode(&self) -> OperationMode {
        self.mode
    }

    pub fn policy(&self) -> ConnectionPolicy {
        self.policy
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn context(&self) -> &Arc<MappingContext> {
        &self.ctx
    }

    /// Repository on the default database: the configured one in single
    /// mode. In multi mode core entities use the core database and the rest
    /// the current client's.
    pub fn get<E: Entity>(&self) -> Result<Repository<E>, OrmError> {
        match self.mode {
            OperationMode::Single => self.core(),
            OperationMode::Multi if E::CORE => self.core(),
            OperationMode::Multi => self.client(None),
        }
    }

    pub fn core<E: Entity>(&self) -> Result<Repository<E>, OrmError> {
        Ok(self.repository(self.database(&Scope::Core)?))
    }

    /// Repository on the database of `client`, or of the current client.
    pub fn client<E: Entity>(&self, client: Option<&str>) -> Result<Repository<E>, OrmError> {
        let scope = self.client_scope(client)?;
        Ok(self.repository(self.database(&scope)?))
    }

    pub fn set_current_client(&self, client: impl Into<String>) {
        let client = client.into();
        info!(%client, "Switching current client");
        *self
            .current_client
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(client);
    }

    pub fn current_client(&self) -> Option<String> {
        self.current_client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Database for `scope`. With the shared policy every call for the same
    /// database returns a handle on the same connection; with the independent
    /// policy each call gets a connection of its own.
    pub fn database(&self, scope: &Scope) -> Result<Database, OrmError> {
        let name = self.settings.database_for(scope)?;
        let db = self
            .databases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.clone())
            .or_insert_with(|| {
                Database::new(Arc::clone(&self.connector), self.settings.target(&name))
            })
            .clone();

        Ok(match self.policy {
            ConnectionPolicy::Independent => db.independent(),
            ConnectionPolicy::Shared => db,
        })
    }

    fn client_scope(&self, client: Option<&str>) -> Result<Scope, OrmError> {
        client
            .map(str::to_string)
            .or_else(|| self.current_client())
            .filter(|name| !name.trim().is_empty())
            .map(Scope::Client)
            .ok_or_else(|| OrmError::internal("no client given and no current client set"))
    }

    fn repository<E: Entity>(&self, db: Database) -> Repository<E> {
        Repository::new(Arc::clone(&self.ctx), db)
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories")
            .field("mode", &self.mode)
            .field("policy", &self.policy)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
