use std::sync::Arc;
use std::time::Duration;

use broker_clap_blocks::executor::ExecutorConfig;
use broker_query::{QueryContext, QueryFactory};
use broker_sql::{
    Metadata, MetadataType, Query, Statement, StatementParser, StorageOp, StorageStatement,
};
use broker_state::paths::{DATABASE_CONFIG_PATH, STORAGE_CONFIG_PATH, storage_config_path};
use broker_state::{MasterController, Precondition, Repository, RepositoryFactory, StateManager};
use broker_types::{
    Database, DatabaseSchema, Master, ResultSet, StorageCluster, StorageClusterSummary,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::classify::{Intent, classify};
use crate::error::{ErrorKind, ExecuteError, Result};
use crate::fields::{FieldDescriptor, decode_fields, reassemble_histogram};
use crate::limiter::QueryLimiter;

/// Collaborators of the [`ExecuteApi`]. All of them are shared with the rest of the broker.
#[derive(Debug)]
pub struct ExecutorDeps {
    /// The broker's own metadata store.
    pub repo: Arc<dyn Repository>,
    pub repo_factory: Arc<dyn RepositoryFactory>,
    pub master: Arc<dyn MasterController>,
    pub state_mgr: Arc<dyn StateManager>,
    pub query_factory: Arc<dyn QueryFactory>,
    pub parser: Arc<dyn StatementParser>,
}

/// Per call parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteContext {
    pub database: Option<String>,
}

impl ExecuteContext {
    pub fn new(database: Option<String>) -> Self {
        Self { database }
    }

    /// The target database, if one was given and it is not blank.
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref().filter(|db| !db.trim().is_empty())
    }
}

/// Body of an execute request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub sql: String,
    #[serde(default)]
    pub db: Option<String>,
}

/// Successful outcome of a statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExecuteResponse {
    Master(Master),
    Databases(Vec<Database>),
    Schemas(Vec<DatabaseSchema>),
    ResultSet(ResultSet),
    Metadata(Vec<String>),
    Fields(Vec<FieldDescriptor>),
    Storages(Vec<StorageClusterSummary>),
    Created,
    Deleted,
}

/// Executes parsed statements against broker state, the metadata store and the query engines.
///
/// The executor holds no per call state; concurrent calls share only the collaborators and the
/// query limiter.
#[derive(Debug)]
pub struct ExecuteApi {
    deps: ExecutorDeps,
    query_timeout: Duration,
    limiter: QueryLimiter,
}

impl ExecuteApi {
    pub fn new(deps: ExecutorDeps, config: &ExecutorConfig) -> Self {
        Self {
            deps,
            query_timeout: config.query_timeout,
            limiter: QueryLimiter::new(config.max_concurrent_queries, config.query_queue_timeout),
        }
    }

    /// Execute a JSON request body of the form `{"sql": "...", "db": "..."}`.
    pub async fn execute_request(&self, body: &[u8]) -> Result<ExecuteResponse> {
        let request: ExecuteRequest = serde_json::from_slice(body)
            .map_err(|e| ExecuteError::InvalidRequest(e.to_string()))?;
        if request.sql.trim().is_empty() {
            return Err(ExecuteError::InvalidRequest("sql cannot be empty".to_string()));
        }
        self.execute_sql(&request.sql, request.db).await
    }

    pub async fn execute_sql(
        &self,
        sql: &str,
        database: Option<String>,
    ) -> Result<ExecuteResponse> {
        let statement = self.deps.parser.parse(sql).map_err(|e| {
            warn!(sql, error = %e, "parse statement");
            ExecuteError::from(e)
        })?;
        self.execute(statement, &ExecuteContext::new(database)).await
    }

    pub async fn execute(
        &self,
        statement: Statement,
        ctx: &ExecuteContext,
    ) -> Result<ExecuteResponse> {
        let intent = classify(&statement);
        debug!(intent = intent.name(), database = ?ctx.database(), "execute statement");

        let result = match intent {
            Intent::MasterState => self.show_master(),
            Intent::ListDatabases => self.list_databases().await.map(ExecuteResponse::Databases),
            Intent::ListSchemas => self
                .list_databases()
                .await
                .map(|dbs| ExecuteResponse::Schemas(dbs.iter().map(Database::schema).collect())),
            Intent::MetricQuery(query) => self.metric_query(ctx, query).await,
            Intent::MetadataQuery(metadata) => self.metadata_query(ctx, metadata).await,
            Intent::StorageAdmin(storage) => self.storage(storage).await,
            Intent::Unsupported(name) => Err(ExecuteError::UnsupportedStatement(name)),
        };

        if let Err(e) = &result {
            match e.kind() {
                ErrorKind::NotFound => {
                    debug!(intent = intent.name(), error = %e, "statement not handled")
                }
                ErrorKind::Internal if e.is_invalid_input() => {
                    warn!(intent = intent.name(), error = %e, "reject statement")
                }
                ErrorKind::Internal => {
                    error!(intent = intent.name(), error = %e, "execute statement")
                }
            }
        }
        result
    }

    fn show_master(&self) -> Result<ExecuteResponse> {
        self.deps
            .master
            .get_master()
            .map(ExecuteResponse::Master)
            .ok_or(ExecuteError::MasterNotFound)
    }

    /// Database configs from the metadata store. Entries that do not decode are skipped.
    async fn list_databases(&self) -> Result<Vec<Database>> {
        let entries = self.deps.repo.list(DATABASE_CONFIG_PATH).await?;
        let mut databases = Vec::with_capacity(entries.len());
        for kv in entries {
            match serde_json::from_slice::<Database>(&kv.value) {
                Ok(db) => databases.push(db),
                Err(e) => warn!(key = %kv.key, error = %e, "skip malformed database config"),
            }
        }
        Ok(databases)
    }

    fn query_context(&self, database: &str) -> QueryContext {
        QueryContext {
            database: database.to_string(),
            timeout: self.query_timeout,
        }
    }

    async fn metric_query(
        &self,
        ctx: &ExecuteContext,
        statement: &Query,
    ) -> Result<ExecuteResponse> {
        let database = ctx.database().ok_or(ExecuteError::DatabaseNameRequired)?;

        let _permit = self.limiter.acquire().await?;
        let mut query = self
            .deps
            .query_factory
            .new_metric_query(self.query_context(database), statement);
        let result_set = query.wait_response().await?;
        Ok(ExecuteResponse::ResultSet(result_set))
    }

    async fn metadata_query(
        &self,
        ctx: &ExecuteContext,
        statement: &Metadata,
    ) -> Result<ExecuteResponse> {
        let database = ctx.database().ok_or(ExecuteError::DatabaseNameRequired)?;
        if statement.metadata_type == MetadataType::Unknown {
            return Err(ExecuteError::UnsupportedMetadataType);
        }

        let _permit = self.limiter.acquire().await?;
        let mut query = self
            .deps
            .query_factory
            .new_metadata_query(self.query_context(database), statement);
        let values = query.wait_response().await?;

        match statement.metadata_type {
            MetadataType::Field => {
                let fields = decode_fields(&values).map_err(ExecuteError::DecodeFields)?;
                Ok(ExecuteResponse::Fields(reassemble_histogram(fields)))
            }
            _ => Ok(ExecuteResponse::Metadata(values)),
        }
    }

    async fn storage(&self, statement: &StorageStatement) -> Result<ExecuteResponse> {
        match statement.op {
            StorageOp::List => self.list_storages().await.map(ExecuteResponse::Storages),
            StorageOp::Create => self.create_storage(&statement.value).await,
            StorageOp::Delete => self.delete_storage(&statement.value).await,
            StorageOp::Unknown => Err(ExecuteError::UnsupportedStorageOp),
        }
    }

    async fn list_storages(&self) -> Result<Vec<StorageClusterSummary>> {
        let entries = self.deps.repo.list(STORAGE_CONFIG_PATH).await?;
        let mut storages = Vec::with_capacity(entries.len());
        for kv in entries {
            let cluster: StorageCluster =
                serde_json::from_slice(&kv.value).map_err(|source| {
                    ExecuteError::DecodeStorageEntry {
                        key: kv.key.clone(),
                        source,
                    }
                })?;
            let state = self.deps.state_mgr.get_storage(cluster.name());
            if state.is_none() {
                debug!(storage = cluster.name(), "no live state for storage cluster");
            }
            storages.push(StorageClusterSummary::new(cluster, state));
        }
        Ok(storages)
    }

    /// Register a storage cluster.
    ///
    /// A repository handle for the cluster's own metadata store is opened before anything is
    /// persisted and is closed exactly once afterwards, whatever the outcome of the put. The
    /// registration itself is a put-if-absent on the broker's store.
    async fn create_storage(&self, payload: &str) -> Result<ExecuteResponse> {
        let cluster: StorageCluster =
            serde_json::from_str(payload).map_err(ExecuteError::DecodeStorageConfig)?;
        cluster.config.validate()?;
        let data = serde_json::to_vec(&cluster).map_err(ExecuteError::EncodeStorageConfig)?;

        let storage_repo = self
            .deps
            .repo_factory
            .create_storage_repo(&cluster.config)
            .await?;

        let registered = self.register_storage(cluster.name(), data).await;
        let closed = storage_repo.close().await;

        match (registered, closed) {
            (Ok(()), Ok(())) => {
                info!(storage = cluster.name(), "storage cluster created");
                Ok(ExecuteResponse::Created)
            }
            (Ok(()), Err(e)) => Err(e.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                warn!(storage = cluster.name(), error = %close_err, "close storage repository");
                Err(e)
            }
        }
    }

    async fn register_storage(&self, name: &str, data: Vec<u8>) -> Result<()> {
        let applied = self
            .deps
            .repo
            .put_with_tx(&storage_config_path(name), data, Precondition::KeyAbsent)
            .await?;
        if !applied {
            return Err(ExecuteError::StorageExists {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    async fn delete_storage(&self, name: &str) -> Result<ExecuteResponse> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ExecuteError::StorageNameRequired);
        }
        self.deps.repo.delete(&storage_config_path(name)).await?;
        info!(storage = name, "storage cluster deleted");
        Ok(ExecuteResponse::Deleted)
    }
}
