/*
 * Copyright (c) Huawei Technologies Co., Ltd. 2025. All rights reserved.
 * Global Trust Authority is licensed under the Mulan PSL v2.
 * You can use this software according to the terms and conditions of the Mulan PSL v2.
 * You may obtain a copy of Mulan PSL v2 at:
 *     http://license.coscl.org.cn/MulanPSL2
 * THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY KIND, EITHER EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR
 * PURPOSE.
 * See the Mulan PSL v2 for more details.
 */

//! Database Connection Management Module
//! Opens MySQL connection pools from [`Options`] and reports every statement to the configured logger

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use async_trait::async_trait;
use common_log::LogContext;
use log::{error, info, warn};
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction, DbErr,
    ExecResult, IsolationLevel, QueryResult, Statement, TransactionError, TransactionTrait,
};
use crate::config::DbConfig;
use crate::connector::Connector;
use crate::logger::SqlLogger;
use crate::options::Options;
use crate::DbError;

/// Initializes a single database connection.
///
/// # Errors
///
/// * `DbError::InvalidConfigCount` - Unless exactly one configuration is set.
/// * `DbError::PoolError` / `DbError::ConnectionError` - If the pool cannot be created.
///
/// # Example
/// ```no_run
/// use rdb_mysql::{connect, DbConfig, Options};
///
/// async fn example() {
///     let options = Options::new()
///         .with_configs(vec![DbConfig::new("user", "pass", "127.0.0.1:3306", "db")])
///         .with_max_idle_conn(15);
///     let db = connect(options).await.unwrap();
/// }
/// ```
pub async fn connect(options: Options) -> Result<DbConn, DbError> {
    if options.configs.len() != 1 {
        error!("single connection requested with {} configurations", options.configs.len());
        return Err(DbError::InvalidConfigCount(options.configs.len()));
    }
    new_connect(&options.configs[0], &options).await
}

/// Initializes one connection per configuration, keyed by database name.
///
/// Configurations are opened in order and the first failure aborts; connections
/// opened before it are closed before the error is returned.
///
/// # Errors
///
/// * `DbError::EmptyConfigs` - If no configuration is set.
/// * `DbError::PoolError` / `DbError::ConnectionError` - From the first configuration that fails.
pub async fn connect_multi(options: Options) -> Result<HashMap<String, DbConn>, DbError> {
    if options.configs.is_empty() {
        error!("multiple connections requested without configurations");
        return Err(DbError::EmptyConfigs);
    }

    let connector = options.connector.as_ref();
    let mut dbs = HashMap::with_capacity(options.configs.len());
    for config in &options.configs {
        match new_connect(config, &options).await {
            Ok(conn) => {
                if let Some(replaced) = dbs.insert(config.db_name.clone(), conn) {
                    warn!("duplicate database name {}, closing the earlier connection", config.db_name);
                    close_quietly(connector, &config.db_name, replaced).await;
                }
            }
            Err(e) => {
                error!("Failed to connect database {}: {}", config.db_name, e);
                for (name, conn) in dbs {
                    close_quietly(connector, &name, conn).await;
                }
                return Err(e);
            }
        }
    }
    info!("{} MySQL connection pools created", dbs.len());
    Ok(dbs)
}

async fn new_connect(config: &DbConfig, options: &Options) -> Result<DbConn, DbError> {
    info!(
        "Configuring MySQL connection: url={}, max_idle_conn={}, max_open_conn={}, conn_max_lifetime={:?}",
        config.redacted_url(),
        options.pool.max_idle_conn,
        options.pool.max_open_conn,
        options.pool.conn_max_lifetime
    );
    let connect_options = options.connect_options(config)?;
    let conn = options.connector.connect(connect_options).await?;
    info!("MySQL connection pool for {} created successfully", config.db_name);
    Ok(DbConn::new(conn, options.orm.logger.clone()))
}

async fn close_quietly(connector: &dyn Connector, name: &str, conn: DbConn) {
    match conn.into_inner() {
        Some(inner) => {
            if let Err(e) = connector.disconnect(inner).await {
                warn!("Failed to close connection to {}: {}", name, e);
            }
        }
        None => warn!("connection to {} is still shared, leaving it open", name),
    }
}

/// Logger and context a statement is reported with
#[derive(Clone)]
struct Tracer {
    logger: Option<Arc<dyn SqlLogger>>,
    ctx: LogContext,
}

impl Tracer {
    fn trace(&self, begin: Instant, sql: &dyn Fn() -> String, rows: i64, err: Option<&DbErr>) {
        if let Some(logger) = &self.logger {
            logger.trace(&self.ctx, begin, &|| (sql(), rows), err);
        }
    }

    async fn execute<C: ConnectionTrait>(&self, conn: &C, stmt: Statement) -> Result<ExecResult, DbErr> {
        let logged = self.logger.as_ref().map(|_| stmt.clone());
        let begin = Instant::now();
        let result = conn.execute(stmt).await;
        if let Some(stmt) = logged {
            let rows = result.as_ref().map_or(-1, |r| r.rows_affected() as i64);
            self.trace(begin, &|| stmt.to_string(), rows, result.as_ref().err());
        }
        result
    }

    async fn execute_unprepared<C: ConnectionTrait>(&self, conn: &C, sql: &str) -> Result<ExecResult, DbErr> {
        let begin = Instant::now();
        let result = conn.execute_unprepared(sql).await;
        let rows = result.as_ref().map_or(-1, |r| r.rows_affected() as i64);
        self.trace(begin, &|| sql.to_string(), rows, result.as_ref().err());
        result
    }

    async fn query_one<C: ConnectionTrait>(&self, conn: &C, stmt: Statement) -> Result<Option<QueryResult>, DbErr> {
        let logged = self.logger.as_ref().map(|_| stmt.clone());
        let begin = Instant::now();
        let result = conn.query_one(stmt).await;
        if let Some(stmt) = logged {
            let rows = result.as_ref().map_or(-1, |r| r.is_some() as i64);
            self.trace(begin, &|| stmt.to_string(), rows, result.as_ref().err());
        }
        result
    }

    async fn query_all<C: ConnectionTrait>(&self, conn: &C, stmt: Statement) -> Result<Vec<QueryResult>, DbErr> {
        let logged = self.logger.as_ref().map(|_| stmt.clone());
        let begin = Instant::now();
        let result = conn.query_all(stmt).await;
        if let Some(stmt) = logged {
            let rows = result.as_ref().map_or(-1, |r| r.len() as i64);
            self.trace(begin, &|| stmt.to_string(), rows, result.as_ref().err());
        }
        result
    }
}

/// A pooled connection that reports each statement to a [`SqlLogger`].
///
/// Implements [`ConnectionTrait`], so entities, selects and active models run
/// against it directly. Clones share the same pool. Use [`DbConn::begin`] or
/// [`DbConn::transaction`] rather than the native connection so statements
/// inside transactions are reported too.
#[derive(Clone)]
pub struct DbConn {
    conn: Arc<DatabaseConnection>,
    tracer: Tracer,
}

impl DbConn {
    pub fn new(conn: DatabaseConnection, logger: Option<Arc<dyn SqlLogger>>) -> Self {
        Self {
            conn: Arc::new(conn),
            tracer: Tracer { logger, ctx: LogContext::new() },
        }
    }

    /// Returns a handle on the same pool whose records carry `ctx`.
    pub fn with_context(&self, ctx: LogContext) -> Self {
        Self {
            conn: self.conn.clone(),
            tracer: Tracer { logger: self.tracer.logger.clone(), ctx },
        }
    }

    /// Returns a handle on the same pool reporting to `logger`.
    pub fn with_logger(&self, logger: Arc<dyn SqlLogger>) -> Self {
        Self {
            conn: self.conn.clone(),
            tracer: Tracer { logger: Some(logger), ctx: self.tracer.ctx.clone() },
        }
    }

    pub fn context(&self) -> &LogContext {
        &self.tracer.ctx
    }

    pub fn logger(&self) -> Option<&Arc<dyn SqlLogger>> {
        self.tracer.logger.as_ref()
    }

    /// The native sea-orm connection. Statements run on it are not reported.
    pub fn inner(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Unwraps the native connection if this is the last handle on the pool.
    pub fn into_inner(self) -> Option<DatabaseConnection> {
        Arc::try_unwrap(self.conn).ok()
    }

    pub async fn ping(&self) -> Result<(), DbError> {
        self.conn.ping().await.map_err(|e| DbError::ConnectionError(e.to_string()))
    }

    /// Closes the pool once this is the last handle; otherwise only drops this handle.
    pub async fn close(self) -> Result<(), DbError> {
        match self.into_inner() {
            Some(conn) => conn.close().await.map_err(DbError::from),
            None => Ok(()),
        }
    }

    /// Starts a transaction whose statements are reported like the connection's own.
    pub async fn begin(&self) -> Result<DbTxn, DbErr> {
        let txn = self.conn.begin().await?;
        Ok(DbTxn { txn, tracer: self.tracer.clone() })
    }

    pub async fn begin_with_config(
        &self,
        isolation_level: Option<IsolationLevel>,
        access_mode: Option<AccessMode>,
    ) -> Result<DbTxn, DbErr> {
        let txn = self.conn.begin_with_config(isolation_level, access_mode).await?;
        Ok(DbTxn { txn, tracer: self.tracer.clone() })
    }

    /// Runs `callback` in a transaction, committing on `Ok` and rolling back on `Err`.
    ///
    /// # Example
    /// ```no_run
    /// use sea_orm::{ConnectionTrait, DbErr};
    /// use rdb_mysql::DbConn;
    ///
    /// async fn example(db: &DbConn) {
    ///     let rows = db
    ///         .transaction::<_, u64, DbErr>(|txn| {
    ///             Box::pin(async move {
    ///                 let res = txn.execute_unprepared("UPDATE `products` SET `price` = 200").await?;
    ///                 Ok(res.rows_affected())
    ///             })
    ///         })
    ///         .await;
    /// }
    /// ```
    pub async fn transaction<F, T, E>(&self, callback: F) -> Result<T, TransactionError<E>>
    where
        F: for<'c> FnOnce(&'c DbTxn) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>> + Send,
        T: Send,
        E: std::fmt::Display + std::fmt::Debug + Send,
    {
        let txn = self.begin().await.map_err(TransactionError::Connection)?;
        let result = callback(&txn).await;
        match result {
            Ok(value) => {
                txn.commit().await.map_err(TransactionError::Connection)?;
                Ok(value)
            }
            Err(e) => {
                txn.rollback().await.map_err(TransactionError::Connection)?;
                Err(TransactionError::Transaction(e))
            }
        }
    }
}

#[async_trait]
impl ConnectionTrait for DbConn {
    fn get_database_backend(&self) -> DatabaseBackend {
        self.conn.get_database_backend()
    }

    async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbErr> {
        self.tracer.execute(self.conn.as_ref(), stmt).await
    }

    async fn execute_unprepared(&self, sql: &str) -> Result<ExecResult, DbErr> {
        self.tracer.execute_unprepared(self.conn.as_ref(), sql).await
    }

    async fn query_one(&self, stmt: Statement) -> Result<Option<QueryResult>, DbErr> {
        self.tracer.query_one(self.conn.as_ref(), stmt).await
    }

    async fn query_all(&self, stmt: Statement) -> Result<Vec<QueryResult>, DbErr> {
        self.tracer.query_all(self.conn.as_ref(), stmt).await
    }

    fn support_returning(&self) -> bool {
        self.conn.support_returning()
    }

    fn is_mock_connection(&self) -> bool {
        self.conn.is_mock_connection()
    }
}

/// A transaction opened from a [`DbConn`], reporting to the same logger and context.
///
/// Dropping it without [`DbTxn::commit`] rolls back.
pub struct DbTxn {
    txn: DatabaseTransaction,
    tracer: Tracer,
}

impl DbTxn {
    pub fn inner(&self) -> &DatabaseTransaction {
        &self.txn
    }

    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

#[async_trait]
impl ConnectionTrait for DbTxn {
    fn get_database_backend(&self) -> DatabaseBackend {
        self.txn.get_database_backend()
    }

    async fn execute(&self, stmt: Statement) -> Result<ExecResult, DbErr> {
        self.tracer.execute(&self.txn, stmt).await
    }

    async fn execute_unprepared(&self, sql: &str) -> Result<ExecResult, DbErr> {
        self.tracer.execute_unprepared(&self.txn, sql).await
    }

    async fn query_one(&self, stmt: Statement) -> Result<Option<QueryResult>, DbErr> {
        self.tracer.query_one(&self.txn, stmt).await
    }

    async fn query_all(&self, stmt: Statement) -> Result<Vec<QueryResult>, DbErr> {
        self.tracer.query_all(&self.txn, stmt).await
    }

    fn support_returning(&self) -> bool {
        self.txn.support_returning()
    }

    fn is_mock_connection(&self) -> bool {
        self.txn.is_mock_connection()
    }
}
