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

//! Connection options
//! Database configurations, pool tuning and ORM settings collected before connecting

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use sea_orm::ConnectOptions;
use crate::config::DbConfig;
use crate::connector::{Connector, SeaOrmConnector};
use crate::logger::SqlLogger;
use crate::DbError;

/// Default maximum number of connections kept idle in the pool
pub const DEFAULT_MAX_IDLE_CONN: u32 = 10;
/// Default maximum number of open connections to the database
pub const DEFAULT_MAX_OPEN_CONN: u32 = 50;
/// Default maximum amount of time a connection may be reused
pub const DEFAULT_CONN_MAX_LIFETIME: Duration = Duration::from_secs(3 * 60 * 60);

/// Pool tuning knobs, applied to every connection opened from the same [`Options`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    /// Idle connections the pool keeps open, only applied when `keep_idle_warm` is set
    pub max_idle_conn: u32,
    pub max_open_conn: u32,
    /// Zero does not mean unlimited: the limit is left unset and sqlx applies its
    /// own default lifetime of 30 minutes.
    pub conn_max_lifetime: Duration,
    /// Holds `max_idle_conn` connections open as the pool's minimum. Off by default,
    /// so an idle pool may shrink to zero connections.
    pub keep_idle_warm: bool,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_idle_conn: DEFAULT_MAX_IDLE_CONN,
            max_open_conn: DEFAULT_MAX_OPEN_CONN,
            conn_max_lifetime: DEFAULT_CONN_MAX_LIFETIME,
            keep_idle_warm: false,
        }
    }
}

/// ORM-level settings: statement logger and driver timeouts
#[derive(Clone, Default)]
pub struct OrmConfig {
    /// Logger every statement executed through the returned `DbConn` is reported to
    pub logger: Option<Arc<dyn SqlLogger>>,
    pub connect_timeout: Option<Duration>,
    pub acquire_timeout: Option<Duration>,
    /// Enables sqlx's own statement logging in addition to `logger`
    pub sqlx_logging: bool,
}

impl fmt::Debug for OrmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrmConfig")
            .field("logger", &self.logger.is_some())
            .field("connect_timeout", &self.connect_timeout)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("sqlx_logging", &self.sqlx_logging)
            .finish()
    }
}

/// Everything needed by [`crate::connect`] and [`crate::connect_multi`].
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use rdb_mysql::{DbConfig, Options};
///
/// let options = Options::new()
///     .with_configs(vec![DbConfig::new("user", "pass", "127.0.0.1:3306", "db")])
///     .with_max_idle_conn(15)
///     .with_max_open_conn(75)
///     .with_conn_max_lifetime(Duration::from_secs(4 * 60 * 60));
/// ```
#[derive(Clone)]
pub struct Options {
    pub(crate) configs: Vec<DbConfig>,
    pub(crate) pool: PoolOptions,
    pub(crate) orm: OrmConfig,
    pub(crate) connector: Arc<dyn Connector>,
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("configs", &self.configs)
            .field("pool", &self.pool)
            .field("orm", &self.orm)
            .finish()
    }
}

impl Options {
    pub fn new() -> Self {
        Self {
            configs: Vec::new(),
            pool: PoolOptions::default(),
            orm: OrmConfig::default(),
            connector: Arc::new(SeaOrmConnector),
        }
    }

    pub fn with_configs(mut self, configs: impl IntoIterator<Item = DbConfig>) -> Self {
        self.configs = configs.into_iter().collect();
        self
    }

    pub fn with_orm_config(mut self, orm: OrmConfig) -> Self {
        self.orm = orm;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn SqlLogger>) -> Self {
        self.orm.logger = Some(logger);
        self
    }

    pub fn with_pool_options(mut self, pool: PoolOptions) -> Self {
        self.pool = pool;
        self
    }

    /// Sets the idle limit and keeps that many connections open.
    pub fn with_max_idle_conn(mut self, max_idle_conn: u32) -> Self {
        self.pool.max_idle_conn = max_idle_conn;
        self.pool.keep_idle_warm = true;
        self
    }

    pub fn with_max_open_conn(mut self, max_open_conn: u32) -> Self {
        self.pool.max_open_conn = max_open_conn;
        self
    }

    pub fn with_conn_max_lifetime(mut self, conn_max_lifetime: Duration) -> Self {
        self.pool.conn_max_lifetime = conn_max_lifetime;
        self
    }

    /// Replaces the component that opens connections, e.g. with a mock in tests.
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn configs(&self) -> &[DbConfig] {
        &self.configs
    }

    pub fn pool(&self) -> &PoolOptions {
        &self.pool
    }

    pub fn orm(&self) -> &OrmConfig {
        &self.orm
    }

    /// Builds the sea-orm options for `config` with the pool knobs applied.
    ///
    /// sqlx has no idle cap, so an explicitly requested idle limit maps to the pool's
    /// minimum connection count, capped at the open limit. Otherwise no minimum is set.
    ///
    /// # Errors
    ///
    /// * `DbError::PoolError` - If `max_open_conn` is zero.
    pub fn connect_options(&self, config: &DbConfig) -> Result<ConnectOptions, DbError> {
        if self.pool.max_open_conn == 0 {
            return Err(DbError::PoolError("max open connections must be greater than 0".to_string()));
        }
        let mut opt = ConnectOptions::new(config.url());
        opt.max_connections(self.pool.max_open_conn)
            .sqlx_logging(self.orm.sqlx_logging);
        if self.pool.keep_idle_warm {
            opt.min_connections(self.pool.max_idle_conn.min(self.pool.max_open_conn));
        }
        if !self.pool.conn_max_lifetime.is_zero() {
            opt.max_lifetime(self.pool.conn_max_lifetime);
        }
        if let Some(timeout) = self.orm.connect_timeout {
            opt.connect_timeout(timeout);
        }
        if let Some(timeout) = self.orm.acquire_timeout {
            opt.acquire_timeout(timeout);
        }
        Ok(opt)
    }
}
