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

//! YAML settings
//! Databases, pool tuning and SQL logger configuration loaded from a single file

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use common_log::StructuredLogger;
use log::info;
use serde::Deserialize;
use crate::config::DbConfig;
use crate::logger::{DbLogger, DEFAULT_IGNORE_RECORD_NOT_FOUND_ERROR, DEFAULT_LOG_LEVEL, DEFAULT_SLOW_THRESHOLD};
use crate::options::{
    Options, PoolOptions, DEFAULT_CONN_MAX_LIFETIME, DEFAULT_MAX_IDLE_CONN, DEFAULT_MAX_OPEN_CONN,
};
use crate::DbError;

/// Top-level settings file
///
/// ```yaml
/// databases:
///   - user: homestead
///     password: secret
///     host: "127.0.0.1:33060"
///     db_name: mysql_test
/// pool:
///   max_open_conn: 75
/// logger:
///   level: info
///   slow_threshold_ms: 300
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct MysqlSettings {
    pub databases: Vec<DbConfig>,
    #[serde(default)]
    pub pool: PoolSettings,
    #[serde(default)]
    pub logger: LoggerSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Setting this keeps that many connections open
    pub max_idle_conn: Option<u32>,
    pub max_open_conn: u32,
    pub conn_max_lifetime_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_idle_conn: None,
            max_open_conn: DEFAULT_MAX_OPEN_CONN,
            conn_max_lifetime_secs: DEFAULT_CONN_MAX_LIFETIME.as_secs(),
        }
    }
}

impl From<&PoolSettings> for PoolOptions {
    fn from(settings: &PoolSettings) -> Self {
        Self {
            max_idle_conn: settings.max_idle_conn.unwrap_or(DEFAULT_MAX_IDLE_CONN),
            max_open_conn: settings.max_open_conn,
            conn_max_lifetime: Duration::from_secs(settings.conn_max_lifetime_secs),
            keep_idle_warm: settings.max_idle_conn.is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerSettings {
    pub level: String,
    pub slow_threshold_ms: u64,
    pub ignore_record_not_found_error: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            slow_threshold_ms: DEFAULT_SLOW_THRESHOLD.as_millis() as u64,
            ignore_record_not_found_error: DEFAULT_IGNORE_RECORD_NOT_FOUND_ERROR,
        }
    }
}

impl LoggerSettings {
    pub fn build(&self, manager: Arc<dyn StructuredLogger>) -> DbLogger {
        DbLogger::new(manager)
            .with_level_str(&self.level)
            .with_slow_threshold(Duration::from_millis(self.slow_threshold_ms))
            .with_ignore_record_not_found_error(self.ignore_record_not_found_error)
    }
}

impl MysqlSettings {
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        info!("load mysql settings from {}", path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|e| DbError::ConfigError(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, DbError> {
        serde_yaml::from_str(content).map_err(|e| DbError::ConfigError(e.to_string()))
    }

    /// Builds connection options whose SQL logger writes through `manager`.
    pub fn into_options(self, manager: Arc<dyn StructuredLogger>) -> Options {
        let logger = self.logger.build(manager);
        Options::new()
            .with_pool_options(PoolOptions::from(&self.pool))
            .with_logger(Arc::new(logger))
            .with_configs(self.databases)
    }
}
