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

//! SQL statement logging
//! The logging contract a connection reports statements to, and its adapter onto a structured logger

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use common_log::{Field, LogContext, StructuredLogger};
use log::warn;
use sea_orm::DbErr;
use crate::DbError;

/// Default log level for the logger
pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Warn;
/// Whether "record not found" errors are ignored by default
pub const DEFAULT_IGNORE_RECORD_NOT_FOUND_ERROR: bool = true;
/// Default duration threshold for slow query logging
pub const DEFAULT_SLOW_THRESHOLD: Duration = Duration::from_millis(200);

/// Verbosity of SQL logging, ordered from quietest to noisiest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Silent = 1,
    Error,
    Warn,
    Info,
}

impl Default for LogLevel {
    fn default() -> Self {
        DEFAULT_LOG_LEVEL
    }
}

impl FromStr for LogLevel {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            _ => Err(DbError::ConfigError(format!("unknown log level: {}", s))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Silent => "silent",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
        };
        f.write_str(name)
    }
}

/// Logger a connection reports to.
///
/// `trace` is called once per executed statement; `fc` lazily yields the
/// rendered SQL and the number of rows it touched (`-1` when unknown).
pub trait SqlLogger: Send + Sync {
    /// Returns an independent copy logging at `level`.
    fn log_mode(&self, level: LogLevel) -> Box<dyn SqlLogger>;
    fn info(&self, ctx: &LogContext, args: fmt::Arguments<'_>);
    fn warn(&self, ctx: &LogContext, args: fmt::Arguments<'_>);
    fn error(&self, ctx: &LogContext, args: fmt::Arguments<'_>);
    fn trace(
        &self,
        ctx: &LogContext,
        begin: Instant,
        fc: &dyn Fn() -> (String, i64),
        err: Option<&DbErr>,
    );
}

/// Record a traced statement is emitted as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceKind {
    /// `db error trace` at error level
    Error,
    /// `db slow query` at warn level
    SlowQuery,
    /// `db trace` at info level
    Statement,
}

/// [`SqlLogger`] writing through a [`StructuredLogger`].
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use common_log::LogManager;
/// use rdb_mysql::{DbLogger, LogLevel};
///
/// let logger = DbLogger::new(Arc::new(LogManager::new()))
///     .with_level(LogLevel::Info)
///     .with_slow_threshold(Duration::from_millis(300));
/// assert_eq!(logger.level(), LogLevel::Info);
/// ```
#[derive(Clone)]
pub struct DbLogger {
    manager: Arc<dyn StructuredLogger>,
    level: LogLevel,
    slow_threshold: Duration,
    ignore_record_not_found_error: bool,
}

impl fmt::Debug for DbLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbLogger")
            .field("level", &self.level)
            .field("slow_threshold", &self.slow_threshold)
            .field("ignore_record_not_found_error", &self.ignore_record_not_found_error)
            .finish()
    }
}

impl DbLogger {
    pub fn new(manager: Arc<dyn StructuredLogger>) -> Self {
        Self {
            manager,
            level: DEFAULT_LOG_LEVEL,
            slow_threshold: DEFAULT_SLOW_THRESHOLD,
            ignore_record_not_found_error: DEFAULT_IGNORE_RECORD_NOT_FOUND_ERROR,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the level by name ("silent", "error", "warn", "info"); unknown names fall back to the default level.
    pub fn with_level_str(self, level: &str) -> Self {
        let level = level.parse().unwrap_or_else(|_| {
            warn!("unknown sql log level {:?}, using {}", level, DEFAULT_LOG_LEVEL);
            DEFAULT_LOG_LEVEL
        });
        self.with_level(level)
    }

    /// Zero disables slow query reporting.
    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = threshold;
        self
    }

    pub fn with_ignore_record_not_found_error(mut self, ignore: bool) -> Self {
        self.ignore_record_not_found_error = ignore;
        self
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn slow_threshold(&self) -> Duration {
        self.slow_threshold
    }

    pub fn ignore_record_not_found_error(&self) -> bool {
        self.ignore_record_not_found_error
    }

    /// Decides which record, if any, a statement that took `elapsed` and ended with `err` produces.
    pub fn classify(&self, elapsed: Duration, err: Option<&DbErr>) -> Option<TraceKind> {
        match err {
            Some(e)
                if self.level >= LogLevel::Error
                    && (!is_record_not_found(e) || !self.ignore_record_not_found_error) =>
            {
                Some(TraceKind::Error)
            }
            _ if elapsed > self.slow_threshold
                && !self.slow_threshold.is_zero()
                && self.level >= LogLevel::Warn =>
            {
                Some(TraceKind::SlowQuery)
            }
            _ if self.level >= LogLevel::Info => Some(TraceKind::Statement),
            _ => None,
        }
    }

    fn log_if_enabled(
        &self,
        level: LogLevel,
        emit: impl FnOnce(&dyn StructuredLogger, &str),
        args: fmt::Arguments<'_>,
    ) {
        if self.level >= level {
            emit(self.manager.as_ref(), &args.to_string());
        }
    }
}

impl SqlLogger for DbLogger {
    fn log_mode(&self, level: LogLevel) -> Box<dyn SqlLogger> {
        Box::new(self.clone().with_level(level))
    }

    fn info(&self, ctx: &LogContext, args: fmt::Arguments<'_>) {
        self.log_if_enabled(LogLevel::Info, |m, msg| m.info(ctx, msg, &[]), args);
    }

    fn warn(&self, ctx: &LogContext, args: fmt::Arguments<'_>) {
        self.log_if_enabled(LogLevel::Warn, |m, msg| m.warn(ctx, msg, &[]), args);
    }

    fn error(&self, ctx: &LogContext, args: fmt::Arguments<'_>) {
        self.log_if_enabled(LogLevel::Error, |m, msg| m.error(ctx, msg, &[]), args);
    }

    fn trace(
        &self,
        ctx: &LogContext,
        begin: Instant,
        fc: &dyn Fn() -> (String, i64),
        err: Option<&DbErr>,
    ) {
        if self.level <= LogLevel::Silent {
            return;
        }

        let elapsed = begin.elapsed();
        let Some(kind) = self.classify(elapsed, err) else {
            return;
        };
        let (sql, rows) = fc();
        let elapsed_ms = format_elapsed(elapsed);

        match kind {
            TraceKind::Error => {
                let mut fields = vec![Field::string("sql", sql)];
                if let Some(e) = err {
                    fields.push(Field::error(e));
                }
                fields.push(Field::string("elapsed", elapsed_ms));
                fields.push(Field::int64("rows", rows));
                self.manager.error(ctx, "db error trace", &fields);
            }
            TraceKind::SlowQuery => {
                let fields = [
                    Field::string("sql", sql),
                    Field::string("elapsed", elapsed_ms),
                    Field::int64("rows", rows),
                ];
                self.manager.warn(ctx, "db slow query", &fields);
            }
            TraceKind::Statement => {
                let fields = [
                    Field::string("sql", sql),
                    Field::string("elapsed", elapsed_ms),
                    Field::int64("rows", rows),
                ];
                self.manager.info(ctx, "db trace", &fields);
            }
        }
    }
}

/// Milliseconds with three decimals, e.g. `12.345 ms`.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.3} ms", elapsed.as_nanos() as f64 / 1e6)
}

fn is_record_not_found(err: &DbErr) -> bool {
    matches!(err, DbErr::RecordNotFound(_))
}
