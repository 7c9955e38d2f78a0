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

//! Structured logger
//! Leveled records carrying a context and key/value fields, forwarded to the `log` facade

use log::Level;
use crate::context::LogContext;
use crate::field::Field;

/// Default `log` target used by [`LogManager`].
pub const DEFAULT_TARGET: &str = "sql";

/// A logging component that accepts a context and typed fields with every record.
pub trait StructuredLogger: Send + Sync {
    fn info(&self, ctx: &LogContext, msg: &str, fields: &[Field]);
    fn warn(&self, ctx: &LogContext, msg: &str, fields: &[Field]);
    fn error(&self, ctx: &LogContext, msg: &str, fields: &[Field]);
}

/// [`StructuredLogger`] backed by the global `log` logger (log4rs, env_logger, ...).
#[derive(Debug, Clone)]
pub struct LogManager {
    target: String,
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LogManager {
    pub fn new() -> Self {
        Self::with_target(DEFAULT_TARGET)
    }

    /// Creates a manager emitting under `target`, which log4rs matches against logger path prefixes.
    pub fn with_target(target: impl Into<String>) -> Self {
        Self { target: target.into() }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    fn emit(&self, level: Level, ctx: &LogContext, msg: &str, fields: &[Field]) {
        if log::log_enabled!(target: self.target.as_str(), level) {
            log::log!(target: self.target.as_str(), level, "{}", render(ctx, msg, fields));
        }
    }
}

impl StructuredLogger for LogManager {
    fn info(&self, ctx: &LogContext, msg: &str, fields: &[Field]) {
        self.emit(Level::Info, ctx, msg, fields);
    }

    fn warn(&self, ctx: &LogContext, msg: &str, fields: &[Field]) {
        self.emit(Level::Warn, ctx, msg, fields);
    }

    fn error(&self, ctx: &LogContext, msg: &str, fields: &[Field]) {
        self.emit(Level::Error, ctx, msg, fields);
    }
}

/// Renders a record as `msg ctx_key="v" field_key=value ...`.
pub fn render(ctx: &LogContext, msg: &str, fields: &[Field]) -> String {
    let mut line = String::from(msg);
    if !ctx.is_empty() {
        line.push(' ');
        line.push_str(&ctx.to_string());
    }
    for field in fields {
        line.push(' ');
        line.push_str(&field.to_string());
    }
    line
}
