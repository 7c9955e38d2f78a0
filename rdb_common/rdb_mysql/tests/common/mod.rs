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

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use async_trait::async_trait;
use common_log::{Field, FieldValue, LogContext, StructuredLogger};
use rdb_mysql::{Connector, DbError};
use sea_orm::{ConnectOptions, DatabaseBackend, DatabaseConnection, MockDatabase};

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub level: &'static str,
    pub ctx: LogContext,
    pub msg: String,
    pub fields: Vec<Field>,
}

impl Record {
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.key).collect()
    }
}

/// Structured logger keeping every record in memory
#[derive(Default)]
pub struct CaptureLogger {
    records: Mutex<Vec<Record>>,
}

impl CaptureLogger {
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }

    fn push(&self, level: &'static str, ctx: &LogContext, msg: &str, fields: &[Field]) {
        self.records.lock().unwrap().push(Record {
            level,
            ctx: ctx.clone(),
            msg: msg.to_string(),
            fields: fields.to_vec(),
        });
    }
}

impl StructuredLogger for CaptureLogger {
    fn info(&self, ctx: &LogContext, msg: &str, fields: &[Field]) {
        self.push("info", ctx, msg, fields);
    }

    fn warn(&self, ctx: &LogContext, msg: &str, fields: &[Field]) {
        self.push("warn", ctx, msg, fields);
    }

    fn error(&self, ctx: &LogContext, msg: &str, fields: &[Field]) {
        self.push("error", ctx, msg, fields);
    }
}

/// Connector handing out mock MySQL connections, failing for one database name
#[derive(Default)]
pub struct MockConnector {
    fail_on: Option<String>,
    attempts: Mutex<Vec<ConnectOptions>>,
    disconnects: AtomicUsize,
}

impl MockConnector {
    pub fn failing_on(db_name: &str) -> Self {
        Self {
            fail_on: Some(db_name.to_string()),
            attempts: Mutex::new(Vec::new()),
            disconnects: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> Vec<ConnectOptions> {
        self.attempts.lock().unwrap().clone()
    }

    /// Number of pools handed back through `disconnect`
    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, options: ConnectOptions) -> Result<DatabaseConnection, DbError> {
        let url = options.get_url().to_string();
        self.attempts.lock().unwrap().push(options);
        if let Some(db_name) = &self.fail_on {
            if url.contains(&format!("/{}?", db_name)) {
                return Err(DbError::ConnectionError(format!("unknown database '{}'", db_name)));
            }
        }
        Ok(MockDatabase::new(DatabaseBackend::MySql).into_connection())
    }

    async fn disconnect(&self, conn: DatabaseConnection) -> Result<(), DbError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        conn.close().await.map_err(DbError::from)
    }
}
