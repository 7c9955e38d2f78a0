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

//! MySQL connection opening
//! The seam between pool configuration and the ORM that actually dials the database

use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use log::info;
use crate::DbError;

/// Opens a database connection pool from prepared options.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, options: ConnectOptions) -> Result<DatabaseConnection, DbError>;

    /// Closes a pool this connector opened.
    async fn disconnect(&self, conn: DatabaseConnection) -> Result<(), DbError> {
        conn.close().await.map_err(DbError::from)
    }
}

/// Connector backed by `sea_orm::Database::connect`
#[derive(Debug, Clone, Copy, Default)]
pub struct SeaOrmConnector;

#[async_trait]
impl Connector for SeaOrmConnector {
    async fn connect(&self, options: ConnectOptions) -> Result<DatabaseConnection, DbError> {
        info!(
            "MySQL connection parameters configured: max_connections={:?}, min_connections={:?}, establishing connection...",
            options.get_max_connections(),
            options.get_min_connections()
        );
        Database::connect(options)
            .await
            .map_err(|e| DbError::ConnectionError(e.to_string()))
    }
}
