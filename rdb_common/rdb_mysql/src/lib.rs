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

//! MySQL connection management
//! Builds sea-orm connection pools from plain connection parameters and reports
//! every executed statement to a structured logger

pub mod config;
pub mod connection;
pub mod connector;
pub mod error;
pub mod logger;
pub mod options;
pub mod settings;

pub use config::DbConfig;
pub use connection::{connect, connect_multi, DbConn, DbTxn};
pub use connector::{Connector, SeaOrmConnector};
pub use error::DbError;
pub use logger::{DbLogger, LogLevel, SqlLogger, TraceKind};
pub use options::{Options, OrmConfig, PoolOptions};
pub use settings::MysqlSettings;
