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

//! Connects to MySQL with the SQL logger attached and runs a create/read/update/delete
//! cycle on a `products` table.

mod product;

use std::error::Error;
use std::sync::Arc;
use clap::Parser;
use common_log::{LogContext, LogManager};
use log::{error, info};
use rdb_mysql::{connect, DbConfig, DbConn, DbLogger, MysqlSettings, Options};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Schema, Set};

#[derive(Parser, Debug)]
#[command(name = "mysql_demo", about = "MySQL connection and SQL logging demo")]
struct Args {
    /// Settings file with databases, pool and logger sections; MYSQL_* env vars are used otherwise
    #[arg(short, long)]
    settings: Option<String>,

    /// log4rs YAML configuration; logs go to stderr via env_logger otherwise
    #[arg(short, long)]
    log_config: Option<String>,

    /// SQL log level when no settings file is given
    #[arg(long, default_value = "info")]
    level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    match &args.log_config {
        Some(path) => common_log::init_with_yaml(path)?,
        None => env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init(),
    }

    let manager = Arc::new(LogManager::new());
    let options = match &args.settings {
        Some(path) => MysqlSettings::from_yaml(path)?.into_options(manager),
        None => {
            let logger = DbLogger::new(manager).with_level_str(&args.level);
            Options::new()
                .with_configs(vec![DbConfig::from_env()?])
                .with_logger(Arc::new(logger))
        }
    };

    let db = connect(options)
        .await?
        .with_context(LogContext::new().with("trace_id", "123456"));

    create_table(&db).await?;
    create_product(&db).await;
    read_products(&db).await;
    update_product(&db).await;
    delete_product(&db).await;

    db.close().await?;
    Ok(())
}

async fn create_table(db: &DbConn) -> Result<(), Box<dyn Error>> {
    let backend = db.get_database_backend();
    let mut stmt = Schema::new(backend).create_table_from_entity(product::Entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

async fn create_product(db: &DbConn) {
    let product = product::ActiveModel {
        code: Set("D42".to_string()),
        price: Set(100),
        ..Default::default()
    };
    match product.insert(db).await {
        Ok(model) => info!("created product with ID: {}", model.id),
        Err(e) => error!("failed to create product: {}", e),
    }
}

async fn read_products(db: &DbConn) {
    match product::Entity::find_by_id(1).one(db).await {
        Ok(Some(model)) => info!("read product: {:?}", model),
        Ok(None) => info!("product with ID 1 not found"),
        Err(e) => error!("failed to read product with ID 1: {}", e),
    }

    match product::Entity::find()
        .filter(product::Column::Code.eq("D44"))
        .one(db)
        .await
    {
        Ok(Some(model)) => info!("read product: {:?}", model),
        Ok(None) => info!("product with code D44 not found"),
        Err(e) => error!("failed to read product with code D44: {}", e),
    }
}

async fn update_product(db: &DbConn) {
    let model = match product::Entity::find_by_id(1).one(db).await {
        Ok(Some(model)) => model,
        Ok(None) => return,
        Err(e) => {
            error!("failed to load product for update: {}", e);
            return;
        }
    };

    let result = db
        .transaction::<_, (), DbErr>(|txn| {
            Box::pin(async move {
                let mut active: product::ActiveModel = model.into();
                active.price = Set(200);
                active.code = Set("F42".to_string());
                active.update(txn).await?;

                product::Entity::update_many()
                    .col_expr(product::Column::Price, Expr::value(300))
                    .filter(product::Column::Code.eq("F42"))
                    .exec(txn)
                    .await?;
                Ok(())
            })
        })
        .await;
    if let Err(e) = result {
        error!("failed to update product: {}", e);
    }
}

async fn delete_product(db: &DbConn) {
    match product::Entity::delete_by_id(1).exec(db).await {
        Ok(res) => info!("deleted {} product(s) with ID 1", res.rows_affected),
        Err(e) => error!("failed to delete product: {}", e),
    }
}
