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

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};
use common::CaptureLogger;
use common_log::{FieldValue, LogContext};
use rdb_mysql::{DbLogger, LogLevel, SqlLogger, TraceKind};
use sea_orm::DbErr;

fn started_ago(elapsed: Duration) -> Instant {
    Instant::now().checked_sub(elapsed).unwrap()
}

fn select() -> (String, i64) {
    ("SELECT * FROM `products` WHERE `id` = 1".to_string(), 1)
}

fn new_logger(level: LogLevel) -> (Arc<CaptureLogger>, DbLogger) {
    let capture = Arc::new(CaptureLogger::default());
    let logger = DbLogger::new(capture.clone()).with_level(level);
    (capture, logger)
}

#[test]
fn test_defaults() {
    let logger = DbLogger::new(Arc::new(CaptureLogger::default()));
    assert_eq!(logger.level(), LogLevel::Warn);
    assert_eq!(logger.slow_threshold(), Duration::from_millis(200));
    assert!(logger.ignore_record_not_found_error());
}

#[test]
fn test_level_str_falls_back_to_warn() {
    let capture = Arc::new(CaptureLogger::default());
    assert_eq!(DbLogger::new(capture.clone()).with_level_str("info").level(), LogLevel::Info);
    assert_eq!(DbLogger::new(capture.clone()).with_level_str("silent").level(), LogLevel::Silent);
    assert_eq!(DbLogger::new(capture).with_level_str("debug").level(), LogLevel::Warn);
}

#[test]
fn test_error_is_logged_with_detail() {
    let (capture, logger) = new_logger(LogLevel::Error);
    let err = DbErr::Custom("Duplicate entry 'D42' for key 'code'".to_string());

    logger.trace(&LogContext::new(), Instant::now(), &select, Some(&err));

    let records = capture.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].level, "error");
    assert_eq!(records[0].msg, "db error trace");
    assert_eq!(records[0].keys(), vec!["sql", "error", "elapsed", "rows"]);
    assert_eq!(records[0].field("rows"), Some(&FieldValue::Int64(1)));
    match records[0].field("error") {
        Some(FieldValue::Error(detail)) => assert!(detail.contains("Duplicate entry")),
        other => panic!("unexpected error field: {:?}", other),
    }
    match records[0].field("elapsed") {
        Some(FieldValue::Str(elapsed)) => assert!(elapsed.ends_with(" ms")),
        other => panic!("unexpected elapsed field: {:?}", other),
    }
}

#[test]
fn test_record_not_found_suppressed_by_default() {
    let (capture, logger) = new_logger(LogLevel::Warn);
    let err = DbErr::RecordNotFound("products".to_string());

    logger.trace(&LogContext::new(), Instant::now(), &select, Some(&err));

    assert!(capture.records().is_empty());
}

#[test]
fn test_record_not_found_suppressed_falls_through_to_trace() {
    let (capture, logger) = new_logger(LogLevel::Info);
    let err = DbErr::RecordNotFound("products".to_string());

    logger.trace(&LogContext::new(), Instant::now(), &select, Some(&err));

    let records = capture.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].msg, "db trace");
    assert!(records[0].field("error").is_none());
}

#[test]
fn test_record_not_found_logged_when_not_ignored() {
    let (capture, logger) = new_logger(LogLevel::Error);
    let logger = logger.with_ignore_record_not_found_error(false);
    let err = DbErr::RecordNotFound("products".to_string());

    logger.trace(&LogContext::new(), Instant::now(), &select, Some(&err));

    let records = capture.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].msg, "db error trace");
}

#[test]
fn test_slow_query_warning_without_error() {
    let (capture, logger) = new_logger(LogLevel::Warn);

    logger.trace(&LogContext::new(), started_ago(Duration::from_millis(300)), &select, None);

    let records = capture.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].level, "warn");
    assert_eq!(records[0].msg, "db slow query");
    assert_eq!(records[0].keys(), vec!["sql", "elapsed", "rows"]);
}

#[test]
fn test_error_takes_precedence_over_slow_query() {
    let (capture, logger) = new_logger(LogLevel::Info);
    let err = DbErr::Custom("lock wait timeout".to_string());

    logger.trace(&LogContext::new(), started_ago(Duration::from_millis(300)), &select, Some(&err));

    let records = capture.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].msg, "db error trace");
}

#[test]
fn test_suppressed_not_found_can_still_be_slow() {
    let logger = DbLogger::new(Arc::new(CaptureLogger::default())).with_level(LogLevel::Warn);
    let not_found = DbErr::RecordNotFound("products".to_string());

    assert_eq!(
        logger.classify(Duration::from_millis(300), Some(&not_found)),
        Some(TraceKind::SlowQuery)
    );
    assert_eq!(logger.classify(Duration::from_millis(10), Some(&not_found)), None);

    let quiet = logger.with_level(LogLevel::Silent);
    let err = DbErr::Custom("boom".to_string());
    assert_eq!(quiet.classify(Duration::from_millis(300), Some(&err)), None);
}

#[test]
fn test_zero_threshold_disables_slow_query() {
    let (capture, logger) = new_logger(LogLevel::Warn);
    let logger = logger.with_slow_threshold(Duration::ZERO);

    logger.trace(&LogContext::new(), started_ago(Duration::from_secs(5)), &select, None);

    assert!(capture.records().is_empty());
    assert_eq!(logger.classify(Duration::from_secs(5), None), None);
}

#[test]
fn test_fast_statement_only_traced_at_info() {
    let (capture, logger) = new_logger(LogLevel::Warn);
    logger.trace(&LogContext::new(), Instant::now(), &select, None);
    assert!(capture.records().is_empty());

    let (capture, logger) = new_logger(LogLevel::Info);
    let ctx = LogContext::new().with("trace_id", "123456");
    logger.trace(&ctx, Instant::now(), &select, None);

    let records = capture.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].level, "info");
    assert_eq!(records[0].msg, "db trace");
    assert_eq!(records[0].ctx.get("trace_id"), Some("123456"));
    assert_eq!(
        records[0].field("sql"),
        Some(&FieldValue::Str("SELECT * FROM `products` WHERE `id` = 1".to_string()))
    );
}

#[test]
fn test_silent_emits_nothing() {
    let (capture, logger) = new_logger(LogLevel::Silent);
    let ctx = LogContext::new();
    let err = DbErr::Custom("boom".to_string());

    logger.trace(&ctx, started_ago(Duration::from_millis(300)), &select, Some(&err));
    logger.trace(&ctx, Instant::now(), &select, None);
    logger.info(&ctx, format_args!("info {}", 1));
    logger.warn(&ctx, format_args!("warn {}", 2));
    logger.error(&ctx, format_args!("error {}", 3));

    assert!(capture.records().is_empty());
}

#[test]
fn test_silent_does_not_render_sql() {
    let (_, logger) = new_logger(LogLevel::Silent);
    logger.trace(&LogContext::new(), Instant::now(), &|| panic!("sql rendered"), None);
}

#[test]
fn test_message_methods_respect_level() {
    let (capture, logger) = new_logger(LogLevel::Warn);
    let ctx = LogContext::new();

    logger.info(&ctx, format_args!("migrating {}", "products"));
    logger.warn(&ctx, format_args!("retrying {} times", 3));
    logger.error(&ctx, format_args!("failed"));

    let records = capture.records();
    assert_eq!(records.len(), 2);
    assert_eq!((records[0].level, records[0].msg.as_str()), ("warn", "retrying 3 times"));
    assert_eq!((records[1].level, records[1].msg.as_str()), ("error", "failed"));
}

#[test]
fn test_log_mode_returns_independent_copy() {
    let (capture, logger) = new_logger(LogLevel::Warn);
    let ctx = LogContext::new();

    let verbose = logger.log_mode(LogLevel::Info);
    verbose.trace(&ctx, Instant::now(), &select, None);
    logger.trace(&ctx, Instant::now(), &select, None);

    assert_eq!(logger.level(), LogLevel::Warn);
    let records = capture.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].msg, "db trace");
}
