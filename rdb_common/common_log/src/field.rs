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

//! Typed key/value fields for structured log records

use std::fmt;

/// Value carried by a [`Field`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int64(i64),
    Error(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) | FieldValue::Error(s) => write!(f, "{:?}", s),
            FieldValue::Int64(n) => write!(f, "{}", n),
        }
    }
}

/// A single key/value pair of a structured record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: &'static str,
    pub value: FieldValue,
}

impl Field {
    pub fn string(key: &'static str, value: impl Into<String>) -> Self {
        Self { key, value: FieldValue::Str(value.into()) }
    }

    pub fn int64(key: &'static str, value: i64) -> Self {
        Self { key, value: FieldValue::Int64(value) }
    }

    /// Error field, always keyed `error`.
    pub fn error(err: &dyn std::error::Error) -> Self {
        Self { key: "error", value: FieldValue::Error(err.to_string()) }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}
