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

//! Request-scoped logging context
//! Key/value pairs that travel with every structured record, such as a trace id

use std::fmt;

/// Ordered key/value pairs attached to a log record.
///
/// Cloning is cheap enough to hand one to every connection handle; keys keep
/// their insertion order so records render deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogContext {
    values: Vec<(String, String)>,
}

impl LogContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a context with `key` set to `value`, replacing an earlier value for the same key.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.values.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.values.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}={:?}", key, value)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_existing_key() {
        let ctx = LogContext::new()
            .with("trace_id", "1")
            .with("user", "alice")
            .with("trace_id", "2");

        assert_eq!(ctx.get("trace_id"), Some("2"));
        assert_eq!(ctx.iter().count(), 2);
        assert_eq!(ctx.to_string(), r#"trace_id="2" user="alice""#);
    }

    #[test]
    fn test_empty_context() {
        let ctx = LogContext::new();
        assert!(ctx.is_empty());
        assert_eq!(ctx.get("trace_id"), None);
        assert_eq!(ctx.to_string(), "");
    }
}
