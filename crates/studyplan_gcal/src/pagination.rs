// --- File: crates/studyplan_gcal/src/pagination.rs ---
//! Capacity-bounded, cursor-based pagination over a remote listing operation.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use studyplan_common::models::Page;
use studyplan_common::{invalid_argument, ProviderError, StudyplanError};
use tracing::{debug, warn};

/// Upper bound on how many items a listing may return.
///
/// Built from anything numeric-like: integers, integral floats, or strings
/// holding either. Negative, fractional and unparsable inputs are rejected
/// with `InvalidArgument`. Zero is allowed and means "fetch nothing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Capacity(u32);

impl Capacity {
    pub fn new(value: u32) -> Self {
        Capacity(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Capacity {
    type Error = StudyplanError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map(Capacity)
            .map_err(|_| invalid_argument(format!("capacity must be a non-negative integer, got {}", value)))
    }
}

impl TryFrom<f64> for Capacity {
    type Error = StudyplanError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
            return Err(invalid_argument(format!(
                "capacity must be a non-negative integer, got {}",
                value
            )));
        }
        Ok(Capacity(value as u32))
    }
}

impl FromStr for Capacity {
    type Err = StudyplanError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return Capacity::try_from(value);
        }
        match trimmed.parse::<f64>() {
            Ok(value) => Capacity::try_from(value),
            Err(_) => Err(invalid_argument(format!(
                "capacity '{}' is not a number",
                text
            ))),
        }
    }
}

impl TryFrom<&Value> for Capacity {
    type Error = StudyplanError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(number) => match number.as_i64() {
                Some(value) => Capacity::try_from(value),
                None => Capacity::try_from(number.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(text) => text.parse(),
            other => Err(invalid_argument(format!(
                "capacity must be numeric, got {}",
                other
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Capacity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Capacity::try_from(&value).map_err(serde::de::Error::custom)
    }
}

/// Drives a listing operation page by page until `capacity` items have been
/// collected, the provider stops handing out continuation tokens, or
/// `ceil(capacity / max_page_size)` requests have been made.
///
/// Each request asks for `min(max_page_size, capacity - collected)` items.
/// Empty pages that carry a token are followed like any other page. Items keep
/// provider order and the result never exceeds `capacity`.
///
/// A failure on the first page is returned to the caller. A failure on a later
/// page ends the listing early with what was collected so far.
#[derive(Debug, Clone, Copy)]
pub struct PageFetcher {
    max_page_size: u32,
}

impl PageFetcher {
    pub fn new(max_page_size: u32) -> Self {
        Self {
            max_page_size: max_page_size.max(1),
        }
    }

    pub async fn fetch<T, F, Fut>(&self, capacity: Capacity, mut list_op: F) -> Result<Vec<T>, StudyplanError>
    where
        F: FnMut(u32, Option<String>) -> Fut,
        Fut: Future<Output = Result<Page<T>, ProviderError>>,
    {
        let capacity = capacity.get() as usize;
        let max_requests = capacity.div_ceil(self.max_page_size as usize);
        let mut collected: Vec<T> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut requests = 0usize;

        while requests < max_requests && collected.len() < capacity {
            let remaining = (capacity - collected.len()).min(u32::MAX as usize) as u32;
            let page_size = self.max_page_size.min(remaining);

            debug!(
                "Requesting page {} of at most {} (size {}, cursor {:?})",
                requests + 1,
                max_requests,
                page_size,
                cursor
            );
            let page = match list_op(page_size, cursor.take()).await {
                Ok(page) => page,
                Err(e) if requests == 0 => return Err(e.into()),
                Err(e) => {
                    warn!(
                        "Listing stopped after {} items, page {} failed: {}",
                        collected.len(),
                        requests + 1,
                        e
                    );
                    break;
                }
            };
            requests += 1;

            let room = capacity - collected.len();
            collected.extend(page.items.into_iter().take(room));

            // an empty page may still carry a token; keep following it
            match page.next_page_token {
                Some(token) => cursor = Some(token),
                None => break,
            }
        }

        if cursor.is_some() && collected.len() < capacity {
            debug!(
                "Request budget of {} spent with {} of {} items",
                max_requests,
                collected.len(),
                capacity
            );
        }
        debug!("Listing finished: {} items in {} requests", collected.len(), requests);
        Ok(collected)
    }
}
