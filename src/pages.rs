// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::ApiError;
use anyhow::{Result, anyhow};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use tracing::{debug, warn};

pub const MAX_IN_FLIGHT: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub enum PageState<T> {
    Loading,
    Failed(String),
    Empty(String),
    Ready(T),
}

impl<T> PageState<T> {
    pub fn from_result<F>(result: Result<T, ApiError>, is_empty: F, empty_message: &str) -> Self
    where
        F: FnOnce(&T) -> bool,
    {
        match result {
            Ok(v) if is_empty(&v) => PageState::Empty(empty_message.to_string()),
            Ok(v) => PageState::Ready(v),
            Err(err) => PageState::Failed(err.to_string()),
        }
    }

    pub fn finish<F>(self, render: F) -> Result<()>
    where
        F: FnOnce(T) -> Result<()>,
    {
        match self {
            PageState::Ready(v) => render(v),
            PageState::Empty(msg) => {
                println!("{}", msg);
                Ok(())
            }
            PageState::Failed(msg) => Err(anyhow!(msg)),
            PageState::Loading => Ok(()),
        }
    }
}

pub fn load<T, F, E>(label: &str, fetch: F, is_empty: E, empty_message: &str) -> PageState<T>
where
    F: FnOnce() -> Result<T, ApiError>,
    E: FnOnce(&T) -> bool,
{
    eprintln!("Loading {}…", label);
    PageState::from_result(fetch(), is_empty, empty_message)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    key: String,
}

impl Ticket {
    pub fn key(&self) -> &str {
        &self.key
    }
}

// Responses are only accepted for the latest selection.
#[derive(Debug)]
pub struct Selection<T> {
    generation: u64,
    key: Option<String>,
    state: PageState<T>,
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            key: None,
            state: PageState::Loading,
        }
    }
}

impl<T> Selection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, key: &str) -> Ticket {
        self.generation += 1;
        self.key = Some(key.to_string());
        self.state = PageState::Loading;
        Ticket {
            generation: self.generation,
            key: key.to_string(),
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn accept(&mut self, ticket: &Ticket, outcome: PageState<T>) -> bool {
        if ticket.generation != self.generation {
            debug!(key = %ticket.key, "discarding stale response");
            return false;
        }
        self.state = outcome;
        true
    }

    pub fn state(&self) -> &PageState<T> {
        &self.state
    }

    pub fn into_state(self) -> PageState<T> {
        self.state
    }
}

// Successes come back in input order. Failed items are dropped, except that a
// 401 fails the whole batch.
pub fn fan_out<T, R, F>(items: &[T], fetch: F) -> Result<Vec<R>, ApiError>
where
    T: Sync + std::fmt::Display,
    R: Send,
    F: Fn(&T) -> Result<R, ApiError> + Sync,
{
    let slots: Vec<Mutex<Option<R>>> = items.iter().map(|_| Mutex::new(None)).collect();
    let next = AtomicUsize::new(0);
    let unauthorized = AtomicBool::new(false);
    let workers = items.len().clamp(1, MAX_IN_FLIGHT);

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| {
                while !unauthorized.load(Ordering::SeqCst) {
                    let idx = next.fetch_add(1, Ordering::SeqCst);
                    let Some(item) = items.get(idx) else {
                        break;
                    };
                    match fetch(item) {
                        Ok(r) => {
                            if let Ok(mut slot) = slots[idx].lock() {
                                *slot = Some(r);
                            }
                        }
                        Err(err) if err.is_unauthorized() => {
                            unauthorized.store(true, Ordering::SeqCst);
                        }
                        Err(err) => warn!(item = %item, error = %err, "dropping item from aggregate"),
                    }
                }
            });
        }
    });

    if unauthorized.into_inner() {
        return Err(ApiError::Unauthorized);
    }
    Ok(slots
        .into_iter()
        .filter_map(|slot| slot.into_inner().ok().flatten())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_ticket_is_discarded() {
        let mut sel: Selection<Vec<u32>> = Selection::new();
        let first = sel.select("aapl");
        let second = sel.select("msft");

        assert!(sel.accept(&second, PageState::Ready(vec![2])));
        assert!(!sel.accept(&first, PageState::Ready(vec![1])));
        assert_eq!(sel.current(), Some("msft"));
        assert_eq!(sel.state(), &PageState::Ready(vec![2]));
    }

    #[test]
    fn empty_and_failed_are_distinct() {
        let empty: PageState<Vec<u8>> =
            PageState::from_result(Ok(vec![]), |v| v.is_empty(), "No investments yet.");
        assert_eq!(empty, PageState::Empty("No investments yet.".into()));

        let failed: PageState<Vec<u8>> =
            PageState::from_result(Err(ApiError::Timeout), |v| v.is_empty(), "unused");
        assert_eq!(failed, PageState::Failed("request timed out".into()));
        assert!(failed.finish(|_| Ok(())).is_err());
    }

    #[test]
    fn fan_out_keeps_order_and_drops_failures() {
        let items: Vec<u32> = (0..20).collect();
        let out = fan_out(&items, |n| {
            if n % 3 == 0 {
                Err(ApiError::Server {
                    status: 500,
                    message: "boom".into(),
                })
            } else {
                Ok(n * 10)
            }
        })
        .unwrap();
        let expected: Vec<u32> = items.iter().filter(|n| *n % 3 != 0).map(|n| n * 10).collect();
        assert_eq!(out, expected);
        assert!(fan_out(&Vec::<u32>::new(), |n| Ok::<_, ApiError>(*n)).unwrap().is_empty());
    }

    #[test]
    fn fan_out_fails_the_batch_on_unauthorized() {
        let items: Vec<u32> = (0..20).collect();
        let result = fan_out(&items, |n| {
            if *n == 7 {
                Err(ApiError::Unauthorized)
            } else {
                Ok(*n)
            }
        });
        assert_eq!(result, Err(ApiError::Unauthorized));
    }
}
