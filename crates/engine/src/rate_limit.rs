// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token-bucket admission control.
//!
//! Three layers are consulted per command: the process-wide global bucket,
//! the session bucket derived from the session's policy limits, and the
//! per-command cap bucket. Buckets are created lazily and refilled on
//! consultation; a layer that admits keeps its deducted token even when a
//! later layer throttles.

use parking_lot::{Mutex, RwLock};
use sb_core::{Clock, CommandKind, RateLimits, SessionId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Which layer refused the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateScope {
    Global,
    Session,
    Command,
}

impl RateScope {
    /// Human-readable scope string carried in `throttled` events.
    pub fn message(self) -> &'static str {
        match self {
            RateScope::Global => "Global rate limit exceeded",
            RateScope::Session => "Rate limit exceeded",
            RateScope::Command => "Command rate limit exceeded",
        }
    }
}

/// Outcome of an admission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allow,
    /// `retry_after` is `None` when the bucket never refills.
    Throttle { scope: RateScope, retry_after: Option<Duration> },
}

struct Bucket {
    tokens: f64,
    capacity: f64,
    rate_per_sec: f64,
    last_refill: Instant,
}

impl Bucket {
    fn new(calls_per_minute: u32, burst: u32, now: Instant) -> Self {
        let capacity = burst as f64;
        Self {
            tokens: capacity,
            capacity,
            rate_per_sec: calls_per_minute as f64 / 60.0,
            last_refill: now,
        }
    }

    /// Refill then deduct one token. `Err` carries the retry hint.
    fn try_acquire(&mut self, now: Instant) -> Result<(), Option<Duration>> {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate_per_sec).min(self.capacity);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            return Ok(());
        }
        if self.rate_per_sec <= 0.0 {
            return Err(None);
        }
        Err(Some(Duration::from_secs_f64((1.0 - self.tokens) / self.rate_per_sec)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum BucketKey {
    Session(SessionId),
    Command(SessionId, CommandKind),
}

pub struct RateLimiter<C: Clock> {
    clock: C,
    global: Option<Mutex<Bucket>>,
    buckets: RwLock<HashMap<BucketKey, Arc<Mutex<Bucket>>>>,
}

impl<C: Clock> RateLimiter<C> {
    /// `global` is the process-wide limits config; a config with no
    /// `calls_per_minute` disables the global layer.
    pub fn new(global: &RateLimits, clock: C) -> Self {
        let global_bucket = global.calls_per_minute.map(|cpm| {
            Mutex::new(Bucket::new(cpm, global.burst.unwrap_or(cpm), clock.now()))
        });
        Self { clock, global: global_bucket, buckets: RwLock::new(HashMap::new()) }
    }

    /// Admit or throttle one command. `limits` is the session profile's
    /// rate config; its absence means no session-level limit.
    pub fn check(
        &self,
        session_id: &SessionId,
        kind: CommandKind,
        limits: Option<&RateLimits>,
    ) -> RateDecision {
        let now = self.clock.now();

        if let Some(global) = &self.global {
            if let Err(retry_after) = global.lock().try_acquire(now) {
                return RateDecision::Throttle { scope: RateScope::Global, retry_after };
            }
        }

        let Some(limits) = limits else {
            return RateDecision::Allow;
        };

        if let Some(cpm) = limits.calls_per_minute {
            let bucket = self.bucket(
                BucketKey::Session(*session_id),
                cpm,
                limits.burst.unwrap_or(cpm),
                now,
            );
            let result = bucket.lock().try_acquire(now);
            if let Err(retry_after) = result {
                return RateDecision::Throttle { scope: RateScope::Session, retry_after };
            }
        }

        if let Some(cap) = limits.per_command_caps.get(&kind) {
            let bucket = self.bucket(BucketKey::Command(*session_id, kind), *cap, *cap, now);
            let result = bucket.lock().try_acquire(now);
            if let Err(retry_after) = result {
                return RateDecision::Throttle { scope: RateScope::Command, retry_after };
            }
        }

        RateDecision::Allow
    }

    fn bucket(
        &self,
        key: BucketKey,
        calls_per_minute: u32,
        burst: u32,
        now: Instant,
    ) -> Arc<Mutex<Bucket>> {
        if let Some(bucket) = self.buckets.read().get(&key) {
            return Arc::clone(bucket);
        }
        let mut buckets = self.buckets.write();
        Arc::clone(
            buckets
                .entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(Bucket::new(calls_per_minute, burst, now)))),
        )
    }
}

#[cfg(test)]
#[path = "rate_limit_tests.rs"]
mod tests;
