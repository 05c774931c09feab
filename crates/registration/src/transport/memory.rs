/*
 * SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: LicenseRef-NvidiaProprietary
 *
 * NVIDIA CORPORATION, its affiliates and licensors retain all intellectual
 * property and proprietary rights in and to this material, related
 * documentation and any modifications thereto. Any use, reproduction,
 * disclosure or distribution of this material and related documentation
 * without an express license agreement from NVIDIA CORPORATION or
 * its affiliates is strictly prohibited.
 */

// src/transport/memory.rs
// In-process transport that records publishes instead of sending them.
//
// Used for dry runs and tests. It can be told to reject a given
// publish to exercise failure handling.

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::errors::TransportError;
use crate::stats::{PublishStats, PublishStatsTracker};
use crate::transport::RegistrationTransport;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    // at is read from the tokio clock so paused-time tests can check
    // the pacing between publishes.
    pub at: Instant,
}

impl PublishedMessage {
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    messages: Vec<PublishedMessage>,
    attempts: usize,
    fail_on: BTreeSet<usize>,
}

#[derive(Debug, Default)]
pub struct MemoryTransport {
    state: Mutex<MemoryState>,
    stats: PublishStatsTracker,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    // failing_on returns a transport that rejects the given publish
    // attempts, counted from 1 across the transport's lifetime.
    pub fn failing_on(attempts: impl IntoIterator<Item = usize>) -> Self {
        let transport = Self::new();
        for attempt in attempts {
            transport.fail_on(attempt);
        }
        transport
    }

    pub fn fail_on(&self, attempt: usize) {
        self.lock().fail_on.insert(attempt);
    }

    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.lock().messages.clone()
    }

    pub fn topics(&self) -> Vec<String> {
        self.lock().messages.iter().map(|m| m.topic.clone()).collect()
    }

    // attempts includes rejected publishes.
    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.messages.clear();
        state.attempts = 0;
        self.stats.reset();
    }

    pub fn publish_stats(&self) -> PublishStats {
        self.stats.snapshot()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A panic while holding the lock leaves the recorded messages intact.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RegistrationTransport for MemoryTransport {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.attempts += 1;
        let attempt = state.attempts;
        if state.fail_on.contains(&attempt) {
            self.stats.record_failed();
            return Err(TransportError::rejected(
                topic,
                format!("memory transport configured to fail publish #{attempt}"),
            ));
        }

        state.messages.push(PublishedMessage {
            topic: topic.to_string(),
            payload: payload.to_vec(),
            at: Instant::now(),
        });
        self.stats.record_published(payload.len());
        Ok(())
    }
}
