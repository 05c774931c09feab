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

// src/stats.rs
// Counters for publishes made by a transport.

use std::sync::atomic::{AtomicUsize, Ordering};

// PublishStats is a point-in-time copy of a PublishStatsTracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishStats {
    // total_published counts publishes that were handed off.
    pub total_published: usize,
    // total_failed counts publishes that returned an error,
    // including timeouts.
    pub total_failed: usize,
    pub total_timed_out: usize,
    // total_bytes_published only includes handed-off payloads.
    pub total_bytes_published: usize,
}

impl PublishStats {
    pub fn total_attempted(&self) -> usize {
        self.total_published + self.total_failed
    }
}

// PublishStatsTracker is shared between a transport and whoever wants
// to read its counters; updates are lock-free.
#[derive(Debug, Default)]
pub struct PublishStatsTracker {
    published: AtomicUsize,
    failed: AtomicUsize,
    timed_out: AtomicUsize,
    published_bytes: AtomicUsize,
}

impl PublishStatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_published(&self, bytes: usize) {
        self.published.fetch_add(1, Ordering::Relaxed);
        self.published_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    // record_timed_out also counts as a failure.
    pub fn record_timed_out(&self) {
        self.timed_out.fetch_add(1, Ordering::Relaxed);
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.published.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.timed_out.store(0, Ordering::Relaxed);
        self.published_bytes.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PublishStats {
        PublishStats {
            total_published: self.published.load(Ordering::Relaxed),
            total_failed: self.failed.load(Ordering::Relaxed),
            total_timed_out: self.timed_out.load(Ordering::Relaxed),
            total_bytes_published: self.published_bytes.load(Ordering::Relaxed),
        }
    }
}
