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

// tests/stats.rs
// Publish counters, directly and through MemoryTransport.

use std::sync::Arc;
use std::thread;

use registration::{MemoryTransport, PublishStats, PublishStatsTracker, RegistrationTransport};

#[test]
fn test_tracker_starts_at_zero() {
    let tracker = PublishStatsTracker::new();
    assert_eq!(tracker.snapshot(), PublishStats::default());
}

#[test]
fn test_tracker_counts() {
    let tracker = PublishStatsTracker::new();
    tracker.record_published(512);
    tracker.record_published(256);
    tracker.record_failed();
    tracker.record_timed_out();

    let stats = tracker.snapshot();
    assert_eq!(stats.total_published, 2);
    assert_eq!(stats.total_bytes_published, 768);
    assert_eq!(stats.total_failed, 2);
    assert_eq!(stats.total_timed_out, 1);
    assert_eq!(stats.total_attempted(), 4);

    tracker.reset();
    assert_eq!(tracker.snapshot(), PublishStats::default());
}

#[test]
fn test_tracker_is_shared_across_threads() {
    let tracker = Arc::new(PublishStatsTracker::new());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let tracker = tracker.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    tracker.record_published(10);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stats = tracker.snapshot();
    assert_eq!(stats.total_published, 400);
    assert_eq!(stats.total_bytes_published, 4000);
}

#[tokio::test]
async fn test_memory_transport_stats() {
    let transport = MemoryTransport::failing_on([2]);
    transport.publish("a", b"12345").await.unwrap();
    assert!(transport.publish("b", b"123").await.is_err());
    transport.publish("c", b"12").await.unwrap();

    let stats = transport.publish_stats();
    assert_eq!(stats.total_published, 2);
    assert_eq!(stats.total_failed, 1);
    assert_eq!(stats.total_bytes_published, 7);
    assert_eq!(transport.topics(), vec!["a", "c"]);

    transport.clear();
    assert_eq!(transport.attempts(), 0);
    assert_eq!(transport.publish_stats(), PublishStats::default());
}
