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

// src/transport/mqtt.rs
// RegistrationTransport backed by a rumqttc client.
//
// rumqttc only does network I/O while its EventLoop is polled, so a
// background task polls it for the lifetime of the transport and
// forwards the two things publish() cares about: an outgoing publish
// packet was written, or the connection failed. publish() queues the
// request and then waits for one of those.

use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, Outgoing, Packet, QoS};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::errors::TransportError;
use crate::stats::{PublishStats, PublishStatsTracker};
use crate::transport::RegistrationTransport;
use crate::transport::options::MqttTransportOptions;

// EVENT_BACKLOG bounds the notifications buffered while nobody is
// publishing. Older ones are stale by then, so overflow is dropped.
const EVENT_BACKLOG: usize = 16;

#[derive(Debug)]
enum LoopEvent {
    Written,
    Failed(String),
}

pub struct MqttTransport {
    client: AsyncClient,
    events: Mutex<mpsc::Receiver<LoopEvent>>,
    event_loop: JoinHandle<()>,
    qos: QoS,
    retain: bool,
    publish_timeout: Option<Duration>,
    stats: PublishStatsTracker,
}

impl MqttTransport {
    // connect starts the event loop task. The broker connection itself
    // is made lazily by rumqttc, so connection problems surface on the
    // first publish.
    pub fn connect(options: MqttTransportOptions) -> Self {
        info!(
            host = %options.host,
            port = options.port,
            client_id = %options.client_id,
            "Starting MQTT transport"
        );
        let (client, event_loop) =
            AsyncClient::new(options.mqtt_options(), options.channel_capacity);
        let (tx, rx) = mpsc::channel(EVENT_BACKLOG);
        let event_loop = tokio::spawn(drive_event_loop(event_loop, tx, options.reconnect_delay));

        Self {
            client,
            events: Mutex::new(rx),
            event_loop,
            qos: options.qos,
            retain: options.retain,
            publish_timeout: options.publish_timeout,
            stats: PublishStatsTracker::new(),
        }
    }

    pub fn publish_stats(&self) -> PublishStats {
        self.stats.snapshot()
    }

    // disconnect asks the broker connection to close cleanly. Any
    // publishes still queued behind it are dropped.
    pub async fn disconnect(&self) -> Result<(), TransportError> {
        debug!("Disconnecting MQTT transport");
        self.client.disconnect().await?;
        Ok(())
    }

    async fn wait_for_handoff(
        &self,
        events: &mut mpsc::Receiver<LoopEvent>,
    ) -> Result<(), TransportError> {
        match events.recv().await {
            Some(LoopEvent::Written) => Ok(()),
            Some(LoopEvent::Failed(reason)) => Err(TransportError::Connection(reason)),
            None => Err(TransportError::Closed),
        }
    }
}

#[async_trait]
impl RegistrationTransport for MqttTransport {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        // One publish in flight at a time; the lock also orders the
        // confirmations with the requests.
        let mut events = self.events.lock().await;

        // Anything left over belongs to an earlier publish that already
        // returned (e.g. after a timeout).
        while let Ok(stale) = events.try_recv() {
            debug!(?stale, "Discarding stale event loop notification");
        }

        if let Err(e) = self
            .client
            .publish(topic, self.qos, self.retain, payload.to_vec())
            .await
        {
            self.stats.record_failed();
            error!(topic, error = %e, "Failed to queue MQTT publish");
            return Err(e.into());
        }

        let result = match self.publish_timeout {
            Some(timeout) => {
                match tokio::time::timeout(timeout, self.wait_for_handoff(&mut events)).await {
                    Ok(result) => result,
                    Err(_) => {
                        self.stats.record_timed_out();
                        error!(topic, ?timeout, "Timed out waiting for MQTT publish hand-off");
                        return Err(TransportError::Timeout {
                            topic: topic.to_string(),
                            timeout,
                        });
                    }
                }
            }
            None => self.wait_for_handoff(&mut events).await,
        };

        match &result {
            Ok(()) => {
                self.stats.record_published(payload.len());
                debug!(topic, bytes = payload.len(), "MQTT publish handed off");
            }
            Err(e) => {
                self.stats.record_failed();
                error!(topic, error = %e, "MQTT publish failed");
            }
        }
        result
    }
}

impl Drop for MqttTransport {
    fn drop(&mut self) {
        self.event_loop.abort();
    }
}

async fn drive_event_loop(
    mut event_loop: EventLoop,
    tx: mpsc::Sender<LoopEvent>,
    reconnect_delay: Duration,
) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Outgoing(Outgoing::Publish(pkid))) => {
                debug!(pkid, "Outgoing publish written");
                if !notify(&tx, LoopEvent::Written) {
                    return;
                }
            }
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                info!(code = ?ack.code, "Connected to MQTT broker");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "MQTT event loop error");
                if !notify(&tx, LoopEvent::Failed(e.to_string())) {
                    return;
                }
                tokio::time::sleep(reconnect_delay).await;
            }
        }
    }
}

// notify hands an event to publish() without blocking the event loop.
// Returns false once the transport is gone.
fn notify(tx: &mpsc::Sender<LoopEvent>, event: LoopEvent) -> bool {
    match tx.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(event)) => {
            debug!(?event, "Event backlog full, dropping notification");
            true
        }
        Err(TrySendError::Closed(_)) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_failures_are_bounded() {
        let (tx, mut rx) = mpsc::channel(EVENT_BACKLOG);
        for attempt in 0..EVENT_BACKLOG * 10 {
            assert!(notify(&tx, LoopEvent::Failed(format!("refused {attempt}"))));
        }

        let mut buffered = 0;
        while rx.try_recv().is_ok() {
            buffered += 1;
        }
        assert_eq!(buffered, EVENT_BACKLOG);

        drop(rx);
        assert!(!notify(&tx, LoopEvent::Written));
    }
}
