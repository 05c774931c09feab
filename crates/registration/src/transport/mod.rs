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

// src/transport/mod.rs
// The publish capability registration runs on top of.

pub mod memory;
pub mod mqtt;
pub mod options;

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::TransportError;

pub use memory::{MemoryTransport, PublishedMessage};
pub use mqtt::MqttTransport;
pub use options::{ClientCredentials, MqttTransportOptions};

// RegistrationTransport publishes one payload to one topic. Ok means
// the transport accepted the payload for delivery (hand-off); it is
// not an end-to-end acknowledgement from the coordinator.
//
// Example: a transport that only logs
// struct LogTransport;
//
// #[async_trait]
// impl RegistrationTransport for LogTransport {
//     async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
//         tracing::info!(topic, bytes = payload.len(), "publish");
//         Ok(())
//     }
// }
#[async_trait]
pub trait RegistrationTransport: Send + Sync {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), TransportError>;
}

#[async_trait]
impl<T: RegistrationTransport + ?Sized> RegistrationTransport for Arc<T> {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        (**self).publish(topic, payload).await
    }
}

#[async_trait]
impl<T: RegistrationTransport + ?Sized> RegistrationTransport for &T {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        (**self).publish(topic, payload).await
    }
}
