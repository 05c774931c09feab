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

// src/lib.rs
// Registration of a controller's capability manifest with the
// coordinating service over a size-constrained MQTT transport.
//
// Quick start:
//
// let registrar = Registrar::new(config.registration.clone());
// let transport = MqttTransport::connect(config.broker.transport_options("clock")?);
// let report = registrar.register_with_retry(&model, &transport).await?;

pub mod config;
pub mod errors;
pub mod payload;
pub mod protocol;
pub mod stats;
pub mod transport;

pub use config::{
    BrokerConfig, Config, ConfigError, HardwareProfile, QosLevel, RegistrationConfig, RetryPolicy,
};
pub use errors::{RegistrationError, TransportError};
pub use protocol::{
    DevicePlan, Registrar, RegistrationPhase, RegistrationPlan, RegistrationReport,
    RegistrationStrategy,
};
pub use stats::{PublishStats, PublishStatsTracker};
pub use transport::{
    MemoryTransport, MqttTransport, MqttTransportOptions, PublishedMessage, RegistrationTransport,
};
