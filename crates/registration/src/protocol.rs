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

// src/protocol.rs
// The registration sequence.
//
// A registration publishes one controller payload and then one payload
// per device, in device order, pausing after each publish so the
// controller's network stack can drain. The controller payload is sent
// in full when it fits under the size threshold and in minimal form
// otherwise; the per-device payloads carry the detail either way.
//
// Nothing is retried or rolled back inside a single run. A failed
// publish ends the run and whatever was already sent stays sent.

use std::fmt;
use std::time::Duration;

use manifest::{ControllerInfo, ManifestModel};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use tryhard::RetryPolicy as Backoff;

use crate::config::RegistrationConfig;
use crate::errors::{RegistrationError, TransportError};
use crate::payload::{DevicePayload, FullControllerPayload, MinimalControllerPayload};
use crate::transport::RegistrationTransport;

// RegistrationPhase is where a registration run is. Runs only move
// forward; Failed and Complete are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationPhase {
    Idle,
    BuildControllerPayload,
    FullSend,
    MinimalSend,
    // PerDeviceSend holds the index of the device being published.
    PerDeviceSend(usize),
    Complete,
    Failed,
}

impl fmt::Display for RegistrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationPhase::Idle => write!(f, "idle"),
            RegistrationPhase::BuildControllerPayload => write!(f, "controller payload build"),
            RegistrationPhase::FullSend => write!(f, "full controller send"),
            RegistrationPhase::MinimalSend => write!(f, "minimal controller send"),
            RegistrationPhase::PerDeviceSend(index) => write!(f, "device {index} send"),
            RegistrationPhase::Complete => write!(f, "complete"),
            RegistrationPhase::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStrategy {
    Full,
    Minimal,
}

impl RegistrationStrategy {
    pub fn send_phase(self) -> RegistrationPhase {
        match self {
            RegistrationStrategy::Full => RegistrationPhase::FullSend,
            RegistrationStrategy::Minimal => RegistrationPhase::MinimalSend,
        }
    }
}

impl fmt::Display for RegistrationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationStrategy::Full => write!(f, "full"),
            RegistrationStrategy::Minimal => write!(f, "minimal"),
        }
    }
}

// RegistrationReport summarizes a successful run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegistrationReport {
    pub strategy: RegistrationStrategy,
    // controller_payload_bytes is the size of what was actually sent.
    pub controller_payload_bytes: usize,
    // full_payload_bytes is the size the full payload measured at,
    // whether or not it was sent.
    pub full_payload_bytes: usize,
    pub devices_registered: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DevicePlan {
    pub device_index: usize,
    pub device_id: String,
    pub payload: Vec<u8>,
}

// RegistrationPlan holds every payload of a run, already serialized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationPlan {
    pub strategy: RegistrationStrategy,
    pub controller_payload: Vec<u8>,
    pub full_payload_bytes: usize,
    pub devices: Vec<DevicePlan>,
}

impl RegistrationPlan {
    pub fn controller_payload_bytes(&self) -> usize {
        self.controller_payload.len()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Registrar {
    config: RegistrationConfig,
}

impl Registrar {
    pub fn new(config: RegistrationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RegistrationConfig {
        &self.config
    }

    // plan validates the controller identity and renders every payload
    // without touching the transport.
    pub fn plan(&self, model: &ManifestModel) -> Result<RegistrationPlan, RegistrationError> {
        let controller = controller_identity(model)?;
        if self.config.room_uuid.is_empty() {
            warn!(
                controller_id = %controller.unique_id,
                "No room_uuid configured; registering with an empty room_id"
            );
        }
        debug!(
            phase = %RegistrationPhase::BuildControllerPayload,
            controller_id = %controller.unique_id,
            devices = model.device_count(),
            "Building controller payload"
        );

        let full = serde_json::to_vec(&FullControllerPayload::new(controller, model, &self.config))
            .map_err(|e| RegistrationError::serialization("full controller", e))?;
        let full_payload_bytes = full.len();

        let (strategy, controller_payload) = if full_payload_bytes > self.config.size_threshold_bytes
        {
            let minimal =
                serde_json::to_vec(&MinimalControllerPayload::new(controller, model, &self.config))
                    .map_err(|e| RegistrationError::serialization("minimal controller", e))?;
            (RegistrationStrategy::Minimal, minimal)
        } else {
            (RegistrationStrategy::Full, full)
        };
        debug!(
            %strategy,
            full_payload_bytes,
            threshold = self.config.size_threshold_bytes,
            "Selected controller payload form"
        );

        let devices = model
            .devices()
            .iter()
            .enumerate()
            .map(|(device_index, device)| {
                let payload =
                    serde_json::to_vec(&DevicePayload::new(controller, model, device_index, device))
                        .map_err(|e| RegistrationError::serialization("device", e))?;
                Ok(DevicePlan {
                    device_index,
                    device_id: device.device_id.clone(),
                    payload,
                })
            })
            .collect::<Result<Vec<_>, RegistrationError>>()?;

        Ok(RegistrationPlan {
            strategy,
            controller_payload,
            full_payload_bytes,
            devices,
        })
    }

    // register runs the sequence once against the given transport.
    pub async fn register<T>(
        &self,
        model: &ManifestModel,
        transport: &T,
    ) -> Result<RegistrationReport, RegistrationError>
    where
        T: RegistrationTransport + ?Sized,
    {
        let plan = self.plan(model)?;
        let phase = plan.strategy.send_phase();
        info!(
            strategy = %plan.strategy,
            bytes = plan.controller_payload_bytes(),
            topic = %self.config.controller_topic,
            "Publishing controller registration"
        );
        self.send(
            transport,
            phase,
            &self.config.controller_topic,
            &plan.controller_payload,
        )
        .await?;
        pace(self.config.controller_pacing).await;

        for device in &plan.devices {
            let phase = RegistrationPhase::PerDeviceSend(device.device_index);
            if device.payload.len() > self.config.size_threshold_bytes {
                warn!(
                    device_id = %device.device_id,
                    bytes = device.payload.len(),
                    threshold = self.config.size_threshold_bytes,
                    "Device payload exceeds the size threshold; sending anyway"
                );
            }
            debug!(
                %phase,
                device_id = %device.device_id,
                bytes = device.payload.len(),
                "Publishing device registration"
            );
            self.send(transport, phase, &self.config.device_topic, &device.payload)
                .await?;
            pace(self.config.device_pacing).await;
        }

        let report = RegistrationReport {
            strategy: plan.strategy,
            controller_payload_bytes: plan.controller_payload_bytes(),
            full_payload_bytes: plan.full_payload_bytes,
            devices_registered: plan.devices.len(),
        };
        info!(
            phase = %RegistrationPhase::Complete,
            strategy = %report.strategy,
            devices = report.devices_registered,
            "Registration complete"
        );
        Ok(report)
    }

    // register_with_retry re-runs the whole sequence after transport
    // failures, up to the configured number of attempts. Validation and
    // serialization failures are returned straight away. Devices sent
    // by a failed attempt are sent again by the next one.
    pub async fn register_with_retry<T>(
        &self,
        model: &ManifestModel,
        transport: &T,
    ) -> Result<RegistrationReport, RegistrationError>
    where
        T: RegistrationTransport + ?Sized,
    {
        let policy = self.config.retry;
        if policy.retries() == 0 {
            return self.register(model, transport).await;
        }

        tryhard::retry_fn(|| self.register(model, transport))
            .retries(policy.retries())
            .custom_backoff(|_attempt, error: &RegistrationError| {
                if error.is_transport_error() {
                    Backoff::Delay(policy.backoff)
                } else {
                    Backoff::Break
                }
            })
            .on_retry(
                |attempt, next_delay: Option<Duration>, error: &RegistrationError| {
                    warn!(
                        attempt,
                        max_attempts = policy.max_attempts,
                        ?next_delay,
                        error = %error,
                        "Registration attempt failed, retrying"
                    );
                    std::future::ready(())
                },
            )
            .await
    }

    async fn send<T>(
        &self,
        transport: &T,
        phase: RegistrationPhase,
        topic: &str,
        payload: &[u8],
    ) -> Result<(), RegistrationError>
    where
        T: RegistrationTransport + ?Sized,
    {
        transport
            .publish(topic, payload)
            .await
            .map_err(|source: TransportError| {
                error!(
                    %phase,
                    next = %RegistrationPhase::Failed,
                    topic,
                    error = %source,
                    "Registration publish failed"
                );
                RegistrationError::Publish { phase, source }
            })
    }
}

fn controller_identity(model: &ManifestModel) -> Result<&ControllerInfo, RegistrationError> {
    model
        .controller()
        .filter(|c| !c.unique_id.is_empty())
        .ok_or(RegistrationError::MissingControllerIdentity)
}

async fn pace(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
