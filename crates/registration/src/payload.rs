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

// src/payload.rs
// Wire payloads published during registration.
//
// The coordinator accepts a controller payload in a full form (with an
// embedded capability summary) or a minimal form, followed by one
// device payload per device.

use manifest::{ControllerInfo, Device, ManifestModel, Topic};
use serde::Serialize;

use crate::config::{HardwareProfile, RegistrationConfig};

// DeviceSummary is one entry of the capability summary embedded in
// the full controller payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeviceSummary<'a> {
    pub device_id: &'a str,
    pub device_type: &'a str,
    pub friendly_name: &'a str,
    // device_category is always present; legacy devices send null.
    pub device_category: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_type: Option<&'a str>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CapabilitySummary<'a> {
    pub controller_id: &'a str,
    pub firmware_version: &'a str,
    pub devices: Vec<DeviceSummary<'a>>,
}

// MinimalControllerPayload carries identity and routing only. The full
// payload flattens it and adds the hardware profile and the summary,
// so both forms always agree on the shared fields.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MinimalControllerPayload<'a> {
    pub controller_id: &'a str,
    pub room_id: &'a str,
    pub friendly_name: &'a str,
    pub hardware_type: &'a str,
    pub firmware_version: &'a str,
    pub device_count: usize,
    pub mqtt_namespace: &'a str,
    pub mqtt_room_id: &'a str,
    pub mqtt_controller_id: &'a str,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FullControllerPayload<'a> {
    #[serde(flatten)]
    pub identity: MinimalControllerPayload<'a>,
    pub mcu_model: &'a str,
    pub clock_speed_mhz: u32,
    pub digital_pins_total: u32,
    pub analog_pins_total: u32,
    pub heartbeat_interval_ms: u64,
    pub controller_type: &'a str,
    pub capability_manifest: CapabilitySummary<'a>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeviceTopic<'a> {
    pub topic: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_type: Option<&'a str>,
}

// DevicePayload is the per-device registration message: the device
// record plus its position and the topics that belong to it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DevicePayload<'a> {
    pub controller_id: &'a str,
    pub device_index: usize,
    #[serde(flatten)]
    pub device: &'a Device,
    pub mqtt_topics: Vec<DeviceTopic<'a>>,
}

impl<'a> MinimalControllerPayload<'a> {
    pub fn new(
        controller: &'a ControllerInfo,
        model: &ManifestModel,
        config: &'a RegistrationConfig,
    ) -> Self {
        Self {
            controller_id: &controller.unique_id,
            room_id: &config.room_uuid,
            friendly_name: &controller.friendly_name,
            hardware_type: &config.hardware.hardware_type,
            firmware_version: &controller.firmware_version,
            device_count: model.device_count(),
            mqtt_namespace: &config.mqtt_namespace,
            mqtt_room_id: &controller.room_id,
            mqtt_controller_id: &controller.controller_id,
        }
    }
}

impl<'a> FullControllerPayload<'a> {
    pub fn new(
        controller: &'a ControllerInfo,
        model: &'a ManifestModel,
        config: &'a RegistrationConfig,
    ) -> Self {
        let hardware: &'a HardwareProfile = &config.hardware;
        let heartbeat_interval_ms =
            u64::try_from(hardware.heartbeat_interval.as_millis()).unwrap_or(u64::MAX);

        Self {
            identity: MinimalControllerPayload::new(controller, model, config),
            mcu_model: &hardware.mcu_model,
            clock_speed_mhz: hardware.clock_speed_mhz,
            digital_pins_total: hardware.digital_pins_total,
            analog_pins_total: hardware.analog_pins_total,
            heartbeat_interval_ms,
            controller_type: &hardware.controller_type,
            capability_manifest: CapabilitySummary {
                controller_id: &controller.unique_id,
                firmware_version: &controller.firmware_version,
                devices: model.devices().iter().map(DeviceSummary::from).collect(),
            },
        }
    }
}

impl<'a> From<&'a Device> for DeviceSummary<'a> {
    fn from(device: &'a Device) -> Self {
        Self {
            device_id: &device.device_id,
            device_type: &device.device_type,
            friendly_name: &device.friendly_name,
            device_category: device.device_category.as_deref(),
            action_type: device.action_type.as_deref(),
        }
    }
}

impl<'a> From<&'a Topic> for DeviceTopic<'a> {
    fn from(topic: &'a Topic) -> Self {
        Self {
            topic: &topic.topic,
            topic_type: topic.topic_type.as_deref(),
        }
    }
}

impl<'a> DevicePayload<'a> {
    // new collects the device's topics by exact device_id match, in
    // the order they were added to the model.
    pub fn new(
        controller: &'a ControllerInfo,
        model: &'a ManifestModel,
        device_index: usize,
        device: &'a Device,
    ) -> Self {
        Self {
            controller_id: &controller.unique_id,
            device_index,
            device,
            mqtt_topics: model
                .topics_for_device(&device.device_id)
                .map(DeviceTopic::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_is_a_subset_of_full() {
        let controller = ControllerInfo::new("clock", "Clock", "2.3.0", "clockwork", "clock");
        let mut model = ManifestModel::new();
        model.set_controller_info(controller.clone());
        model
            .add_device(Device::new("gears", "Gears", "stepper", "output"))
            .unwrap();
        let config = RegistrationConfig::default();

        let full = serde_json::to_value(FullControllerPayload::new(&controller, &model, &config))
            .unwrap();
        let minimal =
            serde_json::to_value(MinimalControllerPayload::new(&controller, &model, &config))
                .unwrap();

        for (key, value) in minimal.as_object().unwrap() {
            assert_eq!(full.get(key), Some(value), "field {key} differs");
        }
        assert!(full.get("capability_manifest").is_some());
        assert!(minimal.get("capability_manifest").is_none());
    }
}
