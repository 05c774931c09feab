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

// src/model.rs
// Entity types held by a ManifestModel.
//
// Field names (and their serde renames) are the wire names the
// coordinating service expects, so these types serialize directly
// into the manifest document and the registration payloads.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// non_empty treats empty strings the same as absent values, which
// is how optional device fields have always been interpreted.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ControllerInfo is the identity block of a controller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerInfo {
    // unique_id is the stable identifier the coordinator keys on;
    // it must be non-empty before registration.
    pub unique_id: String,
    #[serde(default)]
    pub friendly_name: String,
    #[serde(default)]
    pub firmware_version: String,
    // room_id and controller_id are the MQTT routing segments, not
    // database identifiers.
    #[serde(default)]
    pub room_id: String,
    #[serde(default)]
    pub controller_id: String,
}

impl ControllerInfo {
    pub fn new(
        unique_id: impl Into<String>,
        friendly_name: impl Into<String>,
        firmware_version: impl Into<String>,
        room_id: impl Into<String>,
        controller_id: impl Into<String>,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            friendly_name: friendly_name.into(),
            firmware_version: firmware_version.into(),
            room_id: room_id.into(),
            controller_id: controller_id.into(),
        }
    }
}

// Pin is a physical pin designation, either a number or a
// board label such as "A0".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pin {
    Number(u32),
    Label(String),
}

impl From<u32> for Pin {
    fn from(pin: u32) -> Self {
        Pin::Number(pin)
    }
}

impl From<&str> for Pin {
    fn from(label: &str) -> Self {
        Pin::Label(label.to_string())
    }
}

// ParamValue is a scalar used for parameter defaults and device
// properties. The type tags on parameters are descriptive only and
// are not checked against these values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

// Device is one controllable or sensing unit. The position of a
// device in the model becomes its transmitted device_index.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Device {
    pub device_id: String,
    pub friendly_name: String,
    pub device_type: String,
    // device_category is only absent for devices declared through
    // the legacy pin-based form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(
        rename = "device_command_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub primary_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<Pin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin_type: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, ParamValue>,
}

impl Device {
    pub fn new(
        device_id: impl Into<String>,
        friendly_name: impl Into<String>,
        device_type: impl Into<String>,
        device_category: impl Into<String>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            friendly_name: friendly_name.into(),
            device_type: device_type.into(),
            device_category: non_empty(Some(device_category.into())),
            action_type: None,
            primary_command: None,
            pin: None,
            pin_type: None,
            properties: BTreeMap::new(),
        }
    }

    // legacy builds a device the way older firmware declared them:
    // by type and pin, without a category.
    pub fn legacy(
        device_id: impl Into<String>,
        device_type: impl Into<String>,
        friendly_name: impl Into<String>,
        pin: impl Into<Pin>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            friendly_name: friendly_name.into(),
            device_type: device_type.into(),
            device_category: None,
            action_type: None,
            primary_command: None,
            pin: Some(pin.into()),
            pin_type: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_action_type(mut self, action_type: impl Into<String>) -> Self {
        self.action_type = non_empty(Some(action_type.into()));
        self
    }

    pub fn with_primary_command(mut self, command: impl Into<String>) -> Self {
        self.primary_command = non_empty(Some(command.into()));
        self
    }

    pub fn set_pin(&mut self, pin: impl Into<Pin>) -> &mut Self {
        self.pin = Some(pin.into());
        self
    }

    pub fn set_pin_type(&mut self, pin_type: impl Into<String>) -> &mut Self {
        self.pin_type = Some(pin_type.into());
        self
    }

    // set_property inserts or replaces a descriptive property.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

// Topic is a published MQTT topic. Device topics carry a device_id
// and a topic_type; controller-level topics carry a message_type and
// an optional publish interval instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Topic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_interval_ms: Option<u64>,
}

impl Topic {
    pub fn for_device(
        device_id: impl Into<String>,
        topic: impl Into<String>,
        topic_type: impl Into<String>,
    ) -> Self {
        Self {
            device_id: Some(device_id.into()),
            topic: topic.into(),
            topic_type: Some(topic_type.into()),
            message_type: None,
            publish_interval_ms: None,
        }
    }

    // publish builds a controller-level topic. A zero interval is
    // treated as "not periodic".
    pub fn publish(
        topic: impl Into<String>,
        message_type: impl Into<String>,
        interval: Option<Duration>,
    ) -> Self {
        let publish_interval_ms = interval
            .map(|i| u64::try_from(i.as_millis()).unwrap_or(u64::MAX))
            .filter(|ms| *ms > 0);
        Self {
            device_id: None,
            topic: topic.into(),
            topic_type: None,
            message_type: Some(message_type.into()),
            publish_interval_ms,
        }
    }

    // belongs_to is an exact string match on device_id.
    pub fn belongs_to(&self, device_id: &str) -> bool {
        self.device_id.as_deref() == Some(device_id)
    }
}

// Parameter describes one argument of a command topic or action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(
        rename = "default",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_value: Option<ParamValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, param_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            required: false,
            min: None,
            max: None,
            default_value: None,
            description: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn with_default(mut self, value: impl Into<ParamValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// SubscribeTopicSpec is the schema of a command topic the controller
// listens on.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubscribeTopicSpec {
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_critical: Option<bool>,
}

// ActionSpec is a rich, possibly timed operation with its own
// parameter schema.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActionSpec {
    pub action_id: String,
    pub friendly_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mqtt_topic: Option<String>,
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_interrupt: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_critical: Option<bool>,
}

// DeviceAction is the flat action form: a named action on a device
// with a single parameter type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeviceAction {
    pub device_id: String,
    pub action_name: String,
    pub param_type: String,
    pub description: String,
}

// ActionEntry keeps both action forms in one ordered list; they
// share the "actions" array of the document.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionEntry {
    Device(DeviceAction),
    Spec(ActionSpec),
}

impl ActionEntry {
    pub fn as_spec(&self) -> Option<&ActionSpec> {
        match self {
            ActionEntry::Spec(spec) => Some(spec),
            ActionEntry::Device(_) => None,
        }
    }

    pub fn as_device_action(&self) -> Option<&DeviceAction> {
        match self {
            ActionEntry::Device(action) => Some(action),
            ActionEntry::Spec(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_optional_device_fields_are_absent() {
        let device = Device::new("fog", "Fog Machine", "relay", "output")
            .with_action_type("")
            .with_primary_command("");
        assert_eq!(device.action_type, None);
        assert_eq!(device.primary_command, None);
    }

    #[test]
    fn test_zero_publish_interval_is_dropped() {
        let topic = Topic::publish("sentient/heartbeat", "heartbeat", Some(Duration::ZERO));
        assert_eq!(topic.publish_interval_ms, None);

        let topic = Topic::publish("sentient/heartbeat", "heartbeat", Some(Duration::from_secs(5)));
        assert_eq!(topic.publish_interval_ms, Some(5000));
    }

    #[test]
    fn test_topic_belongs_to_is_exact() {
        let topic = Topic::for_device("laser", "paragon/clockwork/laser/state", "state");
        assert!(topic.belongs_to("laser"));
        assert!(!topic.belongs_to("laser_light"));
        assert!(!topic.belongs_to("LASER"));
    }
}
