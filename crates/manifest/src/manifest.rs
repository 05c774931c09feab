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

// src/manifest.rs
// ManifestModel: the append-only catalogue of a controller's declared
// capabilities, and its rendering into a structured document.

use std::time::Duration;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::builders::{ActionBuilder, SubscribeTopicBuilder};
use crate::errors::{EntryKind, ManifestError};
use crate::model::{
    ActionEntry, ActionSpec, ControllerInfo, Device, DeviceAction, SubscribeTopicSpec, Topic,
};

// DEFAULT_ENTRY_LIMIT bounds the number of entries (devices, topics,
// subscribe topics, actions and parameters) a model will accept.
pub const DEFAULT_ENTRY_LIMIT: usize = 512;

// DeviceHandle identifies a device inside the model that created it,
// so follow-up edits target that device explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DeviceHandle(usize);

impl DeviceHandle {
    // index is the device's insertion position, which is also the
    // device_index it is registered under.
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct ManifestModel {
    controller: Option<ControllerInfo>,
    devices: Vec<Device>,
    publish_topics: Vec<Topic>,
    subscribe_topics: Vec<SubscribeTopicSpec>,
    actions: Vec<ActionEntry>,
    entry_limit: usize,
    entry_count: usize,
}

impl Default for ManifestModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestModel {
    pub fn new() -> Self {
        Self::with_entry_limit(DEFAULT_ENTRY_LIMIT)
    }

    pub fn with_entry_limit(entry_limit: usize) -> Self {
        Self {
            controller: None,
            devices: Vec::new(),
            publish_topics: Vec::new(),
            subscribe_topics: Vec::new(),
            actions: Vec::new(),
            entry_limit,
            entry_count: 0,
        }
    }

    // reserve_entry claims one slot of the entry budget, or fails
    // without touching the model.
    pub(crate) fn reserve_entry(&mut self, kind: EntryKind) -> Result<(), ManifestError> {
        if self.entry_count >= self.entry_limit {
            return Err(ManifestError::CapacityExceeded {
                kind,
                limit: self.entry_limit,
            });
        }
        self.entry_count += 1;
        Ok(())
    }

    // set_controller_info stores the controller identity. Calling it
    // again replaces the previous identity.
    pub fn set_controller_info(&mut self, info: ControllerInfo) {
        if let Some(previous) = &self.controller {
            debug!(
                "Replacing controller info '{}' with '{}'",
                previous.unique_id, info.unique_id
            );
        }
        self.controller = Some(info);
    }

    pub fn add_device(&mut self, device: Device) -> Result<DeviceHandle, ManifestError> {
        self.reserve_entry(EntryKind::Device)?;
        // Duplicates are accepted; they only make per-device topic
        // association ambiguous.
        if self.devices.iter().any(|d| d.device_id == device.device_id) {
            warn!(
                "Device id '{}' is already in the manifest; topics will match both entries",
                device.device_id
            );
        }
        self.devices.push(device);
        Ok(DeviceHandle(self.devices.len() - 1))
    }

    pub fn device(&self, handle: DeviceHandle) -> Option<&Device> {
        self.devices.get(handle.0)
    }

    pub fn device_mut(&mut self, handle: DeviceHandle) -> Result<&mut Device, ManifestError> {
        self.devices
            .get_mut(handle.0)
            .ok_or(ManifestError::UnknownDevice(handle.0))
    }

    // add_device_topic associates a published topic with a device id.
    // The id is matched by string at serialization time and does not
    // need to exist yet.
    pub fn add_device_topic(
        &mut self,
        device_id: impl Into<String>,
        topic: impl Into<String>,
        topic_type: impl Into<String>,
    ) -> Result<(), ManifestError> {
        self.reserve_entry(EntryKind::PublishTopic)?;
        self.publish_topics
            .push(Topic::for_device(device_id, topic, topic_type));
        Ok(())
    }

    pub fn add_publish_topic(
        &mut self,
        topic: impl Into<String>,
        message_type: impl Into<String>,
        interval: Option<Duration>,
    ) -> Result<(), ManifestError> {
        self.reserve_entry(EntryKind::PublishTopic)?;
        self.publish_topics
            .push(Topic::publish(topic, message_type, interval));
        Ok(())
    }

    pub fn add_device_action(
        &mut self,
        device_id: impl Into<String>,
        action_name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<(), ManifestError> {
        self.reserve_entry(EntryKind::Action)?;
        self.actions.push(ActionEntry::Device(DeviceAction {
            device_id: device_id.into(),
            action_name: action_name.into(),
            param_type: param_type.into(),
            description: description.into(),
        }));
        Ok(())
    }

    // begin_subscribe_topic appends a command topic schema and returns
    // a builder scoped to it. The builder holds the model mutably, so
    // no other scope can be open at the same time.
    pub fn begin_subscribe_topic(
        &mut self,
        topic: impl Into<String>,
        description: Option<&str>,
    ) -> Result<SubscribeTopicBuilder<'_>, ManifestError> {
        self.reserve_entry(EntryKind::SubscribeTopic)?;
        self.subscribe_topics.push(SubscribeTopicSpec {
            topic: topic.into(),
            description: description.map(str::to_string),
            parameters: Vec::new(),
            safety_critical: None,
        });
        let index = self.subscribe_topics.len() - 1;
        Ok(SubscribeTopicBuilder::new(self, index))
    }

    pub fn begin_action(
        &mut self,
        action_id: impl Into<String>,
        friendly_name: impl Into<String>,
        mqtt_topic: Option<&str>,
    ) -> Result<ActionBuilder<'_>, ManifestError> {
        self.reserve_entry(EntryKind::Action)?;
        self.actions.push(ActionEntry::Spec(ActionSpec {
            action_id: action_id.into(),
            friendly_name: friendly_name.into(),
            mqtt_topic: mqtt_topic.map(str::to_string),
            parameters: Vec::new(),
            description: None,
            duration_ms: None,
            can_interrupt: None,
            safety_critical: None,
        }));
        let index = self.actions.len() - 1;
        Ok(ActionBuilder::new(self, index))
    }

    pub(crate) fn subscribe_topic_at_mut(&mut self, index: usize) -> Option<&mut SubscribeTopicSpec> {
        self.subscribe_topics.get_mut(index)
    }

    pub(crate) fn action_spec_at_mut(&mut self, index: usize) -> Option<&mut ActionSpec> {
        match self.actions.get_mut(index) {
            Some(ActionEntry::Spec(spec)) => Some(spec),
            _ => None,
        }
    }

    pub fn controller(&self) -> Option<&ControllerInfo> {
        self.controller.as_ref()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn publish_topics(&self) -> &[Topic] {
        &self.publish_topics
    }

    // topics_for_device yields, in insertion order, the publish topics
    // whose device_id exactly equals `device_id`.
    pub fn topics_for_device<'a>(&'a self, device_id: &'a str) -> impl Iterator<Item = &'a Topic> {
        self.publish_topics
            .iter()
            .filter(move |topic| topic.belongs_to(device_id))
    }

    pub fn subscribe_topics(&self) -> &[SubscribeTopicSpec] {
        &self.subscribe_topics
    }

    pub fn actions(&self) -> &[ActionEntry] {
        &self.actions
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn entry_limit(&self) -> usize {
        self.entry_limit
    }

    fn document(&self) -> ManifestDocument<'_> {
        ManifestDocument {
            controller: self.controller.as_ref(),
            devices: &self.devices,
            mqtt_topics_publish: &self.publish_topics,
            mqtt_topics_subscribe: &self.subscribe_topics,
            actions: &self.actions,
        }
    }

    // serialize renders the whole model as a structured document.
    // It reads the model only, so repeated calls give equal output.
    pub fn serialize(&self) -> Result<serde_json::Value, ManifestError> {
        Ok(serde_json::to_value(self.document())?)
    }

    pub fn to_json(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string(&self.document())?)
    }

    // to_json_pretty is the diagnostic dump of the model.
    pub fn to_json_pretty(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(&self.document())?)
    }
}

#[derive(Serialize)]
struct ManifestDocument<'a> {
    #[serde(serialize_with = "serialize_controller")]
    controller: Option<&'a ControllerInfo>,
    devices: &'a [Device],
    mqtt_topics_publish: &'a [Topic],
    mqtt_topics_subscribe: &'a [SubscribeTopicSpec],
    actions: &'a [ActionEntry],
}

// An unset controller renders as an empty object rather than null.
fn serialize_controller<S>(
    controller: &Option<&ControllerInfo>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match controller {
        Some(info) => info.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}
