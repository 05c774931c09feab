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

// src/definition.rs
// File-based manifest definitions.
//
// A ManifestDefinition declares a controller's catalogue as data
// (TOML, YAML or JSON). into_model() replays it through the regular
// ManifestModel API, so the same capacity checks and ordering rules
// apply as for firmware that builds its manifest in code.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::errors::ManifestError;
use crate::manifest::{DEFAULT_ENTRY_LIMIT, ManifestModel};
use crate::model::{ControllerInfo, Device, ParamValue, Parameter, Pin};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefinitionFormat {
    Toml,
    Yaml,
    Json,
}

impl DefinitionFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Some(DefinitionFormat::Toml),
            Some("yaml") | Some("yml") => Some(DefinitionFormat::Yaml),
            Some("json") => Some(DefinitionFormat::Json),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestDefinition {
    pub controller: ControllerInfo,
    #[serde(default)]
    pub devices: Vec<DeviceDefinition>,
    #[serde(default)]
    pub publish_topics: Vec<PublishTopicDefinition>,
    #[serde(default)]
    pub subscribe_topics: Vec<SubscribeTopicDefinition>,
    #[serde(default)]
    pub actions: Vec<ActionDefinition>,
}

// DeviceDefinition nests the device's own topics and flat actions,
// which are attached with the device's id when the model is built.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceDefinition {
    pub device_id: String,
    pub friendly_name: String,
    pub device_type: String,
    #[serde(default)]
    pub device_category: Option<String>,
    #[serde(default)]
    pub action_type: Option<String>,
    #[serde(default)]
    pub primary_command: Option<String>,
    #[serde(default)]
    pub pin: Option<Pin>,
    #[serde(default)]
    pub pin_type: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, ParamValue>,
    #[serde(default)]
    pub topics: Vec<DeviceTopicDefinition>,
    #[serde(default)]
    pub actions: Vec<DeviceActionDefinition>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceTopicDefinition {
    pub topic: String,
    pub topic_type: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceActionDefinition {
    pub action_name: String,
    pub param_type: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublishTopicDefinition {
    pub topic: String,
    pub message_type: String,
    #[serde(default)]
    pub interval_ms: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubscribeTopicDefinition {
    pub topic: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub safety_critical: Option<bool>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionDefinition {
    pub action_id: String,
    pub friendly_name: String,
    #[serde(default)]
    pub mqtt_topic: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub can_interrupt: Option<bool>,
    #[serde(default)]
    pub safety_critical: Option<bool>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl ManifestDefinition {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let display_path = path.to_string_lossy().to_string();
        let format = DefinitionFormat::from_path(path)
            .ok_or_else(|| ManifestError::UnsupportedFormat(display_path.clone()))?;
        let contents =
            std::fs::read_to_string(path).map_err(|error| ManifestError::CouldNotRead {
                path: display_path.clone(),
                error,
            })?;
        Self::parse(&contents, format).map_err(|reason| ManifestError::InvalidDefinition {
            path: display_path,
            reason,
        })
    }

    // parse returns the parser's message on failure so load() can
    // attach the path it came from.
    pub fn parse(contents: &str, format: DefinitionFormat) -> Result<Self, String> {
        match format {
            DefinitionFormat::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
            DefinitionFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
            DefinitionFormat::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
        }
    }

    pub fn into_model(self) -> Result<ManifestModel, ManifestError> {
        self.into_model_with_limit(DEFAULT_ENTRY_LIMIT)
    }

    pub fn into_model_with_limit(self, entry_limit: usize) -> Result<ManifestModel, ManifestError> {
        let mut model = ManifestModel::with_entry_limit(entry_limit);
        debug!(
            "Building manifest for '{}' from definition ({} devices)",
            self.controller.unique_id,
            self.devices.len()
        );
        model.set_controller_info(self.controller);

        for definition in self.devices {
            add_device_definition(&mut model, definition)?;
        }

        for topic in self.publish_topics {
            model.add_publish_topic(
                topic.topic,
                topic.message_type,
                topic.interval_ms.map(Duration::from_millis),
            )?;
        }

        for subscribe in self.subscribe_topics {
            let mut builder =
                model.begin_subscribe_topic(subscribe.topic, subscribe.description.as_deref())?;
            for parameter in subscribe.parameters {
                builder = builder.parameter(parameter)?;
            }
            if let Some(critical) = subscribe.safety_critical {
                builder = builder.safety_critical(critical);
            }
            builder.end();
        }

        for action in self.actions {
            let ActionDefinition {
                action_id,
                friendly_name,
                mqtt_topic,
                description,
                duration_ms,
                can_interrupt,
                safety_critical,
                parameters,
            } = action;

            let mut builder = model.begin_action(action_id, friendly_name, mqtt_topic.as_deref())?;
            if let Some(description) = description {
                builder = builder.description(description);
            }
            if let Some(ms) = duration_ms {
                builder = builder.duration(Duration::from_millis(ms));
            }
            if let Some(can_interrupt) = can_interrupt {
                builder = builder.can_interrupt(can_interrupt);
            }
            if let Some(critical) = safety_critical {
                builder = builder.safety_critical(critical);
            }
            for parameter in parameters {
                builder = builder.parameter(parameter)?;
            }
            builder.end();
        }

        Ok(model)
    }
}

fn add_device_definition(
    model: &mut ManifestModel,
    definition: DeviceDefinition,
) -> Result<(), ManifestError> {
    let mut device = Device::new(
        definition.device_id.clone(),
        definition.friendly_name,
        definition.device_type,
        definition.device_category.unwrap_or_default(),
    );
    if let Some(action_type) = definition.action_type {
        device = device.with_action_type(action_type);
    }
    if let Some(command) = definition.primary_command {
        device = device.with_primary_command(command);
    }

    let handle = model.add_device(device)?;
    let device = model.device_mut(handle)?;
    if let Some(pin) = definition.pin {
        device.set_pin(pin);
    }
    if let Some(pin_type) = definition.pin_type {
        device.set_pin_type(pin_type);
    }
    for (key, value) in definition.properties {
        device.set_property(key, value);
    }

    for topic in definition.topics {
        model.add_device_topic(definition.device_id.clone(), topic.topic, topic.topic_type)?;
    }
    for action in definition.actions {
        model.add_device_action(
            definition.device_id.clone(),
            action.action_name,
            action.param_type,
            action.description,
        )?;
    }
    Ok(())
}
