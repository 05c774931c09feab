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

// src/config.rs
// Configuration for registration and for the MQTT broker connection.
//
// Values come from (lowest to highest precedence) the built-in
// defaults, an optional TOML file, and SENTIENT_ prefixed environment
// variables using "__" to reach nested keys, e.g.
// SENTIENT_REGISTRATION__SIZE_THRESHOLD_BYTES=1500.

use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use rumqttc::QoS;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::transport::options::{ClientCredentials, MqttTransportOptions};

pub const DEFAULT_CONTROLLER_TOPIC: &str = "sentient/system/register/controller";
pub const DEFAULT_DEVICE_TOPIC: &str = "sentient/system/register/device";
// DEFAULT_SIZE_THRESHOLD_BYTES sits just under the ~2 KiB per-socket
// transmit buffer of the controllers' Ethernet chip.
pub const DEFAULT_SIZE_THRESHOLD_BYTES: usize = 2000;
pub const DEFAULT_MQTT_PORT: u16 = 1883;
const ENV_PREFIX: &str = "SENTIENT_";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config file does not exist: {0}")]
    MissingFile(String),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
    #[error("unsupported broker URL scheme '{0}' (expected mqtt:// or tcp://)")]
    UnsupportedScheme(String),
    #[error("broker URL has no host: {0}")]
    MissingHost(String),
}

// QosLevel is the serde-friendly spelling of an MQTT QoS.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QosLevel {
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

impl From<QosLevel> for QoS {
    fn from(level: QosLevel) -> Self {
        match level {
            QosLevel::AtMostOnce => QoS::AtMostOnce,
            QosLevel::AtLeastOnce => QoS::AtLeastOnce,
            QosLevel::ExactlyOnce => QoS::ExactlyOnce,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub registration: RegistrationConfig,
    #[serde(default)]
    pub broker: BrokerConfig,
}

// HardwareProfile holds the descriptive constants sent in the
// controller payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HardwareProfile {
    #[serde(default = "Defaults::hardware_type")]
    pub hardware_type: String,
    #[serde(default = "Defaults::mcu_model")]
    pub mcu_model: String,
    #[serde(default = "Defaults::clock_speed_mhz")]
    pub clock_speed_mhz: u32,
    #[serde(default = "Defaults::digital_pins_total")]
    pub digital_pins_total: u32,
    #[serde(default = "Defaults::analog_pins_total")]
    pub analog_pins_total: u32,
    #[serde(default = "Defaults::heartbeat_interval", with = "humantime_serde")]
    pub heartbeat_interval: Duration,
    #[serde(default = "Defaults::controller_type")]
    pub controller_type: String,
}

// RetryPolicy decides whether a failed registration is re-run. The
// default of one attempt means no retry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RetryPolicy {
    #[serde(default = "Defaults::max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "Defaults::retry_backoff", with = "humantime_serde")]
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Defaults::retry_backoff(),
        }
    }

    pub fn retries(&self) -> u32 {
        self.max_attempts.saturating_sub(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistrationConfig {
    #[serde(default = "Defaults::controller_topic")]
    pub controller_topic: String,
    #[serde(default = "Defaults::device_topic")]
    pub device_topic: String,
    // size_threshold_bytes is compared against the full controller
    // payload; anything strictly larger is sent in minimal form.
    #[serde(default = "Defaults::size_threshold_bytes")]
    pub size_threshold_bytes: usize,
    #[serde(default = "Defaults::controller_pacing", with = "humantime_serde")]
    pub controller_pacing: Duration,
    #[serde(default = "Defaults::device_pacing", with = "humantime_serde")]
    pub device_pacing: Duration,
    #[serde(default = "Defaults::mqtt_namespace")]
    pub mqtt_namespace: String,
    // room_uuid is the coordinator's database id for the room, sent
    // as room_id. The MQTT room segment comes from the manifest.
    #[serde(default)]
    pub room_uuid: String,
    #[serde(default)]
    pub hardware: HardwareProfile,
    #[serde(default)]
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrokerConfig {
    #[serde(default = "Defaults::broker_url")]
    pub url: Url,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "Defaults::keep_alive", with = "humantime_serde")]
    pub keep_alive: Duration,
    #[serde(default = "Defaults::qos")]
    pub qos: QosLevel,
    #[serde(default)]
    pub retain: bool,
    // publish_timeout bounds the wait for hand-off of one publish.
    // Unset means wait as long as the connection does.
    #[serde(default, with = "humantime_serde")]
    pub publish_timeout: Option<Duration>,
    #[serde(default = "Defaults::channel_capacity")]
    pub channel_capacity: usize,
    #[serde(default = "Defaults::reconnect_delay", with = "humantime_serde")]
    pub reconnect_delay: Duration,
}

pub struct Defaults;

impl Defaults {
    pub fn controller_topic() -> String {
        DEFAULT_CONTROLLER_TOPIC.to_string()
    }
    pub fn device_topic() -> String {
        DEFAULT_DEVICE_TOPIC.to_string()
    }
    pub fn size_threshold_bytes() -> usize {
        DEFAULT_SIZE_THRESHOLD_BYTES
    }
    pub fn controller_pacing() -> Duration {
        Duration::from_millis(100)
    }
    pub fn device_pacing() -> Duration {
        Duration::from_millis(50)
    }
    pub fn mqtt_namespace() -> String {
        "paragon".to_string()
    }
    pub fn hardware_type() -> String {
        "Teensy 4.1".to_string()
    }
    pub fn mcu_model() -> String {
        "ARM Cortex-M7".to_string()
    }
    pub fn clock_speed_mhz() -> u32 {
        600
    }
    pub fn digital_pins_total() -> u32 {
        55
    }
    pub fn analog_pins_total() -> u32 {
        18
    }
    pub fn heartbeat_interval() -> Duration {
        Duration::from_millis(5000)
    }
    pub fn controller_type() -> String {
        "microcontroller".to_string()
    }
    pub fn max_attempts() -> u32 {
        1
    }
    pub fn retry_backoff() -> Duration {
        Duration::from_secs(2)
    }
    pub fn broker_url() -> Url {
        Url::parse("mqtt://localhost:1883").expect("BUG: default broker URL is invalid")
    }
    pub fn keep_alive() -> Duration {
        Duration::from_secs(60)
    }
    pub fn qos() -> QosLevel {
        QosLevel::AtLeastOnce
    }
    pub fn channel_capacity() -> usize {
        10
    }
    pub fn reconnect_delay() -> Duration {
        Duration::from_secs(1)
    }
}

impl Default for HardwareProfile {
    fn default() -> Self {
        Self {
            hardware_type: Defaults::hardware_type(),
            mcu_model: Defaults::mcu_model(),
            clock_speed_mhz: Defaults::clock_speed_mhz(),
            digital_pins_total: Defaults::digital_pins_total(),
            analog_pins_total: Defaults::analog_pins_total(),
            heartbeat_interval: Defaults::heartbeat_interval(),
            controller_type: Defaults::controller_type(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            controller_topic: Defaults::controller_topic(),
            device_topic: Defaults::device_topic(),
            size_threshold_bytes: Defaults::size_threshold_bytes(),
            controller_pacing: Defaults::controller_pacing(),
            device_pacing: Defaults::device_pacing(),
            mqtt_namespace: Defaults::mqtt_namespace(),
            room_uuid: String::new(),
            hardware: HardwareProfile::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: Defaults::broker_url(),
            client_id: None,
            username: None,
            password: None,
            keep_alive: Defaults::keep_alive(),
            qos: Defaults::qos(),
            retain: false,
            publish_timeout: None,
            channel_capacity: Defaults::channel_capacity(),
            reconnect_delay: Defaults::reconnect_delay(),
        }
    }
}

impl Config {
    // load merges defaults, the optional TOML file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::MissingFile(path.to_string_lossy().to_string()));
            }
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }
}

impl BrokerConfig {
    // endpoint returns the host and port to connect to.
    pub fn endpoint(&self) -> Result<(String, u16), ConfigError> {
        match self.url.scheme() {
            "mqtt" | "tcp" => {}
            other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
        let host = self
            .url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ConfigError::MissingHost(self.url.to_string()))?;
        Ok((host.to_string(), self.url.port().unwrap_or(DEFAULT_MQTT_PORT)))
    }

    // transport_options builds runtime options for MqttTransport. The
    // fallback client id is used when none is configured.
    pub fn transport_options(
        &self,
        fallback_client_id: &str,
    ) -> Result<MqttTransportOptions, ConfigError> {
        let (host, port) = self.endpoint()?;
        let client_id = self
            .client_id
            .clone()
            .unwrap_or_else(|| fallback_client_id.to_string());

        let mut options = MqttTransportOptions::new(host, port, client_id)
            .with_keep_alive(self.keep_alive)
            .with_qos(self.qos.into())
            .with_retain(self.retain)
            .with_channel_capacity(self.channel_capacity)
            .with_reconnect_delay(self.reconnect_delay);
        if let Some(timeout) = self.publish_timeout {
            options = options.with_publish_timeout(timeout);
        }
        if let Some(username) = &self.username {
            options = options.with_credentials(ClientCredentials {
                username: username.clone(),
                password: self.password.clone().unwrap_or_default(),
            });
        }
        Ok(options)
    }
}
