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

// src/errors.rs
// Error types for the registration protocol and its transports.
//
// TransportError covers a single publish; RegistrationError covers a
// whole registration attempt and records which phase it died in.

use std::time::Duration;

use rumqttc::ClientError;
use thiserror::Error;

use crate::protocol::RegistrationPhase;

#[derive(Debug, Error)]
pub enum TransportError {
    // Client is returned when the request could not even be queued
    // to the MQTT event loop.
    #[error("MQTT client error: {0}")]
    Client(#[from] ClientError),

    // Connection is reported by the event loop while the publish
    // was waiting for hand-off.
    #[error("MQTT connection error: {0}")]
    Connection(String),

    #[error("publish to '{topic}' was not handed off within {timeout:?}")]
    Timeout { topic: String, timeout: Duration },

    #[error("transport event loop has shut down")]
    Closed,

    #[error("publish to '{topic}' was rejected: {reason}")]
    Rejected { topic: String, reason: String },
}

impl TransportError {
    pub fn rejected(topic: impl Into<String>, reason: impl Into<String>) -> Self {
        TransportError::Rejected {
            topic: topic.into(),
            reason: reason.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout { .. })
    }

    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            TransportError::Client(_) | TransportError::Connection(_) | TransportError::Closed
        )
    }
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("controller identity is missing a unique_id; call set_controller_info first")]
    MissingControllerIdentity,

    #[error("failed to serialize {payload} payload: {source}")]
    Serialization {
        payload: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("registration failed during {phase}: {source}")]
    Publish {
        phase: RegistrationPhase,
        #[source]
        source: TransportError,
    },
}

impl RegistrationError {
    pub fn serialization(payload: &'static str, source: serde_json::Error) -> Self {
        RegistrationError::Serialization { payload, source }
    }

    // is_transport_error is true for failures a later attempt could
    // plausibly get past.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, RegistrationError::Publish { .. })
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, RegistrationError::MissingControllerIdentity)
    }

    // failed_phase returns the phase the sequence was in when the
    // transport gave up, if the failure came from the transport.
    pub fn failed_phase(&self) -> Option<RegistrationPhase> {
        match self {
            RegistrationError::Publish { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}
