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
// Error types for manifest assembly, serialization and definition loading.

use std::fmt;

use thiserror::Error;

// EntryKind names the kind of entry that was being appended when
// a capacity check failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Device,
    PublishTopic,
    SubscribeTopic,
    Action,
    Parameter,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryKind::Device => "device",
            EntryKind::PublishTopic => "publish topic",
            EntryKind::SubscribeTopic => "subscribe topic",
            EntryKind::Action => "action",
            EntryKind::Parameter => "parameter",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    // CapacityExceeded is returned instead of silently dropping
    // entries once the model holds `limit` entries.
    #[error("manifest too large: cannot add {kind}, entry limit of {limit} reached")]
    CapacityExceeded { kind: EntryKind, limit: usize },

    #[error("no device with handle index {0} in this manifest")]
    UnknownDevice(usize),

    #[error("manifest serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("could not read manifest definition: {path}: {error}")]
    CouldNotRead {
        path: String,
        error: std::io::Error,
    },

    #[error("invalid manifest definition: {path}: {reason}")]
    InvalidDefinition { path: String, reason: String },

    #[error("unsupported manifest definition format: {0} (expected .toml, .yaml, .yml or .json)")]
    UnsupportedFormat(String),
}

impl ManifestError {
    pub fn is_capacity_error(&self) -> bool {
        matches!(self, ManifestError::CapacityExceeded { .. })
    }

    // is_definition_error covers everything that can go wrong while
    // turning a definition file into a model, short of capacity.
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self,
            ManifestError::CouldNotRead { .. }
                | ManifestError::InvalidDefinition { .. }
                | ManifestError::UnsupportedFormat(_)
        )
    }
}
