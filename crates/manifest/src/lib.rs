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
// Main exports for the capability manifest library.
//
// A ManifestModel accumulates everything a controller declares about
// itself (identity, devices, topics, actions) so it can be rendered
// into a registration document.

pub mod builders;
pub mod definition;
pub mod errors;
pub mod manifest;
pub mod model;

// Export some things for convenience.
pub use builders::{ActionBuilder, SubscribeTopicBuilder};
pub use definition::ManifestDefinition;
pub use errors::{EntryKind, ManifestError};
pub use manifest::{DEFAULT_ENTRY_LIMIT, DeviceHandle, ManifestModel};
pub use model::{
    ActionEntry, ActionSpec, ControllerInfo, Device, DeviceAction, ParamValue, Parameter, Pin,
    SubscribeTopicSpec, Topic,
};
