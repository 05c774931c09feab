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

// src/builders.rs
// Scoped builders for subscribe topic and action schemas.
//
// A builder is handed out by ManifestModel::begin_subscribe_topic or
// ManifestModel::begin_action after the entry has already been appended,
// and it edits exactly that entry. Because it borrows the model mutably,
// the compiler rules out a second open scope or an unrelated write
// landing on the wrong entry. end() just releases the borrow; dropping
// the builder early leaves whatever was set so far in place.

use std::time::Duration;

use crate::errors::{EntryKind, ManifestError};
use crate::manifest::ManifestModel;
use crate::model::{ActionSpec, Parameter, SubscribeTopicSpec};

pub struct SubscribeTopicBuilder<'a> {
    model: &'a mut ManifestModel,
    index: usize,
}

impl<'a> SubscribeTopicBuilder<'a> {
    pub(crate) fn new(model: &'a mut ManifestModel, index: usize) -> Self {
        Self { model, index }
    }

    fn spec(&mut self) -> &mut SubscribeTopicSpec {
        self.model
            .subscribe_topic_at_mut(self.index)
            .unwrap_or_else(|| unreachable!("builder index always refers to its own topic"))
    }

    pub fn parameter(mut self, parameter: Parameter) -> Result<Self, ManifestError> {
        self.model.reserve_entry(EntryKind::Parameter)?;
        self.spec().parameters.push(parameter);
        Ok(self)
    }

    pub fn safety_critical(mut self, critical: bool) -> Self {
        self.spec().safety_critical = Some(critical);
        self
    }

    pub fn end(self) {}
}

pub struct ActionBuilder<'a> {
    model: &'a mut ManifestModel,
    index: usize,
}

impl<'a> ActionBuilder<'a> {
    pub(crate) fn new(model: &'a mut ManifestModel, index: usize) -> Self {
        Self { model, index }
    }

    fn spec(&mut self) -> &mut ActionSpec {
        self.model
            .action_spec_at_mut(self.index)
            .unwrap_or_else(|| unreachable!("builder index always refers to its own action"))
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.spec().description = Some(description.into());
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.spec().duration_ms = Some(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn can_interrupt(mut self, can_interrupt: bool) -> Self {
        self.spec().can_interrupt = Some(can_interrupt);
        self
    }

    pub fn safety_critical(mut self, critical: bool) -> Self {
        self.spec().safety_critical = Some(critical);
        self
    }

    pub fn parameter(mut self, parameter: Parameter) -> Result<Self, ManifestError> {
        self.model.reserve_entry(EntryKind::Parameter)?;
        self.spec().parameters.push(parameter);
        Ok(self)
    }

    pub fn end(self) {}
}
