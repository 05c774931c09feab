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

// tests/logging.rs
// Warnings emitted while planning a registration.

use std::io;
use std::sync::{Arc, Mutex};

use manifest::{ControllerInfo, Device, ManifestModel};
use registration::{Registrar, RegistrationConfig};
use tracing::Level;

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn bell_model() -> ManifestModel {
    let mut model = ManifestModel::new();
    model.set_controller_info(ControllerInfo::new(
        "bell",
        "Bell Tower",
        "1.0.0",
        "clockwork",
        "bell",
    ));
    model
        .add_device(Device::new("bell_striker", "Bell Striker", "solenoid", "output"))
        .unwrap();
    model
}

// plan_warnings plans a registration and returns everything logged at
// WARN or above.
fn plan_warnings(config: RegistrationConfig) -> String {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(Level::WARN)
        .finish();

    let registrar = Registrar::new(config);
    let model = bell_model();
    tracing::subscriber::with_default(subscriber, || registrar.plan(&model)).unwrap();
    log.contents()
}

#[test]
fn test_empty_room_uuid_is_warned() {
    let warnings = plan_warnings(RegistrationConfig::default());
    assert!(warnings.contains("No room_uuid configured"), "{warnings}");
    assert!(warnings.contains("controller_id=bell"), "{warnings}");
}

#[test]
fn test_configured_room_uuid_is_quiet() {
    let warnings = plan_warnings(RegistrationConfig {
        room_uuid: "6a3c2f0e-room".to_string(),
        ..Default::default()
    });
    assert!(!warnings.contains("room_uuid"), "{warnings}");
}
