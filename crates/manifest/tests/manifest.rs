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

// tests/manifest.rs
// Tests for ManifestModel assembly, capacity checks and document rendering.

use std::time::Duration;

use assert_json_diff::assert_json_eq;
use manifest::{
    ControllerInfo, Device, EntryKind, ManifestError, ManifestModel, ParamValue, Parameter, Pin,
};
use serde_json::json;

fn clock_controller() -> ControllerInfo {
    ControllerInfo::new(
        "clock",
        "Clock Puzzle Controller",
        "2.3.0",
        "clockwork",
        "clock",
    )
}

#[test]
fn test_empty_model_document() {
    let model = ManifestModel::new();
    let document = model.serialize().unwrap();

    assert_json_eq!(
        document,
        json!({
            "controller": {},
            "devices": [],
            "mqtt_topics_publish": [],
            "mqtt_topics_subscribe": [],
            "actions": [],
        })
    );
    assert_eq!(model.entry_count(), 0);
}

#[test]
fn test_controller_info_last_write_wins() {
    let mut model = ManifestModel::new();
    model.set_controller_info(ControllerInfo::new("first", "First", "1.0.0", "room", "first"));
    model.set_controller_info(clock_controller());

    assert_eq!(model.controller().unwrap().unique_id, "clock");
    let document = model.serialize().unwrap();
    assert_eq!(document["controller"]["friendly_name"], "Clock Puzzle Controller");
    assert_eq!(document["controller"]["room_id"], "clockwork");
}

#[test]
fn test_devices_keep_insertion_order() {
    let mut model = ManifestModel::new();
    let ids = ["clock_hour_hand", "clock_minute_hand", "clock_gears"];
    for (i, id) in ids.iter().enumerate() {
        let handle = model
            .add_device(Device::new(*id, "Stepper", "stepper", "output"))
            .unwrap();
        assert_eq!(handle.index(), i);
    }

    let listed: Vec<&str> = model.devices().iter().map(|d| d.device_id.as_str()).collect();
    assert_eq!(listed, ids);
    assert_eq!(model.device_count(), 3);
}

#[test]
fn test_device_document_fields() {
    let mut model = ManifestModel::new();
    model
        .add_device(
            Device::new("clock_fog_machine", "Clock Fog Machine", "relay", "output")
                .with_action_type("digital_relay")
                .with_primary_command("fog_on"),
        )
        .unwrap();

    let document = model.serialize().unwrap();
    assert_json_eq!(
        document["devices"][0],
        json!({
            "device_id": "clock_fog_machine",
            "friendly_name": "Clock Fog Machine",
            "device_type": "relay",
            "device_category": "output",
            "action_type": "digital_relay",
            "device_command_name": "fog_on",
        })
    );
}

#[test]
fn test_device_handle_targets_the_right_device() {
    let mut model = ManifestModel::new();
    let first = model
        .add_device(Device::legacy("button_1", "button", "Button 1", 3_u32))
        .unwrap();
    let _second = model
        .add_device(Device::legacy("pot_1", "potentiometer", "Pot 1", "A0"))
        .unwrap();

    // Editing through the first handle must not touch the last-added device.
    model
        .device_mut(first)
        .unwrap()
        .set_pin_type("digital_input")
        .set_property("debounce_ms", 25)
        .set_property("active_low", true);

    let button = model.device(first).unwrap();
    assert_eq!(button.pin, Some(Pin::Number(3)));
    assert_eq!(button.pin_type.as_deref(), Some("digital_input"));
    assert_eq!(button.properties.get("debounce_ms"), Some(&ParamValue::Int(25)));

    let pot = &model.devices()[1];
    assert_eq!(pot.pin, Some(Pin::Label("A0".to_string())));
    assert!(pot.pin_type.is_none());
    assert!(pot.properties.is_empty());

    let document = model.serialize().unwrap();
    assert_json_eq!(
        document["devices"][0],
        json!({
            "device_id": "button_1",
            "friendly_name": "Button 1",
            "device_type": "button",
            "pin": 3,
            "pin_type": "digital_input",
            "properties": { "active_low": true, "debounce_ms": 25 },
        })
    );
}

#[test]
fn test_device_mut_with_foreign_handle() {
    let mut other = ManifestModel::new();
    other.add_device(Device::new("a", "A", "relay", "output")).unwrap();
    let foreign = other.add_device(Device::new("b", "B", "relay", "output")).unwrap();

    let mut model = ManifestModel::new();
    let err = model.device_mut(foreign).unwrap_err();
    assert!(matches!(err, ManifestError::UnknownDevice(1)));
}

#[test]
fn test_duplicate_device_ids_are_accepted() {
    let mut model = ManifestModel::new();
    model.add_device(Device::new("laser", "Laser", "relay", "output")).unwrap();
    model.add_device(Device::new("laser", "Laser Again", "relay", "output")).unwrap();
    model.add_device_topic("laser", "paragon/clockwork/laser/state", "state").unwrap();

    assert_eq!(model.device_count(), 2);
    assert_eq!(model.topics_for_device("laser").count(), 1);
}

#[test]
fn test_topics_for_device_filters_by_exact_id() {
    let mut model = ManifestModel::new();
    model.add_device(Device::new("laser", "Laser", "relay", "output")).unwrap();
    model.add_device_topic("laser", "cmd/laser_on", "command").unwrap();
    model.add_device_topic("laser_light", "cmd/laser_light_on", "command").unwrap();
    model.add_device_topic("ghost", "cmd/ghost", "command").unwrap();
    model.add_device_topic("laser", "cmd/laser_off", "command").unwrap();
    model
        .add_publish_topic("paragon/clockwork/heartbeat", "heartbeat", Some(Duration::from_secs(5)))
        .unwrap();

    let topics: Vec<&str> = model
        .topics_for_device("laser")
        .map(|t| t.topic.as_str())
        .collect();
    assert_eq!(topics, vec!["cmd/laser_on", "cmd/laser_off"]);

    // Dangling topics stay in the document.
    let document = model.serialize().unwrap();
    assert_eq!(document["mqtt_topics_publish"].as_array().unwrap().len(), 5);
    assert_json_eq!(
        document["mqtt_topics_publish"][4],
        json!({
            "topic": "paragon/clockwork/heartbeat",
            "message_type": "heartbeat",
            "publish_interval_ms": 5000,
        })
    );
}

#[test]
fn test_flat_and_rich_actions_share_one_array() {
    let mut model = ManifestModel::new();
    model
        .add_device_action("metal_door_actuator", "actuator_forward", "none", "Drive forward")
        .unwrap();
    model
        .begin_action("open_exit", "Open Exit Door", Some("paragon/clockwork/exit/open"))
        .unwrap()
        .description("Retracts the exit door actuator")
        .duration(Duration::from_millis(4500))
        .can_interrupt(false)
        .end();

    assert_eq!(model.actions().len(), 2);
    assert!(model.actions()[0].as_device_action().is_some());
    assert!(model.actions()[1].as_spec().is_some());

    let document = model.serialize().unwrap();
    assert_json_eq!(
        document["actions"],
        json!([
            {
                "device_id": "metal_door_actuator",
                "action_name": "actuator_forward",
                "param_type": "none",
                "description": "Drive forward",
            },
            {
                "action_id": "open_exit",
                "friendly_name": "Open Exit Door",
                "mqtt_topic": "paragon/clockwork/exit/open",
                "parameters": [],
                "description": "Retracts the exit door actuator",
                "duration_ms": 4500,
                "can_interrupt": false,
            }
        ])
    );
}

#[test]
fn test_serialize_is_stable() {
    let mut model = ManifestModel::new();
    model.set_controller_info(clock_controller());
    model
        .add_device(Device::new("clock_gears", "Clock Gears", "stepper", "output"))
        .unwrap();
    model.add_device_topic("clock_gears", "cmd/gears", "command").unwrap();
    model
        .begin_subscribe_topic("paragon/clockwork/clock/set_time", Some("Set the clock"))
        .unwrap()
        .parameter(Parameter::new("hour", "int").required(true).with_range(1, 12))
        .unwrap()
        .end();

    let first = model.to_json().unwrap();
    let second = model.to_json().unwrap();
    assert_eq!(first, second);
    assert_eq!(model.serialize().unwrap(), model.serialize().unwrap());
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&first).unwrap(),
        model.serialize().unwrap()
    );
}

#[test]
fn test_pretty_dump_matches_compact_document() {
    let mut model = ManifestModel::new();
    model.set_controller_info(clock_controller());
    let pretty = model.to_json_pretty().unwrap();
    assert!(pretty.contains('\n'));
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&pretty).unwrap(),
        model.serialize().unwrap()
    );
}

#[test]
fn test_capacity_exceeded_is_reported() {
    let mut model = ManifestModel::with_entry_limit(2);
    model.add_device(Device::new("a", "A", "relay", "output")).unwrap();
    model.add_device_topic("a", "cmd/a", "command").unwrap();

    let err = model
        .add_device(Device::new("b", "B", "relay", "output"))
        .unwrap_err();
    assert!(err.is_capacity_error());
    match err {
        ManifestError::CapacityExceeded { kind, limit } => {
            assert_eq!(kind, EntryKind::Device);
            assert_eq!(limit, 2);
        }
        _ => panic!("Should be CapacityExceeded"),
    }

    // The failed append leaves the model untouched.
    assert_eq!(model.device_count(), 1);
    assert_eq!(model.entry_count(), 2);
    assert!(model.add_device_action("a", "pulse", "int", "Pulse").is_err());
    assert!(model.begin_subscribe_topic("cmd/b", None).is_err());
    assert!(model.begin_action("x", "X", None).is_err());
}

#[test]
fn test_capacity_counts_parameters() {
    let mut model = ManifestModel::with_entry_limit(2);
    let builder = model
        .begin_subscribe_topic("cmd/led_pattern", None)
        .unwrap()
        .parameter(Parameter::new("pattern", "string"))
        .unwrap();

    let err = builder
        .parameter(Parameter::new("speed", "int"))
        .err()
        .unwrap();
    assert!(matches!(
        err,
        ManifestError::CapacityExceeded {
            kind: EntryKind::Parameter,
            limit: 2
        }
    ));
    assert_eq!(model.subscribe_topics()[0].parameters.len(), 1);
}

#[test]
fn test_capacity_error_message() {
    let err = ManifestError::CapacityExceeded {
        kind: EntryKind::PublishTopic,
        limit: 512,
    };
    assert_eq!(
        err.to_string(),
        "manifest too large: cannot add publish topic, entry limit of 512 reached"
    );
    assert!(!err.is_definition_error());
}
