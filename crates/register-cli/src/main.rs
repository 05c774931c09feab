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
mod cli;

use clap::Parser;
use eyre::WrapErr;
use manifest::ManifestModel;
use registration::{
    MemoryTransport, MqttTransport, Registrar, RegistrationPlan, RegistrationReport,
};
use tracing::metadata::LevelFilter;
use tracing_subscriber::filter::{EnvFilter, ParseError};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::cli::{Command, DumpCommand, Options, RegisterCommand};

#[tokio::main]
async fn main() -> Result<(), eyre::Report> {
    let options = Options::parse();

    let env_filter = quiet_dependencies(
        EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy(),
    )?;

    if options.log_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(env_filter)
            .try_init()?;
    }

    match &options.command {
        Command::Register(command) => register(&options, command).await?,
        Command::Dump(command) => dump(&options, command)?,
    }

    Ok(())
}

async fn register(options: &Options, command: &RegisterCommand) -> Result<(), eyre::Report> {
    let mut config = cli::load_config(options)?;
    command.apply(&mut config)?;
    let model = cli::load_model(&command.manifest)
        .wrap_err_with(|| format!("Failed to load manifest {}", command.manifest.display()))?;
    let registrar = Registrar::new(config.registration.clone());

    if command.dry_run {
        let transport = MemoryTransport::new();
        let report = registrar
            .register(&model, &transport)
            .await
            .wrap_err("Dry-run registration failed")?;
        for message in transport.messages() {
            let payload: serde_json::Value = message.json()?;
            println!("{} {}", message.topic, serde_json::to_string_pretty(&payload)?);
        }
        print_report(&report)?;
        return Ok(());
    }

    let client_id = fallback_client_id(&model);
    let transport = MqttTransport::connect(config.broker.transport_options(&client_id)?);
    let result = registrar.register_with_retry(&model, &transport).await;
    let stats = transport.publish_stats();
    tracing::info!(
        published = stats.total_published,
        failed = stats.total_failed,
        bytes = stats.total_bytes_published,
        "Publish statistics"
    );
    if let Err(e) = transport.disconnect().await {
        tracing::warn!(error = %e, "Failed to disconnect cleanly from MQTT broker");
    }

    let report = result.wrap_err("Registration failed")?;
    print_report(&report)?;
    Ok(())
}

fn dump(options: &Options, command: &DumpCommand) -> Result<(), eyre::Report> {
    let model = cli::load_model(&command.manifest)
        .wrap_err_with(|| format!("Failed to load manifest {}", command.manifest.display()))?;
    println!("{}", model.to_json_pretty()?);

    if command.plan {
        let config = cli::load_config(options)?;
        let plan = Registrar::new(config.registration).plan(&model)?;
        print_plan(&plan);
    }
    Ok(())
}

// quiet_dependencies lowers chatty third-party targets. Our own crates
// are left to RUST_LOG.
fn quiet_dependencies(filter: EnvFilter) -> Result<EnvFilter, ParseError> {
    Ok(filter.add_directive("rumqttc=warn".parse()?))
}

fn fallback_client_id(model: &ManifestModel) -> String {
    match model.controller() {
        Some(controller) if !controller.unique_id.is_empty() => {
            format!("sentient-{}", controller.unique_id)
        }
        _ => "sentient-register".to_string(),
    }
}

fn print_report(report: &RegistrationReport) -> Result<(), eyre::Report> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn print_plan(plan: &RegistrationPlan) {
    println!(
        "controller: {} payload, {} bytes (full form {} bytes)",
        plan.strategy,
        plan.controller_payload_bytes(),
        plan.full_payload_bytes
    );
    for device in &plan.devices {
        println!(
            "device {}: {} ({} bytes)",
            device.device_index,
            device.device_id,
            device.payload.len()
        );
    }
}
