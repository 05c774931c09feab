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
use std::path::{Path, PathBuf};

use clap::Parser;
use manifest::{ManifestDefinition, ManifestError, ManifestModel};
use registration::{Config, ConfigError};
use url::Url;

#[derive(Parser, Debug)]
#[clap(name = "sentient-register", about = "Sentient controller registration")]
pub struct Options {
    #[clap(
        long,
        short = 'f',
        global = true,
        env = "SENTIENT_CONFIG",
        help = "Path to TOML configuration file"
    )]
    pub config: Option<PathBuf>,

    #[clap(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Parser, Debug)]
pub enum Command {
    #[clap(about = "Register a controller manifest with the coordinator")]
    Register(RegisterCommand),
    #[clap(about = "Print a controller manifest document")]
    Dump(DumpCommand),
}

#[derive(Parser, Debug)]
pub struct RegisterCommand {
    #[clap(long, short = 'm', help = "Manifest definition (.toml, .yaml or .json)")]
    pub manifest: PathBuf,

    #[clap(long, help = "Coordinator database id of the room")]
    pub room_uuid: Option<String>,

    #[clap(long, short = 'b', help = "Broker URL, e.g. mqtt://broker.local:1883")]
    pub broker: Option<Url>,

    #[clap(long, help = "Controller payload size above which the minimal form is sent")]
    pub threshold: Option<usize>,

    #[clap(long, help = "Total registration attempts on transport failure")]
    pub max_attempts: Option<u32>,

    #[clap(
        long,
        help = "Record the payloads and print them instead of publishing"
    )]
    pub dry_run: bool,
}

#[derive(Parser, Debug)]
pub struct DumpCommand {
    #[clap(long, short = 'm', help = "Manifest definition (.toml, .yaml or .json)")]
    pub manifest: PathBuf,

    #[clap(long, help = "Also print the registration plan")]
    pub plan: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),
    #[error("Invalid option --{option}: {reason}")]
    InvalidOption { option: &'static str, reason: String },
}

pub fn load_config(options: &Options) -> Result<Config, CommandError> {
    Ok(Config::load(options.config.as_deref())?)
}

pub fn load_model(path: &Path) -> Result<ManifestModel, CommandError> {
    Ok(ManifestDefinition::load(path)?.into_model()?)
}

impl RegisterCommand {
    // apply lays command-line overrides over the loaded configuration.
    pub fn apply(&self, config: &mut Config) -> Result<(), CommandError> {
        if let Some(room_uuid) = &self.room_uuid {
            config.registration.room_uuid = room_uuid.clone();
        }
        if let Some(broker) = &self.broker {
            config.broker.url = broker.clone();
            config.broker.endpoint()?;
        }
        if let Some(threshold) = self.threshold {
            config.registration.size_threshold_bytes = threshold;
        }
        if let Some(max_attempts) = self.max_attempts {
            if max_attempts == 0 {
                return Err(CommandError::InvalidOption {
                    option: "max-attempts",
                    reason: "must be at least 1".to_string(),
                });
            }
            config.registration.retry.max_attempts = max_attempts;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(args: &[&str]) -> RegisterCommand {
        let options =
            Options::try_parse_from([&["sentient-register", "register"][..], args].concat()).unwrap();
        match options.command {
            Command::Register(command) => command,
            other => panic!("Should be register, got {other:?}"),
        }
    }

    #[test]
    fn test_overrides_are_applied() {
        let command = register(&[
            "--manifest",
            "clock.toml",
            "--room-uuid",
            "clockwork-db-id",
            "--broker",
            "mqtt://10.0.0.5:1884",
            "--threshold",
            "1500",
            "--max-attempts",
            "3",
        ]);
        let mut config = Config::default();
        command.apply(&mut config).unwrap();

        assert_eq!(config.registration.room_uuid, "clockwork-db-id");
        assert_eq!(config.registration.size_threshold_bytes, 1500);
        assert_eq!(config.registration.retry.max_attempts, 3);
        assert_eq!(
            config.broker.endpoint().unwrap(),
            ("10.0.0.5".to_string(), 1884)
        );
        assert!(!command.dry_run);
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let command = register(&["-m", "clock.toml", "--dry-run"]);
        let mut config = Config::default();
        command.apply(&mut config).unwrap();

        assert_eq!(config, Config::default());
        assert!(command.dry_run);
    }

    #[test]
    fn test_bad_overrides_are_rejected() {
        let command = register(&["-m", "clock.toml", "--broker", "http://broker.local"]);
        assert!(matches!(
            command.apply(&mut Config::default()),
            Err(CommandError::Config(ConfigError::UnsupportedScheme(_)))
        ));

        let command = register(&["-m", "clock.toml", "--max-attempts", "0"]);
        assert!(matches!(
            command.apply(&mut Config::default()),
            Err(CommandError::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let options = Options::try_parse_from([
            "sentient-register",
            "dump",
            "-m",
            "clock.toml",
            "--log-json",
            "--config",
            "sentient.toml",
        ])
        .unwrap();
        assert!(options.log_json);
        assert_eq!(options.config, Some(PathBuf::from("sentient.toml")));
        assert!(matches!(options.command, Command::Dump(DumpCommand { plan: false, .. })));
    }
}
