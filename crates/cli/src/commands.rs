// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subcommands and their handlers

use anyhow::Result;
use clap::{Args, Subcommand};
use ocisnap_adapters::{
    connect, default_config_path, load_profile, OciCloud, OciObjectStore, DEFAULT_PROFILE,
};
use ocisnap_core::{InstanceId, SnapshotName, SystemClock};
use ocisnap_engine::{OpError, SnapshotEngine};
use ocisnap_storage::LockError;
use std::path::PathBuf;

use crate::exit_error::{codes, ExitError};
use crate::output::{self, emit, OutputFormat};
use crate::settings::{Settings, SettingsFile};

type Engine = SnapshotEngine<OciCloud, OciObjectStore, SystemClock>;

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// OCI config profile
    #[arg(long, global = true, env = "OCI_CLI_PROFILE", default_value = DEFAULT_PROFILE)]
    pub profile: String,
    /// OCI config file [default: ~/.oci/config]
    #[arg(long, global = true, env = "OCI_CLI_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,
    /// Settings file [default: ~/.config/ocisnap/ocisnap.toml]
    #[arg(long, global = true, env = "OCISNAP_SETTINGS", value_name = "PATH")]
    pub settings: Option<PathBuf>,
    /// Bucket holding snapshot records and locks
    #[arg(long, global = true, env = "OCISNAP_BUCKET")]
    pub bucket: Option<String>,
    /// Region, instead of the profile's
    #[arg(long, global = true, env = "OCISNAP_REGION")]
    pub region: Option<String>,
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
    /// Output format
    #[arg(short = 'o', long = "output", global = true, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Snapshot the boot volume and attached block volumes of an instance
    Create {
        #[arg(value_parser = parse_instance_id)]
        instance_id: InstanceId,
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Snapshot several instances at one point in time
    CreateMulti {
        name: String,
        #[arg(required = true, value_parser = parse_instance_id)]
        instance_ids: Vec<InstanceId>,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// List the snapshots of an instance
    List {
        #[arg(value_parser = parse_instance_id)]
        instance_id: InstanceId,
    },
    /// List the snapshots of every instance, dropping records of deleted instances
    ListAll,
    /// Replace an instance with one booted from a snapshot
    Rollback {
        #[arg(value_parser = parse_instance_id)]
        instance_id: InstanceId,
        name: String,
    },
    /// Delete a snapshot and its cloned volumes
    Delete {
        #[arg(value_parser = parse_instance_id)]
        instance_id: InstanceId,
        name: String,
    },
    /// Delete every snapshot of an instance
    DeleteAll {
        #[arg(value_parser = parse_instance_id)]
        instance_id: InstanceId,
    },
    /// Rename a snapshot
    Rename {
        #[arg(value_parser = parse_instance_id)]
        instance_id: InstanceId,
        old_name: String,
        new_name: String,
    },
    /// Change the description of a snapshot
    ChangeDesc {
        #[arg(value_parser = parse_instance_id)]
        instance_id: InstanceId,
        name: String,
        description: String,
    },
    /// Remove the lock of an instance left behind by an interrupted run
    Unlock {
        #[arg(value_parser = parse_instance_id)]
        instance_id: InstanceId,
    },
}

pub(crate) fn parse_instance_id(s: &str) -> Result<InstanceId, String> {
    let id = InstanceId::new(s);
    if id.is_kind() {
        Ok(id)
    } else {
        Err(format!("'{s}' is not an instance OCID (ocid1.instance...)"))
    }
}

impl Command {
    /// Name a snapshot will carry after the command, if it picks one
    fn new_name(&self) -> Option<&str> {
        match self {
            Command::Create { name, .. } | Command::CreateMulti { name, .. } => Some(name.as_str()),
            Command::Rename { new_name, .. } => Some(new_name.as_str()),
            _ => None,
        }
    }
}

/// Settings, profile and clients for one run
async fn engine(global: &GlobalArgs) -> Result<Engine, ExitError> {
    let file = SettingsFile::load(global.settings.as_deref())
        .map_err(|e| ExitError::new(codes::CONFIG, e.to_string()))?;
    let settings = Settings::resolve(file, global.bucket.clone(), global.region.clone());
    let config_path = match &global.config_file {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let profile = load_profile(&config_path, &global.profile)?;
    tracing::debug!(profile = %profile.name, bucket = %settings.bucket, "loaded profile");
    let (cloud, store) = connect(
        &profile,
        settings.region.as_deref(),
        &settings.bucket,
        settings.http_timeout,
        settings.http_retry,
        settings.max_attempts,
    )
    .await?;
    Ok(SnapshotEngine::new(cloud, store, SystemClock, settings.engine))
}

pub async fn run(command: Command, global: &GlobalArgs) -> Result<()> {
    // Bad names fail before any profile or network work
    if let Some(name) = command.new_name() {
        SnapshotName::parse(name).map_err(|e| ExitError::from(OpError::from(e)))?;
    }
    let engine = engine(global).await?;
    let format = global.format;

    let report = match command {
        Command::Create { instance_id, name, description } => {
            engine.create(&instance_id, &name, &description).await
        }
        Command::CreateMulti { name, instance_ids, description } => {
            engine.create_multi(&instance_ids, &name, &description).await
        }
        Command::Rollback { instance_id, name } => engine.rollback(&instance_id, &name).await,
        Command::Delete { instance_id, name } => engine.delete(&instance_id, &name).await,
        Command::DeleteAll { instance_id } => engine.delete_all(&instance_id).await,
        Command::Rename { instance_id, old_name, new_name } => {
            engine.rename(&instance_id, &old_name, &new_name).await
        }
        Command::ChangeDesc { instance_id, name, description } => {
            engine.change_description(&instance_id, &name, &description).await
        }
        Command::List { instance_id } => {
            let listing = engine.list(&instance_id).await.map_err(ExitError::from)?;
            return emit(format, &listing, output::listing_text);
        }
        Command::ListAll => {
            let listing = engine.list_all().await.map_err(ExitError::from)?;
            return emit(format, &listing, output::all_listings_text);
        }
        Command::Unlock { instance_id } => {
            return match engine.unlock(&instance_id).await {
                Ok(holder) => emit(format, &holder, output::unlock_text),
                Err(OpError::Lock(LockError::NotLocked(_))) => {
                    eprintln!("instance {instance_id} is not locked");
                    Ok(())
                }
                Err(e) => Err(ExitError::from(e).into()),
            };
        }
    };

    let report = report.map_err(ExitError::from)?;
    emit(format, &report, output::report_text)
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
