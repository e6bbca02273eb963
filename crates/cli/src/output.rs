// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Results on stdout, as text or JSON. Progress goes to stderr through
//! tracing; only results land here.

use clap::ValueEnum;
use ocisnap_core::{format_elapsed, Snapshot};
use ocisnap_engine::{InstanceListing, Listing, Outcome, Report};
use ocisnap_storage::LockPayload;
use serde::Serialize;
use std::fmt::Write;

use crate::color;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print `value` as pretty JSON, or the text rendering.
pub fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print!("{}", text(value)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

fn quoted(name: &str) -> String {
    format!("'{}'", color::header(name))
}

pub fn report_text(report: &Report) -> String {
    let mut out = String::new();
    match &report.outcome {
        Outcome::Created { snapshots } => {
            for created in snapshots {
                let _ = writeln!(
                    out,
                    "Created snapshot {} of instance {} ({})",
                    quoted(&created.snapshot.name),
                    color::literal(&created.instance_id),
                    volume_count(&created.snapshot),
                );
            }
        }
        Outcome::RolledBack { instance_id, new_instance_id, snapshot } => {
            let _ = writeln!(
                out,
                "Rolled back instance {} to snapshot {}",
                color::literal(instance_id),
                quoted(snapshot)
            );
            let _ = writeln!(out, "New instance: {}", color::literal(new_instance_id));
        }
        Outcome::Deleted { instance_id, snapshots } => {
            if snapshots.is_empty() {
                let _ = writeln!(out, "No snapshot found for instance {}", color::literal(instance_id));
            }
            for name in snapshots {
                let _ = writeln!(
                    out,
                    "Deleted snapshot {} of instance {}",
                    quoted(name),
                    color::literal(instance_id)
                );
            }
        }
        Outcome::Renamed { instance_id, old_name, new_name } => {
            let _ = writeln!(
                out,
                "Renamed snapshot {} to {} on instance {}",
                quoted(old_name),
                quoted(new_name),
                color::literal(instance_id)
            );
        }
        Outcome::DescriptionChanged { instance_id, snapshot, description } => {
            let _ = writeln!(
                out,
                "Changed description of snapshot {} on instance {}: {}",
                quoted(snapshot),
                color::literal(instance_id),
                color::context(description)
            );
        }
    }
    if !report.residue.is_empty() {
        let _ = writeln!(out, "{}", color::warning("Left behind, to clean up by hand:"));
        for residue in &report.residue {
            let _ = writeln!(out, "  - {residue}");
        }
    }
    let _ = writeln!(out, "{}", color::muted(&format!("Done in {}", format_elapsed(report.elapsed))));
    out
}

fn volume_count(snapshot: &Snapshot) -> String {
    match snapshot.block_volumes.len() {
        1 => "boot volume and 1 block volume".to_string(),
        n => format!("boot volume and {n} block volumes"),
    }
}

fn snapshot_lines(out: &mut String, snapshots: &[Snapshot]) {
    for snapshot in snapshots {
        let _ = writeln!(
            out,
            "  {}  {}  {} block volume(s)  {}",
            color::header(&snapshot.name),
            color::context(&snapshot.date_time),
            snapshot.block_volumes.len(),
            color::context(&snapshot.description),
        );
    }
}

pub fn listing_text(listing: &InstanceListing) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Instance {} ({})",
        color::header(&listing.display_name),
        color::literal(&listing.instance_id)
    );
    if listing.snapshots.is_empty() {
        let _ = writeln!(out, "  No snapshot found");
    }
    snapshot_lines(&mut out, &listing.snapshots);
    out
}

pub fn all_listings_text(listing: &Listing) -> String {
    let mut out = String::new();
    for instance in &listing.instances {
        let _ = writeln!(
            out,
            "Instance {} ({}) in compartment {}",
            color::header(&instance.display_name),
            color::literal(&instance.instance_id),
            color::muted(&instance.compartment_id),
        );
        snapshot_lines(&mut out, &instance.snapshots);
    }
    if listing.instances.is_empty() {
        let _ = writeln!(out, "No snapshot found");
    }
    for instance_id in &listing.removed {
        let _ = writeln!(
            out,
            "{}",
            color::muted(&format!("Removed snapshot record of deleted instance {instance_id}"))
        );
    }
    out
}

pub fn unlock_text(holder: &LockPayload) -> String {
    format!("Removed lock held by {holder}\n")
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
