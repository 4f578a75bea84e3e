// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");
    println!("cargo::rerun-if-env-changed=EDGEVIEWER_VERSION");

    // Packaged builds pin the version explicitly
    let version = match std::env::var("EDGEVIEWER_VERSION") {
        Ok(v) => v,
        Err(_) => git_version().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
    };

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// Version from `git describe`, e.g. "0.1.0-abcdef1" or "0.1.0-dirty-abcdef1"
fn git_version() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--match", "v*"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let described = described.strip_prefix('v').unwrap_or(&described).to_string();

    // "0.1.0-5-gabcdef1": commits on top of a tag
    let parts: Vec<&str> = described.rsplitn(3, '-').collect();
    if parts.len() == 3 {
        let hash = parts[0].strip_prefix('g').unwrap_or(parts[0]);
        return Some(format!("{}-dirty-{}", parts[2], hash));
    }

    let hash = commit_hash().unwrap_or_else(|| "unknown".to_string());
    if described == hash {
        // No tags at all, describe fell back to the bare hash
        Some(format!("{}-{}", env!("CARGO_PKG_VERSION"), hash))
    } else {
        Some(format!("{}-{}", described, hash))
    }
}

fn commit_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;

    if output.status.success() {
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        None
    }
}
