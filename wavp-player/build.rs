//! Build script for wavp-player
//!
//! Exposes build identification to the `wavp` binary as compile-time env vars:
//! `WAVP_GIT_HASH`, `WAVP_BUILD_TIMESTAMP`, `WAVP_BUILD_PROFILE`.

use std::process::Command;

fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_string())
}

fn main() {
    let git_hash = git_short_hash().unwrap_or_else(|| "unknown".to_string());
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=WAVP_GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=WAVP_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:rustc-env=WAVP_BUILD_PROFILE={}", profile);

    // Refresh the hash when HEAD moves; outside a checkout this path is absent
    // and cargo reruns the script whenever it cannot find it.
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=build.rs");
}
