//! Build script for labcalc
//!
//! Bumps the build counter and embeds build metadata for the status tool.

use std::fs;
use std::path::Path;

const BUILD_NUMBER_FILE: &str = "build_number.txt";

fn next_build_number(path: &Path) -> u64 {
    let previous = fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0);
    previous + 1
}

fn main() {
    println!("cargo:rerun-if-changed=src");

    let path = Path::new(BUILD_NUMBER_FILE);
    let build_number = next_build_number(path);
    if let Err(e) = fs::write(path, build_number.to_string()) {
        println!("cargo:warning=could not record build number: {}", e);
    }

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");

    println!("cargo:rustc-env=LABCALC_BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=LABCALC_BUILD_TIMESTAMP={}", timestamp);
}
