//! Build script for campaign-audit.
//!
//! Exports git hash, build date, target and rustc version for
//! `campaign-audit version`. Missing tools just leave the value unset.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=CAMPAIGN_AUDIT_TARGET={}", target);

    if let Some(hash) = first_line("git", &["rev-parse", "--short", "HEAD"]) {
        println!("cargo:rustc-env=CAMPAIGN_AUDIT_GIT_HASH={}", hash);
    }

    if let Some(date) = first_line("date", &["-u", "+%Y-%m-%dT%H:%M:%SZ"]) {
        println!("cargo:rustc-env=CAMPAIGN_AUDIT_BUILD_DATE={}", date);
    }

    // "rustc 1.75.0 (82e1608df 2023-12-21)" -> "1.75.0"
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    if let Some(version) = first_line(&rustc, &["--version"])
        .and_then(|line| line.split_whitespace().nth(1).map(str::to_string))
    {
        println!("cargo:rustc-env=CAMPAIGN_AUDIT_RUSTC_VERSION={}", version);
    }
}

/// Trimmed stdout of a successful command.
fn first_line(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let line = text.lines().next()?.trim();
    (!line.is_empty()).then(|| line.to_string())
}
