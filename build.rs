use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let hash = command_output("git", &["rev-parse", "--short", "HEAD"])
        .unwrap_or_else(|| "unknown".to_string());
    let status = command_output("git", &["status", "--porcelain"])
        .map(|out| if out.is_empty() { "clean" } else { "dirty" })
        .unwrap_or("unknown");
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown-target".to_string());
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown-profile".to_string());

    println!("cargo:rustc-env=INVEST_BUDGET_BUILD_HASH={hash}");
    println!("cargo:rustc-env=INVEST_BUDGET_BUILD_STATUS={status}");
    println!("cargo:rustc-env=INVEST_BUDGET_BUILD_TIMESTAMP={timestamp}");
    println!("cargo:rustc-env=INVEST_BUDGET_BUILD_TARGET={target}");
    println!("cargo:rustc-env=INVEST_BUDGET_BUILD_PROFILE={profile}");
}

/// Trimmed stdout of a successful command, `None` otherwise.
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|text| text.trim().to_string())
}
