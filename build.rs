use std::{
    env,
    process::Command,
    time::{SystemTime, UNIX_EPOCH},
};

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let pkg_version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".into());

    let described = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().trim_start_matches('v').to_string());

    let version = match described {
        // A bare commit hash carries no release number of its own
        Some(v) if !v.is_empty() && !v.contains('.') => format!("{}+{}", pkg_version, v),
        Some(v) if v.ends_with("-dirty") => format!("{}-{}", v, timestamp()),
        Some(v) if !v.is_empty() => v,
        _ => pkg_version,
    };

    println!("cargo:rustc-env=H5P_STAGE_VERSION={}", version);
}

fn timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
