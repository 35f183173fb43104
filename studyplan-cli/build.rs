use std::process::Command;

/// Short commit hash shown by `studyplan --version`.
fn git_sha() -> Option<String> {
    let root = std::env::var("CARGO_MANIFEST_DIR").ok()?;
    let out = Command::new("git")
        .args(["-C", &root, "rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let sha = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (!sha.is_empty()).then_some(sha)
}

fn main() {
    println!("cargo:rerun-if-env-changed=STUDYPLAN_BUILD_SHA");
    let sha = std::env::var("STUDYPLAN_BUILD_SHA")
        .ok()
        .or_else(git_sha)
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=STUDYPLAN_BUILD_SHA={sha}");
}
