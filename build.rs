use std::process::Command;

/// Short commit hash of the checkout, or the `AURANIC_GIT_HASH` override for
/// builds outside a git tree (container images, source tarballs).
fn commit_hash() -> String {
    if let Ok(hash) = std::env::var("AURANIC_GIT_HASH") {
        if !hash.trim().is_empty() {
            return hash.trim().to_string();
        }
    }

    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    println!("cargo:rustc-env=GIT_HASH={}", commit_hash());

    println!("cargo:rerun-if-env-changed=AURANIC_GIT_HASH");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
}
