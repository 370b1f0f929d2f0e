//! Stamps the binary with the source revision shown by `triage --version`.

use std::path::Path;
use std::process::Command;

/// `git describe` output for `repo`, e.g. `v0.1.0-3-gabc1234-dirty`.
fn describe(repo: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(["describe", "--always", "--dirty", "--tags"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let rev = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (!rev.is_empty()).then_some(rev)
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let workspace = Path::new(&manifest_dir).join("..");

    let git_dir = workspace.join(".git");
    if git_dir.exists() {
        println!("cargo:rerun-if-changed={}", git_dir.join("HEAD").display());
        println!("cargo:rerun-if-changed={}", git_dir.join("index").display());
    }

    let rev = describe(&workspace).unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=TRIAGE_BUILD_SHA={rev}");
}
