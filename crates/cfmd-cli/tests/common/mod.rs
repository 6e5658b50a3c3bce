#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tempfile::TempDir;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(30);

fn empty_config() -> PathBuf {
    static CONFIG_DIR: OnceLock<TempDir> = OnceLock::new();
    let dir = CONFIG_DIR
        .get_or_init(|| tempfile::tempdir().expect("failed to create config dir for tests"));
    let file = dir.path().join("config.toml");
    if !file.exists() {
        std::fs::write(&file, "").expect("failed to write empty config");
    }
    file
}

/// Create a `cfmd` command isolated from the user's config and environment.
#[allow(dead_code)]
pub fn cfmd_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cfmd"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env("CFMD_CONFIG", empty_config());
    cmd.env("CFMD_FORCE_NON_INTERACTIVE", "1");
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("CFMD_BASE_URL");
    cmd.env_remove("CFMD_TOKEN");
    cmd.env_remove("CFMD_USER");
    cmd
}

/// `cfmd convert azure <space>` against `base_url`, writing into `output`.
#[allow(dead_code)]
pub fn convert_cmd(space: &str, base_url: &str, output: &Path) -> Command {
    let mut cmd = cfmd_cmd();
    cmd.args(["convert", "azure", space, "--base-url", base_url, "--token", "secret"])
        .arg("--output-dir")
        .arg(output);
    cmd
}
