//! Registry fixtures.

use std::path::{Path, PathBuf};
use tfd_core::jobs::JobRegistry;
use tfd_core::runner::ProcessRunner;
use tfd_core::shell::{ShellLauncher, ShellRegistry};

pub fn runner() -> ProcessRunner {
    ProcessRunner::new(std::env::temp_dir())
}

pub fn job_registry() -> JobRegistry {
    JobRegistry::new(runner())
}

/// A shell that greets the target and then echoes its input back.
pub fn echo_shell_registry() -> ShellRegistry {
    ShellRegistry::new(
        runner(),
        ShellLauncher::new(
            "sh",
            vec![
                "-c".to_string(),
                "echo connected to $0; exec cat".to_string(),
                "{target}".to_string(),
            ],
        ),
    )
}

/// A shell that runs `script` with the target as `$0` and exits.
pub fn scripted_shell_registry(script: &str) -> ShellRegistry {
    ShellRegistry::new(
        runner(),
        ShellLauncher::new(
            "sh",
            vec!["-c".to_string(), script.to_string(), "{target}".to_string()],
        ),
    )
}

/// Write an executable shell script into `dir`.
#[allow(dead_code)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write script");
    let mut perms = std::fs::metadata(&path)
        .expect("Failed to stat script")
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("Failed to chmod script");
    path
}
