//! External command execution.
//!
//! Used for the image optimizers, which are fire-and-forget tools whose
//! output is only logged.

use crate::debug;
use anyhow::{Context, Result, bail};
use std::{
    ffi::OsString,
    path::Path,
    process::{Command, Output},
};

/// Run an external command with arguments.
///
/// ```ignore
/// exec!(&config.images.webp; "-q", "80", input, "-o", output)?;
/// ```
#[macro_export]
macro_rules! exec {
    ($cmd:expr; $($arg:expr),* $(,)?) => {{
        $crate::utils::exec::exec(
            None,
            &$crate::utils::exec::to_cmd_vec($cmd),
            &$crate::utils::exec::filter_args(&[$($crate::utils::exec::to_os($arg)),*]),
        )
    }};
    ($root:expr; $cmd:expr; $($arg:expr),* $(,)?) => {{
        $crate::utils::exec::exec(
            Some($root),
            &$crate::utils::exec::to_cmd_vec($cmd),
            &$crate::utils::exec::filter_args(&[$($crate::utils::exec::to_os($arg)),*]),
        )
    }};
}

#[inline]
pub fn to_os<S: Into<OsString>>(s: S) -> OsString {
    s.into()
}

/// Conversion of a configured command line into program + leading args.
pub trait ToCmd {
    fn to_cmd(self) -> Vec<OsString>;
}

impl<const N: usize> ToCmd for [&str; N] {
    fn to_cmd(self) -> Vec<OsString> {
        self.into_iter().map(OsString::from).collect()
    }
}

impl ToCmd for &[String] {
    fn to_cmd(self) -> Vec<OsString> {
        self.iter().map(OsString::from).collect()
    }
}

impl ToCmd for &Vec<String> {
    fn to_cmd(self) -> Vec<OsString> {
        self.as_slice().to_cmd()
    }
}

#[inline]
pub fn to_cmd_vec<C: ToCmd>(cmd: C) -> Vec<OsString> {
    cmd.to_cmd()
}

/// Drop empty args so optional flags can be passed as `""`.
#[inline]
pub fn filter_args(args: &[OsString]) -> Vec<OsString> {
    args.iter().filter(|a| !a.is_empty()).cloned().collect()
}

/// Execute a command and capture its output.
///
/// # Errors
/// Returns error if the command cannot be spawned or exits non-zero.
pub fn exec(root: Option<&Path>, cmd: &[OsString], args: &[OsString]) -> Result<Output> {
    let Some((program, leading)) = cmd.split_first() else {
        bail!("Empty command");
    };
    let name = program.to_string_lossy().into_owned();

    let mut command = Command::new(program);
    command.args(leading).args(args);
    if let Some(dir) = root {
        command.current_dir(dir);
    }

    let output = command
        .output()
        .with_context(|| format!("Failed to execute `{name}`"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let first_line = stderr.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        bail!("`{name}` failed with {}: {}", output.status, first_line.trim());
    }

    for line in String::from_utf8_lossy(&output.stdout).lines() {
        if !line.trim().is_empty() {
            debug!(&name; "{line}");
        }
    }
    Ok(output)
}

/// Whether the program of a configured command is available on `PATH`.
pub fn is_installed(cmd: &[String]) -> bool {
    cmd.first().is_some_and(|program| which::which(program).is_ok())
}
