//! Desktop wallpaper setters.
//!
//! The pipeline only sees the [`WallpaperSetter`] trait. Platform setters
//! shell out to the tool each desktop already ships with:
//! - Windows: `SystemParametersInfoW(SPI_SETDESKWALLPAPER)` through PowerShell
//! - macOS: `osascript` via System Events
//! - Linux: GNOME `gsettings`
//!
//! Any other desktop can use [`CommandWallpaper`] with a user-supplied
//! command line such as `feh --bg-fill {path}`.

use std::ffi::OsString;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use tokio::process::Command;
use tracing::{debug, warn};

/// Placeholder replaced by the image path in command templates.
pub const PATH_PLACEHOLDER: &str = "{path}";

/// Applies an image file as the desktop background.
#[async_trait]
pub trait WallpaperSetter: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// `path` is absolute and points at a finished image.
    async fn set_wallpaper(&self, path: &Path) -> Result<()>;
}

/// The setter for the platform this binary was built for.
pub fn platform_default() -> Box<dyn WallpaperSetter> {
    #[cfg(target_os = "windows")]
    {
        Box::new(WindowsWallpaper)
    }
    #[cfg(target_os = "macos")]
    {
        Box::new(MacWallpaper)
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        Box::new(GnomeWallpaper)
    }
}

async fn run(program: &str, args: &[OsString], envs: &[(&str, &Path)]) -> Result<()> {
    debug!(program = program, args = ?args, "Running wallpaper command");

    let mut command = Command::new(program);
    command.args(args);
    for (key, value) in envs {
        command.env(key, value);
    }

    let output = command
        .output()
        .await
        .with_context(|| format!("Failed to start '{}'", program))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "'{}' exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        );
    }
    Ok(())
}

/// Windows desktop, via `user32!SystemParametersInfoW`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsWallpaper;

/// SPI_SETDESKWALLPAPER with SPIF_UPDATEINIFILE | SPIF_SENDCHANGE.
const WINDOWS_SCRIPT: &str = r#"
Add-Type -TypeDefinition @'
using System.Runtime.InteropServices;
public static class HimawariWallpaper {
    [DllImport("user32.dll", CharSet = CharSet.Unicode, SetLastError = true)]
    public static extern bool SystemParametersInfo(int action, int param, string value, int flags);
}
'@
if (-not [HimawariWallpaper]::SystemParametersInfo(20, 0, $env:HIMAWARI_WALLPAPER_PATH, 3)) { exit 1 }
"#;

#[async_trait]
impl WallpaperSetter for WindowsWallpaper {
    fn name(&self) -> &'static str {
        "windows"
    }

    async fn set_wallpaper(&self, path: &Path) -> Result<()> {
        let args: Vec<OsString> = ["-NoProfile", "-NonInteractive", "-Command", WINDOWS_SCRIPT]
            .iter()
            .map(OsString::from)
            .collect();
        run("powershell", &args, &[("HIMAWARI_WALLPAPER_PATH", path)]).await
    }
}

/// macOS desktop, via AppleScript.
#[derive(Debug, Default, Clone, Copy)]
pub struct MacWallpaper;

fn applescript_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[async_trait]
impl WallpaperSetter for MacWallpaper {
    fn name(&self) -> &'static str {
        "macos"
    }

    async fn set_wallpaper(&self, path: &Path) -> Result<()> {
        let script = format!(
            "tell application \"System Events\" to tell every desktop to set picture to \"{}\"",
            applescript_string(&path.to_string_lossy())
        );
        run("osascript", &[OsString::from("-e"), OsString::from(script)], &[]).await
    }
}

/// `file://` URI for an absolute path, percent-encoded.
fn file_uri(path: &Path) -> Result<String> {
    Url::from_file_path(path)
        .map(String::from)
        .map_err(|_| anyhow!("Cannot build a file URI for '{}'", path.display()))
}

/// GNOME desktop, via `gsettings`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GnomeWallpaper;

#[async_trait]
impl WallpaperSetter for GnomeWallpaper {
    fn name(&self) -> &'static str {
        "gnome"
    }

    async fn set_wallpaper(&self, path: &Path) -> Result<()> {
        let uri = file_uri(path)?;
        let set = |key: &str| -> Vec<OsString> {
            ["set", "org.gnome.desktop.background", key, uri.as_str()]
                .iter()
                .map(OsString::from)
                .collect()
        };

        run("gsettings", &set("picture-uri"), &[]).await?;

        // Only present since GNOME 42.
        if let Err(e) = run("gsettings", &set("picture-uri-dark"), &[]).await {
            warn!(error = %e, "Could not set dark-mode wallpaper");
        }
        Ok(())
    }
}

/// A user-supplied command line; `{path}` is replaced by the image path,
/// or the path is appended when the template has no placeholder.
///
/// The template is split on whitespace. Single or double quotes keep a
/// word together (`"/opt/My Tools/setbg" {path}`); there are no escapes
/// and no other shell syntax.
#[derive(Debug, Clone)]
pub struct CommandWallpaper {
    program: String,
    args: Vec<String>,
}

impl CommandWallpaper {
    pub fn parse(template: &str) -> Result<Self> {
        let mut parts = split_words(template)?.into_iter();
        let program = parts
            .next()
            .ok_or_else(|| anyhow!("Wallpaper command is empty"))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments for `path`, placeholder substituted.
    pub fn args_for(&self, path: &Path) -> Vec<OsString> {
        let path = path.as_os_str();
        let mut substituted = false;

        let mut args: Vec<OsString> = self
            .args
            .iter()
            .map(|arg| {
                if arg.contains(PATH_PLACEHOLDER) {
                    substituted = true;
                    OsString::from(arg.replace(PATH_PLACEHOLDER, &path.to_string_lossy()))
                } else {
                    OsString::from(arg)
                }
            })
            .collect();

        if !substituted {
            args.push(path.to_os_string());
        }
        args
    }
}

fn split_words(template: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in template.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        bail!("Unterminated {} quote in wallpaper command", q);
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[async_trait]
impl WallpaperSetter for CommandWallpaper {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn set_wallpaper(&self, path: &Path) -> Result<()> {
        run(&self.program, &self.args_for(path), &[]).await
    }
}
