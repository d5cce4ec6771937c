//! Login-item registration.
//!
//! Registers `lumin start` to run when the user logs in:
//!
//! - **Linux and other Unix**: an XDG autostart entry,
//!   `$XDG_CONFIG_HOME/autostart/lumin.desktop` (default `~/.config`)
//! - **macOS**: a LaunchAgent, `~/Library/LaunchAgents/com.<owner>.lumin.plist`
//! - **Windows**: a value under `HKCU\Software\Microsoft\Windows\CurrentVersion\Run`
//!
//! All three work without administrator rights.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lumin::libs::autostart;
//!
//! autostart::enable()?;
//! assert!(autostart::is_enabled()?);
//! autostart::disable()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::libs::data_storage::{APP_NAME, VENDOR_NAME};
use crate::libs::messages::Message;
use crate::{msg_debug, msg_error_anyhow, msg_info};
use anyhow::Result;
use std::env;

#[cfg(target_os = "windows")]
mod windows {
    use super::*;
    use std::os::windows::process::CommandExt;
    use std::process::Command;

    const RUN_KEY: &str = r"HKCU\Software\Microsoft\Windows\CurrentVersion\Run";
    const VALUE_NAME: &str = "Lumin";
    const CREATE_NO_WINDOW: u32 = 0x08000000;

    /// `reg` prints in the console code page; fall back to Windows-1252 when it is not UTF-8.
    pub(crate) fn decode_windows_output(bytes: &[u8]) -> String {
        if let Ok(utf8) = String::from_utf8(bytes.to_vec()) {
            return utf8;
        }
        encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
    }

    pub fn enable() -> Result<()> {
        let exe_path = env::current_exe()?;
        let exe_path_str = exe_path.to_string_lossy();
        msg_debug!(format!("Registering login item for: {}", exe_path_str));

        let output = Command::new("reg")
            .args([
                "add",
                RUN_KEY,
                "/v",
                VALUE_NAME,
                "/t",
                "REG_SZ",
                "/d",
                &format!("\"{}\" start", exe_path_str),
                "/f",
            ])
            .creation_flags(CREATE_NO_WINDOW)
            .output()?;

        if output.status.success() {
            msg_info!(Message::AutostartEnabled);
            Ok(())
        } else {
            let error = decode_windows_output(&output.stderr);
            Err(msg_error_anyhow!(Message::AutostartEnableFailed(error)))
        }
    }

    pub fn disable() -> Result<()> {
        let output = Command::new("reg")
            .args(["delete", RUN_KEY, "/v", VALUE_NAME, "/f"])
            .creation_flags(CREATE_NO_WINDOW)
            .output()?;

        if output.status.success() {
            msg_info!(Message::AutostartDisabled);
            return Ok(());
        }

        let error = decode_windows_output(&output.stderr);
        if error.contains("unable to find") || error.contains("cannot find") {
            msg_info!(Message::AutostartAlreadyDisabled);
            Ok(())
        } else {
            Err(msg_error_anyhow!(Message::AutostartDisableFailed(error)))
        }
    }

    pub fn is_enabled() -> Result<bool> {
        let output = Command::new("reg")
            .args(["query", RUN_KEY, "/v", VALUE_NAME])
            .creation_flags(CREATE_NO_WINDOW)
            .output()?;
        Ok(output.status.success())
    }
}

#[cfg(not(target_os = "windows"))]
mod unix {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn home_dir() -> Result<PathBuf> {
        env::var_os("HOME")
            .map(PathBuf::from)
            .ok_or_else(|| msg_error_anyhow!(Message::HomeDirectoryNotFound))
    }

    /// Location of the login item file for this platform.
    pub fn entry_path() -> Result<PathBuf> {
        if cfg!(target_os = "macos") {
            Ok(home_dir()?
                .join("Library")
                .join("LaunchAgents")
                .join(format!("com.{}.{}.plist", VENDOR_NAME, APP_NAME)))
        } else {
            let config_home = match env::var_os("XDG_CONFIG_HOME").filter(|value| !value.is_empty()) {
                Some(dir) => PathBuf::from(dir),
                None => home_dir()?.join(".config"),
            };
            Ok(config_home.join("autostart").join(format!("{}.desktop", APP_NAME)))
        }
    }

    pub fn entry_contents(exe: &str) -> String {
        if cfg!(target_os = "macos") {
            launch_agent_plist(exe)
        } else {
            desktop_entry(exe)
        }
    }

    pub fn enable() -> Result<()> {
        let exe_path = env::current_exe()?;
        let path = entry_path()?;
        msg_debug!(format!("Writing login item to {}", path.display()));

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| msg_error_anyhow!(Message::AutostartEnableFailed(e.to_string())))?;
        }
        fs::write(&path, entry_contents(&exe_path.to_string_lossy()))
            .map_err(|e| msg_error_anyhow!(Message::AutostartEnableFailed(e.to_string())))?;

        msg_info!(Message::AutostartEnabled);
        Ok(())
    }

    pub fn disable() -> Result<()> {
        let path = entry_path()?;
        if !path.exists() {
            msg_info!(Message::AutostartAlreadyDisabled);
            return Ok(());
        }

        fs::remove_file(&path).map_err(|e| msg_error_anyhow!(Message::AutostartDisableFailed(e.to_string())))?;
        msg_info!(Message::AutostartDisabled);
        Ok(())
    }

    pub fn is_enabled() -> Result<bool> {
        Ok(entry_path()?.exists())
    }
}

/// XDG desktop entry that launches the daemon at login.
pub fn desktop_entry(exe: &str) -> String {
    format!(
        "[Desktop Entry]\nType=Application\nName=Lumin\nComment=Break reminders\nExec=\"{}\" start\nTerminal=false\nX-GNOME-Autostart-enabled=true\n",
        exe
    )
}

/// LaunchAgent property list that launches the daemon at login.
pub fn launch_agent_plist(exe: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>com.{vendor}.{app}</string>
    <key>ProgramArguments</key>
    <array>
        <string>{exe}</string>
        <string>start</string>
    </array>
    <key>RunAtLoad</key>
    <true/>
</dict>
</plist>
"#,
        vendor = VENDOR_NAME,
        app = APP_NAME,
        exe = exe
    )
}

#[cfg(not(target_os = "windows"))]
pub use unix::entry_path;

pub fn enable() -> Result<()> {
    #[cfg(target_os = "windows")]
    return windows::enable();

    #[cfg(not(target_os = "windows"))]
    return unix::enable();
}

pub fn disable() -> Result<()> {
    #[cfg(target_os = "windows")]
    return windows::disable();

    #[cfg(not(target_os = "windows"))]
    return unix::disable();
}

pub fn is_enabled() -> Result<bool> {
    #[cfg(target_os = "windows")]
    return windows::is_enabled();

    #[cfg(not(target_os = "windows"))]
    return unix::is_enabled();
}

pub fn status() -> Result<String> {
    Ok(if is_enabled()? { "enabled" } else { "disabled" }.to_string())
}
