// External tool discovery: yt-dlp, ffmpeg and the Python yt_dlp module

use serde::{Deserialize, Serialize};
use std::process::Command;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum ToolType {
    YtDlp,
    Ffmpeg,
    PythonYtDlp,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "yt-dlp",
            ToolType::Ffmpeg => "ffmpeg",
            ToolType::PythonYtDlp => "python-yt-dlp",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub tool_type: ToolType,
    pub version: Option<String>,
    pub path: Option<String>,
    pub is_available: bool,
}

/// Configured locations, each falling back to discovery
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    pub ytdlp_path: Option<String>,
    pub ffmpeg_path: Option<String>,
    pub python: Option<String>,
}

impl ToolManager {
    pub fn new(
        ytdlp_path: Option<String>,
        ffmpeg_path: Option<String>,
        python: Option<String>,
    ) -> Self {
        Self {
            ytdlp_path,
            ffmpeg_path,
            python,
        }
    }

    pub fn get_tool_info(&self, tool_type: ToolType) -> ToolInfo {
        let name = tool_type.as_str().to_string();

        let (path, version) = match tool_type {
            ToolType::YtDlp => self.detect_binary(self.ytdlp_path.as_deref(), "yt-dlp", "--version"),
            ToolType::Ffmpeg => self.detect_binary(self.ffmpeg_path.as_deref(), "ffmpeg", "-version"),
            ToolType::PythonYtDlp => {
                let python = self.python.clone().unwrap_or_else(find_python);
                let version = python_module_version(&python);
                (version.as_ref().map(|_| python), version)
            }
        };

        ToolInfo {
            name,
            tool_type,
            is_available: version.is_some(),
            version,
            path,
        }
    }

    pub fn get_all_tools(&self) -> Vec<ToolInfo> {
        vec![
            self.get_tool_info(ToolType::YtDlp),
            self.get_tool_info(ToolType::PythonYtDlp),
            self.get_tool_info(ToolType::Ffmpeg),
        ]
    }

    fn detect_binary(
        &self,
        configured: Option<&str>,
        binary_name: &str,
        version_arg: &str,
    ) -> (Option<String>, Option<String>) {
        let path = match configured {
            Some(p) => Some(p.to_string()),
            None => locate_binary(binary_name),
        };

        match path {
            Some(path) => {
                let version = get_version(&path, version_arg);
                (Some(path), version)
            }
            None => (None, None),
        }
    }
}

/// Find a binary in common install paths, then in PATH
pub fn locate_binary(binary_name: &str) -> Option<String> {
    let common_paths = [
        format!("/opt/homebrew/bin/{}", binary_name),
        format!("/usr/local/bin/{}", binary_name),
        format!("/usr/bin/{}", binary_name),
    ];

    for path in common_paths {
        if std::path::Path::new(&path).exists() {
            return Some(path);
        }
    }

    if let Ok(output) = Command::new("which").arg(binary_name).output() {
        if output.status.success() {
            let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !path.is_empty() {
                return Some(path);
            }
        }
    }

    None
}

/// Located binary, or the bare name left for PATH lookup at spawn time
pub fn find_binary(binary_name: &str) -> String {
    locate_binary(binary_name).unwrap_or_else(|| binary_name.to_string())
}

/// First Python interpreter that runs
pub fn find_python() -> String {
    let candidates = ["python3", "/opt/homebrew/bin/python3", "/usr/local/bin/python3"];

    for cmd in candidates {
        if let Ok(output) = Command::new(cmd).arg("--version").output() {
            if output.status.success() {
                return cmd.to_string();
            }
        }
    }

    "python3".to_string()
}

/// First line of `<path> <arg>` output when the command succeeds
pub fn get_version(path: &str, arg: &str) -> Option<String> {
    match Command::new(path).arg(arg).output() {
        Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .map(|l| l.trim().to_string()),
        _ => None,
    }
}

/// yt_dlp module version, None when the module is missing
pub fn python_module_version(python: &str) -> Option<String> {
    let code = "import yt_dlp.version; print(yt_dlp.version.__version__)";
    match Command::new(python).args(["-c", code]).output() {
        Ok(out) if out.status.success() => {
            Some(String::from_utf8_lossy(&out.stdout).trim().to_string())
        }
        _ => None,
    }
}
