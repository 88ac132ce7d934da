//! 平台标识 - 用于在 registry 中选择对应的实现

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 运行平台
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Darwin,
    Win32,
    Linux,
    /// 其他系统（BSD 等），没有任何实现
    Unsupported,
}

impl Platform {
    /// 当前编译目标对应的平台
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Darwin
        } else if cfg!(target_os = "windows") {
            Platform::Win32
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Unsupported
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Darwin => "darwin",
            Platform::Win32 => "win32",
            Platform::Linux => "linux",
            Platform::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "darwin" | "macos" => Ok(Platform::Darwin),
            "win32" | "windows" => Ok(Platform::Win32),
            "linux" => Ok(Platform::Linux),
            other => Err(anyhow::anyhow!(
                "unknown platform: {} (expected darwin, win32 or linux)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_from_str_aliases() {
        assert_eq!("darwin".parse::<Platform>().unwrap(), Platform::Darwin);
        assert_eq!("macOS".parse::<Platform>().unwrap(), Platform::Darwin);
        assert_eq!("Windows".parse::<Platform>().unwrap(), Platform::Win32);
        assert_eq!(" linux ".parse::<Platform>().unwrap(), Platform::Linux);
        assert!("beos".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_display_roundtrips() {
        for p in [Platform::Darwin, Platform::Win32, Platform::Linux] {
            assert_eq!(p.to_string().parse::<Platform>().unwrap(), p);
        }
    }
}
