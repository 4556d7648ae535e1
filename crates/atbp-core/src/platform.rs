//! 宿主平台分类。
//!
//! 作者：OpenATBP 启动器项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 宿主平台。进程启动时确定一次，运行期间不变。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformVariant {
    Windows,
    #[serde(rename = "macos")]
    MacOS,
    /// 插件机制不支持的其他平台。
    Other,
}

impl PlatformVariant {
    /// 按编译目标识别当前平台。
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOS
        } else {
            Self::Other
        }
    }
}

impl FromStr for PlatformVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "windows" | "win32" => Ok(Self::Windows),
            "macos" | "darwin" => Ok(Self::MacOS),
            "other" | "linux" => Ok(Self::Other),
            other => Err(format!("未知平台: {other}")),
        }
    }
}

impl fmt::Display for PlatformVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Windows => "windows",
            Self::MacOS => "macos",
            Self::Other => "other",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_node_style_names() {
        assert_eq!("win32".parse::<PlatformVariant>().unwrap(), PlatformVariant::Windows);
        assert_eq!("Darwin".parse::<PlatformVariant>().unwrap(), PlatformVariant::MacOS);
        assert_eq!("linux".parse::<PlatformVariant>().unwrap(), PlatformVariant::Other);
        assert!("beos".parse::<PlatformVariant>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for p in [PlatformVariant::Windows, PlatformVariant::MacOS, PlatformVariant::Other] {
            assert_eq!(p.to_string().parse::<PlatformVariant>().unwrap(), p);
        }
    }
}
