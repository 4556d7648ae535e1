//! 启动器配置（用户数据目录下的 `config.json`）。
//!
//! 该模块描述启动器需要的全部输入：
//! - 游戏地址（`game-url`，与旧版客户端的配置键保持一致）
//! - 各平台插件路径、安装包路径（为空时使用 [`crate::paths`] 中的默认约定）
//! - 安装行为开关（超时、退出码校验、安装后复检）
//!
//! 约定：
//! - 除 `game-url` 外所有字段均通过 `#[serde(default)]` 提供默认值，旧配置可直接加载
//! - 该模块仅定义数据结构与默认值解析，不执行系统修改
//!
//! 作者：OpenATBP 启动器项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::paths;

/// 配置根对象。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LauncherConfig {
    #[serde(default, rename = "game-url")]
    /// 游戏页面地址，插件就绪后交由宿主加载。
    pub game_url: String,
    #[serde(default)]
    /// 插件检测/安装配置。
    pub plugin: PluginSettings,
}

impl LauncherConfig {
    /// 读取并解析配置文件（JSON）。
    ///
    /// 异常处理：
    /// - 文件读取失败（不存在/权限/IO）返回错误
    /// - JSON 解析失败返回错误
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("读取配置失败: {}", path.display()))?;
        let config: LauncherConfig = serde_json::from_slice(&bytes)
            .with_context(|| format!("解析配置 JSON 失败: {}", path.display()))?;
        Ok(config)
    }

    /// 返回非空的游戏地址。
    ///
    /// 异常处理：
    /// - 地址为空（或仅空白）时返回错误
    pub fn game_url(&self) -> Result<&str> {
        let url = self.game_url.trim();
        if url.is_empty() {
            return Err(anyhow!("配置缺少 game-url"));
        }
        Ok(url)
    }
}

/// 插件检测/安装配置。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PluginSettings {
    #[serde(default)]
    pub windows: WindowsPluginSettings,
    #[serde(default)]
    pub macos: MacPluginSettings,
    #[serde(default)]
    /// 静默安装进程的最长等待时间（秒）；为空表示无限等待。
    pub installer_timeout_secs: Option<u64>,
    #[serde(default)]
    /// 是否校验安装进程退出码（默认不校验：进程结束即视为完成）。
    pub strict_exit_code: bool,
    #[serde(default)]
    /// 安装完成后是否重新执行一次检测。
    pub reverify_after_install: bool,
}

impl PluginSettings {
    /// 安装进程超时时间。
    pub fn installer_timeout(&self) -> Option<Duration> {
        self.installer_timeout_secs.map(Duration::from_secs)
    }
}

/// Windows 插件配置。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WindowsPluginSettings {
    #[serde(default)]
    /// 已安装插件库路径（为空使用 `%APPDATA%\..\LocalLow\...\webplayer_win.dll`）。
    pub plugin_library: Option<String>,
    #[serde(default)]
    /// 静默安装包（为空使用 `<resources>/utils/UnityWebPlayer.exe /quiet /S`）。
    pub installer: Option<PayloadInstaller>,
}

impl WindowsPluginSettings {
    /// 解析插件库路径。
    ///
    /// 异常处理：
    /// - 未配置且 `APPDATA` 不存在时返回错误
    pub fn plugin_library_path(&self, resources_dir: &Path) -> Result<PathBuf> {
        match non_empty(&self.plugin_library) {
            Some(raw) => paths::resolve_path(resources_dir, raw),
            None => paths::default_windows_plugin_library(),
        }
    }

    /// 解析安装包定义（路径解析为绝对路径）。
    pub fn installer(&self, resources_dir: &Path) -> Result<PayloadInstaller> {
        match &self.installer {
            Some(installer) => {
                let path = match installer.path.trim() {
                    "" => paths::default_windows_installer(resources_dir),
                    raw => paths::resolve_path(resources_dir, raw)?,
                };
                Ok(PayloadInstaller {
                    path: path.to_string_lossy().into_owned(),
                    ..installer.clone()
                })
            }
            None => Ok(PayloadInstaller {
                path: paths::default_windows_installer(resources_dir)
                    .to_string_lossy()
                    .into_owned(),
                args: default_installer_args(),
                success_exit_codes: Vec::new(),
            }),
        }
    }
}

/// macOS 插件配置。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacPluginSettings {
    #[serde(default)]
    /// 基础插件包路径（为空使用 `/Library/Internet Plug-Ins/Unity Web Player.plugin`）。
    pub plugin_root: Option<String>,
    #[serde(default)]
    /// 随程序分发的播放器 bundle（为空使用 `<resources>/StableUnityPlayer3.x.x-x86_64.bundle`）。
    pub bundle_source: Option<String>,
    #[serde(default = "default_true")]
    /// 是否自动复制播放器 bundle；关闭时仅提示用户手动处理（开发环境使用）。
    pub auto_copy_bundle: bool,
}

impl Default for MacPluginSettings {
    fn default() -> Self {
        Self {
            plugin_root: None,
            bundle_source: None,
            auto_copy_bundle: true,
        }
    }
}

impl MacPluginSettings {
    pub fn plugin_root_path(&self, resources_dir: &Path) -> Result<PathBuf> {
        match non_empty(&self.plugin_root) {
            Some(raw) => paths::resolve_path(resources_dir, raw),
            None => Ok(PathBuf::from(paths::MAC_PLUGIN_ROOT)),
        }
    }

    pub fn bundle_source_path(&self, resources_dir: &Path) -> Result<PathBuf> {
        match non_empty(&self.bundle_source) {
            Some(raw) => paths::resolve_path(resources_dir, raw),
            None => Ok(paths::default_mac_bundle_source(resources_dir)),
        }
    }
}

/// 外部安装器定义。
///
/// 约定：
/// - `path` 可为相对路径（相对资源目录）或绝对路径
/// - `args` 默认为静默参数 `/quiet /S`
/// - `success_exit_codes` 为空时使用默认成功码（0/3010/1641），仅在校验退出码时生效
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PayloadInstaller {
    /// 安装器可执行文件路径。
    pub path: String,
    #[serde(default = "default_installer_args")]
    /// 安装器命令行参数列表。
    pub args: Vec<String>,
    #[serde(default)]
    /// 视为成功的退出码列表。
    pub success_exit_codes: Vec<i32>,
}

impl PayloadInstaller {
    /// 实际生效的成功退出码。
    ///
    /// 约定的默认成功码：
    /// - 0：成功
    /// - 3010：成功但需要重启（MSI 常见）
    /// - 1641：成功并已触发重启（MSI 常见）
    pub fn effective_success_codes(&self) -> Vec<i32> {
        if self.success_exit_codes.is_empty() {
            vec![0, 3010, 1641]
        } else {
            self.success_exit_codes.clone()
        }
    }
}

fn default_installer_args() -> Vec<String> {
    vec!["/quiet".to_string(), "/S".to_string()]
}

fn default_true() -> bool {
    true
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// 旧版客户端的配置只有 `game-url`，应能直接加载。
    fn legacy_config_loads_with_defaults() {
        let cfg: LauncherConfig = serde_json::from_str(r#"{ "game-url": "http://127.0.0.1:8000/" }"#).unwrap();
        assert_eq!(cfg.game_url().unwrap(), "http://127.0.0.1:8000/");
        assert!(cfg.plugin.macos.auto_copy_bundle);
        assert!(!cfg.plugin.strict_exit_code);
        assert!(!cfg.plugin.reverify_after_install);
        assert_eq!(cfg.plugin.installer_timeout(), None);
    }

    #[test]
    fn blank_game_url_is_rejected() {
        let cfg: LauncherConfig = serde_json::from_str(r#"{ "game-url": "   " }"#).unwrap();
        assert!(cfg.game_url().is_err());
        assert!(LauncherConfig::default().game_url().is_err());
    }

    #[test]
    fn installer_defaults_to_silent_flags() {
        let base = Path::new("/opt/atbp");
        let installer = WindowsPluginSettings::default().installer(base).unwrap();
        assert_eq!(installer.args, vec!["/quiet", "/S"]);
        assert!(installer.path.ends_with("UnityWebPlayer.exe"));
        assert_eq!(installer.effective_success_codes(), vec![0, 3010, 1641]);
    }

    #[test]
    fn configured_installer_path_is_resolved_against_resources() {
        let json = r#"{ "installer": { "path": "bin/setup.exe", "success_exit_codes": [0] } }"#;
        let settings: WindowsPluginSettings = serde_json::from_str(json).unwrap();
        let installer = settings.installer(Path::new("/opt/atbp")).unwrap();
        assert_eq!(PathBuf::from(&installer.path), Path::new("/opt/atbp").join("bin/setup.exe"));
        assert_eq!(installer.args, vec!["/quiet", "/S"]);
        assert_eq!(installer.effective_success_codes(), vec![0]);
    }

    #[test]
    fn blank_installer_path_falls_back_to_bundled_installer() {
        let base = Path::new("/opt/atbp");
        for json in [
            r#"{ "installer": { "path": "", "args": ["/S"], "success_exit_codes": [0, 5] } }"#,
            r#"{ "installer": { "path": "   ", "args": ["/S"], "success_exit_codes": [0, 5] } }"#,
        ] {
            let settings: WindowsPluginSettings = serde_json::from_str(json).unwrap();
            let installer = settings.installer(base).unwrap();
            assert_eq!(PathBuf::from(&installer.path), paths::default_windows_installer(base));
            assert_eq!(installer.args, vec!["/S"]);
            assert_eq!(installer.effective_success_codes(), vec![0, 5]);
        }
    }

    #[test]
    fn mac_paths_fall_back_to_conventions() {
        let base = Path::new("/Applications/OpenATBP.app/Contents/Resources");
        let mac = MacPluginSettings {
            plugin_root: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(mac.plugin_root_path(base).unwrap(), PathBuf::from(paths::MAC_PLUGIN_ROOT));
        assert_eq!(
            mac.bundle_source_path(base).unwrap(),
            base.join("StableUnityPlayer3.x.x-x86_64.bundle")
        );
    }

    #[test]
    fn timeout_and_strict_flags_parse() {
        let json = r#"{ "installer_timeout_secs": 90, "strict_exit_code": true, "reverify_after_install": true }"#;
        let settings: PluginSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.installer_timeout(), Some(Duration::from_secs(90)));
        assert!(settings.strict_exit_code);
        assert!(settings.reverify_after_install);
    }
}
