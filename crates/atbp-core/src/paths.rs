//! 统一路径与目录约定。
//!
//! 目标：
//! - 将插件路径、安装包路径、用户配置路径集中管理，避免散落在各模块中
//! - 所有默认值都可被配置文件覆盖（见 [`crate::config`]）
//!
//! 作者：OpenATBP 启动器项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::platform::PlatformVariant;

/// 用户数据目录名。
pub const APP_DIR_NAME: &str = "OpenATBPClient";

/// 用户配置文件名。
pub const CONFIG_FILE_NAME: &str = "config.json";

/// macOS 系统级插件包（基础插件，无法自动安装）。
pub const MAC_PLUGIN_ROOT: &str = "/Library/Internet Plug-Ins/Unity Web Player.plugin";

/// 播放器 bundle 目录名（macOS，x86_64）。
pub const MAC_PLAYER_BUNDLE_NAME: &str = "StableUnityPlayer3.x.x-x86_64.bundle";

/// Windows 静默安装包文件名。
pub const WIN_INSTALLER_NAME: &str = "UnityWebPlayer.exe";

/// 获取用户数据目录。
///
/// 返回值：
/// - Windows：`%APPDATA%\OpenATBPClient`
/// - macOS：`$HOME/Library/Application Support/OpenATBPClient`
/// - 其他：`$XDG_CONFIG_HOME/OpenATBPClient`，未设置时为 `$HOME/.config/OpenATBPClient`
///
/// 异常处理：
/// - 所需环境变量不存在时返回错误。
pub fn user_data_dir(platform: PlatformVariant) -> Result<PathBuf> {
    let base = match platform {
        PlatformVariant::Windows => PathBuf::from(std::env::var("APPDATA").context("读取 APPDATA 环境变量失败")?),
        PlatformVariant::MacOS => home_dir()?.join("Library").join("Application Support"),
        PlatformVariant::Other => match std::env::var("XDG_CONFIG_HOME") {
            Ok(v) if !v.is_empty() => PathBuf::from(v),
            _ => home_dir()?.join(".config"),
        },
    };
    Ok(base.join(APP_DIR_NAME))
}

/// 默认用户配置文件路径（`<user_data_dir>/config.json`）。
pub fn user_config_file(platform: PlatformVariant) -> Result<PathBuf> {
    Ok(user_data_dir(platform)?.join(CONFIG_FILE_NAME))
}

fn home_dir() -> Result<PathBuf> {
    Ok(PathBuf::from(std::env::var("HOME").context("读取 HOME 环境变量失败")?))
}

/// 当前可执行文件所在目录（安装目录）。
///
/// 异常处理：
/// - 无法获取当前 exe 路径时返回错误
pub fn install_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("读取当前可执行文件路径失败")?;
    Ok(exe.parent().unwrap_or_else(|| Path::new(".")).to_path_buf())
}

/// 随程序分发的资源目录。
///
/// 返回值：
/// - macOS：`.app` 包内的 `Contents/Resources`（可执行文件位于 `Contents/MacOS`）
/// - 其他：安装目录本身
pub fn resources_dir(platform: PlatformVariant, install_dir: &Path) -> PathBuf {
    match platform {
        PlatformVariant::MacOS => install_dir.join("..").join("Resources"),
        PlatformVariant::Windows | PlatformVariant::Other => install_dir.to_path_buf(),
    }
}

/// 默认配置模板（首次运行时复制到用户配置路径）。
pub fn default_config_template(resources_dir: &Path) -> PathBuf {
    resources_dir.join("defaults").join(CONFIG_FILE_NAME)
}

/// Windows 下已安装插件库的默认路径。
///
/// 返回值：
/// - `%APPDATA%\..\LocalLow\Unity\WebPlayer\player\3.x.x\webplayer_win.dll`
///
/// 异常处理：
/// - `APPDATA` 环境变量不存在时返回错误
pub fn default_windows_plugin_library() -> Result<PathBuf> {
    let appdata = PathBuf::from(std::env::var("APPDATA").context("读取 APPDATA 环境变量失败")?);
    let roaming_parent = appdata.parent().map(Path::to_path_buf).unwrap_or(appdata);
    Ok(roaming_parent
        .join("LocalLow")
        .join("Unity")
        .join("WebPlayer")
        .join("player")
        .join("3.x.x")
        .join("webplayer_win.dll"))
}

/// Windows 静默安装包默认路径（`<resources>/utils/UnityWebPlayer.exe`）。
pub fn default_windows_installer(resources_dir: &Path) -> PathBuf {
    resources_dir.join("utils").join(WIN_INSTALLER_NAME)
}

/// 基础插件包内的可执行文件（用于架构检测）。
pub fn mac_plugin_executable(plugin_root: &Path) -> PathBuf {
    plugin_root.join("Contents").join("MacOS").join("Unity Web Player")
}

/// 基础插件包内的播放器 bundle 目标路径。
pub fn mac_player_bundle(plugin_root: &Path) -> PathBuf {
    plugin_root
        .join("Contents")
        .join("Frameworks")
        .join(MAC_PLAYER_BUNDLE_NAME)
}

/// 随程序分发的播放器 bundle 默认路径。
pub fn default_mac_bundle_source(resources_dir: &Path) -> PathBuf {
    resources_dir.join(MAC_PLAYER_BUNDLE_NAME)
}

/// 判断可执行文件是否位于系统临时目录（常见于用户未解压直接运行 zip 内程序）。
pub fn is_under_temp_dir(exe: &Path) -> bool {
    let tmp = std::env::temp_dir();
    if exe.starts_with(&tmp) {
        return true;
    }
    match (tmp.canonicalize(), exe.canonicalize()) {
        (Ok(tmp), Ok(exe)) => exe.starts_with(tmp),
        _ => false,
    }
}

/// 将配置中的路径字段解析为实际路径。
///
/// 参数：
/// - `base`：相对路径的基准目录（通常是资源目录）
/// - `raw`：配置中的路径字符串
///
/// 返回值：
/// - `raw` 为绝对路径：直接返回
/// - `raw` 为相对路径：返回 `base.join(raw)`
///
/// 异常处理：
/// - `raw` 为空字符串时返回错误
pub fn resolve_path(base: &Path, raw: &str) -> Result<PathBuf> {
    if raw.is_empty() {
        return Err(anyhow!("空路径"));
    }
    let p = PathBuf::from(raw);
    if p.is_absolute() {
        Ok(p)
    } else {
        Ok(base.join(p))
    }
}
