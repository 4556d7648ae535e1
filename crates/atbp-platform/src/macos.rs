//! macOS：基础插件只能由用户手动安装，播放器 bundle 可自动补齐。
//!
//! 检测逻辑：
//! 1) 基础插件可执行文件必须存在，否则无法自动修复（需用户安装 webplayer-mini.dmg）
//! 2) 基础插件必须包含 x86_64 架构；不包含或无法解析同样需要用户处理
//! 3) 播放器 bundle 已存在视为就绪，否则复制随附的 bundle
//!
//! 作者：OpenATBP 启动器项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::{Path, PathBuf};

use atbp_core::macho::{self, ArchitectureTag};
use atbp_core::paths;
use tracing::{debug, info};

use crate::copy;
use crate::error::{InstallError, UnsupportedReason};
use crate::installer::{InstallReport, PresenceCheck};

/// 基础插件必须包含的架构。
pub const REQUIRED_ARCH: ArchitectureTag = ArchitectureTag::X86_64;

/// macOS 平台安装器。
#[derive(Debug, Clone)]
pub struct MacInstaller {
    plugin_root: PathBuf,
    bundle_source: PathBuf,
    auto_copy_bundle: bool,
}

impl MacInstaller {
    pub fn new(plugin_root: PathBuf, bundle_source: PathBuf) -> Self {
        Self {
            plugin_root,
            bundle_source,
            auto_copy_bundle: true,
        }
    }

    /// 关闭后不复制 bundle，仅返回手动处理说明（开发环境使用）。
    pub fn with_auto_copy_bundle(mut self, enabled: bool) -> Self {
        self.auto_copy_bundle = enabled;
        self
    }

    pub fn plugin_root(&self) -> &Path {
        &self.plugin_root
    }

    /// 基础插件的可执行文件。
    pub fn plugin_executable(&self) -> PathBuf {
        paths::mac_plugin_executable(&self.plugin_root)
    }

    /// 播放器 bundle 的目标位置。
    pub fn player_bundle(&self) -> PathBuf {
        paths::mac_player_bundle(&self.plugin_root)
    }

    pub fn bundle_source(&self) -> &Path {
        &self.bundle_source
    }

    /// 检测基础插件架构与播放器 bundle。
    ///
    /// 返回值：
    /// - `Unsupported`：基础插件缺失/不可读/缺少 x86_64 架构/无法解析
    /// - `Present`：基础插件正常且 bundle 已存在
    /// - `Missing`：基础插件正常但 bundle 缺失
    pub async fn check(&self) -> PresenceCheck {
        let exe = self.plugin_executable();
        let bundle = self.player_bundle();
        let checked = tokio::task::spawn_blocking(move || check_blocking(exe, bundle)).await;
        match checked {
            Ok(result) => result,
            Err(e) => PresenceCheck::Unsupported(UnsupportedReason::BasePluginUnreadable {
                path: self.plugin_executable(),
                source: std::io::Error::other(e.to_string()),
            }),
        }
    }

    /// 复制随附的播放器 bundle 到插件包内。
    ///
    /// 异常处理：
    /// - 随附 bundle 不存在返回 [`InstallError::MissingArtifact`]
    /// - 复制失败返回 [`InstallError::Copy`]（目标位置不会留下半份 bundle）
    pub async fn install(&self) -> Result<InstallReport, InstallError> {
        let destination = self.player_bundle();
        if !self.auto_copy_bundle {
            let instructions = format!(
                "当前运行方式不支持自动安装播放器 bundle。若加载失败，请解除 \"{}\" 的隔离属性并解压为 \"{}\"。",
                self.bundle_source.display(),
                destination.display()
            );
            return Ok(InstallReport::ManualStepRequired { instructions });
        }

        info!(
            "复制播放器 bundle: {} -> {}",
            self.bundle_source.display(),
            destination.display()
        );
        let src = self.bundle_source.clone();
        let dst = destination.clone();
        tokio::task::spawn_blocking(move || copy::copy_staged(&src, &dst))
            .await
            .map_err(|e| InstallError::Task(e.to_string()))??;
        Ok(InstallReport::BundleCopied { destination })
    }
}

fn check_blocking(exe: PathBuf, bundle: PathBuf) -> PresenceCheck {
    let buffer = match std::fs::read(&exe) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return PresenceCheck::Unsupported(UnsupportedReason::BasePluginMissing { path: exe });
        }
        Err(source) => {
            return PresenceCheck::Unsupported(UnsupportedReason::BasePluginUnreadable { path: exe, source });
        }
    };
    match macho::supports_architecture(&buffer, REQUIRED_ARCH) {
        Ok(true) => debug!("基础插件包含 {REQUIRED_ARCH}: {}", exe.display()),
        Ok(false) => {
            return PresenceCheck::Unsupported(UnsupportedReason::ArchitectureMissing {
                path: exe,
                arch: REQUIRED_ARCH,
            });
        }
        Err(source) => {
            return PresenceCheck::Unsupported(UnsupportedReason::ArchitectureUnconfirmed { path: exe, source });
        }
    }
    drop(buffer);

    if bundle.exists() {
        PresenceCheck::Present
    } else {
        info!("播放器 bundle 缺失: {}", bundle.display());
        PresenceCheck::Missing
    }
}
