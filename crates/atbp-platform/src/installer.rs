//! 按平台分派的插件检测与安装。
//!
//! 平台集合是封闭的：Windows、macOS 以及“其他”（插件机制不支持，直接放行）。
//!
//! 作者：OpenATBP 启动器项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::{Path, PathBuf};

use anyhow::Result;
use atbp_core::config::PluginSettings;
use atbp_core::platform::PlatformVariant;
use tracing::debug;

use crate::error::{InstallError, UnsupportedReason};
use crate::macos::MacInstaller;
use crate::windows::WindowsInstaller;

/// 检测结果。
#[derive(Debug)]
pub enum PresenceCheck {
    /// 插件就绪，无需安装。
    Present,
    /// 插件缺失或不符，平台支持自动安装。
    Missing,
    /// 无法自动修复。
    Unsupported(UnsupportedReason),
}

/// 安装动作的结果描述。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallReport {
    /// 静默安装进程已退出。
    InstallerExited { code: Option<i32> },
    /// 播放器 bundle 已复制到位。
    BundleCopied { destination: PathBuf },
    /// 未执行自动安装，需要用户按说明操作。
    ManualStepRequired { instructions: String },
    /// 平台无需任何动作。
    NoAction,
}

/// `ensure_ready` 的完成结果。
#[derive(Debug)]
pub enum InstallOutcome {
    AlreadyPresent,
    Installed(InstallReport),
    Unsupported(UnsupportedReason),
    Failed(InstallError),
}

/// 平台安装器。
#[derive(Debug, Clone)]
pub enum PlatformInstaller {
    Windows(WindowsInstaller),
    MacOS(MacInstaller),
    Unsupported,
}

impl PlatformInstaller {
    /// 按平台与配置构造安装器。
    ///
    /// 参数：
    /// - `platform`：宿主平台（启动时确定）
    /// - `settings`：插件配置
    /// - `resources_dir`：随程序分发资源所在目录（相对路径的基准）
    ///
    /// 异常处理：
    /// - 默认路径依赖的环境变量缺失、或配置中出现空路径时返回错误
    pub fn from_config(platform: PlatformVariant, settings: &PluginSettings, resources_dir: &Path) -> Result<Self> {
        let installer = match platform {
            PlatformVariant::Windows => Self::Windows(
                WindowsInstaller::new(
                    settings.windows.plugin_library_path(resources_dir)?,
                    settings.windows.installer(resources_dir)?,
                )
                .with_timeout(settings.installer_timeout())
                .with_strict_exit_code(settings.strict_exit_code),
            ),
            PlatformVariant::MacOS => Self::MacOS(
                MacInstaller::new(
                    settings.macos.plugin_root_path(resources_dir)?,
                    settings.macos.bundle_source_path(resources_dir)?,
                )
                .with_auto_copy_bundle(settings.macos.auto_copy_bundle),
            ),
            PlatformVariant::Other => Self::Unsupported,
        };
        Ok(installer)
    }

    pub fn platform(&self) -> PlatformVariant {
        match self {
            Self::Windows(_) => PlatformVariant::Windows,
            Self::MacOS(_) => PlatformVariant::MacOS,
            Self::Unsupported => PlatformVariant::Other,
        }
    }

    /// 检测插件（不做系统修改）。
    pub async fn check(&self) -> PresenceCheck {
        match self {
            Self::Windows(w) => w.check().await,
            Self::MacOS(m) => m.check().await,
            Self::Unsupported => {
                debug!("当前平台不支持 Unity Web Player，跳过检测");
                PresenceCheck::Present
            }
        }
    }

    /// 执行安装动作。
    pub async fn install(&self) -> Result<InstallReport, InstallError> {
        match self {
            Self::Windows(w) => w.install().await,
            Self::MacOS(m) => m.install().await,
            Self::Unsupported => Ok(InstallReport::NoAction),
        }
    }

    /// 检测并在需要时安装，结束后调用一次 `on_complete`。
    pub async fn ensure_ready<F>(&self, on_complete: F)
    where
        F: FnOnce(InstallOutcome),
    {
        let outcome = match self.check().await {
            PresenceCheck::Present => InstallOutcome::AlreadyPresent,
            PresenceCheck::Unsupported(reason) => InstallOutcome::Unsupported(reason),
            PresenceCheck::Missing => match self.install().await {
                Ok(report) => InstallOutcome::Installed(report),
                Err(e) => InstallOutcome::Failed(e),
            },
        };
        on_complete(outcome);
    }
}
