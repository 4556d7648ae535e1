//! Windows：按内容指纹检测插件，缺失或版本不符时静默安装。
//!
//! 检测逻辑：
//! - 对已安装的 `webplayer_win.dll` 计算 MD5，与已验证构建的参考值比对
//! - 文件缺失/不可读与指纹不符同样视为“需要安装”
//!
//! 安装逻辑：
//! - 以 `/quiet /S` 启动随附安装包，进程结束即视为完成
//! - 默认不检查退出码；`strict_exit_code` 打开后按成功码列表判断
//!
//! 作者：OpenATBP 启动器项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::{Path, PathBuf};
use std::time::Duration;

use atbp_core::config::PayloadInstaller;
use atbp_core::fingerprint::{self, KnownGoodFingerprint, WEBPLAYER_WIN_KNOWN_GOOD};
use tracing::{info, warn};

use crate::error::InstallError;
use crate::installer::{InstallReport, PresenceCheck};
use crate::process;

/// Windows 平台安装器。
#[derive(Debug, Clone)]
pub struct WindowsInstaller {
    plugin_library: PathBuf,
    installer: PayloadInstaller,
    known_good: KnownGoodFingerprint,
    timeout: Option<Duration>,
    strict_exit_code: bool,
}

impl WindowsInstaller {
    /// 创建安装器，参考指纹为 [`WEBPLAYER_WIN_KNOWN_GOOD`]。
    pub fn new(plugin_library: PathBuf, installer: PayloadInstaller) -> Self {
        Self {
            plugin_library,
            installer,
            known_good: WEBPLAYER_WIN_KNOWN_GOOD,
            timeout: None,
            strict_exit_code: false,
        }
    }

    /// 替换参考指纹。
    pub fn with_known_good(mut self, known_good: KnownGoodFingerprint) -> Self {
        self.known_good = known_good;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_strict_exit_code(mut self, strict: bool) -> Self {
        self.strict_exit_code = strict;
        self
    }

    pub fn plugin_library(&self) -> &Path {
        &self.plugin_library
    }

    pub fn installer(&self) -> &PayloadInstaller {
        &self.installer
    }

    /// 检测已安装插件是否为已验证构建。
    ///
    /// 返回值：
    /// - `Present`：指纹一致
    /// - `Missing`：文件缺失、不可读或指纹不符
    pub async fn check(&self) -> PresenceCheck {
        let path = self.plugin_library.clone();
        let known_good = self.known_good;
        let hashed =
            tokio::task::spawn_blocking(move || fingerprint::matches_known_good(&path, &known_good)).await;
        match hashed {
            Ok(Ok(true)) => {
                info!("插件指纹一致: {}", self.plugin_library.display());
                PresenceCheck::Present
            }
            Ok(Ok(false)) => {
                info!("插件指纹不符，需要重新安装: {}", self.plugin_library.display());
                PresenceCheck::Missing
            }
            Ok(Err(e)) => {
                info!("插件不可读，视为未安装: {e}");
                PresenceCheck::Missing
            }
            Err(e) => {
                warn!("指纹计算任务异常，视为未安装: {e}");
                PresenceCheck::Missing
            }
        }
    }

    /// 运行静默安装并等待结束。
    ///
    /// 异常处理：
    /// - 启动/等待失败、超时返回错误
    /// - `strict_exit_code` 打开且退出码不在成功列表时返回 [`InstallError::ExitCode`]
    pub async fn install(&self) -> Result<InstallReport, InstallError> {
        let code = process::run_silent_installer(&self.installer, self.timeout).await?;
        let success = code.is_some_and(|c| self.installer.effective_success_codes().contains(&c));
        if !success {
            if self.strict_exit_code {
                return Err(InstallError::ExitCode {
                    path: PathBuf::from(&self.installer.path),
                    code,
                });
            }
            warn!("安装程序退出码为 {:?}，按约定仍视为完成", code);
        }
        info!("Unity Web Player 安装完成");
        Ok(InstallReport::InstallerExited { code })
    }
}
