//! 插件就绪控制器：编排检测与安装，产出唯一一次“就绪”信号。
//!
//! 行为：
//! - `Verified` / `Installed`：调用 `on_ready`（恰好一次）
//! - `Unsupported` / `Failed`：不调用 `on_ready`，改为通过 [`Notifier`] 给出阻塞式错误提示，
//!   宿主据返回的终态停止后续启动流程
//!
//! 作者：OpenATBP 启动器项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::error::Error;

use atbp_core::state::ReadinessState;
use tracing::{info, warn};

use crate::error::InstallError;
use crate::installer::{InstallReport, PlatformInstaller, PresenceCheck};
use crate::notify::Notifier;

const ERROR_TITLE: &str = "错误";
const INFO_TITLE: &str = "提示";

/// 插件就绪控制器。
///
/// 持有唯一的 [`ReadinessState`]；`ensure_ready` 消耗控制器本身，因此每个实例只运行一次流程。
pub struct PluginReadinessController<N: Notifier> {
    installer: PlatformInstaller,
    notifier: N,
    state: ReadinessState,
    reverify_after_install: bool,
}

impl<N: Notifier> PluginReadinessController<N> {
    pub fn new(installer: PlatformInstaller, notifier: N) -> Self {
        Self {
            installer,
            notifier,
            state: ReadinessState::Unknown,
            reverify_after_install: false,
        }
    }

    /// 安装完成后是否重新检测（默认否：信任安装结果）。
    pub fn with_reverify_after_install(mut self, enabled: bool) -> Self {
        self.reverify_after_install = enabled;
        self
    }

    pub fn state(&self) -> ReadinessState {
        self.state
    }

    /// 检测并在需要时安装插件。
    ///
    /// 参数：
    /// - `on_ready`：插件就绪时调用（检测与安装全部结束之后，至多一次）
    ///
    /// 返回值：
    /// - 最终状态（必为终态）
    pub async fn ensure_ready<F>(mut self, on_ready: F) -> ReadinessState
    where
        F: FnOnce(),
    {
        info!("检查 Unity Web Player ({})", self.installer.platform());
        let state = self.run().await;
        if state.is_ready() {
            on_ready();
        }
        state
    }

    async fn run(&mut self) -> ReadinessState {
        match self.installer.check().await {
            PresenceCheck::Present => self.transition(ReadinessState::Verified),
            PresenceCheck::Unsupported(reason) => {
                self.transition(ReadinessState::Unsupported);
                self.notifier.error(ERROR_TITLE, &error_chain(&reason));
            }
            PresenceCheck::Missing => {
                self.transition(ReadinessState::NeedsInstall);
                self.transition(ReadinessState::InstallInProgress);
                match self.install_and_verify().await {
                    Ok(report) => {
                        if let InstallReport::ManualStepRequired { instructions } = &report {
                            self.notifier.info(INFO_TITLE, instructions);
                        }
                        self.transition(ReadinessState::Installed);
                    }
                    Err(e) => {
                        self.transition(ReadinessState::Failed);
                        self.notifier
                            .error(ERROR_TITLE, &format!("Unity Web Player 安装失败。\n\n{}", error_chain(&e)));
                    }
                }
            }
        }
        self.state
    }

    async fn install_and_verify(&self) -> Result<InstallReport, InstallError> {
        let report = self.installer.install().await?;
        if self.reverify_after_install && !matches!(report, InstallReport::ManualStepRequired { .. }) {
            match self.installer.check().await {
                PresenceCheck::Present => info!("安装后复检通过"),
                other => {
                    warn!("安装后复检未通过: {other:?}");
                    return Err(InstallError::VerificationFailed);
                }
            }
        }
        Ok(report)
    }

    fn transition(&mut self, next: ReadinessState) {
        let prev = self.state;
        match self.state.advance(next) {
            Ok(()) => info!("插件就绪状态: {prev} -> {next}"),
            Err(e) => warn!("{e}"),
        }
    }
}

/// 拼接错误及其来源链，供用户提示使用。
fn error_chain(err: &dyn Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(s) = source {
        out.push_str(": ");
        out.push_str(&s.to_string());
        source = s.source();
    }
    out
}
