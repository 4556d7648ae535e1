//! 插件就绪状态机。
//!
//! 转移规则：
//! - `Unknown → Verified | NeedsInstall | Unsupported`
//! - `NeedsInstall → InstallInProgress`
//! - `InstallInProgress → Installed | Failed`
//!
//! 终态：`Verified`、`Installed`（二者对使用方等价，均表示“可以继续”）、`Unsupported`、`Failed`。
//!
//! 作者：OpenATBP 启动器项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// 插件就绪状态（由就绪控制器独占持有）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessState {
    #[default]
    /// 尚未检测。
    Unknown,
    /// 检测通过，无需安装。
    Verified,
    /// 检测未通过，平台支持自动修复。
    NeedsInstall,
    /// 安装动作已派发，等待完成。
    InstallInProgress,
    /// 安装已完成。
    Installed,
    /// 无法自动修复，需要用户手动处理。
    Unsupported,
    /// 安装失败。
    Failed,
}

/// 非法状态转移。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("非法状态转移: {from} -> {to}")]
pub struct TransitionError {
    pub from: ReadinessState,
    pub to: ReadinessState,
}

impl ReadinessState {
    /// 是否为终态。
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Verified | Self::Installed | Self::Unsupported | Self::Failed
        )
    }

    /// 是否为“可继续”的终态。
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Verified | Self::Installed)
    }

    /// 按转移规则推进到 `next`。
    ///
    /// 异常处理：
    /// - 不在规则表内的转移返回 [`TransitionError`]，当前状态保持不变。
    pub fn advance(&mut self, next: ReadinessState) -> Result<(), TransitionError> {
        use ReadinessState::*;
        let allowed = matches!(
            (*self, next),
            (Unknown, Verified | NeedsInstall | Unsupported)
                | (NeedsInstall, InstallInProgress)
                | (InstallInProgress, Installed | Failed)
        );
        if !allowed {
            return Err(TransitionError { from: *self, to: next });
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Verified => "verified",
            Self::NeedsInstall => "needs_install",
            Self::InstallInProgress => "install_in_progress",
            Self::Installed => "installed",
            Self::Unsupported => "unsupported",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}
