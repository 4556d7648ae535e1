//! 安装阶段的错误与“需人工处理”分类。
//!
//! 区分两类结果：
//! - [`InstallError`]：软件错误（启动安装器失败、复制失败、超时等），就绪状态为 `Failed`
//! - [`UnsupportedReason`]：不是软件错误，而是无法自动修复、必须由用户手动处理的情形，就绪状态为 `Unsupported`
//!
//! 作者：OpenATBP 启动器项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::PathBuf;
use std::time::Duration;

use atbp_core::macho::{ArchitectureTag, ParseError};
use thiserror::Error;

/// 安装失败。
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("启动安装程序失败: {path}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("等待安装程序退出失败: {path}")]
    Wait {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("安装程序在 {0:?} 内未结束")]
    Timeout(Duration),
    #[error("安装程序退出码异常: {path} ({code:?})")]
    ExitCode { path: PathBuf, code: Option<i32> },
    #[error("安装资源不存在: {0}")]
    MissingArtifact(PathBuf),
    #[error("复制失败: {} -> {}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("安装完成后复检未通过")]
    VerificationFailed,
    #[error("后台任务异常退出: {0}")]
    Task(String),
}

/// 无法自动修复的原因（需要用户手动安装）。
#[derive(Debug, Error)]
pub enum UnsupportedReason {
    #[error("Unity Web Player 未安装。\n\n请先安装随附的 Unity Web Player（webplayer-mini.dmg），然后重新启动本程序。")]
    BasePluginMissing { path: PathBuf },
    #[error("无法读取 Unity Web Player 插件: {}", .path.display())]
    BasePluginUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("已安装的 Unity Web Player 不包含 {arch} 架构，请重新安装随附的 webplayer-mini.dmg。")]
    ArchitectureMissing { path: PathBuf, arch: ArchitectureTag },
    #[error("无法确认 Unity Web Player 的架构（文件可能已损坏），请重新安装随附的 webplayer-mini.dmg。")]
    ArchitectureUnconfirmed {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}
