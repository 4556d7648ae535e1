//! 静默安装进程的启动与等待。
//!
//! 实现策略：
//! - 以静默参数启动安装器，不采集输出（安装器本身无交互）
//! - 仅在进程结束后返回；可选超时
//! - 超时后不结束子进程，仅记录日志
//!
//! 作者：OpenATBP 启动器项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use atbp_core::config::PayloadInstaller;
use tokio::process::Command;
use tracing::{info, warn};

use crate::error::InstallError;

/// 启动安装器并等待其退出。
///
/// 参数：
/// - `installer`：安装器定义（路径、参数）
/// - `timeout`：最长等待时间；`None` 表示一直等待
///
/// 返回值：
/// - 成功：进程退出码（被信号终止时为 `None`）
///
/// 异常处理：
/// - 进程启动失败返回 [`InstallError::Spawn`]
/// - 等待失败返回 [`InstallError::Wait`]
/// - 超时返回 [`InstallError::Timeout`]，子进程继续在后台运行
pub async fn run_silent_installer(
    installer: &PayloadInstaller,
    timeout: Option<Duration>,
) -> Result<Option<i32>, InstallError> {
    let exe = PathBuf::from(&installer.path);
    info!("启动静默安装: {} {}", exe.display(), installer.args.join(" "));
    let mut child = Command::new(&exe)
        .args(&installer.args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(false)
        .spawn()
        .map_err(|source| InstallError::Spawn {
            path: exe.clone(),
            source,
        })?;

    let waited = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(r) => r,
            Err(_) => {
                warn!(
                    "安装程序在 {:?} 内未结束，保留其继续运行 (pid={:?})",
                    limit,
                    child.id()
                );
                return Err(InstallError::Timeout(limit));
            }
        },
        None => child.wait().await,
    };
    let status = waited.map_err(|source| InstallError::Wait { path: exe, source })?;
    info!("安装程序已退出: {:?}", status.code());
    Ok(status.code())
}
