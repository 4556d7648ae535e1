//! 随程序分发资源的复制（文件或目录）。
//!
//! 先复制到目标旁的临时目录，全部成功后再改名到目标位置，
//! 中途失败只会留下（并随即清理）临时目录，目标位置不会出现半份 bundle。
//!
//! 作者：OpenATBP 启动器项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::InstallError;

/// 将 `src`（文件或目录）复制到 `dst`。
///
/// 异常处理：
/// - `src` 不存在返回 [`InstallError::MissingArtifact`]
/// - 创建目录/复制/改名失败返回 [`InstallError::Copy`]
pub fn copy_staged(src: &Path, dst: &Path) -> Result<(), InstallError> {
    if !src.exists() {
        return Err(InstallError::MissingArtifact(src.to_path_buf()));
    }
    let copy_err = |source| InstallError::Copy {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source,
    };

    let staging = staging_path(dst);
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent).map_err(copy_err)?;
    }
    remove_any(&staging).map_err(copy_err)?;

    debug!("复制到临时位置: {} -> {}", src.display(), staging.display());
    if let Err(e) = copy_recursively(src, &staging) {
        if let Err(cleanup) = remove_any(&staging) {
            warn!("清理临时目录失败: {}: {cleanup}", staging.display());
        }
        return Err(copy_err(e));
    }
    std::fs::rename(&staging, dst).map_err(|e| {
        if let Err(cleanup) = remove_any(&staging) {
            warn!("清理临时目录失败: {}: {cleanup}", staging.display());
        }
        copy_err(e)
    })
}

/// 与目标同级的临时路径，保证改名在同一文件系统内完成。
fn staging_path(dst: &Path) -> PathBuf {
    let name = dst
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    dst.with_file_name(format!(".{name}.partial"))
}

fn remove_any(path: &Path) -> std::io::Result<()> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(path),
        Ok(_) => std::fs::remove_file(path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// 递归复制文件/目录；目录内的符号链接按链接本身复制，不跟随。
fn copy_recursively(src: &Path, dst: &Path) -> std::io::Result<()> {
    if src.is_file() {
        std::fs::copy(src, dst)?;
        return Ok(());
    }

    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if file_type.is_symlink() {
            copy_symlink(&from, &to)?;
        } else if file_type.is_dir() {
            copy_recursively(&from, &to)?;
        } else {
            std::fs::copy(&from, &to)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> std::io::Result<()> {
    let target = std::fs::read_link(from)?;
    std::os::unix::fs::symlink(target, to)
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> std::io::Result<()> {
    if from.is_dir() {
        copy_recursively(from, to)
    } else {
        std::fs::copy(from, to).map(|_| ())
    }
}
