//! 文件内容指纹（摘要）计算与已知版本比对。
//!
//! 说明：
//! - 指纹仅用于识别“是否为已验证的插件构建”，不承担防篡改职责
//! - 默认使用 MD5（与已发布插件的参考值一致），同时支持 SHA-256
//!
//! 作者：OpenATBP 启动器项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

const BUF_SIZE: usize = 64 * 1024;

/// 摘要算法。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Md5,
    Sha256,
}

/// 编译期固定的参考指纹。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownGoodFingerprint {
    pub algorithm: DigestAlgorithm,
    /// 小写十六进制摘要。
    pub hex: &'static str,
}

/// Unity Web Player 3.x（Windows，`webplayer_win.dll`）的已验证构建。
pub const WEBPLAYER_WIN_KNOWN_GOOD: KnownGoodFingerprint = KnownGoodFingerprint {
    algorithm: DigestAlgorithm::Md5,
    hex: "33ffd00503b206260b0c273baf7e122e",
};

/// 指纹计算失败。
///
/// 调用方应将其视为“未安装”（可恢复），而不是致命错误。
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("读取文件失败: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 计算文件内容的摘要。
///
/// 参数：
/// - `path`：文件路径
/// - `algorithm`：摘要算法
///
/// 返回值：
/// - 成功：小写十六进制字符串
///
/// 异常处理：
/// - 文件不存在/无权限/读取中断返回 [`FingerprintError::Io`]
pub fn fingerprint(path: &Path, algorithm: DigestAlgorithm) -> Result<String, FingerprintError> {
    let io_err = |source| FingerprintError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut f = File::open(path).map_err(io_err)?;
    let mut buf = vec![0u8; BUF_SIZE];
    match algorithm {
        DigestAlgorithm::Md5 => {
            let mut ctx = md5::Context::new();
            loop {
                let n = f.read(&mut buf).map_err(io_err)?;
                if n == 0 {
                    break;
                }
                ctx.consume(&buf[..n]);
            }
            Ok(format!("{:x}", ctx.compute()))
        }
        DigestAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            loop {
                let n = f.read(&mut buf).map_err(io_err)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            Ok(hex::encode(hasher.finalize()))
        }
    }
}

/// 摘要字符串与参考值是否完全一致（区分大小写、全长比较）。
pub fn digest_matches(actual: &str, expected: &str) -> bool {
    actual == expected
}

/// 计算文件指纹并与参考值比对。
///
/// 返回值：
/// - `Ok(true)`：文件即为已验证构建
/// - `Ok(false)`：文件存在但内容不同
///
/// 异常处理：
/// - 文件不可读时返回 [`FingerprintError::Io`]
pub fn matches_known_good(path: &Path, expected: &KnownGoodFingerprint) -> Result<bool, FingerprintError> {
    let actual = fingerprint(path, expected.algorithm)?;
    debug!("指纹比对: {} actual={} expected={}", path.display(), actual, expected.hex);
    Ok(digest_matches(&actual, expected.hex))
}
