//! Mach-O 容器头部的架构检测。
//!
//! 仅提取架构判断所需的最少字段：
//! - 单架构 64 位：magic(0) + cputype(4)
//! - 多架构（fat）：magic(0) + nfat_arch(4) + 每项 20 字节的 fat_arch 描述（cputype 位于每项开头）
//!
//! 约定：
//! - 截断/损坏的缓冲区返回 [`ParseError`]，调用方据此区分“确认不支持”与“无法判断”
//! - 未识别的 magic 视为“不支持”，不是错误
//!
//! 作者：OpenATBP 启动器项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::fmt;

use thiserror::Error;

use crate::byte_reader::{read_u32_be, read_u32_le, OutOfBounds};

/// 单架构 64 位 Mach-O 的 magic（按大端读取）。
pub const MH_MAGIC_64: u32 = 0xFEED_FACF;
/// 单架构 64 位 Mach-O 以小端存储时按大端读到的 magic。
pub const MH_CIGAM_64: u32 = 0xCFFA_EDFE;
/// 多架构（fat）容器的 magic，头部字段恒为大端。
pub const FAT_MAGIC: u32 = 0xCAFE_BABE;

/// fat 头部长度（magic + nfat_arch）。
const FAT_HEADER_LEN: usize = 8;
/// 单个 fat_arch 描述项长度。
const FAT_ARCH_LEN: usize = 20;

/// 指令集架构标识（Mach-O `cputype`）。
///
/// 比较规则为精确相等；未知值不会匹配任何常量。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArchitectureTag(pub u32);

impl ArchitectureTag {
    /// `CPU_TYPE_X86`。
    pub const X86: Self = Self(0x0000_0007);
    /// `CPU_TYPE_X86_64`（`CPU_TYPE_X86 | CPU_ARCH_ABI64`）。
    pub const X86_64: Self = Self(0x0100_0007);
    /// `CPU_TYPE_ARM64`。
    pub const ARM64: Self = Self(0x0100_000C);

    /// 已知架构的可读名称；未知值返回 `None`。
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::X86 => Some("i386"),
            Self::X86_64 => Some("x86_64"),
            Self::ARM64 => Some("arm64"),
            _ => None,
        }
    }
}

impl fmt::Display for ArchitectureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{:#010x}", self.0),
        }
    }
}

/// 容器布局。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerFormat {
    /// 单架构 64 位。
    SingleArchitecture(ArchitectureTag),
    /// 多架构容器：`count` 为头部声明的项数，`entries` 为各项的架构标识。
    FatMultiArchitecture {
        count: u32,
        entries: Vec<ArchitectureTag>,
    },
    /// 未识别的 magic（不是本模块关心的 Mach-O 布局）。
    Unrecognized(u32),
}

/// 头部解析失败。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("二进制头部被截断: {0}")]
    Truncated(#[from] OutOfBounds),
    #[error("fat 头部声明 {count} 项，需要 {required} 字节，实际仅 {len} 字节")]
    EntryTableTruncated { count: u32, required: u64, len: usize },
}

/// 判断二进制是否包含目标架构。
///
/// 参数：
/// - `buffer`：完整的可执行文件内容
/// - `target`：目标架构
///
/// 返回值：
/// - `Ok(true)`：单架构且架构匹配，或 fat 容器中任一项匹配
/// - `Ok(false)`：架构不匹配，或 magic 未识别
///
/// 异常处理：
/// - 缓冲区不足以容纳头部或 `count` 声明的全部描述项时返回 [`ParseError`]（不做截断处理）
pub fn supports_architecture(buffer: &[u8], target: ArchitectureTag) -> Result<bool, ParseError> {
    match read_u32_be(buffer, 0)? {
        MH_MAGIC_64 => Ok(ArchitectureTag(read_u32_be(buffer, 4)?) == target),
        MH_CIGAM_64 => Ok(ArchitectureTag(read_u32_le(buffer, 4)?) == target),
        FAT_MAGIC => {
            let count = checked_fat_count(buffer)?;
            for i in 0..count as usize {
                let tag = read_u32_be(buffer, FAT_HEADER_LEN + FAT_ARCH_LEN * i)?;
                if ArchitectureTag(tag) == target {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => Ok(false),
    }
}

/// 解析容器布局并列出全部架构（用于诊断输出）。
///
/// 异常处理同 [`supports_architecture`]。
pub fn inspect_container(buffer: &[u8]) -> Result<ContainerFormat, ParseError> {
    let format = match read_u32_be(buffer, 0)? {
        MH_MAGIC_64 => ContainerFormat::SingleArchitecture(ArchitectureTag(read_u32_be(buffer, 4)?)),
        MH_CIGAM_64 => ContainerFormat::SingleArchitecture(ArchitectureTag(read_u32_le(buffer, 4)?)),
        FAT_MAGIC => {
            let count = checked_fat_count(buffer)?;
            let entries = (0..count as usize)
                .map(|i| read_u32_be(buffer, FAT_HEADER_LEN + FAT_ARCH_LEN * i).map(ArchitectureTag))
                .collect::<Result<Vec<_>, _>>()?;
            ContainerFormat::FatMultiArchitecture { count, entries }
        }
        other => ContainerFormat::Unrecognized(other),
    };
    Ok(format)
}

/// 读取 `nfat_arch` 并确认全部描述项都在缓冲区内。
fn checked_fat_count(buffer: &[u8]) -> Result<u32, ParseError> {
    let count = read_u32_be(buffer, 4)?;
    let required = FAT_HEADER_LEN as u64 + FAT_ARCH_LEN as u64 * u64::from(count);
    if required > buffer.len() as u64 {
        return Err(ParseError::EntryTableTruncated {
            count,
            required,
            len: buffer.len(),
        });
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thin(tag: u32) -> Vec<u8> {
        let mut buf = MH_MAGIC_64.to_be_bytes().to_vec();
        buf.extend_from_slice(&tag.to_be_bytes());
        buf.extend_from_slice(&[0u8; 24]);
        buf
    }

    fn fat(tags: &[u32]) -> Vec<u8> {
        let mut buf = FAT_MAGIC.to_be_bytes().to_vec();
        buf.extend_from_slice(&(tags.len() as u32).to_be_bytes());
        for tag in tags {
            buf.extend_from_slice(&tag.to_be_bytes());
            // cpusubtype, offset, size, align
            buf.extend_from_slice(&[0u8; 16]);
        }
        buf
    }

    #[test]
    fn thin_binary_matches_only_its_own_tag() {
        let buf = thin(ArchitectureTag::X86_64.0);
        assert!(supports_architecture(&buf, ArchitectureTag::X86_64).unwrap());
        assert!(!supports_architecture(&buf, ArchitectureTag::ARM64).unwrap());

        for other in [0u32, 7, 0x0100_000C, 0xFFFF_FFFF, 0x0100_0008] {
            let buf = thin(other);
            assert!(!supports_architecture(&buf, ArchitectureTag::X86_64).unwrap(), "tag {other:#x}");
        }
    }

    #[test]
    fn little_endian_thin_binary_is_recognized() {
        let mut buf = vec![0xCF, 0xFA, 0xED, 0xFE];
        buf.extend_from_slice(&ArchitectureTag::X86_64.0.to_le_bytes());
        assert!(supports_architecture(&buf, ArchitectureTag::X86_64).unwrap());
        assert_eq!(
            inspect_container(&buf).unwrap(),
            ContainerFormat::SingleArchitecture(ArchitectureTag::X86_64)
        );
    }

    #[test]
    fn fat_binary_matches_target_at_any_position() {
        let others = [ArchitectureTag::X86.0, ArchitectureTag::ARM64.0, 0x0000_0012];
        for pos in 0..=others.len() {
            let mut tags = others.to_vec();
            tags.insert(pos, ArchitectureTag::X86_64.0);
            let buf = fat(&tags);
            assert!(supports_architecture(&buf, ArchitectureTag::X86_64).unwrap(), "pos {pos}");
        }
    }

    #[test]
    fn fat_binary_without_target_is_false() {
        let buf = fat(&[ArchitectureTag::X86.0, ArchitectureTag::ARM64.0]);
        assert!(!supports_architecture(&buf, ArchitectureTag::X86_64).unwrap());
        assert!(!supports_architecture(&fat(&[]), ArchitectureTag::X86_64).unwrap());
    }

    #[test]
    fn unrecognized_magic_is_false() {
        let mut buf = 0x7F45_4C46u32.to_be_bytes().to_vec();
        buf.extend_from_slice(&[0u8; 60]);
        assert!(!supports_architecture(&buf, ArchitectureTag::X86_64).unwrap());
        assert_eq!(inspect_container(&buf).unwrap(), ContainerFormat::Unrecognized(0x7F45_4C46));
    }

    #[test]
    fn truncated_header_is_parse_error() {
        assert!(matches!(
            supports_architecture(&[0xFE, 0xED], ArchitectureTag::X86_64),
            Err(ParseError::Truncated(_))
        ));
        assert!(matches!(
            supports_architecture(&[0xFE, 0xED, 0xFA, 0xCF, 0x01], ArchitectureTag::X86_64),
            Err(ParseError::Truncated(_))
        ));
    }

    #[test]
    /// count 超出缓冲区时直接拒绝，即使前面的项已能匹配。
    fn oversized_fat_count_is_rejected_not_clamped() {
        let mut buf = fat(&[ArchitectureTag::X86_64.0]);
        buf[4..8].copy_from_slice(&2u32.to_be_bytes());
        let err = supports_architecture(&buf, ArchitectureTag::X86_64).unwrap_err();
        assert_eq!(
            err,
            ParseError::EntryTableTruncated {
                count: 2,
                required: 48,
                len: 28
            }
        );

        buf[4..8].copy_from_slice(&u32::MAX.to_be_bytes());
        assert!(matches!(
            inspect_container(&buf),
            Err(ParseError::EntryTableTruncated { count: u32::MAX, .. })
        ));
    }

    #[test]
    fn inspect_lists_fat_entries() {
        let buf = fat(&[ArchitectureTag::X86.0, ArchitectureTag::X86_64.0]);
        assert_eq!(
            inspect_container(&buf).unwrap(),
            ContainerFormat::FatMultiArchitecture {
                count: 2,
                entries: vec![ArchitectureTag::X86, ArchitectureTag::X86_64],
            }
        );
    }

    #[test]
    fn tag_display_uses_known_names() {
        assert_eq!(ArchitectureTag::X86_64.to_string(), "x86_64");
        assert_eq!(ArchitectureTag(0x12).to_string(), "0x00000012");
    }
}
