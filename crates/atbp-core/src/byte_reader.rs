//! 定宽无符号整数解码（大端/小端）。
//!
//! 说明：
//! - 仅提供架构检测所需的 32 位读取，不做通用二进制解析
//! - 结果始终为无符号值，不存在符号扩展
//!
//! 作者：OpenATBP 启动器项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use thiserror::Error;

/// 读取越界：`offset + width` 超出缓冲区长度。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("读取越界: offset={offset}, width={width}, len={len}")]
pub struct OutOfBounds {
    pub offset: usize,
    pub width: usize,
    pub len: usize,
}

/// 从 `buffer[offset..offset + 4]` 按大端序读取 `u32`。
///
/// 参数：
/// - `buffer`：原始字节
/// - `offset`：起始偏移
///
/// 返回值：
/// - 成功：`[0, 2^32 - 1]` 范围内的无符号值
///
/// 异常处理：
/// - `offset + 4 > buffer.len()` 时返回 [`OutOfBounds`]（偏移接近 `usize::MAX` 也不会溢出）
pub fn read_u32_be(buffer: &[u8], offset: usize) -> Result<u32, OutOfBounds> {
    Ok(u32::from_be_bytes(take4(buffer, offset)?))
}

/// 从 `buffer[offset..offset + 4]` 按小端序读取 `u32`，越界规则同 [`read_u32_be`]。
pub fn read_u32_le(buffer: &[u8], offset: usize) -> Result<u32, OutOfBounds> {
    Ok(u32::from_le_bytes(take4(buffer, offset)?))
}

fn take4(buffer: &[u8], offset: usize) -> Result<[u8; 4], OutOfBounds> {
    let oob = OutOfBounds {
        offset,
        width: 4,
        len: buffer.len(),
    };
    let end = offset.checked_add(4).ok_or(oob)?;
    let bytes = buffer.get(offset..end).ok_or(oob)?;
    let mut out = [0u8; 4];
    out.copy_from_slice(bytes);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_cpu_type_x86_64() {
        assert_eq!(read_u32_be(&[0x01, 0x00, 0x00, 0x07], 0).unwrap(), 16_777_223);
    }

    #[test]
    /// 高位为 1 的字节不能被符号扩展。
    fn decodes_high_bit_without_sign_extension() {
        assert_eq!(read_u32_be(&[0xFE, 0xED, 0xFA, 0xCF], 0).unwrap(), 4_276_996_815);
        assert_eq!(read_u32_be(&[0xFF, 0xFF, 0xFF, 0xFF], 0).unwrap(), u32::MAX);
    }

    #[test]
    fn reads_at_offset() {
        let buf = [0xAA, 0xCA, 0xFE, 0xBA, 0xBE, 0xBB];
        assert_eq!(read_u32_be(&buf, 1).unwrap(), 0xCAFE_BABE);
        assert_eq!(read_u32_le(&buf, 1).unwrap(), 0xBEBA_FECA);
    }

    #[test]
    fn rejects_reads_past_end() {
        let buf = [0u8; 6];
        assert!(read_u32_be(&buf, 2).is_ok());
        let err = read_u32_be(&buf, 3).unwrap_err();
        assert_eq!(
            err,
            OutOfBounds {
                offset: 3,
                width: 4,
                len: 6
            }
        );
        assert!(read_u32_be(&[], 0).is_err());
        assert!(read_u32_le(&buf, usize::MAX - 1).is_err());
    }
}
