//! OpenATBP 启动器核心库（平台无关）。
//!
//! 功能：
//! - 定宽整数解码与 Mach-O 头部架构检测
//! - 文件内容指纹计算与已知版本比对
//! - 插件就绪状态机
//! - 启动器配置模型与统一路径约定
//!
//! 作者：OpenATBP 启动器项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

pub mod byte_reader;
pub mod config;
pub mod fingerprint;
pub mod macho;
pub mod paths;
pub mod platform;
pub mod state;
