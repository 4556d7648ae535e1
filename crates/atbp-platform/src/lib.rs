//! 平台相关能力：插件检测、静默安装、资源复制与就绪编排。
//!
//! 目标：
//! - 将各平台的检测/安装差异收敛到 [`installer::PlatformInstaller`]，上层只面对一个就绪信号
//! - 统一错误分类：软件错误（`Failed`）与需人工处理（`Unsupported`）分开上报
//!
//! 作者：OpenATBP 启动器项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

pub mod copy;
pub mod error;
pub mod installer;
pub mod macos;
pub mod notify;
pub mod process;
pub mod readiness;
pub mod windows;
