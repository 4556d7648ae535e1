//! 面向用户的提示（错误/信息）。
//!
//! 具体展示方式（弹窗、托盘、控制台）由宿主决定；本模块只定义接口，
//! 并提供一个写日志 + 标准错误输出的默认实现。
//!
//! 作者：OpenATBP 启动器项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use tracing::{error, info};

/// 用户提示接口。
pub trait Notifier {
    /// 阻塞式错误提示；调用方随后会停止依赖插件的启动流程。
    fn error(&self, title: &str, message: &str);
    /// 信息提示。
    fn info(&self, title: &str, message: &str);
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn error(&self, title: &str, message: &str) {
        (**self).error(title, message)
    }

    fn info(&self, title: &str, message: &str) {
        (**self).info(title, message)
    }
}

/// 默认实现：写入日志，错误额外输出到 stderr。
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, title: &str, message: &str) {
        error!("{title}: {message}");
        eprintln!("{title}\n\n{message}");
    }

    fn info(&self, title: &str, message: &str) {
        info!("{title}: {message}");
    }
}
