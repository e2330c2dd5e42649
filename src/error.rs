//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义应用级的 `AppError` 枚举，收拢存储、配置、加载与导出几类错误。
//! 加载与导出链路各自有更细的错误类型（`LoadError` / `ExportError`），
//! 在应用层通过 `#[from]` 上转，调用侧仍可按分支匹配。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 实现 `Serialize` 将错误序列化为字符串，便于 CLI 以 JSON 输出。

use serde::Serialize;

use crate::export::ExportError;
use crate::image_handler::LoadError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 持久化存储不可用（读写设置记录失败）
    #[error("存储不可用: {0}")]
    Storage(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 配置或命令行参数不合法
    #[error("配置错误: {0}")]
    Config(String),

    /// 图片加载链路错误
    #[error("{0}")]
    Load(#[from] LoadError),

    /// 导出链路错误
    #[error("{0}")]
    Export(#[from] ExportError),
}

impl AppError {
    /// 稳定错误码；加载与导出错误沿用各自的错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Storage(_) => "storage_unavailable",
            Self::Io(_) => "io",
            Self::Config(_) => "config",
            Self::Load(e) => e.code(),
            Self::Export(e) => e.code(),
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
