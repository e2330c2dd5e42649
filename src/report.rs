//! 操作结果记录
//!
//! 把 `Result` 转成 `{ success, ..., error, code }` 形式的可序列化记录，
//! 供命令行以文本或 JSON 输出。`error` 即错误的 `Display` 文案，`code` 为稳定错误码。

use std::path::PathBuf;

use serde::Serialize;

use crate::export::ExportError;
use crate::image_handler::{LoadError, LoadedImage};

/// 加载结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileLoadResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl FileLoadResult {
    /// `include_url` 为假时省略 Data URL（命令行默认不打印整段 base64）。
    pub fn from_result(result: &Result<LoadedImage, LoadError>, include_url: bool) -> Self {
        match result {
            Ok(image) => Self {
                success: true,
                url: include_url.then(|| image.url.clone()),
                file_name: Some(image.file.name.clone()),
                width: Some(image.width),
                height: Some(image.height),
                error: None,
                code: None,
            },
            Err(err) => Self {
                success: false,
                url: None,
                file_name: None,
                width: None,
                height: None,
                error: Some(err.to_string()),
                code: Some(err.code()),
            },
        }
    }
}

/// 导出结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    /// 出口名称：`download` / `clipboard` / `share` / `dataUrl`
    pub target: &'static str,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl ExportResult {
    fn base(target: &'static str) -> Self {
        Self {
            target,
            success: true,
            path: None,
            data_url: None,
            error: None,
            code: None,
        }
    }

    pub fn from_result<T>(target: &'static str, result: &Result<T, ExportError>) -> Self {
        match result {
            Ok(_) => Self::base(target),
            Err(err) => Self {
                success: false,
                error: Some(err.to_string()),
                code: Some(err.code()),
                ..Self::base(target)
            },
        }
    }

    pub fn from_download(result: &Result<PathBuf, ExportError>) -> Self {
        Self {
            path: result.as_ref().ok().cloned(),
            ..Self::from_result("download", result)
        }
    }

    pub fn from_data_url(result: &Result<String, ExportError>) -> Self {
        Self {
            data_url: result.as_ref().ok().cloned(),
            ..Self::from_result("dataUrl", result)
        }
    }
}
