//! 下载出口：把导出结果写入目录。
//!
//! 文件名先去掉路径分隔符与控制字符；目标已存在时依次尝试 `name (1).ext`、`name (2).ext`……

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::SinkError;

pub trait DownloadSink: Send + Sync {
    /// 保存文件，返回最终写入的位置。
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, SinkError>;
}

/// 写入本地目录（默认系统“下载”目录）。
#[derive(Debug, Clone)]
pub struct DirectoryDownloads {
    dir: PathBuf,
}

const MAX_UNIQUE_ATTEMPTS: u32 = 10_000;

impl DirectoryDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 系统下载目录；不可用时退回当前工作目录。
    pub fn in_default_dir() -> Self {
        let dir = dirs::download_dir()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectoryDownloads {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, SinkError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| SinkError(format!("无法创建下载目录 '{}': {}", self.dir.display(), e)))?;

        let file_name = sanitize_file_name(file_name);
        let (stem, extension) = split_extension(&file_name);

        for attempt in 0..MAX_UNIQUE_ATTEMPTS {
            let candidate = if attempt == 0 {
                file_name.clone()
            } else {
                format!("{} ({}){}", stem, attempt, extension)
            };
            let path = self.dir.join(&candidate);

            // create_new 保证不会覆盖已有文件
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(bytes)
                        .map_err(|e| SinkError(format!("写入失败 '{}': {}", path.display(), e)))?;
                    log::info!("💾 已保存 - {} ({} 字节)", path.display(), bytes.len());
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(SinkError(format!("无法创建文件 '{}': {}", path.display(), e))),
            }
        }

        Err(SinkError(format!("无法为 '{}' 找到可用文件名", file_name)))
    }
}

/// 去掉路径分隔符与保留字符，结果只能落在目标目录内。
pub(crate) fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "download".to_string()
    } else {
        cleaned
    }
}

/// `shot.png` → (`shot`, `.png`)；没有扩展名时后半段为空。
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}
