//! # 分享出口
//!
//! `ShareTarget` 描述平台分享能力：
//! - `is_supported`：平台是否提供分享（不支持时导出流程在光栅化之前就返回）
//! - `can_share`：给定数据是否可分享
//! - `share`：真正发起分享；用户取消时返回 `ShareError::Cancelled`
//!
//! 桌面端没有统一的分享面板，`SystemOpenShare` 退化为“写入暂存目录后交给系统默认程序打开”。

use std::path::{Path, PathBuf};
use std::process::Command;

use super::Blob;
use super::download::sanitize_file_name;

/// 待分享的文件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareFile {
    pub name: String,
    pub blob: Blob,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareData {
    pub files: Vec<ShareFile>,
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShareError {
    #[error("Share cancelled")]
    Cancelled,

    #[error("{0}")]
    Failed(String),
}

pub trait ShareTarget: Send + Sync {
    fn is_supported(&self) -> bool;

    fn can_share(&self, _data: &ShareData) -> bool {
        true
    }

    fn share(&self, data: &ShareData) -> Result<(), ShareError>;
}

/// 平台不提供分享。
#[derive(Debug, Clone, Copy, Default)]
pub struct NoShareSupport;

impl ShareTarget for NoShareSupport {
    fn is_supported(&self) -> bool {
        false
    }

    fn can_share(&self, _data: &ShareData) -> bool {
        false
    }

    fn share(&self, _data: &ShareData) -> Result<(), ShareError> {
        Err(ShareError::Failed("Web Share API not supported".to_string()))
    }
}

/// 写入暂存目录并用系统默认程序打开。
#[derive(Debug, Clone)]
pub struct SystemOpenShare {
    staging_dir: PathBuf,
}

impl SystemOpenShare {
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
        }
    }

    /// 暂存到系统临时目录下的 `shotframe-share`。
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir().join("shotframe-share"))
    }

    /// 暂存文件路径：文件名先去掉路径成分，始终位于暂存目录内。
    fn staged_path(&self, name: &str) -> PathBuf {
        self.staging_dir.join(sanitize_file_name(name))
    }

    fn open_command(path: &Path) -> Command {
        #[cfg(target_os = "windows")]
        {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]).arg(path);
            cmd
        }

        #[cfg(target_os = "macos")]
        {
            let mut cmd = Command::new("open");
            cmd.arg(path);
            cmd
        }

        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(path);
            cmd
        }
    }
}

impl ShareTarget for SystemOpenShare {
    fn is_supported(&self) -> bool {
        true
    }

    fn can_share(&self, data: &ShareData) -> bool {
        !data.files.is_empty()
            && data
                .files
                .iter()
                .all(|f| f.blob.mime.starts_with("image/") && !f.blob.is_empty())
    }

    fn share(&self, data: &ShareData) -> Result<(), ShareError> {
        std::fs::create_dir_all(&self.staging_dir)
            .map_err(|e| ShareError::Failed(format!("无法创建暂存目录：{}", e)))?;

        for file in &data.files {
            let path = self.staged_path(&file.name);
            std::fs::write(&path, &file.blob.bytes)
                .map_err(|e| ShareError::Failed(format!("无法写入暂存文件：{}", e)))?;

            let status = Self::open_command(&path)
                .status()
                .map_err(|e| ShareError::Failed(format!("无法启动系统程序：{}", e)))?;
            if !status.success() {
                return Err(ShareError::Failed(format!("系统程序退出：{}", status)));
            }
            log::info!("📤 已交给系统程序打开 - {}（{}）", path.display(), data.title);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn data(mime: &'static str, bytes: &'static [u8]) -> ShareData {
        ShareData {
            files: vec![ShareFile {
                name: "shot.png".to_string(),
                blob: Blob {
                    mime,
                    bytes: Bytes::from_static(bytes),
                },
            }],
            title: "t".to_string(),
            text: "x".to_string(),
        }
    }

    #[test]
    fn no_share_support_reports_unsupported() {
        let target = NoShareSupport;
        assert!(!target.is_supported());
        assert!(!target.can_share(&data("image/png", b"x")));
        assert_eq!(
            target.share(&data("image/png", b"x")),
            Err(ShareError::Failed("Web Share API not supported".to_string()))
        );
    }

    #[test]
    fn staged_files_stay_inside_staging_dir() {
        let dir = std::env::temp_dir().join("shotframe-share-names");
        let target = SystemOpenShare::new(&dir);

        for name in ["../x.png", "..\\x.png", "/etc/x.png", "sub/../../x.png"] {
            let path = target.staged_path(name);
            assert_eq!(path.parent(), Some(dir.as_path()), "{} -> {}", name, path.display());
        }
        assert_eq!(target.staged_path("../x.png"), dir.join("_x.png"));
        assert_eq!(target.staged_path("shot.png"), dir.join("shot.png"));
    }

    #[test]
    fn system_open_only_accepts_non_empty_images() {
        let target = SystemOpenShare::in_temp_dir();
        assert!(target.can_share(&data("image/png", b"x")));
        assert!(!target.can_share(&data("image/png", b"")));
        assert!(!target.can_share(&data("text/plain", b"x")));
    }

    #[test]
    fn cancellation_message_is_fixed() {
        assert_eq!(ShareError::Cancelled.to_string(), "Share cancelled");
    }
}
