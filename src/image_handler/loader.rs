//! # 加载编排模块
//!
//! ## 设计思路
//!
//! `ImageLoader` 只负责流程编排，处理链路固定为：
//! 1. 校验（失败立即返回校验提示）
//! 2. 读取为 Data URL（挂起点 1）
//! 3. 读取文件头尺寸并确认可以完整解码（挂起点 2）
//! 4. 返回 url + 原始文件 + 宽高
//!
//! ## 实现思路
//!
//! - Base64 编码与解码都在阻塞线程执行，避免占用 async 运行时。
//! - 读取或解码失败只返回固定文案，原因写入 warn 日志。
//! - 单次尝试，不重试。

use std::time::Instant;

use super::pipeline;
use super::source::{CandidateFile, LoadedImage};
use super::{LoadError, LoaderConfig};
use crate::validation::validate_image_file_with;

/// 图片加载器。
#[derive(Debug, Clone, Default)]
pub struct ImageLoader {
    config: LoaderConfig,
}

impl ImageLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// 加载候选文件。
    pub async fn load(&self, file: &CandidateFile) -> Result<LoadedImage, LoadError> {
        let started = Instant::now();

        let validation = validate_image_file_with(file, &self.config);
        if !validation.valid {
            let message = validation.error.unwrap_or_default();
            log::info!("🚫 文件校验未通过 - {}: {}", file.name, message);
            return Err(LoadError::Validation(message));
        }

        let url = self.read_as_data_url(file).await?;
        let read_elapsed = started.elapsed();

        let (width, height) = self.decode_dimensions(file).await?;

        log::info!(
            "✅ 图片加载成功 - {} ({}, {} 字节) 尺寸: {}x{} 耗时: read={:?} total={:?}",
            file.name,
            file.mime,
            file.size,
            width,
            height,
            read_elapsed,
            started.elapsed()
        );

        Ok(LoadedImage {
            url,
            file: file.clone(),
            width,
            height,
        })
    }

    async fn read_as_data_url(&self, file: &CandidateFile) -> Result<String, LoadError> {
        if file.bytes.len() as u64 != file.size {
            log::warn!(
                "⚠️ 文件内容与声明体积不一致 - {}: 声明 {} 字节，实际 {} 字节",
                file.name,
                file.size,
                file.bytes.len()
            );
            return Err(LoadError::Read);
        }

        let mime = file.mime.clone();
        let bytes = file.bytes.clone();
        tokio::task::spawn_blocking(move || pipeline::encode_data_url(&mime, &bytes))
            .await
            .map_err(|e| {
                log::warn!("⚠️ 读取文件任务异常结束: {}", e);
                LoadError::Read
            })
    }

    async fn decode_dimensions(&self, file: &CandidateFile) -> Result<(u32, u32), LoadError> {
        let bytes = file.bytes.clone();
        let max_pixels = self.config.max_decoded_pixels;

        // 宽高取自文件头；完整解码只用来确认图片可以展开
        let decoded = tokio::task::spawn_blocking(move || {
            let dimensions = pipeline::inspect_dimensions_from_memory(&bytes)?;
            pipeline::decode_with_limits(&bytes, max_pixels)?;
            Ok::<_, super::ImageError>(dimensions)
        })
        .await
        .map_err(|e| {
            log::warn!("⚠️ 解码任务异常结束: {}", e);
            LoadError::Decode
        })?;

        decoded.map_err(|e| {
            log::warn!("⚠️ 图片解码失败 - {}: {}", file.name, e);
            LoadError::Decode
        })
    }
}

/// 使用默认策略加载候选文件。
pub async fn load_image_file(file: &CandidateFile) -> Result<LoadedImage, LoadError> {
    ImageLoader::default().load(file).await
}
