//! 持久化键值存储模块
//!
//! # 设计思路
//!
//! 设置记录以 JSON 形式按固定键持久化。存储被抽象为 `KeyValueStorage`，
//! 状态层只依赖该接口，便于在测试中替换为内存实现。
//!
//! # 实现思路
//!
//! - `JsonFileStorage`：每个键对应目录下一个 `<key>.json` 文件，写入时自动创建目录。
//! - `MemoryStorage`：进程内 `HashMap`，用于测试与无盘运行。
//! - `load_json` 读取失败或解析失败时静默回退到调用方提供的默认值（记录 warn 日志）。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// 应用数据目录名
const APP_DIR_NAME: &str = "shotframe";

/// 键值存储接口（语义等同浏览器 `localStorage`）。
pub trait KeyValueStorage: Send + Sync {
    /// 读取键对应的原始字符串；键不存在时返回 `Ok(None)`。
    fn get_item(&self, key: &str) -> Result<Option<String>, AppError>;

    /// 写入键对应的原始字符串（整体替换）。
    fn set_item(&self, key: &str, value: &str) -> Result<(), AppError>;

    /// 删除键；键不存在时视为成功。
    fn remove_item(&self, key: &str) -> Result<(), AppError>;
}

/// 读取并反序列化键值；不存在或无法解析时回退到 `fallback()`。
pub fn load_json<T, F>(storage: &dyn KeyValueStorage, key: &str, fallback: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match storage.get_item(key) {
        Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("⚠️ 存储记录 `{}` 解析失败，回退默认值: {}", key, err);
                fallback()
            }
        },
        Ok(None) => fallback(),
        Err(err) => {
            log::warn!("⚠️ 读取存储记录 `{}` 失败，回退默认值: {}", key, err);
            fallback()
        }
    }
}

/// 序列化并整体写入键值。
pub fn save_json<T: Serialize>(
    storage: &dyn KeyValueStorage,
    key: &str,
    value: &T,
) -> Result<(), AppError> {
    let content = serde_json::to_string(value)
        .map_err(|e| AppError::Storage(format!("序列化 `{}` 失败: {}", key, e)))?;
    storage.set_item(key, &content)
}

/// 基于 JSON 文件的存储实现
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 使用系统配置目录下的默认位置（`<config_dir>/shotframe`）。
    pub fn in_default_dir() -> Result<Self, AppError> {
        Ok(Self::new(default_storage_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn item_path(&self, key: &str) -> Result<PathBuf, AppError> {
        if key.is_empty()
            || key
                .chars()
                .any(|c| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'))
        {
            return Err(AppError::Storage(format!("非法存储键: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStorage for JsonFileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.item_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(content))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), AppError> {
        let path = self.item_path(key)?;
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| {
                AppError::Storage(format!("创建存储目录 '{}' 失败: {}", self.dir.display(), e))
            })?;
        }
        fs::write(&path, value)?;
        log::debug!("💾 已写入存储记录 - {}", path.display());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), AppError> {
        let path = self.item_path(key)?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// 进程内存储实现
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, AppError> {
        self.items
            .lock()
            .map_err(|_| AppError::Storage("内存存储锁已中毒".to_string()))
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), AppError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// 默认存储目录：优先环境变量 `SHOTFRAME_STORAGE_DIR`，否则为系统配置目录。
pub fn default_storage_dir() -> Result<PathBuf, AppError> {
    if let Ok(dir) = std::env::var("SHOTFRAME_STORAGE_DIR") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| AppError::Storage("无法确定系统配置目录".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "shotframe-storage-{}-{}-{}",
            tag,
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ))
    }

    #[test]
    fn file_storage_round_trips_and_creates_directory() {
        let dir = scratch_dir("roundtrip");
        let storage = JsonFileStorage::new(&dir);

        assert_eq!(storage.get_item("answer").unwrap(), None);
        storage.set_item("answer", "{\"v\":42}").unwrap();
        assert_eq!(storage.get_item("answer").unwrap().as_deref(), Some("{\"v\":42}"));

        storage.remove_item("answer").unwrap();
        assert_eq!(storage.get_item("answer").unwrap(), None);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn file_storage_rejects_path_like_keys() {
        let storage = JsonFileStorage::new(scratch_dir("keys"));
        assert!(matches!(
            storage.set_item("../escape", "x"),
            Err(AppError::Storage(_))
        ));
    }

    #[test]
    fn load_json_falls_back_on_corrupt_record() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "{not json").unwrap();

        let value: Vec<u32> = load_json(&storage, "k", || vec![7]);
        assert_eq!(value, vec![7]);
    }

    #[test]
    fn save_then_load_json() {
        let storage = MemoryStorage::new();
        save_json(&storage, "k", &vec![1_u32, 2, 3]).unwrap();

        let value: Vec<u32> = load_json(&storage, "k", Vec::new);
        assert_eq!(value, vec![1, 2, 3]);
    }
}
