//! 当前图片状态（仅内存，不持久化）。

use std::sync::{Arc, RwLock};

use super::{Subscribers, SubscriptionId};
use crate::image_handler::{CandidateFile, LoadedImage};

/// 当前加载的源图片。全空 / 全零表示没有图片。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageDescriptor {
    pub url: Option<String>,
    pub file: Option<CandidateFile>,
    pub width: u32,
    pub height: u32,
}

/// 部分更新：`None` 表示保留原值；`url` / `file` 可显式置空。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImagePatch {
    pub url: Option<Option<String>>,
    pub file: Option<Option<CandidateFile>>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImagePatch {
    pub fn url(mut self, url: Option<String>) -> Self {
        self.url = Some(url);
        self
    }

    pub fn file(mut self, file: Option<CandidateFile>) -> Self {
        self.file = Some(file);
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }
}

impl From<LoadedImage> for ImagePatch {
    fn from(loaded: LoadedImage) -> Self {
        Self::default()
            .url(Some(loaded.url))
            .file(Some(loaded.file))
            .width(loaded.width)
            .height(loaded.height)
    }
}

impl ImageDescriptor {
    fn merge(&mut self, patch: ImagePatch) {
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(file) = patch.file {
            self.file = file;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
    }
}

/// 图片状态容器。不做校验，调用方需先完成加载与校验。
#[derive(Default)]
pub struct ImageStore {
    state: RwLock<ImageDescriptor>,
    subscribers: Subscribers<ImageDescriptor>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> ImageDescriptor {
        match self.state.read() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn has_image(&self) -> bool {
        match self.state.read() {
            Ok(state) => state.url.is_some(),
            Err(poisoned) => poisoned.into_inner().url.is_some(),
        }
    }

    /// 浅合并到当前描述。
    pub fn set_image(&self, patch: impl Into<ImagePatch>) {
        let snapshot = {
            let mut state = match self.state.write() {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
            state.merge(patch.into());
            state.clone()
        };
        log::debug!(
            "🖼️ 图片状态更新 - {}x{} has_image={}",
            snapshot.width,
            snapshot.height,
            snapshot.url.is_some()
        );
        self.subscribers.notify(&snapshot);
    }

    /// 重置为空描述。
    pub fn clear_image(&self) {
        {
            let mut state = match self.state.write() {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
            *state = ImageDescriptor::default();
        }
        log::debug!("🖼️ 图片状态已清空");
        self.subscribers.notify(&ImageDescriptor::default());
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ImageDescriptor) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(Arc::new(listener))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn loaded() -> LoadedImage {
        LoadedImage {
            url: "data:image/png;base64,AA==".to_string(),
            file: CandidateFile::new("a.png", "image/png", vec![0]),
            width: 640,
            height: 480,
        }
    }

    #[test]
    fn starts_empty() {
        let store = ImageStore::new();
        assert!(!store.has_image());
        assert_eq!(store.current(), ImageDescriptor::default());
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let store = ImageStore::new();
        store.set_image(loaded());
        let before = store.current();

        store.set_image(ImagePatch::default().width(100));

        let after = store.current();
        assert_eq!(after.width, 100);
        assert_eq!(after.height, before.height);
        assert_eq!(after.url, before.url);
        assert_eq!(after.file, before.file);
        assert!(store.has_image());
    }

    #[test]
    fn explicit_null_url_drops_has_image() {
        let store = ImageStore::new();
        store.set_image(loaded());
        store.set_image(ImagePatch::default().url(None));
        assert!(!store.has_image());
        assert_eq!(store.current().width, 640);
    }

    #[test]
    fn clear_resets_to_sentinel_and_notifies() {
        let store = ImageStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(move |d| sink.lock().unwrap().push(d.clone()));

        store.set_image(loaded());
        store.clear_image();

        assert_eq!(store.current(), ImageDescriptor::default());
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], ImageDescriptor::default());
    }
}
