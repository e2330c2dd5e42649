//! # 状态容器模块
//!
//! 两个封装好的状态容器：`ImageStore`（当前图片，仅内存）与
//! `SettingsStore`（样式偏好，写穿持久化）。读取通过访问器，修改通过显式的变更方法，
//! 变更后同步通知订阅者。
//!
//! 所有访问都发生在单一 UI 线程；内部锁只为让容器可以被 tokio 任务持有。

pub mod image;
pub mod settings;
pub mod theme;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub use image::{ImageDescriptor, ImagePatch, ImageStore};
pub use settings::{
    AppSettings, BackgroundConfig, BackgroundKind, DarkMode, SETTINGS_STORAGE_KEY, SettingsPatch,
    SettingsStore,
};
pub use theme::{ManualSystemTheme, PresentationPort, RootMarkers, SystemThemeSource, ThemeMarkers};

/// 订阅句柄，用于取消订阅。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// 订阅者列表。
pub(crate) struct Subscribers<T> {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Listener<T>)>>,
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(Vec::new()),
        }
    }
}

impl<T> Subscribers<T> {
    pub(crate) fn subscribe(&self, listener: Listener<T>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        match self.listeners.lock() {
            Ok(mut listeners) => listeners.push((id, listener)),
            Err(_) => log::error!("订阅者列表锁已中毒，订阅被忽略"),
        }
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        match self.listeners.lock() {
            Ok(mut listeners) => {
                let before = listeners.len();
                listeners.retain(|(existing, _)| *existing != id);
                listeners.len() != before
            }
            Err(_) => false,
        }
    }

    /// 通知全部订阅者。回调在锁外执行，允许回调内再次读写容器。
    pub(crate) fn notify(&self, value: &T) {
        let snapshot: Vec<Listener<T>> = match self.listeners.lock() {
            Ok(listeners) => listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
            Err(_) => return,
        };
        for listener in snapshot {
            listener(value);
        }
    }
}
