//! 样式偏好状态（写穿持久化）。
//!
//! # 设计思路
//!
//! 进程内构造一次，从持久化存储恢复；存储缺失或记录损坏时使用默认值的新副本。
//! 每个 setter 先写字段，再把完整记录同步写回存储，不做批量或防抖。
//!
//! # 明暗主题
//!
//! - `set_dark_mode` 持久化后立即应用到展示端口。
//! - `init_dark_mode` 启动时应用一次；仅当偏好为 `system` 时订阅系统配色变化，
//!   订阅与进程同寿命（只初始化一次，不拆除），回调中仅在偏好仍为 `system` 时重新应用。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use super::theme::{PresentationPort, SystemThemeSource, ThemeMarkers};
use super::{Subscribers, SubscriptionId};
use crate::error::AppError;
use crate::gradients::DEFAULT_GRADIENT;
use crate::storage::{KeyValueStorage, load_json, save_json};

/// 设置记录的固定存储键。
pub const SETTINGS_STORAGE_KEY: &str = "xxxnaper-settings";

/// 背景类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    Gradient,
    Image,
}

/// 背景配置：`value` 为 CSS 渐变表达式或图片地址（Data URL / 文件路径）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundConfig {
    #[serde(rename = "type")]
    pub kind: BackgroundKind,
    pub value: String,
}

impl BackgroundConfig {
    pub fn gradient(value: impl Into<String>) -> Self {
        Self {
            kind: BackgroundKind::Gradient,
            value: value.into(),
        }
    }

    pub fn image(value: impl Into<String>) -> Self {
        Self {
            kind: BackgroundKind::Image,
            value: value.into(),
        }
    }
}

/// 明暗偏好。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DarkMode {
    Light,
    Dark,
    #[default]
    System,
}

impl DarkMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

/// 完整的样式偏好记录。缺失字段在反序列化时由默认值补齐。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub padding: u32,
    pub inset: u32,
    pub border_radius: u32,
    pub background: BackgroundConfig,
    pub dark_mode: DarkMode,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            padding: 40,
            inset: 0,
            border_radius: 8,
            background: BackgroundConfig::gradient(DEFAULT_GRADIENT.value),
            dark_mode: DarkMode::System,
        }
    }
}

/// 多字段合并更新。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub padding: Option<u32>,
    pub inset: Option<u32>,
    pub border_radius: Option<u32>,
    pub background: Option<BackgroundConfig>,
    pub dark_mode: Option<DarkMode>,
}

impl SettingsPatch {
    fn apply_to(self, settings: &mut AppSettings) {
        if let Some(padding) = self.padding {
            settings.padding = padding;
        }
        if let Some(inset) = self.inset {
            settings.inset = inset;
        }
        if let Some(border_radius) = self.border_radius {
            settings.border_radius = border_radius;
        }
        if let Some(background) = self.background {
            settings.background = background;
        }
        if let Some(dark_mode) = self.dark_mode {
            settings.dark_mode = dark_mode;
        }
    }
}

/// 样式偏好状态容器。
pub struct SettingsStore {
    state: RwLock<AppSettings>,
    storage: Arc<dyn KeyValueStorage>,
    presentation: Arc<dyn PresentationPort>,
    system_theme: Arc<dyn SystemThemeSource>,
    system_listener_installed: AtomicBool,
    subscribers: Subscribers<AppSettings>,
}

impl SettingsStore {
    /// 从存储恢复；缺失或损坏时使用默认值。
    pub fn new(
        storage: Arc<dyn KeyValueStorage>,
        presentation: Arc<dyn PresentationPort>,
        system_theme: Arc<dyn SystemThemeSource>,
    ) -> Self {
        let initial = load_json(storage.as_ref(), SETTINGS_STORAGE_KEY, AppSettings::default);
        log::info!(
            "⚙️ 设置已加载 - padding={} inset={} radius={} darkMode={}",
            initial.padding,
            initial.inset,
            initial.border_radius,
            initial.dark_mode.as_str()
        );

        Self {
            state: RwLock::new(initial),
            storage,
            presentation,
            system_theme,
            system_listener_installed: AtomicBool::new(false),
            subscribers: Subscribers::default(),
        }
    }

    pub fn current(&self) -> AppSettings {
        match self.state.read() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn padding(&self) -> u32 {
        self.current().padding
    }

    pub fn inset(&self) -> u32 {
        self.current().inset
    }

    pub fn border_radius(&self) -> u32 {
        self.current().border_radius
    }

    pub fn background(&self) -> BackgroundConfig {
        self.current().background
    }

    pub fn dark_mode(&self) -> DarkMode {
        self.current().dark_mode
    }

    pub fn set_padding(&self, value: u32) -> Result<(), AppError> {
        self.mutate(|s| s.padding = value)
    }

    pub fn set_inset(&self, value: u32) -> Result<(), AppError> {
        self.mutate(|s| s.inset = value)
    }

    pub fn set_border_radius(&self, value: u32) -> Result<(), AppError> {
        self.mutate(|s| s.border_radius = value)
    }

    pub fn set_background(&self, background: BackgroundConfig) -> Result<(), AppError> {
        self.mutate(|s| s.background = background)
    }

    pub fn set_dark_mode(&self, mode: DarkMode) -> Result<(), AppError> {
        let persisted = self.mutate(|s| s.dark_mode = mode);
        self.apply_dark_mode();
        persisted
    }

    /// 合并多个字段后只持久化一次。
    pub fn update(&self, patch: SettingsPatch) -> Result<(), AppError> {
        let touches_dark_mode = patch.dark_mode.is_some();
        let persisted = self.mutate(|s| patch.apply_to(s));
        if touches_dark_mode {
            self.apply_dark_mode();
        }
        persisted
    }

    /// 用默认值的新副本整体替换并持久化。
    pub fn reset_to_defaults(&self) -> Result<(), AppError> {
        log::info!("⚙️ 设置重置为默认值");
        self.mutate(|s| *s = AppSettings::default())
    }

    /// 将当前偏好应用到展示端口。
    pub fn apply_dark_mode(&self) {
        let mode = self.dark_mode();
        let prefers_dark = mode == DarkMode::System && self.system_theme.prefers_dark();
        self.presentation
            .apply_theme(ThemeMarkers::for_mode(mode, prefers_dark));
    }

    /// 启动时应用一次；偏好为 `system` 时订阅系统配色变化（只订阅一次）。
    pub fn init_dark_mode(self: &Arc<Self>) {
        self.apply_dark_mode();

        if self.dark_mode() != DarkMode::System {
            return;
        }
        if self.system_listener_installed.swap(true, Ordering::SeqCst) {
            return;
        }

        let weak = Arc::downgrade(self);
        self.system_theme.subscribe(Box::new(move |prefers_dark| {
            let Some(store) = weak.upgrade() else {
                return;
            };
            if store.dark_mode() == DarkMode::System {
                log::debug!("🎨 系统配色变化 - prefers_dark={}", prefers_dark);
                store.apply_dark_mode();
            }
        }));
        log::debug!("🎨 已订阅系统配色变化");
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&AppSettings) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(Arc::new(listener))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// 写字段 → 写穿持久化 → 通知订阅者。持久化失败时内存值仍保留新值。
    fn mutate<F>(&self, change: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut AppSettings),
    {
        let snapshot = {
            let mut state = match self.state.write() {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
            change(&mut state);
            state.clone()
        };

        let persisted = save_json(self.storage.as_ref(), SETTINGS_STORAGE_KEY, &snapshot);
        if let Err(err) = &persisted {
            log::error!("设置持久化失败: {}", err);
        }

        self.subscribers.notify(&snapshot);
        persisted
    }
}
