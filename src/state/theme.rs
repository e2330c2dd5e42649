//! 明暗主题输出端口。
//!
//! 偏好变化需要传播到进程级的展示标记（根节点上互斥的 light / dark 两个标记）。
//! 这里用注入的 `PresentationPort` 承接输出，用 `SystemThemeSource` 承接系统配色偏好。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::DarkMode;

/// 根节点上的两个展示标记。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThemeMarkers {
    pub light: bool,
    pub dark: bool,
}

impl ThemeMarkers {
    /// 由偏好与系统配色计算标记：`system` 不设 light 覆盖，dark 跟随系统。
    pub fn for_mode(mode: DarkMode, system_prefers_dark: bool) -> Self {
        match mode {
            DarkMode::Light => Self {
                light: true,
                dark: false,
            },
            DarkMode::Dark => Self {
                light: false,
                dark: true,
            },
            DarkMode::System => Self {
                light: false,
                dark: system_prefers_dark,
            },
        }
    }
}

/// 展示输出端口。
pub trait PresentationPort: Send + Sync {
    fn apply_theme(&self, markers: ThemeMarkers);
}

/// 系统配色偏好来源。
pub trait SystemThemeSource: Send + Sync {
    fn prefers_dark(&self) -> bool;

    /// 订阅系统偏好变化。订阅与进程同寿命，没有取消接口。
    fn subscribe(&self, listener: Box<dyn Fn(bool) + Send + Sync>);
}

/// 内存中的根节点标记。
#[derive(Debug, Default)]
pub struct RootMarkers {
    markers: Mutex<ThemeMarkers>,
}

impl RootMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> ThemeMarkers {
        match self.markers.lock() {
            Ok(m) => *m,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl PresentationPort for RootMarkers {
    fn apply_theme(&self, markers: ThemeMarkers) {
        match self.markers.lock() {
            Ok(mut m) => *m = markers,
            Err(poisoned) => *poisoned.into_inner() = markers,
        }
        log::debug!("🎨 主题标记 - light={} dark={}", markers.light, markers.dark);
    }
}

/// 手动驱动的系统配色来源。
///
/// 初值可由 `from_env` 探测；`set_prefers_dark` 发生变化时通知订阅者。
#[derive(Default)]
pub struct ManualSystemTheme {
    prefers_dark: AtomicBool,
    listeners: Mutex<Vec<Arc<dyn Fn(bool) + Send + Sync>>>,
}

impl ManualSystemTheme {
    pub fn new(prefers_dark: bool) -> Self {
        Self {
            prefers_dark: AtomicBool::new(prefers_dark),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// 从环境变量探测：`SHOTFRAME_COLOR_SCHEME=dark|light`，其次 `GTK_THEME` 是否为暗色变体。
    pub fn from_env() -> Self {
        let scheme = std::env::var("SHOTFRAME_COLOR_SCHEME").ok();
        let gtk_theme = std::env::var("GTK_THEME").ok();
        Self::new(detect_prefers_dark(scheme.as_deref(), gtk_theme.as_deref()))
    }

    pub fn set_prefers_dark(&self, prefers_dark: bool) {
        let previous = self.prefers_dark.swap(prefers_dark, Ordering::SeqCst);
        if previous == prefers_dark {
            return;
        }

        let listeners: Vec<_> = match self.listeners.lock() {
            Ok(listeners) => listeners.clone(),
            Err(_) => return,
        };
        for listener in listeners {
            listener(prefers_dark);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }
}

impl SystemThemeSource for ManualSystemTheme {
    fn prefers_dark(&self) -> bool {
        self.prefers_dark.load(Ordering::SeqCst)
    }

    fn subscribe(&self, listener: Box<dyn Fn(bool) + Send + Sync>) {
        match self.listeners.lock() {
            Ok(mut listeners) => listeners.push(Arc::from(listener)),
            Err(_) => log::error!("系统主题订阅锁已中毒，订阅被忽略"),
        }
    }
}

fn detect_prefers_dark(scheme: Option<&str>, gtk_theme: Option<&str>) -> bool {
    match scheme.map(|s| s.trim().to_ascii_lowercase()) {
        Some(s) if s == "dark" => return true,
        Some(s) if s == "light" => return false,
        _ => {}
    }

    gtk_theme
        .map(|t| {
            let t = t.to_ascii_lowercase();
            t.ends_with(":dark") || t.ends_with("-dark")
        })
        .unwrap_or(false)
}
