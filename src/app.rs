//! # 应用装配
//!
//! ## 设计思路
//!
//! 把各模块按产品默认方式组装起来：设置持久化到配置目录，主题标记写入
//! `RootMarkers`，系统配色由环境变量探测，导出走 CPU 光栅化。
//! 命令行只负责解析参数与打印结果，业务流程都在这里。
//!
//! ## 实现思路
//!
//! 1. `App::new` 恢复设置并执行一次 `init_dark_mode`
//! 2. 加载入口（路径 / 系统剪贴板 / 拖放）统一产出 `Result<LoadedImage, LoadError>`，
//!    成功时写入 `ImageStore`
//! 3. `frame()` 用当前图片与设置构造导出场景

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::AppError;
use crate::export::{CpuRasterizer, Exporter, Frame};
use crate::gradients::find_gradient;
use crate::image_handler::{ImageLoader, LoadError, LoadedImage};
use crate::input::{self, PasteEvent};
use crate::state::{
    BackgroundConfig, DarkMode, ImageStore, ManualSystemTheme, RootMarkers, SettingsStore,
    SystemThemeSource,
};
use crate::storage::{JsonFileStorage, KeyValueStorage};

pub struct App {
    pub settings: Arc<SettingsStore>,
    pub image: ImageStore,
    pub loader: ImageLoader,
    pub exporter: Exporter,
    pub markers: Arc<RootMarkers>,
}

impl App {
    /// 设置保存在 `storage_dir`（缺省为默认配置目录）。
    pub fn new(storage_dir: Option<PathBuf>) -> Result<Self, AppError> {
        let storage: Arc<dyn KeyValueStorage> = match storage_dir {
            Some(dir) => Arc::new(JsonFileStorage::new(dir)),
            None => Arc::new(JsonFileStorage::in_default_dir()?),
        };
        let system_theme: Arc<dyn SystemThemeSource> = Arc::new(ManualSystemTheme::from_env());
        Ok(Self::with_parts(
            storage,
            system_theme,
            Exporter::new(Arc::new(CpuRasterizer::new())),
        ))
    }

    pub fn with_parts(
        storage: Arc<dyn KeyValueStorage>,
        system_theme: Arc<dyn SystemThemeSource>,
        exporter: Exporter,
    ) -> Self {
        let markers = Arc::new(RootMarkers::new());
        let settings = Arc::new(SettingsStore::new(storage, markers.clone(), system_theme));
        settings.init_dark_mode();

        Self {
            settings,
            image: ImageStore::new(),
            loader: ImageLoader::default(),
            exporter,
            markers,
        }
    }

    pub fn with_exporter(mut self, exporter: Exporter) -> Self {
        self.exporter = exporter;
        self
    }

    /// 文件选择：取第一个路径。
    pub async fn load_from_paths<P: AsRef<Path>>(&self, paths: &[P]) -> Result<LoadedImage, LoadError> {
        let event = input::file_input_from_paths(paths, self.loader.config()).await?;
        self.commit(input::handle_file_upload(&self.loader, &event).await)
    }

    /// 拖放：取第一个文件。
    pub async fn load_from_drop<P: AsRef<Path>>(&self, paths: &[P]) -> Result<LoadedImage, LoadError> {
        let mut event = input::drop_event_from_paths(paths, self.loader.config()).await?;
        self.commit(input::handle_drop(&self.loader, &mut event).await)
    }

    /// 粘贴：读取系统剪贴板。
    pub async fn load_from_clipboard(&self) -> Result<LoadedImage, LoadError> {
        let event = input::paste_event_from_system_clipboard().await?;
        self.load_from_paste(&event).await
    }

    /// 粘贴事件：取第一个图片条目。
    pub async fn load_from_paste(&self, event: &PasteEvent) -> Result<LoadedImage, LoadError> {
        self.commit(input::handle_paste(&self.loader, event).await)
    }

    fn commit(&self, result: Result<LoadedImage, LoadError>) -> Result<LoadedImage, LoadError> {
        if let Ok(image) = &result {
            self.image.set_image(image.clone());
        }
        result
    }

    /// 当前图片 + 当前设置 → 导出场景。
    pub fn frame(&self) -> Result<Frame, AppError> {
        Ok(Frame::from_state(
            &self.image.current(),
            &self.settings.current(),
            self.loader.config(),
        )?)
    }
}

/// 按字段名修改一项设置（命令行 `settings set`）。
///
/// 字段：`padding` / `inset` / `borderRadius` / `gradient`（预设 id）/
/// `background`（CSS 渐变）/ `backgroundImage`（路径或 Data URL）/ `darkMode`。
pub fn apply_setting(store: &SettingsStore, field: &str, value: &str) -> Result<(), AppError> {
    let parse_px = |value: &str| {
        value
            .trim()
            .parse::<u32>()
            .map_err(|_| AppError::Config(format!("'{}' 不是非负整数", value)))
    };

    match normalize_field(field).as_str() {
        "padding" => store.set_padding(parse_px(value)?),
        "inset" => store.set_inset(parse_px(value)?),
        "borderradius" | "radius" => store.set_border_radius(parse_px(value)?),
        "gradient" => {
            let preset = find_gradient(value)
                .ok_or_else(|| AppError::Config(format!("未知渐变预设: {}", value)))?;
            store.set_background(BackgroundConfig::gradient(preset.value))
        }
        "background" => store.set_background(BackgroundConfig::gradient(value)),
        "backgroundimage" => store.set_background(BackgroundConfig::image(value)),
        "darkmode" => {
            let mode = DarkMode::parse(value)
                .ok_or_else(|| AppError::Config(format!("未知配色模式: {}", value)))?;
            store.set_dark_mode(mode)
        }
        _ => Err(AppError::Config(format!("未知字段: {}", field))),
    }
}

fn normalize_field(field: &str) -> String {
    field
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect::<String>()
        .to_ascii_lowercase()
}
