//! # 截图美化工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 入口 (CLI / 宿主界面)                     │
//! │                                                          │
//! │  上传 / 粘贴 / 拖放        样式面板        导出菜单       │
//! └───────┼───────────────────────┼───────────────┼──────────┘
//!         ↓                       ↓               ↓
//! ┌──────────────────────────────────────────────────────────┐
//! │  ┌─ input ────────── 事件 → 候选文件                       │
//! │  ├─ validation ───── 类型 / 体积校验，剪贴板图片挑选       │
//! │  ├─ image_handler ── 读取为 Data URL + 解码取尺寸          │
//! │  │                                                       │
//! │  ├─ state                                                │
//! │  │   ├─ image      当前图片（观察者订阅）                 │
//! │  │   ├─ settings   样式偏好（持久化 + 观察者订阅）        │
//! │  │   └─ theme      明暗主题标记                           │
//! │  ├─ storage ──────── 键值存储（JSON 文件 / 内存）          │
//! │  ├─ gradients ────── 15 个渐变预设 + CSS 渐变解析          │
//! │  │                                                       │
//! │  ├─ export ───────── 合成 → 编码 → 下载 / 剪贴板 / 分享    │
//! │  ├─ report ───────── 可序列化的结果记录                    │
//! │  ├─ app ──────────── 默认装配                              │
//! │  └─ error ────────── AppError (统一错误类型)               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`validation`] | 文件类型与体积校验、剪贴板图片挑选 |
//! | [`image_handler`] | 候选文件加载为 Data URL 并取得尺寸 |
//! | [`input`] | 上传 / 粘贴 / 拖放三个入口，以及桌面平台适配 |
//! | [`state`] | 图片状态、样式偏好、明暗主题 |
//! | [`storage`] | 键值存储端口与 JSON 文件实现 |
//! | [`gradients`] | 渐变预设目录与 CSS 线性渐变解析 |
//! | [`export`] | 光栅化与导出出口 |
//! | [`report`] | 操作结果记录 |
//! | [`app`] | 按产品默认方式装配各模块 |
//!
//! ## 错误处理策略
//!
//! - 加载链路返回 `LoadError`，导出链路返回 `ExportError`，其 `Display` 即用户提示文案
//! - 应用层统一上转为 `AppError`
//! - 非测试代码不使用 `unwrap()` / `expect()` 处理可恢复错误

pub mod app;
pub mod error;
pub mod export;
pub mod gradients;
pub mod image_handler;
pub mod input;
pub mod report;
pub mod state;
pub mod storage;
pub mod validation;
