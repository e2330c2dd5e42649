//! # 截图美化工具 — 命令行入口
//!
//! 本文件只负责日志初始化、参数解析与结果打印。
//! 业务流程见 `shotframe::app`。

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use shotframe::app::{App, apply_setting};
use shotframe::error::AppError;
use shotframe::export::{
    DirectoryDownloads, ExportFormat, ExportOptions, Frame, SystemOpenShare, timestamped_stem,
};
use shotframe::gradients::{GRADIENT_PRESETS, find_gradient};
use shotframe::report::{ExportResult, FileLoadResult};
use shotframe::state::{BackgroundConfig, DarkMode};

#[derive(Parser, Debug)]
#[command(name = "shotframe", version, about = "为截图加上背景、留白与圆角并导出")]
struct Cli {
    /// 设置存储目录（默认 `$SHOTFRAME_STORAGE_DIR` 或系统配置目录下的 shotframe）。
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// 以 JSON 输出结果记录。
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 加载一张截图，按当前设置美化并导出。
    Beautify(BeautifyArgs),
    /// 查看或修改样式偏好。
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// 列出渐变预设。
    Gradients,
}

#[derive(Args, Debug)]
struct BeautifyArgs {
    /// 图片路径（取第一个）。
    #[arg(long = "input", conflicts_with = "paste")]
    input: Vec<PathBuf>,

    /// 从系统剪贴板读取图片。
    #[arg(long, default_value_t = false)]
    paste: bool,

    /// 按拖放语义加载 `--input`。
    #[arg(long = "drop", default_value_t = false, requires = "input")]
    as_drop: bool,

    /// 输出文件名（不含扩展名，默认带时间戳）。
    #[arg(long)]
    filename: Option<String>,

    /// png 或 jpg。
    #[arg(long, default_value = "png", value_parser = parse_format)]
    format: ExportFormat,

    /// JPG 质量（0..=1）。
    #[arg(long)]
    quality: Option<f32>,

    /// 复制到系统剪贴板。
    #[arg(long, default_value_t = false)]
    copy: bool,

    /// 交给系统程序分享（打开）。
    #[arg(long, default_value_t = false)]
    share: bool,

    /// 保存目录；未指定复制或分享时默认保存到系统下载目录。
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// 只打印 Data URL，不保存。
    #[arg(long, default_value_t = false)]
    data_url: bool,

    /// 本次覆盖：背景留白（像素）。
    #[arg(long)]
    padding: Option<u32>,

    /// 本次覆盖：内边距（像素）。
    #[arg(long)]
    inset: Option<u32>,

    /// 本次覆盖：圆角半径（像素）。
    #[arg(long)]
    radius: Option<u32>,

    /// 本次覆盖：渐变预设 id。
    #[arg(long, conflicts_with = "background_image")]
    gradient: Option<String>,

    /// 本次覆盖：背景图片路径。
    #[arg(long)]
    background_image: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// 打印当前设置。
    Show,
    /// 恢复默认值。
    Reset,
    /// 修改一个字段：padding / inset / borderRadius / gradient / background / backgroundImage / darkMode。
    Set { field: String, value: String },
    /// 设置配色模式：light / dark / system。
    DarkMode {
        #[arg(value_parser = parse_dark_mode)]
        mode: DarkMode,
    },
}

fn parse_format(value: &str) -> Result<ExportFormat, String> {
    ExportFormat::parse(value).ok_or_else(|| format!("不支持的格式: {}", value))
}

fn parse_dark_mode(value: &str) -> Result<DarkMode, String> {
    DarkMode::parse(value).ok_or_else(|| format!("未知配色模式: {}", value))
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let json = cli.json;
    let result = match App::new(cli.storage_dir) {
        Ok(app) => match cli.cmd {
            Command::Beautify(args) => cmd_beautify(app, args, json).await,
            Command::Settings { action } => cmd_settings(&app, action, json),
            Command::Gradients => cmd_gradients(json),
        },
        Err(err) => Err(err),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            log::error!("❌ {}", err);
            eprintln!("error[{}]: {}", err.code(), err);
            ExitCode::FAILURE
        }
    }
}

/// 返回值表示全部出口是否成功。
async fn cmd_beautify(mut app: App, args: BeautifyArgs, json: bool) -> Result<bool, AppError> {
    let load = if args.paste {
        app.load_from_clipboard().await
    } else if args.as_drop {
        app.load_from_drop(&args.input).await
    } else {
        app.load_from_paths(&args.input).await
    };
    let load_report = FileLoadResult::from_result(&load, false);
    print_report(&load_report, json);
    if load.is_err() {
        return Ok(false);
    }

    if args.share {
        let exporter = app.exporter.clone().with_share(Arc::new(SystemOpenShare::in_temp_dir()));
        app = app.with_exporter(exporter);
    }
    let wants_download = args.out_dir.is_some() || !(args.copy || args.share || args.data_url);
    if let Some(dir) = &args.out_dir {
        let exporter = app.exporter.clone().with_downloads(Arc::new(DirectoryDownloads::new(dir)));
        app = app.with_exporter(exporter);
    }

    let frame = build_frame(&app, &args)?;
    let filename = args.filename.clone().unwrap_or_else(timestamped_stem);
    let options = ExportOptions {
        format: args.format,
        quality: args.quality,
    };

    let mut reports = Vec::new();
    if args.data_url {
        let result = app.exporter.export_to_data_url(&frame, &options).await;
        reports.push(ExportResult::from_data_url(&result));
    }
    if wants_download {
        let result = app.exporter.download_image(&frame, &filename, &options).await;
        reports.push(ExportResult::from_download(&result));
    }
    if args.copy {
        let result = app.exporter.copy_to_clipboard(&frame, &options).await;
        reports.push(ExportResult::from_result("clipboard", &result));
    }
    if args.share {
        let result = app.exporter.share_image(&frame, &filename, &options).await;
        reports.push(ExportResult::from_result("share", &result));
    }

    for report in &reports {
        print_report(report, json);
    }
    Ok(reports.iter().all(|r| r.success))
}

/// 当前设置叠加本次覆盖（不持久化）。
fn build_frame(app: &App, args: &BeautifyArgs) -> Result<Frame, AppError> {
    let frame = app.frame()?;
    let mut settings = app.settings.current();

    if let Some(padding) = args.padding {
        settings.padding = padding;
    }
    if let Some(inset) = args.inset {
        settings.inset = inset;
    }
    if let Some(radius) = args.radius {
        settings.border_radius = radius;
    }
    if let Some(id) = &args.gradient {
        let preset = find_gradient(id).ok_or_else(|| AppError::Config(format!("未知渐变预设: {}", id)))?;
        settings.background = BackgroundConfig::gradient(preset.value);
    }
    if let Some(path) = &args.background_image {
        settings.background = BackgroundConfig::image(path.to_string_lossy());
    }

    Ok(Frame {
        padding: settings.padding,
        inset: settings.inset,
        border_radius: settings.border_radius,
        background: settings.background,
        ..frame
    })
}

fn cmd_settings(app: &App, action: SettingsAction, json: bool) -> Result<bool, AppError> {
    match action {
        SettingsAction::Show => {}
        SettingsAction::Reset => app.settings.reset_to_defaults()?,
        SettingsAction::Set { field, value } => apply_setting(&app.settings, &field, &value)?,
        SettingsAction::DarkMode { mode } => app.settings.set_dark_mode(mode)?,
    }

    let settings = app.settings.current();
    if json {
        print_json(&settings);
    } else {
        println!("padding       {}", settings.padding);
        println!("inset         {}", settings.inset);
        println!("borderRadius  {}", settings.border_radius);
        println!("background    {:?} {}", settings.background.kind, settings.background.value);
        println!("darkMode      {}", settings.dark_mode.as_str());
        let markers = app.markers.markers();
        println!("theme         light={} dark={}", markers.light, markers.dark);
    }
    Ok(true)
}

fn cmd_gradients(json: bool) -> Result<bool, AppError> {
    if json {
        print_json(&GRADIENT_PRESETS);
    } else {
        for preset in GRADIENT_PRESETS.iter() {
            println!("{:<14} {:<14} {}", preset.id, preset.name, preset.value);
        }
    }
    Ok(true)
}

fn print_report<T: Serialize + std::fmt::Debug>(report: &T, json: bool) {
    if json {
        print_json(report);
    } else {
        println!("{:?}", report);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(err) => log::error!("❌ 结果序列化失败：{}", err),
    }
}
