//! 渐变预设与 CSS 线性渐变解析
//!
//! # 设计思路
//!
//! 预设目录是只读的静态数据（15 个条目，第一个为默认背景）。
//! 背景值沿用 CSS `linear-gradient(...)` 表达式，渲染时解析为角度 + 色标。
//!
//! # 实现思路
//!
//! - 通过 `once_cell::sync::Lazy` 在首次调用时编译正则，后续零成本复用。
//! - 参数按顶层逗号切分，允许 `rgb()/rgba()` 内部含逗号。
//! - 色标位置缺省时按 CSS 规则补齐：首尾为 0% / 100%，中间在相邻已知位置之间均分。

use image::Rgba;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// 渐变预设
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GradientPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub value: &'static str,
}

const fn preset(id: &'static str, name: &'static str, value: &'static str) -> GradientPreset {
    GradientPreset { id, name, value }
}

/// 15 个精选渐变预设：冷色 4、暖色 4、鲜艳 4、中性 / 粉彩 3。
pub const GRADIENT_PRESETS: [GradientPreset; 15] = [
    preset("purple-dream", "Purple Dream", "linear-gradient(135deg, #667eea 0%, #764ba2 100%)"),
    preset("ocean-breeze", "Ocean Breeze", "linear-gradient(135deg, #2193b0 0%, #6dd5ed 100%)"),
    preset("midnight-blue", "Midnight Blue", "linear-gradient(135deg, #141e30 0%, #243b55 100%)"),
    preset("cool-mint", "Cool Mint", "linear-gradient(135deg, #02aab0 0%, #00cdac 100%)"),
    preset("sunset-bliss", "Sunset Bliss", "linear-gradient(135deg, #ff7e5f 0%, #feb47b 100%)"),
    preset("peachy-keen", "Peachy Keen", "linear-gradient(135deg, #ed4264 0%, #ffedbc 100%)"),
    preset("sweet-morning", "Sweet Morning", "linear-gradient(135deg, #ff5f6d 0%, #ffc371 100%)"),
    preset("orange-coral", "Orange Coral", "linear-gradient(135deg, #ff9966 0%, #ff5e62 100%)"),
    preset("purple-love", "Purple Love", "linear-gradient(135deg, #cc2b5e 0%, #753a88 100%)"),
    preset("bloody-mary", "Bloody Mary", "linear-gradient(135deg, #ff512f 0%, #dd2476 100%)"),
    preset("cosmic-night", "Cosmic Night", "linear-gradient(135deg, #4568dc 0%, #b06ab3 100%)"),
    preset("lush-green", "Lush Green", "linear-gradient(135deg, #56ab2f 0%, #a8e063 100%)"),
    preset("soft-pink", "Soft Pink", "linear-gradient(135deg, #ee9ca7 0%, #ffdde1 100%)"),
    preset("pale-wood", "Pale Wood", "linear-gradient(135deg, #eacda3 0%, #d6ae7b 100%)"),
    preset("decent-gray", "Decent Gray", "linear-gradient(135deg, #4ca1af 0%, #c4e0e5 100%)"),
];

/// 默认背景（Purple Dream）。
pub const DEFAULT_GRADIENT: GradientPreset = GRADIENT_PRESETS[0];

/// 按 id 查找预设。
pub fn find_gradient(id: &str) -> Option<&'static GradientPreset> {
    GRADIENT_PRESETS.iter().find(|p| p.id == id)
}

/// 渐变解析错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("无法解析渐变表达式：{0}")]
pub struct GradientError(pub String);

/// 色标：`position` 取值 0.0..=1.0。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub color: Rgba<u8>,
    pub position: f32,
}

/// 已解析的线性渐变。`angle_deg` 采用 CSS 约定：0deg 指向上方，顺时针增加。
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub angle_deg: f32,
    pub stops: Vec<ColorStop>,
}

static LINEAR_GRADIENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*linear-gradient\((.*)\)\s*;?\s*$").expect("linear-gradient 正则无效")
});

static ANGLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(-?\d+(?:\.\d+)?)deg$").expect("角度正则无效"));

static SIDE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^to\s+(top|right|bottom|left)(?:\s+(top|right|bottom|left))?$")
        .expect("方向正则无效")
});

static STOP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(#[0-9a-f]{3,8}|rgba?\([^)]*\))(?:\s+(-?\d+(?:\.\d+)?)%)?$")
        .expect("色标正则无效")
});

impl LinearGradient {
    /// 在渐变线上 `t`（0..=1，超出部分夹取）处取色。
    pub fn sample(&self, t: f32) -> Rgba<u8> {
        let t = t.clamp(0.0, 1.0);
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Rgba([255, 255, 255, 255]),
        };

        if t <= first.position {
            return first.color;
        }
        if t >= last.position {
            return last.color;
        }

        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t >= a.position && t <= b.position {
                let span = b.position - a.position;
                if span <= f32::EPSILON {
                    return b.color;
                }
                return lerp_color(a.color, b.color, (t - a.position) / span);
            }
        }

        last.color
    }

    /// 解析失败时使用的纯色：首个可识别的颜色，否则白色。
    pub fn fallback_color(css: &str) -> Rgba<u8> {
        split_top_level(strip_function(css).unwrap_or(css))
            .iter()
            .find_map(|part| parse_color(part.split_whitespace().next().unwrap_or_default()))
            .unwrap_or(Rgba([255, 255, 255, 255]))
    }
}

/// 解析 `linear-gradient(...)` 表达式。
pub fn parse_linear_gradient(css: &str) -> Result<LinearGradient, GradientError> {
    let inner = strip_function(css).ok_or_else(|| GradientError(css.to_string()))?;
    let mut parts = split_top_level(inner);
    if parts.is_empty() {
        return Err(GradientError(css.to_string()));
    }

    let mut angle_deg = 180.0;
    if let Some(angle) = parse_direction(&parts[0]) {
        angle_deg = angle;
        parts.remove(0);
    }

    let mut raw_stops: Vec<(Rgba<u8>, Option<f32>)> = Vec::with_capacity(parts.len());
    for part in &parts {
        let caps = STOP
            .captures(part)
            .ok_or_else(|| GradientError(format!("色标 `{}`", part)))?;
        let color = parse_color(&caps[1]).ok_or_else(|| GradientError(format!("颜色 `{}`", &caps[1])))?;
        let position = caps
            .get(2)
            .and_then(|m| m.as_str().parse::<f32>().ok())
            .map(|p| p / 100.0);
        raw_stops.push((color, position));
    }

    if raw_stops.is_empty() {
        return Err(GradientError(format!("缺少色标：{}", css)));
    }

    Ok(LinearGradient {
        angle_deg,
        stops: resolve_positions(raw_stops),
    })
}

fn strip_function(css: &str) -> Option<&str> {
    LINEAR_GRADIENT
        .captures(css)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn split_top_level(inner: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0_i32;
    let mut current = String::new();

    for ch in inner.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

fn parse_direction(part: &str) -> Option<f32> {
    if let Some(caps) = ANGLE.captures(part) {
        return caps[1].parse::<f32>().ok();
    }

    let caps = SIDE.captures(part)?;
    let side = |s: &str| -> (f32, f32) {
        match s.to_ascii_lowercase().as_str() {
            "top" => (0.0, -1.0),
            "right" => (1.0, 0.0),
            "bottom" => (0.0, 1.0),
            _ => (-1.0, 0.0),
        }
    };

    let (mut dx, mut dy) = side(&caps[1]);
    if let Some(second) = caps.get(2) {
        let (sx, sy) = side(second.as_str());
        dx += sx;
        dy += sy;
    }
    // atan2(x, -y) 即 CSS 角度（0deg 向上，顺时针）
    Some(dx.atan2(-dy).to_degrees().rem_euclid(360.0))
}

/// 解析 `#rgb` / `#rgba` / `#rrggbb` / `#rrggbbaa` / `rgb()` / `rgba()`。
pub fn parse_color(value: &str) -> Option<Rgba<u8>> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        let digits: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<Vec<u8>>>()?;
        return match digits.len() {
            3 | 4 => {
                let a = digits.get(3).map(|d| d * 17).unwrap_or(255);
                Some(Rgba([digits[0] * 17, digits[1] * 17, digits[2] * 17, a]))
            }
            6 | 8 => {
                let byte = |i: usize| digits[i] * 16 + digits[i + 1];
                let a = if digits.len() == 8 { byte(6) } else { 255 };
                Some(Rgba([byte(0), byte(2), byte(4), a]))
            }
            _ => None,
        };
    }

    let lower = value.to_ascii_lowercase();
    let args = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let fields: Vec<&str> = args.split(',').map(str::trim).collect();
    if fields.len() != 3 && fields.len() != 4 {
        return None;
    }

    let channel = |s: &str| s.parse::<f32>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8);
    let alpha = match fields.get(3) {
        Some(a) => (a.parse::<f32>().ok()?.clamp(0.0, 1.0) * 255.0).round() as u8,
        None => 255,
    };
    Some(Rgba([channel(fields[0])?, channel(fields[1])?, channel(fields[2])?, alpha]))
}

fn resolve_positions(raw: Vec<(Rgba<u8>, Option<f32>)>) -> Vec<ColorStop> {
    let count = raw.len();
    let mut positions: Vec<Option<f32>> = raw.iter().map(|(_, p)| *p).collect();

    if count == 1 {
        return vec![ColorStop {
            color: raw[0].0,
            position: positions[0].unwrap_or(0.0),
        }];
    }

    if positions[0].is_none() {
        positions[0] = Some(0.0);
    }
    if positions[count - 1].is_none() {
        positions[count - 1] = Some(1.0);
    }

    // 位置单调不减
    let mut max_seen = f32::MIN;
    for pos in positions.iter_mut().flatten() {
        if *pos < max_seen {
            *pos = max_seen;
        }
        max_seen = *pos;
    }

    let mut i = 0;
    while i < count {
        if positions[i].is_some() {
            i += 1;
            continue;
        }
        let start = i - 1;
        let mut end = i;
        while positions[end].is_none() {
            end += 1;
        }
        let from = positions[start].unwrap_or(0.0);
        let to = positions[end].unwrap_or(1.0);
        let steps = (end - start) as f32;
        for (offset, slot) in positions[start + 1..end].iter_mut().enumerate() {
            *slot = Some(from + (to - from) * (offset as f32 + 1.0) / steps);
        }
        i = end;
    }

    raw.into_iter()
        .zip(positions)
        .map(|((color, _), position)| ColorStop {
            color,
            position: position.unwrap_or(0.0),
        })
        .collect()
}

fn lerp_color(a: Rgba<u8>, b: Rgba<u8>, t: f32) -> Rgba<u8> {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round().clamp(0.0, 255.0) as u8;
    Rgba([mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2]), mix(a[3], b[3])])
}
