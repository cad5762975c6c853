use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use eframe::egui::{Color32, Vec2};

use super::scene::Scene;

const WATERMARK: &str = "Generated by Assemblage Scope";
const WATERMARK_SUB: &str = "assemblage-scope";
const EXPORT_SCALE: f32 = 2.0;

pub(super) fn export_file_name(date: NaiveDate) -> String {
    format!("assemblage-snapshot-{}.png", date.format("%Y-%m-%d"))
}

fn rgb(color: Color32) -> String {
    format!("rgb({},{},{})", color.r(), color.g(), color.b())
}

fn opacity(color: Color32) -> f32 {
    color.a() as f32 / 255.0
}

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Serializes the frame the same way the canvas paints it, plus the fixed
/// watermark. The scene is already in screen space.
pub(super) fn scene_to_svg(scene: &Scene, size: Vec2) -> String {
    use std::fmt::Write;

    let width = size.x.max(1.0);
    let height = size.y.max(1.0);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let _ = write!(
        svg,
        r#"<rect x="0" y="0" width="{width}" height="{height}" fill="white"/>"#
    );

    for edge in &scene.edges {
        let dash = if edge.dashed {
            r#" stroke-dasharray="4 4""#
        } else {
            ""
        };
        let _ = write!(
            svg,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-opacity="{:.3}" stroke-width="{:.2}"{dash}/>"#,
            edge.start.x,
            edge.start.y,
            edge.end.x,
            edge.end.y,
            rgb(edge.stroke.color),
            opacity(edge.stroke.color),
            edge.stroke.width,
        );

        if let Some([tip, left, right]) = edge.arrow {
            let _ = write!(
                svg,
                r#"<polygon points="{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}" fill="{}" fill-opacity="{:.3}"/>"#,
                tip.x,
                tip.y,
                left.x,
                left.y,
                right.x,
                right.y,
                rgb(edge.arrow_fill),
                opacity(edge.arrow_fill),
            );
        }
    }

    for node in &scene.nodes {
        let _ = write!(
            svg,
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" fill-opacity="{:.3}" stroke="{}" stroke-opacity="{:.3}" stroke-width="{:.2}"/>"#,
            node.center.x,
            node.center.y,
            node.radius,
            rgb(node.fill),
            opacity(node.fill),
            rgb(node.outline.color),
            opacity(node.outline.color),
            node.outline.width,
        );
        let _ = write!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="12" fill="{}" fill-opacity="{:.3}">{}</text>"#,
            node.center.x + node.radius + 5.0,
            node.center.y + 4.0,
            rgb(node.label_color),
            opacity(node.label_color),
            xml_escape(&node.label),
        );
    }

    let _ = write!(
        svg,
        r#"<text x="{:.2}" y="{:.2}" text-anchor="end" font-family="sans-serif" font-size="24" font-weight="bold" fill="rgb(100,116,139)" fill-opacity="0.5">{}</text>"#,
        width - 20.0,
        height - 40.0,
        xml_escape(WATERMARK),
    );
    let _ = write!(
        svg,
        r#"<text x="{:.2}" y="{:.2}" text-anchor="end" font-family="sans-serif" font-size="16" fill="rgb(100,116,139)" fill-opacity="0.4">{}</text>"#,
        width - 20.0,
        height - 20.0,
        xml_escape(WATERMARK_SUB),
    );

    svg.push_str("</svg>");
    svg
}

pub(super) fn render_scene_png(scene: &Scene, size: Vec2) -> Result<Vec<u8>> {
    let svg = scene_to_svg(scene, size);
    let mut options = resvg::usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = resvg::usvg::Tree::from_str(&svg, &options)
        .context("failed to build snapshot SVG tree")?;

    let width = (size.x.max(1.0) * EXPORT_SCALE).ceil() as u32;
    let height = (size.y.max(1.0) * EXPORT_SCALE).ceil() as u32;
    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).context("failed to allocate snapshot pixmap")?;
    pixmap.fill(tiny_skia::Color::WHITE);

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(EXPORT_SCALE, EXPORT_SCALE),
        &mut pixmap.as_mut(),
    );

    pixmap.encode_png().context("failed to encode snapshot PNG")
}

fn write_snapshot(scene: &Scene, size: Vec2, directory: &Path) -> Result<PathBuf> {
    let png = render_scene_png(scene, size)?;
    std::fs::create_dir_all(directory)
        .with_context(|| format!("failed to create export directory {}", directory.display()))?;

    let path = directory.join(export_file_name(Utc::now().date_naive()));
    std::fs::write(&path, png)
        .with_context(|| format!("failed to write snapshot to {}", path.display()))?;
    Ok(path)
}

/// Renders and writes the snapshot off the frame loop. The current drag and
/// the running simulation are untouched; the reply arrives over the channel.
pub(super) fn spawn_export(
    scene: Scene,
    size: Vec2,
    directory: PathBuf,
) -> Receiver<Result<PathBuf, String>> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let result = write_snapshot(&scene, size, &directory).map_err(|error| error.to_string());
        let _ = tx.send(result);
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{Stroke, pos2, vec2};

    use crate::app::scene::{EdgePrimitive, NodePrimitive};

    fn tiny_scene() -> Scene {
        Scene {
            edges: vec![EdgePrimitive {
                edge_index: 0,
                start: pos2(40.0, 40.0),
                end: pos2(160.0, 90.0),
                stroke: Stroke::new(1.5, Color32::from_rgb(148, 163, 184)),
                dashed: true,
                arrow: Some([pos2(150.0, 86.0), pos2(143.0, 80.0), pos2(141.0, 89.0)]),
                arrow_fill: Color32::from_rgb(148, 163, 184),
            }],
            nodes: vec![NodePrimitive {
                slot: 0,
                center: pos2(40.0, 40.0),
                radius: 14.0,
                fill: Color32::from_rgb(59, 130, 246),
                outline: Stroke::new(2.0, Color32::WHITE),
                halo: false,
                label: "GDPR <draft> & friends".to_owned(),
                label_color: Color32::from_gray(220),
            }],
            animating: false,
        }
    }

    #[test]
    fn file_name_is_deterministic_for_a_fixed_utc_date() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(export_file_name(date), "assemblage-snapshot-2026-08-07.png");
    }

    #[test]
    fn svg_carries_primitives_watermark_and_escaped_labels() {
        let svg = scene_to_svg(&tiny_scene(), vec2(800.0, 500.0));

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("stroke-dasharray=\"4 4\""));
        assert!(svg.contains("<polygon"));
        assert!(svg.contains("<circle"));
        assert!(svg.contains(WATERMARK));
        assert!(svg.contains(WATERMARK_SUB));
        assert!(svg.contains("GDPR &lt;draft&gt; &amp; friends"));
        assert!(!svg.contains("<draft>"));
    }

    #[test]
    fn renders_a_png_at_double_resolution() {
        let bytes = render_scene_png(&tiny_scene(), vec2(200.0, 100.0)).unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));

        let pixmap = tiny_skia::Pixmap::decode_png(&bytes).unwrap();
        assert_eq!(pixmap.width(), 400);
        assert_eq!(pixmap.height(), 200);
    }

    #[test]
    fn spawn_export_writes_the_dated_file_and_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let rx = spawn_export(tiny_scene(), vec2(120.0, 80.0), dir.path().to_path_buf());

        let path = rx.recv().unwrap().unwrap();
        assert!(path.exists());
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            export_file_name(Utc::now().date_naive())
        );
    }
}
