use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::model::{EdgeKind, NodeKind};

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let opacity = opacity.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (color.a() as f32 * opacity) as u8,
    )
}

pub(super) fn node_radius(kind: NodeKind) -> f32 {
    match kind {
        NodeKind::Policy => 14.0,
        NodeKind::Analyst => 16.0,
        _ => 9.0,
    }
}

pub(super) fn kind_color(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::Policy => Color32::from_rgb(59, 130, 246),
        NodeKind::Concept => Color32::from_rgb(168, 85, 247),
        NodeKind::Mechanism => Color32::from_rgb(16, 185, 129),
        NodeKind::Right => Color32::from_rgb(245, 158, 11),
        NodeKind::Risk => Color32::from_rgb(239, 68, 68),
        NodeKind::Analyst => Color32::from_rgb(100, 116, 139),
    }
}

pub(super) fn edge_color(kind: EdgeKind) -> Color32 {
    match kind {
        EdgeKind::Tension => Color32::from_rgb(239, 68, 68),
        EdgeKind::Resistance => Color32::from_rgb(168, 85, 247),
        EdgeKind::Extraction => Color32::from_rgb(249, 115, 22),
        EdgeKind::Translation => Color32::from_rgb(226, 232, 240),
        EdgeKind::Reinforcing => Color32::from_rgb(148, 163, 184),
    }
}

pub(super) fn arrow_color(kind: EdgeKind) -> Color32 {
    match kind {
        EdgeKind::Tension => Color32::from_rgb(239, 68, 68),
        EdgeKind::Resistance => Color32::from_rgb(168, 85, 247),
        _ => Color32::from_rgb(148, 163, 184),
    }
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70)),
        );
        y += step;
    }
}

/// Distance from `point` to the segment `a`..`b` in the same space.
pub(super) fn distance_to_segment(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let span = b - a;
    let length_sq = span.length_sq();
    if length_sq <= f32::EPSILON {
        return (point - a).length();
    }

    let t = ((point - a).dot(span) / length_sq).clamp(0.0, 1.0);
    (point - (a + span * t)).length()
}
