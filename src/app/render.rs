use eframe::egui;
use honeycomb::model::{Edge, EdgeVariant, LineStyle, Node, Side};
use honeycomb::store::GraphStore;
use honeycomb::theme::{EdgePaint, Rgb};

use super::View;
use super::geometry::{HANDLE_RADIUS, edge_path_world, node_rect_world, side_anchor};

const DASH: (f32, f32) = (10.0, 5.0);
const GRADIENT_STEP: f32 = 12.0;
const SIDES: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

pub(super) fn color(rgb: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(rgb.r, rgb.g, rgb.b)
}

fn lerp_color(a: egui::Color32, b: egui::Color32, t: f32) -> egui::Color32 {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    egui::Color32::from_rgb(mix(a.r(), b.r()), mix(a.g(), b.g()), mix(a.b(), b.b()))
}

pub(super) fn draw_background(painter: &egui::Painter, rect: egui::Rect, view: &View) {
    let bg = painter.ctx().style().visuals.extreme_bg_color;
    painter.rect_filled(rect, 0.0, bg);
    let grid_color = egui::Color32::from_gray(60);
    let spacing_world = 64.0;
    let spacing_screen = spacing_world * view.zoom;
    if spacing_screen < 24.0 {
        return;
    }
    let start = rect.min + view.pan_screen;
    let stroke = egui::Stroke::new(1.0, grid_color);
    let x0 = ((rect.min.x - start.x) / spacing_screen).floor() * spacing_screen + start.x;
    let y0 = ((rect.min.y - start.y) / spacing_screen).floor() * spacing_screen + start.y;
    let mut x = x0;
    while x < rect.max.x {
        painter.line_segment([egui::pos2(x, rect.min.y), egui::pos2(x, rect.max.y)], stroke);
        x += spacing_screen;
    }
    let mut y = y0;
    while y < rect.max.y {
        painter.line_segment([egui::pos2(rect.min.x, y), egui::pos2(rect.max.x, y)], stroke);
        y += spacing_screen;
    }
}

pub(super) fn draw_edges(
    painter: &egui::Painter,
    origin: egui::Pos2,
    view: &View,
    store: &GraphStore,
    highlighted: Option<&str>,
) {
    for edge in store.edges() {
        draw_edge(painter, origin, view, store, edge, highlighted == Some(edge.id.as_str()));
    }
}

fn draw_edge(
    painter: &egui::Painter,
    origin: egui::Pos2,
    view: &View,
    store: &GraphStore,
    edge: &Edge,
    highlighted: bool,
) {
    let Some(path) = edge_path_world(store, edge) else {
        return;
    };
    let path: Vec<egui::Pos2> = path.into_iter().map(|p| view.world_to_screen(origin, p)).collect();
    let (from, to) = match store.edge_paint(edge) {
        EdgePaint::Solid(rgb) => (color(rgb), color(rgb)),
        EdgePaint::Gradient { from, to } => (color(from), color(to)),
    };
    let width = (if highlighted { 3.0 } else { 2.0 }) * view.zoom.max(0.5);
    let dash = (edge.line_style == LineStyle::Dashed).then_some(DASH);
    let last = path.len() - 1;
    for (i, w) in path.windows(2).enumerate() {
        let c0 = lerp_color(from, to, i as f32 / last as f32);
        let c1 = lerp_color(from, to, (i + 1) as f32 / last as f32);
        draw_painted_line(painter, w[0], w[1], width, c0, c1, dash);
    }

    if edge.arrow_head().is_some() {
        if edge.arrow.is_reversed {
            draw_arrowhead(painter, path[1], path[0], from, view.zoom);
        } else {
            draw_arrowhead(painter, path[last - 1], path[last], to, view.zoom);
        }
    }

    if let Some(label) = edge.label.as_deref().filter(|l| !l.is_empty()) {
        let mid = match path.as_slice() {
            [a, b] => *a + (*b - *a) * 0.5,
            _ => path[path.len() / 2],
        };
        let font = egui::FontId::proportional(12.0 * view.zoom.clamp(0.5, 2.0));
        let text_color = painter.ctx().style().visuals.text_color();
        if edge.variant == EdgeVariant::Labeled {
            let galley = painter.layout_no_wrap(label.to_string(), font, text_color);
            let rect = egui::Rect::from_center_size(mid, galley.size()).expand(4.0);
            painter.rect_filled(rect, 4.0, painter.ctx().style().visuals.window_fill);
            painter.rect_stroke(rect, 4.0, egui::Stroke::new(1.0, to), egui::StrokeKind::Middle);
            painter.galley(rect.min + egui::vec2(4.0, 4.0), galley, text_color);
        } else {
            painter.text(mid, egui::Align2::CENTER_BOTTOM, label, font, text_color);
        }
    }
}

/// Straight line whose color runs from `from` to `to`, optionally dashed.
fn draw_painted_line(
    painter: &egui::Painter,
    a: egui::Pos2,
    b: egui::Pos2,
    width: f32,
    from: egui::Color32,
    to: egui::Color32,
    dash: Option<(f32, f32)>,
) {
    let v = b - a;
    let len = v.length();
    if len <= f32::EPSILON {
        return;
    }
    if from == to && dash.is_none() {
        painter.line_segment([a, b], egui::Stroke::new(width, from));
        return;
    }
    let dir = v / len;
    let (on, off) = dash.unwrap_or((GRADIENT_STEP, 0.0));
    let mut pos = 0.0;
    while pos < len {
        let end = (pos + on).min(len);
        let t = (pos + end) * 0.5 / len;
        painter.line_segment(
            [a + dir * pos, a + dir * end],
            egui::Stroke::new(width, lerp_color(from, to, t)),
        );
        pos = end + off;
    }
}

fn draw_arrowhead(
    painter: &egui::Painter,
    a: egui::Pos2,
    b: egui::Pos2,
    color: egui::Color32,
    zoom: f32,
) {
    let v = b - a;
    if v.length_sq() <= f32::EPSILON {
        return;
    }
    let dir = v.normalized();
    let size = 10.0 * zoom.clamp(0.5, 2.0);
    let perp = egui::vec2(-dir.y, dir.x);
    let tip = b;
    let base = b - dir * size;
    let left = base + perp * (size * 0.6);
    let right = base - perp * (size * 0.6);
    painter.add(egui::Shape::convex_polygon(
        vec![tip, left, right],
        color,
        egui::Stroke::NONE,
    ));
}

pub(super) fn draw_nodes(
    painter: &egui::Painter,
    origin: egui::Pos2,
    view: &View,
    store: &GraphStore,
    highlighted: Option<&str>,
    show_handles: Option<&str>,
) {
    for node in store.nodes() {
        draw_node(
            painter,
            origin,
            view,
            node,
            highlighted == Some(node.id.as_str()),
            show_handles == Some(node.id.as_str()),
        );
    }
}

fn draw_node(
    painter: &egui::Painter,
    origin: egui::Pos2,
    view: &View,
    node: &Node,
    highlighted: bool,
    show_handles: bool,
) {
    let world = node_rect_world(node);
    let rect = egui::Rect::from_min_max(
        view.world_to_screen(origin, world.min),
        view.world_to_screen(origin, world.max),
    );
    let accent = color(node.data.theme_color.rgb());
    let fill = painter.ctx().style().visuals.window_fill;
    let radius = 6.0 * view.zoom;
    painter.rect_filled(rect, radius, fill);
    painter.rect_filled(
        egui::Rect::from_min_size(rect.min, egui::vec2(4.0 * view.zoom, rect.height())),
        radius,
        accent,
    );
    let stroke_width = if highlighted { 2.5 } else { 1.5 };
    painter.rect_stroke(
        rect,
        radius,
        egui::Stroke::new(stroke_width, accent),
        egui::StrokeKind::Middle,
    );

    let text_color = painter.ctx().style().visuals.text_color();
    let font = egui::FontId::proportional(14.0 * view.zoom);
    painter.text(rect.center(), egui::Align2::CENTER_CENTER, &node.data.label, font, text_color);
    if node.data.link().is_some() {
        painter.text(
            rect.right_top() + egui::vec2(-6.0, 4.0) * view.zoom,
            egui::Align2::RIGHT_TOP,
            "↗",
            egui::FontId::proportional(11.0 * view.zoom),
            accent,
        );
    }

    if show_handles {
        for side in SIDES {
            let p = view.world_to_screen(origin, side_anchor(world, side));
            painter.circle(p, HANDLE_RADIUS, fill, egui::Stroke::new(1.5, accent));
        }
    }
}

pub(super) fn draw_connection_preview(
    painter: &egui::Painter,
    from: egui::Pos2,
    to: egui::Pos2,
) {
    let accent = painter.ctx().style().visuals.selection.stroke.color;
    draw_painted_line(painter, from, to, 1.5, accent, accent, Some((6.0, 4.0)));
    painter.circle_filled(to, 3.0, accent);
}
