use super::engine::Topology;
use super::layout::{self, Card, Point, Rect, RingSlot, Size};
use super::scene::{Backdrop, PageState, Scene};
use super::{BACKDROP_DIM_ALPHA, DOT_RADIUS, RING_FONT_SIZE, SIDE_CARD_ALPHA};
use crate::gui::theme::ThemeColors;
use cairo::Context;
use gdk_pixbuf::Pixbuf;
use gdk4::prelude::*;
use palette::Srgba;
use std::f64::consts::{FRAC_PI_2, PI};

const CARD_CORNER: f64 = 16.0;

fn set_color(cr: &Context, color: Srgba<f64>, alpha: f64) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a * alpha);
}

fn rounded_rect(cr: &Context, rect: &Rect, radius: f64) {
    let r = radius.min(rect.width / 2.0).min(rect.height / 2.0);
    let (x, y, w, h) = (rect.x, rect.y, rect.width, rect.height);
    cr.new_sub_path();
    cr.arc(x + w - r, y + r, r, -FRAC_PI_2, 0.0);
    cr.arc(x + w - r, y + h - r, r, 0.0, FRAC_PI_2);
    cr.arc(x + r, y + h - r, r, FRAC_PI_2, PI);
    cr.arc(x + r, y + r, r, PI, 3.0 * FRAC_PI_2);
    cr.close_path();
}

fn centered_text(
    cr: &Context,
    text: &str,
    center: Point,
    size: f64,
    bold: bool,
) -> Result<(), cairo::Error> {
    let weight = if bold {
        cairo::FontWeight::Bold
    } else {
        cairo::FontWeight::Normal
    };
    cr.select_font_face("Sans", cairo::FontSlant::Normal, weight);
    cr.set_font_size(size);
    let ext = cr.text_extents(text)?;
    cr.move_to(
        center.x - ext.width() / 2.0 - ext.x_bearing(),
        center.y - ext.height() / 2.0 - ext.y_bearing(),
    );
    cr.show_text(text)
}

/// Paints `pixbuf` scaled to fit a `size` x `size` box around `center`.
fn draw_pixbuf_contained(
    cr: &Context,
    pixbuf: &Pixbuf,
    center: Point,
    size: f64,
    alpha: f64,
) -> Result<(), cairo::Error> {
    let (pw, ph) = (pixbuf.width() as f64, pixbuf.height() as f64);
    if pw <= 0.0 || ph <= 0.0 {
        return Ok(());
    }
    let scale = (size / pw).min(size / ph);
    cr.save()?;
    cr.translate(center.x - pw * scale / 2.0, center.y - ph * scale / 2.0);
    cr.scale(scale, scale);
    cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
    cr.paint_with_alpha(alpha)?;
    cr.restore()
}

fn draw_backdrop(cr: &Context, scene: &Scene, colors: &ThemeColors) -> Result<(), cairo::Error> {
    let Size { width, height } = scene.viewport;
    set_color(cr, colors.backdrop, 1.0);
    cr.paint()?;

    if let Backdrop::Map(pixbuf) = &scene.backdrop {
        let (pw, ph) = (pixbuf.width() as f64, pixbuf.height() as f64);
        if pw > 0.0 && ph > 0.0 {
            // cover: fill the viewport, crop the overflow
            let scale = (width / pw).max(height / ph);
            cr.save()?;
            cr.translate((width - pw * scale) / 2.0, (height - ph * scale) / 2.0);
            cr.scale(scale, scale);
            cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
            cr.paint()?;
            cr.restore()?;
        }
    }

    cr.set_source_rgba(0.0, 0.0, 0.0, BACKDROP_DIM_ALPHA);
    cr.paint()?;

    if let Backdrop::MissingKey = scene.backdrop {
        set_color(cr, colors.text_dim, 0.8);
        centered_text(
            cr,
            "Map unavailable: set maps_api_key to show the site map",
            Point::new(width / 2.0, 20.0),
            12.0,
            false,
        )?;
    }
    Ok(())
}

fn draw_ring(cr: &Context, scene: &Scene, colors: &ThemeColors) -> Result<(), cairo::Error> {
    let engine = &scene.engine;
    let slots = layout::ring_layout(engine.len(), engine.rotation(), scene.viewport);
    let front = layout::ring_front(&slots);
    let (min_depth, max_depth) = slots.iter().fold((f64::MAX, f64::MIN), |(lo, hi), s| {
        (lo.min(s.depth), hi.max(s.depth))
    });

    for slot in &slots {
        let Some(skip) = engine.items().get(slot.index) else {
            continue;
        };
        let selected = Some(slot.index) == front;
        // fade items towards the back of the ring
        let fade = if max_depth > min_depth {
            0.35 + 0.65 * (slot.depth - min_depth) / (max_depth - min_depth)
        } else {
            1.0
        };

        if selected {
            draw_ring_plate(cr, slot, colors)?;
        }
        let color = if selected { colors.text } else { colors.text_dim };
        set_color(cr, color, fade);
        centered_text(
            cr,
            skip.size.as_str(),
            slot.center,
            RING_FONT_SIZE * slot.scale,
            selected,
        )?;
    }
    Ok(())
}

fn draw_ring_plate(cr: &Context, slot: &RingSlot, colors: &ThemeColors) -> Result<(), cairo::Error> {
    set_color(cr, colors.accent, 0.18);
    rounded_rect(cr, &slot.plate(), 0.2 * slot.scale);
    cr.fill()
}

fn draw_strip(cr: &Context, scene: &Scene, colors: &ThemeColors) -> Result<(), cairo::Error> {
    let engine = &scene.engine;
    let cards = layout::strip_layout(engine.items(), engine.selected(), scene.viewport);

    // side cards first so the centre card overlaps them
    for card in cards.iter().filter(|c| !c.is_center) {
        draw_card(cr, scene, card, colors)?;
    }
    for card in cards.iter().filter(|c| c.is_center) {
        draw_card(cr, scene, card, colors)?;
    }
    Ok(())
}

fn draw_card(
    cr: &Context,
    scene: &Scene,
    card: &Card,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let Some(skip) = card.index.and_then(|i| scene.engine.items().get(i)) else {
        return Ok(());
    };
    let alpha = if card.is_center { 1.0 } else { SIDE_CARD_ALPHA };

    if card.is_center {
        cr.set_source_rgba(0.0, 0.0, 0.0, 0.18);
        let shadow = Rect {
            y: card.rect.y + 8.0,
            ..card.rect
        };
        rounded_rect(cr, &shadow, CARD_CORNER);
        cr.fill()?;
    }

    set_color(cr, colors.card, alpha);
    rounded_rect(cr, &card.rect, CARD_CORNER);
    cr.fill()?;

    let center = card.rect.center();
    if let Some(pixbuf) = scene.image_for(skip) {
        draw_pixbuf_contained(cr, pixbuf, center, card.image_size, alpha)?;
    }

    let (font, shade) = match (card.is_center, scene.viewport.is_narrow()) {
        (true, true) => (16.0, 0.1),
        (true, false) => (20.0, 0.1),
        (false, true) => (12.0, 0.29),
        (false, false) => (14.0, 0.29),
    };
    cr.set_source_rgba(shade, shade, shade, alpha);
    centered_text(
        cr,
        skip.size.as_str(),
        Point::new(center.x, card.rect.y + card.rect.height * 0.12),
        font,
        true,
    )
}

fn draw_dots(cr: &Context, scene: &Scene, colors: &ThemeColors) -> Result<(), cairo::Error> {
    let selected = scene.engine.front_index();
    for (i, dot) in layout::dot_centers(scene.engine.len(), scene.viewport)
        .into_iter()
        .enumerate()
    {
        let (color, radius) = if Some(i) == selected {
            (colors.accent, DOT_RADIUS * 1.25)
        } else {
            (colors.dot, DOT_RADIUS)
        };
        set_color(cr, color, 1.0);
        cr.arc(dot.x, dot.y, radius, 0.0, 2.0 * PI);
        cr.fill()?;
    }
    Ok(())
}

fn draw_status(
    cr: &Context,
    text: &str,
    color: Srgba<f64>,
    viewport: Size,
) -> Result<(), cairo::Error> {
    set_color(cr, color, 1.0);
    centered_text(cr, text, viewport.center(), 18.0, false)
}

pub fn draw(cr: &Context, scene: &Scene, colors: &ThemeColors) -> Result<(), cairo::Error> {
    draw_backdrop(cr, scene, colors)?;

    match scene.page_state() {
        PageState::Loading => draw_status(cr, "Loading skips...", colors.text, scene.viewport),
        PageState::Failed(msg) => draw_status(
            cr,
            &format!("Error loading skips: {msg}"),
            colors.error,
            scene.viewport,
        ),
        PageState::Empty => draw_status(
            cr,
            &format!("No skips available for {}", scene.location_label),
            colors.text,
            scene.viewport,
        ),
        PageState::Ready => {
            match scene.engine.behavior().topology {
                Topology::Ring => draw_ring(cr, scene, colors)?,
                Topology::Linear => draw_strip(cr, scene, colors)?,
            }
            draw_dots(cr, scene, colors)
        }
    }
}
