//! Pure placement math for both carousel layouts and the dot indicator.
//! Nothing here touches GTK or cairo, so hit-testing and drawing share it.

use super::engine::ring_angle;
use super::{
    CAMERA_DISTANCE, CAMERA_FOV, DOT_BOTTOM_MARGIN, DOT_HIT_SLOP, DOT_RADIUS, DOT_SPACING,
    NARROW_BREAKPOINT, RING_PLATE_HEIGHT, RING_PLATE_WIDTH, RING_RADIUS, RING_TILT,
    RING_VERTICAL_CENTER, SIDE_CARD_DROP, SIDE_CARD_SHRINK, STRIP_VERTICAL_CENTER,
};
use skiphire::SkipOption;
use std::f64::consts::FRAC_PI_2;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_narrow(&self) -> bool {
        self.width < NARROW_BREAKPOINT
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn centered(center: Point, width: f64, height: f64) -> Self {
        Self {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

// Ring

/// One item of the ring after tilt and projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSlot {
    pub index: usize,
    pub center: Point,
    /// Pixels per world unit at this item's depth.
    pub scale: f64,
    /// Distance towards the camera; the front item has the largest depth.
    pub depth: f64,
}

impl RingSlot {
    pub fn plate(&self) -> Rect {
        Rect::centered(
            self.center,
            RING_PLATE_WIDTH * self.scale,
            RING_PLATE_HEIGHT * self.scale,
        )
    }
}

pub fn pixels_per_unit(viewport: Size) -> f64 {
    viewport.height / (2.0 * CAMERA_DISTANCE * (CAMERA_FOV / 2.0).tan())
}

pub fn ring_slot(index: usize, count: usize, rotation: f64, viewport: Size) -> RingSlot {
    // the selected angle lands on +z, facing the camera
    let phi = ring_angle(index, count) - rotation + FRAC_PI_2;
    let (x, z) = (RING_RADIUS * phi.cos(), RING_RADIUS * phi.sin());
    let (lift, depth) = (-z * RING_TILT.sin(), z * RING_TILT.cos());

    let scale = pixels_per_unit(viewport) * CAMERA_DISTANCE / (CAMERA_DISTANCE - depth);
    let origin = Point::new(viewport.width / 2.0, viewport.height * RING_VERTICAL_CENTER);

    // mirrored so dragging left pulls the next item in from the right
    RingSlot {
        index,
        center: Point::new(origin.x - x * scale, origin.y - lift * scale),
        scale,
        depth,
    }
}

/// All ring slots, back to front (paint order).
pub fn ring_layout(count: usize, rotation: f64, viewport: Size) -> Vec<RingSlot> {
    let mut slots: Vec<_> = (0..count)
        .map(|i| ring_slot(i, count, rotation, viewport))
        .collect();
    slots.sort_by(|a, b| a.depth.total_cmp(&b.depth).then(b.index.cmp(&a.index)));
    slots
}

/// The slot nearest the camera, lowest index on ties.
pub fn ring_front(slots: &[RingSlot]) -> Option<usize> {
    slots
        .iter()
        .min_by(|a, b| b.depth.total_cmp(&a.depth).then(a.index.cmp(&b.index)))
        .map(|s| s.index)
}

/// Front-most ring item whose label plate contains `p`.
pub fn ring_slot_at(p: Point, slots: &[RingSlot]) -> Option<usize> {
    slots
        .iter()
        .rev()
        .find(|s| s.plate().contains(p))
        .map(|s| s.index)
}

// Classic strip

pub fn visible_count(viewport: Size) -> usize {
    if viewport.is_narrow() { 3 } else { 5 }
}

/// Item indices for each visible slot, centred on `selected`. Slots past
/// either end are `None` and never wrap.
pub fn window_slots(selected: Option<usize>, len: usize, visible: usize) -> Vec<Option<usize>> {
    let Some(selected) = selected else {
        return Vec::new();
    };
    let offset = (visible / 2) as isize;
    (-offset..=offset)
        .map(|d| selected as isize + d)
        .map(|i| usize::try_from(i).ok().filter(|&i| i < len))
        .collect()
}

/// Smallest and largest yard value among the current items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YardRange {
    pub min: u32,
    pub max: u32,
}

impl YardRange {
    pub fn from_items(items: &[SkipOption]) -> Option<Self> {
        let yards = items.iter().map(|s| s.size.yards());
        let min = yards.clone().min()?;
        let max = yards.max()?;
        Some(Self { min, max })
    }

    /// Position of `yards` within the range, 0.0 to 1.0. A range of one
    /// value divides by 1 instead of 0.
    pub fn normalized(&self, yards: u32) -> f64 {
        let span = match self.max.saturating_sub(self.min) {
            0 => 1,
            s => s,
        };
        f64::from(yards.saturating_sub(self.min)) / f64::from(span)
    }
}

pub fn image_scale(normalized: f64, is_center: bool) -> f64 {
    if is_center {
        1.2 + 1.0 * normalized
    } else {
        0.5 + 0.7 * normalized
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardMetrics {
    pub center: f64,
    pub side: f64,
    pub padding: f64,
    pub center_margin: f64,
    pub side_margin: f64,
}

impl CardMetrics {
    pub fn for_viewport(viewport: Size) -> Self {
        if viewport.is_narrow() {
            Self {
                center: 160.0,
                side: 90.0,
                padding: 2.0,
                center_margin: 8.0,
                side_margin: 2.0,
            }
        } else {
            Self {
                center: 220.0,
                side: 140.0,
                padding: 6.0,
                center_margin: 24.0,
                side_margin: 8.0,
            }
        }
    }

    /// Image edge length: the scaled size kept within 85%..100% of the card.
    pub fn image_size(&self, scale: f64, is_center: bool) -> f64 {
        let card = if is_center { self.center } else { self.side };
        let img_max = card - self.padding * 2.0;
        (scale * img_max).min(img_max).max(img_max * 0.85)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Card {
    /// Item shown in this slot; `None` for a placeholder.
    pub index: Option<usize>,
    pub is_center: bool,
    /// Drawn card rectangle (side cards already shrunk and dropped).
    pub rect: Rect,
    pub image_size: f64,
}

pub fn strip_layout(items: &[SkipOption], selected: Option<usize>, viewport: Size) -> Vec<Card> {
    let metrics = CardMetrics::for_viewport(viewport);
    let range = YardRange::from_items(items);
    let slots = window_slots(selected, items.len(), visible_count(viewport));

    let box_of = |index: Option<usize>| {
        if index.is_some() && index == selected {
            (metrics.center, metrics.center_margin)
        } else {
            (metrics.side, metrics.side_margin)
        }
    };

    let total: f64 = slots
        .iter()
        .map(|&i| {
            let (w, m) = box_of(i);
            w + 2.0 * m
        })
        .sum();
    let center_y = viewport.height * STRIP_VERTICAL_CENTER;
    let mut x = viewport.width / 2.0 - total / 2.0;

    slots
        .into_iter()
        .map(|index| {
            let (w, m) = box_of(index);
            let is_center = index.is_some() && index == selected;
            let slot_center = Point::new(x + m + w / 2.0, center_y);
            x += w + 2.0 * m;

            let rect = if is_center {
                Rect::centered(slot_center, w, w)
            } else {
                let shrunk = w * SIDE_CARD_SHRINK;
                Rect::centered(
                    Point::new(slot_center.x, slot_center.y + SIDE_CARD_DROP),
                    shrunk,
                    shrunk,
                )
            };

            let image_size = index
                .and_then(|i| items.get(i))
                .zip(range)
                .map(|(skip, range)| {
                    let scale = image_scale(range.normalized(skip.size.yards()), is_center);
                    let size = metrics.image_size(scale, is_center);
                    if is_center { size } else { size * SIDE_CARD_SHRINK }
                })
                .unwrap_or(0.0);

            Card {
                index,
                is_center,
                rect,
                image_size,
            }
        })
        .collect()
}

pub fn card_at(p: Point, cards: &[Card]) -> Option<usize> {
    cards
        .iter()
        .find(|c| c.index.is_some() && c.rect.contains(p))
        .and_then(|c| c.index)
}

// Dots

pub fn dot_centers(count: usize, viewport: Size) -> Vec<Point> {
    if count == 0 {
        return Vec::new();
    }
    let y = viewport.height - DOT_BOTTOM_MARGIN;
    let x0 = viewport.width / 2.0 - (count - 1) as f64 * DOT_SPACING / 2.0;
    (0..count)
        .map(|i| Point::new(x0 + i as f64 * DOT_SPACING, y))
        .collect()
}

pub fn dot_at(p: Point, count: usize, viewport: Size) -> Option<usize> {
    dot_centers(count, viewport)
        .into_iter()
        .position(|c| c.distance(p) <= DOT_RADIUS + DOT_HIT_SLOP)
}
