use std::f64::consts::PI;

pub mod engine;
pub mod layout;
pub mod scene;
pub mod view;

pub use engine::{Behavior, CarouselEngine, SelectionChange, Topology};
pub use layout::{Point, Size};
pub use scene::{PageState, Scene};
pub use view::draw;

// Ring (world units, projected with a pinhole camera)
pub const RING_RADIUS: f64 = 6.0;
pub const RING_TILT: f64 = PI / 10.0;
pub const CAMERA_DISTANCE: f64 = 16.0;
pub const CAMERA_FOV: f64 = 50.0 * PI / 180.0;
pub const RING_FONT_SIZE: f64 = 0.9; // world units at depth 0
pub const RING_PLATE_WIDTH: f64 = 4.3;
pub const RING_PLATE_HEIGHT: f64 = 1.2;
pub const RING_VERTICAL_CENTER: f64 = 0.42; // fraction of viewport height

// Classic strip (pixels)
pub const NARROW_BREAKPOINT: f64 = 640.0;
pub const SIDE_CARD_SHRINK: f64 = 0.8;
pub const SIDE_CARD_DROP: f64 = 20.0;
pub const SIDE_CARD_ALPHA: f64 = 0.5;
pub const STRIP_VERTICAL_CENTER: f64 = 0.45;

// Dot indicator
pub const DOT_RADIUS: f64 = 6.0;
pub const DOT_SPACING: f64 = 20.0;
pub const DOT_BOTTOM_MARGIN: f64 = 28.0;
pub const DOT_HIT_SLOP: f64 = 4.0;

// Backdrop
pub const BACKDROP_DIM_ALPHA: f64 = 0.5;
