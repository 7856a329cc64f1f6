use crate::config::{CarouselConfig, CarouselVariant};
use skiphire::{SkipId, SkipOption};
use std::f64::consts::TAU;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Items sit on a circle; navigation wraps.
    Ring,
    /// Items sit on a strip; navigation clamps at both ends.
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragPolicy {
    /// Commit one step each time the pointer travels more than `threshold`
    /// pixels from the drag origin, then move the origin to the pointer.
    Step { threshold: f64 },
    /// Rotate continuously and select whichever item is angularly nearest.
    ContinuousAngle { radians_per_pixel: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Behavior {
    pub topology: Topology,
    pub drag: DragPolicy,
}

impl Behavior {
    pub fn wheel(threshold: f64) -> Self {
        Self {
            topology: Topology::Ring,
            drag: DragPolicy::Step { threshold },
        }
    }

    pub fn spin(radians_per_pixel: f64) -> Self {
        Self {
            topology: Topology::Ring,
            drag: DragPolicy::ContinuousAngle { radians_per_pixel },
        }
    }

    pub fn classic(threshold: f64) -> Self {
        Self {
            topology: Topology::Linear,
            drag: DragPolicy::Step { threshold },
        }
    }

    pub fn from_config(cfg: &CarouselConfig) -> Self {
        match cfg.variant {
            CarouselVariant::Wheel => Self::wheel(cfg.threshold()),
            CarouselVariant::Spin => Self::spin(cfg.radians_per_pixel()),
            CarouselVariant::Classic => Self::classic(cfg.threshold()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Idle,
    Dragging {
        origin: f64,
        start_rotation: f64,
        /// Pointer x of the latest update.
        last_x: f64,
    },
}

/// What a transition did, so the caller knows whether to repaint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionChange {
    pub redraw: bool,
    pub selection_changed: bool,
}

impl SelectionChange {
    pub fn new(redraw: bool, selection_changed: bool) -> Self {
        Self {
            redraw,
            selection_changed,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

/// Shortest angular distance between two angles, `min(|d|, 2π - |d|)`.
pub fn circular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).abs().rem_euclid(TAU);
    d.min(TAU - d)
}

/// Angle of item `index` on a ring of `count` items.
pub fn ring_angle(index: usize, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    TAU * index as f64 / count as f64
}

/// Index of the ring item nearest to `rotation`; lowest index wins ties.
pub fn nearest_index(rotation: f64, count: usize) -> Option<usize> {
    (0..count).min_by(|&a, &b| {
        circular_distance(rotation, ring_angle(a, count))
            .total_cmp(&circular_distance(rotation, ring_angle(b, count)))
    })
}

type Observer = Box<dyn FnMut(Option<&SkipId>)>;

/// Owns the selected index of a carousel and every way of changing it.
///
/// The selection is always a valid index while items exist and `None`
/// otherwise. Observers hear about every change of the selected id; an
/// engine that never had items never notifies.
pub struct CarouselEngine {
    behavior: Behavior,
    items: Arc<[SkipOption]>,
    selected: Option<usize>,
    rotation: f64,
    phase: Phase,
    reported: Option<SkipId>,
    observers: Vec<Observer>,
}

impl CarouselEngine {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            items: Arc::from(Vec::new()),
            selected: None,
            rotation: 0.0,
            phase: Phase::Idle,
            reported: None,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: impl FnMut(Option<&SkipId>) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn behavior(&self) -> Behavior {
        self.behavior
    }

    pub fn items(&self) -> &Arc<[SkipOption]> {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&SkipOption> {
        self.selected.and_then(|i| self.items.get(i))
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    pub fn drag_origin(&self) -> Option<f64> {
        match self.phase {
            Phase::Dragging { origin, .. } => Some(origin),
            Phase::Idle => None,
        }
    }

    /// Replaces the item list and resets to the middle item.
    pub fn set_items(&mut self, items: Arc<[SkipOption]>) -> SelectionChange {
        self.items = items;
        self.reset()
    }

    /// Switches variant, keeping the items but resetting the selection.
    pub fn set_behavior(&mut self, behavior: Behavior) -> SelectionChange {
        self.behavior = behavior;
        self.reset()
    }

    fn reset(&mut self) -> SelectionChange {
        let len = self.items.len();
        self.phase = Phase::Idle;
        self.selected = (len > 0).then_some(len / 2);
        self.rotation = self.selected.map_or(0.0, |i| ring_angle(i, len));
        let changed = self.notify();
        SelectionChange::new(true, changed)
    }

    /// The item facing the viewer. On a ring this is derived from the
    /// rotation angle, so it agrees with what the ring layout draws in front.
    pub fn front_index(&self) -> Option<usize> {
        match self.behavior.topology {
            Topology::Ring => nearest_index(self.rotation, self.items.len()),
            Topology::Linear => self.selected,
        }
    }

    pub fn begin_drag(&mut self, x: f64) {
        if self.is_dragging() {
            return;
        }
        self.phase = Phase::Dragging {
            origin: x,
            start_rotation: self.rotation,
            last_x: x,
        };
    }

    pub fn update_drag(&mut self, x: f64) -> SelectionChange {
        let Phase::Dragging {
            origin,
            start_rotation,
            ..
        } = self.phase
        else {
            return SelectionChange::none();
        };
        self.phase = Phase::Dragging {
            origin,
            start_rotation,
            last_x: x,
        };
        if self.items.len() <= 1 {
            return SelectionChange::none();
        }

        let delta = x - origin;
        match self.behavior.drag {
            DragPolicy::Step { threshold } => {
                if delta.abs() <= threshold {
                    return SelectionChange::none();
                }
                self.phase = Phase::Dragging {
                    origin: x,
                    start_rotation,
                    last_x: x,
                };
                // dragging right pulls the previous item into the centre
                if delta > 0.0 { self.prev() } else { self.next() }
            }
            DragPolicy::ContinuousAngle { radians_per_pixel } => {
                self.rotation = (start_rotation - delta * radians_per_pixel).rem_euclid(TAU);
                self.selected = nearest_index(self.rotation, self.items.len());
                let changed = self.notify();
                SelectionChange::new(true, changed)
            }
        }
    }

    pub fn end_drag(&mut self) -> SelectionChange {
        if !self.is_dragging() {
            return SelectionChange::none();
        }
        self.phase = Phase::Idle;

        let snapped = self.selected.map_or(0.0, |i| ring_angle(i, self.items.len()));
        let redraw = snapped != self.rotation;
        self.rotation = snapped;
        SelectionChange::new(redraw, false)
    }

    pub fn go_to(&mut self, index: isize) -> SelectionChange {
        let len = self.items.len();
        if len == 0 {
            return SelectionChange::none();
        }
        let target = match self.behavior.topology {
            Topology::Ring => index.rem_euclid(len as isize) as usize,
            Topology::Linear => match usize::try_from(index) {
                Ok(i) if i < len => i,
                _ => return SelectionChange::none(),
            },
        };
        self.commit(target)
    }

    pub fn next(&mut self) -> SelectionChange {
        self.rotate_by_steps(1)
    }

    pub fn prev(&mut self) -> SelectionChange {
        self.rotate_by_steps(-1)
    }

    /// `|steps|` single steps forward (positive) or backward (negative).
    pub fn rotate_by_steps(&mut self, steps: isize) -> SelectionChange {
        let Some(index) = self.selected else {
            return SelectionChange::none();
        };
        self.commit(self.stepped(index, steps))
    }

    /// Rotates by an angle, rounded to whole item steps.
    pub fn rotate_by_radians(&mut self, radians: f64) -> SelectionChange {
        let len = self.items.len();
        if len == 0 || !radians.is_finite() {
            return SelectionChange::none();
        }
        let steps = (radians / (TAU / len as f64)).round() as isize;
        self.rotate_by_steps(steps)
    }

    fn stepped(&self, from: usize, steps: isize) -> usize {
        let len = self.items.len() as isize;
        match self.behavior.topology {
            Topology::Ring => (from as isize + steps.rem_euclid(len)).rem_euclid(len) as usize,
            Topology::Linear => (from as isize).saturating_add(steps).clamp(0, len - 1) as usize,
        }
    }

    fn commit(&mut self, index: usize) -> SelectionChange {
        let rotation = ring_angle(index, self.items.len());
        if self.selected == Some(index) && self.rotation == rotation {
            return SelectionChange::none();
        }
        self.selected = Some(index);
        self.rotation = rotation;
        // a drag in progress continues from the committed item
        if let Phase::Dragging { last_x, .. } = self.phase {
            self.phase = Phase::Dragging {
                origin: last_x,
                start_rotation: rotation,
                last_x,
            };
        }
        let changed = self.notify();
        SelectionChange::new(true, changed)
    }

    fn notify(&mut self) -> bool {
        let current = self.selected_item().map(|s| s.id.clone());
        if current == self.reported {
            return false;
        }
        self.reported = current;
        for observer in &mut self.observers {
            observer(self.reported.as_ref());
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiphire::{ImageUrl, SizeLabel};
    use std::cell::RefCell;
    use std::f64::consts::{FRAC_PI_2, PI};
    use std::rc::Rc;

    fn skips(sizes: &[&str]) -> Arc<[SkipOption]> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, size)| SkipOption {
                id: SkipId::new(format!("skip-{i}")),
                size: SizeLabel::from(*size),
                price: 100.0 + i as f64,
                image_url: ImageUrl::from(""),
                road_legal: i % 2 == 0,
            })
            .collect()
    }

    fn recorded(engine: &mut CarouselEngine) -> Rc<RefCell<Vec<Option<String>>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        engine.subscribe(move |id| sink.borrow_mut().push(id.map(|i| i.to_string())));
        log
    }

    fn all_behaviors() -> [Behavior; 3] {
        [
            Behavior::wheel(10.0),
            Behavior::spin(0.01),
            Behavior::classic(40.0),
        ]
    }

    #[test]
    fn test_init_selects_middle_for_every_size() {
        for behavior in all_behaviors() {
            for n in 1..=9 {
                let labels = vec!["4 Yards"; n];
                let mut engine = CarouselEngine::new(behavior);
                engine.set_items(skips(&labels));
                let selected = engine.selected().unwrap();
                assert!(selected < n);
                assert_eq!(selected, n / 2);
                assert_eq!(engine.front_index(), Some(selected));
            }
        }
    }

    #[test]
    fn test_middle_then_next_notifies_new_id() {
        let mut engine = CarouselEngine::new(Behavior::classic(40.0));
        let log = recorded(&mut engine);

        engine.set_items(skips(&["10yd", "6yd", "8yd", "4yd", "12yd"]));
        assert_eq!(engine.selected(), Some(2));

        let change = engine.next();
        assert!(change.selection_changed);
        assert_eq!(engine.selected(), Some(3));
        assert_eq!(engine.selected_item().unwrap().size.as_str(), "4yd");
        assert_eq!(
            *log.borrow(),
            vec![Some("skip-2".to_string()), Some("skip-3".to_string())]
        );
    }

    #[test]
    fn test_empty_list_never_notifies() {
        for behavior in all_behaviors() {
            let mut engine = CarouselEngine::new(behavior);
            let log = recorded(&mut engine);

            engine.set_items(skips(&[]));
            assert_eq!(engine.selected(), None);
            assert_eq!(engine.next(), SelectionChange::none());
            assert_eq!(engine.prev(), SelectionChange::none());
            assert_eq!(engine.go_to(0), SelectionChange::none());
            assert_eq!(engine.rotate_by_steps(3), SelectionChange::none());
            assert_eq!(engine.rotate_by_radians(PI), SelectionChange::none());
            engine.begin_drag(0.0);
            engine.update_drag(500.0);
            engine.end_drag();

            assert_eq!(engine.selected(), None);
            assert_eq!(engine.front_index(), None);
            assert!(log.borrow().is_empty());
        }
    }

    #[test]
    fn test_single_item_drags_are_noops() {
        for behavior in all_behaviors() {
            let mut engine = CarouselEngine::new(behavior);
            let log = recorded(&mut engine);
            engine.set_items(skips(&["8 Yards"]));

            for target in [50.0, -50.0, 300.0, -1000.0] {
                engine.begin_drag(0.0);
                engine.update_drag(target);
                engine.end_drag();
            }
            engine.next();
            engine.prev();
            engine.rotate_by_steps(-7);

            assert_eq!(engine.selected(), Some(0));
            assert_eq!(log.borrow().len(), 1);
        }
    }

    #[test]
    fn test_prev_next_round_trip() {
        for behavior in all_behaviors() {
            let mut engine = CarouselEngine::new(behavior);
            engine.set_items(skips(&["a", "b", "c", "d", "e", "f"]));

            for start in 1..5 {
                engine.go_to(start as isize);
                engine.prev();
                engine.next();
                assert_eq!(engine.selected(), Some(start));
                engine.next();
                engine.prev();
                assert_eq!(engine.selected(), Some(start));
            }
        }
    }

    #[test]
    fn test_linear_clamps_at_bounds() {
        let mut engine = CarouselEngine::new(Behavior::classic(40.0));
        engine.set_items(skips(&["a", "b", "c"]));

        engine.go_to(2);
        assert_eq!(engine.next(), SelectionChange::none());
        assert_eq!(engine.selected(), Some(2));

        engine.go_to(0);
        assert_eq!(engine.prev(), SelectionChange::none());
        assert_eq!(engine.selected(), Some(0));

        engine.rotate_by_steps(10);
        assert_eq!(engine.selected(), Some(2));
    }

    #[test]
    fn test_linear_rejects_out_of_range_go_to() {
        let mut engine = CarouselEngine::new(Behavior::classic(40.0));
        engine.set_items(skips(&["a", "b", "c", "d"]));

        assert_eq!(engine.go_to(4), SelectionChange::none());
        assert_eq!(engine.go_to(-1), SelectionChange::none());
        assert_eq!(engine.selected(), Some(2));
    }

    #[test]
    fn test_ring_wraps() {
        let mut engine = CarouselEngine::new(Behavior::wheel(10.0));
        engine.set_items(skips(&["a", "b", "c", "d"]));

        engine.go_to(3);
        engine.next();
        assert_eq!(engine.selected(), Some(0));
        engine.prev();
        assert_eq!(engine.selected(), Some(3));

        engine.go_to(9);
        assert_eq!(engine.selected(), Some(1));
        engine.go_to(-1);
        assert_eq!(engine.selected(), Some(3));

        engine.rotate_by_steps(-6);
        assert_eq!(engine.selected(), Some(1));
    }

    #[test]
    fn test_ring_go_to_reports_front() {
        for behavior in [Behavior::wheel(10.0), Behavior::spin(0.01)] {
            let mut engine = CarouselEngine::new(behavior);
            for n in 1..=12usize {
                let labels = vec!["6 Yards"; n];
                engine.set_items(skips(&labels));
                for i in -(n as isize)..(2 * n as isize) {
                    engine.go_to(i);
                    let expected = i.rem_euclid(n as isize) as usize;
                    assert_eq!(engine.front_index(), Some(expected));
                    assert_eq!(engine.selected(), Some(expected));
                }
            }
        }
    }

    #[test]
    fn test_step_drag_commits_once_and_moves_origin() {
        let mut engine = CarouselEngine::new(Behavior::classic(40.0));
        engine.set_items(skips(&["a", "b", "c", "d", "e"]));

        engine.begin_drag(100.0);
        let change = engine.update_drag(141.0);
        assert!(change.selection_changed);
        assert_eq!(engine.selected(), Some(1));
        assert_eq!(engine.drag_origin(), Some(141.0));

        // within threshold of the new origin
        assert_eq!(engine.update_drag(170.0), SelectionChange::none());
        assert_eq!(engine.selected(), Some(1));

        engine.update_drag(182.0);
        assert_eq!(engine.selected(), Some(0));

        engine.end_drag();
        assert_eq!(engine.phase(), Phase::Idle);
        assert_eq!(engine.selected(), Some(0));
    }

    #[test]
    fn test_step_drag_at_exact_threshold_does_nothing() {
        let mut engine = CarouselEngine::new(Behavior::classic(40.0));
        engine.set_items(skips(&["a", "b", "c"]));

        engine.begin_drag(0.0);
        assert_eq!(engine.update_drag(-40.0), SelectionChange::none());
        engine.update_drag(-40.5);
        assert_eq!(engine.selected(), Some(2));
    }

    #[test]
    fn test_wheel_drag_left_goes_forward_and_wraps() {
        let mut engine = CarouselEngine::new(Behavior::wheel(10.0));
        engine.set_items(skips(&["a", "b", "c"]));

        engine.begin_drag(0.0);
        engine.update_drag(-11.0);
        assert_eq!(engine.selected(), Some(2));
        engine.update_drag(-22.0);
        assert_eq!(engine.selected(), Some(0));
    }

    #[test]
    fn test_begin_drag_twice_keeps_origin() {
        let mut engine = CarouselEngine::new(Behavior::wheel(10.0));
        engine.set_items(skips(&["a", "b", "c"]));

        engine.begin_drag(10.0);
        engine.begin_drag(500.0);
        assert_eq!(engine.drag_origin(), Some(10.0));
    }

    #[test]
    fn test_update_without_begin_is_ignored() {
        let mut engine = CarouselEngine::new(Behavior::classic(40.0));
        engine.set_items(skips(&["a", "b", "c"]));

        assert_eq!(engine.update_drag(1000.0), SelectionChange::none());
        assert_eq!(engine.end_drag(), SelectionChange::none());
        assert_eq!(engine.selected(), Some(1));
    }

    #[test]
    fn test_continuous_drag_selects_nearest_angle() {
        let mut engine = CarouselEngine::new(Behavior::spin(0.01));
        engine.set_items(skips(&["a", "b", "c", "d"]));
        assert_eq!(engine.selected(), Some(2));

        // -100px * 0.01 rad/px rotates +1 rad from PI: nearest item is 3 (3π/2)
        engine.begin_drag(0.0);
        engine.update_drag(-100.0);
        assert!((engine.rotation() - (PI + 1.0)).abs() < 1e-9);
        assert_eq!(engine.selected(), Some(3));
        assert_eq!(engine.front_index(), Some(3));

        // same gesture, now dragged right of where it began
        engine.update_drag(100.0);
        assert_eq!(engine.selected(), Some(1));

        engine.end_drag();
        assert_eq!(engine.selected(), Some(1));
        assert_eq!(engine.rotation(), ring_angle(1, 4));
    }

    #[test]
    fn test_spin_from_config_ignores_unusable_rate() {
        let cfg = CarouselConfig {
            variant: CarouselVariant::Spin,
            radians_per_pixel: f64::NAN,
            ..CarouselConfig::default()
        };
        assert_eq!(Behavior::from_config(&cfg), Behavior::spin(0.01));

        let mut engine = CarouselEngine::new(Behavior::from_config(&cfg));
        engine.set_items(skips(&["a", "b", "c", "d", "e"]));
        engine.begin_drag(0.0);
        engine.update_drag(-3.0);
        assert!(engine.rotation().is_finite());
        assert_eq!(engine.selected(), Some(2));
    }

    #[test]
    fn test_navigation_during_continuous_drag_rebases_gesture() {
        let mut engine = CarouselEngine::new(Behavior::spin(0.01));
        engine.set_items(skips(&["a", "b", "c", "d", "e", "f", "g", "h"]));

        engine.begin_drag(0.0);
        engine.update_drag(-100.0);
        assert_eq!(engine.selected(), Some(5));

        engine.next();
        assert_eq!(engine.selected(), Some(6));

        // one more pixel must not replay the earlier 100px on top of item 6
        engine.update_drag(-101.0);
        assert_eq!(engine.selected(), Some(6));
        assert!((engine.rotation() - (ring_angle(6, 8) + 0.01)).abs() < 1e-9);
    }

    #[test]
    fn test_nearest_index_ties_pick_lowest() {
        assert_eq!(nearest_index(FRAC_PI_2, 2), Some(0));
        assert_eq!(nearest_index(0.0, 3), Some(0));
        assert_eq!(nearest_index(TAU - 0.1, 4), Some(0));
        assert_eq!(nearest_index(1.0, 0), None);
    }

    #[test]
    fn test_circular_distance() {
        assert!((circular_distance(0.1, TAU - 0.1) - 0.2).abs() < 1e-9);
        assert!((circular_distance(PI, 0.0) - PI).abs() < 1e-12);
        assert_eq!(circular_distance(1.0, 1.0), 0.0);
        assert!((circular_distance(5.0 * TAU + 0.5, 0.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_by_radians_rounds_to_steps() {
        let mut engine = CarouselEngine::new(Behavior::wheel(10.0));
        engine.set_items(skips(&["a", "b", "c", "d"]));

        engine.rotate_by_radians(FRAC_PI_2 * 1.2);
        assert_eq!(engine.selected(), Some(3));
        engine.rotate_by_radians(-PI);
        assert_eq!(engine.selected(), Some(1));
        engine.rotate_by_radians(0.2);
        assert_eq!(engine.selected(), Some(1));
    }

    #[test]
    fn test_replacing_items_resets_selection() {
        let mut engine = CarouselEngine::new(Behavior::classic(40.0));
        let log = recorded(&mut engine);

        engine.set_items(skips(&["a", "b", "c", "d", "e", "f", "g"]));
        engine.go_to(6);
        engine.begin_drag(3.0);

        engine.set_items(skips(&["a", "b"]));
        assert_eq!(engine.selected(), Some(1));
        assert!(!engine.is_dragging());

        engine.set_items(skips(&[]));
        assert_eq!(engine.selected(), None);
        assert_eq!(log.borrow().last(), Some(&None));
    }

    #[test]
    fn test_same_id_after_reset_is_not_renotified() {
        let mut engine = CarouselEngine::new(Behavior::wheel(10.0));
        let log = recorded(&mut engine);

        engine.set_items(skips(&["a", "b", "c"]));
        let change = engine.set_items(skips(&["a", "b", "c"]));
        assert!(change.redraw);
        assert!(!change.selection_changed);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_switching_behavior_keeps_items() {
        let mut engine = CarouselEngine::new(Behavior::wheel(10.0));
        engine.set_items(skips(&["a", "b", "c", "d", "e"]));
        engine.go_to(4);

        engine.set_behavior(Behavior::classic(40.0));
        assert_eq!(engine.len(), 5);
        assert_eq!(engine.selected(), Some(2));
        assert_eq!(engine.next(), SelectionChange::new(true, true));
    }
}
