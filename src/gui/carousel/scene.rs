use super::engine::{Behavior, CarouselEngine, SelectionChange, Topology};
use super::layout::{self, Point, Size};
use gdk_pixbuf::Pixbuf;
use skiphire::{FetchError, ImageUrl, SkipOption};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Failed(String),
    Loaded,
}

/// What the page shows in place of (or as) the carousel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    Loading,
    Failed(String),
    Empty,
    Ready,
}

#[derive(Clone)]
pub enum Backdrop {
    /// No maps key configured.
    MissingKey,
    Pending,
    Map(Pixbuf),
    Unavailable,
}

/// Everything the drawing area renders: the selection engine plus the
/// fetched assets and load status around it.
pub struct Scene {
    pub engine: CarouselEngine,
    pub status: LoadStatus,
    pub location_label: String,
    pub images: HashMap<ImageUrl, Pixbuf>,
    pub backdrop: Backdrop,
    pub viewport: Size,
}

impl Scene {
    pub fn new(behavior: Behavior, location_label: String) -> Self {
        Self {
            engine: CarouselEngine::new(behavior),
            status: LoadStatus::Loading,
            location_label,
            images: HashMap::new(),
            backdrop: Backdrop::MissingKey,
            viewport: Size::default(),
        }
    }

    pub fn page_state(&self) -> PageState {
        match &self.status {
            LoadStatus::Loading => PageState::Loading,
            LoadStatus::Failed(msg) => PageState::Failed(msg.clone()),
            LoadStatus::Loaded if self.engine.is_empty() => PageState::Empty,
            LoadStatus::Loaded => PageState::Ready,
        }
    }

    /// Drops the current list while a new one is on its way.
    pub fn begin_loading(&mut self, location_label: String) -> SelectionChange {
        self.status = LoadStatus::Loading;
        self.location_label = location_label;
        self.engine.set_items(Arc::from(Vec::new()))
    }

    pub fn apply_result(
        &mut self,
        result: Result<Vec<SkipOption>, Arc<FetchError>>,
    ) -> SelectionChange {
        let change = match result {
            Ok(items) => {
                self.status = LoadStatus::Loaded;
                self.engine.set_items(Arc::from(items))
            }
            Err(e) => {
                self.status = LoadStatus::Failed(e.to_string());
                self.engine.set_items(Arc::from(Vec::new()))
            }
        };
        self.prune_images();
        change
    }

    /// Forgets images no current item refers to.
    fn prune_images(&mut self) {
        let items = self.engine.items();
        self.images
            .retain(|url, _| items.iter().any(|skip| &skip.image_url == url));
    }

    /// Image URLs of the current items that still need downloading.
    pub fn missing_images(&self) -> Vec<ImageUrl> {
        let mut urls: Vec<ImageUrl> = Vec::new();
        for skip in self.engine.items().iter() {
            if skip.has_image()
                && !self.images.contains_key(&skip.image_url)
                && !urls.contains(&skip.image_url)
            {
                urls.push(skip.image_url.clone());
            }
        }
        urls
    }

    pub fn image_for(&self, skip: &SkipOption) -> Option<&Pixbuf> {
        self.images.get(&skip.image_url)
    }

    /// Item under the pointer: a dot, a strip card, or a ring label.
    pub fn hit_test(&self, p: Point) -> Option<usize> {
        if self.page_state() != PageState::Ready {
            return None;
        }
        let count = self.engine.len();
        if let Some(i) = layout::dot_at(p, count, self.viewport) {
            return Some(i);
        }
        match self.engine.behavior().topology {
            Topology::Linear => {
                let cards = layout::strip_layout(
                    self.engine.items(),
                    self.engine.selected(),
                    self.viewport,
                );
                layout::card_at(p, &cards)
            }
            Topology::Ring => {
                let slots = layout::ring_layout(count, self.engine.rotation(), self.viewport);
                layout::ring_slot_at(p, &slots)
            }
        }
    }

    /// Whether an arrow in the given direction would move the selection.
    pub fn can_step(&self, forward: bool) -> bool {
        let (Some(selected), len) = (self.engine.selected(), self.engine.len()) else {
            return false;
        };
        match self.engine.behavior().topology {
            Topology::Ring => len > 1,
            Topology::Linear if forward => selected + 1 < len,
            Topology::Linear => selected > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiphire::{SizeLabel, SkipId};

    fn skip(id: &str, image: &str) -> SkipOption {
        SkipOption {
            id: SkipId::from(id),
            size: SizeLabel::from("6 Yards"),
            price: 300.0,
            image_url: ImageUrl::from(image),
            road_legal: true,
        }
    }

    fn scene(behavior: Behavior) -> Scene {
        let mut scene = Scene::new(behavior, "LE10 1SH, Hinckley".to_string());
        scene.viewport = Size::new(1280.0, 720.0);
        scene
    }

    #[test]
    fn test_page_states() {
        let mut scene = scene(Behavior::wheel(10.0));
        assert_eq!(scene.page_state(), PageState::Loading);

        scene.apply_result(Ok(vec![]));
        assert_eq!(scene.page_state(), PageState::Empty);

        scene.apply_result(Ok(vec![skip("a", "")]));
        assert_eq!(scene.page_state(), PageState::Ready);
        assert_eq!(scene.engine.selected(), Some(0));

        let err = serde_json::from_str::<u8>("x").unwrap_err();
        scene.apply_result(Err(Arc::new(FetchError::Parse(err))));
        assert!(matches!(scene.page_state(), PageState::Failed(_)));
        assert_eq!(scene.engine.selected(), None);

        scene.begin_loading("NG1 1AA, Nottingham".to_string());
        assert_eq!(scene.page_state(), PageState::Loading);
        assert_eq!(scene.location_label, "NG1 1AA, Nottingham");
    }

    #[test]
    fn test_missing_images_skip_blank_urls() {
        let mut scene = scene(Behavior::classic(40.0));
        scene.apply_result(Ok(vec![
            skip("a", "https://img/a.jpg"),
            skip("b", ""),
            skip("c", "https://img/c.jpg"),
        ]));

        assert_eq!(
            scene.missing_images(),
            vec![
                ImageUrl::from("https://img/a.jpg"),
                ImageUrl::from("https://img/c.jpg")
            ]
        );
    }

    #[test]
    fn test_new_list_drops_unused_images() {
        let mut scene = scene(Behavior::wheel(10.0));
        scene.apply_result(Ok(vec![
            skip("a", "https://img/a.jpg"),
            skip("b", "https://img/b.jpg"),
        ]));
        for url in ["https://img/a.jpg", "https://img/b.jpg"] {
            let pixbuf = Pixbuf::new(gdk_pixbuf::Colorspace::Rgb, false, 8, 1, 1).unwrap();
            scene.images.insert(ImageUrl::from(url), pixbuf);
        }

        scene.apply_result(Ok(vec![skip("b", "https://img/b.jpg"), skip("c", "")]));
        assert_eq!(scene.images.len(), 1);
        assert!(scene.images.contains_key(&ImageUrl::from("https://img/b.jpg")));
        assert!(scene.missing_images().is_empty());

        let err = serde_json::from_str::<u8>("x").unwrap_err();
        scene.apply_result(Err(Arc::new(FetchError::Parse(err))));
        assert!(scene.images.is_empty());
    }

    #[test]
    fn test_hit_test_dots_and_cards() {
        let mut scene = scene(Behavior::classic(40.0));
        assert_eq!(scene.hit_test(Point::new(640.0, 300.0)), None);

        scene.apply_result(Ok(vec![skip("a", ""), skip("b", ""), skip("c", "")]));
        let dots = layout::dot_centers(3, scene.viewport);
        assert_eq!(scene.hit_test(dots[2]), Some(2));

        let cards = layout::strip_layout(scene.engine.items(), Some(1), scene.viewport);
        let left = cards.iter().find(|c| c.index == Some(0)).unwrap();
        assert_eq!(scene.hit_test(left.rect.center()), Some(0));
    }

    #[test]
    fn test_can_step_respects_topology() {
        let mut classic = scene(Behavior::classic(40.0));
        classic.apply_result(Ok(vec![skip("a", ""), skip("b", "")]));
        assert_eq!(classic.engine.selected(), Some(1));
        assert!(!classic.can_step(true));
        assert!(classic.can_step(false));

        let mut wheel = scene(Behavior::wheel(10.0));
        wheel.apply_result(Ok(vec![skip("a", ""), skip("b", "")]));
        assert!(wheel.can_step(true));
        assert!(wheel.can_step(false));

        wheel.apply_result(Ok(vec![skip("a", "")]));
        assert!(!wheel.can_step(true));
    }
}
