use crate::config::{self, Config, Overrides};
use crate::events::{AppEvent, ControlCommand, RuntimeRequest};
use crate::gui::backdrop;
use crate::gui::breadcrumbs::{self, Step};
use crate::gui::carousel::scene::{Backdrop, LoadStatus};
use crate::gui::carousel::{self, Behavior, Point, Scene, SelectionChange};
use crate::gui::summary::Summary;
use crate::gui::theme::{self, ThemeColors};
use crate::sys::fetch::{RequestTracker, Ticket};
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use skiphire::{FetchError, ImageUrl, SkipId, SkipOption};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

pub struct AppModel {
    pub scene: Rc<RefCell<Scene>>,
    pub config: Config,
    pub overrides: Overrides,
    pub requests: async_channel::Sender<RuntimeRequest>,
    pub skips: RequestTracker,
    pub map: RequestTracker,
    pub summary: Summary,
    pub can_prev: bool,
    pub can_next: bool,
    pub drag_start_x: f64,
    pub root: gtk::ApplicationWindow,
    pub drawing_area: gtk::DrawingArea,
}

pub struct AppInit {
    pub config: Config,
    pub overrides: Overrides,
    pub requests: async_channel::Sender<RuntimeRequest>,
    pub events: async_channel::Receiver<AppEvent>,
}

#[derive(Debug)]
pub enum AppMsg {
    DragBegin(f64),
    DragUpdate(f64),
    DragEnd,
    Click(Point),
    Step(isize),
    SelectionChanged(Option<SkipId>),
    Continue,
    Quit,
    Control(ControlCommand),
    SkipsLoaded {
        ticket: Ticket,
        result: Result<Vec<SkipOption>, Arc<FetchError>>,
    },
    ImageLoaded {
        url: ImageUrl,
        bytes: Vec<u8>,
    },
    MapLoaded {
        ticket: Ticket,
        bytes: Vec<u8>,
    },
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::Control(cmd) => AppMsg::Control(cmd),
            AppEvent::ConfigReload => AppMsg::ConfigReload,
            AppEvent::SkipsLoaded { ticket, result } => AppMsg::SkipsLoaded { ticket, result },
            AppEvent::ImageLoaded { url, bytes } => AppMsg::ImageLoaded { url, bytes },
            AppEvent::MapLoaded { ticket, bytes } => AppMsg::MapLoaded { ticket, bytes },
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = AppInit;
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Choose your skip size"),
            set_default_size: (1100, 760),
            add_css_class: "skipwheel-window",

            add_controller = gtk::EventControllerKey {
                // ahead of focus navigation on the buttons
                set_propagation_phase: gtk::PropagationPhase::Capture,
                connect_key_pressed[sender] => move |_, key, _, _| {
                    match key {
                        gtk::gdk::Key::Left => sender.input(AppMsg::Step(-1)),
                        gtk::gdk::Key::Right => sender.input(AppMsg::Step(1)),
                        gtk::gdk::Key::Escape => sender.input(AppMsg::Quit),
                        _ => return glib::Propagation::Proceed,
                    }
                    glib::Propagation::Stop
                }
            },

            gtk::Box {
                set_orientation: gtk::Orientation::Vertical,

                #[local_ref]
                progress -> gtk::Box {},

                #[name = "overlay"]
                gtk::Overlay {
                    set_vexpand: true,

                    #[name = "drawing_area"]
                    gtk::DrawingArea {
                        set_hexpand: true,
                        set_vexpand: true,
                        add_css_class: "skipwheel-drawing-area",

                        add_controller = gtk::GestureDrag {
                            connect_drag_begin[sender] => move |_, x, _| {
                                sender.input(AppMsg::DragBegin(x));
                            },
                            connect_drag_update[sender] => move |_, dx, _| {
                                sender.input(AppMsg::DragUpdate(dx));
                            },
                            connect_drag_end[sender] => move |_, _, _| {
                                sender.input(AppMsg::DragEnd);
                            },
                        },

                        add_controller = gtk::GestureClick {
                            connect_released[sender] => move |_, _, x, y| {
                                sender.input(AppMsg::Click(Point::new(x, y)));
                            }
                        }
                    },

                    add_overlay = &gtk::Button {
                        set_icon_name: "go-previous-symbolic",
                        set_tooltip_text: Some("Previous skip"),
                        add_css_class: "skipwheel-arrow",
                        set_halign: gtk::Align::Start,
                        set_valign: gtk::Align::Center,
                        set_margin_start: 16,
                        #[watch]
                        set_visible: model.can_prev,
                        connect_clicked => AppMsg::Step(-1),
                    },

                    add_overlay = &gtk::Button {
                        set_icon_name: "go-next-symbolic",
                        set_tooltip_text: Some("Next skip"),
                        add_css_class: "skipwheel-arrow",
                        set_halign: gtk::Align::End,
                        set_valign: gtk::Align::Center,
                        set_margin_end: 16,
                        #[watch]
                        set_visible: model.can_next,
                        connect_clicked => AppMsg::Step(1),
                    },
                },

                gtk::Box {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_spacing: 24,
                    add_css_class: "skipwheel-summary",

                    gtk::Box {
                        set_orientation: gtk::Orientation::Vertical,
                        set_hexpand: true,

                        gtk::Label {
                            set_halign: gtk::Align::Start,
                            add_css_class: "title",
                            #[watch]
                            set_label: &model.summary.title,
                        },
                        gtk::Label {
                            set_halign: gtk::Align::Start,
                            #[watch]
                            set_label: &model.summary.road,
                        },
                    },

                    gtk::Label {
                        add_css_class: "price",
                        #[watch]
                        set_label: &model.summary.price,
                    },

                    gtk::Button {
                        set_label: "Continue",
                        add_css_class: "suggested-action",
                        #[watch]
                        set_sensitive: model.summary.can_continue,
                        connect_clicked => AppMsg::Continue,
                    },
                },
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let AppInit {
            config,
            overrides,
            requests,
            events,
        } = init;

        theme::load_css();

        let location = config.location.location();
        let mut scene = Scene::new(Behavior::from_config(&config.carousel), location.to_string());
        {
            let sender = sender.clone();
            scene
                .engine
                .subscribe(move |id| sender.input(AppMsg::SelectionChanged(id.cloned())));
        }

        let model = AppModel {
            scene: Rc::new(RefCell::new(scene)),
            config,
            overrides,
            requests,
            skips: RequestTracker::new(),
            map: RequestTracker::new(),
            summary: Summary::of(None),
            can_prev: false,
            can_next: false,
            drag_start_x: 0.0,
            root: root.clone(),
            drawing_area: gtk::DrawingArea::default(),
        };

        let progress = breadcrumbs::build(Step::SelectSkip);
        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        let scene_draw = model.scene.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, width, height| {
                let style_context = drawing_area.style_context();
                let colors = ThemeColors::from_context(&style_context);
                scene_draw.borrow_mut().viewport =
                    carousel::Size::new(f64::from(width), f64::from(height));
                if let Err(e) = carousel::draw(cr, &scene_draw.borrow(), &colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = events.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        model.request_skips();

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            AppMsg::DragBegin(x) => {
                self.drag_start_x = x;
                self.scene.borrow_mut().engine.begin_drag(x);
            }
            AppMsg::DragUpdate(dx) => {
                let change = self
                    .scene
                    .borrow_mut()
                    .engine
                    .update_drag(self.drag_start_x + dx);
                self.apply(change);
            }
            AppMsg::DragEnd => {
                let change = self.scene.borrow_mut().engine.end_drag();
                self.apply(change);
            }
            AppMsg::Click(point) => {
                let hit = self.scene.borrow().hit_test(point);
                if let Some(index) = hit {
                    let change = self.scene.borrow_mut().engine.go_to(index as isize);
                    self.apply(change);
                }
            }
            AppMsg::Step(steps) => {
                let change = self.scene.borrow_mut().engine.rotate_by_steps(steps);
                self.apply(change);
            }
            AppMsg::SelectionChanged(id) => {
                log::debug!("Selection changed to {:?}", id);
                self.summary = Summary::of(self.scene.borrow().engine.selected_item());
            }
            AppMsg::Continue => {
                let scene = self.scene.borrow();
                let Some(skip) = scene.engine.selected_item() else {
                    return;
                };
                match serde_json::to_string(skip) {
                    Ok(line) => println!("{line}"),
                    Err(e) => {
                        log::error!("Failed to encode selection: {}", e);
                        return;
                    }
                }
                log::info!("Continuing with skip {}", skip.id);
                self.root.close();
            }
            AppMsg::Quit => self.root.close(),
            AppMsg::Control(ControlCommand::Reload) => self.request_skips(),
            AppMsg::Control(cmd) => {
                log::debug!("Control command: {}", cmd.as_line());
                let change = {
                    let mut scene = self.scene.borrow_mut();
                    match cmd {
                        ControlCommand::Next => scene.engine.next(),
                        ControlCommand::Prev => scene.engine.prev(),
                        ControlCommand::Rotate(steps) => scene.engine.rotate_by_steps(steps),
                        ControlCommand::GoTo(index) => scene.engine.go_to(index),
                        ControlCommand::Reload => SelectionChange::none(),
                    }
                };
                self.apply(change);
            }
            AppMsg::SkipsLoaded { ticket, result } => {
                if !self.skips.complete(ticket) {
                    log::warn!("Discarding superseded skip list {}", ticket);
                    return;
                }
                let change = self.scene.borrow_mut().apply_result(result);
                let missing = self.scene.borrow().missing_images();
                if !missing.is_empty() {
                    self.send(RuntimeRequest::FetchImages(missing));
                }
                self.apply(change);
                self.drawing_area.queue_draw();
            }
            AppMsg::ImageLoaded { url, bytes } => {
                match backdrop::decode_pixbuf(&bytes) {
                    Ok(pixbuf) => {
                        self.scene.borrow_mut().images.insert(url, pixbuf);
                        self.drawing_area.queue_draw();
                    }
                    Err(e) => log::warn!("Could not decode image {}: {}", url, e),
                }
            }
            AppMsg::MapLoaded { ticket, bytes } => {
                if !self.map.complete(ticket) {
                    log::warn!("Discarding superseded static map {}", ticket);
                    return;
                }
                self.scene.borrow_mut().backdrop = match backdrop::decode_pixbuf(&bytes) {
                    Ok(pixbuf) => Backdrop::Map(pixbuf),
                    Err(e) => {
                        log::warn!("Could not decode static map: {}", e);
                        Backdrop::Unavailable
                    }
                };
                self.drawing_area.queue_draw();
            }
            AppMsg::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    self.reconfigure(self.overrides.apply(new_config));
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }
}

impl AppModel {
    fn apply(&mut self, change: SelectionChange) {
        let scene = self.scene.borrow();
        self.can_prev = scene.can_step(false);
        self.can_next = scene.can_step(true);
        if change.redraw || change.selection_changed {
            self.drawing_area.queue_draw();
        }
    }

    fn send(&mut self, request: RuntimeRequest) {
        if let Err(e) = self.requests.try_send(request) {
            log::error!("Background services unavailable: {}", e);
            self.scene.borrow_mut().status =
                LoadStatus::Failed("Background services are not running".to_string());
            self.drawing_area.queue_draw();
        }
    }

    /// Starts a fresh skip listing for the configured location; any reply
    /// still in flight becomes stale.
    fn request_skips(&mut self) {
        let location = self.config.location.location();
        let ticket = self.skips.issue();
        log::info!("Loading skips for {} ({})", location, ticket);

        let change = self.scene.borrow_mut().begin_loading(location.to_string());
        self.send(RuntimeRequest::FetchSkips { ticket, location });
        self.apply(change);
        self.request_map();
    }

    fn request_map(&mut self) {
        let url = backdrop::static_map_url(
            self.config.maps_api_key.as_deref(),
            &self.config.location.postcode,
        );
        match url {
            Some(url) => {
                let ticket = self.map.issue();
                self.scene.borrow_mut().backdrop = Backdrop::Pending;
                self.send(RuntimeRequest::FetchMap {
                    ticket,
                    url: url.to_string(),
                });
            }
            None => {
                // stale map replies are dropped from here on
                self.map.issue();
                self.scene.borrow_mut().backdrop = Backdrop::MissingKey;
            }
        }
        self.drawing_area.queue_draw();
    }

    fn reconfigure(&mut self, new_config: Config) {
        let old = std::mem::replace(&mut self.config, new_config);

        if old.api != self.config.api {
            self.send(RuntimeRequest::Reconfigure(self.config.api.clone()));
        }
        if old.carousel != self.config.carousel {
            let behavior = Behavior::from_config(&self.config.carousel);
            let change = self.scene.borrow_mut().engine.set_behavior(behavior);
            self.apply(change);
        }
        if old.location != self.config.location || old.api != self.config.api {
            self.request_skips();
        } else if old.maps_api_key != self.config.maps_api_key {
            self.request_map();
        }
    }
}
