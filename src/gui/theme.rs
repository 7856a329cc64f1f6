use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;

pub struct ThemeColors {
    pub accent: Srgba<f64>,
    pub card: Srgba<f64>,
    pub text: Srgba<f64>,
    pub text_dim: Srgba<f64>,
    pub dot: Srgba<f64>,
    pub backdrop: Srgba<f64>,
    pub error: Srgba<f64>,
}

impl ThemeColors {
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        Self {
            accent: Self::lookup_color(
                context,
                "accent_bg_color",
                Srgba::new(0.231, 0.510, 0.965, 1.0),
                None,
            ),
            card: Srgba::new(1.0, 1.0, 1.0, 0.85),
            text: Srgba::new(1.0, 1.0, 1.0, 1.0),
            text_dim: Srgba::new(0.8, 0.8, 0.8, 1.0),
            dot: Srgba::new(0.612, 0.639, 0.686, 1.0),
            backdrop: Self::lookup_color(
                context,
                "window_bg_color",
                Srgba::new(0.2, 0.22, 0.25, 1.0),
                Some(1.0),
            ),
            error: Self::lookup_color(
                context,
                "error_color",
                Srgba::new(0.937, 0.267, 0.267, 1.0),
                None,
            ),
        }
    }

    fn lookup_color(
        context: &gtk::StyleContext,
        name: &str,
        fallback: Srgba<f64>,
        alpha_override: Option<f64>,
    ) -> Srgba<f64> {
        context
            .lookup_color(name)
            .map(|c| {
                let (r, g, b, a) = (
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    c.alpha() as f64,
                );
                Srgba::new(r, g, b, alpha_override.unwrap_or(a))
            })
            .unwrap_or(fallback)
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.skipwheel-breadcrumbs {
    background-color: black;
    padding: 8px;
}
.skipwheel-step {
    color: #9ca3af;
}
.skipwheel-step.done, .skipwheel-step.current {
    color: white;
}
.skipwheel-step.current {
    font-weight: bold;
}
.skipwheel-step-marker {
    color: #6b7280;
}
.skipwheel-step.done .skipwheel-step-marker, .skipwheel-step.current .skipwheel-step-marker {
    color: #2563eb;
}
.skipwheel-summary {
    background-color: rgba(0, 0, 0, 0.75);
    color: white;
    padding: 12px 20px;
}
.skipwheel-summary .price {
    font-size: 1.4em;
    font-weight: bold;
}
.skipwheel-arrow {
    border-radius: 9999px;
    min-width: 40px;
    min-height: 40px;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
