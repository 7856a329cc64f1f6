use skiphire::SkipOption;

/// Text shown in the selection panel under the carousel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub title: String,
    pub price: String,
    pub road: String,
    pub can_continue: bool,
}

impl Summary {
    pub fn of(selected: Option<&SkipOption>) -> Self {
        match selected {
            Some(skip) => Self {
                title: if skip.size.is_empty() {
                    format!("Skip {}", skip.id)
                } else {
                    skip.size.to_string()
                },
                price: format_price(skip.price),
                road: if skip.road_legal {
                    "Can be placed on the road".to_string()
                } else {
                    "Private land only".to_string()
                },
                can_continue: true,
            },
            None => Self {
                title: "No skip selected".to_string(),
                price: String::new(),
                road: String::new(),
                can_continue: false,
            },
        }
    }
}

pub fn format_price(price: f64) -> String {
    format!("£{price:.2}")
}
