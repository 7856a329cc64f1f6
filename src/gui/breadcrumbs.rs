use gtk::prelude::*;
use gtk4 as gtk;
use strum::{Display as StrumDisplay, EnumIter, IntoEnumIterator};

/// Steps of the hire flow, in order. This window is the `SelectSkip` step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, EnumIter, StrumDisplay)]
pub enum Step {
    #[strum(serialize = "Postcode")]
    Postcode,
    #[strum(serialize = "Waste Type")]
    WasteType,
    #[strum(serialize = "Select Skip")]
    SelectSkip,
    #[strum(serialize = "Permit Check")]
    PermitCheck,
    #[strum(serialize = "Choose Date")]
    ChooseDate,
    #[strum(serialize = "Payment")]
    Payment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Done,
    Current,
    Upcoming,
}

impl StepStatus {
    pub fn of(step: Step, current: Step) -> Self {
        match step.cmp(&current) {
            std::cmp::Ordering::Less => Self::Done,
            std::cmp::Ordering::Equal => Self::Current,
            std::cmp::Ordering::Greater => Self::Upcoming,
        }
    }

    fn css_class(&self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Current => "current",
            Self::Upcoming => "upcoming",
        }
    }

    fn marker(&self) -> &'static str {
        match self {
            Self::Done => "✓",
            Self::Current => "●",
            Self::Upcoming => "○",
        }
    }
}

/// Builds the progress bar shown across the top of the window.
pub fn build(current: Step) -> gtk::Box {
    let bar = gtk::Box::new(gtk::Orientation::Horizontal, 12);
    bar.set_halign(gtk::Align::Fill);
    bar.add_css_class("skipwheel-breadcrumbs");

    let row = gtk::Box::new(gtk::Orientation::Horizontal, 12);
    row.set_halign(gtk::Align::Center);
    row.set_hexpand(true);

    for (i, step) in Step::iter().enumerate() {
        if i > 0 {
            row.append(&gtk::Separator::new(gtk::Orientation::Horizontal));
        }
        let status = StepStatus::of(step, current);

        let item = gtk::Box::new(gtk::Orientation::Horizontal, 4);
        item.add_css_class("skipwheel-step");
        item.add_css_class(status.css_class());

        let marker = gtk::Label::new(Some(status.marker()));
        marker.add_css_class("skipwheel-step-marker");
        item.append(&marker);
        item.append(&gtk::Label::new(Some(&step.to_string())));
        row.append(&item);
    }

    let scroller = gtk::ScrolledWindow::new();
    scroller.set_policy(gtk::PolicyType::Automatic, gtk::PolicyType::Never);
    scroller.set_hexpand(true);
    scroller.set_child(Some(&row));
    bar.append(&scroller);
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_status_relative_to_current() {
        let statuses: Vec<_> = Step::iter()
            .map(|s| StepStatus::of(s, Step::SelectSkip))
            .collect();

        assert_eq!(
            statuses,
            vec![
                StepStatus::Done,
                StepStatus::Done,
                StepStatus::Current,
                StepStatus::Upcoming,
                StepStatus::Upcoming,
                StepStatus::Upcoming,
            ]
        );
    }

    #[test]
    fn test_step_labels() {
        let labels: Vec<_> = Step::iter().map(|s| s.to_string()).collect();
        assert_eq!(labels[1], "Waste Type");
        assert_eq!(labels.len(), 6);
    }
}
