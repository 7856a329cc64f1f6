pub mod app;
pub mod backdrop;
pub mod breadcrumbs;
pub mod carousel;
pub mod summary;
pub mod theme;
