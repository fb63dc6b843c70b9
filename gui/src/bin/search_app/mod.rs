pub(crate) mod app;

pub(crate) use app::SearchApp;
