mod app;
mod chat;
mod message;
mod render;
mod ui;

pub use app::run;
pub use render::blocks_to_text;
