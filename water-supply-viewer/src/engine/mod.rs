pub mod assets;
pub mod camera;
pub mod core;
pub mod flow;
pub mod infrastructure;
pub mod loading;
pub mod profile;
pub mod scene;
pub mod systems;
pub mod tour;
pub mod ui;
