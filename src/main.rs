mod app;
mod config;
mod engine;
mod logging;
mod model;
mod services;
mod theme;
mod ui;
mod validation;
mod widgets;

use anyhow::Result;

fn main() -> Result<()> {
    ui::run()
}
