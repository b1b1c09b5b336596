#[macro_use]
extern crate rocket;

pub mod api;
pub mod config;
pub mod error;
pub mod highlight;
pub mod markdown;
pub mod search;
pub mod state;
pub mod tree;
pub mod workspace;

use log::info;
use rocket::fairing::AdHoc;

use crate::{config::Config, state::ServerState};

pub fn build_rocket(config: &Config) -> rocket::Rocket<rocket::Build> {
    let figment = rocket::Config::figment()
        .merge(("address", config.address))
        .merge(("port", config.port));

    rocket::custom(figment)
        .manage(ServerState::new(&config.root))
        .attach(AdHoc::on_liftoff("Workspace Root", |rocket| {
            Box::pin(async move {
                if let Some(state) = rocket.state::<ServerState>() {
                    info!(
                        "Serving markdown files from: {}",
                        state.workspace.root().display()
                    );
                }
            })
        }))
        .mount("/api", routes![api::tree, api::file, api::search])
        .register("/api", catchers![api::not_found, api::internal_error])
}
