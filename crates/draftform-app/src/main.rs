//! Main application entry point.

fn main() {
    env_logger::init();

    let config = draftform_app::AppConfig::from_args(std::env::args().skip(1));
    let mut app = match draftform_app::App::new(config) {
        Ok(app) => app,
        Err(e) => {
            log::error!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    let summary = app.run_demo();
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize summary: {}", e),
    }
}
