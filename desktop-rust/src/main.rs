mod app;
mod chart_view;
mod history_view;
mod io;
mod model;

use anyhow::Context;
use calorie_ai_rust::config::Config;
use calorie_ai_rust::describer::OpenAiDescriber;
use calorie_ai_rust::logging;
use calorie_ai_rust::store::RecordStore;
use calorie_ai_rust::workflow::UploadWorkflow;

use app::{configure_fonts, CalorieApp};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("configuration")?;
    logging::init(&config);

    let store = RecordStore::open(&config.db_path)
        .with_context(|| format!("open database {}", config.db_path.display()))?;
    let workflow = UploadWorkflow::new(store, OpenAiDescriber::new(&config));

    tracing::info!(db = %workflow.store().path().display(), model = %config.model, "starting desktop app");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Calorie AI")
            .with_inner_size([1180.0, 760.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Calorie AI",
        options,
        Box::new(move |cc| {
            configure_fonts(&cc.egui_ctx);
            Box::new(CalorieApp::new(config, workflow))
        }),
    )
    .map_err(|err| anyhow::anyhow!("window error: {err}"))
}
