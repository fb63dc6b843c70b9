mod search_app;

use anyhow::anyhow;
use eframe::egui;
use numsearch_core::constants::ENV_LOG;
use numsearch_core::SearchConfig;
use std::env;

use search_app::SearchApp;

fn main() -> anyhow::Result<()> {
    numsearch_core::initialize_logger(
        numsearch_core::parse_log_level(env::var(ENV_LOG).ok().as_deref()),
        None,
    )?;

    let mut config = SearchConfig::from_env()?;
    for ignored in config.apply_args(env::args().skip(1))? {
        log::warn!("Ignoring unknown argument {ignored:?}");
    }
    log::info!(
        "Number file: {} ({} values in [{}, {}], {} trials per search)",
        config.file_path.display(),
        config.count,
        config.min,
        config.max,
        config.trials
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 260.0])
            .with_title("Number Search"),
        ..Default::default()
    };

    eframe::run_native(
        "Number Search",
        options,
        Box::new(|_cc| Ok(Box::new(SearchApp::new(config)))),
    )
    .map_err(|e| anyhow!("window failed: {e}"))
}
