use crate::*;

pub async fn handle(restaurant: Option<i64>) -> anyhow::Result<()> {
    let log_path = revdash::logging::init_file()?;
    let cfg = load_config()?;
    tracing::info!(api = %cfg.api_base_url, log = %log_path.display(), "starting dashboard");
    let gw = gateway(&cfg)?;
    revdash::tui::run_tui(cfg, gw, restaurant).await
}
