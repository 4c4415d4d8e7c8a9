use crate::*;

use revdash::controller::Controller;
use revdash::export::{DirectorySaver, ExportCoordinator, PrintNotifier, EXPORT_FILENAME};

pub async fn handle(dir: Option<PathBuf>) -> anyhow::Result<()> {
    let cfg = load_config()?;
    let gw = gateway(&cfg)?;
    let dir = dir.unwrap_or_else(|| cfg.resolved_export_dir());

    let coordinator = ExportCoordinator::new(DirectorySaver::new(&dir), PrintNotifier);
    let mut controller = Controller::new(cfg.default_restaurant(), cfg.date_pattern()?);
    controller.export_current(&gw, &coordinator).await?;

    println!("  Saved to {}", dir.join(EXPORT_FILENAME).display());
    Ok(())
}
