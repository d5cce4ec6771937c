use crate::libs::daemon::{self, RunMode};
use anyhow::Result;

pub async fn cmd() -> Result<()> {
    daemon::run_with_signal_handling(RunMode::Foreground).await
}
