use crate::libs::daemon;
use anyhow::Result;

pub fn cmd() -> Result<()> {
    daemon::stop()
}
