pub mod convert;
pub mod rates;
pub mod session;
pub mod setup;
pub mod ui;

use crate::core::{CurrencyRateProvider, Session};
use anyhow::{Context, Result};

/// Fetches rates into `session` behind a spinner.
pub(crate) async fn load_rates(
    session: &mut Session,
    provider: &dyn CurrencyRateProvider,
) -> Result<()> {
    let pb = ui::new_spinner("Loading exchange rates...");
    let result = session.refresh_rates(provider).await;
    pb.finish_and_clear();
    result.context("Unable to fetch exchange rates. Please try again later.")
}
