use super::ui;
use crate::core::config::AppConfig;
use crate::core::{ConversionRequest, CurrencyRateProvider, HistoryEntry, Session};
use anyhow::Result;

/// Renders a conversion as the result line followed by the unit rate.
pub fn render_conversion(entry: &HistoryEntry) -> String {
    let result = format!("{:.2} {}", entry.result.converted_amount, entry.to);
    format!(
        "{}\n1 {} = {:.4} {}",
        ui::style_text(&result, ui::StyleType::Result),
        entry.from,
        entry.result.display_rate,
        entry.to
    )
}

pub async fn run(
    config: &AppConfig,
    provider: &dyn CurrencyRateProvider,
    amount: &str,
    from: &str,
    to: &str,
) -> Result<()> {
    // Reject bad input before going to the network.
    ConversionRequest::parse(amount, from, to)?;

    let mut session = Session::new(
        config.defaults.from,
        config.defaults.to,
        config.history_capacity,
    );
    super::load_rates(&mut session, provider).await?;

    let entry = session.convert_between(amount, from, to)?;
    println!("{}", render_conversion(&entry));
    Ok(())
}
