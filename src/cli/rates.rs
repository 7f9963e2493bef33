use super::ui;
use crate::core::{Currency, CurrencyRateProvider, RateTable, Session};
use anyhow::Result;
use comfy_table::Cell;

/// Renders the loaded rates, each quoted both ways against the base.
pub fn render_rates(table: &RateTable) -> String {
    let mut out = ui::new_styled_table();
    out.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Per 1 {}", Currency::BASE)),
        ui::header_cell(&format!("In {}", Currency::BASE)),
    ]);

    for (currency, rate) in table.iter().filter(|(c, _)| !c.is_base()) {
        out.add_row(vec![
            Cell::new(currency.code()),
            ui::format_optional_cell(rate, |r| format!("{r:.6}")),
            ui::format_optional_cell(rate, |r| format!("{:.4}", 1.0 / r)),
        ]);
    }

    format!(
        "{}\n\n{}\n{}",
        ui::style_text("Exchange rates", ui::StyleType::Title),
        out,
        ui::style_text(
            &format!(
                "Fetched at {}",
                table.fetched_at().format("%Y-%m-%d %H:%M:%S UTC")
            ),
            ui::StyleType::Subtle
        )
    )
}

pub async fn run(provider: &dyn CurrencyRateProvider) -> Result<()> {
    let mut session = Session::default();
    super::load_rates(&mut session, provider).await?;
    if let Some(table) = session.current_rates() {
        println!("{}", render_rates(table));
    }
    Ok(())
}
