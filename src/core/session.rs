//! Session state for one run of the converter.
//!
//! A [`Session`] owns the loaded rate table, the conversion history, the
//! notes and the current currency selection. Everything is dropped when the
//! session ends.

use super::convert::{self, ConversionError, ConversionRequest, ConversionResult};
use super::currency::{Currency, CurrencyRateProvider, RateTable};
use super::history::{HistoryEntry, HistoryLog};
use super::notes::{Note, NotesStore};
use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct Session {
    rates: Option<RateTable>,
    history: HistoryLog,
    notes: NotesStore,
    from: Currency,
    to: Currency,
    next_entry_id: u64,
}

impl Session {
    pub fn new(from: Currency, to: Currency, history_capacity: usize) -> Self {
        Self {
            rates: None,
            history: HistoryLog::with_capacity(history_capacity),
            notes: NotesStore::new(),
            from,
            to,
            next_entry_id: 0,
        }
    }

    /// The loaded rate table, or `None` while rates are unavailable.
    pub fn current_rates(&self) -> Option<&RateTable> {
        self.rates.as_ref()
    }

    pub fn load_rates(&mut self, table: RateTable) {
        debug!("Loaded rate table fetched at {}", table.fetched_at());
        self.rates = Some(table);
    }

    /// Fetches a fresh table. On failure the previous table stays loaded.
    pub async fn refresh_rates(&mut self, provider: &dyn CurrencyRateProvider) -> Result<()> {
        match provider.fetch_rates(Currency::BASE).await {
            Ok(table) => {
                info!("Exchange rates refreshed");
                self.load_rates(table);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to refresh exchange rates");
                Err(e)
            }
        }
    }

    pub fn selection(&self) -> (Currency, Currency) {
        (self.from, self.to)
    }

    pub fn select_from(&mut self, currency: Currency) {
        self.from = currency;
    }

    pub fn select_to(&mut self, currency: Currency) {
        self.to = currency;
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
        debug!("Swapped selection to {} -> {}", self.from, self.to);
    }

    /// Converts `amount` with the current selection and records the result.
    pub fn convert(&mut self, amount: &str) -> Result<HistoryEntry, ConversionError> {
        let amount = convert::parse_amount(amount)?;
        self.convert_request(ConversionRequest::new(amount, self.from, self.to))
    }

    /// Selects `from` and `to`, then converts.
    pub fn convert_between(
        &mut self,
        amount: &str,
        from: &str,
        to: &str,
    ) -> Result<HistoryEntry, ConversionError> {
        let request = ConversionRequest::parse(amount, from, to)?;
        self.from = request.from;
        self.to = request.to;
        self.convert_request(request)
    }

    fn convert_request(
        &mut self,
        request: ConversionRequest,
    ) -> Result<HistoryEntry, ConversionError> {
        let result: ConversionResult = convert::convert(&request, self.rates.as_ref())?;

        self.next_entry_id += 1;
        let entry = HistoryEntry {
            id: self.next_entry_id,
            from: request.from,
            to: request.to,
            amount: request.amount,
            result,
            created_at: Utc::now(),
        };
        debug!(
            "Converted {} {} to {} {}",
            entry.amount, entry.from, result.converted_amount, entry.to
        );
        self.history.record(entry.clone());
        Ok(entry)
    }

    /// Rate for the current selection, rounded for display.
    pub fn display_rate(&self) -> Option<f64> {
        let rates = self.rates.as_ref()?;
        convert::effective_rate(self.from, self.to, rates)
            .ok()
            .map(|r| convert::round_to(r, 4))
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn notes(&self) -> &NotesStore {
        &self.notes
    }

    pub fn add_note(&mut self, text: &str) -> Option<Note> {
        self.notes.add(text).cloned()
    }

    pub fn remove_note(&mut self, id: u64) -> Option<Note> {
        self.notes.remove(id)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(
            Currency::Rwf,
            Currency::Rub,
            super::history::DEFAULT_HISTORY_CAPACITY,
        )
    }
}
