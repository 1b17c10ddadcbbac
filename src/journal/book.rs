use tracing::{info, warn};

use crate::error::{RecordError, StoreError};
use crate::models::{next_id, Exit, Trade, TradeType};
use crate::store::LocalStore;

pub const JOURNAL_KEY: &str = "edge-cipher-journal";

/// Which entry form a draft belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftKind {
    Manual,
    Image,
}

impl DraftKind {
    pub fn key(&self) -> &'static str {
        match self {
            DraftKind::Manual => "edge-cipher-trade-draft-manual",
            DraftKind::Image => "edge-cipher-trade-draft-image",
        }
    }
}

impl From<TradeType> for DraftKind {
    fn from(t: TradeType) -> Self {
        match t {
            TradeType::Manual => DraftKind::Manual,
            TradeType::Image => DraftKind::Image,
        }
    }
}

/// Newest-first trade journal.
pub struct Journal {
    store: LocalStore,
    trades: Vec<Trade>,
}

impl Journal {
    pub fn open(store: LocalStore) -> Self {
        let trades = store.load_or(JOURNAL_KEY, Vec::new);
        Self { store, trades }
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn recent(&self, n: usize) -> &[Trade] {
        &self.trades[..n.min(self.trades.len())]
    }

    pub fn get(&self, id: &str) -> Option<&Trade> {
        self.trades.iter().find(|t| t.id.as_deref() == Some(id))
    }

    fn position(&self, id: &str) -> Result<usize, RecordError> {
        self.trades
            .iter()
            .position(|t| t.id.as_deref() == Some(id))
            .ok_or_else(|| RecordError::NotFound(id.to_string()))
    }

    /// Validates, assigns an id when missing, records the trade and drops the
    /// matching draft.
    pub fn add(&mut self, mut trade: Trade) -> Result<&Trade, RecordError> {
        trade.validate()?;

        let taken = |id: &str| self.trades.iter().any(|t| t.id.as_deref() == Some(id));
        let id = match trade.id.take() {
            Some(id) if !id.is_empty() && !taken(&id) => id,
            _ => next_id("trade", taken),
        };
        trade.id = Some(id);

        info!(
            "Journal: {} {} {} @ {:.2} [{}]",
            trade.direction,
            trade.quantity,
            trade.symbol,
            trade.entry_price,
            trade.id_str()
        );
        let kind = DraftKind::from(trade.trade_type);
        self.trades.insert(0, trade);
        self.save();
        self.clear_draft(kind);
        Ok(&self.trades[0])
    }

    pub fn add_exit(&mut self, id: &str, exit: Exit) -> Result<&Trade, RecordError> {
        let idx = self.position(id)?;
        let mut updated = self.trades[idx].clone();
        updated.exits.push(exit);
        updated.validate()?;
        self.trades[idx] = updated;
        self.save();
        Ok(&self.trades[idx])
    }

    pub fn remove(&mut self, id: &str) -> Result<Trade, RecordError> {
        let idx = self.position(id)?;
        let removed = self.trades.remove(idx);
        self.save();
        Ok(removed)
    }

    fn save(&self) {
        self.store.save_quietly(JOURNAL_KEY, &self.trades);
    }

    pub fn save_draft(&self, kind: DraftKind, draft: &Trade) -> Result<(), StoreError> {
        self.store.set(kind.key(), draft)
    }

    /// A stored draft that no longer parses or validates is ignored.
    pub fn load_draft(&self, kind: DraftKind) -> Option<Trade> {
        let draft: Trade = match self.store.get(kind.key()) {
            Ok(Some(d)) => d,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to load draft: {}", e);
                return None;
            }
        };
        match draft.validate() {
            Ok(()) => Some(draft),
            Err(e) => {
                warn!("Discarding invalid draft ({})", e);
                None
            }
        }
    }

    pub fn clear_draft(&self, kind: DraftKind) {
        if let Err(e) = self.store.remove(kind.key()) {
            warn!("Failed to clear draft: {}", e);
        }
    }
}
