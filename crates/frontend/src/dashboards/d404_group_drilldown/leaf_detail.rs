use contracts::dashboards::d404_group_drilldown::LeafRecord;

use super::resolver::DrilldownError;

/// Order lines of the selected order. Exists only while the last groupable
/// panel has a selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LeafDetailState {
    pub is_loading: bool,
    /// Rows exactly as returned by the service, one per order line
    pub data: Vec<LeafRecord>,
    /// Selected keys the lines were requested for
    pub parent_keys: Vec<String>,
    pub error: Option<DrilldownError>,
}

/// Footer figures for the leaf table. Display only: the lines themselves
/// are never merged.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LeafTotals {
    pub lines: usize,
    pub quantity: f64,
    pub amount: f64,
}

/// Sibling of the panel stack holding the terminal level.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LeafDetailStore {
    state: Option<LeafDetailState>,
}

impl LeafDetailStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_loading(&mut self, parent_keys: Vec<String>) {
        self.state = Some(LeafDetailState {
            is_loading: true,
            data: Vec::new(),
            parent_keys,
            error: None,
        });
    }

    /// Store the lines; ignored when the store was cleared meanwhile.
    /// Returns the number of stored lines.
    pub fn resolve(&mut self, lines: Vec<LeafRecord>) -> usize {
        match self.state.as_mut() {
            Some(state) => {
                state.is_loading = false;
                state.error = None;
                state.data = lines;
                state.data.len()
            }
            None => 0,
        }
    }

    pub fn fail(&mut self, error: DrilldownError) {
        if let Some(state) = self.state.as_mut() {
            state.is_loading = false;
            state.data = Vec::new();
            state.error = Some(error);
        }
    }

    pub fn clear(&mut self) {
        self.state = None;
    }

    pub fn state(&self) -> Option<&LeafDetailState> {
        self.state.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.is_loading)
    }

    /// Present and not failed: re-selecting the same order needs no fetch
    pub fn is_satisfied(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.error.is_none())
    }

    /// Key of the order the lines belong to
    pub fn order_key(&self) -> Option<&str> {
        self.state
            .as_ref()
            .and_then(|s| s.parent_keys.last())
            .map(String::as_str)
    }

    pub fn totals(&self) -> LeafTotals {
        let Some(state) = self.state.as_ref() else {
            return LeafTotals::default();
        };
        state
            .data
            .iter()
            .fold(LeafTotals::default(), |mut acc, line| {
                acc.lines += 1;
                acc.quantity += line.quantity;
                acc.amount += line.value;
                acc
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(key: &str, value: f64) -> LeafRecord {
        LeafRecord {
            key: key.into(),
            name: "Producto".into(),
            value,
            quantity: 1.0,
            unit_price: value,
            avg_unit_price: value,
            payment_condition: Some("Contado".into()),
        }
    }

    #[test]
    fn test_lifecycle() {
        let mut store = LeafDetailStore::new();
        assert!(!store.is_active());

        store.begin_loading(vec!["g".into(), "c".into(), "d".into(), "P-1".into()]);
        assert!(store.is_loading());
        assert!(store.is_satisfied());
        assert_eq!(store.order_key(), Some("P-1"));

        // Identical lines stay separate
        let stored = store.resolve(vec![line("L1", 10.0), line("L2", 10.0)]);
        assert_eq!(stored, 2);
        let state = store.state().unwrap();
        assert!(!state.is_loading);
        assert_eq!(state.data.len(), 2);
        assert_eq!(
            store.totals(),
            LeafTotals {
                lines: 2,
                quantity: 2.0,
                amount: 20.0
            }
        );

        store.clear();
        assert_eq!(store.totals(), LeafTotals::default());
        assert!(store.state().is_none());
        assert_eq!(store.order_key(), None);
    }

    #[test]
    fn test_failure_is_not_satisfied() {
        let mut store = LeafDetailStore::new();
        store.begin_loading(vec!["P-1".into()]);
        store.fail(DrilldownError::Transport("offline".into()));

        let state = store.state().unwrap();
        assert!(!state.is_loading);
        assert!(state.data.is_empty());
        assert!(!store.is_satisfied());
    }

    #[test]
    fn test_resolve_after_clear_is_ignored() {
        let mut store = LeafDetailStore::new();
        store.begin_loading(vec!["P-1".into()]);
        store.clear();
        assert_eq!(store.resolve(vec![line("L1", 1.0)]), 0);
        assert!(!store.is_active());
    }
}
