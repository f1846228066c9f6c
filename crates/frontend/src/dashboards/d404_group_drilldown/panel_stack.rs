//! Drill-down state machine.
//!
//! The controller never performs I/O. Operations that need data return a
//! [`FetchTicket`]; the caller runs the fetch and hands the outcome back via
//! [`PanelStackController::apply`]. Every truncation bumps the generation, so
//! a ticket issued for an abandoned branch resolves as [`ApplyResult::Stale`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use contracts::dashboards::d404_group_drilldown::{
    child_of, root_level, AmbientFilters, LevelId, LevelRequest, PanelItem, RootRequest,
};
use thiserror::Error;

use super::breadcrumbs::{self, Breadcrumb};
use super::leaf_detail::LeafDetailStore;
use super::resolver::{DrilldownError, LevelOutcome};

/// Cancellation flag of the root fetch
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Одна колонка навигатора
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub level: LevelId,
    pub title: &'static str,
    /// None until the first response arrives
    pub items: Option<Vec<PanelItem>>,
    pub selected_key: Option<String>,
    pub is_loading: bool,
    pub load_error: Option<DrilldownError>,
}

impl Panel {
    fn loading(level: LevelId) -> Self {
        Self {
            level,
            title: level.title(),
            items: None,
            selected_key: None,
            is_loading: true,
            load_error: None,
        }
    }

    fn loaded(level: LevelId, items: Vec<PanelItem>) -> Self {
        Self {
            items: Some(items),
            is_loading: false,
            ..Self::loading(level)
        }
    }

    pub fn find_item(&self, key: &str) -> Option<&PanelItem> {
        self.items.as_ref()?.iter().find(|item| item.key == key)
    }

    pub fn selected_item(&self) -> Option<&PanelItem> {
        self.find_item(self.selected_key.as_deref()?)
    }

    /// Largest item value, used to scale the value bars
    pub fn max_value(&self) -> f64 {
        self.items
            .iter()
            .flatten()
            .map(|item| item.value)
            .fold(0.0, f64::max)
    }

    fn settle(&mut self, items: Vec<PanelItem>, error: Option<DrilldownError>) {
        self.items = Some(items);
        self.is_loading = false;
        self.load_error = error;
    }
}

/// Where a response is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTarget {
    Root,
    Panel(usize),
    Leaf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchRequest {
    Root(RootRequest),
    Level(LevelRequest),
}

/// One outstanding fetch
#[derive(Debug, Clone)]
pub struct FetchTicket {
    /// Generation at issue time
    pub generation: u64,
    pub level: LevelId,
    pub target: FetchTarget,
    pub request: FetchRequest,
    /// Set for root fetches only
    pub cancel: Option<CancelHandle>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApplyResult {
    Applied { rows: usize },
    Empty,
    Failed(DrilldownError),
    /// Ticket belongs to a superseded generation; nothing was written
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("panel {index} does not exist (stack length {len})")]
    PanelOutOfRange { index: usize, len: usize },

    #[error("panel {0} has no loaded items")]
    ItemsNotLoaded(usize),

    #[error("item '{key}' is not in panel {index}")]
    UnknownItem { index: usize, key: String },

    #[error("panel {0} is the terminal level")]
    TerminalLevel(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JumpError {
    #[error("breadcrumb {index} does not exist (stack length {len})")]
    OutOfRange { index: usize, len: usize },

    #[error("panel {0} has no selection")]
    NoSelection(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorPhase {
    Idle,
    RootLoading,
    RootLoaded,
    LevelLoading(LevelId),
    LevelLoaded(LevelId),
    LeafLoading,
    LeafLoaded,
}

/// Single writer of the panel stack and the leaf detail
#[derive(Debug, Clone)]
pub struct PanelStackController {
    filters: AmbientFilters,
    predefined_groups_only: bool,
    panels: Vec<Panel>,
    leaf: LeafDetailStore,
    generation: u64,
    root_cancel: Option<CancelHandle>,
}

impl PanelStackController {
    pub fn new(predefined_groups_only: bool) -> Self {
        Self {
            filters: AmbientFilters::default(),
            predefined_groups_only,
            panels: Vec::new(),
            leaf: LeafDetailStore::new(),
            generation: 0,
            root_cancel: None,
        }
    }

    /// Full reset on an ambient filter change
    pub fn reset(&mut self, filters: AmbientFilters) -> FetchTicket {
        if let Some(previous) = self.root_cancel.take() {
            previous.cancel();
        }

        self.filters = filters;
        self.generation += 1;
        let root = root_level();
        self.panels = vec![Panel::loading(root.id)];
        self.leaf.clear();

        let cancel = CancelHandle::new();
        self.root_cancel = Some(cancel.clone());

        log::debug!(
            "d404: reset, generation {}, {} active filters",
            self.generation,
            self.filters.active_count()
        );

        FetchTicket {
            generation: self.generation,
            level: root.id,
            target: FetchTarget::Root,
            request: FetchRequest::Root(RootRequest {
                filters: self.filters.clone(),
                predefined_groups_only: self.predefined_groups_only,
            }),
            cancel: Some(cancel),
        }
    }

    /// Replace the stack with an unselected root holding `root_items`
    pub fn initialize(&mut self, root_items: Vec<PanelItem>) {
        if let Some(previous) = self.root_cancel.take() {
            previous.cancel();
        }

        self.generation += 1;
        self.panels = vec![Panel::loaded(root_level().id, root_items)];
        self.leaf.clear();
        log::debug!("d404: initialized, generation {}", self.generation);
    }

    pub fn select(
        &mut self,
        panel_index: usize,
        item_key: &str,
    ) -> Result<Option<FetchTicket>, SelectError> {
        let len = self.panels.len();
        let Some(panel) = self.panels.get(panel_index) else {
            log::warn!("d404: select on missing panel {} (len {})", panel_index, len);
            return Err(SelectError::PanelOutOfRange {
                index: panel_index,
                len,
            });
        };
        let Some(items) = panel.items.as_ref() else {
            log::warn!("d404: select on panel {} before it loaded", panel_index);
            return Err(SelectError::ItemsNotLoaded(panel_index));
        };
        if !items.iter().any(|item| item.key == item_key) {
            log::warn!("d404: unknown item '{}' in panel {}", item_key, panel_index);
            return Err(SelectError::UnknownItem {
                index: panel_index,
                key: item_key.to_string(),
            });
        }
        let Some(child) = child_of(panel.level.ordinal()) else {
            return Err(SelectError::TerminalLevel(panel_index));
        };

        if panel.selected_key.as_deref() == Some(item_key) && self.descendant_ok(panel_index) {
            log::debug!("d404: '{}' already selected in panel {}", item_key, panel_index);
            return Ok(None);
        }

        self.panels.truncate(panel_index + 1);
        self.panels[panel_index].selected_key = Some(item_key.to_string());
        self.leaf.clear();
        self.generation += 1;

        let parent_keys = self.parent_path(panel_index + 1);
        let target = if child.is_leaf {
            self.leaf.begin_loading(parent_keys.clone());
            FetchTarget::Leaf
        } else {
            self.panels.push(Panel::loading(child.id));
            FetchTarget::Panel(panel_index + 1)
        };

        log::debug!(
            "d404: select '{}' in panel {}, fetching {:?} with {:?}, generation {}",
            item_key,
            panel_index,
            child.id,
            parent_keys,
            self.generation
        );

        Ok(Some(FetchTicket {
            generation: self.generation,
            level: child.id,
            target,
            request: FetchRequest::Level(LevelRequest {
                level: child.id.wire_level(),
                parent_keys,
                filters: self.filters.clone(),
            }),
            cancel: None,
        }))
    }

    /// Write a fetch outcome into its target, unless the ticket is stale
    pub fn apply(&mut self, ticket: &FetchTicket, outcome: LevelOutcome) -> ApplyResult {
        if ticket.generation != self.generation {
            log::debug!(
                "d404: dropping {:?} response of generation {} (current {})",
                ticket.level,
                ticket.generation,
                self.generation
            );
            return ApplyResult::Stale;
        }
        if ticket.cancel.as_ref().is_some_and(CancelHandle::is_cancelled) {
            log::debug!("d404: dropping cancelled root response");
            return ApplyResult::Stale;
        }

        let result = match ticket.target {
            FetchTarget::Root => self.apply_panel(0, ticket.level, outcome),
            FetchTarget::Panel(index) => self.apply_panel(index, ticket.level, outcome),
            FetchTarget::Leaf => self.apply_leaf(outcome),
        };

        if ticket.target == FetchTarget::Root && result != ApplyResult::Stale {
            self.root_cancel = None;
        }
        match &result {
            ApplyResult::Failed(err) => {
                log::warn!("d404: {:?} fetch failed: {}", ticket.level, err)
            }
            other => log::debug!("d404: {:?} applied: {:?}", ticket.level, other),
        }
        result
    }

    fn apply_panel(&mut self, index: usize, level: LevelId, outcome: LevelOutcome) -> ApplyResult {
        let Some(panel) = self.panels.get_mut(index) else {
            return ApplyResult::Stale;
        };
        if panel.level != level || !panel.is_loading {
            return ApplyResult::Stale;
        }

        match outcome {
            LevelOutcome::Groups(items) => {
                let rows = items.len();
                panel.settle(items, None);
                if rows == 0 {
                    ApplyResult::Empty
                } else {
                    ApplyResult::Applied { rows }
                }
            }
            LevelOutcome::Empty => {
                panel.settle(Vec::new(), None);
                ApplyResult::Empty
            }
            LevelOutcome::LeafLines(_) => {
                let err = DrilldownError::Application(format!(
                    "уровень «{}» получил строки заказов",
                    panel.title
                ));
                panel.settle(Vec::new(), Some(err.clone()));
                ApplyResult::Failed(err)
            }
            LevelOutcome::Failed(err) => {
                panel.settle(Vec::new(), Some(err.clone()));
                ApplyResult::Failed(err)
            }
        }
    }

    fn apply_leaf(&mut self, outcome: LevelOutcome) -> ApplyResult {
        if !self.leaf.is_loading() {
            return ApplyResult::Stale;
        }

        match outcome {
            LevelOutcome::LeafLines(lines) => match self.leaf.resolve(lines) {
                0 => ApplyResult::Empty,
                rows => ApplyResult::Applied { rows },
            },
            LevelOutcome::Empty => {
                self.leaf.resolve(Vec::new());
                ApplyResult::Empty
            }
            LevelOutcome::Groups(_) => {
                let err = DrilldownError::Application(
                    "строки товаров получены в виде групп".to_string(),
                );
                self.leaf.fail(err.clone());
                ApplyResult::Failed(err)
            }
            LevelOutcome::Failed(err) => {
                self.leaf.fail(err.clone());
                ApplyResult::Failed(err)
            }
        }
    }

    /// Keep panels `0..=index`, including the selection at `index`
    pub fn breadcrumb_jump(&mut self, index: usize) -> Result<(), JumpError> {
        let len = self.panels.len();
        let Some(panel) = self.panels.get(index) else {
            log::warn!("d404: breadcrumb {} out of range (len {})", index, len);
            return Err(JumpError::OutOfRange { index, len });
        };
        if panel.selected_key.is_none() {
            log::warn!("d404: breadcrumb {} has no selection", index);
            return Err(JumpError::NoSelection(index));
        }

        self.panels.truncate(index + 1);
        self.leaf.clear();
        self.generation += 1;
        log::debug!(
            "d404: jumped to breadcrumb {}, generation {}",
            index,
            self.generation
        );
        Ok(())
    }

    /// Back to the unselected root
    pub fn home(&mut self) {
        let Some(root) = self.panels.first() else {
            return;
        };
        // A pending root fetch must stay valid
        if self.panels.len() == 1 && root.selected_key.is_none() && !self.leaf.is_active() {
            return;
        }

        self.panels.truncate(1);
        self.panels[0].selected_key = None;
        self.leaf.clear();
        self.generation += 1;
        log::debug!("d404: home, generation {}", self.generation);
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn leaf(&self) -> &LeafDetailStore {
        &self.leaf
    }

    pub fn filters(&self) -> &AmbientFilters {
        &self.filters
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Selected keys of panels `0..index`
    pub fn parent_path(&self, index: usize) -> Vec<String> {
        self.panels
            .iter()
            .take(index)
            .filter_map(|panel| panel.selected_key.clone())
            .collect()
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        breadcrumbs::build(&self.panels)
    }

    pub fn phase(&self) -> NavigatorPhase {
        let Some(last) = self.panels.last() else {
            return NavigatorPhase::Idle;
        };
        if let Some(leaf) = self.leaf.state() {
            return if leaf.is_loading {
                NavigatorPhase::LeafLoading
            } else {
                NavigatorPhase::LeafLoaded
            };
        }
        match (self.panels.len(), last.is_loading) {
            (1, true) => NavigatorPhase::RootLoading,
            (1, false) => NavigatorPhase::RootLoaded,
            (_, true) => NavigatorPhase::LevelLoading(last.level),
            (_, false) => NavigatorPhase::LevelLoaded(last.level),
        }
    }

    /// The selection at `index` already has a live descendant
    fn descendant_ok(&self, index: usize) -> bool {
        match child_of(self.panels[index].level.ordinal()) {
            Some(child) if child.is_leaf => self.leaf.is_satisfied(),
            Some(_) => self
                .panels
                .get(index + 1)
                .is_some_and(|next| next.load_error.is_none()),
            None => true,
        }
    }
}
