use super::panel_stack::Panel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub label: String,
    pub panel_index: usize,
}

/// One crumb per panel with a selection: the selected item's name, or the
/// panel title when the item cannot be found.
pub fn build(panels: &[Panel]) -> Vec<Breadcrumb> {
    panels
        .iter()
        .enumerate()
        .filter(|(_, panel)| panel.selected_key.is_some())
        .map(|(index, panel)| Breadcrumb {
            label: panel
                .selected_item()
                .map(|item| item.name.clone())
                .unwrap_or_else(|| panel.title.to_string()),
            panel_index: index,
        })
        .collect()
}
