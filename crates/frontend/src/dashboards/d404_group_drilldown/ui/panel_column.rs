use leptos::prelude::*;
use thaw::*;

use crate::dashboards::d404_group_drilldown::panel_stack::Panel;
use crate::shared::components::table::format_money;

/// Одна колонка навигатора: список элементов уровня с полосой доли
#[component]
pub fn PanelColumn(
    index: usize,
    panel: Panel,
    /// Receives `(panel_index, item_key)`
    on_select: Callback<(usize, String)>,
) -> impl IntoView {
    let body = if panel.is_loading {
        view! {
            <div class="drilldown__state">
                <Spinner />
                <span>"Загрузка..."</span>
            </div>
        }
        .into_any()
    } else if let Some(err) = panel.load_error.clone() {
        view! {
            <div class="drilldown__state drilldown__state--error">{err.to_string()}</div>
        }
        .into_any()
    } else {
        let max = panel.max_value();
        let selected = panel.selected_key.clone();
        let items = panel.items.clone().unwrap_or_default();
        if items.is_empty() {
            view! { <div class="drilldown__state">"Нет данных"</div> }.into_any()
        } else {
            view! {
                <ul class="drilldown__items">
                    {items
                        .into_iter()
                        .map(|item| {
                            let is_selected = selected.as_deref() == Some(item.key.as_str());
                            let key = item.key.clone();
                            let title = item.name.clone();
                            let bar_style = format!("width: {:.1}%;", bar_width(item.value, max));
                            view! {
                                <li
                                    class=if is_selected {
                                        "drilldown__item drilldown__item--selected"
                                    } else {
                                        "drilldown__item"
                                    }
                                    title=title
                                    on:click=move |_| on_select.run((index, key.clone()))
                                >
                                    <div class="drilldown__item-row">
                                        <span class="drilldown__item-name">{item.name}</span>
                                        <span class="drilldown__item-value">
                                            {format_money(item.value)}
                                        </span>
                                    </div>
                                    <div class="drilldown__bar">
                                        <div class="drilldown__bar-fill" style=bar_style></div>
                                    </div>
                                </li>
                            }
                        })
                        .collect_view()}
                </ul>
            }
            .into_any()
        }
    };

    view! {
        <div class="drilldown__panel">
            <div class="drilldown__panel-title">{panel.title}</div>
            {body}
        </div>
    }
}

/// Bar length in percent of the panel maximum. Negative values get no bar.
fn bar_width(value: f64, max: f64) -> f64 {
    if max <= 0.0 || value <= 0.0 {
        return 0.0;
    }
    (value / max * 100.0).min(100.0)
}
