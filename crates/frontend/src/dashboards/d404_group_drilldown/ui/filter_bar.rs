use leptos::prelude::*;
use thaw::*;

use crate::shared::filter_context::{date_input_value, date_range_from_inputs, use_filter_context};

/// Дата, исключение сотрудников и поиск. Changes are published to the
/// filter context only on "Применить".
#[component]
pub fn FilterBar() -> impl IntoView {
    let ctx = use_filter_context();
    let initial = ctx.snapshot();

    let date_from = RwSignal::new(date_input_value(
        initial.date_range.as_ref().map(|range| range.from),
    ));
    let date_to = RwSignal::new(date_input_value(
        initial.date_range.as_ref().map(|range| range.to),
    ));
    let exclude_employees = RwSignal::new(initial.exclude_employees);
    let search = RwSignal::new(initial.search_term.clone().unwrap_or_default());

    let apply = move |_: leptos::ev::MouseEvent| {
        let mut next = ctx.snapshot();
        next.date_range =
            date_range_from_inputs(&date_from.get_untracked(), &date_to.get_untracked());
        next.exclude_employees = exclude_employees.get_untracked();
        let term = search.get_untracked();
        next.search_term = Some(term.trim().to_string()).filter(|t| !t.is_empty());
        ctx.apply(next);
    };

    view! {
        <div class="drilldown__filters">
            <input
                type="date"
                class="drilldown__date"
                prop:value=date_from
                on:input=move |ev| date_from.set(event_target_value(&ev))
            />
            <span>"по"</span>
            <input
                type="date"
                class="drilldown__date"
                prop:value=date_to
                on:input=move |ev| date_to.set(event_target_value(&ev))
            />
            <Checkbox checked=exclude_employees label="Без сотрудников" />
            <div style="width: 260px;">
                <Input value=search placeholder="Поиск клиента..." />
            </div>
            <Button appearance=ButtonAppearance::Primary on_click=apply>
                "Применить"
            </Button>
            <span class="drilldown__filters-count">
                {move || format!("Активных фильтров: {}", ctx.filters.with(|f| f.active_count()))}
            </span>
        </div>
    }
}
