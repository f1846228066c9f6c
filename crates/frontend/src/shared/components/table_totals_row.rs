use leptos::prelude::*;

/// Строка итогов таблицы (`<tr class="table__totals-row">`).
/// Cells are passed as children.
#[component]
pub fn TableTotalsRow(
    children: Children,
    /// Extra CSS classes
    #[prop(optional)]
    class: &'static str,
) -> impl IntoView {
    let row_class = match class {
        "" => "table__totals-row".to_string(),
        extra => format!("table__totals-row {extra}"),
    };

    view! { <tr class=row_class>{children()}</tr> }
}
