use leptos::prelude::*;
use thaw::*;

use crate::dashboards::d404_group_drilldown::leaf_detail::{LeafDetailState, LeafTotals};
use crate::shared::components::table::{format_money, format_quantity};
use crate::shared::components::TableTotalsRow;

/// Строки выбранного заказа
#[component]
pub fn LeafDetailTable(
    state: LeafDetailState,
    totals: LeafTotals,
    /// Key of the order the lines belong to
    order_key: Option<String>,
) -> impl IntoView {
    let caption = match order_key {
        Some(order) => format!("Товары заказа {}", order),
        None => "Товары".to_string(),
    };

    let body = if state.is_loading {
        view! {
            <div class="drilldown__state">
                <Spinner />
                <span>"Загрузка строк заказа..."</span>
            </div>
        }
        .into_any()
    } else if let Some(err) = state.error {
        view! {
            <div class="drilldown__state drilldown__state--error">{err.to_string()}</div>
        }
        .into_any()
    } else if state.data.is_empty() {
        view! { <div class="drilldown__state">"В заказе нет строк"</div> }.into_any()
    } else {
        view! {
            <table class="table">
                <thead>
                    <tr>
                        <th>"Товар"</th>
                        <th class="table__cell--right">"Кол-во"</th>
                        <th class="table__cell--right">"Цена"</th>
                        <th class="table__cell--right">"Ср. цена"</th>
                        <th class="table__cell--right">"Сумма"</th>
                        <th>"Условие оплаты"</th>
                    </tr>
                    <TableTotalsRow>
                        <td>{format!("Строк: {}", totals.lines)}</td>
                        <td class="table__cell--right">{format_quantity(totals.quantity)}</td>
                        <td></td>
                        <td></td>
                        <td class="table__cell--right">{format_money(totals.amount)}</td>
                        <td></td>
                    </TableTotalsRow>
                </thead>
                <tbody>
                    {state
                        .data
                        .into_iter()
                        .map(|line| {
                            view! {
                                <tr>
                                    <td>{line.name}</td>
                                    <td class="table__cell--right">{format_quantity(line.quantity)}</td>
                                    <td class="table__cell--right">{format_money(line.unit_price)}</td>
                                    <td class="table__cell--right">
                                        {format_money(line.avg_unit_price)}
                                    </td>
                                    <td class="table__cell--right">{format_money(line.value)}</td>
                                    <td>{line.payment_condition.unwrap_or_default()}</td>
                                </tr>
                            }
                        })
                        .collect_view()}
                </tbody>
            </table>
        }
        .into_any()
    };

    view! {
        <div class="drilldown__leaf">
            <div class="drilldown__panel-title">{caption}</div>
            {body}
        </div>
    }
}
