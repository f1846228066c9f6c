use leptos::prelude::*;
use leptos::task::spawn_local;

use super::{BreadcrumbTrail, FilterBar, LeafDetailTable, PanelColumn};
use crate::dashboards::d404_group_drilldown::panel_stack::{
    ApplyResult, FetchTicket, PanelStackController,
};
use crate::dashboards::d404_group_drilldown::resolver::{self, DrilldownError};
use crate::shared::filter_context::use_filter_context;
use crate::shared::page_frame::PageFrame;
use crate::shared::page_standard::PAGE_CAT_DASHBOARD;

/// Детализация продаж: группы → клиенты → даты → заказы → товары
#[component]
pub fn GroupDrilldownDashboard(
    /// Root level lists predefined customer groups only
    #[prop(default = true)]
    predefined_groups_only: bool,
) -> impl IntoView {
    let filter_ctx = use_filter_context();
    let controller = RwSignal::new(PanelStackController::new(predefined_groups_only));
    let last_error = RwSignal::new(None::<DrilldownError>);

    let run = move |ticket: FetchTicket| {
        spawn_local(async move {
            let outcome = resolver::resolve(&ticket).await;
            let applied = controller.try_update(|ctrl| ctrl.apply(&ticket, outcome));
            if let Some(ApplyResult::Failed(err)) = applied {
                last_error.set(Some(err));
            }
        });
    };

    // Any ambient filter change restarts from the root
    Effect::new(move |_| {
        let filters = filter_ctx.filters.get();
        last_error.set(None);
        if let Some(ticket) = controller.try_update(|ctrl| ctrl.reset(filters)) {
            run(ticket);
        }
    });

    let on_select = Callback::new(move |(panel_index, key): (usize, String)| {
        match controller.try_update(|ctrl| ctrl.select(panel_index, &key)) {
            Some(Ok(Some(ticket))) => {
                last_error.set(None);
                run(ticket);
            }
            Some(Err(err)) => log::warn!("d404: {}", err),
            Some(Ok(None)) | None => {}
        }
    });

    let on_jump = Callback::new(move |index: usize| {
        if let Some(Err(err)) = controller.try_update(|ctrl| ctrl.breadcrumb_jump(index)) {
            log::warn!("d404: {}", err);
        }
    });

    let on_home = Callback::new(move |_: ()| {
        controller.update(|ctrl| ctrl.home());
    });

    let crumbs = Signal::derive(move || controller.with(|ctrl| ctrl.breadcrumbs()));

    view! {
        <PageFrame page_id="d404_group_drilldown--dashboard" category=PAGE_CAT_DASHBOARD>
            <div class="page__header">
                <h2 class="page__title">"Продажи по группам клиентов"</h2>
            </div>

            <div class="page__content">
                <FilterBar />
                <BreadcrumbTrail crumbs=crumbs on_jump=on_jump on_home=on_home />

                {move || {
                    last_error
                        .get()
                        .map(|err| {
                            view! {
                                <div class="alert alert--error" style="margin-bottom: var(--spacing-md);">
                                    {err.to_string()}
                                </div>
                            }
                        })
                }}

                <div class="drilldown__panels">
                    {move || {
                        controller
                            .with(|ctrl| ctrl.panels().to_vec())
                            .into_iter()
                            .enumerate()
                            .map(|(index, panel)| {
                                view! { <PanelColumn index=index panel=panel on_select=on_select /> }
                            })
                            .collect_view()
                    }}
                </div>

                {move || {
                    controller
                        .with(|ctrl| {
                            let leaf = ctrl.leaf();
                            leaf.state()
                                .cloned()
                                .map(|state| (state, leaf.totals(), leaf.order_key().map(str::to_string)))
                        })
                        .map(|(state, totals, order_key)| {
                            view! { <LeafDetailTable state=state totals=totals order_key=order_key /> }
                        })
                }}
            </div>
        </PageFrame>
    }
}
