use leptos::prelude::*;
use thaw::*;

use crate::dashboards::d404_group_drilldown::breadcrumbs::Breadcrumb;

#[component]
pub fn BreadcrumbTrail(
    #[prop(into)] crumbs: Signal<Vec<Breadcrumb>>,
    on_jump: Callback<usize>,
    on_home: Callback<()>,
) -> impl IntoView {
    view! {
        <nav class="drilldown__breadcrumbs">
            <Button
                size=ButtonSize::Small
                appearance=ButtonAppearance::Subtle
                on_click=move |_| on_home.run(())
            >
                "⌂ Все группы"
            </Button>
            {move || {
                crumbs
                    .get()
                    .into_iter()
                    .map(|crumb| {
                        let index = crumb.panel_index;
                        view! {
                            <span class="drilldown__crumb-sep">"›"</span>
                            <a class="drilldown__crumb" on:click=move |_| on_jump.run(index)>
                                {crumb.label}
                            </a>
                        }
                    })
                    .collect_view()
            }}
        </nav>
    }
}
