use crate::dashboards::GroupDrilldownDashboard;
use crate::shared::filter_context::FilterContext;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    // Ambient filters shared by all dashboards
    provide_context(FilterContext::new());

    view! { <GroupDrilldownDashboard /> }
}
