use super::super::{Model, Msg};
use shared::Tab;
use strum::IntoEnumIterator;
use yew::html::Scope;
use yew::prelude::*;

pub fn render_tabs(active: Tab, link: &Scope<Model>) -> Html {
    html! {
        <nav class="tab-bar">
            { for Tab::iter().map(|tab| html! {
                <button
                    class={classes!("tab", (tab == active).then_some("active"))}
                    onclick={link.callback(move |_| Msg::SelectTab(tab))}
                >
                    { tab.to_string() }
                </button>
            })}
        </nav>
    }
}
