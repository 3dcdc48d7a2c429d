use super::super::{Model, Msg};
use super::utils::{debounce, render_inline_error};
use shared::{DisplayRecord, HistoryView};
use yew::prelude::*;

pub fn render_history(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link().clone();

    html! {
        <section class="history-section">
            <div class="history-header">
                <h2>{"Request History"}</h2>
                <button
                    class="analyze-btn"
                    disabled={model.history_loading}
                    onclick={debounce(300, move || link.send_message(Msg::RefreshHistory))}
                >
                    <i class="fa-solid fa-rotate"></i>{" Refresh History"}
                </button>
            </div>
            { render_history_body(model) }
        </section>
    }
}

fn render_history_body(model: &Model) -> Html {
    match &model.history {
        None => html! {
            <div class="loading-preview">
                <i class="fa-solid fa-spinner fa-spin"></i>
                <p style="margin-left: 10px;">{"Loading history..."}</p>
            </div>
        },
        Some(HistoryView::Empty) => html! {
            <p class="info-message">{"No history available yet."}</p>
        },
        Some(HistoryView::Failed { message }) => render_inline_error(message),
        Some(HistoryView::Records { records }) => html! {
            <div class="history-list">
                { for records.iter().map(render_record) }
            </div>
        },
    }
}

fn render_record(record: &DisplayRecord) -> Html {
    html! {
        <div class="history-card">
            <div class="history-details">
                <p>{"ID: "}<code>{ &record.id }</code></p>
                <p>{ format!("Timestamp: {}", record.timestamp) }</p>
                <p>{ format!("Image Size: {}", record.image_size) }</p>
            </div>
            <div class="metric">
                <div class="metric-label">{"Result"}</div>
                <div class="metric-value">{ &record.result }</div>
            </div>
        </div>
    }
}
