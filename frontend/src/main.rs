mod api;
mod components;

use components::handlers;
use gloo_file::File as GlooFile;
use shared::{HistoryView, Tab, UploadOutcome};
use web_sys::DragEvent;
use yew::prelude::*;

// Yew msg components
pub enum Msg {
    // Navigation
    SelectTab(Tab),

    // Classification
    FileChosen(GlooFile),
    UploadFinished(UploadOutcome),

    // History
    RefreshHistory,
    HistoryLoaded(HistoryView),

    // UI states
    SetError(Option<String>),
    SetDragging(bool),
    HandleDrop(DragEvent),
}

// Main component
pub struct Model {
    active_tab: Tab,
    file_name: Option<String>,
    outcome: Option<UploadOutcome>,
    uploading: bool,
    history: Option<HistoryView>,
    history_loading: bool,
    error: Option<String>,
    is_dragging: bool,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let model = Self {
            active_tab: Tab::Classification,
            file_name: None,
            outcome: None,
            uploading: false,
            history: None,
            history_loading: true,
            error: None,
            is_dragging: false,
        };
        handlers::request_history(ctx);
        model
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SelectTab(tab) => {
                let changed = self.active_tab != tab;
                self.active_tab = tab;
                changed
            }

            Msg::FileChosen(file) => handlers::handle_file_chosen(self, ctx, file),
            Msg::UploadFinished(outcome) => handlers::handle_upload_finished(self, outcome),

            Msg::RefreshHistory => handlers::handle_refresh_history(self, ctx),
            Msg::HistoryLoaded(view) => {
                self.history = Some(view);
                self.history_loading = false;
                true
            }

            Msg::SetError(error) => {
                self.error = error;
                self.uploading = false;
                true
            }
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }
            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { components::header::render_header() }
                { components::tabs::render_tabs(self.active_tab, ctx.link()) }

                <main class="main-content">
                {
                    match self.active_tab {
                        Tab::Classification => html! {
                            <>
                                { components::upload_section::render_upload_section(self, ctx) }
                                { components::utils::render_error_message(self) }
                                { components::results::render_results(self) }
                            </>
                        },
                        Tab::History => components::history::render_history(self, ctx),
                    }
                }
                </main>

                <footer class="app-footer">
                    <p>{"Chest X-ray Classification | Fullstack Rust WASM"}</p>
                </footer>
            </div>
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<Model>::new().render();
}
