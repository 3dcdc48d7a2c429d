use yew::prelude::*;

/// Renders the application header
pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-x-ray"></i> {" Chest X-ray Classification"}</h1>
            <p class="subtitle">{"Upload a DICOM study to preview it and get a prediction"}</p>
        </header>
    }
}
