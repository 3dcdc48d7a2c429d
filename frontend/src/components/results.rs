use super::super::Model;
use super::utils::render_inline_error;
use shared::{ClassificationState, PreviewState, UploadOutcome};
use yew::prelude::*;

pub fn render_results(model: &Model) -> Html {
    match &model.outcome {
        Some(outcome) => html! {
            <div class="results-container">
                <div class="result-column">
                    { render_preview(outcome) }
                </div>
                <div class="result-column">
                    <h2>{"Classification Result"}</h2>
                    { render_classification(&outcome.classification) }
                </div>
            </div>
        },
        None if model.uploading => html! {
            <div class="loading-preview">
                <i class="fa-solid fa-spinner fa-spin fa-2x"></i>
                <p style="margin-left: 10px;">{"Analyzing image..."}</p>
            </div>
        },
        None => html! {},
    }
}

fn render_preview(outcome: &UploadOutcome) -> Html {
    match &outcome.preview {
        PreviewState::Ready(preview) => html! {
            <figure class="xray-preview">
                <img id="actual-image-preview" src={preview.data_url.clone()} alt="Uploaded X-ray Image" />
                <figcaption>
                    { format!("Uploaded X-ray Image ({} x {}, {}-bit)", preview.width, preview.height, preview.bits_allocated) }
                </figcaption>
            </figure>
        },
        PreviewState::Failed { message } => html! {
            <div class="unavailable-preview">
                <p>{"Preview unavailable"}</p>
                <p class="preview-error">{ message }</p>
            </div>
        },
    }
}

fn render_classification(state: &ClassificationState) -> Html {
    match state {
        ClassificationState::Ready(view) => {
            let positive = view.prediction == "Positive";
            html! {
                <div class={classes!("verdict", positive.then_some("positive"))}>
                    <div class="metric">
                        <div class="metric-label">{"Prediction"}</div>
                        <div class="metric-value">{ &view.prediction }</div>
                    </div>
                    <div class="metric">
                        <div class="metric-label">{"Probability"}</div>
                        <div class="metric-value">{ &view.probability_text }</div>
                        <div class="meter">
                            <div class="meter-fill" style={format!("width: {}%", (view.probability * 100.0).clamp(0.0, 100.0))}></div>
                        </div>
                    </div>
                </div>
            }
        }
        ClassificationState::Failed { message } => render_inline_error(message),
    }
}
