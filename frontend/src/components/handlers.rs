use super::super::{Model, Msg};
use super::utils::first_dicom_file;
use crate::api;
use gloo_file::File as GlooFile;
use shared::HistoryView;
use wasm_bindgen_futures::spawn_local;
use web_sys::DragEvent;
use yew::prelude::*;

pub fn handle_file_chosen(model: &mut Model, ctx: &Context<Model>, file: GlooFile) -> bool {
    model.error = None;
    model.outcome = None;
    model.uploading = true;
    model.file_name = Some(file.name());

    log::info!("Uploading {} ({} bytes)", file.name(), file.size());
    send_upload_request(ctx, file);
    true
}

pub fn handle_upload_finished(model: &mut Model, outcome: shared::UploadOutcome) -> bool {
    model.uploading = false;
    model.outcome = Some(outcome);
    true
}

pub fn handle_refresh_history(model: &mut Model, ctx: &Context<Model>) -> bool {
    model.history_loading = true;
    request_history(ctx);
    true
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    let file = event
        .data_transfer()
        .and_then(|data_transfer| data_transfer.files())
        .and_then(|file_list| first_dicom_file(&file_list));

    match file {
        Some(file) => ctx.link().send_message(Msg::FileChosen(file)),
        None => {
            log::warn!("Dropped files contained no DICOM image");
            ctx.link().send_message(Msg::SetError(Some(
                "Only .dcm and .dicom files can be uploaded.".into(),
            )));
        }
    }

    true
}

pub fn send_upload_request(ctx: &Context<Model>, file: GlooFile) {
    let link = ctx.link().clone();
    spawn_local(async move {
        match api::upload_file(&file).await {
            Ok(outcome) => link.send_message(Msg::UploadFinished(outcome)),
            Err(e) => link.send_message(Msg::SetError(Some(e))),
        }
    });
}

/// Every call fetches a fresh snapshot; nothing is merged with the previous one.
pub fn request_history(ctx: &Context<Model>) {
    let link = ctx.link().clone();
    spawn_local(async move {
        let view = api::fetch_history()
            .await
            .unwrap_or_else(|message| HistoryView::Failed { message });
        link.send_message(Msg::HistoryLoaded(view));
    });
}
