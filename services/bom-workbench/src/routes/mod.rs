use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::{handlers::*, state::AppState};

pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .nest("/boms", bom_routes())
        .route("/quotations", get(list_quotations).post(save_quotation))
        .route("/quotations/:id", get(get_quotation).delete(delete_quotation))
        .route("/smtp-config", get(get_smtp_settings).put(save_smtp_settings))
}

fn bom_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_boms).post(create_bom))
        .route("/:bom_id", get(get_bom))
        .route("/:bom_id/parts", post(add_part))
        .route("/:bom_id/parts/:part_id", patch(update_part).delete(delete_part))
        .route(
            "/:bom_id/revision",
            get(get_revision).post(begin_revision).delete(cancel_revision),
        )
        .route("/:bom_id/revision/cells", put(edit_revision_cell))
        .route("/:bom_id/revision/save", post(save_revision))
        .route("/:bom_id/revision/confirm", post(confirm_revision))
        .route("/:bom_id/revision/back", post(back_to_editing))
        .route("/:bom_id/imports", post(inspect_import))
        .route("/:bom_id/imports/:sheet_id", axum::routing::delete(discard_import))
        .route("/:bom_id/imports/:sheet_id/preview", post(preview_import))
        .route("/:bom_id/imports/:sheet_id/commit", post(commit_import))
        .route("/:bom_id/export", get(export_bom))
        .route("/:bom_id/report", get(bom_report))
}
