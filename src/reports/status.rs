use axum::extract::{Form, Path, State};
use axum_extra::extract::PrivateCookieJar;
use serde::Deserialize;

use crate::{
    flash,
    permission::IsContractor,
    reports::{Report, StatusUpdate},
    state::AppState,
    util_resp::{StandardResponse, flash_redirect_ok},
};

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct StatusForm {
    new_status: String,
}

pub async fn do_update_report_status(
    Path(report_id): Path<String>,
    contractor: IsContractor,
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<StatusForm>,
) -> StandardResponse {
    let new_status = form.new_status.trim();
    if new_status.is_empty() {
        return flash_redirect_ok(
            jar,
            "/contractor_dashboard",
            "Please enter a status.",
        );
    }

    let update = Report::update_status(
        &state.store,
        &contractor.name,
        &report_id,
        new_status,
    )?;

    let msg = match update {
        StatusUpdate::Updated => {
            format!(
                "Report {} status updated to {}.",
                flash::excerpt(&report_id),
                flash::excerpt(new_status)
            )
        }
        StatusUpdate::NotFound => {
            format!("Error: Report {} not found.", flash::excerpt(&report_id))
        }
    };
    flash_redirect_ok(jar, "/contractor_dashboard", msg)
}
