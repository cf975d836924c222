use axum::extract::{Multipart, State};
use axum_extra::extract::PrivateCookieJar;
use hypertext::{maud, prelude::*};

use crate::{
    flash,
    permission::IsCitizen,
    reports::{NewReport, Photo, Report, SubmitError},
    state::AppState,
    template::Page,
    util_resp::{
        FailureResponse, StandardResponse, flash_redirect_ok, success,
    },
};

pub struct ReportTable<'a> {
    pub reports: &'a [Report],
    /// Show the username of the reporter (contractors see everyone's reports).
    pub show_reporter: bool,
}

impl Renderable for ReportTable<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            @if self.reports.is_empty() {
                p class="text-muted" { "No reports yet." }
            } @else {
                div class="table-responsive" {
                    table class="table table-striped align-middle" {
                        thead {
                            tr {
                                th scope="col" { "Report" }
                                @if self.show_reporter {
                                    th scope="col" { "Reporter" }
                                }
                                th scope="col" { "Tender" }
                                th scope="col" { "Location" }
                                th scope="col" { "Description" }
                                th scope="col" { "Photo" }
                                th scope="col" { "Status" }
                            }
                        }
                        tbody {
                            @for report in self.reports {
                                tr {
                                    td { (report.report_id) }
                                    @if self.show_reporter {
                                        td { (report.username) }
                                    }
                                    td { (report.tender_id) }
                                    td { (report.location) }
                                    td { (report.description) }
                                    td {
                                        @if !report.photo.is_empty() {
                                            a href=(format!("/static/{}", report.photo)) {
                                                img src=(format!("/static/{}", report.photo))
                                                    alt=(format!("Photo for {}", report.report_id))
                                                    style="max-height: 80px;";
                                            }
                                        }
                                    }
                                    td { (report.status) }
                                }
                            }
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}

struct ReportContent<'a> {
    reports: &'a [Report],
}

impl Renderable for ReportContent<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            h1 { "Report an issue" }
            form method="post" enctype="multipart/form-data" class="mb-5" {
                div class="mb-3" {
                    label for="tender_id" class="form-label" { "Tender ID" }
                    input type="text" class="form-control" id="tender_id" name="tender_id" required;
                }
                div class="mb-3" {
                    label for="location" class="form-label" { "Location" }
                    input type="text" class="form-control" id="location" name="location" required;
                }
                div class="mb-3" {
                    label for="description" class="form-label" { "Description" }
                    textarea class="form-control" id="description" name="description" rows="3" required {}
                }
                div class="mb-3" {
                    label for="photo" class="form-label" { "Photo" }
                    input type="file" class="form-control" id="photo" name="photo" accept="image/*" required;
                }
                button type="submit" class="btn btn-primary" { "Submit report" }
            }
            h2 { "My reports" }
            ReportTable reports=(self.reports) show_reporter=(false);
        }
        .render_to(buffer);
    }
}

pub async fn report_page(
    IsCitizen(identity): IsCitizen,
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> StandardResponse {
    let reports = Report::list_by_user(&state.store, &identity.username);
    let (jar, flashes) = flash::take(jar);

    success(
        jar,
        Page::new()
            .title("Report an issue")
            .identity(identity)
            .flashes(flashes)
            .body(ReportContent { reports: &reports })
            .render(),
    )
}

async fn read_report_form(
    mut multipart: Multipart,
) -> Result<(NewReport, Option<Photo>), String> {
    let mut form = NewReport::default();
    let mut photo = None;

    while let Some(field) =
        multipart.next_field().await.map_err(|e| e.to_string())?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| e.to_string())?;
                if !file_name.is_empty() {
                    photo = Some(Photo::new(file_name, data.to_vec()));
                }
            }
            "tender_id" => {
                form.tender_id = field.text().await.map_err(|e| e.to_string())?
            }
            "location" => {
                form.location = field.text().await.map_err(|e| e.to_string())?
            }
            "description" => {
                form.description =
                    field.text().await.map_err(|e| e.to_string())?
            }
            _ => {}
        }
    }

    Ok((form, photo))
}

pub async fn do_submit_report(
    IsCitizen(identity): IsCitizen,
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    multipart: Multipart,
) -> StandardResponse {
    let (form, photo) = match read_report_form(multipart).await {
        Ok(read) => read,
        Err(e) => {
            tracing::info!(error = %e, "unreadable report upload");
            return flash_redirect_ok(
                jar,
                "/report",
                "Your upload could not be read. Please try again.",
            );
        }
    };

    let res = Report::submit(
        &state.store,
        &state.config.upload_dir(),
        &identity.username,
        form,
        photo,
    );

    match res {
        Ok(report) => flash_redirect_ok(
            jar,
            "/report",
            format!("Report {} submitted successfully.", report.report_id),
        ),
        Err(SubmitError::MissingFields) => flash_redirect_ok(
            jar,
            "/report",
            "Please fill tender id, location and description.",
        ),
        Err(SubmitError::MissingPhoto) => {
            flash_redirect_ok(jar, "/report", "Photo is mandatory.")
        }
        Err(SubmitError::UnknownTender(id)) => flash_redirect_ok(
            jar,
            "/report",
            format!("There is no tender with id {}.", flash::excerpt(&id)),
        ),
        Err(SubmitError::Photo(e)) => {
            tracing::error!(error = %e, "could not save uploaded photo");
            Err(FailureResponse::ServerError(()))
        }
        Err(SubmitError::Store(e)) => Err(e.into()),
    }
}
