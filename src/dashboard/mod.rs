//! Landing pages shown after login, one per role.

use axum::{extract::State, response::Redirect};
use axum_extra::extract::PrivateCookieJar;
use hypertext::prelude::*;

use crate::{
    auth::{Identity, Role},
    feedback::{Rating, submit::FeedbackTable},
    flash,
    permission::IsContractor,
    reports::Report,
    state::AppState,
    template::Page,
    tenders::{Tender, view::TenderTable},
    util_resp::{StandardResponse, see_other_ok, success},
    widgets::actions::{Action, Actions},
};

struct Stat<'a> {
    label: &'a str,
    value: usize,
}

impl Renderable for Stat<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div class="col-md-4" {
                div class="card text-center mb-3" {
                    div class="card-body" {
                        h2 class="card-title" { (self.value) }
                        p class="card-text text-muted" { (self.label) }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}

pub async fn dashboard(
    identity: Identity,
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> StandardResponse {
    if identity.role == Role::Contractor {
        return see_other_ok(jar, Redirect::to("/contractor_dashboard"));
    }

    let tenders = Tender::list(&state.store, None).len();
    let reports = Report::list_by_user(&state.store, &identity.username).len();
    let ratings = Rating::list(&state.store).len();
    let (jar, flashes) = flash::take(jar);
    let username = identity.username.clone();

    let actions = [
        Action {
            href: "/tenders",
            label: "Browse tenders",
            primary: true,
        },
        Action {
            href: "/report",
            label: "Report an issue",
            primary: false,
        },
        Action {
            href: "/feedback",
            label: "Leave feedback",
            primary: false,
        },
    ];

    success(
        jar,
        Page::new()
            .title("Dashboard")
            .flashes(flashes)
            .body(maud! {
                h1 { "Welcome, " (username) }
                div class="row mt-4" {
                    Stat label="Tenders" value=(tenders);
                    Stat label="My reports" value=(reports);
                    Stat label="Feedback entries" value=(ratings);
                }
                Actions options=(&actions);
            })
            .identity(identity)
            .render(),
    )
}

struct StatusTable<'a> {
    reports: &'a [Report],
}

impl Renderable for StatusTable<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            @if self.reports.is_empty() {
                p class="text-muted" { "No reports on your tenders." }
            } @else {
                div class="table-responsive" {
                    table class="table table-striped align-middle" {
                        thead {
                            tr {
                                th scope="col" { "Report" }
                                th scope="col" { "Reporter" }
                                th scope="col" { "Tender" }
                                th scope="col" { "Location" }
                                th scope="col" { "Description" }
                                th scope="col" { "Photo" }
                                th scope="col" { "Status" }
                                th scope="col" { "Update" }
                            }
                        }
                        tbody {
                            @for report in self.reports {
                                tr {
                                    td { (report.report_id) }
                                    td { (report.username) }
                                    td { (report.tender_id) }
                                    td { (report.location) }
                                    td { (report.description) }
                                    td {
                                        @if !report.photo.is_empty() {
                                            a href=(format!("/static/{}", report.photo)) { "View" }
                                        }
                                    }
                                    td { (report.status) }
                                    td {
                                        form method="post"
                                            action=(format!("/update_report_status/{}", report.report_id))
                                            class="d-flex gap-2" {
                                            input type="text" class="form-control form-control-sm"
                                                name="new_status" placeholder="e.g. Resolved" required;
                                            button type="submit" class="btn btn-sm btn-primary" { "Save" }
                                        }
                                    }
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

pub async fn contractor_dashboard(
    contractor: IsContractor,
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> StandardResponse {
    let tenders = Tender::for_contractor(&state.store, &contractor.name);
    let reports = Report::for_contractor(&state.store, &contractor.name);
    let ratings = Rating::for_contractor(&state.store, &contractor.name);
    let (jar, flashes) = flash::take(jar);

    success(
        jar,
        Page::new()
            .title("Contractor dashboard")
            .flashes(flashes)
            .body(maud! {
                h1 { (contractor.name) }
                h2 class="mt-4" { "Your tenders" }
                TenderTable tenders=(&tenders);
                h2 class="mt-4" { "Reports on your tenders" }
                StatusTable reports=(&reports);
                h2 class="mt-4" { "Feedback on your tenders" }
                FeedbackTable ratings=(&ratings);
            })
            .identity(contractor.identity)
            .render(),
    )
}
