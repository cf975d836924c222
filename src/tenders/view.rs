use axum::extract::{Form, State};
use axum_extra::extract::PrivateCookieJar;
use hypertext::{maud, prelude::*};
use serde::Deserialize;

use crate::{
    auth::Identity,
    flash,
    state::AppState,
    template::Page,
    tenders::{Tender, TenderFilter},
    util_resp::{StandardResponse, success},
};

pub struct TenderTable<'a> {
    pub tenders: &'a [Tender],
}

impl Renderable for TenderTable<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            @if self.tenders.is_empty() {
                p class="text-muted" { "No tenders found." }
            } @else {
                div class="table-responsive" {
                    table class="table table-striped" {
                        thead {
                            tr {
                                th scope="col" { "ID" }
                                th scope="col" { "Road" }
                                th scope="col" { "Contractor" }
                                th scope="col" { "Funds allocated" }
                                th scope="col" { "Start" }
                                th scope="col" { "End" }
                                th scope="col" { "Warranty" }
                                th scope="col" { "Status" }
                            }
                        }
                        tbody {
                            @for tender in self.tenders {
                                tr {
                                    td { (tender.id) }
                                    td { (tender.road_name) }
                                    td { (tender.contractor_name) }
                                    td { (tender.fund_allocated) }
                                    td { (tender.start_date) }
                                    td { (tender.end_date) }
                                    td { (tender.warranty_period) }
                                    td { (tender.status) }
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

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct TenderFilterForm {
    filter_type: String,
    filter_value: String,
}

struct TendersContent<'a> {
    tenders: &'a [Tender],
    form: &'a TenderFilterForm,
}

impl Renderable for TendersContent<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let kinds = [
            ("status", "Status"),
            ("road_name", "Road name"),
            ("contractor", "Contractor"),
        ];

        maud! {
            h1 { "Tenders" }
            form method="post" class="row g-2 mb-4" {
                div class="col-md-3" {
                    select class="form-select" name="filter_type" {
                        option value="" { "Filter by..." }
                        @for (value, label) in kinds {
                            @if self.form.filter_type == value {
                                option value=(value) selected { (label) }
                            } @else {
                                option value=(value) { (label) }
                            }
                        }
                    }
                }
                div class="col-md-6" {
                    input type="text"
                        class="form-control"
                        name="filter_value"
                        placeholder="e.g. Completed"
                        value=(self.form.filter_value);
                }
                div class="col-md-auto" {
                    button type="submit" class="btn btn-primary" { "Filter" }
                }
                div class="col-md-auto" {
                    a class="btn btn-outline-secondary" href="/tenders" { "Clear" }
                }
            }
            TenderTable tenders=(self.tenders);
        }
        .render_to(buffer);
    }
}

fn render_tenders(
    identity: Identity,
    state: &AppState,
    jar: PrivateCookieJar,
    form: TenderFilterForm,
) -> StandardResponse {
    let filter = TenderFilter::parse(&form.filter_type, &form.filter_value);
    let tenders = Tender::list(&state.store, filter.as_ref());
    let (jar, flashes) = flash::take(jar);

    success(
        jar,
        Page::new()
            .title("Tenders")
            .identity(identity)
            .flashes(flashes)
            .body(TendersContent {
                tenders: &tenders,
                form: &form,
            })
            .render(),
    )
}

pub async fn tenders_page(
    identity: Identity,
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> StandardResponse {
    render_tenders(identity, &state, jar, TenderFilterForm::default())
}

pub async fn do_filter_tenders(
    identity: Identity,
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<TenderFilterForm>,
) -> StandardResponse {
    render_tenders(identity, &state, jar, form)
}
