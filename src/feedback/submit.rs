use axum::extract::{Form, State};
use axum_extra::extract::PrivateCookieJar;
use hypertext::{maud, prelude::*};

use crate::{
    feedback::{FeedbackError, NewFeedback, Rating},
    flash,
    permission::IsCitizen,
    state::AppState,
    template::Page,
    util_resp::{StandardResponse, flash_redirect_ok, success},
};

pub struct FeedbackTable<'a> {
    pub ratings: &'a [Rating],
}

impl Renderable for FeedbackTable<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            @if self.ratings.is_empty() {
                p class="text-muted" { "No feedback yet." }
            } @else {
                div class="table-responsive" {
                    table class="table table-striped" {
                        thead {
                            tr {
                                th scope="col" { "ID" }
                                th scope="col" { "Citizen" }
                                th scope="col" { "Tender" }
                                th scope="col" { "Feedback" }
                            }
                        }
                        tbody {
                            @for rating in self.ratings {
                                tr {
                                    td { (rating.rating_id) }
                                    td { (rating.username) }
                                    td { (rating.tender_id) }
                                    td { (rating.feedback) }
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

pub async fn feedback_page(
    IsCitizen(identity): IsCitizen,
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> StandardResponse {
    let ratings = Rating::list(&state.store);
    let (jar, flashes) = flash::take(jar);

    success(
        jar,
        Page::new()
            .title("Feedback")
            .identity(identity)
            .flashes(flashes)
            .body(maud! {
                h1 { "Feedback" }
                form method="post" class="mb-5" {
                    div class="mb-3" {
                        label for="tender_id" class="form-label" { "Tender ID" }
                        input type="text" class="form-control" id="tender_id" name="tender_id" required;
                    }
                    div class="mb-3" {
                        label for="feedback" class="form-label" { "Your feedback" }
                        textarea class="form-control" id="feedback" name="feedback" rows="3" required {}
                    }
                    button type="submit" class="btn btn-primary" { "Submit feedback" }
                }
                h2 { "All feedback" }
                FeedbackTable ratings=(&ratings);
            })
            .render(),
    )
}

pub async fn do_submit_feedback(
    IsCitizen(identity): IsCitizen,
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Form(form): Form<NewFeedback>,
) -> StandardResponse {
    match Rating::submit(&state.store, &identity.username, form) {
        Ok(_) => flash_redirect_ok(jar, "/feedback", "Feedback saved."),
        Err(FeedbackError::MissingFields) => flash_redirect_ok(
            jar,
            "/feedback",
            "Please enter tender id and feedback.",
        ),
        Err(FeedbackError::UnknownTender(id)) => flash_redirect_ok(
            jar,
            "/feedback",
            format!("There is no tender with id {}.", flash::excerpt(&id)),
        ),
        Err(FeedbackError::Store(e)) => Err(e.into()),
    }
}
