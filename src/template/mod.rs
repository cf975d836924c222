//! Templating code.
//!
//! This defines the [`Page`] item, which every HTML handler in this crate
//! uses to wrap its body in the shared layout (navigation bar and flash
//! messages).

use hypertext::prelude::*;

use crate::{
    auth::{Identity, Role},
    widgets::alert::FlashMessages,
};

pub struct Page<R: Renderable> {
    title: &'static str,
    body: Option<R>,
    identity: Option<Identity>,
    flashes: Vec<String>,
}

impl<R: Renderable> Page<R> {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn title(mut self, title: &'static str) -> Self {
        self.title = title;
        self
    }

    pub fn body(mut self, body: R) -> Self {
        self.body = Some(body);
        self
    }

    pub fn identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn flashes(mut self, flashes: Vec<String>) -> Self {
        self.flashes = flashes;
        self
    }
}

impl<R: Renderable> Renderable for Page<R> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            html {
                head {
                    title { (self.title) " | Roadwatch" }
                    link
                        href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css"
                        rel="stylesheet"
                        crossorigin="anonymous";
                    meta
                        name="viewport"
                        content="width=device-width, initial-scale=1";
                }
                body class="d-flex flex-column vh-100" {
                    nav class="navbar navbar-expand"
                        style="background-color: #2f4858;"
                        data-bs-theme="dark" {
                        div class="container-fluid" {
                            a class="navbar-brand text-white" href="/dashboard" {
                                "Roadwatch"
                            }
                            ul class="navbar-nav" style="display: flex; gap: 1rem;" {
                                @if let Some(identity) = &self.identity {
                                    @if identity.role == Role::Citizen {
                                        li class="nav-item" {
                                            a class="nav-link text-white" href="/tenders" { "Tenders" }
                                        }
                                        li class="nav-item" {
                                            a class="nav-link text-white" href="/report" { "Report an issue" }
                                        }
                                        li class="nav-item" {
                                            a class="nav-link text-white" href="/feedback" { "Feedback" }
                                        }
                                    } @else {
                                        li class="nav-item" {
                                            a class="nav-link text-white" href="/contractor_dashboard" { "My tenders" }
                                        }
                                        li class="nav-item" {
                                            a class="nav-link text-white" href="/tenders" { "All tenders" }
                                        }
                                    }
                                    li class="nav-item" {
                                        span class="nav-link text-white-50" { (identity.username) }
                                    }
                                    li class="nav-item" {
                                        a class="nav-link text-white" href="/logout" { "Logout" }
                                    }
                                } @else {
                                    li class="nav-item" {
                                        a class="nav-link text-white" href="/login" { "Login" }
                                    }
                                    li class="nav-item" {
                                        a class="nav-link text-white" href="/register" { "Register" }
                                    }
                                    li class="nav-item" {
                                        a class="nav-link text-white" href="/contractor_register" { "Contractor sign-up" }
                                    }
                                }
                            }
                        }
                    }
                    div class="container py-4 flex-grow-1" {
                        FlashMessages messages=(&self.flashes);
                        @if let Some(body) = &self.body {
                            (body)
                        }
                    }
                }
            }
        }.render_to(buffer)
    }
}

impl<R: Renderable> Default for Page<R> {
    fn default() -> Self {
        Self {
            title: "Roadwatch",
            body: Default::default(),
            identity: Default::default(),
            flashes: Default::default(),
        }
    }
}
