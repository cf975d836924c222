use hypertext::prelude::*;

pub struct ErrorAlert<S> {
    pub msg: S,
}

impl<S: ToString> Renderable for ErrorAlert<S> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud!({
            div class="alert alert-danger" role="alert" {
                (self.msg.to_string())
            }
        })
        .render_to(buffer);
    }
}

/// Messages queued by the previous request (see [`crate::flash`]).
pub struct FlashMessages<'a> {
    pub messages: &'a [String],
}

impl Renderable for FlashMessages<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            @for msg in self.messages {
                div class="alert alert-info" role="alert" {
                    (msg)
                }
            }
        }
        .render_to(buffer);
    }
}
