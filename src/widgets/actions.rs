use hypertext::prelude::*;

pub struct Action<'r> {
    pub href: &'r str,
    pub label: &'r str,
    pub primary: bool,
}

/// A row of link buttons.
pub struct Actions<'r> {
    pub options: &'r [Action<'r>],
}

impl Renderable for Actions<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div class="row mt-3 mb-3" {
                @for action in self.options {
                    div class="col-md-auto" {
                        a class=(if action.primary { "btn btn-primary" } else { "btn btn-outline-secondary" })
                            href=(action.href) {
                            (action.label)
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}
