//! Parametrized tests — one templated declaration expanded into many
//! independent concrete test cases.

use crate::builder::{BuildError, GroupBuilder};
use crate::tree::Mode;
use std::fmt::Display;
use std::rc::Rc;

/// Builder returned by [`GroupBuilder::parametrized`]. Holds the template
/// and body until the parameter values arrive via [`provided`](Self::provided).
///
/// Dropping the builder without supplying parameters records an
/// [`UnsetParameters`](BuildError::UnsetParameters) error, which fails the
/// whole build.
pub struct ParamsBuilder<'a, 'b, P: Display + 'static> {
    ctx: &'a mut GroupBuilder<'b>,
    template: String,
    body: Option<Rc<dyn Fn(&P)>>,
}

impl<'a, 'b, P: Display + 'static> ParamsBuilder<'a, 'b, P> {
    pub(crate) fn new(ctx: &'a mut GroupBuilder<'b>, template: &str, body: Rc<dyn Fn(&P)>) -> Self {
        ParamsBuilder {
            ctx,
            template: template.to_string(),
            body: Some(body),
        }
    }

    /// Expand the template into one regular test case per parameter value,
    /// in the given order. Each case owns its value and closes over a
    /// shared body, so one case's failure cannot affect its siblings.
    pub fn provided(mut self, params: impl IntoIterator<Item = P>) {
        let body = match self.body.take() {
            Some(body) => body,
            None => return,
        };
        for value in params {
            let description = expand_template(&self.template, &value);
            let body = Rc::clone(&body);
            self.ctx.push_case(
                Mode::Regular,
                description,
                Box::new(move || body(&value)),
                None,
            );
        }
    }
}

impl<P: Display + 'static> Drop for ParamsBuilder<'_, '_, P> {
    fn drop(&mut self) {
        if self.body.is_some() {
            self.ctx
                .state
                .errors
                .push(BuildError::UnsetParameters {
                    description: std::mem::take(&mut self.template),
                });
        }
    }
}

/// Substitute the `%1` placeholder with the value's display form. A
/// template without the placeholder is used verbatim for every case.
fn expand_template(template: &str, value: &impl Display) -> String {
    if !template.contains("%1") {
        return template.to_string();
    }
    template.replace("%1", &value.to_string())
}
