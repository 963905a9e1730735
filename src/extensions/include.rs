// ABOUTME: The include helper: renders another template found through the environment's loader
// ABOUTME: Lets views pull in partials by plain name or by "module::path" namespace

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, RenderError,
};
use std::cell::Cell;

use super::Extension;
use crate::loader::SharedLoader;

/// Nested includes deeper than this abort the render.
pub const MAX_INCLUDE_DEPTH: usize = 32;

thread_local! {
    // Nested renders run on the calling thread, so depth is per render.
    static INCLUDE_DEPTH: Cell<usize> = Cell::new(0);
}

pub struct IncludeExtension {
    loader: SharedLoader,
}

impl IncludeExtension {
    pub const NAME: &'static str = "include";

    pub fn new(loader: SharedLoader) -> Self {
        Self { loader }
    }
}

impl Extension for IncludeExtension {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn register(&self, handlebars: &mut Handlebars<'static>) {
        handlebars.register_helper(
            Self::NAME,
            Box::new(IncludeHelper {
                loader: self.loader.clone(),
            }),
        );
    }
}

struct IncludeHelper {
    loader: SharedLoader,
}

struct DepthGuard;

impl DepthGuard {
    fn enter() -> (Self, usize) {
        let depth = INCLUDE_DEPTH.with(|d| {
            d.set(d.get() + 1);
            d.get()
        });
        (DepthGuard, depth)
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        INCLUDE_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

impl HelperDef for IncludeHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let name = h
            .param(0)
            .and_then(|v| v.value().as_str())
            .ok_or_else(|| RenderError::new("include helper requires a template name"))?;

        let (_guard, depth) = DepthGuard::enter();
        if depth > MAX_INCLUDE_DEPTH {
            return Err(RenderError::new(format!(
                "Maximum include depth of {} reached while including \"{}\"",
                MAX_INCLUDE_DEPTH, name
            )));
        }

        let source = self
            .loader
            .get_source(name)
            .map_err(|e| RenderError::new(e.to_string()))?;

        // The current block value (an `each` item, say) overrides root data; explicit vars override both.
        let mut data = ctx.data().clone();
        let current = rc.evaluate(ctx, "this")?;
        if let (Some(map), Some(block)) = (data.as_object_mut(), current.as_json().as_object()) {
            map.extend(block.clone());
        }
        if let Some(extra) = h.param(1).and_then(|v| v.value().as_object()) {
            if let Some(map) = data.as_object_mut() {
                map.extend(extra.clone());
            }
        }

        let rendered = r.render_template(&source, &data)?;
        out.write(&rendered)?;
        Ok(())
    }
}
