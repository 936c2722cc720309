//! Server-side rendering of a widget instance into an HTML fragment.
//!
//! Rendering returns the client bootstrap data alongside the markup instead
//! of stashing it for a later hook; whoever emits the page decides where the
//! bootstrap goes. The fragment also carries it as an escaped
//! `data-bootstrap` attribute for `assets/quotes-widget.js`.

use serde::{Deserialize, Serialize};
use tera::{Context, Tera};

use crate::error::CoreError;
use crate::i18n::WidgetStrings;
use crate::quote::DisplayQuote;
use crate::selection::{QuoteOrder, QuoteSelection};
use crate::settings::WidgetSettings;
use crate::types::DbId;

const QUOTE_TEMPLATE: &str = include_str!("../templates/quote.html");
const NO_QUOTE_TEMPLATE: &str = include_str!("../templates/no_quote.html");

/// Per-request inputs that do not come from the stored settings.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Absolute URL of the refresh endpoint.
    pub ajax_url: String,
    /// Anti-forgery token for the refresh endpoint.
    pub nonce: String,
    pub locale: String,
}

/// Everything the client refresh controller needs for one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientBootstrap {
    pub widget_id: String,
    /// `widget_id` usable as a script identifier (`-` replaced by `_`).
    pub script_id: String,
    pub ajax_url: String,
    pub nonce: String,
    pub ajax_refresh: bool,
    pub auto_refresh: bool,
    pub refresh_interval: u32,
    pub current_page: u64,
    pub nb_pages: u64,
    pub current_quote_id: DbId,
    pub char_limit: u32,
    /// Comma-joined tag ids of the instance filter.
    pub tags: String,
    pub order_by: QuoteOrder,
    pub strings: WidgetStrings,
}

/// A rendered fragment plus the bootstrap data for its refresh controller.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedWidget {
    pub html: String,
    /// `None` when no quote was available.
    pub bootstrap: Option<ClientBootstrap>,
}

#[derive(Serialize)]
struct QuoteView<'a> {
    widget_id: &'a str,
    title: &'a str,
    quote: &'a DisplayQuote,
    show_author: bool,
    show_source: bool,
    ajax_refresh: bool,
    strings: &'a WidgetStrings,
    bootstrap_json: String,
}

#[derive(Serialize)]
struct EmptyView<'a> {
    widget_id: &'a str,
    title: &'a str,
    strings: &'a WidgetStrings,
}

/// Compiled widget templates. Build once and share.
pub struct WidgetRenderer {
    tera: Tera,
}

impl WidgetRenderer {
    pub fn new() -> Result<Self, CoreError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("quote.html", QUOTE_TEMPLATE),
            ("no_quote.html", NO_QUOTE_TEMPLATE),
        ])
        .map_err(|e| CoreError::Internal(format!("widget templates: {e}")))?;
        Ok(Self { tera })
    }

    /// Render `settings` with the selected quote, or the "no quote
    /// available" fragment when `selection` is `None`.
    pub fn render(
        &self,
        settings: &WidgetSettings,
        selection: Option<&QuoteSelection>,
        ctx: &RenderContext,
    ) -> Result<RenderedWidget, CoreError> {
        let strings = WidgetStrings::for_locale(&ctx.locale);

        let Some(selection) = selection else {
            let view = EmptyView {
                widget_id: &settings.widget_id,
                title: &settings.title,
                strings: &strings,
            };
            let html = self.fill("no_quote.html", &view)?;
            return Ok(RenderedWidget {
                html,
                bootstrap: None,
            });
        };

        let bootstrap = ClientBootstrap {
            widget_id: settings.widget_id.clone(),
            script_id: settings.widget_id.replace('-', "_"),
            ajax_url: ctx.ajax_url.clone(),
            nonce: ctx.nonce.clone(),
            ajax_refresh: settings.ajax_refresh,
            auto_refresh: settings.auto_refresh,
            refresh_interval: settings.refresh_interval,
            current_page: selection.current_page,
            nb_pages: selection.total_pages,
            current_quote_id: selection.quote.id,
            char_limit: settings.char_limit,
            tags: settings
                .tags
                .iter()
                .map(DbId::to_string)
                .collect::<Vec<_>>()
                .join(","),
            order_by: settings.order(),
            strings: strings.clone(),
        };
        let bootstrap_json = serde_json::to_string(&bootstrap)
            .map_err(|e| CoreError::Internal(format!("bootstrap encoding: {e}")))?;

        let view = QuoteView {
            widget_id: &settings.widget_id,
            title: &settings.title,
            quote: &selection.quote,
            show_author: settings.show_author,
            show_source: settings.show_source,
            ajax_refresh: settings.ajax_refresh,
            strings: &strings,
            bootstrap_json,
        };
        let html = self.fill("quote.html", &view)?;

        Ok(RenderedWidget {
            html,
            bootstrap: Some(bootstrap),
        })
    }

    fn fill(&self, template: &str, view: &impl Serialize) -> Result<String, CoreError> {
        let context = Context::from_serialize(view)
            .map_err(|e| CoreError::Internal(format!("template context: {e}")))?;
        self.tera
            .render(template, &context)
            .map_err(|e| CoreError::Internal(format!("rendering {template}: {e}")))
    }
}
