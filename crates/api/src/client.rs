//! Refresh client and rotation driver.
//!
//! [`RefreshClient`] speaks the refresh endpoint's form protocol on behalf of
//! one rendered widget. [`run_rotation`] drives a
//! [`RefreshController`](quotes_core::controller::RefreshController) with
//! tokio timers: visitor clicks arrive on a channel, cancelling the token
//! removes the widget.

use std::future::Future;
use std::pin::Pin;

use quotes_core::controller::{ControllerCommand, ControllerEvent, Phase, RefreshController};
use quotes_core::refresh::QuoteResponse;
use quotes_core::render::ClientBootstrap;
use quotes_core::selection::RefreshCursor;
use quotes_core::tokens::REFRESH_ACTION;
use reqwest::StatusCode;
use tokio::sync::mpsc;
use tokio::time::Sleep;
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("refresh request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("refresh rejected with status {0}")]
    Rejected(StatusCode),

    #[error("unexpected refresh response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// What the endpoint answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshReply {
    Quote(QuoteResponse),
    NoMore,
}

/// Sends refresh requests for one rendered widget.
#[derive(Debug, Clone)]
pub struct RefreshClient {
    http: reqwest::Client,
    bootstrap: ClientBootstrap,
}

impl RefreshClient {
    pub fn new(http: reqwest::Client, bootstrap: ClientBootstrap) -> Self {
        Self { http, bootstrap }
    }

    pub fn bootstrap(&self) -> &ClientBootstrap {
        &self.bootstrap
    }

    /// Ask for the quote following `cursor`.
    pub async fn refresh(&self, cursor: RefreshCursor) -> Result<RefreshReply, ClientError> {
        let boot = &self.bootstrap;
        let form = [
            ("action", REFRESH_ACTION.to_string()),
            ("_ajax_nonce", boot.nonce.clone()),
            ("widget_id", boot.widget_id.clone()),
            ("current", optional(cursor.current_quote_id)),
            ("current_page", optional(cursor.current_page)),
            ("char_limit", boot.char_limit.to_string()),
            ("tags", boot.tags.clone()),
            ("orderby", boot.order_by.as_param().to_string()),
        ];

        let response = self.http.post(&boot.ajax_url).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Rejected(status));
        }

        let body: serde_json::Value = response.json().await?;
        parse_reply(body)
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// `false`, `null`, `0` and `-1` all mean "nothing further".
fn parse_reply(body: serde_json::Value) -> Result<RefreshReply, ClientError> {
    use serde_json::Value;

    match body {
        Value::Bool(false) | Value::Null => Ok(RefreshReply::NoMore),
        Value::Number(n) if matches!(n.as_i64(), Some(0 | -1)) => Ok(RefreshReply::NoMore),
        Value::String(s) if matches!(s.as_str(), "" | "0" | "-1" | "false") => {
            Ok(RefreshReply::NoMore)
        }
        other => Ok(RefreshReply::Quote(serde_json::from_value(other)?)),
    }
}

// ---------------------------------------------------------------------------
// Rotation driver
// ---------------------------------------------------------------------------

/// Where the driver shows things.
pub trait WidgetView: Send {
    fn show_loading(&mut self);
    fn display(&mut self, quote: &QuoteResponse);
    fn show_retry(&mut self);
}

type InFlight<'a> = Pin<Box<dyn Future<Output = Result<RefreshReply, ClientError>> + Send + 'a>>;

enum Wake {
    Removed,
    Completed(Result<RefreshReply, ClientError>),
    Trigger,
    Timer,
}

/// Run the refresh cycle for one widget until `cancel` fires.
///
/// Each message on `triggers` is a "next quote" click. Clicks and timer
/// ticks that arrive while a request is in flight are ignored.
pub async fn run_rotation<V: WidgetView>(
    client: &RefreshClient,
    view: &mut V,
    mut triggers: mpsc::Receiver<()>,
    cancel: CancellationToken,
) {
    let widget_id = client.bootstrap().widget_id.clone();
    let mut controller = RefreshController::from_bootstrap(client.bootstrap());
    let mut timer: Option<Pin<Box<Sleep>>> = None;
    let mut in_flight: Option<InFlight<'_>> = None;
    let mut commands = controller.start();

    loop {
        for command in commands.drain(..) {
            match command {
                ControllerCommand::ShowLoading => view.show_loading(),
                ControllerCommand::Dispatch(cursor) => {
                    in_flight = Some(Box::pin(client.refresh(cursor)));
                }
                ControllerCommand::Display(quote) => view.display(&quote),
                ControllerCommand::ShowRetry => view.show_retry(),
                ControllerCommand::ArmTimer(interval) => {
                    timer = Some(Box::pin(tokio::time::sleep(interval)));
                }
                ControllerCommand::CancelTimer => timer = None,
            }
        }

        if controller.phase() == Phase::Removed {
            break;
        }

        let wake = tokio::select! {
            () = cancel.cancelled() => Wake::Removed,
            result = wait_in_flight(&mut in_flight) => Wake::Completed(result),
            Some(()) = triggers.recv() => Wake::Trigger,
            () = wait_timer(&mut timer) => Wake::Timer,
        };

        let event = match wake {
            Wake::Removed => ControllerEvent::Removed,
            Wake::Trigger => ControllerEvent::NextRequested,
            Wake::Timer => {
                timer = None;
                ControllerEvent::TimerFired
            }
            Wake::Completed(result) => {
                in_flight = None;
                match result {
                    Ok(RefreshReply::Quote(quote)) => ControllerEvent::Succeeded(quote),
                    Ok(RefreshReply::NoMore) => ControllerEvent::NoMore,
                    Err(e) => {
                        tracing::warn!(widget_id = %widget_id, error = %e, "Quote refresh failed");
                        ControllerEvent::Failed(e.to_string())
                    }
                }
            }
        };

        commands = controller.handle(event);
    }

    tracing::debug!(widget_id = %widget_id, "Rotation stopped");
}

async fn wait_in_flight(
    in_flight: &mut Option<InFlight<'_>>,
) -> Result<RefreshReply, ClientError> {
    match in_flight {
        Some(request) => request.as_mut().await,
        None => std::future::pending().await,
    }
}

async fn wait_timer(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}
