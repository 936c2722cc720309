//! Client-side refresh state machine for one widget instance.
//!
//! The controller performs no I/O. Callers feed it [`ControllerEvent`]s and
//! execute the [`ControllerCommand`]s it returns: show a placeholder, send
//! a refresh request, swap the displayed quote, arm or cancel the timer.
//! `quotes_api::client` drives it with tokio; `assets/quotes-widget.js`
//! mirrors the same transitions in the browser.

use std::time::Duration;

use crate::refresh::QuoteResponse;
use crate::render::ClientBootstrap;
use crate::selection::RefreshCursor;

/// Per-instance behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Manual "next quote" control is enabled.
    pub ajax_refresh: bool,
    /// Timed rotation is enabled.
    pub auto_refresh: bool,
    pub refresh_interval: Duration,
}

impl From<&ClientBootstrap> for ControllerConfig {
    fn from(boot: &ClientBootstrap) -> Self {
        Self {
            ajax_refresh: boot.ajax_refresh,
            auto_refresh: boot.auto_refresh,
            refresh_interval: Duration::from_secs(u64::from(boot.refresh_interval)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// The visitor activated the "next quote" control.
    NextRequested,
    TimerFired,
    Succeeded(QuoteResponse),
    /// The endpoint had no further quote to offer.
    NoMore,
    Failed(String),
    /// The widget was taken off the page.
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerCommand {
    /// Replace the "next quote" control with the loading placeholder.
    ShowLoading,
    /// Send a refresh request carrying this cursor.
    Dispatch(RefreshCursor),
    /// Swap the displayed quote; this also restores the control.
    Display(QuoteResponse),
    /// Put the "next quote" control back so the visitor can try again.
    ShowRetry,
    ArmTimer(Duration),
    CancelTimer,
}

/// Refresh state of one widget instance.
#[derive(Debug, Clone)]
pub struct RefreshController {
    config: ControllerConfig,
    cursor: RefreshCursor,
    phase: Phase,
    timer_armed: bool,
    placeholder_shown: bool,
}

impl RefreshController {
    pub fn new(config: ControllerConfig, cursor: RefreshCursor) -> Self {
        Self {
            config,
            cursor,
            phase: Phase::Idle,
            timer_armed: false,
            placeholder_shown: false,
        }
    }

    pub fn from_bootstrap(boot: &ClientBootstrap) -> Self {
        Self::new(
            ControllerConfig::from(boot),
            RefreshCursor {
                current_quote_id: Some(boot.current_quote_id),
                current_page: Some(boot.current_page),
            },
        )
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cursor(&self) -> RefreshCursor {
        self.cursor
    }

    pub fn timer_armed(&self) -> bool {
        self.timer_armed
    }

    /// Commands to run once the widget is on the page.
    pub fn start(&mut self) -> Vec<ControllerCommand> {
        let mut commands = Vec::new();
        if self.phase == Phase::Idle {
            self.rearm(&mut commands);
        }
        commands
    }

    pub fn handle(&mut self, event: ControllerEvent) -> Vec<ControllerCommand> {
        let mut commands = Vec::new();
        if self.phase == Phase::Removed {
            return commands;
        }

        match event {
            ControllerEvent::NextRequested => {
                if !self.config.ajax_refresh || self.phase == Phase::Loading {
                    return commands;
                }
                if self.timer_armed {
                    self.timer_armed = false;
                    commands.push(ControllerCommand::CancelTimer);
                }
                self.placeholder_shown = true;
                commands.push(ControllerCommand::ShowLoading);
                self.dispatch(&mut commands);
            }
            ControllerEvent::TimerFired => {
                self.timer_armed = false;
                // A manual request is already in flight; its completion re-arms.
                if self.phase == Phase::Loading {
                    return commands;
                }
                self.dispatch(&mut commands);
            }
            ControllerEvent::Succeeded(response) => {
                if self.phase != Phase::Loading {
                    return commands;
                }
                self.cursor = RefreshCursor {
                    current_quote_id: Some(response.quote_id),
                    current_page: Some(response.current_page),
                };
                self.placeholder_shown = false;
                self.phase = Phase::Idle;
                commands.push(ControllerCommand::Display(response));
                self.rearm(&mut commands);
            }
            ControllerEvent::NoMore | ControllerEvent::Failed(_) => {
                if self.phase != Phase::Loading {
                    return commands;
                }
                self.phase = Phase::Idle;
                if std::mem::take(&mut self.placeholder_shown) {
                    commands.push(ControllerCommand::ShowRetry);
                }
                self.rearm(&mut commands);
            }
            ControllerEvent::Removed => {
                self.phase = Phase::Removed;
                if std::mem::take(&mut self.timer_armed) {
                    commands.push(ControllerCommand::CancelTimer);
                }
            }
        }

        commands
    }

    fn dispatch(&mut self, commands: &mut Vec<ControllerCommand>) {
        self.phase = Phase::Loading;
        commands.push(ControllerCommand::Dispatch(self.cursor));
    }

    fn rearm(&mut self, commands: &mut Vec<ControllerCommand>) {
        if self.config.auto_refresh && !self.timer_armed {
            self.timer_armed = true;
            commands.push(ControllerCommand::ArmTimer(self.config.refresh_interval));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ControllerCommand::*;

    fn config(ajax: bool, auto: bool) -> ControllerConfig {
        ControllerConfig {
            ajax_refresh: ajax,
            auto_refresh: auto,
            refresh_interval: Duration::from_secs(5),
        }
    }

    fn start_cursor() -> RefreshCursor {
        RefreshCursor {
            current_quote_id: Some(7),
            current_page: Some(2),
        }
    }

    fn response(id: i64, page: u64) -> QuoteResponse {
        QuoteResponse {
            quote_id: id,
            quote_text: format!("quote {id}"),
            quote_author: None,
            quote_source: None,
            quote_source_is_url: false,
            current_page: page,
            nb_pages: 4,
        }
    }

    #[test]
    fn manual_mode_does_not_arm_timer() {
        let mut c = RefreshController::new(config(true, false), start_cursor());
        assert!(c.start().is_empty());
        assert!(!c.timer_armed());
    }

    #[test]
    fn manual_click_shows_placeholder_and_dispatches_cursor() {
        let mut c = RefreshController::new(config(true, false), start_cursor());
        let cmds = c.handle(ControllerEvent::NextRequested);
        assert_eq!(cmds, vec![ShowLoading, Dispatch(start_cursor())]);
        assert_eq!(c.phase(), Phase::Loading);
    }

    #[test]
    fn clicks_are_ignored_while_loading() {
        let mut c = RefreshController::new(config(true, false), start_cursor());
        c.handle(ControllerEvent::NextRequested);
        assert!(c.handle(ControllerEvent::NextRequested).is_empty());
    }

    #[test]
    fn clicks_are_ignored_without_manual_refresh() {
        let mut c = RefreshController::new(config(false, true), start_cursor());
        c.start();
        assert!(c.handle(ControllerEvent::NextRequested).is_empty());
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn success_updates_cursor_and_displays() {
        let mut c = RefreshController::new(config(true, false), start_cursor());
        c.handle(ControllerEvent::NextRequested);
        let cmds = c.handle(ControllerEvent::Succeeded(response(9, 3)));
        assert_eq!(cmds, vec![Display(response(9, 3))]);
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(
            c.cursor(),
            RefreshCursor {
                current_quote_id: Some(9),
                current_page: Some(3),
            }
        );

        let next = c.handle(ControllerEvent::NextRequested);
        assert_eq!(next[1], Dispatch(c.cursor()));
    }

    #[test]
    fn manual_failure_restores_retry_control() {
        let mut c = RefreshController::new(config(true, false), start_cursor());
        c.handle(ControllerEvent::NextRequested);
        let cmds = c.handle(ControllerEvent::Failed("timeout".into()));
        assert_eq!(cmds, vec![ShowRetry]);
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.cursor(), start_cursor());
    }

    #[test]
    fn manual_no_more_restores_retry_control() {
        let mut c = RefreshController::new(config(true, false), start_cursor());
        c.handle(ControllerEvent::NextRequested);
        assert_eq!(c.handle(ControllerEvent::NoMore), vec![ShowRetry]);
    }

    #[test]
    fn auto_mode_arms_on_start_and_rearms_after_each_cycle() {
        let interval = Duration::from_secs(5);
        let mut c = RefreshController::new(config(false, true), start_cursor());
        assert_eq!(c.start(), vec![ArmTimer(interval)]);

        assert_eq!(c.handle(ControllerEvent::TimerFired), vec![Dispatch(start_cursor())]);
        assert!(!c.timer_armed());
        assert_eq!(
            c.handle(ControllerEvent::Succeeded(response(3, 1))),
            vec![Display(response(3, 1)), ArmTimer(interval)]
        );

        c.handle(ControllerEvent::TimerFired);
        assert_eq!(c.handle(ControllerEvent::Failed("500".into())), vec![ArmTimer(interval)]);

        c.handle(ControllerEvent::TimerFired);
        assert_eq!(c.handle(ControllerEvent::NoMore), vec![ArmTimer(interval)]);
    }

    #[test]
    fn timer_tick_during_manual_request_is_skipped() {
        let mut c = RefreshController::new(config(true, true), start_cursor());
        c.start();
        // Click cancels the pending timer before dispatching.
        let cmds = c.handle(ControllerEvent::NextRequested);
        assert_eq!(cmds, vec![CancelTimer, ShowLoading, Dispatch(start_cursor())]);

        // A tick that raced the cancellation does nothing.
        assert!(c.handle(ControllerEvent::TimerFired).is_empty());
        assert_eq!(c.phase(), Phase::Loading);

        let done = c.handle(ControllerEvent::Succeeded(response(1, 1)));
        assert_eq!(done, vec![Display(response(1, 1)), ArmTimer(Duration::from_secs(5))]);
    }

    #[test]
    fn completions_outside_loading_are_ignored() {
        let mut c = RefreshController::new(config(true, false), start_cursor());
        assert!(c.handle(ControllerEvent::Succeeded(response(2, 2))).is_empty());
        assert!(c.handle(ControllerEvent::NoMore).is_empty());
        assert_eq!(c.cursor(), start_cursor());
    }

    #[test]
    fn removal_cancels_timer_and_silences_later_events() {
        let mut c = RefreshController::new(config(true, true), start_cursor());
        c.start();
        assert_eq!(c.handle(ControllerEvent::Removed), vec![CancelTimer]);
        assert_eq!(c.phase(), Phase::Removed);
        assert!(c.handle(ControllerEvent::TimerFired).is_empty());
        assert!(c.handle(ControllerEvent::NextRequested).is_empty());
        assert!(c.handle(ControllerEvent::Succeeded(response(2, 2))).is_empty());
        assert!(c.start().is_empty());
    }

    #[test]
    fn removal_mid_request_drops_the_response() {
        let mut c = RefreshController::new(config(true, false), start_cursor());
        c.handle(ControllerEvent::NextRequested);
        assert!(c.handle(ControllerEvent::Removed).is_empty());
        assert!(c.handle(ControllerEvent::Succeeded(response(2, 2))).is_empty());
    }

    #[test]
    fn config_from_bootstrap() {
        let boot = ClientBootstrap {
            widget_id: "quotes-widget-1".into(),
            script_id: "quotes_widget_1".into(),
            ajax_url: "http://localhost/api/v1/refresh".into(),
            nonce: "n".into(),
            ajax_refresh: true,
            auto_refresh: true,
            refresh_interval: 12,
            current_page: 3,
            nb_pages: 8,
            current_quote_id: 44,
            char_limit: 500,
            tags: String::new(),
            order_by: crate::selection::QuoteOrder::Newest,
            strings: crate::i18n::WidgetStrings::for_locale("en"),
        };
        let c = RefreshController::from_bootstrap(&boot);
        assert_eq!(c.cursor().current_quote_id, Some(44));
        assert_eq!(c.cursor().current_page, Some(3));
        assert_eq!(ControllerConfig::from(&boot).refresh_interval, Duration::from_secs(12));
    }
}
