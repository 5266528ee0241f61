use crate::app::{App, MenuItem};
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;
    // A date change invalidates everything in flight; issuing a fresh load
    // is how the stale responses get superseded.
    let mut reload_date = None;
    let mut load_demo = false;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Schedule),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Date control
        (MenuItem::Schedule, Char('h') | KeyCode::Left, _) => {
            reload_date = Some(guard.step_date(false));
        }
        (MenuItem::Schedule, Char('l') | KeyCode::Right, _) => {
            reload_date = Some(guard.step_date(true));
        }
        (MenuItem::Schedule, Char('t'), _) => {
            reload_date = Some(guard.goto_today());
        }
        (MenuItem::Schedule, Char('r'), _) => {
            reload_date = Some(guard.state.schedule.date);
        }

        // Row navigation
        (MenuItem::Schedule, Char('j') | KeyCode::Down, _) => guard.row_down(),
        (MenuItem::Schedule, Char('k') | KeyCode::Up, _) => guard.row_up(),

        // Live demo overlay
        (MenuItem::Schedule, Char('s'), _) => {
            load_demo = guard.toggle_demo();
        }

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    drop(guard);

    if let Some(date) = reload_date {
        let _ = network_requests
            .send(NetworkRequest::LoadSchedule { date })
            .await;
    }
    if load_demo {
        let _ = network_requests.send(NetworkRequest::LoadDemo).await;
    }
}
