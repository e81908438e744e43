pub mod app;
pub mod ui;

use std::io;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use storeops_core::{FileScenarioRepository, ScenarioService};

use crate::tui::app::{App, InputMode};

pub fn run(service: ScenarioService<FileScenarioRepository>, scenario: Option<String>) -> Result<()> {
    // Fail before touching the terminal if the scenario is missing
    let state = service.base_state(scenario.as_deref())?;
    let mut app = App::new(service, state, scenario);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .map_err(|e| io::Error::other(e.to_string()))?;

        if !event::poll(std::time::Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Right | KeyCode::Char('l') => app.adjust(1.0),
                KeyCode::Left | KeyCode::Char('h') => app.adjust(-1.0),
                KeyCode::Char('+') | KeyCode::Char('L') => app.adjust(10.0),
                KeyCode::Char('-') | KeyCode::Char('H') => app.adjust(-10.0),
                KeyCode::Char(' ') | KeyCode::Enter => app.toggle(),
                KeyCode::Tab => app.switch_model(),
                KeyCode::Char('u') => app.toggle_unit(),
                KeyCode::Char(':') => app.enter_mode(InputMode::Command),
                KeyCode::Char('i') => app.enter_mode(InputMode::Importing),
                KeyCode::Char('s') => app.enter_mode(InputMode::Saving),
                KeyCode::Char('x') => app.clear_forecast(),
                KeyCode::Char('r') => app.reset(),
                _ => {}
            },
            InputMode::Command | InputMode::Importing | InputMode::Saving => match key.code {
                KeyCode::Enter => app.submit_command(),
                KeyCode::Esc => app.exit_input_mode(),
                KeyCode::Char(c) => app.input_char(c),
                KeyCode::Backspace => app.delete_char(),
                KeyCode::Left => app.move_cursor_left(),
                KeyCode::Right => app.move_cursor_right(),
                _ => {}
            },
        }
    }
}
