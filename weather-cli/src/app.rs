use anyhow::Result;
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;
use weather_core::{
    Event, Session, Ticket, WeatherApiClient, WeatherError, WeatherReport, execute,
};

use crate::ui;

type Outcome = (Ticket, Result<WeatherReport, WeatherError>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Window state: the search session plus the text typed into the search box.
pub struct App {
    pub session: Session<WeatherApiClient>,
    pub input: String,
    tx: mpsc::Sender<Outcome>,
    rx: mpsc::Receiver<Outcome>,
}

impl App {
    pub fn new(session: Session<WeatherApiClient>) -> Self {
        let (tx, rx) = mpsc::channel(16);
        Self {
            session,
            input: String::new(),
            tx,
            rx,
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Esc => return Flow::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Flow::Quit;
            }
            KeyCode::Enter => self.submit(self.input.clone()),
            KeyCode::F(2) => self.dispatch(Event::ToggleUnit),
            KeyCode::F(3) => self.dispatch(Event::ToggleForecast),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
            }
            _ => {}
        }
        Flow::Continue
    }

    pub fn submit(&mut self, city: String) {
        self.dispatch(Event::Search(city));
    }

    fn dispatch(&mut self, event: Event) {
        if let Some(ticket) = self.session.dispatch(event) {
            self.spawn_fetch(ticket);
        }
    }

    /// Runs the network part of a search off the draw loop.
    fn spawn_fetch(&self, ticket: Ticket) {
        let client = self.session.client();
        let days = self.session.forecast_days();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let outcome = execute(client.as_ref(), ticket.plan(), days).await;
            if tx.send((ticket, outcome)).await.is_err() {
                debug!("Window closed before weather result arrived");
            }
        });
    }

    /// Applies every finished fetch; superseded ones are dropped by the session.
    pub fn drain_results(&mut self) {
        while let Ok((ticket, outcome)) = self.rx.try_recv() {
            self.session.complete(ticket, outcome);
        }
    }
}

pub async fn run(session: Session<WeatherApiClient>, initial_city: Option<String>) -> Result<()> {
    let mut app = App::new(session);
    if let Some(city) = initial_city {
        app.input = city.clone();
        app.submit(city);
    }

    let mut terminal = ratatui::try_init()?;
    let res = run_app(&mut terminal, &mut app);
    ratatui::restore();

    res
}

fn run_app(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    loop {
        app.drain_results();
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let TermEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.on_key(key) == Flow::Quit {
                    return Ok(());
                }
            }
        }
    }
}
