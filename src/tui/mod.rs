mod help;
mod state;

use crate::chain::is_valid_address;
use crate::cli::Cli;
use crate::model::{OperationId, OperationStatus, Phase, ReadState};
use crate::orchestrator::{self, Panel, ReadViews, UiCommand};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Terminal,
};
use state::{InputField, KeyAction, UiState};
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::sync::watch;

pub async fn run(args: Cli) -> Result<()> {
    let cfg = crate::cli::build_config(&args);
    let client = crate::chain::evm::connect(&cfg).context("failed to set up contract client")?;
    let panel = Panel::new(client, cfg.status_ttl);

    // Unbounded channel: key presses never wait on the controller.
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();
    let status_rx = panel.status().subscribe();
    let views = panel.reads().views();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_state = UiState::new(cfg.contract.clone(), cfg.rpc_url.clone());
    let ui_handle = std::thread::spawn(move || run_threaded(ui_state, status_rx, views, cmd_tx));

    orchestrator::run_controller(panel, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }
    Ok(())
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(
    mut state: UiState,
    status_rx: watch::Receiver<OperationStatus>,
    views: ReadViews,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    let mut redraw = true;

    let res = loop {
        // UiState is owned by this thread; orchestrator state arrives as snapshots.
        state.status = status_rx.borrow().clone();
        state.metadata = views.metadata.borrow().clone();
        state.balance = views.balance.borrow().clone();
        state.owner = views.owner.borrow().clone();

        if redraw || last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
            redraw = false;
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match state.handle_key(k) {
                    Some(KeyAction::Quit) => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                    Some(KeyAction::Send(cmd)) => {
                        if cmd_tx.send(cmd).is_err() {
                            break Err(anyhow::anyhow!("controller stopped unexpectedly"));
                        }
                    }
                    Some(KeyAction::CopyOwner(addr)) => match copy_to_clipboard(&addr) {
                        Ok(()) => state.info = format!("✓ Copied to clipboard: {addr}"),
                        Err(e) => state.info = format!("Clipboard copy failed: {e:#}"),
                    },
                    None => {}
                }
                redraw = true;
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(5), // Contract header + balance
                Constraint::Length(3), // Status
                Constraint::Min(0),    // Controls or help
                Constraint::Length(3), // Info / hints
            ]
            .as_ref(),
        )
        .split(area);

    draw_header(chunks[0], f, state);
    draw_status(chunks[1], f, state);
    if state.show_help {
        help::draw_help(chunks[2], f);
    } else {
        draw_controls(chunks[2], f, state);
    }
    draw_footer(chunks[3], f, state);
}

fn draw_header(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)].as_ref())
        .split(area);

    let title = match &state.metadata {
        ReadState::Ready(m) => Line::from(vec![
            Span::styled(
                m.name.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" ({})", m.symbol)),
        ]),
        ReadState::Loading => Line::from(Span::styled(
            "Loading contract info...",
            Style::default().fg(Color::Gray),
        )),
        ReadState::Failed(e) => Line::from(Span::styled(
            format!("Contract info unavailable: {e} (r to retry)"),
            Style::default().fg(Color::Red),
        )),
    };
    let header = Paragraph::new(vec![
        title,
        Line::from(vec![
            Span::styled("Contract: ", Style::default().fg(Color::Gray)),
            Span::raw(state.contract.clone()),
        ]),
        Line::from(vec![
            Span::styled("RPC: ", Style::default().fg(Color::Gray)),
            Span::raw(state.rpc_url.clone()),
        ]),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("stylus-nft-panel"),
    );
    f.render_widget(header, row[0]);

    let balance = match &state.balance {
        ReadState::Ready(n) => Span::styled(
            n.to_string(),
            Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
        ),
        ReadState::Loading => Span::styled("…", Style::default().fg(Color::Gray)),
        ReadState::Failed(_) => Span::styled("unavailable", Style::default().fg(Color::Red)),
    };
    let balance = Paragraph::new(vec![Line::from(""), Line::from(balance)])
        .alignment(ratatui::layout::Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Your NFT Balance"),
        );
    f.render_widget(balance, row[1]);
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let color = state.status_color();
    let icon = match state.status.phase {
        Phase::Idle => "",
        Phase::Pending => "⋯ ",
        Phase::Succeeded => "✓ ",
        Phase::Failed => "✗ ",
    };
    let p = Paragraph::new(Line::from(Span::styled(
        format!("{icon}{}", state.status.message),
        Style::default().fg(color),
    )))
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title("Status"),
    );
    f.render_widget(p, area);
}

fn button<'a>(state: &UiState, key: &'static str, id: OperationId, color: Color) -> Vec<Span<'a>> {
    vec![
        Span::styled(format!("[{key}] "), Style::default().fg(Color::Magenta)),
        Span::styled(state.button_label(id), state.button_style(id, color)),
    ]
}

fn input_line<'a>(state: &UiState, field: InputField, label: &'static str) -> Line<'a> {
    let (value, placeholder) = match field {
        InputField::Recipient => (&state.recipient, "Enter recipient address"),
        InputField::TokenId => (&state.token_id, "Token ID"),
    };
    let editing = state.editing == Some(field);
    let locked = state.status.is_pending();
    let mut spans = vec![Span::styled(label, Style::default().fg(Color::Gray))];
    if value.is_empty() && !editing {
        spans.push(Span::styled(
            placeholder,
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        let style = if locked {
            Style::default().fg(Color::DarkGray)
        } else if field == InputField::Recipient && !is_valid_address(value) {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(value.clone(), style));
    }
    if editing {
        spans.push(Span::styled("▏", Style::default().fg(Color::Cyan)));
    }
    Line::from(spans)
}

fn draw_controls(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3), // Mint
                Constraint::Length(4), // Mint to address
                Constraint::Min(5),    // Token operations
            ]
            .as_ref(),
        )
        .split(area);

    let mint = button(state, "m", OperationId::Mint, Color::Cyan);
    let mint = Paragraph::new(Line::from(mint))
        .block(Block::default().borders(Borders::ALL).title("Mint"));
    f.render_widget(mint, rows[0]);

    let mint_to = Paragraph::new(vec![
        input_line(state, InputField::Recipient, "Recipient: "),
        Line::from(button(state, "t", OperationId::MintTo, Color::Green)),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Mint to Specific Address"),
    );
    f.render_widget(mint_to, rows[1]);

    let mut token_actions = button(state, "o", OperationId::CheckOwner, Color::LightBlue);
    token_actions.push(Span::raw("    "));
    token_actions.extend(button(state, "b", OperationId::Burn, Color::Red));
    let mut lines = vec![
        input_line(state, InputField::TokenId, "Token ID: "),
        Line::from(token_actions),
    ];
    if let Some(lookup) = state.owner.as_ref() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(
                format!("Owner of token {}: ", lookup.token_id),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(lookup.owner.clone(), Style::default().fg(Color::LightBlue)),
            Span::styled("  (y to copy)", Style::default().fg(Color::DarkGray)),
        ]));
    }
    let tokens = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Token Operations"),
    );
    f.render_widget(tokens, rows[2]);
}

fn draw_footer(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let hint = if state.editing.is_some() {
        "Enter confirm  Esc cancel"
    } else {
        "m mint  t recipient  i token  o owner  b burn  r refresh  ? help  q quit"
    };
    let mut lines = Vec::new();
    if state.info.is_empty() {
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::Gray),
        )));
    } else {
        lines.push(Line::from(vec![
            Span::raw(state.info.clone()),
            Span::styled(format!("   {hint}"), Style::default().fg(Color::DarkGray)),
        ]));
    }
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

// Global clipboard manager channel - initialized once on first use
use std::sync::mpsc as std_mpsc;
use std::sync::OnceLock;

static CLIPBOARD_SENDER: OnceLock<std_mpsc::Sender<String>> = OnceLock::new();

/// Clipboard writes run on one background thread that keeps each clipboard
/// instance alive long enough for Linux clipboard managers to read it.
fn init_clipboard_manager() -> Result<&'static std_mpsc::Sender<String>> {
    CLIPBOARD_SENDER.get_or_init(|| {
        let (tx, rx) = std_mpsc::channel::<String>();

        std::thread::spawn(move || {
            use arboard::Clipboard;

            for text in rx {
                match Clipboard::new() {
                    Ok(mut clipboard) => {
                        if clipboard.set_text(&text).is_ok() {
                            std::thread::sleep(Duration::from_secs(2));
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "clipboard unavailable"),
                }
            }
        });

        tx
    });

    CLIPBOARD_SENDER
        .get()
        .ok_or_else(|| anyhow::anyhow!("Failed to initialize clipboard manager"))
}

/// Queue `text` for the clipboard thread and return immediately.
fn copy_to_clipboard(text: &str) -> Result<()> {
    let sender = init_clipboard_manager()?;
    sender
        .send(text.to_string())
        .map_err(|_| anyhow::anyhow!("Clipboard manager channel closed"))?;
    Ok(())
}
