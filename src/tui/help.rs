use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn keybind(key: &'static str, pad: usize, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(what),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit"),
        ]),
        keybind("m", 11, "Mint an NFT to your account"),
        keybind("t", 11, "Edit recipient address (Enter mints to it)"),
        keybind("i", 11, "Edit token ID"),
        keybind("o", 11, "Check owner of token ID"),
        keybind("b", 11, "Burn token ID"),
        keybind("r", 11, "Refresh contract info and balance"),
        keybind("y", 11, "Copy owner address to clipboard"),
        keybind("tab", 9, "Toggle this help"),
        keybind("?", 11, "Toggle this help"),
        Line::from(""),
        Line::from("While editing:"),
        keybind("Enter", 7, "Confirm"),
        keybind("Esc", 9, "Cancel editing"),
        Line::from(""),
        Line::from("Only one operation runs at a time. A control is greyed out while"),
        Line::from("its own operation is pending; other triggers are ignored until it"),
        Line::from("finishes. Results clear automatically."),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
