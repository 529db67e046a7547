use crate::model::{ContractMetadata, OperationId, OperationStatus, OwnerLookup, Phase, ReadState};
use crate::orchestrator::{Operation, UiCommand};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::{Color, Modifier, Style};

/// Which text input currently receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Recipient,
    TokenId,
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Send(UiCommand),
    CopyOwner(String),
    Quit,
}

pub struct UiState {
    pub show_help: bool,
    pub editing: Option<InputField>,
    pub recipient: String,
    pub token_id: String,
    /// Local feedback that never goes through the status gate (clipboard, hints).
    pub info: String,
    pub contract: String,
    pub rpc_url: String,

    // Snapshots of the orchestrator's watch channels, refreshed every frame.
    pub status: OperationStatus,
    pub metadata: ReadState<ContractMetadata>,
    pub balance: ReadState<u64>,
    pub owner: Option<OwnerLookup>,
}

impl UiState {
    pub fn new(contract: String, rpc_url: String) -> Self {
        Self {
            show_help: false,
            editing: None,
            recipient: String::new(),
            token_id: String::new(),
            info: String::new(),
            contract,
            rpc_url,
            status: OperationStatus::idle(),
            metadata: ReadState::Loading,
            balance: ReadState::Loading,
            owner: None,
        }
    }

    pub fn handle_key(&mut self, k: KeyEvent) -> Option<KeyAction> {
        if let (KeyModifiers::CONTROL, KeyCode::Char('c')) = (k.modifiers, k.code) {
            return Some(KeyAction::Quit);
        }
        match self.editing {
            Some(field) => self.handle_edit_key(field, k.code),
            None => self.handle_command_key(k.code),
        }
    }

    fn handle_edit_key(&mut self, field: InputField, code: KeyCode) -> Option<KeyAction> {
        match code {
            KeyCode::Esc => {
                self.editing = None;
                None
            }
            KeyCode::Enter => {
                self.editing = None;
                match field {
                    InputField::Recipient => self.trigger(OperationId::MintTo),
                    InputField::TokenId => None,
                }
            }
            KeyCode::Backspace => {
                self.input_mut(field).pop();
                None
            }
            KeyCode::Char(c) => {
                let accepts = match field {
                    InputField::Recipient => !c.is_whitespace(),
                    InputField::TokenId => c.is_ascii_digit(),
                };
                if accepts {
                    self.input_mut(field).push(c);
                }
                None
            }
            _ => None,
        }
    }

    fn handle_command_key(&mut self, code: KeyCode) -> Option<KeyAction> {
        match code {
            KeyCode::Char('q') => Some(KeyAction::Quit),
            KeyCode::Char('?') | KeyCode::Tab => {
                self.show_help = !self.show_help;
                None
            }
            KeyCode::Esc => {
                self.show_help = false;
                None
            }
            KeyCode::Char('m') => self.trigger(OperationId::Mint),
            KeyCode::Char('o') => self.trigger(OperationId::CheckOwner),
            KeyCode::Char('b') => self.trigger(OperationId::Burn),
            KeyCode::Char('t') => {
                self.begin_edit(InputField::Recipient);
                None
            }
            KeyCode::Char('i') => {
                self.begin_edit(InputField::TokenId);
                None
            }
            KeyCode::Char('r') => {
                self.info = "Refreshing contract info...".into();
                Some(KeyAction::Send(UiCommand::Refresh))
            }
            KeyCode::Char('y') => match self.owner.as_ref() {
                Some(lookup) => Some(KeyAction::CopyOwner(lookup.owner.clone())),
                None => {
                    self.info = "No owner to copy. Check an owner first (o)".into();
                    None
                }
            },
            _ => None,
        }
    }

    fn begin_edit(&mut self, field: InputField) {
        if self.status.is_pending() {
            self.info = "Inputs are locked while an operation is pending".into();
            return;
        }
        self.show_help = false;
        self.editing = Some(field);
    }

    fn input_mut(&mut self, field: InputField) -> &mut String {
        match field {
            InputField::Recipient => &mut self.recipient,
            InputField::TokenId => &mut self.token_id,
        }
    }

    /// Disabled controls swallow the key; everything else goes to the controller,
    /// which validates and asks for admission.
    fn trigger(&mut self, id: OperationId) -> Option<KeyAction> {
        if self.status.is_disabled(id) {
            return None;
        }
        self.info.clear();
        let op = match id {
            OperationId::Mint => Operation::Mint,
            OperationId::MintTo => Operation::MintTo(self.recipient.clone()),
            OperationId::CheckOwner => Operation::CheckOwner(self.token_id.clone()),
            OperationId::Burn => Operation::Burn(self.token_id.clone()),
        };
        Some(KeyAction::Send(UiCommand::Run(op)))
    }

    pub fn button_label(&self, id: OperationId) -> &'static str {
        let running = self.status.is_running(id);
        match (id, running) {
            (OperationId::Mint, true) | (OperationId::MintTo, true) => "Minting...",
            (OperationId::CheckOwner, true) => "Checking...",
            (OperationId::Burn, true) => "Burning...",
            (OperationId::Mint, false) => "Mint NFT",
            (OperationId::MintTo, false) => "Mint To Address",
            (OperationId::CheckOwner, false) => "Check Owner",
            (OperationId::Burn, false) => "Burn Token",
        }
    }

    pub fn button_style(&self, id: OperationId, color: Color) -> Style {
        if self.status.is_disabled(id) {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        }
    }

    pub fn status_color(&self) -> Color {
        match self.status.phase {
            Phase::Idle => Color::Gray,
            Phase::Pending => Color::Blue,
            Phase::Succeeded => Color::Green,
            Phase::Failed => Color::Red,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn code(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state() -> UiState {
        UiState::new("0xc0ffee".into(), "http://localhost:8547".into())
    }

    fn pending(op: OperationId) -> OperationStatus {
        OperationStatus {
            phase: Phase::Pending,
            message: "working".into(),
            operation: Some(op),
        }
    }

    #[test]
    fn mint_key_is_swallowed_only_while_mint_runs() {
        let mut s = state();
        assert_eq!(
            s.handle_key(key('m')),
            Some(KeyAction::Send(UiCommand::Run(Operation::Mint)))
        );

        s.status = pending(OperationId::Mint);
        assert_eq!(s.handle_key(key('m')), None);
        assert_eq!(s.button_label(OperationId::Mint), "Minting...");
        assert_eq!(s.button_label(OperationId::Burn), "Burn Token");

        s.token_id = "4".into();
        assert_eq!(
            s.handle_key(key('b')),
            Some(KeyAction::Send(UiCommand::Run(Operation::Burn("4".into()))))
        );
    }

    #[test]
    fn recipient_edit_submits_mint_to_on_enter() {
        let mut s = state();
        s.handle_key(key('t'));
        assert_eq!(s.editing, Some(InputField::Recipient));
        for c in "0xab".chars() {
            assert_eq!(s.handle_key(key(c)), None);
        }
        s.handle_key(code(KeyCode::Backspace));
        assert_eq!(s.recipient, "0xa");
        let submitted = Operation::MintTo("0xa".into());
        assert_eq!(
            s.handle_key(code(KeyCode::Enter)),
            Some(KeyAction::Send(UiCommand::Run(submitted)))
        );
        assert_eq!(s.editing, None);
    }

    #[test]
    fn token_input_keeps_digits_and_q_does_not_quit_while_editing() {
        let mut s = state();
        s.handle_key(key('i'));
        for c in "1x2q".chars() {
            assert_eq!(s.handle_key(key(c)), None);
        }
        assert_eq!(s.token_id, "12");
        assert_eq!(s.handle_key(code(KeyCode::Enter)), None);
        assert_eq!(s.handle_key(key('q')), Some(KeyAction::Quit));
    }

    #[test]
    fn inputs_are_locked_while_anything_is_pending() {
        let mut s = state();
        s.status = pending(OperationId::CheckOwner);
        s.handle_key(key('t'));
        assert_eq!(s.editing, None);
        s.handle_key(key('i'));
        assert_eq!(s.editing, None);
        assert!(!s.info.is_empty());
    }

    #[test]
    fn unknown_origin_disables_every_control() {
        let mut s = state();
        s.status = OperationStatus {
            phase: Phase::Pending,
            message: "working".into(),
            operation: None,
        };
        for c in ['m', 'o', 'b'] {
            assert_eq!(s.handle_key(key(c)), None);
        }
        assert_eq!(
            s.button_style(OperationId::Burn, Color::Red),
            Style::default().fg(Color::DarkGray)
        );
    }

    #[test]
    fn copy_needs_an_owner() {
        let mut s = state();
        assert_eq!(s.handle_key(key('y')), None);
        s.owner = Some(OwnerLookup {
            token_id: 1,
            owner: "0xabc".into(),
        });
        assert_eq!(
            s.handle_key(key('y')),
            Some(KeyAction::CopyOwner("0xabc".into()))
        );
    }
}
