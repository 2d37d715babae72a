#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use photomail::mail::{Email, Login, MailError, MailSession, Mailer};
use rust_xlsxwriter::Workbook;

/// What the recording relay saw.
#[derive(Debug, Default)]
pub struct Recorded {
    pub logins: Vec<Login>,
    pub sessions_opened: usize,
    pub sessions_closed: usize,
    pub sent: Vec<Email>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayBehaviour {
    Accept,
    RejectLogin,
    Unreachable,
}

/// In-memory relay that records sessions and messages.
#[derive(Clone)]
pub struct RecordingMailer {
    pub recorded: Arc<Mutex<Recorded>>,
    behaviour: RelayBehaviour,
    /// Recipients whose messages the relay refuses.
    refuse: Vec<String>,
}

impl RecordingMailer {
    pub fn new(behaviour: RelayBehaviour) -> Self {
        Self {
            recorded: Arc::default(),
            behaviour,
            refuse: Vec::new(),
        }
    }

    pub fn accepting() -> Self {
        Self::new(RelayBehaviour::Accept)
    }

    pub fn refusing(mut self, recipient: &str) -> Self {
        self.refuse.push(recipient.to_string());
        self
    }

    pub fn sessions_opened(&self) -> usize {
        self.recorded.lock().unwrap().sessions_opened
    }

    pub fn sessions_closed(&self) -> usize {
        self.recorded.lock().unwrap().sessions_closed
    }

    pub fn sent_to(&self) -> Vec<String> {
        self.recorded
            .lock()
            .unwrap()
            .sent
            .iter()
            .flat_map(|e| e.to.clone())
            .collect()
    }
}

pub struct RecordingSession {
    recorded: Arc<Mutex<Recorded>>,
    refuse: Vec<String>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    type Session = RecordingSession;

    async fn open_session(&self, login: &Login) -> Result<RecordingSession, MailError> {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.logins.push(login.clone());
        match self.behaviour {
            RelayBehaviour::RejectLogin => {
                Err(MailError::AuthRejected("535 5.7.8 credentials rejected".into()))
            }
            RelayBehaviour::Unreachable => {
                Err(MailError::Transport("connection refused".into()))
            }
            RelayBehaviour::Accept => {
                recorded.sessions_opened += 1;
                Ok(RecordingSession {
                    recorded: self.recorded.clone(),
                    refuse: self.refuse.clone(),
                })
            }
        }
    }
}

#[async_trait]
impl MailSession for RecordingSession {
    async fn send(&mut self, email: &Email) -> Result<(), MailError> {
        if email.to.iter().any(|to| self.refuse.contains(to)) {
            return Err(MailError::Transport("550 mailbox unavailable".into()));
        }
        self.recorded.lock().unwrap().sent.push(email.clone());
        Ok(())
    }

    async fn close(&mut self) {
        self.recorded.lock().unwrap().sessions_closed += 1;
    }
}

/// A spreadsheet cell for fixtures.
#[derive(Debug, Clone, Copy)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Blank,
}

/// Write an xlsx workbook with one sheet holding `rows`.
pub fn workbook(rows: &[Vec<Cell<'_>>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            match *cell {
                Cell::Text(s) => {
                    sheet.write_string(r as u32, c as u16, s).unwrap();
                }
                Cell::Number(n) => {
                    sheet.write_number(r as u32, c as u16, n).unwrap();
                }
                Cell::Blank => {}
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

/// Two recipients: Ada's photo exists, Bob's does not.
pub fn two_row_workbook() -> Vec<u8> {
    use Cell::*;
    workbook(&[
        vec![Text("Name"), Text("Email"), Text("PhotoID1")],
        vec![Text("Ada"), Text("ada@example.com"), Number(101.0)],
        vec![Text("Bob"), Text("bob@example.com"), Number(202.0)],
    ])
}

pub fn photo(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), b"\xff\xd8\xff\xe0 fake jpeg").unwrap();
}
