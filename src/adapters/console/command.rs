//! Line commands understood by the console.
//!
//! ```text
//! alice hello there          inbound message from webchat:alice
//! agents:x hi                inbound message from an explicit address
//! /connect alice x           connect agent x to customer alice
//! /disconnect alice x
//! /queue alice               /dequeue alice
//! /watch alice x             /unwatch alice x
//! /bot alice some text       bot reply to alice
//! /show alice                /agent x
//! /list                      /bridged [seconds]
//! /help                      /quit
//! ```

use thiserror::Error;

use crate::config::ConsoleConfig;
use crate::domain::conversation::{HandoffEvent, Message};
use crate::domain::foundation::{Address, ValidationError};
use crate::ports::ConversationLookup;

const DEFAULT_BRIDGED_WINDOW_SECS: i64 = 3600;

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Inbound(Message),
    Handoff(HandoffEvent),
    BotReply { customer: Address, text: String },
    Show(ConversationLookup),
    List,
    Bridged { within_secs: i64 },
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Nothing to do")]
    Empty,

    #[error("Unknown command /{0}, try /help")]
    UnknownCommand(String),

    #[error("/{command} needs a {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] ValidationError),

    #[error("Not a number of seconds: {0}")]
    InvalidSeconds(String),
}

/// Parses console lines, filling in default channels for bare names.
#[derive(Debug, Clone)]
pub struct CommandParser {
    customer_channel: String,
    agent_channel: String,
}

impl CommandParser {
    pub fn new(customer_channel: impl Into<String>, agent_channel: impl Into<String>) -> Self {
        Self {
            customer_channel: customer_channel.into(),
            agent_channel: agent_channel.into(),
        }
    }

    pub fn from_config(config: &ConsoleConfig) -> Self {
        Self::new(&config.customer_channel, &config.agent_channel)
    }

    pub fn parse(&self, line: &str) -> Result<ConsoleCommand, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }

        let Some(rest) = line.strip_prefix('/') else {
            let (sender, text) = split_word(line);
            let address = self.address(sender, &self.customer_channel)?;
            return Ok(ConsoleCommand::Inbound(Message::new(address, text)));
        };

        let (name, args) = split_word(rest);
        let mut words = args.split_whitespace();
        let command = match name {
            "connect" => ConsoleCommand::Handoff(HandoffEvent::Connect {
                customer: self.customer(words.next(), "connect")?,
                agent: self.agent(words.next(), "connect")?,
            }),
            "disconnect" => ConsoleCommand::Handoff(HandoffEvent::Disconnect {
                customer: self.customer(words.next(), "disconnect")?,
                agent: self.agent(words.next(), "disconnect")?,
            }),
            "queue" => ConsoleCommand::Handoff(HandoffEvent::Queue {
                customer: self.customer(words.next(), "queue")?,
            }),
            "dequeue" => ConsoleCommand::Handoff(HandoffEvent::Dequeue {
                customer: self.customer(words.next(), "dequeue")?,
            }),
            "watch" => ConsoleCommand::Handoff(HandoffEvent::Watch {
                customer: self.customer(words.next(), "watch")?,
                agent: self.agent(words.next(), "watch")?,
            }),
            "unwatch" => ConsoleCommand::Handoff(HandoffEvent::Unwatch {
                customer: self.customer(words.next(), "unwatch")?,
                agent: self.agent(words.next(), "unwatch")?,
            }),
            "bot" => {
                let (customer, text) = split_word(args);
                if text.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "bot",
                        argument: "text",
                    });
                }
                ConsoleCommand::BotReply {
                    customer: self.customer(Some(customer).filter(|c| !c.is_empty()), "bot")?,
                    text: text.to_string(),
                }
            }
            "show" => ConsoleCommand::Show(ConversationLookup::Customer(
                self.customer(words.next(), "show")?,
            )),
            "agent" => ConsoleCommand::Show(ConversationLookup::Agent(
                self.agent(words.next(), "agent")?,
            )),
            "list" => ConsoleCommand::List,
            "bridged" => ConsoleCommand::Bridged {
                within_secs: match words.next() {
                    Some(raw) => raw
                        .parse::<i64>()
                        .ok()
                        .filter(|secs| *secs >= 0)
                        .ok_or_else(|| CommandError::InvalidSeconds(raw.to_string()))?,
                    None => DEFAULT_BRIDGED_WINDOW_SECS,
                },
            },
            "help" => ConsoleCommand::Help,
            "quit" | "exit" => ConsoleCommand::Quit,
            other => return Err(CommandError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }

    fn customer(&self, word: Option<&str>, command: &'static str) -> Result<Address, CommandError> {
        let word = word.ok_or(CommandError::MissingArgument {
            command,
            argument: "customer",
        })?;
        self.address(word, &self.customer_channel)
    }

    fn agent(&self, word: Option<&str>, command: &'static str) -> Result<Address, CommandError> {
        let word = word.ok_or(CommandError::MissingArgument {
            command,
            argument: "agent",
        })?;
        self.address(word, &self.agent_channel)
    }

    fn address(&self, word: &str, default_channel: &str) -> Result<Address, CommandError> {
        if word.contains(':') {
            Ok(word.parse::<Address>()?)
        } else {
            Ok(format!("{}:{}", default_channel, word).parse::<Address>()?)
        }
    }
}

/// Splits off the first whitespace-delimited word.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (s, ""),
    }
}
