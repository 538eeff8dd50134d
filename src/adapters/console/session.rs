//! Console session: the full stack wired for line-at-a-time use.

use std::sync::Arc;

use super::command::{CommandError, CommandParser, ConsoleCommand};
use super::services::{EchoBot, LoggingCallbacks, QueueNotice, StateChangeLogger};
use crate::adapters::{AgentDirectory, InMemoryConversationProvider, InMemoryEventBus, TracingMessageSender};
use crate::application::{
    AgentMessageRouter, BotMessageRouter, CustomerMessageRouter, CustomerRoute, HandoffEventHandler,
    InboundRoute, InboundRouter,
};
use crate::config::AppConfig;
use crate::domain::conversation::{ConversationRecord, ConversationStateChanged};
use crate::domain::foundation::{DomainEvent, Timestamp};
use crate::ports::{ConversationProvider, EventSubscriber};

const HELP: &str = "\
<name|channel:user> <text>   message from a customer or agent
/connect <customer> <agent>  /disconnect <customer> <agent>
/queue <customer>            /dequeue <customer>
/watch <customer> <agent>    /unwatch <customer> <agent>
/bot <customer> <text>       bot reply
/show <customer>             /agent <agent>
/list                        /bridged [seconds]
/quit";

/// Result of one console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue(Vec<String>),
    Quit,
}

pub struct ConsoleSession {
    provider: Arc<InMemoryConversationProvider>,
    sender: Arc<TracingMessageSender>,
    inbound: InboundRouter,
    bot: Arc<BotMessageRouter>,
    handoff: HandoffEventHandler,
    parser: CommandParser,
}

impl ConsoleSession {
    pub fn from_config(config: &AppConfig) -> Self {
        let provider = Arc::new(InMemoryConversationProvider::new());
        let sender = Arc::new(TracingMessageSender::new());
        let bus = Arc::new(InMemoryEventBus::new());
        bus.subscribe(ConversationStateChanged::EVENT_TYPE, Arc::new(StateChangeLogger));

        let bot = Arc::new(BotMessageRouter::new(provider.clone(), sender.clone()));
        let customers = CustomerMessageRouter::new(
            provider.clone(),
            sender.clone(),
            Arc::new(EchoBot::new(bot.clone())),
            Arc::new(QueueNotice::new(bot.clone())),
        );
        let agents = AgentMessageRouter::new(provider.clone(), sender.clone())
            .with_implicit_connect(config.routing.implicit_connect);
        let inbound = InboundRouter::new(
            Arc::new(AgentDirectory::from_config(&config.routing)),
            customers,
            agents,
        );
        let handoff = HandoffEventHandler::new(provider.clone(), bus, Arc::new(LoggingCallbacks));

        Self {
            provider,
            sender,
            inbound,
            bot,
            handoff,
            parser: CommandParser::from_config(&config.console),
        }
    }

    /// Parses and runs one line, returning what to print.
    pub async fn run_line(&self, line: &str) -> Step {
        let command = match self.parser.parse(line) {
            Ok(command) => command,
            Err(CommandError::Empty) => return Step::Continue(Vec::new()),
            Err(e) => return Step::Continue(vec![format!("error: {}", e)]),
        };

        let mut output = match command {
            ConsoleCommand::Quit => return Step::Quit,
            ConsoleCommand::Help => HELP.lines().map(str::to_string).collect(),
            ConsoleCommand::Inbound(message) => match self.inbound.route(&message).await {
                Ok(InboundRoute::Customer(route)) => vec![describe_route(&route)],
                Ok(InboundRoute::Agent(record)) => {
                    vec![format!("agent -> {}", record.customer())]
                }
                Err(e) => vec![format!("error: {}", e)],
            },
            ConsoleCommand::Handoff(event) => match self.handoff.handle(event).await {
                Ok(outcome) if outcome.already_watching => {
                    vec![format!("already watching: {}", describe(&outcome.record))]
                }
                Ok(outcome) => vec![describe(&outcome.record)],
                Err(failure) => vec![format!("error: {}", failure)],
            },
            ConsoleCommand::BotReply { customer, text } => {
                match self.bot.reply(&customer, text).await {
                    Ok(record) => vec![describe(&record)],
                    Err(e) => vec![format!("error: {}", e)],
                }
            }
            ConsoleCommand::Show(lookup) => match self.provider.get_conversation(&lookup).await {
                Some(record) => transcript(&record),
                None => vec!["no conversation".to_string()],
            },
            ConsoleCommand::List => self
                .provider
                .get_all_conversations()
                .await
                .iter()
                .map(describe)
                .collect(),
            ConsoleCommand::Bridged { within_secs } => self
                .provider
                .get_conversations_connected_to_agent(Timestamp::now().minus_secs(within_secs))
                .await
                .iter()
                .map(describe)
                .collect(),
        };

        for delivery in self.sender.drain() {
            output.push(format!(
                "  => {} | {}: {}",
                delivery.to, delivery.message.address, delivery.message.text
            ));
        }
        Step::Continue(output)
    }
}

fn describe(record: &ConversationRecord) -> String {
    let agent = record
        .agent()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string());
    let watchers: Vec<String> = record.watching_agents().iter().map(ToString::to_string).collect();
    format!(
        "{} [{:?}] agent={} watchers=[{}] lines={}",
        record.customer(),
        record.state(),
        agent,
        watchers.join(", "),
        record.transcript().len()
    )
}

fn transcript(record: &ConversationRecord) -> Vec<String> {
    let mut lines = vec![describe(record)];
    for line in record.transcript() {
        let from = line
            .from
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "bot".to_string());
        let to = line
            .to
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "bot".to_string());
        lines.push(format!("  {} -> {} [{:?}]: {}", from, to, line.state, line.text));
    }
    lines
}

fn describe_route(route: &CustomerRoute) -> String {
    match route {
        CustomerRoute::Bot => "customer -> bot".to_string(),
        CustomerRoute::Agent { agent } => format!("customer -> {}", agent),
        CustomerRoute::Watched { watchers } => {
            format!("customer -> bot, mirrored to {} watcher(s)", watchers.len())
        }
        CustomerRoute::Waiting => "customer -> waiting".to_string(),
        CustomerRoute::WatchedWaiting { watchers } => {
            format!("customer -> waiting, mirrored to {} watcher(s)", watchers.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ConsoleSession {
        ConsoleSession::from_config(&AppConfig::default())
    }

    async fn lines(session: &ConsoleSession, line: &str) -> Vec<String> {
        match session.run_line(line).await {
            Step::Continue(lines) => lines,
            Step::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn customer_message_is_echoed_by_the_bot() {
        let s = session();

        let out = lines(&s, "alice hello").await;

        assert_eq!(out[0], "customer -> bot");
        assert_eq!(out[1], "  => webchat:alice | webchat:alice: You said: hello");
    }

    #[tokio::test]
    async fn connect_then_agent_message_reaches_customer() {
        let s = session();
        lines(&s, "/connect alice x").await;

        let out = lines(&s, "agents:x Hi, I'm X").await;

        assert_eq!(out[0], "agent -> webchat:alice");
        assert_eq!(out[1], "  => webchat:alice | agents:x: Hi, I'm X");
    }

    #[tokio::test]
    async fn queued_customer_gets_the_notice() {
        let s = session();
        lines(&s, "/queue alice").await;

        let out = lines(&s, "alice anyone?").await;

        assert_eq!(out[0], "customer -> waiting");
        assert!(out[1].ends_with(QueueNotice::TEXT));
    }

    #[tokio::test]
    async fn rejected_operation_prints_the_reason() {
        let s = session();
        lines(&s, "/queue alice").await;

        let out = lines(&s, "/queue alice").await;

        assert_eq!(
            out,
            vec!["error: queue for webchat:alice failed: Conversation webchat/alice is already in state Wait"]
        );
    }

    #[tokio::test]
    async fn show_lists_the_transcript() {
        let s = session();
        lines(&s, "alice hello").await;

        let out = lines(&s, "/show alice").await;

        assert_eq!(out.len(), 3);
        assert_eq!(out[1], "  webchat:alice -> bot [Bot]: hello");
        assert_eq!(out[2], "  bot -> webchat:alice [Bot]: You said: hello");
    }

    #[tokio::test]
    async fn quit_and_blank_lines() {
        let s = session();
        assert_eq!(s.run_line("   ").await, Step::Continue(Vec::new()));
        assert_eq!(s.run_line("/quit").await, Step::Quit);
    }
}
