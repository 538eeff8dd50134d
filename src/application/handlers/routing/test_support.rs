//! Hand-written port doubles shared by the router tests.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::conversation::{ConversationRecord, ConversationState, Message};
use crate::domain::foundation::{Address, AddressKey};
use crate::ports::{BotDialog, DeliveryError, MessageSender, WaitingHandler};

#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(Address, Message)>>,
    unreachable: Option<AddressKey>,
}

impl RecordingSender {
    pub fn unreachable(address: &Address) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            unreachable: Some(address.key()),
        }
    }

    pub fn recipients(&self) -> Vec<Address> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(to, _)| to.clone())
            .collect()
    }

    pub fn sent(&self) -> Vec<(Address, Message)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, to: &Address, message: &Message) -> Result<(), DeliveryError> {
        if self.unreachable.as_ref() == Some(&to.key()) {
            return Err(DeliveryError::Unreachable(to.key()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.clone(), message.clone()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingBot {
    handled: Mutex<Vec<Message>>,
}

impl RecordingBot {
    pub fn handled(&self) -> Vec<Message> {
        self.handled.lock().unwrap().clone()
    }
}

#[async_trait]
impl BotDialog for RecordingBot {
    async fn handle(&self, message: &Message) -> Result<(), DeliveryError> {
        self.handled.lock().unwrap().push(message.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingWaiting {
    notified: Mutex<Vec<(Message, ConversationState)>>,
}

impl RecordingWaiting {
    pub fn notified(&self) -> Vec<(Message, ConversationState)> {
        self.notified.lock().unwrap().clone()
    }
}

#[async_trait]
impl WaitingHandler for RecordingWaiting {
    async fn on_waiting(
        &self,
        message: &Message,
        record: &ConversationRecord,
    ) -> Result<(), DeliveryError> {
        self.notified
            .lock()
            .unwrap()
            .push((message.clone(), record.state()));
        Ok(())
    }
}
