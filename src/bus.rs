use crate::broadcaster::Broadcaster;
use crate::config::Config;
use crate::receiver::Receiver;
use crate::RELAY_LOG_TARGET;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SenderStatus {
    Enabled,
    Disabled,
}

impl From<bool> for SenderStatus {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }
}

impl From<SenderStatus> for bool {
    fn from(sender_status: SenderStatus) -> Self {
        match sender_status {
            SenderStatus::Enabled => true,
            SenderStatus::Disabled => false,
        }
    }
}

/// A broadcaster that can be switched off.
///
/// Collaborators that produce events hold the bus and only send when it's
/// enabled; collaborators that consume them get a [`Receiver`] from it.
#[derive(Debug)]
pub struct EventBus<T: 'static> {
    pub sender_status: SenderStatus,
    pub broadcaster: Broadcaster<T>,
}

impl<T: 'static> Default for EventBus<T> {
    fn default() -> Self {
        let sender_status = SenderStatus::Enabled;
        let broadcaster = Broadcaster::<T>::default();

        Self::new(sender_status, broadcaster)
    }
}

impl<T: 'static> From<&Config> for EventBus<T> {
    fn from(config: &Config) -> Self {
        Self::new(config.enabled.into(), Broadcaster::with_config(*config))
    }
}

impl<T: 'static> EventBus<T> {
    #[must_use]
    pub fn new(sender_status: SenderStatus, broadcaster: Broadcaster<T>) -> Self {
        Self {
            sender_status,
            broadcaster,
        }
    }

    /// The broadcaster to send events with, or `None` if the bus is
    /// disabled.
    #[must_use]
    pub fn sender(&self) -> Option<&Broadcaster<T>> {
        match self.sender_status {
            SenderStatus::Enabled => Some(&self.broadcaster),
            SenderStatus::Disabled => None,
        }
    }

    /// A new receiver bound to the bus. The caller owns it.
    #[must_use]
    pub fn receiver(&self) -> Receiver<T> {
        let receiver = Receiver::with_config(self.broadcaster.config());
        self.broadcaster.bind(&receiver);
        receiver
    }

    /// Attaches a callback owned by the bus.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&T) + 'static,
    {
        self.broadcaster.attach_callback(callback);
    }

    /// Sends the event if the bus is enabled.
    ///
    /// Returns the number of receivers directly bound to the bus when the
    /// event was sent, or `None` if the bus is disabled.
    pub fn send(&self, event: &T) -> Option<usize> {
        let Some(broadcaster) = self.sender() else {
            tracing::debug!(target: RELAY_LOG_TARGET, "event bus disabled, event not sent");
            return None;
        };

        let receivers = broadcaster.len();

        broadcaster.send(event);

        Some(receivers)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rstest::rstest;

    use super::*;
    use crate::config::DispatchPolicy;

    #[test]
    fn it_should_provide_an_event_sender_when_enabled() {
        let bus = EventBus::<String>::new(SenderStatus::Enabled, Broadcaster::default());

        assert!(bus.sender().is_some());
    }

    #[test]
    fn it_should_not_provide_event_sender_when_disabled() {
        let bus = EventBus::<String>::new(SenderStatus::Disabled, Broadcaster::default());

        assert!(bus.sender().is_none());
    }

    #[test]
    fn it_should_enabled_by_default() {
        let bus = EventBus::<String>::default();

        assert!(bus.sender().is_some());
    }

    #[test]
    fn it_should_allow_sending_events_that_are_received_by_receivers() {
        let bus = EventBus::<String>::default();
        let received = Rc::new(RefCell::new(Vec::new()));
        let receiver = bus.receiver();
        receiver.set_callback({
            let received = received.clone();
            move |event: &String| received.borrow_mut().push(event.clone())
        });

        let event = "hello".to_string();

        let number_of_receivers = bus.send(&event);

        assert_eq!(number_of_receivers, Some(1));
        assert_eq!(*received.borrow(), vec![event]);
    }

    #[test]
    fn it_should_not_send_events_when_disabled() {
        let bus = EventBus::<String>::new(SenderStatus::Disabled, Broadcaster::default());
        let received = Rc::new(RefCell::new(Vec::new()));
        bus.subscribe({
            let received = received.clone();
            move |event: &String| received.borrow_mut().push(event.clone())
        });

        assert_eq!(bus.send(&"hello".to_string()), None);
        assert!(received.borrow().is_empty());
    }

    #[test]
    fn it_should_unbind_receivers_when_the_bus_is_dropped() {
        let bus = EventBus::<String>::default();
        let receiver = bus.receiver();

        drop(bus);

        assert_eq!(receiver.sender_count(), 0);
    }

    #[test]
    fn it_should_be_built_from_the_configuration() {
        let config = Config {
            dispatch: DispatchPolicy::Live,
            enabled: false,
        };

        let bus = EventBus::<u32>::from(&config);

        assert_eq!(bus.sender_status, SenderStatus::Disabled);
        assert_eq!(bus.broadcaster.config(), config);
        assert_eq!(bus.receiver().config(), config);
    }

    #[rstest]
    #[case(true, SenderStatus::Enabled)]
    #[case(false, SenderStatus::Disabled)]
    fn it_should_convert_the_sender_status_from_and_to_bool(#[case] enabled: bool, #[case] status: SenderStatus) {
        assert_eq!(SenderStatus::from(enabled), status);
        assert_eq!(bool::from(status), enabled);
    }
}
