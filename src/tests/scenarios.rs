//! End-to-end flows across publisher, bus and subscribers.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::broker::{Message, MessageBus};
use crate::publisher::Publisher;
use crate::subscriber::Subscriber;

#[test]
fn publish_before_any_subscriber_is_replayed_on_join() {
    let bus = Arc::new(MessageBus::new());
    bus.publish("AAPL", Message::new("AAPL", 100.0, 0.0)).unwrap();
    assert!(bus.subscribers("AAPL").is_empty());

    let sub_a = Subscriber::new("subA", "A", bus.clone());
    sub_a.subscribe("AAPL").unwrap();

    let history = sub_a.message_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].message.price, 100.0);
    assert_eq!(history[0].message.change_percent, 0.0);
}

#[test]
fn publish_only_reaches_the_matching_topic() {
    let bus = Arc::new(MessageBus::new());
    let sub_a = Subscriber::new("subA", "A", bus.clone());
    sub_a.subscribe("AAPL").unwrap();
    sub_a.subscribe("GOOGL").unwrap();

    bus.publish("AAPL", Message::new("AAPL", 101.0, 1.0)).unwrap();

    let history = sub_a.message_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].topic, "AAPL");
    assert_eq!(bus.subscribers("AAPL"), vec!["subA".to_string()]);
    assert_eq!(bus.subscribers("GOOGL"), vec!["subA".to_string()]);
    assert!(bus.subscribers("MSFT").is_empty());
}

#[test]
fn every_subscriber_sees_each_update_exactly_once() {
    let bus = Arc::new(MessageBus::new());
    let publisher = Publisher::new(bus.clone(), "MSFT").unwrap();
    let subscribers: Vec<Subscriber> = (0..5)
        .map(|i| Subscriber::new(format!("sub-{i}"), format!("Sub {i}"), bus.clone()))
        .collect();
    for subscriber in &subscribers {
        subscriber.subscribe("MSFT").unwrap();
    }

    let published: Vec<Message> = (0..10)
        .map(|_| publisher.publish_update().unwrap())
        .collect();

    for subscriber in &subscribers {
        let received: Vec<Message> = subscriber
            .message_history()
            .iter()
            .map(|r| r.message.as_ref().clone())
            .collect();
        assert_eq!(received, published);
    }
}

#[test]
fn late_joiner_gets_state_from_a_running_publisher() {
    let bus = Arc::new(MessageBus::new());
    let publisher = Publisher::new(bus.clone(), "TSLA").unwrap();
    publisher.set_price(250.0).unwrap();
    let last = publisher.publish_update().unwrap();

    let late = Subscriber::new("late", "Late", bus.clone());
    late.subscribe("TSLA").unwrap();

    let history = late.message_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].message.as_ref(), &last);
}

#[test]
fn owner_cleanup_leaves_no_registrations() {
    let bus = Arc::new(MessageBus::new());
    let subscriber = Subscriber::new("subA", "A", bus.clone());
    for topic in ["AAPL", "GOOGL"] {
        subscriber.subscribe(topic).unwrap();
    }

    subscriber.unsubscribe_all();
    drop(subscriber);

    assert!(bus.subscribers("AAPL").is_empty());
    assert!(bus.subscribers("GOOGL").is_empty());
    // topics stay known after their last subscriber leaves
    assert_eq!(bus.topics().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn channel_subscriber_follows_a_publish_cycle() {
    let bus = Arc::new(MessageBus::new());
    let subscriber = Subscriber::new("subA", "A", bus.clone());
    let mut updates = subscriber.update_channel(16);
    subscriber.subscribe("AAPL").unwrap();

    let publisher = Publisher::new(bus.clone(), "AAPL").unwrap();
    publisher.start_publishing(Duration::from_millis(2000)).unwrap();

    let first = updates.recv().await.unwrap();
    let second = updates.recv().await.unwrap();
    publisher.stop_publishing();

    assert_eq!(first.topic, "AAPL");
    assert!(second.message.timestamp >= first.message.timestamp);
    assert_eq!(
        bus.latest("AAPL").unwrap().as_ref(),
        second.message.as_ref()
    );
}

#[test]
fn subscribers_agree_on_order_under_concurrent_publishers() {
    let bus = Arc::new(MessageBus::new());
    let subscribers: Vec<Subscriber> = (0..3)
        .map(|i| Subscriber::new(format!("sub-{i}"), format!("Sub {i}"), bus.clone()))
        .collect();
    for subscriber in &subscribers {
        subscriber.subscribe("AAPL").unwrap();
    }
    let publishers: Vec<Publisher> = (0..4)
        .map(|_| Publisher::new(bus.clone(), "AAPL").unwrap())
        .collect();

    thread::scope(|scope| {
        for publisher in &publishers {
            scope.spawn(move || {
                for _ in 0..10 {
                    publisher.publish_update().unwrap();
                }
            });
        }
    });

    let timeline = |subscriber: &Subscriber| -> Vec<Message> {
        subscriber
            .message_history()
            .iter()
            .map(|r| r.message.as_ref().clone())
            .collect()
    };
    let first = timeline(&subscribers[0]);
    assert_eq!(first.len(), 40);
    for subscriber in &subscribers[1..] {
        assert_eq!(timeline(subscriber), first);
    }
    assert_eq!(first.last(), bus.latest("AAPL").as_deref());
}
