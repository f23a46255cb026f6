// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use moverd_core::{DeliveryId, Message, NotificationData, NotificationEventKind, Priority};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

fn qm(priority: i32, created_at: Instant) -> QueuedMessage {
    let message = Message::new("t", "c", Priority::Normal);
    QueuedMessage {
        notification: NotificationData::new(message, NotificationEventKind::Progress, "cycle-1"),
        priority,
        providers: BTreeSet::from(["discord".to_string()]),
        delivery_id: DeliveryId::new(),
        created_at,
    }
}

#[tokio::test]
async fn higher_priority_dequeues_first() {
    let queue = MessageQueue::new(10);
    let now = Instant::now();
    queue.enqueue(qm(1, now)).await.unwrap();
    queue.enqueue(qm(5, now)).await.unwrap();
    queue.enqueue(qm(3, now)).await.unwrap();

    assert_eq!(queue.dequeue().await.unwrap().priority, 5);
    assert_eq!(queue.dequeue().await.unwrap().priority, 3);
    assert_eq!(queue.dequeue().await.unwrap().priority, 1);
}

#[tokio::test]
async fn equal_priority_is_fifo() {
    let queue = MessageQueue::new(10);
    let t0 = Instant::now();
    let first = qm(1, t0);
    let first_id = first.delivery_id.clone();
    let second = qm(1, t0 + Duration::from_millis(1));
    let second_id = second.delivery_id.clone();

    queue.enqueue(first).await.unwrap();
    queue.enqueue(second).await.unwrap();

    assert_eq!(queue.dequeue().await.unwrap().delivery_id, first_id);
    assert_eq!(queue.dequeue().await.unwrap().delivery_id, second_id);
}

#[tokio::test]
async fn enqueue_blocks_until_capacity_frees_up() {
    let queue = MessageQueue::new(1);
    let now = Instant::now();
    queue.enqueue(qm(1, now)).await.unwrap();
    assert!(queue.is_full());

    let queue2 = queue.clone();
    let handle = tokio::spawn(async move { queue2.enqueue(qm(2, now)).await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!handle.is_finished(), "enqueue should still be blocked on capacity");

    queue.dequeue().await.unwrap();
    handle.await.unwrap().unwrap();
    assert_eq!(queue.size(), 1);
}

#[tokio::test]
async fn dequeue_on_empty_shutdown_queue_returns_closed() {
    let queue = MessageQueue::new(4);
    queue.shutdown();
    assert_eq!(queue.dequeue().await.unwrap_err(), QueueError::QueueClosed);
}

#[tokio::test]
async fn enqueue_on_shutdown_queue_fails() {
    let queue = MessageQueue::new(4);
    queue.shutdown();
    assert_eq!(queue.enqueue(qm(1, Instant::now())).await.unwrap_err(), QueueError::QueueClosed);
}

#[tokio::test]
async fn shutdown_wakes_a_blocked_dequeue() {
    let queue = MessageQueue::new(4);
    let queue2 = queue.clone();
    let handle = tokio::spawn(async move { queue2.dequeue().await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    queue.shutdown();

    assert_eq!(handle.await.unwrap().unwrap_err(), QueueError::QueueClosed);
}

#[tokio::test]
async fn size_and_is_empty_reflect_queue_contents() {
    let queue = MessageQueue::new(4);
    assert!(queue.is_empty());
    queue.enqueue(qm(1, Instant::now())).await.unwrap();
    assert_eq!(queue.size(), 1);
    assert!(!queue.is_empty());
}
