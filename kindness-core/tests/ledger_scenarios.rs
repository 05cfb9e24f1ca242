//! End-to-end ledger scenarios

use kindness_core::{Config, Event, EventKind, FeedEntry, Ledger, ParticipantId, ValidationError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

fn id(s: &str) -> ParticipantId {
    ParticipantId::new(s)
}

fn ledger_with(participants: &[&str]) -> Ledger {
    let ledger = Ledger::new(Config::default()).unwrap();
    for p in participants {
        ledger.register(*p, &p.to_uppercase());
    }
    ledger
}

#[test]
fn test_idempotent_registration() {
    let ledger = Ledger::new(Config::default()).unwrap();

    let first = ledger.register("k", "A");
    let second = ledger.register("k", "B");

    assert_eq!(first.id, second.id);
    assert_eq!(second.display_name, "A");
    assert_eq!(ledger.balance(&id("k")), 5);
    assert_eq!(ledger.total_supply(), 5);
    assert_eq!(ledger.list_all().len(), 1);
}

#[test]
fn test_note_enforcement() {
    let ledger = ledger_with(&["a", "b"]);

    for note in ["", "  ", "hi"] {
        assert_eq!(
            ledger.transfer(&id("a"), &id("b"), 1, note, None),
            Err(ValidationError::NoteRequired { min_len: 3 })
        );
    }
    assert!(ledger.transfer(&id("a"), &id("b"), 1, "hi!", None).is_ok());
}

#[test]
fn test_self_transfer_rejected_regardless_of_balance() {
    let ledger = ledger_with(&["a", "b"]);

    assert_eq!(
        ledger.transfer(&id("a"), &id("a"), 1, "note", None),
        Err(ValidationError::SelfTransferNotAllowed)
    );
    // Even an unaffordable amount reports the self-transfer first.
    assert_eq!(
        ledger.transfer(&id("a"), &id("a"), 50, "note", None),
        Err(ValidationError::SelfTransferNotAllowed)
    );
}

#[test]
fn test_unregistered_parties_rejected() {
    let ledger = ledger_with(&["a"]);

    assert_eq!(
        ledger.transfer(&id("ghost"), &id("a"), 1, "boo!", None),
        Err(ValidationError::SenderUnverified)
    );
    assert_eq!(
        ledger.transfer(&id("a"), &id("ghost"), 1, "boo!", None),
        Err(ValidationError::RecipientUnverified)
    );
}

#[test]
fn test_note_too_long_rejected() {
    let ledger = ledger_with(&["a", "b"]);
    let note = "k".repeat(281);

    assert_eq!(
        ledger.transfer(&id("a"), &id("b"), 1, &note, None),
        Err(ValidationError::NoteTooLong { max_len: 280 })
    );
    assert!(ledger
        .transfer(&id("a"), &id("b"), 1, &"k".repeat(280), None)
        .is_ok());
}

#[test]
fn test_graph_edge_aggregation() {
    let ledger = ledger_with(&["a", "b"]);
    ledger.transfer(&id("a"), &id("b"), 2, "first thanks", None).unwrap();
    ledger.transfer(&id("a"), &id("b"), 3, "second thanks", None).unwrap();

    let graph = ledger.graph();
    assert_eq!(graph.edges.len(), 1);

    let edge = &graph.edges[0];
    assert_eq!((edge.source.as_str(), edge.target.as_str()), ("a", "b"));
    assert_eq!(edge.amount, 5);
    assert_eq!(edge.note, "second thanks");

    let a = graph.node(&id("a")).unwrap();
    let b = graph.node(&id("b")).unwrap();
    assert_eq!((a.total_given, a.total_received, a.transfer_count), (5, 0, 2));
    assert_eq!((b.total_given, b.total_received, b.transfer_count), (0, 5, 2));
}

#[test]
fn test_eccentricity_on_path() {
    let ledger = ledger_with(&["a", "b", "c", "d", "e"]);
    ledger.transfer(&id("a"), &id("b"), 1, "a to b", None).unwrap();
    ledger.transfer(&id("b"), &id("c"), 1, "b to c", None).unwrap();
    ledger.transfer(&id("c"), &id("d"), 1, "c to d", None).unwrap();

    assert_eq!(ledger.eccentricity(&id("a")), 3);
    assert_eq!(ledger.eccentricity(&id("b")), 2);
    assert_eq!(ledger.eccentricity(&id("e")), 0);
    assert_eq!(ledger.stats(&id("a")).eccentricity, 3);
}

#[test]
fn test_broadcast_delivery_and_eviction() {
    let ledger = ledger_with(&["a", "b"]);

    let received: Arc<Mutex<Vec<FeedEntry>>> = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&received);
    let _listener = ledger.subscribe_fn(move |event: &Event| {
        if event.kind == EventKind::TransferCompleted {
            record.lock().unwrap().push(event.payload_as()?);
        }
        Ok(())
    });

    let failing_calls = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&failing_calls);
    let broken = ledger.subscribe_fn(move |_event: &Event| {
        calls.fetch_add(1, Ordering::SeqCst);
        Err("client went away".into())
    });

    let first = ledger.transfer(&id("a"), &id("b"), 1, "first!", None).unwrap();
    let second = ledger.transfer(&id("b"), &id("a"), 2, "second!", None).unwrap();
    let _ = ledger.transfer(&id("a"), &id("b"), 9, "rejected", None);

    let received = received.lock().unwrap();
    let ids: Vec<_> = received.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);

    assert_eq!(failing_calls.load(Ordering::SeqCst), 1);
    assert!(!broken.is_active());
}

#[test]
fn test_concurrent_transfers_conserve_supply_and_order_events() {
    let participants = ["p0", "p1", "p2", "p3", "p4", "p5"];
    let ledger = Arc::new(ledger_with(&participants));
    let supply = ledger.total_supply();

    let sequences = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&sequences);
    let _listener = ledger.subscribe_fn(move |event: &Event| {
        let entry: FeedEntry = event.payload_as()?;
        record.lock().unwrap().push((event.sequence, entry.id));
        Ok(())
    });

    let workers: Vec<_> = (0..participants.len())
        .map(|n| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                let from = ParticipantId::new(participants[n]);
                let to = ParticipantId::new(participants[(n + 1) % participants.len()]);
                for _ in 0..50 {
                    let _ = ledger.transfer(&from, &to, 1, "passing it on", None);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(ledger.total_supply(), supply);
    for p in participants {
        assert!(ledger.balance(&id(p)) >= 0);
    }

    // Events arrive in log order with increasing sequence numbers.
    let sequences = sequences.lock().unwrap();
    let log_ids: Vec<_> = ledger.transfers().iter().map(|t| t.id).collect();
    let event_ids: Vec<_> = sequences.iter().map(|(_, id)| *id).collect();
    assert_eq!(event_ids, log_ids);
    assert!(sequences.windows(2).all(|w| w[0].0 < w[1].0));
}

#[tokio::test]
async fn test_channel_subscriber_streams_feed_entries() {
    let ledger = ledger_with(&["a", "b"]);
    let (_subscription, mut events) = ledger.subscribe_channel();

    ledger.register("c", "Carol");
    ledger.transfer(&id("a"), &id("c"), 2, "welcome aboard", None).unwrap();

    let joined = events.recv().await.unwrap();
    assert_eq!(joined.kind, EventKind::ParticipantJoined);
    assert_eq!(joined.payload["display_name"], "Carol");

    let completed = events.recv().await.unwrap();
    let entry: FeedEntry = completed.payload_as().unwrap();
    assert_eq!(entry.from_name, "A");
    assert_eq!(entry.to_name, "Carol");
    assert_eq!(entry.amount, 2);
}

#[test]
fn test_handler_may_register_during_transfer_delivery() {
    let ledger = Arc::new(ledger_with(&["a", "b"]));

    let kinds = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&kinds);
    let writer = Arc::downgrade(&ledger);
    let _welcomer = ledger.subscribe_fn(move |event: &Event| {
        record.lock().unwrap().push(event.kind);
        if event.kind == EventKind::TransferCompleted {
            if let Some(ledger) = writer.upgrade() {
                ledger.register("c", "Carol");
            }
        }
        Ok(())
    });

    let (done, finished) = std::sync::mpsc::channel();
    let worker = Arc::clone(&ledger);
    thread::spawn(move || {
        let _ = done.send(worker.transfer(&id("a"), &id("b"), 1, "thanks!", None));
    });

    let transfer = finished
        .recv_timeout(std::time::Duration::from_secs(5))
        .expect("transfer must complete while a handler writes to the ledger");
    assert!(transfer.is_ok());

    assert_eq!(ledger.get(&id("c")).map(|p| p.display_name), Some("Carol".to_string()));
    assert_eq!(ledger.balance(&id("c")), 5);
    assert_eq!(
        *kinds.lock().unwrap(),
        vec![EventKind::TransferCompleted, EventKind::ParticipantJoined]
    );

    // Later writes still go through.
    ledger.transfer(&id("b"), &id("c"), 2, "welcome!", None).unwrap();
    assert_eq!(ledger.transfer_count(), 2);
}
