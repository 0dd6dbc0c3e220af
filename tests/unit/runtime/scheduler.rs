use super::*;

fn drain(s: &mut Scheduler<&'static str>, until: f64) -> Vec<&'static str> {
    let mut out = Vec::new();
    while let Some((_, e)) = s.pop_due(until) {
        out.push(e);
    }
    out
}

#[test]
fn fires_in_due_order() {
    let mut s = Scheduler::new(0.0);
    s.schedule_after(30.0, "c");
    s.schedule_after(10.0, "a");
    s.schedule_after(20.0, "b");
    assert_eq!(s.next_due_ms(), Some(10.0));
    assert_eq!(drain(&mut s, 100.0), vec!["a", "b", "c"]);
    assert_eq!(s.now_ms(), 30.0);
}

#[test]
fn ties_fire_fifo() {
    let mut s = Scheduler::new(5.0);
    s.schedule_at(10.0, "first");
    s.schedule_at(10.0, "second");
    s.schedule_at(10.0, "third");
    assert_eq!(drain(&mut s, 10.0), vec!["first", "second", "third"]);
}

#[test]
fn respects_until_bound() {
    let mut s = Scheduler::new(0.0);
    s.schedule_after(10.0, "early");
    s.schedule_after(50.0, "late");
    assert_eq!(drain(&mut s, 20.0), vec!["early"]);
    assert_eq!(s.now_ms(), 10.0);
    assert_eq!(s.pending(), 1);
}

#[test]
fn cancelled_timers_never_fire() {
    let mut s = Scheduler::new(0.0);
    let a = s.schedule_after(10.0, "a");
    let _b = s.schedule_after(20.0, "b");
    assert!(s.is_pending(a));
    assert!(s.cancel(a));
    assert!(!s.cancel(a));
    assert!(!s.is_pending(a));
    assert_eq!(s.next_due_ms(), Some(20.0));
    assert_eq!(drain(&mut s, 100.0), vec!["b"]);
}

#[test]
fn fired_timers_cannot_be_cancelled() {
    let mut s = Scheduler::new(0.0);
    let a = s.schedule_after(1.0, "a");
    assert_eq!(drain(&mut s, 1.0), vec!["a"]);
    assert!(!s.cancel(a));
}

#[test]
fn clock_never_moves_backwards() {
    let mut s = Scheduler::new(100.0);
    s.schedule_at(50.0, "past");
    assert_eq!(drain(&mut s, 100.0), vec!["past"]);
    assert_eq!(s.now_ms(), 100.0);
    s.advance_to(40.0);
    assert_eq!(s.now_ms(), 100.0);
    s.advance_to(140.0);
    assert_eq!(s.now_ms(), 140.0);
}

#[test]
fn negative_delay_fires_now() {
    let mut s = Scheduler::new(7.0);
    s.schedule_after(-3.0, "now");
    assert_eq!(s.next_due_ms(), Some(7.0));
}
