// tests/orchestrator.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use job_monitor::ingest::fetch_all;
use job_monitor::{Posting, SourceAdapter, SourceRegistry};

enum Behaviour {
    Ok(usize),
    Err,
    Panic,
    Slow(Duration),
}

struct Mock {
    name: String,
    behaviour: Behaviour,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl SourceAdapter for Mock {
    async fn fetch_latest(&self) -> Result<Vec<Posting>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        let out = match self.behaviour {
            Behaviour::Ok(n) => Ok((0..n)
                .map(|i| {
                    Posting::new(
                        "Data Engineer",
                        "Acme",
                        "Denver, CO",
                        format!("https://x/{}/{i}", self.name),
                        self.name.clone(),
                        "",
                    )
                })
                .collect()),
            Behaviour::Err => Err(anyhow!("{} is down", self.name)),
            Behaviour::Panic => panic!("{} exploded", self.name),
            Behaviour::Slow(d) => {
                tokio::time::sleep(d).await;
                Ok(vec![])
            }
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        out
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn registry(behaviours: Vec<Behaviour>) -> (SourceRegistry, Arc<AtomicUsize>) {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let mut reg = SourceRegistry::new();
    for (i, behaviour) in behaviours.into_iter().enumerate() {
        let name = format!("src{i}");
        reg.register(
            name.clone(),
            Mock {
                name,
                behaviour,
                in_flight: in_flight.clone(),
                peak: peak.clone(),
            },
        );
    }
    (reg, peak)
}

#[tokio::test]
async fn three_of_ten_failing_still_returns_the_other_seven() {
    let mut behaviours: Vec<Behaviour> = (0..7).map(|_| Behaviour::Ok(2)).collect();
    behaviours.push(Behaviour::Err);
    behaviours.push(Behaviour::Err);
    behaviours.push(Behaviour::Panic);
    let (reg, _) = registry(behaviours);

    let out = fetch_all(&reg, 4).await;
    assert_eq!(out.succeeded.len(), 7);
    assert_eq!(out.candidates.len(), 14);
    let mut failed = out.failed.clone();
    failed.sort();
    assert_eq!(failed, vec!["src7", "src8", "src9"]);
}

#[tokio::test]
async fn pool_bounds_concurrency() {
    let (reg, peak) = registry((0..12).map(|_| Behaviour::Ok(1)).collect());
    let out = fetch_all(&reg, 3).await;
    assert_eq!(out.candidates.len(), 12);
    assert!(peak.load(Ordering::SeqCst) <= 3);
}

#[tokio::test]
async fn a_slow_source_does_not_starve_the_rest() {
    let mut behaviours = vec![Behaviour::Slow(Duration::from_millis(300))];
    behaviours.extend((0..6).map(|_| Behaviour::Ok(1)));
    let (reg, _) = registry(behaviours);

    let t0 = std::time::Instant::now();
    let out = fetch_all(&reg, 2).await;
    // the slow one holds one worker; the other drains the rest meanwhile
    assert!(t0.elapsed() < Duration::from_millis(600));
    assert_eq!(out.candidates.len(), 6);
    assert_eq!(out.succeeded.len(), 7);
}

#[tokio::test]
async fn empty_registry_returns_immediately() {
    let out = fetch_all(&SourceRegistry::new(), 30).await;
    assert!(out.candidates.is_empty());
    assert!(out.failed.is_empty());
}
