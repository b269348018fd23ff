use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use sundry_cache::{with_cache_async, Ttl, TtlHandle};
use tokio::time::{sleep, Duration};

// A simulated database or slow external service.
async fn fetch_from_database(key: i32, load_count: Arc<AtomicUsize>) -> Result<String, String> {
  println!("--- Database: received request for key {key}. Simulating slow query...");
  load_count.fetch_add(1, Ordering::SeqCst);
  sleep(Duration::from_millis(500)).await;
  Ok(format!("value_for_{key}"))
}

#[tokio::main]
async fn main() {
  let load_counter = Arc::new(AtomicUsize::new(0));

  let lookup = with_cache_async(
    {
      let counter = load_counter.clone();
      move |_ttl: TtlHandle, key: i32| fetch_from_database(key, counter.clone())
    },
    Ttl::from_secs(60),
  );

  println!("Spawning 10 tasks to request key 42 at once.\n");

  let mut tasks = Vec::new();
  for i in 0..10 {
    let lookup = lookup.clone();
    tasks.push(tokio::spawn(async move {
      let value = lookup.call(42).await.unwrap();
      println!("[Task {i}] received {value}");
      assert_eq!(*value, "value_for_42");
    }));
  }
  for task in tasks {
    task.await.unwrap();
  }

  println!(
    "\nDatabase was queried {} time(s); metrics: {:?}",
    load_counter.load(Ordering::SeqCst),
    lookup.metrics()
  );
  assert_eq!(load_counter.load(Ordering::SeqCst), 1);
}
