use std::time::Duration;
use sundry_cache::{ManualClock, MemoBuilder, TtlHandle};

fn main() {
  let clock = ManualClock::new();

  // Empty results are only kept for five seconds, everything else for a minute.
  let search = MemoBuilder::<String>::new()
    .time_to_live(Duration::from_secs(60))
    .clock(clock.clone())
    .build(|ttl: &TtlHandle, query: &String| {
      println!("searching for {query:?}");
      let hits: Vec<String> = if query.is_empty() {
        ttl.set_ttl(Duration::from_secs(5));
        Vec::new()
      } else {
        vec![format!("{query}-1"), format!("{query}-2")]
      };
      hits
    });

  search.call(&"rust".to_string()).unwrap();
  search.call(&String::new()).unwrap();

  clock.advance(Duration::from_secs(10));
  println!("after 10s: rust cached = {}", search.contains(&"rust".to_string()).unwrap());
  println!("after 10s: empty cached = {}", search.contains(&String::new()).unwrap());

  // Extend every live entry by another two minutes.
  search.update_ttl(Duration::from_secs(120));
  clock.advance(Duration::from_secs(100));
  println!("after 110s: rust cached = {}", search.contains(&"rust".to_string()).unwrap());
  println!("{:?}", search.metrics());
}
