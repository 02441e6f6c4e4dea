// main.rs file for running the accessor demo directly

use host_props::{BasicAccessor, TypeTag};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct EntityId(u32);

struct Health;
struct Mana;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let stats = BasicAccessor::<EntityId, i32>::global();
    let a = EntityId(1);
    let b = EntityId(2);

    stats.set::<Health>(a, 5);
    stats.for_host(a).set_typed::<Mana>(12);

    info!(
        a_health = stats.get::<Health>(a),
        a_mana = stats.get::<Mana>(a),
        b_health = stats.get::<Health>(b),
        hosts = stats.host_count(),
        "attached stats"
    );

    let slot = stats.for_host(a);
    for (tag, value) in slot.iter() {
        println!("{:?} {}: {}", a, tag, value);
    }
    drop(slot);

    println!(
        "{:?} {}: {}",
        b,
        TypeTag::of::<Health>(),
        stats.get::<Health>(b)
    );
}
