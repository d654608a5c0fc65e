use clap::Parser;
use clap::ValueEnum;
use prim_hash::HashMap;
use prim_hash::strategy::BuildHasherStrategy;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Keys {
    /// 0, 1, 2, ...
    Sequential,
    /// Uniformly random 64-bit keys
    Random,
    /// Multiples of the slot count, which all share their low bits
    Strided,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Strategy {
    /// Identity hash, scrambled by the table
    Natural,
    /// foldhash through `BuildHasherStrategy`
    Foldhash,
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    #[arg(short = 'f', long = "load_factor", default_value_t = 0.75)]
    load_factor: f32,

    #[arg(short = 'k', long = "keys", value_enum, default_value_t = Keys::Random)]
    keys: Keys,

    #[arg(short = 's', long = "strategy", value_enum, default_value_t = Strategy::Natural)]
    strategy: Strategy,

    /// Fraction of the keys to remove through a cursor after filling.
    #[arg(short = 'r', long = "remove_fraction", default_value_t = 0.0)]
    remove_fraction: f64,
}

fn keys(kind: Keys, count: usize, stride: u64) -> Vec<u64> {
    let mut rng = SmallRng::from_os_rng();
    match kind {
        Keys::Sequential => (0..count as u64).collect(),
        Keys::Random => (0..count).map(|_| rng.random()).collect(),
        Keys::Strided => (1..=count as u64).map(|i| i * stride).collect(),
    }
}

fn run<S>(args: &Args, strategy: S)
where
    S: prim_hash::KeyHasher<u64>,
{
    let mut map: HashMap<u64, u64, S> = match HashMap::with_capacity_and_load_factor_and_strategy(
        args.target_capacity,
        args.load_factor,
        strategy,
    ) {
        Ok(map) => map,
        Err(err) => {
            eprintln!("cannot create map: {err}");
            std::process::exit(1);
        }
    };

    println!("Slot count: {}", map.table().slot_count());
    println!("Capacity before growth: {}", map.capacity());

    let count = map.capacity();
    let stride = map.table().slot_count() as u64;
    let mut num_failures = 0;
    for key in keys(args.keys, count, stride) {
        if map.try_insert(key, key).is_err() {
            num_failures += 1;
        }
    }

    println!("Inserted {} entries", map.len());
    println!(
        "Final load: {:.2}%",
        (map.len() as f64 / map.table().slot_count() as f64) * 100.0
    );

    if args.remove_fraction > 0.0 {
        let mut rng = SmallRng::from_os_rng();
        let mut removed = 0;
        let mut cursor = map.cursor();
        while cursor.next_entry().is_some() {
            if rng.random_bool(args.remove_fraction.min(1.0)) {
                cursor.remove().expect("cursor is on an entry");
                removed += 1;
            }
        }
        println!("Removed {removed} entries through a cursor");
    }

    map.probe_histogram().print();
    map.debug_stats().print();
    println!("Number of failed try_insert attempts: {num_failures}");
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating HashMap with target capacity {} and load factor {}",
        args.target_capacity, args.load_factor
    );

    match args.strategy {
        Strategy::Natural => run(&args, prim_hash::Natural),
        Strategy::Foldhash => run(&args, <BuildHasherStrategy>::default()),
    }
}
